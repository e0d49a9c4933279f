//! file: core/src/ast/printer.rs
//! description: PHP source rendering for literals and names.

/// Renders a string literal. Plain text uses single quotes; text holding
/// control characters switches to double quotes so the escapes survive.
pub fn quote_string(value: &str) -> String {
    if value.chars().any(|c| c.is_control()) {
        let mut out = String::with_capacity(value.len() + 2);
        out.push('"');
        for c in value.chars() {
            match c {
                '\n' => out.push_str("\\n"),
                '\t' => out.push_str("\\t"),
                '\r' => out.push_str("\\r"),
                '\u{0B}' => out.push_str("\\v"),
                '\u{0C}' => out.push_str("\\f"),
                '\u{1B}' => out.push_str("\\e"),
                '\\' => out.push_str("\\\\"),
                '"' => out.push_str("\\\""),
                '$' => out.push_str("\\$"),
                c if c.is_control() => out.push_str(&format!("\\x{:02X}", c as u32)),
                c => out.push(c),
            }
        }
        out.push('"');
        out
    } else {
        format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
    }
}

/// Raw text of an interpolated string keeps its source escapes; only literal
/// line breaks and tabs (heredoc bodies) are escaped so the result stays on
/// one line.
pub fn escape_fragment(raw: &str) -> String {
    raw.replace('\r', "\\r").replace('\n', "\\n").replace('\t', "\\t")
}

pub fn print_float(value: f64) -> String {
    if value.is_infinite() {
        return if value > 0.0 { "INF".into() } else { "-INF".into() };
    }
    if value.is_nan() {
        return "NAN".into();
    }
    let text = format!("{:?}", value);
    if text.contains('e') {
        // 1e25 -> 1.0E+25
        let (mantissa, exponent) = text.split_once('e').unwrap_or((&text, "0"));
        let mantissa = if mantissa.contains('.') { mantissa.to_string() } else { format!("{}.0", mantissa) };
        let exponent = if exponent.starts_with('-') { exponent.to_string() } else { format!("+{}", exponent) };
        format!("{}E{}", mantissa, exponent)
    } else {
        text
    }
}

/// Full name as written, `\` separated, with the leading `\` kept.
pub fn print_name(parts: &[String], fully_qualified: bool) -> String {
    let joined = parts.join("\\");
    if fully_qualified { format!("\\{}", joined) } else { joined }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_plain_and_control_text() {
        assert_eq!(quote_string("it's"), "'it\\'s'");
        assert_eq!(quote_string("a\nb"), "\"a\\nb\"");
    }

    #[test]
    fn floats_keep_a_decimal_point() {
        assert_eq!(print_float(1.0), "1.0");
        assert_eq!(print_float(0.25), "0.25");
        assert_eq!(print_float(1e25), "1.0E+25");
    }
}
