use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use console::{measure_text_width, strip_ansi_codes, Style};
use indicatif::{ProgressBar, ProgressStyle};
use phptac_core::{BatchReport, FileStatus};
use std::io::{self, Write};

pub struct BoxCorners {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
}

impl Default for BoxCorners {
    fn default() -> Self {
        BoxCorners {
            top_left: '┌',
            top_right: '┐',
            bottom_left: '└',
            bottom_right: '┘',
        }
    }
}

/// Styles for the summary box.
pub struct FormatStyle {
    pub title: Style,
    pub info: Style,
    pub warning: Style,
    pub success: Style,
    pub corners: BoxCorners,
    pub horizontal: char,
    pub vertical: char,
}

impl Default for FormatStyle {
    fn default() -> Self {
        FormatStyle {
            title: Style::new().bold().underlined(),
            info: Style::new().cyan(),
            warning: Style::new().yellow(),
            success: Style::new().green().bold(),
            corners: BoxCorners::default(),
            horizontal: '─',
            vertical: '│',
        }
    }
}

/// Writes boxed, styled lines into any `Write`.
pub struct FormattedOutputHandler<T: Write> {
    out: T,
    inner_width: usize, // visible width available for content
    formatting: FormatStyle,
}

impl<T: Write> FormattedOutputHandler<T> {
    pub fn new(out: T, total_width: usize) -> Self {
        // two border chars + two single-space paddings
        let inner_width = total_width.saturating_sub(4);
        FormattedOutputHandler { out, inner_width, formatting: FormatStyle::default() }
    }

    /// Pads to the box width using the visible (ANSI-stripped) length.
    pub fn line(&mut self, text: &str, style: Option<&Style>) -> io::Result<()> {
        let rendered = match style {
            Some(s) => s.apply_to(text).to_string(),
            None => text.to_string(),
        };
        let visible = measure_text_width(&strip_ansi_codes(&rendered));
        let pad = self.inner_width.saturating_sub(visible);
        let v = self.formatting.vertical;
        writeln!(self.out, "{} {}{} {}", v, rendered, " ".repeat(pad), v)
    }

    fn border(&mut self, left: char, right: char) -> io::Result<()> {
        let rule = self.formatting.horizontal.to_string().repeat(self.inner_width + 2);
        writeln!(self.out, "{}{}{}", left, rule, right)
    }

    pub fn top_border(&mut self) -> io::Result<()> {
        let c = &self.formatting.corners;
        let (l, r) = (c.top_left, c.top_right);
        self.border(l, r)
    }

    pub fn bottom_border(&mut self) -> io::Result<()> {
        let c = &self.formatting.corners;
        let (l, r) = (c.bottom_left, c.bottom_right);
        self.border(l, r)
    }

    pub fn title(&mut self, text: &str) -> io::Result<()> {
        let style = self.formatting.title.clone();
        self.line(text, Some(&style))
    }

    pub fn info(&mut self, text: &str) -> io::Result<()> {
        let style = self.formatting.info.clone();
        self.line(text, Some(&style))
    }

    pub fn warning(&mut self, text: &str) -> io::Result<()> {
        let style = self.formatting.warning.clone();
        self.line(text, Some(&style))
    }

    pub fn success(&mut self, text: &str) -> io::Result<()> {
        let style = self.formatting.success.clone();
        self.line(text, Some(&style))
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Progress bar for `total` files, drawn on stderr.
pub fn batch_progress(total: usize) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}") {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}

fn status_cell(status: FileStatus) -> Cell {
    let color = match status {
        FileStatus::Ok => Color::Green,
        FileStatus::ParseError | FileStatus::LoweringError => Color::Red,
        FileStatus::IoError => Color::Yellow,
    };
    Cell::new(status.to_string()).fg(color)
}

/// One row per file: input, status, instruction count, message.
pub fn batch_table(report: &BatchReport) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["File", "Status", "Instructions", "Message"]);
    for file in &report.files {
        let input = file.input.strip_prefix(&report.root).unwrap_or(&file.input);
        table.add_row(vec![
            Cell::new(input.display()),
            status_cell(file.status),
            Cell::new(file.instructions),
            Cell::new(file.message.as_deref().unwrap_or("")),
        ]);
    }
    table
}

/// Boxed totals printed under the table.
pub fn write_summary<T: Write>(out: T, report: &BatchReport) -> io::Result<()> {
    let mut handler = FormattedOutputHandler::new(out, 64);
    handler.top_border()?;
    handler.title("phptac batch")?;
    handler.info(&format!("input:  {}", report.root.display()))?;
    handler.info(&format!("output: {}", report.output_root.display()))?;
    handler.success(&format!("converted: {}", report.succeeded()))?;
    if report.failed() > 0 {
        handler.warning(&format!(
            "failed: {} (parse {}, lowering {}, io {})",
            report.failed(),
            report.count(FileStatus::ParseError),
            report.count(FileStatus::LoweringError),
            report.count(FileStatus::IoError),
        ))?;
    }
    handler.bottom_border()?;
    handler.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boxed_lines_are_padded_to_width() {
        let mut buf = Vec::new();
        {
            let mut handler = FormattedOutputHandler::new(&mut buf, 12);
            handler.top_border().unwrap();
            handler.line("abc", None).unwrap();
            handler.bottom_border().unwrap();
        }
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "│ abc      │");
        assert_eq!(lines[0].chars().count(), 12);
    }
}
