//! file: core/src/ast/expr.rs
//! description: expression parsing from pest pairs into `AstNode` trees.
//!
//! The grammar hands every expression over as a flat run of operands and
//! operator tokens; `PRATT_PARSER` folds that run using PHP's precedence and
//! associativity table. Operands (atoms plus their `->`, `::`, `[]` and call
//! suffixes) are built here as well.

use lazy_static::lazy_static;
use pest::iterators::Pair;
use pest::pratt_parser::{Assoc, Op, PrattParser};

use crate::{
    ast::{
        AstNode, AstNodeKind, BinaryOperator, CastType, IncludeKind, Rule, TacErrorExt, UnaryOperator,
        err::syntax_error, rules, stmt,
    },
    location::Span,
    script,
};

type ParseResult = Result<AstNode, Box<dyn TacErrorExt>>;

lazy_static! {
    /// Lowest precedence first.
    static ref PRATT_PARSER: PrattParser<Rule> = PrattParser::new()
        .op(Op::infix(Rule::op_or_kw, Assoc::Left))
        .op(Op::infix(Rule::op_xor_kw, Assoc::Left))
        .op(Op::infix(Rule::op_and_kw, Assoc::Left))
        .op(Op::prefix(Rule::op_include) | Op::prefix(Rule::op_print))
        .op(Op::prefix(Rule::op_yield))
        .op(Op::prefix(Rule::op_yield_from))
        .op(Op::infix(Rule::op_assign, Assoc::Right) | Op::infix(Rule::op_assign_ref, Assoc::Right))
        .op(Op::infix(Rule::op_ternary, Assoc::Right))
        .op(Op::infix(Rule::op_coalesce, Assoc::Right))
        .op(Op::infix(Rule::op_bool_or, Assoc::Left))
        .op(Op::infix(Rule::op_bool_and, Assoc::Left))
        .op(Op::infix(Rule::op_bit_or, Assoc::Left))
        .op(Op::infix(Rule::op_bit_xor, Assoc::Left))
        .op(Op::infix(Rule::op_bit_and, Assoc::Left))
        .op(Op::infix(Rule::op_equality, Assoc::Left))
        .op(Op::infix(Rule::op_compare, Assoc::Left))
        .op(Op::infix(Rule::op_concat, Assoc::Left))
        .op(Op::infix(Rule::op_shift, Assoc::Left))
        .op(Op::infix(Rule::op_additive, Assoc::Left))
        .op(Op::infix(Rule::op_multiplicative, Assoc::Left))
        .op(Op::prefix(Rule::op_not))
        .op(Op::postfix(Rule::instanceof_op))
        .op(Op::prefix(Rule::op_neg)
            | Op::prefix(Rule::op_pos)
            | Op::prefix(Rule::op_bit_not)
            | Op::prefix(Rule::op_silence)
            | Op::prefix(Rule::cast)
            | Op::prefix(Rule::pre_inc)
            | Op::prefix(Rule::pre_dec))
        .op(Op::infix(Rule::op_pow, Assoc::Right))
        .op(Op::prefix(Rule::op_clone) | Op::postfix(Rule::post_inc) | Op::postfix(Rule::post_dec));
}

pub(crate) fn parse_expression_rule(
    pair: Pair<Rule>,
    script: &script::Script,
) -> ParseResult {
    PRATT_PARSER
        .map_primary(|operand| parse_operand_rule(operand, script))
        .map_prefix(|op, rhs| parse_prefix_op(op, rhs?, script))
        .map_postfix(|lhs, op| parse_postfix_op(lhs?, op, script))
        .map_infix(|lhs, op, rhs| parse_infix_op(lhs?, op, rhs?, script))
        .parse(pair.into_inner())
}

/// Maps an operator token (as written, any case) to its operator.
pub fn binary_operator_from_token(token: &str) -> Option<BinaryOperator> {
    let op = match token.to_ascii_lowercase().as_str() {
        "+" => BinaryOperator::Add,
        "-" => BinaryOperator::Sub,
        "*" => BinaryOperator::Mul,
        "/" => BinaryOperator::Div,
        "%" => BinaryOperator::Mod,
        "**" => BinaryOperator::Pow,
        "." => BinaryOperator::Concat,
        "<<" => BinaryOperator::ShiftLeft,
        ">>" => BinaryOperator::ShiftRight,
        "&" => BinaryOperator::BitAnd,
        "|" => BinaryOperator::BitOr,
        "^" => BinaryOperator::BitXor,
        "&&" => BinaryOperator::BooleanAnd,
        "||" => BinaryOperator::BooleanOr,
        "and" => BinaryOperator::LogicalAnd,
        "or" => BinaryOperator::LogicalOr,
        "xor" => BinaryOperator::LogicalXor,
        "==" => BinaryOperator::Eq,
        "!=" | "<>" => BinaryOperator::Ne,
        "===" => BinaryOperator::Identical,
        "!==" => BinaryOperator::NotIdentical,
        "<" => BinaryOperator::Lt,
        "<=" => BinaryOperator::Le,
        ">" => BinaryOperator::Gt,
        ">=" => BinaryOperator::Ge,
        "<=>" => BinaryOperator::Spaceship,
        "??" => BinaryOperator::Coalesce,
        _ => return None,
    };
    Some(op)
}

fn join_spans(first: Option<&Span>, last: Option<&Span>) -> Option<Span> {
    match (first, last) {
        (Some(a), Some(b)) => Some(Span::new(a.start.clone(), b.end.clone())),
        (Some(a), None) => Some(a.clone()),
        (None, b) => b.cloned(),
    }
}

fn parse_prefix_op(op: Pair<Rule>, rhs: AstNode, script: &script::Script) -> ParseResult {
    let location = rules::get_location_from_pair(&op, script);
    let span = join_spans(rules::get_span_from_pair(&op, script).as_ref(), rhs.get_span());
    let expr = Box::new(rhs);
    let kind = match op.as_rule() {
        Rule::cast => {
            let ty = match op.clone().into_inner().next().map(|p| p.as_str().to_ascii_lowercase()) {
                Some(t) if t == "int" || t == "integer" => CastType::Int,
                Some(t) if t == "bool" || t == "boolean" => CastType::Bool,
                Some(t) if t == "float" || t == "double" || t == "real" => CastType::Float,
                Some(t) if t == "string" || t == "binary" => CastType::String,
                Some(t) if t == "array" => CastType::Array,
                Some(t) if t == "object" => CastType::Object,
                Some(t) if t == "unset" => CastType::Unset,
                _ => {
                    return Err(syntax_error(
                        format!("Unknown cast '{}'.", op.as_str()),
                        "phptac.expr.parse_prefix_op",
                        &location,
                        &span,
                    ));
                }
            };
            AstNodeKind::Cast { ty, expr }
        }
        Rule::pre_inc => AstNodeKind::UnaryOp { op: UnaryOperator::PreInc, expr },
        Rule::pre_dec => AstNodeKind::UnaryOp { op: UnaryOperator::PreDec, expr },
        Rule::op_neg => AstNodeKind::UnaryOp { op: UnaryOperator::Minus, expr },
        Rule::op_pos => AstNodeKind::UnaryOp { op: UnaryOperator::Plus, expr },
        Rule::op_not => AstNodeKind::UnaryOp { op: UnaryOperator::Not, expr },
        Rule::op_bit_not => AstNodeKind::UnaryOp { op: UnaryOperator::BitNot, expr },
        Rule::op_silence => AstNodeKind::UnaryOp { op: UnaryOperator::Silence, expr },
        Rule::op_clone => AstNodeKind::Clone { expr },
        Rule::op_print => AstNodeKind::Print { expr },
        Rule::op_yield => AstNodeKind::Yield { value: Some(expr) },
        Rule::op_yield_from => AstNodeKind::YieldFrom { expr },
        Rule::op_include => {
            let word = op.as_str().to_ascii_lowercase();
            let kind = match word.as_str() {
                "include_once" => IncludeKind::IncludeOnce,
                "require" => IncludeKind::Require,
                "require_once" => IncludeKind::RequireOnce,
                _ => IncludeKind::Include,
            };
            AstNodeKind::Include { kind, expr }
        }
        other => {
            return Err(syntax_error(
                format!("Unexpected prefix operator {:?}.", other),
                "phptac.expr.parse_prefix_op",
                &location,
                &span,
            ));
        }
    };
    Ok(AstNode::new(kind, location, span))
}

fn parse_postfix_op(lhs: AstNode, op: Pair<Rule>, script: &script::Script) -> ParseResult {
    let location = lhs.location.clone();
    let span = join_spans(lhs.get_span(), rules::get_span_from_pair(&op, script).as_ref());
    let kind = match op.as_rule() {
        Rule::post_inc => AstNodeKind::UnaryOp { op: UnaryOperator::PostInc, expr: Box::new(lhs) },
        Rule::post_dec => AstNodeKind::UnaryOp { op: UnaryOperator::PostDec, expr: Box::new(lhs) },
        Rule::instanceof_op => {
            let (mut inner_pairs, op_location, op_span) = rules::get_data_from_rule(&op, script);
            let class_pair = rules::fetch_next_pair(&mut inner_pairs, &op_location, &op_span)?;
            AstNodeKind::InstanceOf {
                expr: Box::new(lhs),
                class: Box::new(parse_class_ref_rule(class_pair, script)?),
            }
        }
        other => {
            return Err(syntax_error(
                format!("Unexpected postfix operator {:?}.", other),
                "phptac.expr.parse_postfix_op",
                &location,
                &span,
            ));
        }
    };
    Ok(AstNode::new(kind, location, span))
}

fn parse_infix_op(
    lhs: AstNode,
    op: Pair<Rule>,
    rhs: AstNode,
    script: &script::Script,
) -> ParseResult {
    let location = lhs.location.clone();
    let span = join_spans(lhs.get_span(), rhs.get_span());
    let token = op.as_str().trim();
    let kind = match op.as_rule() {
        Rule::op_assign if token == "=" => AstNodeKind::Assign {
            target: Box::new(lhs),
            value: Box::new(rhs),
        },
        Rule::op_assign => {
            let base = &token[..token.len() - 1];
            let op = binary_operator_from_token(base).ok_or_else(|| {
                syntax_error(
                    format!("Unknown compound assignment '{}'.", token),
                    "phptac.expr.parse_infix_op",
                    &location,
                    &span,
                )
            })?;
            AstNodeKind::AssignOp {
                op,
                target: Box::new(lhs),
                value: Box::new(rhs),
            }
        }
        Rule::op_assign_ref => AstNodeKind::AssignRef {
            target: Box::new(lhs),
            value: Box::new(rhs),
        },
        Rule::op_ternary => {
            let then_expr = match op.clone().into_inner().next() {
                Some(middle) => Some(Box::new(parse_expression_rule(middle, script)?)),
                None => None,
            };
            AstNodeKind::Ternary {
                condition: Box::new(lhs),
                then_expr,
                else_expr: Box::new(rhs),
            }
        }
        _ => {
            let op = binary_operator_from_token(token).ok_or_else(|| {
                syntax_error(
                    format!("Unknown binary operator '{}'.", token),
                    "phptac.expr.parse_infix_op",
                    &location,
                    &span,
                )
            })?;
            AstNodeKind::BinaryOp {
                left: Box::new(lhs),
                op,
                right: Box::new(rhs),
            }
        }
    };
    Ok(AstNode::new(kind, location, span))
}

/// A bare name only becomes a constant fetch once it is known not to be a
/// callee or a class reference.
fn into_value(node: AstNode) -> AstNode {
    match node.kind {
        AstNodeKind::Name { .. } => {
            let location = node.location.clone();
            let span = node.span.clone();
            AstNode::new(AstNodeKind::ConstFetch { name: Box::new(node) }, location, span)
        }
        _ => node,
    }
}

fn parse_operand_rule(pair: Pair<Rule>, script: &script::Script) -> ParseResult {
    let (mut inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let atom = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    let mut node = parse_atom_rule(atom, script)?;

    let mut accessors = inner_pairs.peekable();
    while let Some(accessor) = accessors.next() {
        let accessor_span = rules::get_span_from_pair(&accessor, script);
        let mut node_span = join_spans(span.as_ref(), accessor_span.as_ref());
        let kind = match accessor.as_rule() {
            Rule::call_args => AstNodeKind::Call {
                callee: Box::new(node),
                args: parse_call_args_rule(accessor, script)?,
            },
            Rule::dim_access => {
                let index = match accessor.clone().into_inner().next() {
                    Some(expr) => Some(Box::new(parse_expression_rule(expr, script)?)),
                    None => None,
                };
                AstNodeKind::ArrayDimFetch {
                    base: Box::new(into_value(node)),
                    index,
                }
            }
            Rule::prop_access | Rule::nullsafe_access => {
                let nullsafe = accessor.as_rule() == Rule::nullsafe_access;
                let (mut member_pairs, member_location, member_span) =
                    rules::get_data_from_rule(&accessor, script);
                let member_pair = rules::fetch_next_pair(&mut member_pairs, &member_location, &member_span)?;
                let member = parse_member_name_rule(member_pair, script)?;
                match accessors.next_if(|next| next.as_rule() == Rule::call_args) {
                    Some(call) => {
                        node_span = join_spans(span.as_ref(), rules::get_span_from_pair(&call, script).as_ref());
                        AstNodeKind::MethodCall {
                            object: Box::new(into_value(node)),
                            method: Box::new(member),
                            args: parse_call_args_rule(call, script)?,
                            nullsafe,
                        }
                    }
                    None => AstNodeKind::PropertyFetch {
                        object: Box::new(into_value(node)),
                        property: Box::new(member),
                        nullsafe,
                    },
                }
            }
            Rule::static_member => {
                let (mut member_pairs, member_location, member_span) =
                    rules::get_data_from_rule(&accessor, script);
                let member_pair = rules::fetch_next_pair(&mut member_pairs, &member_location, &member_span)?;
                let is_property = member_pair.as_rule() == Rule::variable;
                let member = parse_member_name_rule(member_pair, script)?;
                match accessors.next_if(|next| next.as_rule() == Rule::call_args) {
                    Some(call) => {
                        node_span = join_spans(span.as_ref(), rules::get_span_from_pair(&call, script).as_ref());
                        AstNodeKind::StaticCall {
                            class: Box::new(node),
                            method: Box::new(member),
                            args: parse_call_args_rule(call, script)?,
                        }
                    }
                    None if is_property => AstNodeKind::StaticPropertyFetch {
                        class: Box::new(node),
                        property: Box::new(member),
                    },
                    None => AstNodeKind::ClassConstFetch {
                        class: Box::new(node),
                        name: Box::new(member),
                    },
                }
            }
            other => {
                return Err(syntax_error(
                    format!("Unexpected accessor {:?}.", other),
                    "phptac.expr.parse_operand_rule",
                    &location,
                    &span,
                ));
            }
        };
        node = AstNode::new(kind, location.clone(), node_span);
    }

    Ok(into_value(node))
}

/// `identifier`, `variable` or `{expr}` after `->`, `?->` or `::`.
fn parse_member_name_rule(pair: Pair<Rule>, script: &script::Script) -> ParseResult {
    let location = rules::get_location_from_pair(&pair, script);
    let span = rules::get_span_from_pair(&pair, script);
    match pair.as_rule() {
        Rule::member_name | Rule::brace_expr => {
            let (mut inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
            let inner = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
            match inner.as_rule() {
                Rule::expr => parse_expression_rule(inner, script),
                _ => parse_member_name_rule(inner, script),
            }
        }
        Rule::identifier => Ok(AstNode::new(
            AstNodeKind::Identifier { name: pair.as_str().to_string() },
            location,
            span,
        )),
        Rule::variable => Ok(variable_node(&pair, script)),
        other => Err(syntax_error(
            format!("Unexpected member name {:?}.", other),
            "phptac.expr.parse_member_name_rule",
            &location,
            &span,
        )),
    }
}

fn parse_call_args_rule(pair: Pair<Rule>, script: &script::Script) -> Result<Vec<AstNode>, Box<dyn TacErrorExt>> {
    let (inner_pairs, _, _) = rules::get_data_from_rule(&pair, script);
    inner_pairs.map(|arg| parse_argument_rule(arg, script)).collect()
}

fn parse_argument_rule(pair: Pair<Rule>, script: &script::Script) -> ParseResult {
    let (mut inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let inner = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    let (value, unpack, name) = match inner.as_rule() {
        Rule::spread_arg => {
            let (mut spread, loc, sp) = rules::get_data_from_rule(&inner, script);
            let expr = rules::fetch_next_pair(&mut spread, &loc, &sp)?;
            (parse_expression_rule(expr, script)?, true, None)
        }
        Rule::named_arg => {
            let (mut named, loc, sp) = rules::get_data_from_rule(&inner, script);
            let label = rules::fetch_next_pair(&mut named, &loc, &sp)?.as_str().to_string();
            let expr = rules::fetch_next_pair(&mut named, &loc, &sp)?;
            (parse_expression_rule(expr, script)?, false, Some(label))
        }
        _ => (parse_expression_rule(inner, script)?, false, None),
    };
    Ok(AstNode::new(
        AstNodeKind::Argument {
            value: Box::new(value),
            unpack,
            by_ref: false,
            name,
        },
        location,
        span,
    ))
}

fn variable_node(pair: &Pair<Rule>, script: &script::Script) -> AstNode {
    AstNode::new(
        AstNodeKind::Variable { name: pair.as_str().trim_start_matches('$').to_string() },
        rules::get_location_from_pair(pair, script),
        rules::get_span_from_pair(pair, script),
    )
}

pub(crate) fn name_node(pair: &Pair<Rule>, script: &script::Script) -> AstNode {
    let text = pair.as_str();
    AstNode::new(
        AstNodeKind::Name {
            parts: text.split('\\').filter(|p| !p.is_empty()).map(str::to_string).collect(),
            fully_qualified: text.starts_with('\\'),
        },
        rules::get_location_from_pair(pair, script),
        rules::get_span_from_pair(pair, script),
    )
}

fn parse_atom_rule(pair: Pair<Rule>, script: &script::Script) -> ParseResult {
    let (mut inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let kind = match pair.as_rule() {
        Rule::closure | Rule::arrow_fn => return parse_closure_rule(pair, script),
        Rule::new_expr => return parse_new_rule(pair, script),
        Rule::paren_expr => {
            let expr = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
            return parse_expression_rule(expr, script);
        }
        Rule::variable => return Ok(variable_node(&pair, script)),
        Rule::qualified_name => return Ok(name_node(&pair, script)),
        Rule::var_var => {
            let inner = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
            let expr = match inner.as_rule() {
                Rule::brace_expr => parse_member_name_rule(inner, script)?,
                _ => parse_atom_rule(inner, script)?,
            };
            AstNodeKind::VariableVariable { expr: Box::new(expr) }
        }
        Rule::isset_expr => AstNodeKind::Isset {
            vars: inner_pairs
                .map(|expr| parse_expression_rule(expr, script))
                .collect::<Result<Vec<_>, _>>()?,
        },
        Rule::empty_expr => {
            let expr = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
            AstNodeKind::Empty { expr: Box::new(parse_expression_rule(expr, script)?) }
        }
        Rule::eval_expr => {
            let expr = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
            AstNodeKind::Eval { expr: Box::new(parse_expression_rule(expr, script)?) }
        }
        Rule::exit_expr => AstNodeKind::Exit {
            expr: match inner_pairs.next() {
                Some(expr) => Some(Box::new(parse_expression_rule(expr, script)?)),
                None => None,
            },
        },
        Rule::list_expr => {
            let items = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
            AstNodeKind::List { items: parse_array_items_rule(items, script)? }
        }
        Rule::array_long | Rule::array_literal => {
            let items = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
            AstNodeKind::Array { items: parse_array_items_rule(items, script)? }
        }
        Rule::magic_const => AstNodeKind::MagicConst { name: pair.as_str().to_string() },
        Rule::float => {
            let text = pair.as_str().replace('_', "");
            let value = text.parse::<f64>().map_err(|e| {
                syntax_error(
                    format!("Invalid float literal '{}': {}", pair.as_str(), e),
                    "phptac.expr.parse_atom_rule",
                    &location,
                    &span,
                )
            })?;
            AstNodeKind::Float { value }
        }
        Rule::integer => parse_integer_literal(pair.as_str()).ok_or_else(|| {
            syntax_error(
                format!("Invalid integer literal '{}'.", pair.as_str()),
                "phptac.expr.parse_atom_rule",
                &location,
                &span,
            )
        })?,
        Rule::string_single => {
            let raw = pair.as_str();
            AstNodeKind::String { value: unescape_single(&raw[1..raw.len() - 1]) }
        }
        Rule::string_double | Rule::heredoc => {
            let parts = parse_interpolated_parts(inner_pairs, script)?;
            if parts.iter().all(|p| matches!(p.kind, AstNodeKind::StringPart { .. })) {
                let raw: String = parts
                    .iter()
                    .filter_map(|p| match &p.kind {
                        AstNodeKind::StringPart { value } => Some(value.as_str()),
                        _ => None,
                    })
                    .collect();
                AstNodeKind::String { value: unescape_double(&raw) }
            } else {
                AstNodeKind::Interpolated { parts }
            }
        }
        Rule::nowdoc => AstNodeKind::String {
            value: inner_pairs
                .find(|p| p.as_rule() == Rule::nowdoc_text)
                .map(|p| p.as_str().to_string())
                .unwrap_or_default(),
        },
        Rule::shell_exec => AstNodeKind::ShellExec {
            parts: parse_interpolated_parts(inner_pairs, script)?,
        },
        other => {
            return Err(syntax_error(
                format!("Unexpected expression {:?}.", other),
                "phptac.expr.parse_atom_rule",
                &location,
                &span,
            ));
        }
    };
    Ok(AstNode::new(kind, location, span))
}

/// PHP integer literal, falling back to a float when it overflows `i64`
/// the way the engine does.
fn parse_integer_literal(text: &str) -> Option<AstNodeKind> {
    let digits = text.replace('_', "");
    let lower = digits.to_ascii_lowercase();
    let (body, radix) = if let Some(hex) = lower.strip_prefix("0x") {
        (hex.to_string(), 16)
    } else if let Some(bin) = lower.strip_prefix("0b") {
        (bin.to_string(), 2)
    } else if let Some(oct) = lower.strip_prefix("0o") {
        (oct.to_string(), 8)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (lower[1..].to_string(), 8)
    } else {
        (lower, 10)
    };
    match i64::from_str_radix(&body, radix) {
        Ok(value) => Some(AstNodeKind::Integer { value }),
        Err(_) => u128::from_str_radix(&body, radix)
            .ok()
            .map(|value| AstNodeKind::Float { value: value as f64 }),
    }
}

fn unescape_single(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if next == '\\' || next == '\'' {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

fn unescape_double(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('v') => out.push('\u{0B}'),
            Some('e') => out.push('\u{1B}'),
            Some('f') => out.push('\u{0C}'),
            Some('\\') => out.push('\\'),
            Some('$') => out.push('$'),
            Some('"') => out.push('"'),
            Some('x') if chars.peek().is_some_and(|h| h.is_ascii_hexdigit()) => {
                let mut hex = String::new();
                while hex.len() < 2 && chars.peek().is_some_and(|h| h.is_ascii_hexdigit()) {
                    hex.extend(chars.next());
                }
                out.extend(u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32));
            }
            Some(d) if d.is_digit(8) => {
                let mut oct = d.to_string();
                while oct.len() < 3 && chars.peek().is_some_and(|o| o.is_digit(8)) {
                    oct.extend(chars.next());
                }
                out.extend(u32::from_str_radix(&oct, 8).ok().and_then(char::from_u32));
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Text runs stay raw (escapes untouched); embedded variables and `{$expr}`
/// blocks become expression nodes.
fn parse_interpolated_parts(
    pairs: rules::Inner,
    script: &script::Script,
) -> Result<Vec<AstNode>, Box<dyn TacErrorExt>> {
    let mut parts = Vec::new();
    for part in pairs {
        let location = rules::get_location_from_pair(&part, script);
        let span = rules::get_span_from_pair(&part, script);
        match part.as_rule() {
            Rule::dq_text | Rule::hd_text | Rule::bt_text => parts.push(AstNode::new(
                AstNodeKind::StringPart { value: part.as_str().to_string() },
                location,
                span,
            )),
            Rule::brace_interp => {
                let (mut inner_pairs, loc, sp) = rules::get_data_from_rule(&part, script);
                let expr = rules::fetch_next_pair(&mut inner_pairs, &loc, &sp)?;
                parts.push(parse_expression_rule(expr, script)?);
            }
            Rule::simple_interp => parts.push(parse_simple_interp_rule(part, script)?),
            // heredoc label
            _ => {}
        }
    }
    Ok(parts)
}

fn parse_simple_interp_rule(pair: Pair<Rule>, script: &script::Script) -> ParseResult {
    let (mut inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let var = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    let base = variable_node(&var, script);
    let Some(suffix) = inner_pairs.next() else {
        return Ok(base);
    };
    let (mut suffix_pairs, suffix_location, suffix_span) = rules::get_data_from_rule(&suffix, script);
    let key = rules::fetch_next_pair(&mut suffix_pairs, &suffix_location, &suffix_span)?;
    let key_location = rules::get_location_from_pair(&key, script);
    let key_span = rules::get_span_from_pair(&key, script);
    let kind = match (suffix.as_rule(), key.as_rule()) {
        (Rule::interp_prop, _) => AstNodeKind::PropertyFetch {
            object: Box::new(base),
            property: Box::new(AstNode::new(
                AstNodeKind::Identifier { name: key.as_str().to_string() },
                key_location,
                key_span,
            )),
            nullsafe: false,
        },
        (_, Rule::variable) => AstNodeKind::ArrayDimFetch {
            base: Box::new(base),
            index: Some(Box::new(variable_node(&key, script))),
        },
        (_, Rule::interp_offset) => AstNodeKind::ArrayDimFetch {
            base: Box::new(base),
            index: Some(Box::new(AstNode::new(
                parse_integer_literal(key.as_str()).unwrap_or(AstNodeKind::String {
                    value: key.as_str().to_string(),
                }),
                key_location,
                key_span,
            ))),
        },
        _ => AstNodeKind::ArrayDimFetch {
            base: Box::new(base),
            index: Some(Box::new(AstNode::new(
                AstNodeKind::String { value: key.as_str().to_string() },
                key_location,
                key_span,
            ))),
        },
    };
    Ok(AstNode::new(kind, location, span))
}

fn parse_array_items_rule(
    pair: Pair<Rule>,
    script: &script::Script,
) -> Result<Vec<Option<AstNode>>, Box<dyn TacErrorExt>> {
    let (inner_pairs, _, _) = rules::get_data_from_rule(&pair, script);
    let mut items = Vec::new();
    for slot in inner_pairs {
        match slot.into_inner().next() {
            Some(item) => items.push(Some(parse_array_item_rule(item, script)?)),
            None => items.push(None),
        }
    }
    // A trailing comma leaves an empty final slot that is not an element.
    if matches!(items.last(), Some(None)) {
        items.pop();
    }
    Ok(items)
}

fn parse_array_item_rule(pair: Pair<Rule>, script: &script::Script) -> ParseResult {
    let (mut inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let first = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    let kind = match first.as_rule() {
        Rule::spread_item | Rule::ref_item => {
            let unpack = first.as_rule() == Rule::spread_item;
            let (mut item_pairs, loc, sp) = rules::get_data_from_rule(&first, script);
            let expr = item_pairs
                .find(|p| p.as_rule() == Rule::expr)
                .ok_or_else(|| syntax_error("Array element without a value.", "phptac.expr.parse_array_item_rule", &loc, &sp))?;
            AstNodeKind::ArrayItem {
                key: None,
                value: Box::new(parse_expression_rule(expr, script)?),
                by_ref: !unpack,
                unpack,
            }
        }
        _ => {
            let first_expr = parse_expression_rule(first, script)?;
            match inner_pairs.next() {
                Some(array_value) => {
                    let by_ref = rules::has_keyword(&array_value, Rule::by_ref);
                    let (mut value_pairs, loc, sp) = rules::get_data_from_rule(&array_value, script);
                    let expr = value_pairs
                        .find(|p| p.as_rule() == Rule::expr)
                        .ok_or_else(|| syntax_error("Array key without a value.", "phptac.expr.parse_array_item_rule", &loc, &sp))?;
                    AstNodeKind::ArrayItem {
                        key: Some(Box::new(first_expr)),
                        value: Box::new(parse_expression_rule(expr, script)?),
                        by_ref,
                        unpack: false,
                    }
                }
                None => AstNodeKind::ArrayItem {
                    key: None,
                    value: Box::new(first_expr),
                    by_ref: false,
                    unpack: false,
                },
            }
        }
    };
    Ok(AstNode::new(kind, location, span))
}

pub(crate) fn parse_class_ref_rule(pair: Pair<Rule>, script: &script::Script) -> ParseResult {
    let (mut inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let inner = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    match inner.as_rule() {
        Rule::qualified_name => Ok(name_node(&inner, script)),
        Rule::paren_expr => parse_atom_rule(inner, script),
        Rule::dynamic_class => {
            let (mut parts, loc, sp) = rules::get_data_from_rule(&inner, script);
            let base = rules::fetch_next_pair(&mut parts, &loc, &sp)?;
            let mut node = parse_atom_rule(base, script)?;
            for accessor in parts {
                let node_span = join_spans(sp.as_ref(), rules::get_span_from_pair(&accessor, script).as_ref());
                let kind = match accessor.as_rule() {
                    Rule::dim_access => AstNodeKind::ArrayDimFetch {
                        base: Box::new(node),
                        index: match accessor.clone().into_inner().next() {
                            Some(expr) => Some(Box::new(parse_expression_rule(expr, script)?)),
                            None => None,
                        },
                    },
                    Rule::static_member => {
                        let member = rules::fetch_next_pair(
                            &mut rules::get_data_from_rule(&accessor, script).0,
                            &loc,
                            &sp,
                        )?;
                        AstNodeKind::StaticPropertyFetch {
                            class: Box::new(node),
                            property: Box::new(parse_member_name_rule(member, script)?),
                        }
                    }
                    _ => {
                        let member = rules::fetch_next_pair(
                            &mut rules::get_data_from_rule(&accessor, script).0,
                            &loc,
                            &sp,
                        )?;
                        AstNodeKind::PropertyFetch {
                            object: Box::new(node),
                            property: Box::new(parse_member_name_rule(member, script)?),
                            nullsafe: accessor.as_rule() == Rule::nullsafe_access,
                        }
                    }
                };
                node = AstNode::new(kind, loc.clone(), node_span);
            }
            Ok(node)
        }
        other => Err(syntax_error(
            format!("Unexpected class reference {:?}.", other),
            "phptac.expr.parse_class_ref_rule",
            &location,
            &span,
        )),
    }
}

fn parse_new_rule(pair: Pair<Rule>, script: &script::Script) -> ParseResult {
    let (mut inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let target = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    let (class, args) = match target.as_rule() {
        Rule::anonymous_class => {
            let (class_pairs, class_location, class_span) = rules::get_data_from_rule(&target, script);
            let mut args = Vec::new();
            let mut extends = None;
            let mut implements = Vec::new();
            let mut members = Vec::new();
            for part in class_pairs {
                match part.as_rule() {
                    Rule::call_args => args = parse_call_args_rule(part, script)?,
                    Rule::extends_clause => extends = Some(Box::new(stmt::parse_extends_clause_rule(part, script)?)),
                    Rule::implements_clause => implements = stmt::parse_name_list_rule(part, script)?,
                    Rule::class_body => members = stmt::parse_class_body_rule(part, script)?,
                    _ => {}
                }
            }
            let class = AstNode::new(
                AstNodeKind::ClassDecl {
                    name: None,
                    modifiers: Vec::new(),
                    extends,
                    implements,
                    members,
                },
                class_location,
                class_span,
            );
            (class, args)
        }
        _ => {
            let class = parse_class_ref_rule(target, script)?;
            let args = match inner_pairs.next() {
                Some(call) => parse_call_args_rule(call, script)?,
                None => Vec::new(),
            };
            (class, args)
        }
    };
    Ok(AstNode::new(
        AstNodeKind::New { class: Box::new(class), args },
        location,
        span,
    ))
}

fn parse_closure_rule(pair: Pair<Rule>, script: &script::Script) -> ParseResult {
    let is_static = rules::has_keyword(&pair, Rule::kw_static);
    let arrow = pair.as_rule() == Rule::arrow_fn;
    let (inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);

    let mut by_ref = false;
    let mut params = Vec::new();
    let mut uses = Vec::new();
    let mut body = Vec::new();
    for part in inner_pairs {
        match part.as_rule() {
            Rule::by_ref => by_ref = true,
            Rule::param_list => params = stmt::parse_param_list_rule(part, script)?,
            Rule::closure_uses => {
                for closure_use in rules::get_data_from_rule(&part, script).0 {
                    let use_by_ref = rules::has_keyword(&closure_use, Rule::by_ref);
                    let use_location = rules::get_location_from_pair(&closure_use, script);
                    let use_span = rules::get_span_from_pair(&closure_use, script);
                    let var = closure_use
                        .clone()
                        .into_inner()
                        .find(|p| p.as_rule() == Rule::variable)
                        .ok_or_else(|| syntax_error("Closure use without a variable.", "phptac.expr.parse_closure_rule", &use_location, &use_span))?;
                    uses.push(AstNode::new(
                        AstNodeKind::ClosureUse {
                            var: Box::new(variable_node(&var, script)),
                            by_ref: use_by_ref,
                        },
                        use_location,
                        use_span,
                    ));
                }
            }
            Rule::block => body = stmt::parse_block_rule(part, script)?,
            Rule::expr => {
                let value = parse_expression_rule(part.clone(), script)?;
                body = vec![AstNode::new(
                    AstNodeKind::Return { value: Some(Box::new(value)) },
                    rules::get_location_from_pair(&part, script),
                    rules::get_span_from_pair(&part, script),
                )];
            }
            // return type
            _ => {}
        }
    }

    Ok(AstNode::new(
        AstNodeKind::Closure {
            params,
            uses,
            body,
            by_ref,
            is_static,
            arrow,
        },
        location,
        span,
    ))
}
