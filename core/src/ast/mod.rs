//! file: core/src/ast/mod.rs
//! description: PHP source to `AstNode` tree.

pub mod err;
pub mod expr;
pub mod kind;
pub mod node;
pub mod printer;
pub mod rules;
pub mod stmt;

use pest::Parser;
use pest::iterators::Pairs;
use pest::Token;

pub use crate::error::TacErrorExt;
use crate::config::LowerOptions;
use crate::location::{Location, Span};
pub use kind::{AstNodeKind, BinaryOperator, CastType, IncludeKind, UnaryOperator};
pub use node::{AstNode, NodeId};
pub use rules::{Rule, RulesParser};

/// Parses a whole PHP file into a `Script` node, with the default nesting
/// limit.
///
/// A file without any PHP code (empty, or only inline HTML) is valid and
/// yields a script whose body holds at most one `InlineHtml` statement.
pub fn generate_ast_from_source(script: &crate::script::Script) -> Result<AstNode, Box<dyn TacErrorExt>> {
    generate_ast_with_depth_limit(script, LowerOptions::default().max_depth)
}

/// Like `generate_ast_from_source`, rejecting files whose statements and
/// expressions nest deeper than `max_depth` before any tree is built.
pub fn generate_ast_with_depth_limit(
    script: &crate::script::Script,
    max_depth: usize,
) -> Result<AstNode, Box<dyn TacErrorExt>> {
    log::debug!("parsing {}", script.name);
    let mut pairs = RulesParser::parse(Rule::script, &script.content).map_err(|e| {
        Box::<dyn TacErrorExt>::from(Box::new(err::SyntaxError::from_pest(e, &script.name)))
    })?;
    check_nesting(&pairs, max_depth, &script.name)?;
    match pairs.next() {
        Some(root) => stmt::parse_script_rule(root, script),
        None => Ok(AstNode::new(AstNodeKind::Script { body: Vec::new() }, None, None)),
    }
}

/// Operator tokens; each one adds a level to the tree of its expression.
fn is_operator(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::cast
            | Rule::pre_inc
            | Rule::pre_dec
            | Rule::op_neg
            | Rule::op_pos
            | Rule::op_not
            | Rule::op_bit_not
            | Rule::op_silence
            | Rule::op_clone
            | Rule::op_print
            | Rule::op_yield_from
            | Rule::op_yield
            | Rule::op_include
            | Rule::post_inc
            | Rule::post_dec
            | Rule::instanceof_op
            | Rule::op_assign_ref
            | Rule::op_assign
            | Rule::op_coalesce
            | Rule::op_ternary
            | Rule::op_bool_or
            | Rule::op_bool_and
            | Rule::op_equality
            | Rule::op_compare
            | Rule::op_shift
            | Rule::op_pow
            | Rule::op_bit_or
            | Rule::op_bit_xor
            | Rule::op_bit_and
            | Rule::op_concat
            | Rule::op_additive
            | Rule::op_multiplicative
            | Rule::op_or_kw
            | Rule::op_xor_kw
            | Rule::op_and_kw
    )
}

/// Walks the flat token stream of a parse and fails once statement and
/// expression nesting passes `max_depth`. No recursion, so it is safe on
/// input the tree builders would overflow on.
fn check_nesting(pairs: &Pairs<Rule>, max_depth: usize, file: &str) -> Result<(), Box<dyn TacErrorExt>> {
    let mut depth = 0usize;
    // operators seen so far in each open expression
    let mut operators: Vec<usize> = Vec::new();
    for token in pairs.clone().tokens() {
        match token {
            Token::Start { rule, pos } => {
                match rule {
                    Rule::statement => depth += 1,
                    Rule::expr => {
                        depth += 1;
                        operators.push(0);
                    }
                    _ if is_operator(rule) => {
                        if let Some(count) = operators.last_mut() {
                            *count += 1;
                            depth += 1;
                        }
                    }
                    _ => continue,
                }
                if depth > max_depth {
                    let (line, column) = pos.line_col();
                    let location = Location::new(file.to_string(), line, column);
                    return Err(err::syntax_error(
                        format!("Nesting limit of {} exceeded", max_depth),
                        "phptac.ast.check_nesting",
                        &Some(location.clone()),
                        &Some(Span::new(location.clone(), location)),
                    ));
                }
            }
            Token::End { rule, .. } => match rule {
                Rule::statement => depth = depth.saturating_sub(1),
                Rule::expr => depth = depth.saturating_sub(1 + operators.pop().unwrap_or(0)),
                _ => {}
            },
        }
    }
    Ok(())
}
