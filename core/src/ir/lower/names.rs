//! file: core/src/ir/lower/names.rs
//! description: rendering of name-like nodes.

use crate::ast::{AstNode, AstNodeKind, printer};
use crate::ir::instr::Instruction;

use super::err::LowerResult;
use super::lower_expr::lower_expr;
use super::lowering_context::LoweringContext;

/// Identifier text, the last segment of a qualified name, or the lowered
/// value of a dynamic name whose effects are appended to `effects`.
/// A node resolved before yields `""`.
pub fn resolve_name(
    node: &AstNode,
    effects: &mut Vec<Instruction>,
    ctx: &mut LoweringContext,
) -> LowerResult<String> {
    match node.get_kind() {
        AstNodeKind::Identifier { name } => {
            if !ctx.enter(node.get_id()) {
                return Ok(String::new());
            }
            Ok(name.clone())
        }
        AstNodeKind::Name { parts, .. } => {
            if !ctx.enter(node.get_id()) {
                return Ok(String::new());
            }
            Ok(parts.last().cloned().unwrap_or_default())
        }
        _ => {
            let lowered = lower_expr(Some(node), ctx)?;
            effects.extend(lowered.effects);
            Ok(lowered.value)
        }
    }
}

/// Like `resolve_name` but keeps every namespace segment. Used where the
/// listing names a declaration's parents or an import.
pub fn resolve_full_name(
    node: &AstNode,
    effects: &mut Vec<Instruction>,
    ctx: &mut LoweringContext,
) -> LowerResult<String> {
    match node.get_kind() {
        AstNodeKind::Name { parts, fully_qualified } => {
            if !ctx.enter(node.get_id()) {
                return Ok(String::new());
            }
            Ok(printer::print_name(parts, *fully_qualified))
        }
        _ => resolve_name(node, effects, ctx),
    }
}

/// Member after `->` or `::`. Dynamic members other than plain variables
/// are wrapped in braces.
pub fn resolve_member(
    node: &AstNode,
    effects: &mut Vec<Instruction>,
    ctx: &mut LoweringContext,
) -> LowerResult<String> {
    match node.get_kind() {
        AstNodeKind::Identifier { .. } | AstNodeKind::Name { .. } | AstNodeKind::Variable { .. } => {
            resolve_name(node, effects, ctx)
        }
        _ => {
            let value = resolve_name(node, effects, ctx)?;
            Ok(format!("{{{}}}", value))
        }
    }
}
