//! file: core/src/ir/lower/lower_stmt.rs
//! description: statement lowering and control-flow linearization.
//!
//! Structured control flow is flattened into labels, `goto` and
//! `if (c) goto` lines. Loops register their exit and continue labels on
//! the context's frame stack so `break`/`continue` resolve to real targets.

use crate::ast::{AstNode, AstNodeKind};
use crate::ir::instr::Instruction;

use super::err::{LowerResult, LoweringError};
use super::lower_expr::{lower_expr, lower_into};
use super::lowering_context::{BreakFrame, LoweringContext};
use super::lower_objects;
use super::names::{resolve_full_name, resolve_name};

pub fn lower_all(stmts: &[AstNode], ctx: &mut LoweringContext) -> LowerResult<Vec<Instruction>> {
    let mut out = Vec::new();
    for stmt in stmts {
        out.extend(lower_stmt(stmt, ctx)?);
    }
    Ok(out)
}

fn is_statement(kind: &AstNodeKind) -> bool {
    matches!(
        kind,
        AstNodeKind::Script { .. }
            | AstNodeKind::ExpressionStmt { .. }
            | AstNodeKind::Echo { .. }
            | AstNodeKind::Return { .. }
            | AstNodeKind::Block { .. }
            | AstNodeKind::If { .. }
            | AstNodeKind::While { .. }
            | AstNodeKind::DoWhile { .. }
            | AstNodeKind::For { .. }
            | AstNodeKind::Foreach { .. }
            | AstNodeKind::Switch { .. }
            | AstNodeKind::Break { .. }
            | AstNodeKind::Continue { .. }
            | AstNodeKind::TryCatch { .. }
            | AstNodeKind::Throw { .. }
            | AstNodeKind::Global { .. }
            | AstNodeKind::Static { .. }
            | AstNodeKind::Unset { .. }
            | AstNodeKind::Const { .. }
            | AstNodeKind::Declare { .. }
            | AstNodeKind::Namespace { .. }
            | AstNodeKind::Use { .. }
            | AstNodeKind::Goto { .. }
            | AstNodeKind::Label { .. }
            | AstNodeKind::InlineHtml { .. }
            | AstNodeKind::Nop
            | AstNodeKind::FunctionDecl { .. }
            | AstNodeKind::ClassDecl { .. }
            | AstNodeKind::InterfaceDecl { .. }
            | AstNodeKind::TraitDecl { .. }
            | AstNodeKind::MethodDecl { .. }
            | AstNodeKind::PropertyDecl { .. }
            | AstNodeKind::ClassConst { .. }
            | AstNodeKind::TraitUse { .. }
    )
}

/// Lowers one statement. Expressions are only accepted wrapped in an
/// expression statement; a statement lowered before contributes nothing.
pub fn lower_stmt(stmt: &AstNode, ctx: &mut LoweringContext) -> LowerResult<Vec<Instruction>> {
    if !is_statement(stmt.get_kind()) {
        return Err(LoweringError::unsupported_statement(stmt));
    }
    if !ctx.enter(stmt.get_id()) {
        return Ok(Vec::new());
    }
    log::debug!("lowering {}", stmt);
    ctx.descend(stmt)?;
    let out = lower_stmt_kind(stmt, ctx)?;
    ctx.ascend();
    Ok(out)
}

/// Effects of `expr` followed by its value as a line of its own. Values
/// that vanish (an include already emitted as an effect) add no line, and
/// neither does the bare temporary of a call.
pub(crate) fn lower_expression_statement(expr: &AstNode, ctx: &mut LoweringContext) -> LowerResult<Vec<Instruction>> {
    match expr.get_kind() {
        AstNodeKind::Assign { target, value } | AstNodeKind::AssignRef { target, value } => {
            if !ctx.enter(expr.get_id()) {
                return Ok(Vec::new());
            }
            let by_ref = matches!(expr.get_kind(), AstNodeKind::AssignRef { .. });
            let mut out = Vec::new();
            let target = lower_into(target, &mut out, ctx)?;
            let value = lower_into(value, &mut out, ctx)?;
            let amp = if by_ref { "&" } else { "" };
            out.push(Instruction::text(format!("{} = {}{};", target, amp, value)));
            Ok(out)
        }
        _ => {
            let lowered = lower_expr(Some(expr), ctx)?;
            let mut out = lowered.effects;
            if !lowered.value.is_empty() && !expr.get_kind().is_call() {
                out.push(Instruction::text(format!("{};", lowered.value)));
            }
            Ok(out)
        }
    }
}

fn join_values(nodes: &[AstNode], out: &mut Vec<Instruction>, ctx: &mut LoweringContext) -> LowerResult<String> {
    let mut values = Vec::with_capacity(nodes.len());
    for node in nodes {
        values.push(lower_into(node, out, ctx)?);
    }
    Ok(values.join(", "))
}

/// `name = value` pairs of `const` and `declare`.
pub(crate) fn lower_const_items(
    items: &[AstNode],
    out: &mut Vec<Instruction>,
    ctx: &mut LoweringContext,
) -> LowerResult<Vec<String>> {
    let mut rendered = Vec::with_capacity(items.len());
    for item in items {
        let AstNodeKind::ConstItem { name, value } = item.get_kind() else {
            return Err(LoweringError::unsupported_statement(item));
        };
        ctx.mark(item.get_id());
        let value = lower_into(value, out, ctx)?;
        rendered.push(format!("{} = {}", name, value));
    }
    Ok(rendered)
}

fn lower_jump(keyword: &str, levels: Option<u32>, ctx: &LoweringContext) -> Instruction {
    let is_break = keyword == "break";
    match ctx.break_frame(levels.unwrap_or(1)) {
        Some(BreakFrame::Loop { break_to, continue_to }) => {
            Instruction::goto(if is_break { break_to.clone() } else { continue_to.clone() })
        }
        // `continue` aimed at a switch acts like `break`.
        Some(BreakFrame::Switch) => Instruction::text("break;"),
        None => match levels {
            Some(n) => Instruction::text(format!("{} {};", keyword, n)),
            None => Instruction::text(format!("{};", keyword)),
        },
    }
}

fn lower_loop_body(
    body: &[AstNode],
    break_to: &str,
    continue_to: &str,
    ctx: &mut LoweringContext,
) -> LowerResult<Vec<Instruction>> {
    ctx.push_loop(break_to, continue_to);
    let lowered = lower_all(body, ctx);
    ctx.pop_frame();
    lowered
}

fn lower_stmt_kind(stmt: &AstNode, ctx: &mut LoweringContext) -> LowerResult<Vec<Instruction>> {
    let mut out = Vec::new();
    match stmt.get_kind() {
        AstNodeKind::Script { body } | AstNodeKind::Block { statements: body } => out.extend(lower_all(body, ctx)?),
        AstNodeKind::ExpressionStmt { expr } => out.extend(lower_expression_statement(expr, ctx)?),
        AstNodeKind::Echo { exprs } => {
            let values = join_values(exprs, &mut out, ctx)?;
            out.push(Instruction::text(format!("echo {};", values)));
        }
        AstNodeKind::Return { value } => match value {
            Some(value) => {
                let value = lower_into(value, &mut out, ctx)?;
                out.push(Instruction::text(format!("return {};", value)));
            }
            None => out.push(Instruction::text("return;")),
        },

        AstNodeKind::If { condition, then_branch, else_branch } => {
            let condition = lower_expr(Some(condition), ctx)?;
            let labels = ctx.new_label();
            let else_label = else_branch.as_ref().map(|_| ctx.new_label().start);
            out.extend(condition.effects);
            out.push(Instruction::if_goto(condition.value, labels.start.clone()));
            out.push(Instruction::goto(else_label.clone().unwrap_or_else(|| labels.end.clone())));
            out.push(Instruction::label(labels.start.clone()));
            out.extend(lower_all(then_branch, ctx)?);
            out.push(Instruction::goto(labels.end.clone()));
            if let (Some(else_branch), Some(else_label)) = (else_branch, else_label) {
                out.push(Instruction::label(else_label));
                out.extend(lower_all(else_branch, ctx)?);
                out.push(Instruction::goto(labels.end.clone()));
            }
            out.push(Instruction::label(labels.end));
        }
        AstNodeKind::While { condition, body } => {
            let labels = ctx.new_label();
            let body_label = ctx.new_label().start;
            out.push(Instruction::label(labels.start.clone()));
            let condition = lower_expr(Some(condition), ctx)?;
            out.extend(condition.effects.iter().cloned());
            out.push(Instruction::if_goto(condition.value.clone(), body_label.clone()));
            out.push(Instruction::goto(labels.end.clone()));
            out.push(Instruction::label(body_label.clone()));
            out.extend(lower_loop_body(body, &labels.end, &labels.start, ctx)?);
            // The condition is evaluated again at the tail with the same
            // instructions as the header.
            out.extend(condition.effects);
            out.push(Instruction::if_goto(condition.value, body_label));
            out.push(Instruction::goto(labels.end.clone()));
            out.push(Instruction::label(labels.end));
        }
        AstNodeKind::DoWhile { body, condition } => {
            let labels = ctx.new_label();
            let continue_label = ctx.new_label().start;
            out.push(Instruction::label(labels.start.clone()));
            out.extend(lower_loop_body(body, &labels.end, &continue_label, ctx)?);
            out.push(Instruction::label(continue_label));
            let condition = lower_expr(Some(condition), ctx)?;
            out.extend(condition.effects);
            out.push(Instruction::if_goto(condition.value, labels.start));
            out.push(Instruction::label(labels.end));
        }
        AstNodeKind::For { init, conditions, step, body } => {
            for expr in init {
                out.extend(lower_expression_statement(expr, ctx)?);
            }
            let labels = ctx.new_label();
            let body_label = ctx.new_label().start;
            let continue_label = ctx.new_label().start;
            out.push(Instruction::label(labels.start.clone()));
            let last = conditions.len().saturating_sub(1);
            for (i, condition) in conditions.iter().enumerate() {
                let condition = lower_expr(Some(condition), ctx)?;
                out.extend(condition.effects);
                if i == last {
                    out.push(Instruction::if_goto(condition.value, body_label.clone()));
                    out.push(Instruction::goto(labels.end.clone()));
                } else {
                    // Passing condition i falls through to condition i + 1.
                    let pass = ctx.new_label().end;
                    out.push(Instruction::if_goto(condition.value, pass.clone()));
                    out.push(Instruction::goto(labels.end.clone()));
                    out.push(Instruction::label(pass));
                }
            }
            out.push(Instruction::label(body_label));
            out.extend(lower_loop_body(body, &labels.end, &continue_label, ctx)?);
            out.push(Instruction::label(continue_label));
            for expr in step {
                out.extend(lower_expression_statement(expr, ctx)?);
            }
            out.push(Instruction::goto(labels.start));
            out.push(Instruction::label(labels.end));
        }
        AstNodeKind::Foreach { iterable, key, value, by_ref, body } => {
            let iterable = lower_into(iterable, &mut out, ctx)?;
            let key = match key {
                Some(key) => lower_into(key, &mut out, ctx)?,
                None => String::new(),
            };
            let value = lower_into(value, &mut out, ctx)?;
            let amp = if *by_ref { "&" } else { "" };
            let binding = if key.is_empty() {
                format!("{}{}", amp, value)
            } else {
                format!("{} => {}{}", key, amp, value)
            };
            let labels = ctx.new_label();
            let next_label = ctx.new_label().start;
            let test = Instruction::Foreach {
                iterable,
                binding,
                target: labels.start.clone(),
            };
            out.push(test.clone());
            out.push(Instruction::goto(labels.end.clone()));
            out.push(Instruction::label(labels.start.clone()));
            out.extend(lower_loop_body(body, &labels.end, &next_label, ctx)?);
            out.push(Instruction::label(next_label));
            out.push(test);
            out.push(Instruction::label(labels.end));
        }
        AstNodeKind::Switch { subject, cases } => {
            let subject = lower_into(subject, &mut out, ctx)?;
            out.push(Instruction::text(format!("switch ({}) {{", subject)));
            ctx.push_switch();
            let lowered_cases = lower_switch_cases(cases, ctx);
            ctx.pop_frame();
            out.extend(lowered_cases?);
            out.push(Instruction::text("}"));
        }
        AstNodeKind::Break { levels } => out.push(lower_jump("break", *levels, ctx)),
        AstNodeKind::Continue { levels } => out.push(lower_jump("continue", *levels, ctx)),

        AstNodeKind::TryCatch { body, catches, finally } => {
            out.push(Instruction::text("try {"));
            out.extend(lower_all(body, ctx)?);
            out.push(Instruction::text("}"));
            for catch in catches {
                let AstNodeKind::Catch { types, var, body } = catch.get_kind() else {
                    return Err(LoweringError::unsupported_statement(catch));
                };
                ctx.mark(catch.get_id());
                let mut header = Vec::with_capacity(types.len());
                for ty in types {
                    header.push(resolve_name(ty, &mut out, ctx)?);
                }
                let mut header = header.join(" | ");
                if let Some(var) = var {
                    header.push(' ');
                    header.push_str(&lower_into(var, &mut out, ctx)?);
                }
                out.push(Instruction::text(format!("catch ({}) {{", header)));
                out.extend(lower_all(body, ctx)?);
                out.push(Instruction::text("}"));
            }
            if let Some(finally) = finally {
                out.push(Instruction::text("finally {"));
                out.extend(lower_all(finally, ctx)?);
                out.push(Instruction::text("}"));
            }
        }
        AstNodeKind::Throw { expr } => {
            let value = lower_into(expr, &mut out, ctx)?;
            out.push(Instruction::text(format!("throw {};", value)));
        }
        AstNodeKind::Global { vars } => {
            let values = join_values(vars, &mut out, ctx)?;
            out.push(Instruction::text(format!("global {};", values)));
        }
        AstNodeKind::Static { vars } => {
            let mut rendered = Vec::with_capacity(vars.len());
            for var in vars {
                let AstNodeKind::StaticVar { var: name, default } = var.get_kind() else {
                    return Err(LoweringError::unsupported_statement(var));
                };
                ctx.mark(var.get_id());
                let name = lower_into(name, &mut out, ctx)?;
                match default {
                    Some(default) => {
                        let default = lower_into(default, &mut out, ctx)?;
                        rendered.push(format!("{} = {}", name, default));
                    }
                    None => rendered.push(name),
                }
            }
            out.push(Instruction::text(format!("static {};", rendered.join(", "))));
        }
        AstNodeKind::Unset { vars } => {
            let values = join_values(vars, &mut out, ctx)?;
            out.push(Instruction::text(format!("unset({});", values)));
        }
        AstNodeKind::Const { items } => {
            let items = lower_const_items(items, &mut out, ctx)?;
            out.push(Instruction::text(format!("const {};", items.join(", "))));
        }
        AstNodeKind::Declare { items } => {
            let items = lower_const_items(items, &mut out, ctx)?;
            let items: Vec<String> = items.iter().map(|i| i.replace(" = ", "=")).collect();
            out.push(Instruction::text(format!("declare({});", items.join(", "))));
        }
        AstNodeKind::Namespace { name, body } => {
            let name = match name {
                Some(name) => resolve_full_name(name, &mut out, ctx)?,
                None => String::new(),
            };
            let header = if name.is_empty() { "namespace".to_string() } else { format!("namespace {}", name) };
            match body {
                Some(body) => {
                    out.push(Instruction::text(format!("{} {{", header)));
                    out.extend(lower_all(body, ctx)?);
                    out.push(Instruction::text("}"));
                }
                None => out.push(Instruction::text(format!("{};", header))),
            }
        }
        AstNodeKind::Use { kind, prefix, items } => {
            let mut rendered = Vec::with_capacity(items.len());
            for item in items {
                let AstNodeKind::UseItem { kind, name, alias } = item.get_kind() else {
                    return Err(LoweringError::unsupported_statement(item));
                };
                ctx.mark(item.get_id());
                let mut text = kind.as_ref().map(|k| format!("{} ", k)).unwrap_or_default();
                text.push_str(&resolve_full_name(name, &mut out, ctx)?);
                if let Some(alias) = alias {
                    text.push_str(" as ");
                    text.push_str(alias);
                }
                rendered.push(text);
            }
            let kind = kind.as_ref().map(|k| format!("{} ", k)).unwrap_or_default();
            let names = match prefix {
                Some(prefix) => {
                    let prefix = resolve_full_name(prefix, &mut out, ctx)?;
                    format!("{}\\{{{}}}", prefix, rendered.join(", "))
                }
                None => rendered.join(", "),
            };
            out.push(Instruction::text(format!("use {}{};", kind, names)));
        }
        AstNodeKind::Goto { label } => out.push(Instruction::goto(label.clone())),
        AstNodeKind::Label { name } => out.push(Instruction::label(name.clone())),
        AstNodeKind::InlineHtml { .. } | AstNodeKind::Nop => {}

        AstNodeKind::FunctionDecl { .. }
        | AstNodeKind::ClassDecl { .. }
        | AstNodeKind::InterfaceDecl { .. }
        | AstNodeKind::TraitDecl { .. }
        | AstNodeKind::MethodDecl { .. }
        | AstNodeKind::PropertyDecl { .. }
        | AstNodeKind::ClassConst { .. }
        | AstNodeKind::TraitUse { .. } => out.extend(lower_objects::lower_declaration(stmt, ctx)?),

        _ => return Err(LoweringError::unsupported_statement(stmt)),
    }
    Ok(out)
}

fn lower_switch_cases(cases: &[AstNode], ctx: &mut LoweringContext) -> LowerResult<Vec<Instruction>> {
    let mut out = Vec::new();
    for case in cases {
        let AstNodeKind::Case { test, body } = case.get_kind() else {
            return Err(LoweringError::unsupported_statement(case));
        };
        ctx.mark(case.get_id());
        match test {
            Some(test) => {
                let value = lower_into(test, &mut out, ctx)?;
                out.push(Instruction::text(format!("case {}:", value)));
            }
            None => out.push(Instruction::text("default:")),
        }
        out.extend(lower_all(body, ctx)?);
        if !ctx.options().switch_fallthrough {
            out.push(Instruction::text("break;"));
        }
    }
    Ok(out)
}
