//! file: core/src/ir/lower/lower_expr.rs
//! description: expression lowering.
//!
//! Every expression lowers to a `Lowered` pair: the textual operand a later
//! instruction can use, and the instructions that must run before anything
//! refers to it. Sub-expressions are lowered left to right and their effects
//! concatenated in that order. Only calls introduce temporaries.

use crate::ast::{AstNode, AstNodeKind, printer};
use crate::ir::instr::Instruction;

use super::err::{LowerResult, LoweringError};
use super::lowering_context::LoweringContext;
use super::names::{resolve_member, resolve_name};
use super::{lower_objects, operators};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lowered {
    pub value: String,
    pub effects: Vec<Instruction>,
}

impl Lowered {
    pub fn is_empty(&self) -> bool {
        self.value.is_empty() && self.effects.is_empty()
    }
}

/// Lowers an optional expression. Absent and already-lowered nodes yield
/// an empty `Lowered`; callers keep the first result instead of asking again.
pub fn lower_expr(expr: Option<&AstNode>, ctx: &mut LoweringContext) -> LowerResult<Lowered> {
    let Some(node) = expr else {
        return Ok(Lowered::default());
    };
    if !node.get_kind().is_expression() {
        return Err(LoweringError::unsupported_expression(node));
    }
    if !ctx.enter(node.get_id()) {
        return Ok(Lowered::default());
    }
    ctx.descend(node)?;
    let mut effects = Vec::new();
    let value = lower_expr_kind(node, &mut effects, ctx)?;
    ctx.ascend();
    Ok(Lowered { value, effects })
}

/// Lowers `node` and appends its effects to `effects`, returning the value.
pub(crate) fn lower_into(
    node: &AstNode,
    effects: &mut Vec<Instruction>,
    ctx: &mut LoweringContext,
) -> LowerResult<String> {
    let lowered = lower_expr(Some(node), ctx)?;
    effects.extend(lowered.effects);
    Ok(lowered.value)
}

fn lower_optional_into(
    node: Option<&AstNode>,
    effects: &mut Vec<Instruction>,
    ctx: &mut LoweringContext,
) -> LowerResult<String> {
    match node {
        Some(node) => lower_into(node, effects, ctx),
        None => Ok(String::new()),
    }
}

fn lower_list_into(
    nodes: &[AstNode],
    effects: &mut Vec<Instruction>,
    ctx: &mut LoweringContext,
) -> LowerResult<String> {
    let mut values = Vec::with_capacity(nodes.len());
    for node in nodes {
        values.push(lower_into(node, effects, ctx)?);
    }
    Ok(values.join(", "))
}

/// Call arguments, left to right. Spread, by-ref and named arguments keep
/// their markers.
pub(crate) fn lower_args_into(
    args: &[AstNode],
    effects: &mut Vec<Instruction>,
    ctx: &mut LoweringContext,
) -> LowerResult<String> {
    let mut values = Vec::with_capacity(args.len());
    for arg in args {
        match arg.get_kind() {
            AstNodeKind::Argument { value, unpack, by_ref, name } => {
                ctx.mark(arg.get_id());
                let lowered = lower_into(value, effects, ctx)?;
                let mut text = String::new();
                if let Some(name) = name {
                    text.push_str(name);
                    text.push_str(": ");
                }
                if *unpack {
                    text.push_str("...");
                }
                if *by_ref {
                    text.push('&');
                }
                text.push_str(&lowered);
                values.push(text);
            }
            _ => values.push(lower_into(arg, effects, ctx)?),
        }
    }
    Ok(values.join(", "))
}

/// Splices string parts between quotes. Plain variables are embedded as-is,
/// every other expression inside `{...}`.
fn lower_interpolation(
    parts: &[AstNode],
    quote: char,
    effects: &mut Vec<Instruction>,
    ctx: &mut LoweringContext,
) -> LowerResult<String> {
    let mut text = String::new();
    text.push(quote);
    for part in parts {
        match part.get_kind() {
            AstNodeKind::StringPart { value } => {
                ctx.mark(part.get_id());
                text.push_str(&printer::escape_fragment(value));
            }
            AstNodeKind::Variable { .. } => text.push_str(&lower_into(part, effects, ctx)?),
            _ => {
                let value = lower_into(part, effects, ctx)?;
                text.push('{');
                text.push_str(&value);
                text.push('}');
            }
        }
    }
    text.push(quote);
    Ok(text)
}

fn lower_array_items(
    items: &[Option<AstNode>],
    effects: &mut Vec<Instruction>,
    ctx: &mut LoweringContext,
) -> LowerResult<String> {
    let mut values = Vec::with_capacity(items.len());
    for item in items {
        let Some(item) = item else {
            values.push(String::new());
            continue;
        };
        match item.get_kind() {
            AstNodeKind::ArrayItem { key, value, by_ref, unpack } => {
                ctx.mark(item.get_id());
                let key = lower_optional_into(key.as_deref(), effects, ctx)?;
                let value = lower_into(value, effects, ctx)?;
                let mut text = String::new();
                if !key.is_empty() {
                    text.push_str(&key);
                    text.push_str(" => ");
                }
                if *unpack {
                    text.push_str("...");
                }
                if *by_ref {
                    text.push('&');
                }
                text.push_str(&value);
                values.push(text);
            }
            _ => values.push(lower_into(item, effects, ctx)?),
        }
    }
    Ok(values.join(", "))
}

fn lower_expr_kind(
    node: &AstNode,
    effects: &mut Vec<Instruction>,
    ctx: &mut LoweringContext,
) -> LowerResult<String> {
    let value = match node.get_kind() {
        AstNodeKind::Identifier { name } => name.clone(),
        AstNodeKind::Name { parts, .. } => parts.last().cloned().unwrap_or_default(),
        AstNodeKind::Integer { value } => value.to_string(),
        AstNodeKind::Float { value } => printer::print_float(*value),
        AstNodeKind::String { value } => printer::quote_string(value),
        AstNodeKind::MagicConst { name } => name.clone(),
        AstNodeKind::Interpolated { parts } => lower_interpolation(parts, '"', effects, ctx)?,
        AstNodeKind::ShellExec { parts } => lower_interpolation(parts, '`', effects, ctx)?,

        AstNodeKind::Variable { name } => format!("${}", name),
        AstNodeKind::VariableVariable { expr } => {
            let inner = lower_into(expr, effects, ctx)?;
            match expr.get_kind() {
                AstNodeKind::Variable { .. } | AstNodeKind::VariableVariable { .. } => format!("${}", inner),
                _ => format!("${{{}}}", inner),
            }
        }
        AstNodeKind::ConstFetch { name } => {
            ctx.mark(name.get_id());
            match name.get_kind() {
                AstNodeKind::Name { parts, fully_qualified } => printer::print_name(parts, *fully_qualified),
                AstNodeKind::Identifier { name } => name.clone(),
                _ => return Err(LoweringError::unsupported_expression(name)),
            }
        }
        AstNodeKind::ClassConstFetch { class, name } => {
            let class = resolve_name(class, effects, ctx)?;
            let name = resolve_member(name, effects, ctx)?;
            format!("{}::{}", class, name)
        }
        AstNodeKind::PropertyFetch { object, property, nullsafe } => {
            let object = lower_into(object, effects, ctx)?;
            let property = resolve_member(property, effects, ctx)?;
            let arrow = if *nullsafe { "?->" } else { "->" };
            format!("{}{}{}", object, arrow, property)
        }
        AstNodeKind::StaticPropertyFetch { class, property } => {
            let class = resolve_name(class, effects, ctx)?;
            let property = resolve_member(property, effects, ctx)?;
            format!("{}::{}", class, property)
        }
        AstNodeKind::ArrayDimFetch { base, index } => {
            let base = lower_into(base, effects, ctx)?;
            let index = lower_optional_into(index.as_deref(), effects, ctx)?;
            format!("{}[{}]", base, index)
        }

        AstNodeKind::Assign { target, value } => {
            let target = lower_into(target, effects, ctx)?;
            let value = lower_into(value, effects, ctx)?;
            format!("{} = {}", target, value)
        }
        AstNodeKind::AssignRef { target, value } => {
            let target = lower_into(target, effects, ctx)?;
            let value = lower_into(value, effects, ctx)?;
            format!("{} = &{}", target, value)
        }
        AstNodeKind::AssignOp { target, value, .. } => {
            let token = operators::resolve_operator(node)?;
            let left = lower_into(target, effects, ctx)?;
            let right = lower_into(value, effects, ctx)?;
            format!("{} {} {}", left, token, right)
        }
        AstNodeKind::BinaryOp { left, op, right } => {
            let token = operators::resolve_operator(node)?;
            let mut lhs = lower_into(left, effects, ctx)?;
            let mut rhs = lower_into(right, effects, ctx)?;
            if operators::needs_group(left, *op, false) {
                lhs = operators::group(lhs);
            }
            if operators::needs_group(right, *op, true) {
                rhs = operators::group(rhs);
            }
            format!("{} {} {}", lhs, token, rhs)
        }
        AstNodeKind::UnaryOp { op, expr } => {
            let mut operand = lower_into(expr, effects, ctx)?;
            if operators::needs_group_under_unary(expr) {
                operand = operators::group(operand);
            }
            if op.is_postfix() {
                format!("{}{}", operand, operators::unary_token(*op))
            } else {
                format!("{}{}", operators::unary_token(*op), operand)
            }
        }
        AstNodeKind::Cast { ty, expr } => {
            let mut operand = lower_into(expr, effects, ctx)?;
            if operators::needs_group_under_unary(expr) {
                operand = operators::group(operand);
            }
            format!("{} {}", operators::cast_token(*ty), operand)
        }
        AstNodeKind::Ternary { condition, then_expr, else_expr } => {
            let condition = lower_into(condition, effects, ctx)?;
            let then_value = lower_optional_into(then_expr.as_deref(), effects, ctx)?;
            let else_value = lower_into(else_expr, effects, ctx)?;
            if then_expr.is_some() {
                format!("({} ? {} : {})", condition, then_value, else_value)
            } else {
                format!("({} ?: {})", condition, else_value)
            }
        }
        AstNodeKind::InstanceOf { expr, class } => {
            let value = lower_into(expr, effects, ctx)?;
            let class = resolve_name(class, effects, ctx)?;
            format!("{} instanceof {}", value, class)
        }

        AstNodeKind::Call { callee, args } => {
            let callee = resolve_name(callee, effects, ctx)?;
            let args = lower_args_into(args, effects, ctx)?;
            let temp = ctx.new_temp();
            effects.push(Instruction::text(format!("{} = {}({});", temp, callee, args)));
            temp
        }
        AstNodeKind::MethodCall { object, method, args, nullsafe } => {
            let object = lower_into(object, effects, ctx)?;
            let method = resolve_member(method, effects, ctx)?;
            let args = lower_args_into(args, effects, ctx)?;
            let arrow = if *nullsafe { "?->" } else { "->" };
            let temp = ctx.new_temp();
            effects.push(Instruction::text(format!("{} = {}{}{}({});", temp, object, arrow, method, args)));
            temp
        }
        AstNodeKind::StaticCall { class, method, args } => {
            let class = resolve_name(class, effects, ctx)?;
            let method = resolve_member(method, effects, ctx)?;
            let args = lower_args_into(args, effects, ctx)?;
            let temp = ctx.new_temp();
            effects.push(Instruction::text(format!("{} = {}::{}({});", temp, class, method, args)));
            temp
        }
        AstNodeKind::New { class, args } => match class.get_kind() {
            AstNodeKind::ClassDecl { .. } => lower_objects::lower_anonymous_class(class, args, effects, ctx)?,
            _ => {
                let class = resolve_name(class, effects, ctx)?;
                let args = lower_args_into(args, effects, ctx)?;
                format!("new {}({})", class, args)
            }
        },

        AstNodeKind::Array { items } => format!("[{}]", lower_array_items(items, effects, ctx)?),
        AstNodeKind::List { items } => format!("list({})", lower_array_items(items, effects, ctx)?),

        AstNodeKind::Isset { vars } => format!("isset({})", lower_list_into(vars, effects, ctx)?),
        AstNodeKind::Empty { expr } => format!("empty({})", lower_into(expr, effects, ctx)?),
        AstNodeKind::Exit { expr } => match expr {
            Some(expr) => format!("exit({})", lower_into(expr, effects, ctx)?),
            None => "exit".to_string(),
        },
        AstNodeKind::Eval { expr } => format!("eval({})", lower_into(expr, effects, ctx)?),
        AstNodeKind::Clone { expr } => format!("clone {}", lower_into(expr, effects, ctx)?),
        AstNodeKind::Print { expr } => format!("print {}", lower_into(expr, effects, ctx)?),
        AstNodeKind::Yield { value } => match value {
            Some(value) => format!("yield {}", lower_into(value, effects, ctx)?),
            None => "yield".to_string(),
        },
        AstNodeKind::YieldFrom { expr } => format!("yield from {}", lower_into(expr, effects, ctx)?),
        AstNodeKind::Include { kind, expr } => {
            let target = lower_into(expr, effects, ctx)?;
            effects.push(Instruction::text(format!("{} {};", operators::include_keyword(*kind), target)));
            String::new()
        }
        AstNodeKind::Closure { .. } => lower_objects::lower_closure(node, ctx)?,

        _ => return Err(LoweringError::unsupported_expression(node)),
    };
    Ok(value)
}
