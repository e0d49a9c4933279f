//! file: core/src/ir/lower/lower_objects.rs
//! description: lowering of functions, classes, interfaces, traits and closures.
//!
//! Declarations lower to a header line, `{`, their lowered body and `}`.
//! Bodies start with an empty break/continue frame stack. Closures and
//! anonymous classes render inline as a single value; nothing from their
//! bodies surfaces into the enclosing instruction stream.

use crate::ast::{AstNode, AstNodeKind};
use crate::ir::instr::Instruction;

use super::err::{LowerResult, LoweringError};
use super::lower_expr::{lower_args_into, lower_into};
use super::lower_stmt::{lower_all, lower_const_items};
use super::lowering_context::LoweringContext;
use super::names::resolve_full_name;

fn modifiers_prefix(modifiers: &[String]) -> String {
    modifiers.iter().map(|m| format!("{} ", m)).collect()
}

/// `[type ][&][...]$name[ = default]` for each parameter.
fn lower_params(
    params: &[AstNode],
    effects: &mut Vec<Instruction>,
    ctx: &mut LoweringContext,
) -> LowerResult<String> {
    let mut rendered = Vec::with_capacity(params.len());
    for param in params {
        let AstNodeKind::Param { name, default, by_ref, variadic, type_hint } = param.get_kind() else {
            return Err(LoweringError::unsupported_statement(param));
        };
        ctx.mark(param.get_id());
        let mut text = String::new();
        if let Some(type_hint) = type_hint {
            text.push_str(type_hint);
            text.push(' ');
        }
        if *by_ref {
            text.push('&');
        }
        if *variadic {
            text.push_str("...");
        }
        text.push('$');
        text.push_str(name);
        if let Some(default) = default {
            text.push_str(" = ");
            text.push_str(&lower_into(default, effects, ctx)?);
        }
        rendered.push(text);
    }
    Ok(rendered.join(", "))
}

fn lower_names(names: &[AstNode], effects: &mut Vec<Instruction>, ctx: &mut LoweringContext) -> LowerResult<String> {
    let mut rendered = Vec::with_capacity(names.len());
    for name in names {
        rendered.push(resolve_full_name(name, effects, ctx)?);
    }
    Ok(rendered.join(", "))
}

/// Header, braces and body of a declaration.
fn braced(header: String, body: Vec<Instruction>) -> Vec<Instruction> {
    let mut out = Vec::with_capacity(body.len() + 2);
    out.push(Instruction::text(format!("{} {{", header)));
    out.extend(body);
    out.push(Instruction::text("}"));
    out
}

fn lower_body(body: &[AstNode], ctx: &mut LoweringContext) -> LowerResult<Vec<Instruction>> {
    ctx.with_fresh_frames(|ctx| lower_all(body, ctx))
}

/// `extends`/`implements` part of a class header.
fn class_parents(
    extends: Option<&AstNode>,
    implements: &[AstNode],
    effects: &mut Vec<Instruction>,
    ctx: &mut LoweringContext,
) -> LowerResult<String> {
    let mut text = String::new();
    if let Some(parent) = extends {
        text.push_str(" extends ");
        text.push_str(&resolve_full_name(parent, effects, ctx)?);
    }
    if !implements.is_empty() {
        text.push_str(" implements ");
        text.push_str(&lower_names(implements, effects, ctx)?);
    }
    Ok(text)
}

pub fn lower_declaration(decl: &AstNode, ctx: &mut LoweringContext) -> LowerResult<Vec<Instruction>> {
    let mut out = Vec::new();
    match decl.get_kind() {
        AstNodeKind::FunctionDecl { name, params, body, by_ref } => {
            let params = lower_params(params, &mut out, ctx)?;
            let amp = if *by_ref { "&" } else { "" };
            let header = format!("function {}{}({})", amp, name, params);
            let body = lower_body(body, ctx)?;
            out.extend(braced(header, body));
        }
        AstNodeKind::ClassDecl { name, modifiers, extends, implements, members } => {
            let parents = class_parents(extends.as_deref(), implements, &mut out, ctx)?;
            let header = format!(
                "{}class {}{}",
                modifiers_prefix(modifiers),
                name.as_deref().unwrap_or_default(),
                parents
            );
            let body = lower_body(members, ctx)?;
            out.extend(braced(header, body));
        }
        AstNodeKind::InterfaceDecl { name, extends, members } => {
            let mut header = format!("interface {}", name);
            if !extends.is_empty() {
                header.push_str(" extends ");
                header.push_str(&lower_names(extends, &mut out, ctx)?);
            }
            let body = lower_body(members, ctx)?;
            out.extend(braced(header, body));
        }
        AstNodeKind::TraitDecl { name, members } => {
            let body = lower_body(members, ctx)?;
            out.extend(braced(format!("trait {}", name), body));
        }
        AstNodeKind::MethodDecl { name, modifiers, params, body, by_ref } => {
            let params = lower_params(params, &mut out, ctx)?;
            let amp = if *by_ref { "&" } else { "" };
            let header = format!("{}function {}{}({})", modifiers_prefix(modifiers), amp, name, params);
            match body {
                Some(body) => {
                    let body = lower_body(body, ctx)?;
                    out.extend(braced(header, body));
                }
                // abstract or interface method
                None => out.push(Instruction::text(format!("{};", header))),
            }
        }
        AstNodeKind::PropertyDecl { modifiers, props } => {
            let prefix = if modifiers.is_empty() { "var ".to_string() } else { modifiers_prefix(modifiers) };
            for prop in props {
                let AstNodeKind::PropertyItem { name, default } = prop.get_kind() else {
                    return Err(LoweringError::unsupported_statement(prop));
                };
                ctx.mark(prop.get_id());
                match default {
                    Some(default) => {
                        let value = lower_into(default, &mut out, ctx)?;
                        out.push(Instruction::text(format!("{}${} = {};", prefix, name, value)));
                    }
                    None => out.push(Instruction::text(format!("{}${};", prefix, name))),
                }
            }
        }
        AstNodeKind::ClassConst { modifiers, items } => {
            let items = lower_const_items(items, &mut out, ctx)?;
            out.push(Instruction::text(format!("{}const {};", modifiers_prefix(modifiers), items.join(", "))));
        }
        AstNodeKind::TraitUse { traits } => {
            let names = lower_names(traits, &mut out, ctx)?;
            out.push(Instruction::text(format!("use {};", names)));
        }
        _ => return Err(LoweringError::unsupported_statement(decl)),
    }
    log::debug!("lowered declaration {} into {} instructions", decl.get_kind(), out.len());
    Ok(out)
}

fn inline(instructions: &[Instruction]) -> String {
    instructions.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(" ")
}

/// Function literal text for a closure or arrow function.
pub fn lower_closure(closure: &AstNode, ctx: &mut LoweringContext) -> LowerResult<String> {
    let AstNodeKind::Closure { params, uses, body, by_ref, is_static, arrow } = closure.get_kind() else {
        return Err(LoweringError::unsupported_expression(closure));
    };
    let mut inner = Vec::new();
    let params = lower_params(params, &mut inner, ctx)?;

    let mut captured = Vec::with_capacity(uses.len());
    for closure_use in uses {
        let AstNodeKind::ClosureUse { var, by_ref } = closure_use.get_kind() else {
            return Err(LoweringError::unsupported_expression(closure_use));
        };
        ctx.mark(closure_use.get_id());
        let var = lower_into(var, &mut inner, ctx)?;
        captured.push(if *by_ref { format!("&{}", var) } else { var });
    }

    inner.extend(lower_body(body, ctx)?);

    let mut text = String::new();
    if *is_static {
        text.push_str("static ");
    }
    text.push_str(if *arrow { "fn " } else { "function " });
    if *by_ref {
        text.push('&');
    }
    text.push_str(&format!("({})", params));
    if !captured.is_empty() {
        text.push_str(&format!(" use ({})", captured.join(", ")));
    }
    if inner.is_empty() {
        text.push_str(" { }");
    } else {
        text.push_str(&format!(" {{ {} }}", inline(&inner)));
    }
    Ok(text)
}

/// `new class(args) extends P implements I { members }` as one value.
/// Constructor arguments are evaluated in the enclosing stream.
pub fn lower_anonymous_class(
    class: &AstNode,
    args: &[AstNode],
    effects: &mut Vec<Instruction>,
    ctx: &mut LoweringContext,
) -> LowerResult<String> {
    let AstNodeKind::ClassDecl { extends, implements, members, .. } = class.get_kind() else {
        return Err(LoweringError::unsupported_expression(class));
    };
    ctx.mark(class.get_id());
    let args = lower_args_into(args, effects, ctx)?;
    let parents = class_parents(extends.as_deref(), implements, effects, ctx)?;
    let members = lower_body(members, ctx)?;
    let body = if members.is_empty() { "{ }".to_string() } else { format!("{{ {} }}", inline(&members)) };
    Ok(format!("new class({}){} {}", args, parents, body))
}
