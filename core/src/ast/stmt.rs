//! file: core/src/ast/stmt.rs
//! description: parsing helpers for the script root, statements and declarations.
//!
//! Every helper takes the `pest` pair for one grammar rule and returns the
//! matching `AstNode`, attaching `Location`/`Span` metadata through the
//! `rules` helpers so diagnostics can point back into the PHP file.

use pest::iterators::Pair;

use crate::{
    ast::{AstNode, AstNodeKind, Rule, TacErrorExt, err::syntax_error, expr, rules},
    script,
};

type ParseResult = Result<AstNode, Box<dyn TacErrorExt>>;
type ParseListResult = Result<Vec<AstNode>, Box<dyn TacErrorExt>>;

/// Parse the `script` rule into the root `Script` node.
///
/// Inline HTML around the PHP tags is kept as `InlineHtml` statements so the
/// body mirrors the file from top to bottom. Open and close tags carry no
/// meaning of their own and are skipped.
///
/// # Errors
///
/// Propagates the first error raised by a nested statement.
pub(crate) fn parse_script_rule(pair: Pair<Rule>, script: &script::Script) -> ParseResult {
    let (inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let mut body = Vec::new();
    for inner in inner_pairs {
        match inner.as_rule() {
            Rule::statement => body.push(parse_statement_rule(inner, script)?),
            Rule::inline_html => body.push(AstNode::new(
                AstNodeKind::InlineHtml { value: inner.as_str().to_string() },
                rules::get_location_from_pair(&inner, script),
                rules::get_span_from_pair(&inner, script),
            )),
            _ => {}
        }
    }
    Ok(AstNode::new(AstNodeKind::Script { body }, location, span))
}

pub(crate) fn parse_block_rule(pair: Pair<Rule>, script: &script::Script) -> ParseListResult {
    let (inner_pairs, _, _) = rules::get_data_from_rule(&pair, script);
    inner_pairs
        .filter(|p| p.as_rule() == Rule::statement)
        .map(|p| parse_statement_rule(p, script))
        .collect()
}

/// Statement bodies of control structures are lists; a braced block is
/// flattened into its statements.
fn into_body(node: AstNode) -> Vec<AstNode> {
    match node.kind {
        AstNodeKind::Block { statements } => statements,
        _ => vec![node],
    }
}

fn parse_expr_list(pairs: rules::Inner, script: &script::Script) -> ParseListResult {
    pairs
        .filter(|p| p.as_rule() == Rule::expr)
        .map(|p| expr::parse_expression_rule(p, script))
        .collect()
}

fn variable_node(pair: &Pair<Rule>, script: &script::Script) -> AstNode {
    AstNode::new(
        AstNodeKind::Variable { name: pair.as_str().trim_start_matches('$').to_string() },
        rules::get_location_from_pair(pair, script),
        rules::get_span_from_pair(pair, script),
    )
}

fn identifier_text(pair: &Pair<Rule>) -> String {
    pair.as_str().to_string()
}

fn modifier_text(pair: &Pair<Rule>) -> String {
    pair.as_str().trim().to_ascii_lowercase()
}

/// One imported name, with its own `function`/`const` marker inside a group.
fn parse_use_item_rule(pair: Pair<Rule>, script: &script::Script) -> ParseResult {
    let (mut item_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let mut next = rules::fetch_next_pair(&mut item_pairs, &location, &span)?;
    let mut kind = None;
    if next.as_rule() == Rule::use_kind {
        kind = Some(modifier_text(&next));
        next = rules::fetch_next_pair(&mut item_pairs, &location, &span)?;
    }
    if next.as_rule() == Rule::use_item {
        // group entries wrap the plain item
        let (inner, _, _) = rules::get_data_from_rule(&next, script);
        item_pairs = inner;
        next = rules::fetch_next_pair(&mut item_pairs, &location, &span)?;
    }
    let name = expr::name_node(&next, script);
    Ok(AstNode::new(
        AstNodeKind::UseItem {
            kind,
            name: Box::new(name),
            alias: item_pairs.next().map(|a| identifier_text(&a)),
        },
        location,
        span,
    ))
}

pub(crate) fn parse_statement_rule(pair: Pair<Rule>, script: &script::Script) -> ParseResult {
    let (mut inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let next_rule = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    match next_rule.as_rule() {
        Rule::block => Ok(AstNode::new(
            AstNodeKind::Block { statements: parse_block_rule(next_rule, script)? },
            location,
            span,
        )),
        Rule::if_stmt => parse_if_statement_rule(next_rule, script),
        Rule::while_stmt | Rule::do_stmt | Rule::for_stmt | Rule::foreach_stmt => {
            parse_loop_statement_rule(next_rule, script)
        }
        Rule::switch_stmt => parse_switch_statement_rule(next_rule, script),
        Rule::try_stmt => parse_try_statement_rule(next_rule, script),
        Rule::function_decl
        | Rule::class_decl
        | Rule::interface_decl
        | Rule::trait_decl => parse_declaration_rule(next_rule, script),
        _ => parse_simple_statement_rule(next_rule, script),
    }
}

fn parse_if_statement_rule(pair: Pair<Rule>, script: &script::Script) -> ParseResult {
    let (mut inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let condition = expr::parse_expression_rule(
        rules::fetch_next_pair(&mut inner_pairs, &location, &span)?,
        script,
    )?;
    let then_branch = into_body(parse_statement_rule(
        rules::fetch_next_pair(&mut inner_pairs, &location, &span)?,
        script,
    )?);

    let mut elseifs = Vec::new();
    let mut else_branch = None;
    for clause in inner_pairs {
        let clause_location = rules::get_location_from_pair(&clause, script);
        let clause_span = rules::get_span_from_pair(&clause, script);
        let (mut clause_pairs, loc, sp) = rules::get_data_from_rule(&clause, script);
        match clause.as_rule() {
            Rule::elseif_clause => {
                let cond = expr::parse_expression_rule(rules::fetch_next_pair(&mut clause_pairs, &loc, &sp)?, script)?;
                let body = into_body(parse_statement_rule(rules::fetch_next_pair(&mut clause_pairs, &loc, &sp)?, script)?);
                elseifs.push((cond, body, clause_location, clause_span));
            }
            _ => {
                let body = parse_statement_rule(rules::fetch_next_pair(&mut clause_pairs, &loc, &sp)?, script)?;
                else_branch = Some(into_body(body));
            }
        }
    }

    // `elseif` chains become nested ifs in the else branch, innermost last.
    for (cond, body, clause_location, clause_span) in elseifs.into_iter().rev() {
        let nested = AstNode::new(
            AstNodeKind::If {
                condition: Box::new(cond),
                then_branch: body,
                else_branch,
            },
            clause_location,
            clause_span,
        );
        else_branch = Some(vec![nested]);
    }

    Ok(AstNode::new(
        AstNodeKind::If {
            condition: Box::new(condition),
            then_branch,
            else_branch,
        },
        location,
        span,
    ))
}

fn parse_loop_statement_rule(pair: Pair<Rule>, script: &script::Script) -> ParseResult {
    let rule = pair.as_rule();
    let (mut inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let kind = match rule {
        Rule::while_stmt => {
            let condition = expr::parse_expression_rule(rules::fetch_next_pair(&mut inner_pairs, &location, &span)?, script)?;
            let body = parse_statement_rule(rules::fetch_next_pair(&mut inner_pairs, &location, &span)?, script)?;
            AstNodeKind::While {
                condition: Box::new(condition),
                body: into_body(body),
            }
        }
        Rule::do_stmt => {
            let body = parse_statement_rule(rules::fetch_next_pair(&mut inner_pairs, &location, &span)?, script)?;
            let condition = expr::parse_expression_rule(rules::fetch_next_pair(&mut inner_pairs, &location, &span)?, script)?;
            AstNodeKind::DoWhile {
                body: into_body(body),
                condition: Box::new(condition),
            }
        }
        Rule::for_stmt => {
            let mut clause = || -> ParseListResult {
                let clause = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
                parse_expr_list(rules::get_data_from_rule(&clause, script).0, script)
            };
            let init = clause()?;
            let conditions = clause()?;
            let step = clause()?;
            let body = parse_statement_rule(rules::fetch_next_pair(&mut inner_pairs, &location, &span)?, script)?;
            AstNodeKind::For {
                init,
                conditions,
                step,
                body: into_body(body),
            }
        }
        _ => {
            let iterable = expr::parse_expression_rule(rules::fetch_next_pair(&mut inner_pairs, &location, &span)?, script)?;
            let binding = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
            let (mut binding_pairs, loc, sp) = rules::get_data_from_rule(&binding, script);
            let first = rules::fetch_next_pair(&mut binding_pairs, &loc, &sp)?;
            let (key, value, by_ref) = if first.as_rule() == Rule::by_ref {
                let value = expr::parse_expression_rule(rules::fetch_next_pair(&mut binding_pairs, &loc, &sp)?, script)?;
                (None, value, true)
            } else {
                let first_expr = expr::parse_expression_rule(first, script)?;
                match binding_pairs.next() {
                    Some(foreach_value) => {
                        let by_ref = rules::has_keyword(&foreach_value, Rule::by_ref);
                        let (value_pairs, vloc, vsp) = rules::get_data_from_rule(&foreach_value, script);
                        let value_pair = value_pairs
                            .into_iter()
                            .find(|p| p.as_rule() == Rule::expr)
                            .ok_or_else(|| syntax_error("foreach binding without a value.", "phptac.stmt.parse_loop_statement_rule", &vloc, &vsp))?;
                        (Some(Box::new(first_expr)), expr::parse_expression_rule(value_pair, script)?, by_ref)
                    }
                    None => (None, first_expr, false),
                }
            };
            let body = parse_statement_rule(rules::fetch_next_pair(&mut inner_pairs, &location, &span)?, script)?;
            AstNodeKind::Foreach {
                iterable: Box::new(iterable),
                key,
                value: Box::new(value),
                by_ref,
                body: into_body(body),
            }
        }
    };
    Ok(AstNode::new(kind, location, span))
}

fn parse_switch_statement_rule(pair: Pair<Rule>, script: &script::Script) -> ParseResult {
    let (mut inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let subject = expr::parse_expression_rule(rules::fetch_next_pair(&mut inner_pairs, &location, &span)?, script)?;
    let mut cases = Vec::new();
    for clause in inner_pairs {
        let is_case = rules::has_keyword(&clause, Rule::kw_case);
        let (mut clause_pairs, clause_location, clause_span) = rules::get_data_from_rule(&clause, script);
        let test = if is_case {
            let test = rules::fetch_next_pair(&mut clause_pairs, &clause_location, &clause_span)?;
            Some(Box::new(expr::parse_expression_rule(test, script)?))
        } else {
            None
        };
        let body = clause_pairs
            .map(|p| parse_statement_rule(p, script))
            .collect::<ParseListResult>()?;
        cases.push(AstNode::new(
            AstNodeKind::Case { test, body },
            clause_location,
            clause_span,
        ));
    }
    Ok(AstNode::new(
        AstNodeKind::Switch {
            subject: Box::new(subject),
            cases,
        },
        location,
        span,
    ))
}

fn parse_try_statement_rule(pair: Pair<Rule>, script: &script::Script) -> ParseResult {
    let (mut inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let body = parse_block_rule(rules::fetch_next_pair(&mut inner_pairs, &location, &span)?, script)?;
    let mut catches = Vec::new();
    let mut finally = None;
    for clause in inner_pairs {
        let (clause_pairs, clause_location, clause_span) = rules::get_data_from_rule(&clause, script);
        match clause.as_rule() {
            Rule::catch_clause => {
                let mut types = Vec::new();
                let mut var = None;
                let mut catch_body = Vec::new();
                for part in clause_pairs {
                    match part.as_rule() {
                        Rule::qualified_name => types.push(expr::name_node(&part, script)),
                        Rule::variable => var = Some(Box::new(variable_node(&part, script))),
                        _ => catch_body = parse_block_rule(part, script)?,
                    }
                }
                catches.push(AstNode::new(
                    AstNodeKind::Catch {
                        types,
                        var,
                        body: catch_body,
                    },
                    clause_location,
                    clause_span,
                ));
            }
            _ => {
                let mut clause_pairs = clause_pairs;
                let block = rules::fetch_next_pair(&mut clause_pairs, &clause_location, &clause_span)?;
                finally = Some(parse_block_rule(block, script)?);
            }
        }
    }
    Ok(AstNode::new(
        AstNodeKind::TryCatch {
            body,
            catches,
            finally,
        },
        location,
        span,
    ))
}

fn parse_const_items(pairs: rules::Inner, script: &script::Script) -> ParseListResult {
    pairs
        .filter(|p| p.as_rule() == Rule::const_item)
        .map(|item| {
            let (mut item_pairs, location, span) = rules::get_data_from_rule(&item, script);
            let name = identifier_text(&rules::fetch_next_pair(&mut item_pairs, &location, &span)?);
            let value = expr::parse_expression_rule(rules::fetch_next_pair(&mut item_pairs, &location, &span)?, script)?;
            Ok(AstNode::new(
                AstNodeKind::ConstItem {
                    name,
                    value: Box::new(value),
                },
                location,
                span,
            ))
        })
        .collect()
}

fn parse_jump_levels(mut pairs: rules::Inner, location: &Option<crate::Location>, span: &Option<crate::Span>) -> Result<Option<u32>, Box<dyn TacErrorExt>> {
    match pairs.next() {
        Some(levels) => levels
            .as_str()
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .map(Some)
            .ok_or_else(|| {
                syntax_error(
                    format!("'{}' is not a valid loop depth.", levels.as_str()),
                    "phptac.stmt.parse_jump_levels",
                    location,
                    span,
                )
            }),
        None => Ok(None),
    }
}

fn parse_simple_statement_rule(pair: Pair<Rule>, script: &script::Script) -> ParseResult {
    let rule = pair.as_rule();
    let (mut inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let kind = match rule {
        Rule::expression_stmt => {
            let value = expr::parse_expression_rule(rules::fetch_next_pair(&mut inner_pairs, &location, &span)?, script)?;
            AstNodeKind::ExpressionStmt { expr: Box::new(value) }
        }
        Rule::echo_stmt => AstNodeKind::Echo { exprs: parse_expr_list(inner_pairs, script)? },
        Rule::return_stmt => AstNodeKind::Return {
            value: match inner_pairs.next() {
                Some(value) => Some(Box::new(expr::parse_expression_rule(value, script)?)),
                None => None,
            },
        },
        Rule::break_stmt => AstNodeKind::Break { levels: parse_jump_levels(inner_pairs, &location, &span)? },
        Rule::continue_stmt => AstNodeKind::Continue { levels: parse_jump_levels(inner_pairs, &location, &span)? },
        Rule::global_stmt => AstNodeKind::Global {
            vars: inner_pairs.map(|v| variable_node(&v, script)).collect(),
        },
        Rule::static_stmt => AstNodeKind::Static {
            vars: inner_pairs
                .map(|item| {
                    let (mut item_pairs, loc, sp) = rules::get_data_from_rule(&item, script);
                    let var = variable_node(&rules::fetch_next_pair(&mut item_pairs, &loc, &sp)?, script);
                    let default = match item_pairs.next() {
                        Some(value) => Some(Box::new(expr::parse_expression_rule(value, script)?)),
                        None => None,
                    };
                    Ok(AstNode::new(
                        AstNodeKind::StaticVar {
                            var: Box::new(var),
                            default,
                        },
                        loc,
                        sp,
                    ))
                })
                .collect::<ParseListResult>()?,
        },
        Rule::unset_stmt => AstNodeKind::Unset { vars: parse_expr_list(inner_pairs, script)? },
        Rule::throw_stmt => {
            let value = expr::parse_expression_rule(rules::fetch_next_pair(&mut inner_pairs, &location, &span)?, script)?;
            AstNodeKind::Throw { expr: Box::new(value) }
        }
        Rule::namespace_stmt => {
            let mut name = None;
            let mut body = None;
            for part in inner_pairs {
                match part.as_rule() {
                    Rule::qualified_name => name = Some(Box::new(expr::name_node(&part, script))),
                    Rule::block => body = Some(parse_block_rule(part, script)?),
                    _ => {}
                }
            }
            AstNodeKind::Namespace { name, body }
        }
        Rule::use_stmt => {
            let mut kind = None;
            let mut prefix = None;
            let mut items = Vec::new();
            for part in inner_pairs {
                match part.as_rule() {
                    Rule::use_kind => kind = Some(modifier_text(&part)),
                    Rule::use_group => {
                        let (group_pairs, _, _) = rules::get_data_from_rule(&part, script);
                        for group_part in group_pairs {
                            match group_part.as_rule() {
                                Rule::group_prefix => prefix = Some(Box::new(expr::name_node(&group_part, script))),
                                _ => items.push(parse_use_item_rule(group_part, script)?),
                            }
                        }
                    }
                    _ => items.push(parse_use_item_rule(part, script)?),
                }
            }
            AstNodeKind::Use { kind, prefix, items }
        }
        Rule::const_stmt => AstNodeKind::Const { items: parse_const_items(inner_pairs, script)? },
        Rule::declare_stmt => AstNodeKind::Declare { items: parse_const_items(inner_pairs, script)? },
        Rule::goto_stmt => AstNodeKind::Goto {
            label: identifier_text(&rules::fetch_next_pair(&mut inner_pairs, &location, &span)?),
        },
        Rule::label_stmt => AstNodeKind::Label {
            name: identifier_text(&rules::fetch_next_pair(&mut inner_pairs, &location, &span)?),
        },
        Rule::inline_html_stmt => AstNodeKind::InlineHtml {
            value: inner_pairs
                .find(|p| p.as_rule() == Rule::inline_text)
                .map(|p| p.as_str().to_string())
                .unwrap_or_default(),
        },
        Rule::nop_stmt => AstNodeKind::Nop,
        other => {
            return Err(syntax_error(
                format!("Unexpected statement type: {:?}", other),
                "phptac.stmt.parse_simple_statement_rule",
                &location,
                &span,
            ));
        }
    };
    Ok(AstNode::new(kind, location, span))
}

pub(crate) fn parse_param_list_rule(pair: Pair<Rule>, script: &script::Script) -> ParseListResult {
    let (inner_pairs, _, _) = rules::get_data_from_rule(&pair, script);
    inner_pairs
        .map(|param| {
            let (param_pairs, location, span) = rules::get_data_from_rule(&param, script);
            let mut name = None;
            let mut default = None;
            let mut by_ref = false;
            let mut variadic = false;
            let mut type_hint = None;
            for part in param_pairs {
                match part.as_rule() {
                    Rule::type_hint => type_hint = Some(part.as_str().split_whitespace().collect::<String>()),
                    Rule::by_ref => by_ref = true,
                    Rule::variadic => variadic = true,
                    Rule::variable => name = Some(part.as_str().trim_start_matches('$').to_string()),
                    Rule::expr => default = Some(Box::new(expr::parse_expression_rule(part, script)?)),
                    // promoted-property modifiers
                    _ => {}
                }
            }
            let name = name.ok_or_else(|| {
                syntax_error("Parameter without a name.", "phptac.stmt.parse_param_list_rule", &location, &span)
            })?;
            Ok(AstNode::new(
                AstNodeKind::Param {
                    name,
                    default,
                    by_ref,
                    variadic,
                    type_hint,
                },
                location,
                span,
            ))
        })
        .collect()
}

pub(crate) fn parse_name_list_rule(pair: Pair<Rule>, script: &script::Script) -> ParseListResult {
    let (inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let mut names = Vec::new();
    for inner in inner_pairs {
        match inner.as_rule() {
            Rule::qualified_name => names.push(expr::name_node(&inner, script)),
            Rule::name_list => names.extend(parse_name_list_rule(inner, script)?),
            other => {
                return Err(syntax_error(
                    format!("Unexpected rule in name list: {:?}", other),
                    "phptac.stmt.parse_name_list_rule",
                    &location,
                    &span,
                ));
            }
        }
    }
    Ok(names)
}

pub(crate) fn parse_extends_clause_rule(pair: Pair<Rule>, script: &script::Script) -> ParseResult {
    let (mut inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let name = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    Ok(expr::name_node(&name, script))
}

pub(crate) fn parse_class_body_rule(pair: Pair<Rule>, script: &script::Script) -> ParseListResult {
    let (inner_pairs, _, _) = rules::get_data_from_rule(&pair, script);
    inner_pairs
        .map(|member| {
            let (mut member_pairs, location, span) = rules::get_data_from_rule(&member, script);
            let inner = rules::fetch_next_pair(&mut member_pairs, &location, &span)?;
            parse_class_member_rule(inner, script)
        })
        .collect()
}

fn parse_class_member_rule(pair: Pair<Rule>, script: &script::Script) -> ParseResult {
    let rule = pair.as_rule();
    let (inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let kind = match rule {
        Rule::trait_use => {
            let mut traits = Vec::new();
            for part in inner_pairs {
                if part.as_rule() == Rule::name_list {
                    traits = parse_name_list_rule(part, script)?;
                }
            }
            AstNodeKind::TraitUse { traits }
        }
        Rule::class_const => {
            let items: Vec<Pair<Rule>> = inner_pairs.collect();
            let modifiers = items
                .iter()
                .filter(|p| p.as_rule() == Rule::member_modifier)
                .map(modifier_text)
                .collect();
            AstNodeKind::ClassConst {
                modifiers,
                items: parse_const_items(items.into_iter(), script)?,
            }
        }
        Rule::method_decl => {
            let mut name = String::new();
            let mut modifiers = Vec::new();
            let mut params = Vec::new();
            let mut body = None;
            let mut by_ref = false;
            for part in inner_pairs {
                match part.as_rule() {
                    Rule::member_modifier => modifiers.push(modifier_text(&part)),
                    Rule::by_ref => by_ref = true,
                    Rule::identifier => name = identifier_text(&part),
                    Rule::param_list => params = parse_param_list_rule(part, script)?,
                    Rule::block => body = Some(parse_block_rule(part, script)?),
                    _ => {}
                }
            }
            AstNodeKind::MethodDecl {
                name,
                modifiers,
                params,
                body,
                by_ref,
            }
        }
        Rule::property_decl => {
            let mut modifiers = Vec::new();
            let mut props = Vec::new();
            for part in inner_pairs {
                match part.as_rule() {
                    Rule::member_modifier => modifiers.push(modifier_text(&part)),
                    Rule::property_item => {
                        let (mut item_pairs, loc, sp) = rules::get_data_from_rule(&part, script);
                        let var = rules::fetch_next_pair(&mut item_pairs, &loc, &sp)?;
                        let default = match item_pairs.next() {
                            Some(value) => Some(Box::new(expr::parse_expression_rule(value, script)?)),
                            None => None,
                        };
                        props.push(AstNode::new(
                            AstNodeKind::PropertyItem {
                                name: var.as_str().trim_start_matches('$').to_string(),
                                default,
                            },
                            loc,
                            sp,
                        ));
                    }
                    // type hint
                    _ => {}
                }
            }
            AstNodeKind::PropertyDecl { modifiers, props }
        }
        other => {
            return Err(syntax_error(
                format!("Unexpected class member: {:?}", other),
                "phptac.stmt.parse_class_member_rule",
                &location,
                &span,
            ));
        }
    };
    Ok(AstNode::new(kind, location, span))
}

fn parse_declaration_rule(pair: Pair<Rule>, script: &script::Script) -> ParseResult {
    let rule = pair.as_rule();
    let (inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);

    let mut name = String::new();
    let mut modifiers = Vec::new();
    let mut params = Vec::new();
    let mut body = Vec::new();
    let mut members = Vec::new();
    let mut extends = None;
    let mut implements = Vec::new();
    let mut by_ref = false;
    for part in inner_pairs {
        match part.as_rule() {
            Rule::identifier => name = identifier_text(&part),
            Rule::class_modifier => modifiers.push(modifier_text(&part)),
            Rule::by_ref => by_ref = true,
            Rule::param_list => params = parse_param_list_rule(part, script)?,
            Rule::block => body = parse_block_rule(part, script)?,
            Rule::class_body => members = parse_class_body_rule(part, script)?,
            Rule::extends_clause => extends = Some(Box::new(parse_extends_clause_rule(part, script)?)),
            Rule::implements_clause | Rule::name_list => implements = parse_name_list_rule(part, script)?,
            // return type
            _ => {}
        }
    }

    let kind = match rule {
        Rule::function_decl => AstNodeKind::FunctionDecl {
            name,
            params,
            body,
            by_ref,
        },
        Rule::class_decl => AstNodeKind::ClassDecl {
            name: Some(name),
            modifiers,
            extends,
            implements,
            members,
        },
        Rule::interface_decl => AstNodeKind::InterfaceDecl {
            name,
            extends: implements,
            members,
        },
        _ => AstNodeKind::TraitDecl { name, members },
    };
    Ok(AstNode::new(kind, location, span))
}
