use pest::iterators::Pair;
use pest_derive::Parser;

use crate::location;

#[derive(Parser)]
#[grammar = "ast/grammar.pest"]

pub struct RulesParser;

/// Inner pairs of a rule with keyword tokens removed. Keywords are atomic
/// rules in the grammar so that `else if` and `new Foo` keep their word
/// boundaries, but they carry nothing the AST builders need.
pub(crate) type Inner<'a> = std::vec::IntoIter<Pair<'a, Rule>>;

pub(crate) fn is_keyword(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::kw_abstract
            | Rule::kw_array
            | Rule::kw_as
            | Rule::kw_break
            | Rule::kw_case
            | Rule::kw_catch
            | Rule::kw_class
            | Rule::kw_const
            | Rule::kw_continue
            | Rule::kw_declare
            | Rule::kw_default
            | Rule::kw_die
            | Rule::kw_do
            | Rule::kw_echo
            | Rule::kw_else
            | Rule::kw_elseif
            | Rule::kw_empty
            | Rule::kw_eval
            | Rule::kw_exit
            | Rule::kw_extends
            | Rule::kw_final
            | Rule::kw_finally
            | Rule::kw_fn
            | Rule::kw_for
            | Rule::kw_foreach
            | Rule::kw_from
            | Rule::kw_function
            | Rule::kw_global
            | Rule::kw_goto
            | Rule::kw_if
            | Rule::kw_implements
            | Rule::kw_instanceof
            | Rule::kw_interface
            | Rule::kw_isset
            | Rule::kw_list
            | Rule::kw_namespace
            | Rule::kw_new
            | Rule::kw_private
            | Rule::kw_protected
            | Rule::kw_public
            | Rule::kw_readonly
            | Rule::kw_return
            | Rule::kw_static
            | Rule::kw_switch
            | Rule::kw_throw
            | Rule::kw_trait
            | Rule::kw_try
            | Rule::kw_unset
            | Rule::kw_use
            | Rule::kw_var
            | Rule::kw_while
            | Rule::kw_yield
    )
}

pub(crate) fn fetch_next_pair<'a>(
    pairs: &mut Inner<'a>,
    location: &Option<location::Location>,
    span: &Option<location::Span>,
) -> Result<Pair<'a, Rule>, Box<dyn crate::TacErrorExt>> {
    match pairs.next() {
        Some(pair) => Ok(pair),
        None => Err(crate::ast::err::syntax_error(
            "Expected more inner pairs but found none.",
            "phptac.ast.rules.fetch_next_pair",
            location,
            span,
        )),
    }
}

pub(crate) fn get_data_from_rule<'a>(
    rule: &Pair<'a, Rule>,
    script: &crate::script::Script,
) -> (
    Inner<'a>,
    Option<crate::location::Location>,
    Option<crate::location::Span>,
) {
    let inner_rules: Vec<Pair<'a, Rule>> = rule
        .clone()
        .into_inner()
        .filter(|p| !is_keyword(p.as_rule()))
        .collect();
    let span = get_span_from_pair(rule, script);
    let location = get_location_from_pair(rule, script);
    (inner_rules.into_iter(), location, span)
}

/// True when the rule's direct children include the given keyword or
/// marker rule such as `by_ref`.
pub(crate) fn has_keyword(rule: &Pair<Rule>, keyword: Rule) -> bool {
    rule.clone().into_inner().any(|p| p.as_rule() == keyword)
}

pub fn get_location_from_pair(
    rule: &Pair<Rule>,
    script: &crate::script::Script,
) -> Option<crate::location::Location> {
    let (line, column) = rule.line_col();
    Some(crate::location::Location::new(script.name.clone(), line, column))
}

/// The end position is derived from the matched text so that only the start
/// goes through pest's line index.
pub fn get_span_from_pair(
    rule: &Pair<Rule>,
    script: &crate::script::Script,
) -> Option<crate::location::Span> {
    let (start_line, start_column) = rule.line_col();
    let text = rule.as_str();
    let (end_line, end_column) = match text.rfind('\n') {
        Some(last) => (
            start_line + text.matches('\n').count(),
            text[last + 1..].chars().count() + 1,
        ),
        None => (start_line, start_column + text.chars().count()),
    };
    Some(crate::location::Span::new(
        crate::location::Location::new(script.name.clone(), start_line, start_column),
        crate::location::Location::new(script.name.clone(), end_line, end_column),
    ))
}
