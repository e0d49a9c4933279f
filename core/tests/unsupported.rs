use phptac_core::ast::{AstNode, AstNodeKind, UnaryOperator};
use phptac_core::ir::lower::{lower_expr, lower_stmt, LoweringContext, LoweringErrorKind};
use phptac_core::{generate_error_report, Location, LowerOptions, TacErrorExt};

fn var(name: &str) -> AstNode {
    AstNode::bare(AstNodeKind::Variable { name: name.to_string() })
}

#[test]
fn bare_expression_is_not_a_statement() {
    let err = lower_stmt(&var("a"), &mut LoweringContext::default()).unwrap_err();
    assert_eq!(err.kind(), &LoweringErrorKind::UnsupportedStatementKind("Variable".into()));
    assert_eq!(err.message(), "Unsupported statement kind: Variable");
}

#[test]
fn statement_is_not_an_expression() {
    let echo = AstNode::bare(AstNodeKind::Echo { exprs: vec![var("a")] });
    let err = lower_expr(Some(&echo), &mut LoweringContext::default()).unwrap_err();
    assert_eq!(err.kind(), &LoweringErrorKind::UnsupportedExpressionKind("Echo".into()));
    assert_eq!(err.to_string(), "Unsupported expression kind: Echo");
}

#[test]
fn parameter_outside_a_declaration_is_rejected() {
    let param = AstNode::bare(AstNodeKind::Param {
        name: "x".into(),
        default: None,
        by_ref: false,
        variadic: false,
        type_hint: None,
    });
    let err = lower_stmt(&param, &mut LoweringContext::default()).unwrap_err();
    assert_eq!(err.kind(), &LoweringErrorKind::UnsupportedStatementKind("Param".into()));
}

#[test]
fn error_report_carries_the_node_location() {
    let mut node = var("a");
    node.location = Some(Location::new("bad.php".into(), 3, 7));
    let err = lower_stmt(&node, &mut LoweringContext::default()).unwrap_err();
    assert_eq!(err.to_string(), "Unsupported statement kind: Variable (at bad.php:3:7)");
    assert_eq!(
        generate_error_report(&err),
        "PHPTAC | ERROR | bad.php:3:7 | Unsupported statement kind: Variable"
    );
}

#[test]
fn deep_nesting_stops_at_the_limit() {
    let mut expr = var("a");
    for _ in 0..10 {
        expr = AstNode::bare(AstNodeKind::UnaryOp { op: UnaryOperator::Not, expr: Box::new(expr) });
    }
    let mut ctx = LoweringContext::new(LowerOptions { max_depth: 5, ..LowerOptions::default() });
    let err = lower_expr(Some(&expr), &mut ctx).unwrap_err();
    assert_eq!(err.kind(), &LoweringErrorKind::NestingLimitExceeded(5));
    assert_eq!(err.message(), "Nesting limit of 5 exceeded");
}

#[test]
fn shallow_nesting_is_fine_under_the_limit() {
    let mut expr = var("a");
    for _ in 0..3 {
        expr = AstNode::bare(AstNodeKind::UnaryOp { op: UnaryOperator::Not, expr: Box::new(expr) });
    }
    let mut ctx = LoweringContext::new(LowerOptions { max_depth: 5, ..LowerOptions::default() });
    assert_eq!(lower_expr(Some(&expr), &mut ctx).unwrap().value, "!!!$a");
}
