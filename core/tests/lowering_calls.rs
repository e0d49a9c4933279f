use phptac_core::ast::{AstNode, AstNodeKind};
use phptac_core::ir::lower::{lower_expr, LoweringContext};
use phptac_core::{ast, ir, LowerOptions, Script};

fn lower(src: &str) -> Vec<String> {
    let script = Script::from_source("calls.php", src);
    let ast = ast::generate_ast_from_source(&script).expect("failed to parse sample");
    ir::lower_ast_to_tac(&ast, &LowerOptions::default())
        .expect("failed to lower sample")
        .lines()
}

fn var(name: &str) -> AstNode {
    AstNode::bare(AstNodeKind::Variable { name: name.to_string() })
}

fn arg(value: AstNode) -> AstNode {
    AstNode::bare(AstNodeKind::Argument { value: Box::new(value), unpack: false, by_ref: false, name: None })
}

#[test]
fn call_gets_one_temp_and_one_effect() {
    let call = AstNode::bare(AstNodeKind::Call {
        callee: Box::new(AstNode::bare(AstNodeKind::Name { parts: vec!["f".into()], fully_qualified: false })),
        args: vec![arg(var("a")), arg(var("b"))],
    });
    let mut ctx = LoweringContext::default();
    let lowered = lower_expr(Some(&call), &mut ctx).unwrap();
    assert_eq!(lowered.value, "t0");
    assert_eq!(lowered.effects.len(), 1);
    assert_eq!(lowered.effects[0].to_string(), "t0 = f($a, $b);");

    // Lowering the same node again yields nothing and allocates nothing.
    let again = lower_expr(Some(&call), &mut ctx).unwrap();
    assert!(again.is_empty());
    assert_eq!(ctx.new_temp(), "t1");
}

#[test]
fn nested_call_arguments_are_evaluated_first() {
    let lines = lower("<?php $r = f($a, g($b));");
    assert_eq!(lines, vec!["t0 = g($b);", "t1 = f($a, t0);", "$r = t1;"]);
}

#[test]
fn bare_call_statement_has_no_trailing_temp() {
    let lines = lower("<?php f(1); $o->m(1)->n(); A::b($x);");
    assert_eq!(
        lines,
        vec!["t0 = f(1);", "t1 = $o->m(1);", "t2 = t1->n();", "t3 = A::b($x);"]
    );
}

#[test]
fn spread_and_named_arguments_keep_markers() {
    let lines = lower("<?php f(...$xs, key: 1);");
    assert_eq!(lines, vec!["t0 = f(...$xs, key: 1);"]);
}

#[test]
fn new_has_no_temp() {
    let lines = lower("<?php $o = new Foo($a, h());");
    assert_eq!(lines, vec!["t0 = h();", "$o = new Foo($a, t0);"]);
}

#[test]
fn include_is_emitted_as_an_effect() {
    let lines = lower("<?php include 'a.php'; require_once $path;");
    assert_eq!(lines, vec!["include 'a.php';", "require_once $path;"]);
}

#[test]
fn closures_render_inline() {
    let lines = lower("<?php $f = function ($x) use ($y) { return $x + $y; };");
    assert_eq!(lines, vec!["$f = function ($x) use ($y) { return $x + $y; };"]);

    let lines = lower("<?php $g = fn($x) => $x * 2;");
    assert_eq!(lines, vec!["$g = fn ($x) { return $x * 2; };"]);
}

#[test]
fn call_inside_closure_stays_inside() {
    let lines = lower("<?php $f = function () { log_it(); };");
    assert_eq!(lines, vec!["$f = function () { t0 = log_it(); };"]);
}

#[test]
fn binary_operands_keep_left_to_right_effects() {
    let lines = lower("<?php echo f() . g();");
    assert_eq!(lines, vec!["t0 = f();", "t1 = g();", "echo t0 . t1;"]);
}

#[test]
fn calls_in_short_circuit_operands_are_hoisted() {
    let lines = lower("<?php $x = $a && f(); $y = $c ? f() : g();");
    assert_eq!(
        lines,
        vec!["t0 = f();", "$x = $a && t0;", "t1 = f();", "t2 = g();", "$y = ($c ? t1 : t2);"]
    );
}
