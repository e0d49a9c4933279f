use phptac_core::{ast, ir, LowerOptions, Script};

fn lower(src: &str) -> Vec<String> {
    let script = Script::from_source("decls.php", src);
    let ast = ast::generate_ast_from_source(&script).expect("failed to parse sample");
    ir::lower_ast_to_tac(&ast, &LowerOptions::default())
        .expect("failed to lower sample")
        .lines()
}

#[test]
fn function_declaration_wraps_its_body() {
    let lines = lower("<?php function add(int $a, $b = 1, ...$rest) { return $a + $b; }");
    assert_eq!(
        lines,
        vec!["function add(int $a, $b = 1, ...$rest) {", "return $a + $b;", "}"]
    );
}

#[test]
fn class_members_are_lowered_in_order() {
    let lines = lower(
        r#"<?php
final class A extends B implements C, D {
    use T;
    const X = 1;
    public $p = 2;
    var $q;
    private static function f($x) {
        return $x;
    }
    abstract public function g();
}
"#,
    );
    assert_eq!(
        lines,
        vec![
            "final class A extends B implements C, D {",
            "use T;",
            "const X = 1;",
            "public $p = 2;",
            "var $q;",
            "private static function f($x) {",
            "return $x;",
            "}",
            "abstract public function g();",
            "}",
        ]
    );
}

#[test]
fn interface_and_trait_headers() {
    let lines = lower("<?php interface I extends J, K { public function m(); } trait T { }");
    assert_eq!(
        lines,
        vec!["interface I extends J, K {", "public function m();", "}", "trait T {", "}"]
    );
}

#[test]
fn function_body_does_not_see_enclosing_loop() {
    let lines = lower("<?php while ($a) { function f() { break; } }");
    let header = lines.iter().position(|l| l == "function f() {").unwrap();
    assert_eq!(lines[header + 1], "break;");
}

#[test]
fn namespaces_and_imports_keep_full_names() {
    let lines = lower(
        "<?php namespace App\\Models; use Foo\\Bar as Baz, Qux; use function Lib\\helper; class M extends \\Base\\Model { }",
    );
    assert_eq!(
        lines,
        vec![
            "namespace App\\Models;",
            "use Foo\\Bar as Baz, Qux;",
            "use function Lib\\helper;",
            "class M extends \\Base\\Model {",
            "}",
        ]
    );
}

#[test]
fn try_catch_finally_is_textual() {
    let lines = lower("<?php try { risky(); } catch (A | B $e) { echo 1; } finally { echo 2; }");
    assert_eq!(
        lines,
        vec![
            "try {",
            "t0 = risky();",
            "}",
            "catch (A | B $e) {",
            "echo 1;",
            "}",
            "finally {",
            "echo 2;",
            "}",
        ]
    );
}

#[test]
fn simple_statements_use_fixed_templates() {
    let lines = lower(
        "<?php declare(strict_types=1); const LIMIT = 10; global $db, $log; static $n = 0, $m; unset($a[1], $b); throw new E('x'); goto done; done: echo 1;",
    );
    assert_eq!(
        lines,
        vec![
            "declare(strict_types=1);",
            "const LIMIT = 10;",
            "global $db, $log;",
            "static $n = 0, $m;",
            "unset($a[1], $b);",
            "throw new E('x');",
            "goto done;",
            "done:",
            "echo 1;",
        ]
    );
}

#[test]
fn anonymous_class_renders_inline() {
    let lines = lower("<?php $o = new class($x) extends Base { public $v = 1; };");
    assert_eq!(lines, vec!["$o = new class($x) extends Base { public $v = 1; };"]);
}

#[test]
fn inline_html_is_dropped() {
    let lines = lower("<h1>Title</h1>\n<?php echo $t; ?>\n<p>footer</p>");
    assert_eq!(lines, vec!["echo $t;"]);
}
