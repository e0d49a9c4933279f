use phptac_core::ast::{self, AstNodeKind, BinaryOperator};
use phptac_core::{compile_source_to_tac, LowerOptions, Script, TacErrorExt};

#[test]
fn parse_simple_script_returns_ast() {
    let script = Script::from_source("p.php", "<?php $a = 1 + 2 * 3; echo $a;");
    let ast = ast::generate_ast_from_source(&script).expect("failed to parse sample");

    let AstNodeKind::Script { body } = ast.get_kind() else {
        panic!("Unexpected AST root kind: {:?}", ast.get_kind());
    };
    assert_eq!(body.len(), 2);

    let AstNodeKind::ExpressionStmt { expr } = body[0].get_kind() else {
        panic!("expected an expression statement, got {:?}", body[0]);
    };
    let AstNodeKind::Assign { value, .. } = expr.get_kind() else {
        panic!("expected an assignment, got {:?}", expr);
    };
    match value.get_kind() {
        AstNodeKind::BinaryOp { op, right, .. } => {
            assert_eq!(*op, BinaryOperator::Add);
            assert!(matches!(right.get_kind(), AstNodeKind::BinaryOp { op: BinaryOperator::Mul, .. }));
        }
        other => panic!("expected addition at the top, got {:?}", other),
    }
    assert!(matches!(body[1].get_kind(), AstNodeKind::Echo { .. }));
}

#[test]
fn nodes_carry_source_locations() {
    let script = Script::from_source("loc.php", "<?php\n\n  echo 1;");
    let ast = ast::generate_ast_from_source(&script).unwrap();
    let AstNodeKind::Script { body } = ast.get_kind() else { unreachable!() };
    let loc = body[0].get_location().expect("statement has a location");
    assert_eq!(loc.file, "loc.php");
    assert_eq!(loc.line, 3);
    assert_eq!(loc.column, 3);
}

#[test]
fn syntax_error_is_reported_with_position() {
    let script = Script::from_source("broken.php", "<?php\n$a = ;");
    let err = ast::generate_ast_from_source(&script).unwrap_err();
    assert!(err.message().starts_with("Syntax error"), "{}", err.message());
    let loc = err.location().expect("syntax error has a location");
    assert_eq!(loc.file, "broken.php");
    assert_eq!(loc.line, 2);
}

#[test]
fn empty_file_gives_empty_listing() {
    let script = Script::from_source("empty.php", "");
    let ast = ast::generate_ast_from_source(&script).unwrap();
    assert!(matches!(ast.get_kind(), AstNodeKind::Script { body } if body.is_empty()));

    let listing = compile_source_to_tac(&script, &LowerOptions::default()).unwrap();
    assert!(listing.is_empty());
    assert_eq!(listing.render(), "");
}

#[test]
fn grouping_survives_lowering() {
    let script = Script::from_source(
        "prec.php",
        "<?php $x = ($a + $b) * $c; $y = !$a && $b; $z = $a - ($b - $c); $w = !($a && $b); $v = $a * $b + $c;",
    );
    let listing = compile_source_to_tac(&script, &LowerOptions::default()).unwrap();
    assert_eq!(
        listing.lines(),
        vec![
            "$x = ($a + $b) * $c;",
            "$y = !$a && $b;",
            "$z = $a - ($b - $c);",
            "$w = !($a && $b);",
            "$v = $a * $b + $c;",
        ]
    );
}

#[test]
fn group_use_imports_parse_and_lower() {
    let script = Script::from_source(
        "imports.php",
        "<?php use PhpParser\\{Node, NodeTraverser as T, function helper}; use function Lib\\{f, g,}; use PhpParser\\Error;",
    );
    let ast = ast::generate_ast_from_source(&script).expect("group use should parse");
    let AstNodeKind::Script { body } = ast.get_kind() else { unreachable!() };
    match body[0].get_kind() {
        AstNodeKind::Use { kind, prefix, items } => {
            assert_eq!(*kind, None);
            assert!(matches!(
                prefix.as_deref().map(|p| p.get_kind()),
                Some(AstNodeKind::Name { parts, .. }) if parts == &vec!["PhpParser".to_string()]
            ));
            assert_eq!(items.len(), 3);
        }
        other => panic!("expected a use statement, got {:?}", other),
    }

    let listing = compile_source_to_tac(&script, &LowerOptions::default()).unwrap();
    assert_eq!(
        listing.lines(),
        vec![
            "use PhpParser\\{Node, NodeTraverser as T, function helper};",
            "use function Lib\\{f, g};",
            "use PhpParser\\Error;",
        ]
    );
}

#[test]
fn nesting_past_the_limit_is_a_syntax_error() {
    let mut src = String::from("<?php ");
    for _ in 0..12 {
        src.push_str("if ($a) { ");
    }
    src.push_str("echo 1; ");
    for _ in 0..12 {
        src.push_str("} ");
    }
    let script = Script::from_source("deep.php", src);

    let err = ast::generate_ast_with_depth_limit(&script, 8).unwrap_err();
    assert_eq!(err.message(), "Nesting limit of 8 exceeded");
    assert_eq!(err.location().expect("limit error has a location").file, "deep.php");

    assert!(ast::generate_ast_with_depth_limit(&script, 64).is_ok());
}
