use phptac_core::ast::{AstNode, AstNodeKind, BinaryOperator, UnaryOperator};
use phptac_core::ir::lower::{lower_expr, LoweringContext, LoweringErrorKind};

fn var(name: &str) -> AstNode {
    AstNode::bare(AstNodeKind::Variable { name: name.to_string() })
}

fn binary(op: BinaryOperator) -> AstNode {
    AstNode::bare(AstNodeKind::BinaryOp {
        left: Box::new(var("a")),
        op,
        right: Box::new(var("b")),
    })
}

#[test]
fn every_binary_operator_prints_its_token() {
    let table = [
        (BinaryOperator::Add, "+"),
        (BinaryOperator::Sub, "-"),
        (BinaryOperator::Mul, "*"),
        (BinaryOperator::Div, "/"),
        (BinaryOperator::Mod, "%"),
        (BinaryOperator::Pow, "**"),
        (BinaryOperator::Concat, "."),
        (BinaryOperator::ShiftLeft, "<<"),
        (BinaryOperator::ShiftRight, ">>"),
        (BinaryOperator::BitAnd, "&"),
        (BinaryOperator::BitOr, "|"),
        (BinaryOperator::BitXor, "^"),
        (BinaryOperator::BooleanAnd, "&&"),
        (BinaryOperator::BooleanOr, "||"),
        (BinaryOperator::LogicalAnd, "and"),
        (BinaryOperator::LogicalOr, "or"),
        (BinaryOperator::LogicalXor, "xor"),
        (BinaryOperator::Eq, "=="),
        (BinaryOperator::Ne, "!="),
        (BinaryOperator::Identical, "==="),
        (BinaryOperator::NotIdentical, "!=="),
        (BinaryOperator::Lt, "<"),
        (BinaryOperator::Le, "<="),
        (BinaryOperator::Gt, ">"),
        (BinaryOperator::Ge, ">="),
        (BinaryOperator::Spaceship, "<=>"),
        (BinaryOperator::Coalesce, "??"),
    ];
    let mut ctx = LoweringContext::default();
    for (op, token) in table {
        let lowered = lower_expr(Some(&binary(op)), &mut ctx).unwrap();
        assert_eq!(lowered.value, format!("$a {} $b", token));
        assert!(lowered.effects.is_empty(), "{:?} produced effects", op);
    }
}

#[test]
fn compound_assignment_uses_assign_token() {
    let node = AstNode::bare(AstNodeKind::AssignOp {
        op: BinaryOperator::Coalesce,
        target: Box::new(var("a")),
        value: Box::new(var("b")),
    });
    let lowered = lower_expr(Some(&node), &mut LoweringContext::default()).unwrap();
    assert_eq!(lowered.value, "$a ??= $b");
}

#[test]
fn compound_assignment_without_php_form_is_rejected() {
    let node = AstNode::bare(AstNodeKind::AssignOp {
        op: BinaryOperator::Identical,
        target: Box::new(var("a")),
        value: Box::new(var("b")),
    });
    let err = lower_expr(Some(&node), &mut LoweringContext::default()).unwrap_err();
    assert!(matches!(err.kind(), LoweringErrorKind::UnsupportedOperatorKind(_)));
}

#[test]
fn unary_operators_respect_fix() {
    let mut ctx = LoweringContext::default();
    let cases = [
        (UnaryOperator::Not, "!$a"),
        (UnaryOperator::Minus, "-$a"),
        (UnaryOperator::BitNot, "~$a"),
        (UnaryOperator::Silence, "@$a"),
        (UnaryOperator::PreInc, "++$a"),
        (UnaryOperator::PostInc, "$a++"),
        (UnaryOperator::PostDec, "$a--"),
    ];
    for (op, expected) in cases {
        let node = AstNode::bare(AstNodeKind::UnaryOp { op, expr: Box::new(var("a")) });
        assert_eq!(lower_expr(Some(&node), &mut ctx).unwrap().value, expected);
    }
}

fn op(left: AstNode, op: BinaryOperator, right: AstNode) -> AstNode {
    AstNode::bare(AstNodeKind::BinaryOp { left: Box::new(left), op, right: Box::new(right) })
}

#[test]
fn looser_operands_are_grouped() {
    let mut ctx = LoweringContext::default();
    let cases = [
        (op(op(var("a"), BinaryOperator::Add, var("b")), BinaryOperator::Mul, var("c")), "($a + $b) * $c"),
        (op(var("a"), BinaryOperator::Mul, op(var("b"), BinaryOperator::Add, var("c"))), "$a * ($b + $c)"),
        (op(op(var("a"), BinaryOperator::Mul, var("b")), BinaryOperator::Add, var("c")), "$a * $b + $c"),
        (op(op(var("a"), BinaryOperator::Sub, var("b")), BinaryOperator::Sub, var("c")), "$a - $b - $c"),
        (op(var("a"), BinaryOperator::Sub, op(var("b"), BinaryOperator::Sub, var("c"))), "$a - ($b - $c)"),
        (op(var("a"), BinaryOperator::Coalesce, op(var("b"), BinaryOperator::Coalesce, var("c"))), "$a ?? $b ?? $c"),
        (op(op(var("a"), BinaryOperator::Pow, var("b")), BinaryOperator::Pow, var("c")), "($a ** $b) ** $c"),
        (op(op(var("a"), BinaryOperator::BooleanOr, var("b")), BinaryOperator::BooleanAnd, var("c")), "($a || $b) && $c"),
    ];
    for (node, expected) in cases {
        assert_eq!(lower_expr(Some(&node), &mut ctx).unwrap().value, expected);
    }
}

#[test]
fn unary_operand_grouping() {
    let mut ctx = LoweringContext::default();
    let not_and = AstNode::bare(AstNodeKind::UnaryOp {
        op: UnaryOperator::Not,
        expr: Box::new(op(var("a"), BinaryOperator::BooleanAnd, var("b"))),
    });
    assert_eq!(lower_expr(Some(&not_and), &mut ctx).unwrap().value, "!($a && $b)");

    let neg = AstNode::bare(AstNodeKind::UnaryOp { op: UnaryOperator::Minus, expr: Box::new(var("a")) });
    let pow = op(neg, BinaryOperator::Pow, var("b"));
    assert_eq!(lower_expr(Some(&pow), &mut ctx).unwrap().value, "(-$a) ** $b");
}
