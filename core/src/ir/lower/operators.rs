//! file: core/src/ir/lower/operators.rs
//! description: operator kinds to their PHP tokens.

use crate::ast::{AstNode, AstNodeKind, BinaryOperator, CastType, IncludeKind, UnaryOperator};

use super::err::{LowerResult, LoweringError, LoweringErrorKind};

pub fn binary_token(op: BinaryOperator) -> &'static str {
    match op {
        BinaryOperator::Add => "+",
        BinaryOperator::Sub => "-",
        BinaryOperator::Mul => "*",
        BinaryOperator::Div => "/",
        BinaryOperator::Mod => "%",
        BinaryOperator::Pow => "**",
        BinaryOperator::Concat => ".",
        BinaryOperator::ShiftLeft => "<<",
        BinaryOperator::ShiftRight => ">>",
        BinaryOperator::BitAnd => "&",
        BinaryOperator::BitOr => "|",
        BinaryOperator::BitXor => "^",
        BinaryOperator::BooleanAnd => "&&",
        BinaryOperator::BooleanOr => "||",
        BinaryOperator::LogicalAnd => "and",
        BinaryOperator::LogicalOr => "or",
        BinaryOperator::LogicalXor => "xor",
        BinaryOperator::Eq => "==",
        BinaryOperator::Ne => "!=",
        BinaryOperator::Identical => "===",
        BinaryOperator::NotIdentical => "!==",
        BinaryOperator::Lt => "<",
        BinaryOperator::Le => "<=",
        BinaryOperator::Gt => ">",
        BinaryOperator::Ge => ">=",
        BinaryOperator::Spaceship => "<=>",
        BinaryOperator::Coalesce => "??",
    }
}

/// Binding strength, higher binds tighter. Matches the parser's table.
pub fn precedence(op: BinaryOperator) -> u8 {
    match op {
        BinaryOperator::LogicalOr => 1,
        BinaryOperator::LogicalXor => 2,
        BinaryOperator::LogicalAnd => 3,
        BinaryOperator::Coalesce => 6,
        BinaryOperator::BooleanOr => 7,
        BinaryOperator::BooleanAnd => 8,
        BinaryOperator::BitOr => 9,
        BinaryOperator::BitXor => 10,
        BinaryOperator::BitAnd => 11,
        BinaryOperator::Eq
        | BinaryOperator::Ne
        | BinaryOperator::Identical
        | BinaryOperator::NotIdentical
        | BinaryOperator::Spaceship => 12,
        BinaryOperator::Lt | BinaryOperator::Le | BinaryOperator::Gt | BinaryOperator::Ge => 13,
        BinaryOperator::Concat => 14,
        BinaryOperator::ShiftLeft | BinaryOperator::ShiftRight => 15,
        BinaryOperator::Add | BinaryOperator::Sub => 16,
        BinaryOperator::Mul | BinaryOperator::Div | BinaryOperator::Mod => 17,
        BinaryOperator::Pow => 19,
    }
}

fn is_right_assoc(op: BinaryOperator) -> bool {
    matches!(op, BinaryOperator::Pow | BinaryOperator::Coalesce)
}

/// Whether `child` must be parenthesized as the left or right operand of
/// `parent` to keep the tree's grouping when printed.
pub fn needs_group(child: &AstNode, parent: BinaryOperator, right_side: bool) -> bool {
    match child.get_kind() {
        AstNodeKind::BinaryOp { op, .. } => {
            let (inner, outer) = (precedence(*op), precedence(parent));
            inner < outer || (inner == outer && right_side != is_right_assoc(parent))
        }
        AstNodeKind::Assign { .. } | AstNodeKind::AssignRef { .. } | AstNodeKind::AssignOp { .. } => true,
        // `(-$a) ** 2`
        AstNodeKind::UnaryOp { op, .. } => parent == BinaryOperator::Pow && !right_side && !op.is_postfix(),
        AstNodeKind::Cast { .. } => parent == BinaryOperator::Pow && !right_side,
        _ => false,
    }
}

/// Operand of a prefix operator or cast.
pub fn needs_group_under_unary(child: &AstNode) -> bool {
    matches!(
        child.get_kind(),
        AstNodeKind::BinaryOp { .. }
            | AstNodeKind::Assign { .. }
            | AstNodeKind::AssignRef { .. }
            | AstNodeKind::AssignOp { .. }
            | AstNodeKind::InstanceOf { .. }
    )
}

pub fn group(value: String) -> String {
    format!("({})", value)
}

/// Compound assignment form, if PHP has one for the operator.
pub fn compound_token(op: BinaryOperator) -> Option<&'static str> {
    let token = match op {
        BinaryOperator::Add => "+=",
        BinaryOperator::Sub => "-=",
        BinaryOperator::Mul => "*=",
        BinaryOperator::Div => "/=",
        BinaryOperator::Mod => "%=",
        BinaryOperator::Pow => "**=",
        BinaryOperator::Concat => ".=",
        BinaryOperator::ShiftLeft => "<<=",
        BinaryOperator::ShiftRight => ">>=",
        BinaryOperator::BitAnd => "&=",
        BinaryOperator::BitOr => "|=",
        BinaryOperator::BitXor => "^=",
        BinaryOperator::Coalesce => "??=",
        _ => return None,
    };
    Some(token)
}

/// Token for a binary or compound-assignment node.
pub fn resolve_operator(node: &AstNode) -> LowerResult<&'static str> {
    let unsupported = |name: String| {
        LoweringError::new(
            LoweringErrorKind::UnsupportedOperatorKind(name),
            "phptac.ir.lower.operators.resolve_operator",
            node,
        )
    };
    match node.get_kind() {
        AstNodeKind::BinaryOp { op, .. } => Ok(binary_token(*op)),
        AstNodeKind::AssignOp { op, .. } => compound_token(*op).ok_or_else(|| unsupported(format!("{:?}", op))),
        other => Err(unsupported(other.to_string())),
    }
}

pub fn unary_token(op: UnaryOperator) -> &'static str {
    match op {
        UnaryOperator::Plus => "+",
        UnaryOperator::Minus => "-",
        UnaryOperator::Not => "!",
        UnaryOperator::BitNot => "~",
        UnaryOperator::Silence => "@",
        UnaryOperator::PreInc | UnaryOperator::PostInc => "++",
        UnaryOperator::PreDec | UnaryOperator::PostDec => "--",
    }
}

pub fn cast_token(ty: CastType) -> &'static str {
    match ty {
        CastType::Int => "(int)",
        CastType::Float => "(float)",
        CastType::String => "(string)",
        CastType::Bool => "(bool)",
        CastType::Array => "(array)",
        CastType::Object => "(object)",
        CastType::Unset => "(unset)",
    }
}

pub fn include_keyword(kind: IncludeKind) -> &'static str {
    match kind {
        IncludeKind::Include => "include",
        IncludeKind::IncludeOnce => "include_once",
        IncludeKind::Require => "require",
        IncludeKind::RequireOnce => "require_once",
    }
}
