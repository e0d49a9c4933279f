//! file: core/src/ir/lower/err.rs
//! description: errors raised while lowering an AST to TAC.

use crate::ast::AstNode;
use crate::error::{Level, TacErrorExt};
use crate::location::{Location, Span};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoweringErrorKind {
    UnsupportedExpressionKind(String),
    UnsupportedStatementKind(String),
    UnsupportedOperatorKind(String),
    NestingLimitExceeded(usize),
}

impl std::fmt::Display for LoweringErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoweringErrorKind::UnsupportedExpressionKind(kind) => write!(f, "Unsupported expression kind: {}", kind),
            LoweringErrorKind::UnsupportedStatementKind(kind) => write!(f, "Unsupported statement kind: {}", kind),
            LoweringErrorKind::UnsupportedOperatorKind(kind) => write!(f, "Unsupported operator kind: {}", kind),
            LoweringErrorKind::NestingLimitExceeded(limit) => write!(f, "Nesting limit of {} exceeded", limit),
        }
    }
}

/// A construct with no lowering rule. Aborts the current file.
#[derive(Debug, Clone)]
pub struct LoweringError {
    kind: LoweringErrorKind,
    issuer: String,
    location: Option<Location>,
    span: Option<Span>,
}

impl LoweringError {
    pub fn new(kind: LoweringErrorKind, issuer: &str, node: &AstNode) -> Self {
        LoweringError {
            kind,
            issuer: issuer.to_string(),
            location: node.location.clone(),
            span: node.span.clone(),
        }
    }

    pub fn kind(&self) -> &LoweringErrorKind {
        &self.kind
    }

    pub fn unsupported_expression(node: &AstNode) -> Self {
        Self::new(
            LoweringErrorKind::UnsupportedExpressionKind(node.kind.to_string()),
            "phptac.ir.lower.lower_expr",
            node,
        )
    }

    pub fn unsupported_statement(node: &AstNode) -> Self {
        Self::new(
            LoweringErrorKind::UnsupportedStatementKind(node.kind.to_string()),
            "phptac.ir.lower.lower_stmt",
            node,
        )
    }
}

impl std::fmt::Display for LoweringError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.location {
            Some(loc) => write!(f, "{} (at {})", self.kind, loc),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for LoweringError {}

impl TacErrorExt for LoweringError {
    fn level(&self) -> Level {
        Level::Error
    }

    fn message(&self) -> String {
        self.kind.to_string()
    }

    fn issuer(&self) -> String {
        self.issuer.clone()
    }

    fn span(&self) -> Option<Span> {
        self.span.clone()
    }

    fn location(&self) -> Option<Location> {
        self.location.clone()
    }
}

pub type LowerResult<T> = Result<T, LoweringError>;
