use crate::error::{Level, TacErrorExt};
use crate::location::{Location, Span};

use super::rules::Rule;

#[derive(Debug, Clone)]
pub struct SyntaxError {
    level: Level,
    message: String,
    issuer: String,
    location: Option<Location>,
    span: Option<Span>,
}

impl SyntaxError {
    pub fn with(level: Level, message: String, issuer: String, location: Option<Location>, span: Option<Span>) -> Self {
        SyntaxError {
            level,
            message,
            issuer,
            location,
            span,
        }
    }

    /// Converts a pest failure into a diagnostic anchored at the position
    /// where the grammar gave up.
    pub fn from_pest(error: pest::error::Error<Rule>, file: &str) -> Self {
        let (line, column) = match error.line_col {
            pest::error::LineColLocation::Pos(pos) => pos,
            pest::error::LineColLocation::Span(start, _) => start,
        };
        let location = Location::new(file.to_string(), line, column);
        SyntaxError {
            level: Level::Error,
            message: format!("Syntax error, {} on line {}", error.variant.message(), line),
            issuer: "phptac.ast.generate_ast_from_source".into(),
            location: Some(location.clone()),
            span: Some(Span::new(location.clone(), location)),
        }
    }
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(loc) = &self.location {
            write!(f, "{} (at {}:{}:{})", self.message, loc.file, loc.line, loc.column)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for SyntaxError {}

impl TacErrorExt for SyntaxError {
    fn level(&self) -> Level {
        self.level
    }

    fn message(&self) -> String {
        self.message.clone()
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

/// Shorthand for the boxed syntax error every parse function returns.
pub(crate) fn syntax_error(
    message: impl Into<String>,
    issuer: &str,
    location: &Option<Location>,
    span: &Option<Span>,
) -> Box<dyn TacErrorExt> {
    Box::<dyn TacErrorExt>::from(Box::new(SyntaxError::with(
        Level::Error,
        message.into(),
        issuer.to_string(),
        location.clone(),
        span.clone(),
    )))
}
