//! Lowering of the PHP AST into a flat three-address listing.
//!
//! Expressions lower to a value plus the instructions that must run before
//! it (`lower_expr`); statements lower to instruction sequences
//! (`lower_stmt`); declarations, closures and anonymous classes live in
//! `lower_objects`. All state for one file sits in a `LoweringContext`.

pub mod err;
pub mod lower_expr;
pub mod lower_objects;
pub mod lower_stmt;
pub mod lowering_context;
pub mod names;
pub mod operators;

pub use err::{LowerResult, LoweringError, LoweringErrorKind};
pub use lower_expr::{lower_expr, Lowered};
pub use lower_stmt::{lower_all, lower_stmt};
pub use lowering_context::{BreakFrame, LabelPair, LoweringContext};

use crate::ast::AstNode;
use crate::config::LowerOptions;

use super::instr::Listing;

/// Lowers a whole file with a fresh context.
pub fn lower_script(ast: &AstNode, options: &LowerOptions) -> LowerResult<Listing> {
    let mut ctx = LoweringContext::new(options.clone());
    let instructions = lower_stmt(ast, &mut ctx)?;
    log::debug!("lowered {} into {} instructions", ast, instructions.len());
    Ok(Listing::new(instructions))
}
