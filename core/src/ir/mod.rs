pub mod instr;
pub mod lower;

pub use self::instr::{Instruction, Listing};

use crate::ast::AstNode;
use crate::config::LowerOptions;
use crate::error::TacErrorExt;

pub fn lower_ast_to_tac(ast: &AstNode, options: &LowerOptions) -> Result<Listing, Box<dyn TacErrorExt>> {
    lower::lower_script(ast, options).map_err(|e| Box::new(e) as Box<dyn TacErrorExt>)
}
