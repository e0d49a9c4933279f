pub mod ast;
pub mod batch;
pub mod config;
pub mod error;
pub mod ir;
pub mod location;
pub mod reports;
pub mod script;

pub use ast::{generate_ast_from_source, generate_ast_with_depth_limit, RulesParser};
pub use batch::{convert_directory, run_with_stack};
pub use config::{BatchOptions, LowerOptions, TacConfig};
pub use error::{Level, TacErrorExt};
pub use ir::{lower_ast_to_tac, Instruction, Listing};
pub use location::{Location, Span};
pub use reports::{BatchReport, FileReport, FileStatus};
pub use script::Script;

pub fn generate_error_report(error: &dyn TacErrorExt) -> String {
    let level = error.level();
    let location = match error.location() {
        Some(loc) => loc.to_string(),
        None => "unknown location".to_string(),
    };
    let message = error.message();

    format!("PHPTAC | {} | {} | {}", level, location, message)
}

/// Parses and lowers one script in a single step.
pub fn compile_source_to_tac(source: &Script, options: &LowerOptions) -> Result<Listing, Box<dyn TacErrorExt>> {
    let ast = ast::generate_ast_with_depth_limit(source, options.max_depth)?;
    lower_ast_to_tac(&ast, options)
}
