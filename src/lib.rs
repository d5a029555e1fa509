//! # IMP - a minimal imperative language
//!
//! IMP has integer and boolean expressions, assignment, `if`/`else`, `while`
//! and single-return functions. This crate implements the whole pipeline for
//! it: tokenizing, combinator-based parsing, a tree-walking interpreter, and
//! Hindley-Milner type inference over a lambda-calculus translation.
//!
//! ## Pipeline Flow
//!
//! ```text
//! Source Code (String)
//!     ↓
//! [Lexer] → Token Stream
//!     ↓
//! [Parser] → AST (ast::Program)
//!     ↓                         ↘
//! [Interpreter] → Execution      [Translator] → IR (types::HmExpr)
//!                                    ↓
//!                                [Inference] → types::ProgramTypes
//! ```
//!
//! ## Example Program
//!
//! ```text
//! func add(a, b) {
//!   return a + b
//! };
//!
//! func main() {
//!   x := add(1, 2);
//!   return x
//! }
//! ```
//!
//! Running it reports `x: 3` (the return value is kept on the
//! [`interpreter::Execution`] but not printed); inferring it reports
//! `add : Int -> Int -> Int` and `main : Int`.
//!
//! ## Module Structure
//!
//! - [`lexer`] - Tokenization using lachs
//! - [`parser`] - Combinator core and the IMP grammar
//! - [`ast`] - Syntax tree definitions
//! - [`fmt`] - Printing the syntax tree back as source
//! - [`interpreter`] - Runtime evaluation
//! - [`types`] - Translation to the IR, constraint generation, unification
//! - [`error`] - Error types shared by all stages

pub mod ast;
pub mod error;
pub mod fmt;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod types;

use std::fs;
use std::path::Path;

use log::LevelFilter;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

pub use error::{Error, SemanticError};

use ast::statement::Statement;
use ast::Program;
use interpreter::{Config, Execution, Interpreter};
use lexer::Token;
use types::ProgramTypes;

/// Route `log` output to stderr at `level`
pub fn init_logging(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    TermLogger::init(
        level,
        ConfigBuilder::new()
            .set_location_level(LevelFilter::Error)
            .set_time_level(LevelFilter::Off)
            .set_thread_level(LevelFilter::Off)
            .set_target_level(LevelFilter::Off)
            .build(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
}

/// Read a whole source file
pub fn read_source(path: impl AsRef<Path>) -> Result<String, Error> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn tokenize(source: &str) -> Result<Vec<Token>, Error> {
    Ok(lexer::tokenize(source)?)
}

/// Tokenize and parse a program of function definitions
pub fn parse_program(source: &str) -> Result<Program, Error> {
    Ok(parser::parse(tokenize(source)?)?)
}

/// Tokenize and parse a bare statement block
pub fn parse_script(source: &str) -> Result<Statement, Error> {
    Ok(parser::parse_script(tokenize(source)?)?)
}

/// Parse `source` and run its `main`
pub fn run_source(source: &str, config: Config) -> Result<Execution, Error> {
    let program = parse_program(source)?;
    Ok(Interpreter::new(config).run(&program)?)
}

/// Parse `source` as a bare statement block and run it in one frame
pub fn run_script_source(source: &str, config: Config) -> Result<Execution, Error> {
    let script = parse_script(source)?;
    Ok(Interpreter::new(config).run_script(&script)?)
}

/// Parse `source` and infer the types of all its functions
pub fn infer_source(source: &str) -> Result<ProgramTypes, Error> {
    let program = parse_program(source)?;
    Ok(types::infer_program(&program)?)
}
