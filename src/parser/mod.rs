//! Combinator-based parser for IMP.
//!
//! [`combinators`] holds the generic building blocks, [`state`] the token
//! cursor and error bookkeeping, and the private `grammar` module assembles
//! them into the language's productions.

pub mod combinators;
mod grammar;
pub mod state;

pub use combinators::{BoxedParser, Fold, Rule};
pub use grammar::Grammar;
pub use state::{ParseError, ParseResult, ParseState, Parser};

use crate::ast::expression::Expression;
use crate::ast::statement::Statement;
use crate::ast::Program;
use crate::lexer::Token;

/// Parse a whole program of `;`-joined function definitions.
pub fn parse(tokens: Vec<Token>) -> ParseResult<Program> {
    Grammar::new().parse_program(tokens)
}

/// Parse a bare statement block, as accepted by script mode.
pub fn parse_script(tokens: Vec<Token>) -> ParseResult<Statement> {
    Grammar::new().parse_script(tokens)
}

pub fn parse_expression(tokens: Vec<Token>) -> ParseResult<Expression> {
    Grammar::new().parse_expression(tokens)
}
