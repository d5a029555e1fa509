//! Grammar module for IMP
//!
//! This module contains all the parsing rules organized by category:
//! - `literal`: identifiers, numbers and booleans
//! - `expression`: arithmetic and logic expressions, function calls
//! - `statement`: assignment, `if`, `while` and `;`-joined blocks
//!
//! The self-recursive nonterminals are [`Rule`]s owned by [`Grammar`]. They
//! are declared first, the productions are built against their handles, and
//! each rule is defined exactly once afterwards.

mod expression;
mod literal;
mod statement;

use crate::ast::expression::Expression;
use crate::ast::statement::Statement;
use crate::ast::{FunctionDef, Program};
use crate::lexer::Token;

use super::combinators::{self, literal, optional, separated, BoxedParser, Rule};
use super::state::{ParseError, ParseResult, ParseState, Parser};

use self::literal::ident;

/// function := "func" ident "(" [ident ("," ident)*] ")"
///             "{" [block] [";"] "return" expr "}"
fn function(expr: BoxedParser<Expression>, block: BoxedParser<Statement>) -> BoxedParser<FunctionDef> {
    let params = optional(separated(ident(), ",")) >> |params: Option<Vec<String>>| params.unwrap_or_default();
    let header = (literal("func") * ident()) + (literal("(") * params - literal(")"));
    let body = (literal("{") * optional(block)) - optional(literal(";"));
    let tail = (literal("return") * expr) - literal("}");

    (header + body + tail)
        >> |(((name, params), body), return_expr)| FunctionDef {
            name,
            params,
            body,
            return_expr,
        }
}

pub struct Grammar {
    // The parsers below only hold weak handles to these.
    _arith: Rule<Expression>,
    _logic: Rule<Expression>,
    _logic_term: Rule<Expression>,
    _block: Rule<Statement>,
    expression: BoxedParser<Expression>,
    program: BoxedParser<Program>,
    script: BoxedParser<Statement>,
}

impl Grammar {
    pub fn new() -> Self {
        let arith = Rule::declare("arithmetic expression");
        let logic = Rule::declare("logic expression");
        let logic_term = Rule::declare("logic term");
        let block = Rule::declare("block");

        let expr = expression::expression(arith.parser(), logic.parser());

        arith.define(expression::arithmetic(arith.parser(), expr.clone()));
        logic_term.define(expression::logic_term(
            arith.parser(),
            logic.parser(),
            logic_term.parser(),
        ));
        logic.define(expression::logic(logic_term.parser(), expr.clone()));
        block.define(statement::block(expr.clone(), logic.parser(), block.parser()));

        let program = separated(function(expr.clone(), block.parser()), ";")
            >> |functions| Program { functions };

        Grammar {
            expression: combinators::program(expr),
            program: combinators::program(program),
            script: combinators::program(block.parser()),
            _arith: arith,
            _logic: logic,
            _logic_term: logic_term,
            _block: block,
        }
    }

    /// Parse `;`-joined function definitions covering the whole token stream
    pub fn parse_program(&self, tokens: Vec<Token>) -> ParseResult<Program> {
        let program = run(&self.program, tokens)?;
        log::debug!("parsed {} function definition(s)", program.functions.len());
        Ok(program)
    }

    /// Parse a bare `;`-joined statement block covering the whole token stream
    pub fn parse_script(&self, tokens: Vec<Token>) -> ParseResult<Statement> {
        run(&self.script, tokens)
    }

    /// Parse a single expression covering the whole token stream
    pub fn parse_expression(&self, tokens: Vec<Token>) -> ParseResult<Expression> {
        run(&self.expression, tokens)
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new()
    }
}

/// Run a whole-input parser, reporting the furthest failure seen together
/// with the tokens left unconsumed from there.
fn run<T>(parser: &BoxedParser<T>, tokens: Vec<Token>) -> ParseResult<T> {
    let mut state = ParseState::new(tokens);
    match parser.parse(&mut state) {
        Ok(value) => Ok(value),
        Err(err) => {
            let err = state.furthest_error().cloned().unwrap_or(err);
            state.restore(err.index);
            let remainder = state
                .remaining()
                .iter()
                .map(Token::lexeme)
                .collect::<Vec<_>>()
                .join(" ");
            log::debug!("parse failed at token {}: {}", err.index, remainder);
            Err(ParseError {
                remainder: Some(remainder),
                ..err
            })
        }
    }
}
