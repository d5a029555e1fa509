//! Statement parsers for IMP

use std::rc::Rc;

use crate::ast::expression::Expression;
use crate::ast::statement::{IfStatement, Statement, WhileStatement};

use crate::parser::combinators::{literal, optional, BoxedParser, Fold};

use super::literal::ident;

/// assignment := ident ":=" expr
pub fn assignment(expr: BoxedParser<Expression>) -> BoxedParser<Statement> {
    ((ident() - literal(":=")) + expr) >> |(name, value)| Statement::assign(name, value)
}

/// if := "if" logic block ["else" block] "end"
pub fn if_statement(
    condition: BoxedParser<Expression>,
    block: BoxedParser<Statement>,
) -> BoxedParser<Statement> {
    let else_branch = optional(literal("else") * block.clone());
    ((literal("if") * condition + block + else_branch) - literal("end"))
        >> |((condition, then_branch), else_branch)| {
            Statement::If(IfStatement {
                condition,
                then_branch: Box::new(then_branch),
                else_branch: else_branch.map(Box::new),
            })
        }
}

/// while := "while" logic block "end"
pub fn while_statement(
    condition: BoxedParser<Expression>,
    block: BoxedParser<Statement>,
) -> BoxedParser<Statement> {
    ((literal("while") * condition + block) - literal("end"))
        >> |(condition, body)| {
            Statement::While(WhileStatement {
                condition,
                body: Box::new(body),
            })
        }
}

/// block := statement (";" statement)*
///
/// Consecutive statements nest left-associatively into `Sequential`.
pub fn block(
    expr: BoxedParser<Expression>,
    condition: BoxedParser<Expression>,
    block: BoxedParser<Statement>,
) -> BoxedParser<Statement> {
    let statement = (assignment(expr)
        | if_statement(condition.clone(), block.clone())
        | while_statement(condition, block))
    .label("statement");
    let sequence: Fold<Statement> = Rc::new(Statement::sequential);
    statement.repeat(literal(";") >> move |_| sequence.clone())
}
