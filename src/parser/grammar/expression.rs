//! Expression parsers for IMP
//!
//! Every parser here takes handles to the recursive rules it mentions, so the
//! productions can be assembled before the rules are defined.

use std::rc::Rc;

use crate::ast::expression::{ComparisonOp, Expression, MathOp};

use crate::parser::combinators::{literal, optional, separated, BoxedParser, Fold};

use super::literal::{boolean, ident, number, variable};

fn fold_math(op: MathOp) -> Fold<Expression> {
    Rc::new(move |left, right| Expression::math(op, left, right))
}

fn fold_and() -> Fold<Expression> {
    Rc::new(|left, right| Expression::And(Box::new(left), Box::new(right)))
}

fn fold_or() -> Fold<Expression> {
    Rc::new(|left, right| Expression::Or(Box::new(left), Box::new(right)))
}

/// math_op := "+" | "-"
fn math_operator() -> BoxedParser<Fold<Expression>> {
    (literal("+") >> |_| fold_math(MathOp::Add)) | (literal("-") >> |_| fold_math(MathOp::Sub))
}

/// logic_op := "&&" | "||"
fn logic_operator() -> BoxedParser<Fold<Expression>> {
    (literal("&&") >> |_| fold_and()) | (literal("||") >> |_| fold_or())
}

/// cmp_op := "<" | "<=" | ">" | ">=" | "==" | "!="
fn comparison_operator() -> BoxedParser<ComparisonOp> {
    let operator = |op: ComparisonOp| literal(op.symbol()) >> move |_| op;
    operator(ComparisonOp::Lt)
        | operator(ComparisonOp::Le)
        | operator(ComparisonOp::Gt)
        | operator(ComparisonOp::Ge)
        | operator(ComparisonOp::Eq)
        | operator(ComparisonOp::Ne)
}

/// expr := logic | arith
pub fn expression(
    arith: BoxedParser<Expression>,
    logic: BoxedParser<Expression>,
) -> BoxedParser<Expression> {
    (logic | arith).label("expression")
}

/// call := ident "(" [expr ("," expr)*] ")"
pub fn function_call(expr: BoxedParser<Expression>) -> BoxedParser<Expression> {
    let args = optional(separated(expr, ",")) >> |args: Option<Vec<Expression>>| args.unwrap_or_default();
    (ident() - literal("(") + args - literal(")")) >> |(name, args)| Expression::call(name, args)
}

/// arith_term := number | ident | "(" arith ")"
fn arithmetic_term(arith: BoxedParser<Expression>) -> BoxedParser<Expression> {
    let group = literal("(") * arith - literal(")");
    number() | variable() | group
}

/// arith := (call | arith_term) (math_op (call | arith_term))*
pub fn arithmetic(
    arith: BoxedParser<Expression>,
    expr: BoxedParser<Expression>,
) -> BoxedParser<Expression> {
    let operand = function_call(expr) | arithmetic_term(arith);
    operand.repeat(math_operator())
}

/// comparison := arith cmp_op arith
fn comparison(arith: BoxedParser<Expression>) -> BoxedParser<Expression> {
    (arith.clone() + comparison_operator() + arith)
        >> |((left, op), right)| Expression::comparison(op, left, right)
}

/// logic_term := boolean | comparison | "!" logic_term | ident | "(" logic ")"
pub fn logic_term(
    arith: BoxedParser<Expression>,
    logic: BoxedParser<Expression>,
    logic_term: BoxedParser<Expression>,
) -> BoxedParser<Expression> {
    let negation = (literal("!") * logic_term) >> |inner| Expression::Not(Box::new(inner));
    let group = literal("(") * logic - literal(")");
    boolean() | comparison(arith) | negation | variable() | group
}

/// logic := (call | logic_term) (logic_op (call | logic_term))*
pub fn logic(
    logic_term: BoxedParser<Expression>,
    expr: BoxedParser<Expression>,
) -> BoxedParser<Expression> {
    let operand = function_call(expr) | logic_term;
    operand.repeat(logic_operator())
}
