//! # Translation to the lambda-calculus IR
//!
//! Type inference does not work on IMP syntax directly. Every statement and
//! expression of a function is rewritten into applications of operator
//! variables:
//!
//! ```text
//! x := e              ((:= x::f) e)
//! s1; s2              ((; s1) s2)
//! if c s end          ((if c) s)
//! if c s else t end   (((if-else c) s) t)
//! while c s end       ((while c) s)
//! a + b               ((+ a) b)
//! !a                  (! a)
//! g(a, b)             ((g a) b)
//! ```
//!
//! A function `f(p, q)` becomes `\p::f. \q::f. ((; body) (return e))`, and
//! the program binds every non-`main` function with `let` around the
//! translation of `main`. Locals are scoped by the function that owns them,
//! function names and operators are global.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use crate::ast::expression::{Expression, FunctionCall, Literal};
use crate::ast::statement::{Assignment, IfStatement, Statement, WhileStatement};
use crate::ast::{FunctionDef, Program, ENTRY_POINT};
use crate::error::SemanticError;

/// A variable of the IR. `scope` is the owning function for locals and
/// `None` for globals.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HmVar {
    pub name: String,
    pub scope: Option<String>,
}

impl HmVar {
    pub fn local(name: impl Into<String>, function: impl Into<String>) -> Self {
        HmVar {
            name: name.into(),
            scope: Some(function.into()),
        }
    }

    pub fn global(name: impl Into<String>) -> Self {
        HmVar {
            name: name.into(),
            scope: None,
        }
    }

    pub fn is_global(&self) -> bool {
        self.scope.is_none()
    }
}

impl fmt::Display for HmVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "{}::{}", self.name, scope),
            None => write!(f, "{}", self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HmExpr {
    Var(HmVar),
    Int(i64),
    Bool(bool),
    App(Rc<HmExpr>, Rc<HmExpr>),
    Abs(HmVar, Rc<HmExpr>),
    Let(HmVar, Rc<HmExpr>, Rc<HmExpr>),
}

impl HmExpr {
    fn op(name: &str) -> Rc<HmExpr> {
        Rc::new(HmExpr::Var(HmVar::global(name)))
    }

    fn app(func: Rc<HmExpr>, arg: Rc<HmExpr>) -> Rc<HmExpr> {
        Rc::new(HmExpr::App(func, arg))
    }

    /// `((name a) b)`
    fn binary(name: &str, left: Rc<HmExpr>, right: Rc<HmExpr>) -> Rc<HmExpr> {
        Self::app(Self::app(Self::op(name), left), right)
    }
}

impl fmt::Display for HmExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HmExpr::Var(var) => write!(f, "{}", var),
            HmExpr::Int(n) => write!(f, "{}", n),
            HmExpr::Bool(b) => write!(f, "{}", b),
            HmExpr::App(func, arg) => write!(f, "({} {})", func, arg),
            HmExpr::Abs(param, body) => write!(f, "\\{}. {}", param, body),
            HmExpr::Let(name, bound, body) => write!(f, "let {} = {} in {}", name, bound, body),
        }
    }
}

/// A translated program: the whole `let` chain, and the node inside it that
/// stands for `main`.
#[derive(Debug, Clone)]
pub struct TranslatedProgram {
    pub expr: Rc<HmExpr>,
    pub main: Rc<HmExpr>,
    /// Non-`main` functions in binding order
    pub order: Vec<String>,
}

pub struct Translator<'a> {
    functions: HashMap<&'a str, &'a FunctionDef>,
}

impl<'a> Translator<'a> {
    pub fn new(program: &'a Program) -> Self {
        Self {
            functions: program
                .functions
                .iter()
                .map(|func| (func.name.as_str(), func))
                .collect(),
        }
    }

    pub fn expression(&self, expr: &Expression, function: &str) -> Result<Rc<HmExpr>, SemanticError> {
        Ok(match expr {
            Expression::Value(Literal::Int(n)) => Rc::new(HmExpr::Int(*n)),
            Expression::Value(Literal::Bool(b)) => Rc::new(HmExpr::Bool(*b)),
            Expression::Variable(name) => Rc::new(HmExpr::Var(HmVar::local(name.as_str(), function))),
            Expression::Math(op, left, right) => HmExpr::binary(
                op.symbol(),
                self.expression(left, function)?,
                self.expression(right, function)?,
            ),
            Expression::Comparison(op, left, right) => HmExpr::binary(
                op.symbol(),
                self.expression(left, function)?,
                self.expression(right, function)?,
            ),
            Expression::And(left, right) => HmExpr::binary(
                "&&",
                self.expression(left, function)?,
                self.expression(right, function)?,
            ),
            Expression::Or(left, right) => HmExpr::binary(
                "||",
                self.expression(left, function)?,
                self.expression(right, function)?,
            ),
            Expression::Not(inner) => HmExpr::app(HmExpr::op("!"), self.expression(inner, function)?),
            Expression::FunctionCall(FunctionCall { name, args }) => {
                if !self.functions.contains_key(name.as_str()) {
                    return Err(SemanticError::unknown_function(name.as_str()));
                }
                let mut call = Rc::new(HmExpr::Var(HmVar::global(name.as_str())));
                for arg in args {
                    call = HmExpr::app(call, self.expression(arg, function)?);
                }
                call
            }
        })
    }

    pub fn statement(&self, stmt: &Statement, function: &str) -> Result<Rc<HmExpr>, SemanticError> {
        Ok(match stmt {
            Statement::Assign(Assignment { name, value }) => HmExpr::binary(
                ":=",
                Rc::new(HmExpr::Var(HmVar::local(name.as_str(), function))),
                self.expression(value, function)?,
            ),
            Statement::Sequential(first, second) => HmExpr::binary(
                ";",
                self.statement(first, function)?,
                self.statement(second, function)?,
            ),
            Statement::If(IfStatement {
                condition,
                then_branch,
                else_branch: None,
            }) => HmExpr::binary(
                "if",
                self.expression(condition, function)?,
                self.statement(then_branch, function)?,
            ),
            Statement::If(IfStatement {
                condition,
                then_branch,
                else_branch: Some(else_branch),
            }) => HmExpr::app(
                HmExpr::binary(
                    "if-else",
                    self.expression(condition, function)?,
                    self.statement(then_branch, function)?,
                ),
                self.statement(else_branch, function)?,
            ),
            Statement::While(WhileStatement { condition, body }) => HmExpr::binary(
                "while",
                self.expression(condition, function)?,
                self.statement(body, function)?,
            ),
        })
    }

    /// `\p1::f. ... \pn::f. ((; body) (return e))`
    pub fn function(&self, func: &FunctionDef) -> Result<Rc<HmExpr>, SemanticError> {
        let name = func.name.as_str();
        let ret = HmExpr::app(HmExpr::op("return"), self.expression(&func.return_expr, name)?);
        let mut expr = match &func.body {
            Some(body) => HmExpr::binary(";", self.statement(body, name)?, ret),
            None => ret,
        };
        for param in func.params.iter().rev() {
            expr = Rc::new(HmExpr::Abs(HmVar::local(param.as_str(), name), expr));
        }
        Ok(expr)
    }

    /// Non-`main` function names, each bound after everything it calls.
    /// Unrelated functions keep their source order.
    pub fn binding_order(&self, program: &'a Program) -> Vec<String> {
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        for func in &program.functions {
            self.visit(func.name.as_str(), &mut visited, &mut order);
        }
        order
    }

    fn visit(&self, name: &'a str, visited: &mut HashSet<&'a str>, order: &mut Vec<String>) {
        if name == ENTRY_POINT || !visited.insert(name) {
            return;
        }
        if let Some(func) = self.functions.get(name).copied() {
            for callee in calls(func) {
                self.visit(callee, visited, order);
            }
        }
        order.push(name.to_string());
    }

    pub fn program(&self, program: &'a Program) -> Result<TranslatedProgram, SemanticError> {
        let main = self
            .functions
            .get(ENTRY_POINT)
            .copied()
            .ok_or_else(|| SemanticError::unknown_function(ENTRY_POINT))?;
        let main = self.function(main)?;

        let order = self.binding_order(program);
        let mut expr = Rc::clone(&main);
        for name in order.iter().rev() {
            let func = self
                .functions
                .get(name.as_str())
                .copied()
                .ok_or_else(|| SemanticError::unknown_function(name.as_str()))?;
            expr = Rc::new(HmExpr::Let(HmVar::global(name.as_str()), self.function(func)?, expr));
        }

        log::debug!("translated program binds {:?} around {}", order, ENTRY_POINT);
        Ok(TranslatedProgram { expr, main, order })
    }
}

/// Names of the functions `func` calls, in the order they appear
fn calls(func: &FunctionDef) -> Vec<&str> {
    fn in_expression<'e>(expr: &'e Expression, out: &mut Vec<&'e str>) {
        match expr {
            Expression::Value(_) | Expression::Variable(_) => {}
            Expression::Math(_, left, right)
            | Expression::Comparison(_, left, right)
            | Expression::And(left, right)
            | Expression::Or(left, right) => {
                in_expression(left, out);
                in_expression(right, out);
            }
            Expression::Not(inner) => in_expression(inner, out),
            Expression::FunctionCall(call) => {
                out.push(call.name.as_str());
                for arg in &call.args {
                    in_expression(arg, out);
                }
            }
        }
    }

    fn in_statement<'e>(stmt: &'e Statement, out: &mut Vec<&'e str>) {
        match stmt {
            Statement::Assign(assign) => in_expression(&assign.value, out),
            Statement::Sequential(first, second) => {
                in_statement(first, out);
                in_statement(second, out);
            }
            Statement::If(if_stmt) => {
                in_expression(&if_stmt.condition, out);
                in_statement(&if_stmt.then_branch, out);
                if let Some(else_branch) = &if_stmt.else_branch {
                    in_statement(else_branch, out);
                }
            }
            Statement::While(while_stmt) => {
                in_expression(&while_stmt.condition, out);
                in_statement(&while_stmt.body, out);
            }
        }
    }

    let mut out = Vec::new();
    if let Some(body) = &func.body {
        in_statement(body, &mut out);
    }
    in_expression(&func.return_expr, &mut out);
    out
}

/// Translate a whole program
pub fn translate_program(program: &Program) -> Result<TranslatedProgram, SemanticError> {
    Translator::new(program).program(program)
}
