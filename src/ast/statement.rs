use crate::ast::expression::Expression;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Assign(Assignment),
    Sequential(Box<Statement>, Box<Statement>),
    If(IfStatement),
    While(WhileStatement),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub name: String,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfStatement {
    pub condition: Expression,
    pub then_branch: Box<Statement>,
    pub else_branch: Option<Box<Statement>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhileStatement {
    pub condition: Expression,
    pub body: Box<Statement>,
}

impl Statement {
    pub fn assign(name: impl Into<String>, value: Expression) -> Self {
        Statement::Assign(Assignment {
            name: name.into(),
            value,
        })
    }

    pub fn sequential(first: Statement, second: Statement) -> Self {
        Statement::Sequential(Box::new(first), Box::new(second))
    }
}
