pub mod expression;
pub mod statement;

use expression::Expression;
use statement::Statement;

pub const ENTRY_POINT: &str = "main";

/// A parsed program: the `;`-joined function definitions in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub functions: Vec<FunctionDef>,
}

/// `func name(params) { [body ;] return expr }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<String>,
    pub body: Option<Statement>,
    pub return_expr: Expression,
}

impl Program {
    /// Later definitions shadow earlier ones with the same name.
    pub fn function(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.iter().rev().find(|f| f.name == name)
    }

    pub fn main(&self) -> Option<&FunctionDef> {
        self.function(ENTRY_POINT)
    }
}
