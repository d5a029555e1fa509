#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal {
    Int(i64),
    Bool(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathOp {
    Add,
    Sub,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    Value(Literal),
    Variable(String),
    Math(MathOp, Box<Expression>, Box<Expression>),
    Comparison(ComparisonOp, Box<Expression>, Box<Expression>),
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
    Not(Box<Expression>),
    FunctionCall(FunctionCall),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Expression>,
}

impl MathOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            MathOp::Add => "+",
            MathOp::Sub => "-",
        }
    }
}

impl ComparisonOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            ComparisonOp::Lt => "<",
            ComparisonOp::Le => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Ge => ">=",
            ComparisonOp::Eq => "==",
            ComparisonOp::Ne => "!=",
        }
    }
}

impl Expression {
    pub fn int(value: i64) -> Self {
        Expression::Value(Literal::Int(value))
    }

    pub fn boolean(value: bool) -> Self {
        Expression::Value(Literal::Bool(value))
    }

    pub fn var(name: impl Into<String>) -> Self {
        Expression::Variable(name.into())
    }

    pub fn math(op: MathOp, left: Expression, right: Expression) -> Self {
        Expression::Math(op, Box::new(left), Box::new(right))
    }

    pub fn comparison(op: ComparisonOp, left: Expression, right: Expression) -> Self {
        Expression::Comparison(op, Box::new(left), Box::new(right))
    }

    pub fn call(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Expression::FunctionCall(FunctionCall {
            name: name.into(),
            args,
        })
    }
}
