use crate::ast::expression::{ComparisonOp, Expression, FunctionCall, MathOp};
use crate::ast::statement::{Assignment, IfStatement, Statement, WhileStatement};
use crate::ast::FunctionDef;
use crate::error::SemanticError;

use super::scope::{CallStack, Frame};
use super::value::Value;

type EvalResult<T> = Result<T, SemanticError>;

impl Expression {
    pub fn eval(&self, stack: &mut CallStack) -> EvalResult<Value> {
        match self {
            Expression::Value(literal) => Ok(Value::from(*literal)),
            Expression::Variable(name) => Ok(stack.resolve(name)),
            Expression::Math(op, left, right) => {
                let left = left.eval(stack)?;
                let right = right.eval(stack)?;
                math(*op, left, right)
            }
            Expression::Comparison(op, left, right) => {
                let left = left.eval(stack)?;
                let right = right.eval(stack)?;
                compare(*op, left, right)
            }
            // Both operands are always evaluated.
            Expression::And(left, right) => {
                let left = left.eval(stack)?;
                let right = right.eval(stack)?;
                Ok(Value::Bool(left.truthy() && right.truthy()))
            }
            Expression::Or(left, right) => {
                let left = left.eval(stack)?;
                let right = right.eval(stack)?;
                Ok(Value::Bool(left.truthy() || right.truthy()))
            }
            Expression::Not(inner) => Ok(Value::Bool(!inner.eval(stack)?.truthy())),
            Expression::FunctionCall(FunctionCall { name, args }) => {
                let evaluated = args
                    .iter()
                    .map(|arg| arg.eval(stack))
                    .collect::<EvalResult<Vec<_>>>()?;
                stack.function(name)?.call(evaluated, stack)
            }
        }
    }
}

fn math(op: MathOp, left: Value, right: Value) -> EvalResult<Value> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(match op {
            MathOp::Add => a.wrapping_add(b),
            MathOp::Sub => a.wrapping_sub(b),
        })),
        _ => Err(operand_mismatch(op.symbol(), left, right)),
    }
}

fn compare(op: ComparisonOp, left: Value, right: Value) -> EvalResult<Value> {
    let result = match (op, left, right) {
        (ComparisonOp::Eq, Value::Int(a), Value::Int(b)) => a == b,
        (ComparisonOp::Eq, Value::Bool(a), Value::Bool(b)) => a == b,
        (ComparisonOp::Ne, Value::Int(a), Value::Int(b)) => a != b,
        (ComparisonOp::Ne, Value::Bool(a), Value::Bool(b)) => a != b,
        (ComparisonOp::Lt, Value::Int(a), Value::Int(b)) => a < b,
        (ComparisonOp::Le, Value::Int(a), Value::Int(b)) => a <= b,
        (ComparisonOp::Gt, Value::Int(a), Value::Int(b)) => a > b,
        (ComparisonOp::Ge, Value::Int(a), Value::Int(b)) => a >= b,
        _ => return Err(operand_mismatch(op.symbol(), left, right)),
    };
    Ok(Value::Bool(result))
}

fn operand_mismatch(operator: &'static str, left: Value, right: Value) -> SemanticError {
    SemanticError::OperandMismatch {
        operator,
        left: format!("{} {}", left.kind(), left),
        right: format!("{} {}", right.kind(), right),
    }
}

impl Statement {
    pub fn exec(&self, stack: &mut CallStack) -> EvalResult<()> {
        match self {
            Statement::Assign(Assignment { name, value }) => {
                let evaluated = value.eval(stack)?;
                stack.add(name.as_str(), evaluated);
            }
            Statement::Sequential(first, second) => {
                first.exec(stack)?;
                second.exec(stack)?;
            }
            Statement::If(IfStatement {
                condition,
                then_branch,
                else_branch,
            }) => {
                if condition.eval(stack)?.truthy() {
                    then_branch.exec(stack)?;
                } else if let Some(else_branch) = else_branch {
                    else_branch.exec(stack)?;
                }
            }
            Statement::While(WhileStatement { condition, body }) => {
                while condition.eval(stack)?.truthy() {
                    body.exec(stack)?;
                }
            }
        }
        Ok(())
    }
}

impl FunctionDef {
    /// Run the body and return expression in the current frame
    pub fn run(&self, stack: &mut CallStack) -> EvalResult<Value> {
        if let Some(body) = &self.body {
            body.exec(stack)?;
        }
        self.return_expr.eval(stack)
    }

    /// Call with already evaluated arguments in a fresh frame
    pub fn call(&self, args: Vec<Value>, stack: &mut CallStack) -> EvalResult<Value> {
        if args.len() != self.params.len() {
            return Err(SemanticError::ArityMismatch {
                function: self.name.clone(),
                expected: self.params.len(),
                found: args.len(),
            });
        }

        let mut frame = Frame::new();
        for (param, arg) in self.params.iter().zip(args) {
            frame.set(param.as_str(), arg);
        }

        stack.enter(&self.name, frame)?;
        log::trace!("call {} at depth {}", self.name, stack.depth());
        let result = self.run(stack);
        stack.leave();
        result
    }
}
