//! Pretty printer for IMP source code
//!
//! This module provides Display implementations for the AST. The output is
//! valid IMP: parsing it again yields the same tree, as long as the tree came
//! out of the parser in the first place (the grammar only ever nests `;`
//! chains to the left, so right-nested sequences print flattened).

use std::fmt::{self, Display};

use crate::ast::{
    expression::{Expression, FunctionCall, Literal},
    statement::Statement,
    FunctionDef, Program,
};

const INDENT: &str = "  ";

struct Formatter {
    buffer: String,
    indent_level: usize,
}

impl Formatter {
    fn new() -> Self {
        Self {
            buffer: String::new(),
            indent_level: 0,
        }
    }

    fn indent(&mut self) {
        self.indent_level += 1;
    }

    fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.buffer.push_str(INDENT);
        }
    }

    fn write_str(&mut self, s: &str) {
        self.buffer.push_str(s);
    }

    fn write_newline(&mut self) {
        self.buffer.push('\n');
    }

    fn finish(self) -> String {
        self.buffer
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formatter = Formatter::new();

        for (i, func) in self.functions.iter().enumerate() {
            if i > 0 {
                formatter.write_str(";");
                formatter.write_newline();
                formatter.write_newline();
            }
            format_function_def(func, &mut formatter);
        }
        formatter.write_newline();

        write!(f, "{}", formatter.finish())
    }
}

impl Display for FunctionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formatter = Formatter::new();
        format_function_def(self, &mut formatter);
        write!(f, "{}", formatter.finish())
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formatter = Formatter::new();
        format_block(self, &mut formatter);
        write!(f, "{}", formatter.finish())
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formatter = Formatter::new();
        format_expression(self, &mut formatter);
        write!(f, "{}", formatter.finish())
    }
}

fn format_function_def(func: &FunctionDef, fmt: &mut Formatter) {
    fmt.write_str("func ");
    fmt.write_str(&func.name);
    fmt.write_str("(");
    fmt.write_str(&func.params.join(", "));
    fmt.write_str(") {");
    fmt.write_newline();

    fmt.indent();
    if let Some(body) = &func.body {
        format_block(body, fmt);
        fmt.write_str(";");
        fmt.write_newline();
    }
    fmt.write_indent();
    fmt.write_str("return ");
    format_expression(&func.return_expr, fmt);
    fmt.write_newline();
    fmt.dedent();

    fmt.write_str("}");
}

/// Write the `;`-separated statements of a block, one per line, leaving the
/// cursor after the last statement.
fn format_block(block: &Statement, fmt: &mut Formatter) {
    let mut statements = Vec::new();
    flatten(block, &mut statements);

    for (i, stmt) in statements.iter().enumerate() {
        if i > 0 {
            fmt.write_str(";");
            fmt.write_newline();
        }
        fmt.write_indent();
        format_statement(stmt, fmt);
    }
}

fn flatten<'a>(stmt: &'a Statement, out: &mut Vec<&'a Statement>) {
    match stmt {
        Statement::Sequential(first, second) => {
            flatten(first, out);
            flatten(second, out);
        }
        other => out.push(other),
    }
}

fn format_statement(stmt: &Statement, fmt: &mut Formatter) {
    match stmt {
        Statement::Assign(assign) => {
            fmt.write_str(&assign.name);
            fmt.write_str(" := ");
            format_expression(&assign.value, fmt);
        }
        Statement::If(if_stmt) => {
            fmt.write_str("if ");
            format_expression(&if_stmt.condition, fmt);
            format_nested_block(&if_stmt.then_branch, fmt);
            if let Some(else_branch) = &if_stmt.else_branch {
                fmt.write_indent();
                fmt.write_str("else");
                format_nested_block(else_branch, fmt);
            }
            fmt.write_indent();
            fmt.write_str("end");
        }
        Statement::While(while_stmt) => {
            fmt.write_str("while ");
            format_expression(&while_stmt.condition, fmt);
            format_nested_block(&while_stmt.body, fmt);
            fmt.write_indent();
            fmt.write_str("end");
        }
        Statement::Sequential(..) => format_block(stmt, fmt),
    }
}

fn format_nested_block(block: &Statement, fmt: &mut Formatter) {
    fmt.write_newline();
    fmt.indent();
    format_block(block, fmt);
    fmt.dedent();
    fmt.write_newline();
}

fn format_expression(expr: &Expression, fmt: &mut Formatter) {
    match expr {
        Expression::Value(Literal::Int(value)) => fmt.write_str(&value.to_string()),
        Expression::Value(Literal::Bool(value)) => {
            fmt.write_str(if *value { "true" } else { "false" })
        }
        Expression::Variable(name) => fmt.write_str(name),
        Expression::FunctionCall(call) => format_function_call(call, fmt),
        Expression::Math(op, left, right) => {
            format_expression(left, fmt);
            fmt.write_str(" ");
            fmt.write_str(op.symbol());
            fmt.write_str(" ");
            format_operand(right, fmt, |e| !matches!(e, Expression::Math(..)));
        }
        Expression::Comparison(op, left, right) => {
            format_expression(left, fmt);
            fmt.write_str(" ");
            fmt.write_str(op.symbol());
            fmt.write_str(" ");
            format_expression(right, fmt);
        }
        Expression::And(left, right) => format_logic(left, "&&", right, fmt),
        Expression::Or(left, right) => format_logic(left, "||", right, fmt),
        Expression::Not(inner) => {
            fmt.write_str("!");
            format_operand(inner, fmt, |e| {
                matches!(
                    e,
                    Expression::Value(Literal::Bool(_))
                        | Expression::Variable(_)
                        | Expression::Comparison(..)
                        | Expression::Not(_)
                )
            });
        }
    }
}

/// `&&` and `||` share one precedence level and fold to the left, so only a
/// chain on the right needs grouping.
fn format_logic(left: &Expression, symbol: &str, right: &Expression, fmt: &mut Formatter) {
    format_expression(left, fmt);
    fmt.write_str(" ");
    fmt.write_str(symbol);
    fmt.write_str(" ");
    format_operand(right, fmt, |e| {
        !matches!(e, Expression::And(..) | Expression::Or(..))
    });
}

fn format_operand(expr: &Expression, fmt: &mut Formatter, bare: impl Fn(&Expression) -> bool) {
    if bare(expr) {
        format_expression(expr, fmt);
    } else {
        fmt.write_str("(");
        format_expression(expr, fmt);
        fmt.write_str(")");
    }
}

fn format_function_call(call: &FunctionCall, fmt: &mut Formatter) {
    fmt.write_str(&call.name);
    fmt.write_str("(");
    for (i, arg) in call.args.iter().enumerate() {
        if i > 0 {
            fmt.write_str(", ");
        }
        format_expression(arg, fmt);
    }
    fmt.write_str(")");
}
