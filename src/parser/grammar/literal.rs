//! Literal parsers for IMP

use crate::ast::expression::Expression;
use crate::lexer::Tag;

use crate::parser::combinators::{literal, optional, tag, BoxedParser};
use crate::parser::state::{ParseState, Parser};

/// Parse an identifier
pub fn ident() -> BoxedParser<String> {
    tag(Tag::Variable)
}

/// variable := ident
pub fn variable() -> BoxedParser<Expression> {
    ident() >> Expression::Variable
}

/// boolean := "true" | "false"
pub fn boolean() -> BoxedParser<Expression> {
    tag(Tag::Boolean) >> |text: String| Expression::boolean(text == "true")
}

/// number := ["-"] NUMBER
///
/// The tokenizer never folds a sign into a number, so negative literals are
/// assembled here.
pub fn number() -> BoxedParser<Expression> {
    let signed = optional(literal("-")) + tag(Tag::Number);
    BoxedParser::new(move |state: &mut ParseState| {
        let start = state.position();
        let (sign, digits) = signed.parse(state)?;
        let text = match sign {
            Some(_) => format!("-{}", digits),
            None => digits,
        };
        match text.parse::<i64>() {
            Ok(value) => Ok(Expression::int(value)),
            Err(_) => {
                state.restore(start);
                let err = state.error_here(format!("integer literal {} out of range", text));
                state.record_error(err.clone());
                Err(err)
            }
        }
    })
}
