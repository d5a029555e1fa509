use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use lachs::Span;

use crate::lexer::Token;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub expected: Vec<String>,
    pub found: Option<String>,
    pub position: Option<Span>,
    /// Token index the failure was detected at
    pub index: usize,
    /// Source text of the tokens left unconsumed at `index`
    pub remainder: Option<String>,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            expected: Vec::new(),
            found: None,
            position: None,
            index: 0,
            remainder: None,
        }
    }

    pub fn expected(mut self, what: impl Into<String>) -> Self {
        self.expected.push(what.into());
        self
    }

    pub fn found(mut self, what: impl Into<String>) -> Self {
        self.found = Some(what.into());
        self
    }

    pub fn at(mut self, position: Span) -> Self {
        self.position = Some(position);
        self
    }

    pub fn at_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    fn summary(&self) -> String {
        let mut msg = self.message.clone();
        if !self.expected.is_empty() {
            msg.push_str(&format!(": expected {}", self.expected.join(" or ")));
        }
        if let Some(found) = &self.found {
            msg.push_str(&format!(", found {}", found));
        }
        msg
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = self.summary();
        match &self.position {
            Some(span) if !span.source.is_empty() => write!(f, "{}", span.to_string(&msg))?,
            _ => write!(f, "Parse error: {}", msg)?,
        }
        match &self.remainder {
            Some(rest) if !rest.is_empty() => write!(f, "\nremaining input: {}", rest),
            _ => Ok(()),
        }
    }
}

impl std::error::Error for ParseError {}

pub type ParseResult<T> = Result<T, ParseError>;

/// Outcome of one rule at one token index, and where the cursor was left
type MemoEntry<T> = (ParseResult<T>, usize);

pub struct ParseState {
    tokens: Vec<Token>,
    index: usize,
    furthest: Option<ParseError>,
    /// Rule results keyed by `(rule id, start index)`
    memo: HashMap<(usize, usize), Rc<dyn Any>>,
}

impl ParseState {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            index: 0,
            furthest: None,
            memo: HashMap::new(),
        }
    }

    /// Result of `rule` started at the current index, if it already ran there
    pub fn memoized<T: Clone + 'static>(&self, rule: usize) -> Option<MemoEntry<T>> {
        self.memo
            .get(&(rule, self.index))?
            .downcast_ref::<MemoEntry<T>>()
            .cloned()
    }

    pub fn memoize<T: 'static>(&mut self, rule: usize, start: usize, result: ParseResult<T>) {
        let entry: MemoEntry<T> = (result, self.index);
        self.memo.insert((rule, start), Rc::new(entry));
    }

    pub fn advance(&mut self) -> Option<Token> {
        if self.has_next() {
            let token = self.tokens[self.index].clone();
            self.index += 1;
            Some(token)
        } else {
            None
        }
    }

    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    pub fn has_next(&self) -> bool {
        self.index < self.tokens.len()
    }

    pub fn position(&self) -> usize {
        self.index
    }

    pub fn restore(&mut self, position: usize) {
        self.index = position;
    }

    /// Tokens not consumed yet
    pub fn remaining(&self) -> &[Token] {
        &self.tokens[self.index.min(self.tokens.len())..]
    }

    /// Build an error describing the token under the cursor.
    pub fn error_here(&self, msg: impl Into<String>) -> ParseError {
        let err = ParseError::new(msg).at_index(self.index);
        match self.peek() {
            Some(tok) => err.found(tok.describe()).at(tok.pos()),
            None => err.found("end of input"),
        }
    }

    /// Remember a failure if it got at least as far as any seen before.
    ///
    /// Alternatives that fail at the same index have their expectations merged.
    pub fn record_error(&mut self, err: ParseError) {
        match &mut self.furthest {
            Some(furthest) if furthest.index > err.index => {}
            Some(furthest) if furthest.index == err.index => {
                for expected in err.expected {
                    if !furthest.expected.contains(&expected) {
                        furthest.expected.push(expected);
                    }
                }
            }
            _ => self.furthest = Some(err),
        }
    }

    pub fn furthest_error(&self) -> Option<&ParseError> {
        self.furthest.as_ref()
    }
}

pub trait Parser<T>: Sized {
    fn parse(&self, state: &mut ParseState) -> ParseResult<T>;
}

impl<T, F: Fn(&mut ParseState) -> ParseResult<T>> Parser<T> for F {
    fn parse(&self, state: &mut ParseState) -> ParseResult<T> {
        self(state)
    }
}
