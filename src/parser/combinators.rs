use std::cell::OnceCell;
use std::ops::{Add, BitOr, Mul, Shr, Sub};
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::lexer::{Tag, Token};

use super::state::{ParseError, ParseResult, ParseState, Parser};

type ParserFn<T> = Rc<dyn Fn(&mut ParseState) -> ParseResult<T>>;

/// Combines two results of a `repeat`, left to right.
pub type Fold<T> = Rc<dyn Fn(T, T) -> T>;

// === Boxed Parser for type erasure ===

pub struct BoxedParser<T> {
    parser: ParserFn<T>,
}

impl<T> Clone for BoxedParser<T> {
    fn clone(&self) -> Self {
        BoxedParser {
            parser: Rc::clone(&self.parser),
        }
    }
}

impl<T: 'static> BoxedParser<T> {
    pub fn new<P: Parser<T> + 'static>(parser: P) -> Self {
        BoxedParser {
            parser: Rc::new(move |state| parser.parse(state)),
        }
    }
}

impl<T> Parser<T> for BoxedParser<T> {
    fn parse(&self, state: &mut ParseState) -> ParseResult<T> {
        (self.parser)(state)
    }
}

// === Combinators as methods ===

impl<T: 'static> BoxedParser<T> {
    /// Sequence: parse self then other, return (T, U)
    pub fn seq<U: 'static>(self, other: BoxedParser<U>) -> BoxedParser<(T, U)> {
        BoxedParser::new(move |state: &mut ParseState| {
            let a = self.parse(state)?;
            let b = other.parse(state)?;
            Ok((a, b))
        })
    }

    /// Keep left: parse self then other, discard other's result
    pub fn skip<U: 'static>(self, other: BoxedParser<U>) -> BoxedParser<T> {
        BoxedParser::new(move |state: &mut ParseState| {
            let a = self.parse(state)?;
            let _ = other.parse(state)?;
            Ok(a)
        })
    }

    /// Keep right: parse self then other, discard self's result
    pub fn skip_left<U: 'static>(self, other: BoxedParser<U>) -> BoxedParser<U> {
        BoxedParser::new(move |state: &mut ParseState| {
            let _ = self.parse(state)?;
            other.parse(state)
        })
    }

    /// Map: transform result
    pub fn map<U: 'static, F: Fn(T) -> U + 'static>(self, f: F) -> BoxedParser<U> {
        BoxedParser::new(move |state: &mut ParseState| {
            let a = self.parse(state)?;
            Ok(f(a))
        })
    }

    /// Choice: run both alternatives from the same position and keep the
    /// one that consumed more tokens. The left alternative wins ties.
    pub fn or(self, other: BoxedParser<T>) -> BoxedParser<T> {
        BoxedParser::new(move |state: &mut ParseState| {
            let start = state.position();
            let left = self.parse(state);
            let left_end = state.position();

            state.restore(start);
            let right = other.parse(state);
            let right_end = state.position();

            match (left, right) {
                (Ok(l), Ok(r)) => {
                    if right_end > left_end {
                        state.restore(right_end);
                        Ok(r)
                    } else {
                        state.restore(left_end);
                        Ok(l)
                    }
                }
                (Ok(l), Err(_)) => {
                    state.restore(left_end);
                    Ok(l)
                }
                (Err(_), Ok(r)) => {
                    state.restore(right_end);
                    Ok(r)
                }
                (Err(l), Err(r)) => {
                    state.restore(start);
                    Err(if r.index > l.index { r } else { l })
                }
            }
        })
    }

    /// Parse one item, then any number of `sep item` pairs, folding the
    /// results left-associatively with the function `sep` yields.
    pub fn repeat(self, sep: BoxedParser<Fold<T>>) -> BoxedParser<T> {
        BoxedParser::new(move |state: &mut ParseState| {
            let mut acc = self.parse(state)?;
            loop {
                let pos = state.position();
                let fold = match sep.parse(state) {
                    Ok(fold) => fold,
                    Err(_) => {
                        state.restore(pos);
                        break;
                    }
                };
                match self.parse(state) {
                    Ok(item) => acc = fold(acc, item),
                    Err(_) => {
                        state.restore(pos);
                        break;
                    }
                }
            }
            Ok(acc)
        })
    }

    /// Name what this parser expects when it fails without consuming anything
    pub fn label(self, name: &'static str) -> BoxedParser<T> {
        BoxedParser::new(move |state: &mut ParseState| {
            let start = state.position();
            match self.parse(state) {
                Ok(v) => Ok(v),
                Err(mut err) => {
                    if err.index == start {
                        err.expected = vec![name.to_string()];
                        state.record_error(err.clone());
                    }
                    Err(err)
                }
            }
        })
    }
}

// === Operator Overloading ===

/// `+` for sequence: A + B -> (A, B)
impl<T: 'static, U: 'static> Add<BoxedParser<U>> for BoxedParser<T> {
    type Output = BoxedParser<(T, U)>;

    fn add(self, rhs: BoxedParser<U>) -> Self::Output {
        self.seq(rhs)
    }
}

/// `-` for keep left: A - B -> A (parse B, discard result)
impl<T: 'static, U: 'static> Sub<BoxedParser<U>> for BoxedParser<T> {
    type Output = BoxedParser<T>;

    fn sub(self, rhs: BoxedParser<U>) -> Self::Output {
        self.skip(rhs)
    }
}

/// `*` for keep right: A * B -> B (parse A, discard result)
impl<T: 'static, U: 'static> Mul<BoxedParser<U>> for BoxedParser<T> {
    type Output = BoxedParser<U>;

    fn mul(self, rhs: BoxedParser<U>) -> Self::Output {
        self.skip_left(rhs)
    }
}

/// `|` for choice: A | B -> longest of A and B
impl<T: 'static> BitOr<BoxedParser<T>> for BoxedParser<T> {
    type Output = BoxedParser<T>;

    fn bitor(self, rhs: BoxedParser<T>) -> Self::Output {
        self.or(rhs)
    }
}

/// `>>` for map: A >> fn -> B
impl<T: 'static, U: 'static, F: Fn(T) -> U + 'static> Shr<F> for BoxedParser<T> {
    type Output = BoxedParser<U>;

    fn shr(self, f: F) -> Self::Output {
        self.map(f)
    }
}

// === Primitive Parsers ===

fn token_with_error<F: Fn(&Token) -> bool + 'static>(
    predicate: F,
    expected: String,
) -> BoxedParser<Token> {
    BoxedParser::new(move |state: &mut ParseState| {
        if let Some(tok) = state.peek().filter(|tok| predicate(*tok)).cloned() {
            state.advance();
            return Ok(tok);
        }
        let err = state
            .error_here("unexpected token")
            .expected(expected.clone());
        state.record_error(err.clone());
        Err(err)
    })
}

fn describe_tag(tag: Tag) -> &'static str {
    match tag {
        Tag::Syntax => "syntax",
        Tag::Number => "integer",
        Tag::Boolean => "boolean",
        Tag::Variable => "identifier",
    }
}

/// Consume one token carrying `tag`, yielding its text
pub fn tag(tag: Tag) -> BoxedParser<String> {
    token_with_error(move |t| t.tag() == tag, describe_tag(tag).to_string())
        >> |tok: Token| tok.lexeme().to_string()
}

/// Consume one syntax token spelled exactly `text`
pub fn literal(text: &'static str) -> BoxedParser<String> {
    token_with_error(
        move |t| t.tag() == Tag::Syntax && t.lexeme() == text,
        format!("'{}'", text),
    ) >> |tok: Token| tok.lexeme().to_string()
}

/// Optional: parse zero or one
pub fn optional<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<Option<T>> {
    BoxedParser::new(move |state: &mut ParseState| {
        let pos = state.position();
        match parser.parse(state) {
            Ok(item) => Ok(Some(item)),
            Err(_) => {
                state.restore(pos);
                Ok(None)
            }
        }
    })
}

/// `item { sep item }` collected into a vector
pub fn separated<T: 'static>(item: BoxedParser<T>, sep: &'static str) -> BoxedParser<Vec<T>> {
    let append: Fold<Vec<T>> = Rc::new(|mut acc: Vec<T>, rest: Vec<T>| {
        acc.extend(rest);
        acc
    });
    (item >> |x| vec![x]).repeat(literal(sep) >> move |_| append.clone())
}

/// Build the parser on first use and reuse it afterwards
pub fn lazy<T: 'static, F: Fn() -> BoxedParser<T> + 'static>(factory: F) -> BoxedParser<T> {
    let cell: Rc<OnceCell<BoxedParser<T>>> = Rc::new(OnceCell::new());
    BoxedParser::new(move |state: &mut ParseState| cell.get_or_init(&factory).parse(state))
}

/// Succeeds only when `parser` consumes the whole token stream
pub fn program<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<T> {
    BoxedParser::new(move |state: &mut ParseState| {
        let value = parser.parse(state)?;
        if state.has_next() {
            let err = state
                .error_here("unconsumed input")
                .expected("end of input");
            state.record_error(err.clone());
            return Err(err);
        }
        Ok(value)
    })
}

static NEXT_RULE_ID: AtomicUsize = AtomicUsize::new(0);

/// A grammar nonterminal that may refer to itself.
///
/// Declare the rule, hand out [`Rule::parser`] handles while building the
/// productions that mention it, then [`Rule::define`] it once. Handles hold a
/// weak reference, so the rule must outlive every parse that goes through it.
///
/// A rule runs at most once per token index of a [`ParseState`]; later
/// attempts at the same index replay the stored result. Alternatives share
/// their operands through rules, so this keeps nested calls linear.
pub struct Rule<T> {
    id: usize,
    name: &'static str,
    slot: Rc<OnceCell<BoxedParser<T>>>,
}

impl<T: Clone + 'static> Rule<T> {
    pub fn declare(name: &'static str) -> Self {
        Rule {
            id: NEXT_RULE_ID.fetch_add(1, Ordering::Relaxed),
            name,
            slot: Rc::new(OnceCell::new()),
        }
    }

    pub fn parser(&self) -> BoxedParser<T> {
        let slot = Rc::downgrade(&self.slot);
        let id = self.id;
        let name = self.name;
        BoxedParser::new(move |state: &mut ParseState| {
            if let Some((result, end)) = state.memoized::<T>(id) {
                state.restore(end);
                return result;
            }

            let slot = slot
                .upgrade()
                .ok_or_else(|| ParseError::new(format!("rule '{}' no longer exists", name)))?;
            let start = state.position();
            let result = match slot.get() {
                Some(parser) => parser.parse(state),
                None => Err(ParseError::new(format!(
                    "rule '{}' used before it was defined",
                    name
                ))),
            };
            state.memoize(id, start, result.clone());
            result
        })
    }

    pub fn define(&self, parser: BoxedParser<T>) {
        if self.slot.set(parser).is_err() {
            log::warn!("rule '{}' defined twice, keeping the first definition", self.name);
        }
    }
}
