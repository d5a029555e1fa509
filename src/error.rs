//! # Error Definitions
//!
//! Every failure the pipeline can report. Tokenizing and parsing failures are
//! structural and live next to the code that produces them
//! ([`TokenizeError`], [`ParseError`]). Everything that goes wrong after a
//! tree exists, at run time or during inference, is a [`SemanticError`].
//! [`Error`] wraps all of them so pipeline functions can use `?`.
//!
//! Type terms are carried in printed form, which keeps every error `Send`
//! and `Sync` even though the terms themselves share subtrees through `Rc`.

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::lexer::TokenizeError;
use crate::parser::ParseError;
use crate::types::{TypeTerm, TypeVar};

/// Fatal error raised while running or typing a parsed program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticError {
    /// A call, or the entry point, names a function that is not defined.
    UnknownFunction { name: String },

    /// Two constructors, or a constructor and an arrow, had to be equal.
    TypeMismatch { left: String, right: String },

    /// Binding `var` to `term` would produce an infinite type.
    InfiniteType { var: String, term: String },

    /// A variable already bound to `existing` was asked to become `proposed`.
    ConflictingSubstitution {
        var: String,
        existing: String,
        proposed: String,
    },

    /// The solved substitution does not make a constraint syntactically equal.
    ///
    /// This never happens for a correct unifier.
    InconsistentSolution { left: String, right: String },

    ArityMismatch {
        function: String,
        expected: usize,
        found: usize,
    },

    /// An arithmetic or ordering operator was applied to a boolean.
    OperandMismatch {
        operator: &'static str,
        left: String,
        right: String,
    },

    CallDepthExceeded { function: String, limit: usize },

    /// The thread that evaluates a run could not be started.
    EvaluatorUnavailable { reason: String },
}

impl SemanticError {
    pub fn unknown_function(name: impl Into<String>) -> Self {
        SemanticError::UnknownFunction { name: name.into() }
    }

    pub fn type_mismatch(left: &TypeTerm, right: &TypeTerm) -> Self {
        SemanticError::TypeMismatch {
            left: left.to_string(),
            right: right.to_string(),
        }
    }

    pub fn infinite_type(var: &TypeVar, term: &TypeTerm) -> Self {
        SemanticError::InfiniteType {
            var: var.to_string(),
            term: term.to_string(),
        }
    }
}

impl fmt::Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticError::UnknownFunction { name } => {
                write!(f, "unknown function: {}", name)
            }
            SemanticError::TypeMismatch { left, right } => {
                write!(f, "type mismatch: cannot unify {} with {}", left, right)
            }
            SemanticError::InfiniteType { var, term } => {
                write!(f, "cannot construct infinite type: {} = {}", var, term)
            }
            SemanticError::ConflictingSubstitution {
                var,
                existing,
                proposed,
            } => write!(
                f,
                "conflicting substitution for {}: already {}, now {}",
                var, existing, proposed
            ),
            SemanticError::InconsistentSolution { left, right } => write!(
                f,
                "inconsistent solution: {} and {} differ after substitution",
                left, right
            ),
            SemanticError::ArityMismatch {
                function,
                expected,
                found,
            } => write!(
                f,
                "function {} expects {} argument(s), got {}",
                function, expected, found
            ),
            SemanticError::OperandMismatch {
                operator,
                left,
                right,
            } => write!(
                f,
                "operator {} cannot be applied to {} and {}",
                operator, left, right
            ),
            SemanticError::CallDepthExceeded { function, limit } => write!(
                f,
                "call to {} exceeds the maximum call depth of {}",
                function, limit
            ),
            SemanticError::EvaluatorUnavailable { reason } => {
                write!(f, "could not start the evaluator: {}", reason)
            }
        }
    }
}

impl std::error::Error for SemanticError {}

/// Any failure of the read → tokenize → parse → run/infer pipeline.
#[derive(Debug)]
pub enum Error {
    Io { path: PathBuf, source: io::Error },
    Tokenize(TokenizeError),
    Parse(ParseError),
    Semantic(SemanticError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io { path, source } => {
                write!(f, "could not read {}: {}", path.display(), source)
            }
            Error::Tokenize(err) => write!(f, "{}", err),
            Error::Parse(err) => write!(f, "{}", err),
            Error::Semantic(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { source, .. } => Some(source),
            Error::Tokenize(err) => Some(err),
            Error::Parse(err) => Some(err),
            Error::Semantic(err) => Some(err),
        }
    }
}

impl From<TokenizeError> for Error {
    fn from(err: TokenizeError) -> Self {
        Error::Tokenize(err)
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Parse(err)
    }
}

impl From<SemanticError> for Error {
    fn from(err: SemanticError) -> Self {
        Error::Semantic(err)
    }
}
