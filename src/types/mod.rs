//! Hindley-Milner type inference for IMP programs.
//!
//! - [`translate`] rewrites the AST into a small lambda calculus
//! - [`infer`] walks it, generating constraints
//! - [`unify`] solves them into a [`Substitution`]

pub mod env;
pub mod infer;
pub mod subst;
pub mod translate;
pub mod ty;
pub mod unify;

pub use env::TypeEnvironment;
pub use infer::{infer_program, FunctionTypes, Infer, ProgramTypes};
pub use subst::Substitution;
pub use translate::{translate_program, HmExpr, HmVar, TranslatedProgram};
pub use ty::{TypeTerm, TypeVar};
pub use unify::{unify, Constraint};
