//! # Type Inference
//!
//! Constraint-based Hindley-Milner inference over the IR produced by
//! [`super::translate`].
//!
//! Every node gets a fresh type variable `'a` and contributes one constraint:
//!
//! ```text
//! \x. e           'a = type(x) -> type(e)
//! f e             type(f) = type(e) -> 'a
//! let x = b in e  'a = type(e)
//! 42, true        'a = Int, 'a = Bool
//! name            'a = type of the name (see TypeEnvironment::leaf)
//! ```
//!
//! A `let` is solved on the spot: once its bound expression has been walked,
//! the constraints gathered since the `let` began are unified, and the solved
//! type becomes the function's signature. Later uses of the function get a
//! fresh copy of that signature, which makes `let`-bound functions
//! polymorphic. Inside its own body a function is monomorphic.

use std::collections::HashSet;
use std::fmt;
use std::ops::Range;
use std::rc::Rc;

use crate::ast::{Program, ENTRY_POINT};
use crate::error::SemanticError;

use super::env::TypeEnvironment;
use super::subst::Substitution;
use super::translate::{translate_program, HmExpr};
use super::ty::TypeTerm;
use super::unify::unify;

/// Solved types for one function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionTypes {
    pub name: String,
    pub signature: TypeTerm,
    /// Printed IR subterm and its type, each printed form once
    pub subterms: Vec<(String, TypeTerm)>,
}

impl FunctionTypes {
    /// Type of the subterm printed as `printed`, e.g. `x::main`
    pub fn type_of(&self, printed: &str) -> Option<&TypeTerm> {
        self.subterms
            .iter()
            .find(|(term, _)| term == printed)
            .map(|(_, ty)| ty)
    }
}

impl fmt::Display for FunctionTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} : {}", self.name, self.signature)?;
        for (term, ty) in &self.subterms {
            writeln!(f, "  {} : {}", term, ty)?;
        }
        Ok(())
    }
}

/// Solved types for a whole program, `main` last
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramTypes {
    pub functions: Vec<FunctionTypes>,
    pub main: FunctionTypes,
}

impl ProgramTypes {
    pub fn function(&self, name: &str) -> Option<&FunctionTypes> {
        if name == ENTRY_POINT {
            return Some(&self.main);
        }
        self.functions.iter().find(|func| func.name == name)
    }
}

impl fmt::Display for ProgramTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for func in &self.functions {
            writeln!(f, "{}", func)?;
        }
        write!(f, "{}", self.main)
    }
}

pub struct Infer {
    env: TypeEnvironment,
    reports: Vec<FunctionTypes>,
}

impl Infer {
    pub fn new() -> Self {
        Self {
            env: TypeEnvironment::new(),
            reports: Vec::new(),
        }
    }

    pub fn env(&self) -> &TypeEnvironment {
        &self.env
    }

    /// Walk `expr`, generating constraints, and return its type variable
    pub fn infer_expr(&mut self, expr: &Rc<HmExpr>) -> Result<TypeTerm, SemanticError> {
        let first = self.env.subterms.len();
        let ty = self.env.fresh();

        match &**expr {
            HmExpr::Int(_) => self.env.constrain(ty.clone(), TypeTerm::int()),
            HmExpr::Bool(_) => self.env.constrain(ty.clone(), TypeTerm::boolean()),
            HmExpr::Var(var) => {
                let leaf = self.env.leaf(var);
                self.env.constrain(ty.clone(), leaf);
            }
            HmExpr::Abs(param, body) => {
                let param_ty = self.env.variable(param);
                let param_expr = Rc::new(HmExpr::Var(param.clone()));
                self.env.record(&param_expr, param_ty.clone(), self.env.subterms.len());

                let body_ty = self.infer_expr(body)?;
                self.env
                    .constrain(ty.clone(), TypeTerm::arrow(param_ty, body_ty));
            }
            HmExpr::App(func, arg) => {
                let func_ty = self.infer_expr(func)?;
                let arg_ty = self.infer_expr(arg)?;
                self.env
                    .constrain(func_ty, TypeTerm::arrow(arg_ty, ty.clone()));
            }
            HmExpr::Let(name, bound, body) => {
                let mark = self.env.constraints.len();
                let recursive = self.env.variable(name);
                let bound_ty = self.infer_expr(bound)?;
                self.env.constrain(recursive, bound_ty.clone());

                let solution = unify(&self.env.constraints[mark..])?;
                let signature = solution.apply(&bound_ty);
                log::debug!("{} : {}", name.name, signature);

                let report = self.report(&name.name, signature.clone(), first..self.env.subterms.len(), &solution);
                self.reports.push(report);
                self.env.record_signature(name.name.as_str(), signature);

                let body_ty = self.infer_expr(body)?;
                self.env.constrain(ty.clone(), body_ty);
            }
        }

        self.env.record(expr, ty.clone(), first);
        Ok(ty)
    }

    /// Unify every constraint generated so far
    pub fn solve(&self) -> Result<Substitution, SemanticError> {
        unify(self.env.constraints())
    }

    fn report(
        &self,
        name: &str,
        signature: TypeTerm,
        range: Range<usize>,
        solution: &Substitution,
    ) -> FunctionTypes {
        let mut seen = HashSet::new();
        let mut subterms = Vec::new();
        for subterm in &self.env.subterms()[range] {
            if matches!(*subterm.expr, HmExpr::Let(..)) {
                continue;
            }
            let printed = subterm.expr.to_string();
            if seen.insert(printed.clone()) {
                subterms.push((printed, solution.apply(&subterm.ty)));
            }
        }
        FunctionTypes {
            name: name.to_string(),
            signature,
            subterms,
        }
    }
}

impl Default for Infer {
    fn default() -> Self {
        Self::new()
    }
}

/// Infer the types of every function of `program`
pub fn infer_program(program: &Program) -> Result<ProgramTypes, SemanticError> {
    let translated = translate_program(program)?;
    log::trace!("IR: {}", translated.expr);

    let mut infer = Infer::new();
    infer.infer_expr(&translated.expr)?;
    let solution = infer.solve()?;
    log::debug!(
        "{} constraint(s), {} binding(s)",
        infer.env().constraints().len(),
        solution.len()
    );
    for (var, term) in solution.bindings() {
        log::trace!("{} := {}", var, term);
    }

    let index = infer
        .env()
        .position_of(&translated.main)
        .ok_or_else(|| SemanticError::unknown_function(ENTRY_POINT))?;
    let main_entry = &infer.env().subterms()[index];
    let signature = solution.apply(&main_entry.ty);
    let main = infer.report(ENTRY_POINT, signature, main_entry.first..index + 1, &solution);

    Ok(ProgramTypes {
        functions: infer.reports,
        main,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse;

    fn types(source: &str) -> Result<ProgramTypes, SemanticError> {
        infer_program(&parse(tokenize(source).unwrap()).unwrap())
    }

    #[test]
    fn test_literal_program() {
        let types = types("func main() { return 1 }").unwrap();
        assert_eq!(types.main.signature, TypeTerm::int());
        assert!(types.functions.is_empty());
    }

    #[test]
    fn test_assignment_infers_int() {
        let types = types("func main() { x := 1 + 2; return x }").unwrap();
        assert_eq!(types.main.signature, TypeTerm::int());
        assert_eq!(types.main.type_of("x::main"), Some(&TypeTerm::int()));
    }

    #[test]
    fn test_let_scaffolding_is_not_reported() {
        let types = types("func one() { return 1 }; func main() { return one() }").unwrap();
        for func in types.functions.iter().chain([&types.main]) {
            assert!(func.subterms.iter().all(|(term, _)| !term.starts_with("let ")));
        }
        assert_eq!(types.function("one").unwrap().signature, TypeTerm::int());
    }

    #[test]
    fn test_condition_must_be_boolean() {
        let err = types("func main() { x := 1; if x x := 2 end; return x }").unwrap_err();
        assert!(matches!(err, SemanticError::TypeMismatch { .. }));
    }
}
