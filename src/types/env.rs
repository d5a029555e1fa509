use std::collections::HashMap;
use std::rc::Rc;

use super::subst::Substitution;
use super::translate::{HmExpr, HmVar};
use super::ty::{TypeTerm, TypeVar};
use super::unify::Constraint;

/// A subterm the inference pass has typed
#[derive(Debug, Clone)]
pub struct Subterm {
    pub expr: Rc<HmExpr>,
    pub ty: TypeTerm,
    /// Table index of the first subterm of this node's subtree. Children are
    /// recorded before their parent, so `first..=own index` is the subtree.
    pub first: usize,
}

/// State of one inference run.
pub struct TypeEnvironment {
    builtins: HashMap<&'static str, TypeTerm>,
    pub(super) constraints: Vec<Constraint>,
    pub(super) subterms: Vec<Subterm>,
    variables: HashMap<HmVar, TypeTerm>,
    signatures: HashMap<String, TypeTerm>,
    next_var: usize,
}

fn operator(operands: TypeTerm, result: TypeTerm) -> TypeTerm {
    TypeTerm::arrow(operands.clone(), TypeTerm::arrow(operands, result))
}

impl TypeEnvironment {
    pub fn new() -> Self {
        let int = TypeTerm::int;
        let boolean = TypeTerm::boolean;
        let unit = TypeTerm::unit;

        let mut builtins = HashMap::new();
        builtins.insert("+", operator(int(), int()));
        builtins.insert("-", operator(int(), int()));
        for cmp in ["<", "<=", ">", ">=", "==", "!="] {
            builtins.insert(cmp, operator(int(), boolean()));
        }
        builtins.insert("&&", operator(boolean(), boolean()));
        builtins.insert("||", operator(boolean(), boolean()));
        builtins.insert("!", TypeTerm::arrow(boolean(), boolean()));
        builtins.insert(
            "if",
            TypeTerm::arrow(boolean(), TypeTerm::arrow(unit(), unit())),
        );
        builtins.insert(
            "if-else",
            TypeTerm::arrow(
                boolean(),
                TypeTerm::arrow(unit(), TypeTerm::arrow(unit(), unit())),
            ),
        );
        builtins.insert(
            "while",
            TypeTerm::arrow(boolean(), TypeTerm::arrow(unit(), unit())),
        );

        TypeEnvironment {
            builtins,
            constraints: Vec::new(),
            subterms: Vec::new(),
            variables: HashMap::new(),
            signatures: HashMap::new(),
            next_var: 0,
        }
    }

    pub fn fresh(&mut self) -> TypeTerm {
        let var = TypeVar::new(self.next_var);
        self.next_var += 1;
        TypeTerm::Var(var)
    }

    pub fn constrain(&mut self, left: TypeTerm, right: TypeTerm) {
        self.constraints.push((left, right));
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// The type variable of a program variable, created on first use and
    /// shared by every later use.
    pub fn variable(&mut self, var: &HmVar) -> TypeTerm {
        if let Some(term) = self.variables.get(var) {
            return term.clone();
        }
        let term = self.fresh();
        self.variables.insert(var.clone(), term.clone());
        term
    }

    pub fn record_signature(&mut self, name: impl Into<String>, signature: TypeTerm) {
        self.signatures.insert(name.into(), signature);
    }

    pub fn signature(&self, name: &str) -> Option<&TypeTerm> {
        self.signatures.get(name)
    }

    /// Replace every variable of `term` with a fresh one
    pub fn instantiate(&mut self, term: &TypeTerm) -> TypeTerm {
        let mut renaming = Substitution::empty();
        for var in term.type_vars() {
            let fresh = self.fresh();
            renaming.insert(var, fresh);
        }
        renaming.apply(term)
    }

    /// Type of a leaf variable: built-in operators have fixed signatures,
    /// `:=`, `;` and `return` get fresh ones per use, solved functions are
    /// instantiated, and anything else is a program variable.
    pub fn leaf(&mut self, var: &HmVar) -> TypeTerm {
        if var.is_global() {
            if let Some(term) = self.builtins.get(var.name.as_str()) {
                return term.clone();
            }
            match var.name.as_str() {
                ":=" => {
                    let t = self.fresh();
                    return TypeTerm::arrow(t.clone(), TypeTerm::arrow(t, TypeTerm::unit()));
                }
                ";" => {
                    let t = self.fresh();
                    return TypeTerm::arrow(TypeTerm::unit(), TypeTerm::arrow(t.clone(), t));
                }
                "return" => {
                    let t = self.fresh();
                    return TypeTerm::arrow(t.clone(), t);
                }
                _ => {}
            }
            if let Some(signature) = self.signatures.get(&var.name).cloned() {
                return self.instantiate(&signature);
            }
        }
        self.variable(var)
    }

    pub fn record(&mut self, expr: &Rc<HmExpr>, ty: TypeTerm, first: usize) {
        self.subterms.push(Subterm {
            expr: Rc::clone(expr),
            ty,
            first,
        });
    }

    /// Table index of `expr`, found by identity
    pub fn position_of(&self, expr: &Rc<HmExpr>) -> Option<usize> {
        self.subterms
            .iter()
            .rposition(|subterm| Rc::ptr_eq(&subterm.expr, expr))
    }

    pub fn subterms(&self) -> &[Subterm] {
        &self.subterms
    }
}

impl Default for TypeEnvironment {
    fn default() -> Self {
        Self::new()
    }
}
