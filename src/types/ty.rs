use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeVar(pub String);

impl TypeVar {
    pub fn new(id: usize) -> Self {
        TypeVar(format!("a{}", id))
    }

    pub fn named(name: impl Into<String>) -> Self {
        TypeVar(name.into())
    }
}

impl fmt::Display for TypeVar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "'{}", self.0)
    }
}

/// A type: a variable, a function arrow, or a named constructor such as
/// `Int`. Subterms are shared, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeTerm {
    Var(TypeVar),
    Arrow(Rc<TypeTerm>, Rc<TypeTerm>),
    Constructor(String),
}

impl TypeTerm {
    pub fn int() -> Self {
        TypeTerm::Constructor("Int".to_string())
    }

    pub fn boolean() -> Self {
        TypeTerm::Constructor("Bool".to_string())
    }

    pub fn unit() -> Self {
        TypeTerm::Constructor("Unit".to_string())
    }

    pub fn var(name: impl Into<String>) -> Self {
        TypeTerm::Var(TypeVar::named(name))
    }

    pub fn arrow(domain: TypeTerm, codomain: TypeTerm) -> Self {
        TypeTerm::Arrow(Rc::new(domain), Rc::new(codomain))
    }

    /// Right-nested arrow through all of `terms`: `[a, b, c]` is `a -> b -> c`
    pub fn curried(terms: impl IntoIterator<Item = TypeTerm>) -> Option<Self> {
        let mut terms: Vec<_> = terms.into_iter().collect();
        let last = terms.pop()?;
        Some(
            terms
                .into_iter()
                .rev()
                .fold(last, |codomain, domain| TypeTerm::arrow(domain, codomain)),
        )
    }

    /// Does `var` occur anywhere in this term?
    pub fn contains(&self, var: &TypeVar) -> bool {
        match self {
            TypeTerm::Var(v) => v == var,
            TypeTerm::Arrow(domain, codomain) => domain.contains(var) || codomain.contains(var),
            TypeTerm::Constructor(_) => false,
        }
    }

    /// Variables of this term, each once, in order of first appearance
    pub fn type_vars(&self) -> Vec<TypeVar> {
        fn collect(term: &TypeTerm, out: &mut Vec<TypeVar>) {
            match term {
                TypeTerm::Var(v) => {
                    if !out.contains(v) {
                        out.push(v.clone());
                    }
                }
                TypeTerm::Arrow(domain, codomain) => {
                    collect(domain, out);
                    collect(codomain, out);
                }
                TypeTerm::Constructor(_) => {}
            }
        }

        let mut vars = Vec::new();
        collect(self, &mut vars);
        vars
    }

    pub fn pretty(&self) -> String {
        match self {
            TypeTerm::Var(v) => v.to_string(),
            TypeTerm::Constructor(name) => name.clone(),
            TypeTerm::Arrow(domain, codomain) => {
                let domain_str = if matches!(**domain, TypeTerm::Arrow(..)) {
                    format!("({})", domain.pretty())
                } else {
                    domain.pretty()
                };
                format!("{} -> {}", domain_str, codomain.pretty())
            }
        }
    }
}

impl fmt::Display for TypeTerm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.pretty())
    }
}
