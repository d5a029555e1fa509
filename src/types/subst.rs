use std::collections::HashMap;
use std::rc::Rc;

use super::ty::{TypeTerm, TypeVar};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitution(HashMap<TypeVar, TypeTerm>);

impl Substitution {
    pub fn empty() -> Self {
        Substitution(HashMap::new())
    }

    pub fn singleton(var: TypeVar, term: TypeTerm) -> Self {
        let mut map = HashMap::new();
        map.insert(var, term);
        Substitution(map)
    }

    pub fn get(&self, var: &TypeVar) -> Option<&TypeTerm> {
        self.0.get(var)
    }

    pub fn insert(&mut self, var: TypeVar, term: TypeTerm) {
        self.0.insert(var, term);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Bindings ordered by variable name
    pub fn bindings(&self) -> Vec<(&TypeVar, &TypeTerm)> {
        let mut bindings: Vec<_> = self.0.iter().collect();
        bindings.sort_by(|a, b| a.0.cmp(b.0));
        bindings
    }

    /// Replace every bound variable in `term` once. Subterms without bound
    /// variables are shared with the input.
    pub fn apply(&self, term: &TypeTerm) -> TypeTerm {
        match term {
            TypeTerm::Var(v) => self.0.get(v).cloned().unwrap_or_else(|| term.clone()),
            TypeTerm::Constructor(_) => term.clone(),
            TypeTerm::Arrow(domain, codomain) => {
                TypeTerm::Arrow(self.apply_shared(domain), self.apply_shared(codomain))
            }
        }
    }

    fn apply_shared(&self, term: &Rc<TypeTerm>) -> Rc<TypeTerm> {
        match &**term {
            TypeTerm::Var(v) => match self.0.get(v) {
                Some(bound) => Rc::new(bound.clone()),
                None => Rc::clone(term),
            },
            TypeTerm::Constructor(_) => Rc::clone(term),
            TypeTerm::Arrow(domain, codomain) => {
                let new_domain = self.apply_shared(domain);
                let new_codomain = self.apply_shared(codomain);
                if Rc::ptr_eq(&new_domain, domain) && Rc::ptr_eq(&new_codomain, codomain) {
                    Rc::clone(term)
                } else {
                    Rc::new(TypeTerm::Arrow(new_domain, new_codomain))
                }
            }
        }
    }

    /// Substitute the bindings into each other until no right-hand side
    /// mentions a bound variable.
    ///
    /// Terminates for substitutions built by [`super::unify::unify`], whose
    /// bindings never form a cycle. A cyclic map stops after one round per
    /// binding and is left for the solution check to reject.
    pub fn merge(&mut self) {
        for _ in 0..=self.0.len() {
            let snapshot = self.clone();
            let mut changed = false;
            for term in self.0.values_mut() {
                if term.type_vars().iter().any(|v| snapshot.0.contains_key(v)) {
                    *term = snapshot.apply(term);
                    changed = true;
                }
            }
            if !changed {
                return;
            }
        }
        log::warn!("substitution did not settle after {} rounds", self.0.len() + 1);
    }

    pub fn is_idempotent(&self) -> bool {
        self.0
            .values()
            .all(|term| term.type_vars().iter().all(|v| !self.0.contains_key(v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> TypeVar {
        TypeVar::named(name)
    }

    #[test]
    fn test_apply_to_arrow() {
        let subst = Substitution::singleton(var("a"), TypeTerm::int());
        let term = TypeTerm::arrow(TypeTerm::var("a"), TypeTerm::boolean());
        assert_eq!(subst.apply(&term), TypeTerm::arrow(TypeTerm::int(), TypeTerm::boolean()));
    }

    #[test]
    fn test_apply_preserves_unbound_vars() {
        let subst = Substitution::singleton(var("a"), TypeTerm::int());
        assert_eq!(subst.apply(&TypeTerm::var("b")), TypeTerm::var("b"));
    }

    #[test]
    fn test_apply_shares_untouched_subterms() {
        let subst = Substitution::singleton(var("a"), TypeTerm::int());
        let untouched = Rc::new(TypeTerm::arrow(TypeTerm::var("b"), TypeTerm::unit()));
        let term = TypeTerm::Arrow(Rc::new(TypeTerm::var("a")), Rc::clone(&untouched));

        match subst.apply(&term) {
            TypeTerm::Arrow(domain, codomain) => {
                assert_eq!(*domain, TypeTerm::int());
                assert!(Rc::ptr_eq(&codomain, &untouched));
            }
            other => panic!("expected arrow, got {}", other),
        }
    }

    #[test]
    fn test_merge_chains() {
        let mut subst = Substitution::empty();
        subst.insert(var("a"), TypeTerm::arrow(TypeTerm::var("b"), TypeTerm::var("c")));
        subst.insert(var("b"), TypeTerm::var("c"));
        subst.insert(var("c"), TypeTerm::int());
        assert!(!subst.is_idempotent());

        subst.merge();
        assert!(subst.is_idempotent());
        assert_eq!(
            subst.get(&var("a")),
            Some(&TypeTerm::arrow(TypeTerm::int(), TypeTerm::int()))
        );
    }
}
