use std::collections::VecDeque;

use crate::error::SemanticError;

use super::subst::Substitution;
use super::ty::{TypeTerm, TypeVar};

/// Two terms that must end up equal
pub type Constraint = (TypeTerm, TypeTerm);

/// Solve a list of constraints, finding a substitution that makes both sides
/// of every constraint syntactically equal.
///
/// # Algorithm
///
/// Constraints are taken from the front of a worklist, in order:
///
/// ```text
/// 'a  = 'a        drop it
/// 'a  = t         bind 'a := t        (also  t = 'a)
/// s1 -> t1 = s2 -> t2
///                 push s1 = s2 and t1 = t2 to the front, domains first
/// C   = C         drop it
/// C   = D         TypeMismatch
/// C   = s -> t    TypeMismatch        (also  s -> t = C)
/// ```
///
/// Binding `'a := t` first checks that `'a` has no other binding
/// (`ConflictingSubstitution`) and that `t` is not an arrow containing `'a`
/// (`InfiniteType`). The binding is then substituted into every constraint
/// still on the worklist, so no later constraint mentions `'a` again.
///
/// Afterwards the substitution is merged into itself until idempotent, and
/// re-applied to every input constraint as a final check.
///
/// # Example
///
/// ```text
/// 'a = Int -> Int,  'a = 'b -> 'c
///   bind 'a := Int -> Int       worklist: Int -> Int = 'b -> 'c
///   decompose                   worklist: Int = 'b, Int = 'c
///   bind 'b := Int, 'c := Int
/// ```
pub fn unify(constraints: &[Constraint]) -> Result<Substitution, SemanticError> {
    let mut worklist: VecDeque<Constraint> = constraints.iter().cloned().collect();
    let mut subst = Substitution::empty();

    while let Some((left, right)) = worklist.pop_front() {
        match (&left, &right) {
            (TypeTerm::Var(a), TypeTerm::Var(b)) if a == b => {}
            (TypeTerm::Var(var), term) | (term, TypeTerm::Var(var)) => {
                bind(var, term, &mut subst, &mut worklist)?;
            }
            (TypeTerm::Arrow(d1, c1), TypeTerm::Arrow(d2, c2)) => {
                worklist.push_front(((**c1).clone(), (**c2).clone()));
                worklist.push_front(((**d1).clone(), (**d2).clone()));
            }
            (TypeTerm::Constructor(a), TypeTerm::Constructor(b)) if a == b => {}
            _ => return Err(SemanticError::type_mismatch(&left, &right)),
        }
    }

    subst.merge();
    check_solution(constraints, &subst)?;
    log::trace!(
        "solved {} constraint(s) into {} binding(s)",
        constraints.len(),
        subst.len()
    );
    Ok(subst)
}

fn bind(
    var: &TypeVar,
    term: &TypeTerm,
    subst: &mut Substitution,
    worklist: &mut VecDeque<Constraint>,
) -> Result<(), SemanticError> {
    if let Some(existing) = subst.get(var) {
        if existing == term {
            return Ok(());
        }
        return Err(SemanticError::ConflictingSubstitution {
            var: var.to_string(),
            existing: existing.to_string(),
            proposed: term.to_string(),
        });
    }

    if matches!(term, TypeTerm::Arrow(..)) && term.contains(var) {
        return Err(SemanticError::infinite_type(var, term));
    }

    let single = Substitution::singleton(var.clone(), term.clone());
    for (left, right) in worklist.iter_mut() {
        *left = single.apply(left);
        *right = single.apply(right);
    }
    subst.insert(var.clone(), term.clone());
    Ok(())
}

/// Check that `subst` makes both sides of every constraint equal
pub fn check_solution(constraints: &[Constraint], subst: &Substitution) -> Result<(), SemanticError> {
    for (left, right) in constraints {
        let left = subst.apply(left);
        let right = subst.apply(right);
        if left != right {
            return Err(SemanticError::InconsistentSolution {
                left: left.to_string(),
                right: right.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> TypeTerm {
        TypeTerm::var(name)
    }

    fn int_to_int() -> TypeTerm {
        TypeTerm::arrow(TypeTerm::int(), TypeTerm::int())
    }

    #[test]
    fn test_unify_arrow_with_variables() {
        let constraints = vec![
            (var("a"), int_to_int()),
            (var("a"), TypeTerm::arrow(var("b"), var("c"))),
        ];
        let subst = unify(&constraints).unwrap();

        assert_eq!(subst.apply(&var("b")), TypeTerm::int());
        assert_eq!(subst.apply(&var("c")), TypeTerm::int());
        for (left, right) in &constraints {
            assert_eq!(subst.apply(left), subst.apply(right));
        }
    }

    #[test]
    fn test_unify_constructor_with_variable_on_right() {
        let subst = unify(&[(TypeTerm::boolean(), var("a"))]).unwrap();
        assert_eq!(subst.apply(&var("a")), TypeTerm::boolean());
    }

    #[test]
    fn test_unify_same_variable() {
        let subst = unify(&[(var("a"), var("a"))]).unwrap();
        assert!(subst.is_empty());
    }

    #[test]
    fn test_occurs_check() {
        let err = unify(&[(var("t"), TypeTerm::arrow(var("t"), TypeTerm::int()))]).unwrap_err();
        assert_eq!(
            err,
            SemanticError::InfiniteType {
                var: "'t".to_string(),
                term: "'t -> Int".to_string(),
            }
        );
    }

    #[test]
    fn test_occurs_check_from_right() {
        let err = unify(&[(TypeTerm::arrow(TypeTerm::int(), var("t")), var("t"))]).unwrap_err();
        assert!(matches!(err, SemanticError::InfiniteType { .. }));
    }

    #[test]
    fn test_constructor_mismatch() {
        let err = unify(&[(var("a"), TypeTerm::int()), (var("a"), TypeTerm::boolean())]).unwrap_err();
        assert_eq!(
            err,
            SemanticError::TypeMismatch {
                left: "Int".to_string(),
                right: "Bool".to_string(),
            }
        );
    }

    #[test]
    fn test_arrow_against_constructor() {
        let err = unify(&[(int_to_int(), TypeTerm::unit())]).unwrap_err();
        assert!(matches!(err, SemanticError::TypeMismatch { .. }));
    }

    #[test]
    fn test_chained_variables_are_merged() {
        let constraints = vec![
            (var("a"), var("b")),
            (var("c"), TypeTerm::arrow(var("a"), var("a"))),
            (var("b"), TypeTerm::int()),
        ];
        let subst = unify(&constraints).unwrap();
        assert!(subst.is_idempotent());
        assert_eq!(subst.apply(&var("c")), int_to_int());
    }

    #[test]
    fn test_check_solution_rejects_bad_substitution() {
        let subst = Substitution::singleton(TypeVar::named("a"), TypeTerm::int());
        let err = check_solution(&[(var("a"), TypeTerm::boolean())], &subst).unwrap_err();
        assert!(matches!(err, SemanticError::InconsistentSolution { .. }));
    }
}
