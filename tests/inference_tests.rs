//! Type inference over whole programs, plus the unifier on hand-built
//! constraints.

use imp::types::{unify, Constraint, TypeTerm, TypeVar};
use imp::{infer_source, Error, SemanticError};

fn int() -> TypeTerm {
    TypeTerm::int()
}

fn boolean() -> TypeTerm {
    TypeTerm::boolean()
}

fn arrow(domain: TypeTerm, codomain: TypeTerm) -> TypeTerm {
    TypeTerm::arrow(domain, codomain)
}

fn infer_error(source: &str) -> SemanticError {
    match infer_source(source).unwrap_err() {
        Error::Semantic(err) => err,
        other => panic!("expected a semantic error, got {}", other),
    }
}

#[test]
fn unify_solves_arrow_constraints() {
    let a = TypeTerm::var("a");
    let b = TypeTerm::var("b");
    let c = TypeTerm::var("c");
    let constraints: Vec<Constraint> = vec![
        (a.clone(), arrow(int(), int())),
        (a, arrow(b, c)),
    ];

    let solution = unify(&constraints).unwrap();
    assert_eq!(solution.get(&TypeVar::named("b")), Some(&int()));
    assert_eq!(solution.get(&TypeVar::named("c")), Some(&int()));
    for (left, right) in &constraints {
        assert_eq!(solution.apply(left), solution.apply(right));
    }
}

#[test]
fn unify_rejects_infinite_type() {
    let t = TypeTerm::var("t");
    let err = unify(&[(t.clone(), arrow(t, int()))]).unwrap_err();
    assert!(matches!(err, SemanticError::InfiniteType { .. }));
}

#[test]
fn infer_assignment_body() {
    let types = infer_source("func main() { x := 1 + 2; return x }").unwrap();
    assert_eq!(types.main.signature, int());
    assert_eq!(types.main.type_of("x::main"), Some(&int()));
}

#[test]
fn infer_curried_signature() {
    let types = infer_source(
        "func add(a, b) { return a + b }; func main() { x := add(1, 2); return x }",
    )
    .unwrap();
    let add = types.function("add").unwrap();
    assert_eq!(add.signature, arrow(int(), arrow(int(), int())));
    assert_eq!(add.type_of("a::add"), Some(&int()));
    assert!(types.to_string().contains("add : Int -> Int -> Int"));
}

#[test]
fn infer_recursive_functions() {
    let source = "
        func mul(a, b) { r := 0; while b > 0 r := r + a; b := b - 1 end; return r };
        func fact(n) { r := 1; if n > 1 r := mul(n, fact(n - 1)) end; return r };
        func main() { x := fact(5); return x }
    ";
    let types = infer_source(source).unwrap();
    assert_eq!(
        types.function("mul").unwrap().signature,
        arrow(int(), arrow(int(), int()))
    );
    assert_eq!(types.function("fact").unwrap().signature, arrow(int(), int()));
    assert_eq!(types.main.type_of("x::main"), Some(&int()));
    assert_eq!(
        types
            .functions
            .iter()
            .map(|func| func.name.as_str())
            .collect::<Vec<_>>(),
        vec!["mul", "fact"]
    );
}

#[test]
fn infer_boolean_function() {
    let types = infer_source(
        "func positive(n) { return n > 0 }; func main() { b := positive(3); return b }",
    )
    .unwrap();
    assert_eq!(
        types.function("positive").unwrap().signature,
        arrow(int(), boolean())
    );
    assert_eq!(types.main.signature, boolean());
}

#[test]
fn infer_let_polymorphism() {
    let types = infer_source(
        "func id(x) { return x }; func main() { a := id(1); b := id(true); return a }",
    )
    .unwrap();

    match &types.function("id").unwrap().signature {
        TypeTerm::Arrow(domain, codomain) => {
            assert!(matches!(**domain, TypeTerm::Var(_)));
            assert_eq!(domain, codomain);
        }
        other => panic!("expected an arrow, got {}", other),
    }
    assert_eq!(types.main.type_of("a::main"), Some(&int()));
    assert_eq!(types.main.type_of("b::main"), Some(&boolean()));
    assert_eq!(types.main.signature, int());
}

#[test]
fn infer_argument_mismatch() {
    let err = infer_error("func f(a) { return a + 1 }; func main() { return f(true) }");
    assert!(matches!(err, SemanticError::TypeMismatch { .. }));
}

#[test]
fn infer_variable_changing_type() {
    let err = infer_error("func main() { x := 1; x := true; return x }");
    assert!(matches!(err, SemanticError::TypeMismatch { .. }));
}

#[test]
fn infer_unknown_function() {
    let err = infer_error("func main() { return nope(1) }");
    assert_eq!(err, SemanticError::unknown_function("nope"));
}

#[test]
fn infer_missing_main() {
    let err = infer_error("func f() { return 1 }");
    assert_eq!(err, SemanticError::unknown_function("main"));
}
