//! End-to-end interpreter tests: source text in, bindings and return value out.

use imp::interpreter::{Config, Execution, Value};
use imp::{run_script_source, run_source, Error, SemanticError};

const FACTORIAL: &str = "
func mul(a, b) {
  r := 0;
  while b > 0
    r := r + a;
    b := b - 1
  end;
  return r
};

func fact(n) {
  r := 1;
  if n > 1
    r := mul(n, fact(n - 1))
  end;
  return r
};

func main() {
  x := fact(5);
  return x
}
";

fn run_program(source: &str) -> Execution {
    run_source(source, Config::default()).unwrap()
}

fn semantic_error(source: &str, config: Config) -> SemanticError {
    match run_source(source, config).unwrap_err() {
        Error::Semantic(err) => err,
        other => panic!("expected a semantic error, got {}", other),
    }
}

#[test]
fn e2e_factorial() {
    let execution = run_program(FACTORIAL);
    assert_eq!(execution.get("x"), Some(Value::Int(120)));
    assert_eq!(execution.return_value, Some(Value::Int(120)));
    assert_eq!(execution.to_string(), "x: 120\n");
}

#[test]
fn e2e_callee_frames_do_not_leak() {
    let source = "
        func f(a) { a := a + 100; t := a + 1; return t };
        func main() { a := 10; y := f(a); return a }
    ";
    let execution = run_program(source);
    assert_eq!(
        execution.bindings,
        vec![
            ("a".to_string(), Value::Int(10)),
            ("y".to_string(), Value::Int(111)),
        ]
    );
    assert_eq!(execution.get("t"), None);
}

#[test]
fn e2e_callee_cannot_see_caller_variables() {
    let source = "func f() { return secret }; func main() { secret := 5; x := f(); return x }";
    assert_eq!(run_program(source).get("x"), Some(Value::Int(0)));
}

#[test]
fn e2e_undefined_variable_reads_zero_without_binding() {
    let execution = run_program("func main() { x := y + 1; return x }");
    assert_eq!(execution.get("x"), Some(Value::Int(1)));
    assert_eq!(execution.get("y"), None);
}

#[test]
fn e2e_if_else_branches() {
    let source = "func main() { x := 3; if x > 2 y := 1 else y := 2 end; return y }";
    assert_eq!(run_program(source).return_value, Some(Value::Int(1)));

    let source = "func main() { x := 1; if x > 2 y := 1 else y := 2 end; return y }";
    assert_eq!(run_program(source).return_value, Some(Value::Int(2)));
}

#[test]
fn e2e_while_never_entered() {
    let execution = run_program("func main() { while false x := 1 end; return 7 }");
    assert!(execution.bindings.is_empty());
    assert_eq!(execution.return_value, Some(Value::Int(7)));
}

#[test]
fn e2e_boolean_values() {
    let execution = run_program("func main() { b := 1 < 2 && !false; return b }");
    assert_eq!(execution.return_value, Some(Value::Bool(true)));
    assert_eq!(execution.to_string(), "b: true\n");
}

#[test]
fn e2e_runs_are_deterministic() {
    let first = run_program(FACTORIAL);
    let second = run_program(FACTORIAL);
    assert_eq!(first, second);
}

#[test]
fn e2e_script_mode() {
    let execution = run_script_source(
        "i := 0; s := 0; while i < 4 i := i + 1; s := s + i end",
        Config::default(),
    )
    .unwrap();
    assert_eq!(execution.to_string(), "i: 4\ns: 10\n");
    assert_eq!(execution.return_value, None);
}

#[test]
fn e2e_missing_main() {
    let err = semantic_error("func f() { return 1 }", Config::default());
    assert_eq!(err, SemanticError::unknown_function("main"));
}

#[test]
fn e2e_unknown_function() {
    let err = semantic_error("func main() { return g(1) }", Config::default());
    assert_eq!(err, SemanticError::unknown_function("g"));
}

#[test]
fn e2e_arity_mismatch() {
    let err = semantic_error(
        "func f(a, b) { return a }; func main() { return f(1) }",
        Config::default(),
    );
    assert_eq!(
        err,
        SemanticError::ArityMismatch {
            function: "f".to_string(),
            expected: 2,
            found: 1,
        }
    );
}

#[test]
fn e2e_unbounded_recursion_hits_call_depth() {
    let source = "func loop(n) { return loop(n + 1) }; func main() { return loop(0) }";
    let err = semantic_error(source, Config { max_call_depth: 8 });
    assert!(matches!(
        err,
        SemanticError::CallDepthExceeded { limit: 8, .. }
    ));
}

#[test]
fn e2e_boolean_arithmetic_is_rejected() {
    let err = semantic_error(
        "func main() { b := true; x := b + 1; return x }",
        Config::default(),
    );
    assert!(matches!(err, SemanticError::OperandMismatch { operator: "+", .. }));
}

const COUNTDOWN: &str = "
func f(n) {
  r := 0;
  if n > 0
    r := f(n - 1) + 1
  end;
  return r
};

func main() {
  x := f(DEPTH);
  return x
}
";

fn countdown(depth: usize) -> String {
    COUNTDOWN.replace("DEPTH", &depth.to_string())
}

#[test]
fn e2e_recursion_near_default_depth_limit() {
    let execution = run_program(&countdown(990));
    assert_eq!(execution.get("x"), Some(Value::Int(990)));
}

#[test]
fn e2e_recursion_past_default_depth_limit() {
    let err = semantic_error(&countdown(1500), Config::default());
    assert_eq!(
        err,
        SemanticError::CallDepthExceeded {
            function: "f".to_string(),
            limit: 1000,
        }
    );
}

#[test]
fn e2e_arguments_are_evaluated_before_the_callee_is_resolved() {
    let source = "func main() { x := nope(missing(1)); return x }";
    assert_eq!(
        semantic_error(source, Config::default()),
        SemanticError::unknown_function("missing")
    );
}
