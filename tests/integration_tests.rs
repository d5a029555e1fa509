//! Whole-pipeline checks: printed programs parse back to the same tree, and
//! running and typing agree on the same sources.

use imp::interpreter::{Config, Value};
use imp::types::TypeTerm;
use imp::{infer_source, parse_program, run_source};

const PROGRAMS: &[&str] = &[
    "func main() { return 0 }",
    "func main() { x := 1 - (2 - 3); y := x - 1 - 1; return y }",
    "func main() { b := !(1 < 2) || true && !false; return b }",
    "func add(a, b) { return a + b }; func main() { x := add(add(1, 2), -3); return x }",
    "func zero() { return 0 }; func main() { while zero() > 1 x := 1 end; return zero() }",
    "func f(n) { if n > 0 r := n else if n < 0 r := 0 - n else r := 0 end end; return r };
     func main() { a := f(-4); return a }",
];

#[test]
fn e2e_printed_programs_reparse() {
    for source in PROGRAMS {
        let program = parse_program(source).unwrap();
        let printed = program.to_string();
        let reparsed = parse_program(&printed)
            .unwrap_or_else(|err| panic!("could not reparse:\n{}\n{}", printed, err));
        assert_eq!(program, reparsed, "printed as:\n{}", printed);
        assert_eq!(printed, reparsed.to_string());
    }
}

#[test]
fn e2e_printed_programs_behave_the_same() {
    for source in PROGRAMS {
        let printed = parse_program(source).unwrap().to_string();
        assert_eq!(
            run_source(source, Config::default()).unwrap(),
            run_source(&printed, Config::default()).unwrap()
        );
    }
}

#[test]
fn e2e_absolute_value() {
    let execution = run_source(PROGRAMS[5], Config::default()).unwrap();
    assert_eq!(execution.return_value, Some(Value::Int(4)));
}

#[test]
fn e2e_run_and_infer_agree() {
    let source = PROGRAMS[3];
    let execution = run_source(source, Config::default()).unwrap();
    let types = infer_source(source).unwrap();
    assert_eq!(execution.get("x"), Some(Value::Int(0)));
    assert_eq!(types.main.type_of("x::main"), Some(&TypeTerm::int()));
}
