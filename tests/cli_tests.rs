use std::io::Write;
use std::process::Command;

use assert_cmd::{
    assert::Assert,
    prelude::{CommandCargoExt, OutputAssertExt},
};
use tempfile::NamedTempFile;

const FACTORIAL: &str = "
func mul(a, b) { r := 0; while b > 0 r := r + a; b := b - 1 end; return r };
func fact(n) { r := 1; if n > 1 r := mul(n, fact(n - 1)) end; return r };
func main() { x := fact(5); return x }
";

fn source_file(source: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(source.as_bytes()).unwrap();
    file
}

fn imp(args: &[&str], source: &str) -> Assert {
    let file = source_file(source);
    Command::cargo_bin(env!("CARGO_PKG_NAME"))
        .unwrap()
        .args(args)
        .arg(file.path())
        .assert()
}

#[test]
fn cli_run_prints_main_bindings() {
    imp(&["run"], FACTORIAL)
        .stdout("x: 120\n")
        .success();
}

#[test]
fn cli_exec_runs_a_script() {
    imp(&["exec"], "a := 2; b := a + 3")
        .stdout("a: 2\nb: 5\n")
        .success();
}

#[test]
fn cli_types_prints_signatures() {
    let assert = imp(&["types"], FACTORIAL).success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("mul : Int -> Int -> Int\n"), "{}", stdout);
    assert!(stdout.contains("fact : Int -> Int\n"), "{}", stdout);
    assert!(stdout.contains("main : Int\n"), "{}", stdout);
    assert!(stdout.contains("  x::main : Int\n"), "{}", stdout);
}

#[test]
fn cli_fmt_prints_canonical_layout() {
    imp(&["fmt"], "func main(){x:=1;return x}")
        .stdout("func main() {\n  x := 1;\n  return x\n}\n")
        .success();
}

#[test]
fn cli_call_depth_is_configurable() {
    let source = "func down(n) { r := 0; if n > 0 r := down(n - 1) end; return r };
                  func main() { x := down(20); return x }";
    imp(&["run"], source).stdout("x: 0\n").success();
    imp(&["run", "--max-call-depth", "5"], source).failure();
}

#[test]
fn cli_reports_parse_errors() {
    imp(&["run"], "func main() { return }").failure();
}

#[test]
fn cli_reports_type_errors() {
    imp(&["types"], "func main() { x := 1; x := true; return x }").failure();
}

#[test]
fn cli_missing_file_fails() {
    Command::cargo_bin(env!("CARGO_PKG_NAME"))
        .unwrap()
        .args(["run", "does/not/exist.imp"])
        .assert()
        .failure();
}

#[test]
fn cli_run_without_bindings_prints_nothing() {
    imp(&["run"], "func main() { return 42 }").stdout("").success();
}
