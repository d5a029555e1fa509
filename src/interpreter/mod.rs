//! Tree-walking interpreter for IMP.
//!
//! Each call gets a fresh [`Frame`] on an explicit [`CallStack`]; expressions
//! only ever see the innermost frame. A run produces an [`Execution`]: the
//! bindings `main` left behind, in the order they were first assigned, and
//! the value it returned.
//!
//! Evaluation recurses on the native stack, so every run gets its own thread
//! with a stack sized for [`Config::max_call_depth`] nested calls.

mod eval;
mod scope;
mod value;

pub use scope::{CallStack, Frame};
pub use value::Value;

use std::fmt;
use std::panic;
use std::thread;

use crate::ast::statement::Statement;
use crate::ast::{Program, ENTRY_POINT};
use crate::error::SemanticError;

/// Interpreter settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Number of nested calls allowed before a run is aborted
    pub max_call_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_call_depth: 1000,
        }
    }
}

/// Native stack reserved per nested IMP call
const STACK_PER_CALL: usize = 64 * 1024;
/// Native stack reserved for everything outside the calls
const BASE_STACK: usize = 1024 * 1024;

/// Observable result of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    pub bindings: Vec<(String, Value)>,
    /// `None` for scripts, which have no return expression
    pub return_value: Option<Value>,
}

impl Execution {
    pub fn get(&self, name: &str) -> Option<Value> {
        self.bindings
            .iter()
            .find(|(bound, _)| bound == name)
            .map(|(_, value)| *value)
    }
}

/// One `name: value` line per binding. The return value is not printed.
impl fmt::Display for Execution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.bindings {
            writeln!(f, "{}: {}", name, value)?;
        }
        Ok(())
    }
}

pub struct Interpreter {
    config: Config,
}

impl Interpreter {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run `main`. Its body executes in the bottom frame of the stack, which
    /// becomes the reported bindings.
    pub fn run(&self, program: &Program) -> Result<Execution, SemanticError> {
        let max_depth = self.config.max_call_depth;
        self.on_eval_thread(move || {
            let mut stack = CallStack::new(program, max_depth);
            let main = stack.function(ENTRY_POINT)?;
            log::debug!(
                "running {} with {} function(s) defined",
                ENTRY_POINT,
                program.functions.len()
            );

            let return_value = main.run(&mut stack)?;
            Ok(Execution {
                bindings: stack.leave().into_bindings(),
                return_value: Some(return_value),
            })
        })
    }

    /// Run a bare statement block in a single frame
    pub fn run_script(&self, script: &Statement) -> Result<Execution, SemanticError> {
        let max_depth = self.config.max_call_depth;
        self.on_eval_thread(move || {
            let mut stack = CallStack::detached(max_depth);
            script.exec(&mut stack)?;
            Ok(Execution {
                bindings: stack.leave().into_bindings(),
                return_value: None,
            })
        })
    }

    fn stack_size(&self) -> usize {
        self.config
            .max_call_depth
            .saturating_mul(STACK_PER_CALL)
            .saturating_add(BASE_STACK)
    }

    fn on_eval_thread<F>(&self, work: F) -> Result<Execution, SemanticError>
    where
        F: FnOnce() -> Result<Execution, SemanticError> + Send,
    {
        let stack_size = self.stack_size();
        log::trace!("evaluating on a {} byte stack", stack_size);
        thread::scope(|scope| {
            let handle = thread::Builder::new()
                .name("imp-eval".to_string())
                .stack_size(stack_size)
                .spawn_scoped(scope, work)
                .map_err(|err| SemanticError::EvaluatorUnavailable {
                    reason: err.to_string(),
                })?;
            handle
                .join()
                .unwrap_or_else(|payload| panic::resume_unwind(payload))
        })
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// Run a program's `main` with the default configuration
pub fn run(program: &Program) -> Result<Execution, SemanticError> {
    Interpreter::default().run(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::{parse, parse_expression, parse_script};

    fn run_source(source: &str) -> Result<Execution, SemanticError> {
        run(&parse(tokenize(source).unwrap()).unwrap())
    }

    fn eval(source: &str) -> Value {
        let expr = parse_expression(tokenize(source).unwrap()).unwrap();
        let program = Program { functions: vec![] };
        expr.eval(&mut CallStack::new(&program, 16)).unwrap()
    }

    #[test]
    fn test_subtraction_is_left_associative() {
        assert_eq!(eval("1 - 2 - 3"), Value::Int(-4));
    }

    #[test]
    fn test_logic_evaluates_truthiness() {
        assert_eq!(eval("!(1 < 2) || 3 >= 3"), Value::Bool(true));
        assert_eq!(eval("true && undefined"), Value::Bool(false));
    }

    #[test]
    fn test_arithmetic_wraps() {
        assert_eq!(eval("9223372036854775807 + 1"), Value::Int(i64::MIN));
    }

    #[test]
    fn test_main_bindings_in_assignment_order() {
        let execution = run_source("func main() { b := 1; a := 2; b := 3; return a + b }").unwrap();
        assert_eq!(
            execution.bindings,
            vec![("b".to_string(), Value::Int(3)), ("a".to_string(), Value::Int(2))]
        );
        assert_eq!(execution.return_value, Some(Value::Int(5)));
        assert_eq!(execution.to_string(), "b: 3\na: 2\n");
    }

    #[test]
    fn test_missing_main() {
        let err = run_source("func f() { return 1 }").unwrap_err();
        assert_eq!(err, SemanticError::unknown_function("main"));
    }

    #[test]
    fn test_script_runs_in_one_frame() {
        let script = parse_script(tokenize("i := 0; while i < 3 i := i + 1 end").unwrap()).unwrap();
        let execution = Interpreter::default().run_script(&script).unwrap();
        assert_eq!(execution.get("i"), Some(Value::Int(3)));
        assert_eq!(execution.return_value, None);
    }

    #[test]
    fn test_boolean_arithmetic_is_rejected() {
        // The grammar never puts a boolean under `+`, but a variable can hold one.
        let err = run_source("func main() { b := true; x := b + 1; return x }").unwrap_err();
        assert_eq!(
            err,
            SemanticError::OperandMismatch {
                operator: "+",
                left: "Bool true".to_string(),
                right: "Int 1".to_string(),
            }
        );
    }

    #[test]
    fn test_stack_grows_with_call_depth() {
        let shallow = Interpreter::new(Config { max_call_depth: 10 });
        let deep = Interpreter::new(Config {
            max_call_depth: 10_000,
        });
        assert!(deep.stack_size() > shallow.stack_size());
        assert_eq!(
            Interpreter::new(Config {
                max_call_depth: usize::MAX
            })
            .stack_size(),
            usize::MAX
        );
    }
}
