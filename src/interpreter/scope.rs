use std::collections::HashMap;

use crate::ast::{FunctionDef, Program};
use crate::error::SemanticError;

use super::value::Value;

/// Bindings of one active call, kept in the order they were first assigned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    bindings: Vec<(String, Value)>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.bindings
            .iter()
            .find(|(bound, _)| bound == name)
            .map(|(_, value)| *value)
    }

    /// Overwrite an existing binding in place, or append a new one
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.bindings.iter_mut().find(|(bound, _)| *bound == name) {
            Some((_, slot)) => *slot = value,
            None => self.bindings.push((name, value)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Value)> {
        self.bindings.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn into_bindings(self) -> Vec<(String, Value)> {
        self.bindings
    }
}

/// The frames of all active calls plus the function table they call into.
///
/// Only the innermost frame is ever read or written; callers' frames are
/// untouched until the callee returns.
pub struct CallStack<'a> {
    functions: HashMap<&'a str, &'a FunctionDef>,
    frames: Vec<Frame>,
    max_depth: usize,
}

impl<'a> CallStack<'a> {
    /// Create a call stack with one empty frame and every function of
    /// `program` pre-loaded. Later definitions of a name replace earlier ones.
    pub fn new(program: &'a Program, max_depth: usize) -> Self {
        Self {
            functions: program
                .functions
                .iter()
                .map(|func| (func.name.as_str(), func))
                .collect(),
            frames: vec![Frame::new()],
            max_depth,
        }
    }

    /// A call stack without functions, for running bare statement blocks
    pub fn detached(max_depth: usize) -> Self {
        Self {
            functions: HashMap::new(),
            frames: vec![Frame::new()],
            max_depth,
        }
    }

    pub fn function(&self, name: &str) -> Result<&'a FunctionDef, SemanticError> {
        self.functions
            .get(name)
            .copied()
            .ok_or_else(|| SemanticError::unknown_function(name))
    }

    /// Enter a new frame for a call to `function`
    pub fn enter(&mut self, function: &str, frame: Frame) -> Result<(), SemanticError> {
        if self.frames.len() > self.max_depth {
            return Err(SemanticError::CallDepthExceeded {
                function: function.to_string(),
                limit: self.max_depth,
            });
        }
        self.frames.push(frame);
        Ok(())
    }

    /// Leave the current frame, handing it back to the caller
    pub fn leave(&mut self) -> Frame {
        // The bottom frame is never popped, so the stack is never empty.
        if self.frames.len() > 1 {
            self.frames.pop().unwrap_or_default()
        } else {
            std::mem::take(&mut self.frames[0])
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Resolve a name in the current frame. Undeclared names read as `0`.
    pub fn resolve(&self, name: &str) -> Value {
        self.current().get(name).unwrap_or_default()
    }

    /// Add a binding to the current (innermost) frame
    pub fn add(&mut self, name: impl Into<String>, value: Value) {
        self.current_mut().set(name, value);
    }

    pub fn current(&self) -> &Frame {
        &self.frames[self.frames.len() - 1]
    }

    fn current_mut(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_keeps_insertion_order() {
        let mut frame = Frame::new();
        frame.set("b", Value::Int(1));
        frame.set("a", Value::Int(2));
        frame.set("b", Value::Int(3));

        let bindings: Vec<_> = frame.iter().collect();
        assert_eq!(bindings, vec![("b", Value::Int(3)), ("a", Value::Int(2))]);
    }

    #[test]
    fn test_resolve_does_not_bind() {
        let stack = CallStack::detached(8);
        assert_eq!(stack.resolve("missing"), Value::Int(0));
        assert!(stack.current().is_empty());
    }

    #[test]
    fn test_only_top_frame_is_visible() {
        let mut stack = CallStack::detached(8);
        stack.add("x", Value::Int(1));
        stack.enter("f", Frame::new()).unwrap();
        assert_eq!(stack.resolve("x"), Value::Int(0));
        stack.add("x", Value::Int(9));
        stack.leave();
        assert_eq!(stack.resolve("x"), Value::Int(1));
    }

    #[test]
    fn test_depth_limit() {
        let mut stack = CallStack::detached(2);
        stack.enter("f", Frame::new()).unwrap();
        stack.enter("f", Frame::new()).unwrap();
        let err = stack.enter("f", Frame::new()).unwrap_err();
        assert!(matches!(err, SemanticError::CallDepthExceeded { limit: 2, .. }));
    }
}
