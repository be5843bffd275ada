//! Core types for the evaluation engine.

use crate::parser::ast::NodeId;
use crate::runner::ds::error::ScriptError;
use crate::runner::ds::value::Value;

/// Completion value of a function activation.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub value: Value,
    /// False for a bare `return;` or a body that ran off its end.
    pub has_value: bool,
}

impl Completion {
    pub fn empty() -> Self {
        Completion {
            value: Value::Null,
            has_value: false,
        }
    }

    pub fn with_value(value: Value) -> Self {
        Completion {
            value,
            has_value: true,
        }
    }
}

/// Outcome of executing a statement.
///
/// Break, continue and return name the node they were resolved to at parse time; the loop or
/// function activation owning that node consumes the signal.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    /// Execution continues. Carries the value of the last expression statement.
    Normal(Value),
    Break(NodeId),
    Continue(NodeId),
    Return(NodeId, Completion),
}

impl Flow {
    pub fn normal() -> Self {
        Flow::Normal(Value::Null)
    }

    pub fn is_normal(&self) -> bool {
        matches!(self, Flow::Normal(_))
    }
}

/// Per-activation loop flags, updated after every body statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopState {
    pub keep_running: bool,
    pub break_requested: bool,
    pub continue_requested: bool,
}

impl LoopState {
    pub fn new() -> Self {
        LoopState {
            keep_running: true,
            break_requested: false,
            continue_requested: false,
        }
    }

    pub fn begin_iteration(&mut self) {
        self.continue_requested = false;
    }

    /// Fold the body's flow into the flags. Returns the flow when it belongs to an outer
    /// construct and must leave the loop.
    pub fn observe(&mut self, loop_node: NodeId, flow: Flow) -> Option<Flow> {
        match flow {
            Flow::Normal(_) => None,
            Flow::Break(target) if target == loop_node => {
                self.break_requested = true;
                self.keep_running = false;
                None
            }
            Flow::Continue(target) if target == loop_node => {
                self.continue_requested = true;
                None
            }
            other => {
                self.keep_running = false;
                Some(other)
            }
        }
    }
}

impl Default for LoopState {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of executing a statement.
pub type EvalResult = Result<Flow, ScriptError>;

/// Result of evaluating an expression.
pub type ValueResult = Result<Value, ScriptError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::{NodeKind, SyntaxTree};

    #[test]
    fn test_loop_state_consumes_own_signals() {
        let mut tree = SyntaxTree::new("test");
        let own = tree.add(NodeKind::Empty, 1);
        let function = tree.add(NodeKind::Empty, 1);

        let mut state = LoopState::new();
        assert_eq!(state.observe(own, Flow::Continue(own)), None);
        assert!(state.continue_requested);
        assert!(state.keep_running);

        state.begin_iteration();
        assert!(!state.continue_requested);

        assert_eq!(state.observe(own, Flow::Break(own)), None);
        assert!(state.break_requested);
        assert!(!state.keep_running);

        let mut state = LoopState::new();
        let ret = Flow::Return(function, Completion::with_value(Value::Number(5.0)));
        assert_eq!(state.observe(own, ret.clone()), Some(ret));
        assert!(!state.keep_running);
    }
}
