//! Evaluation context: the mutable state one script run threads through every node.

use tracing::info;

use crate::runner::ds::error::ScriptError;
use crate::runner::ds::governor::{Governor, GovernorLimits};
use crate::runner::ds::scope::ScopeStack;
use crate::runner::ds::value::Value;
use crate::runner::std_lib;

use super::types::ValueResult;

pub struct EvalContext {
    pub scopes: ScopeStack,
    pub governor: Governor,
    source_name: String,
    /// Lines written by `print`.
    output: Vec<String>,
    /// Also write printed lines to stdout.
    echo: bool,
}

impl EvalContext {
    /// A context with default limits and the core natives installed.
    pub fn new() -> Self {
        Self::with_limits(GovernorLimits::default())
    }

    pub fn with_limits(limits: GovernorLimits) -> Self {
        let mut ctx = EvalContext {
            scopes: ScopeStack::new(),
            governor: Governor::new(limits),
            source_name: String::from("<script>"),
            output: Vec::new(),
            echo: false,
        };
        std_lib::core::install_core_natives(&mut ctx);
        ctx
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn set_source_name(&mut self, name: impl Into<String>) {
        self.source_name = name.into();
    }

    pub fn set_echo(&mut self, echo: bool) {
        self.echo = echo;
    }

    /// Look a name up through the visible frames.
    pub fn get_binding(&self, name: &str) -> ValueResult {
        self.scopes
            .get(name)
            .cloned()
            .ok_or_else(|| ScriptError::reference_error(format!("{} is not defined", name)))
    }

    /// Assign to the nearest visible binding, defining it in the innermost frame if absent.
    pub fn set_binding(&mut self, name: &str, value: Value) {
        self.scopes.set_value(name, value, false);
    }

    /// Define a fresh binding in the innermost frame.
    pub fn declare(&mut self, name: &str, value: Value) {
        self.scopes.set_value(name, value, true);
    }

    /// Echoed lines go straight to stdout; otherwise they are kept until
    /// [`take_output`](Self::take_output) drains them.
    pub fn emit(&mut self, line: String) {
        if self.echo {
            println!("{}", line);
            return;
        }
        info!(target: "weft::print", "{}", line);
        self.output.push(line);
    }

    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }
}

impl Default for EvalContext {
    fn default() -> Self {
        Self::new()
    }
}
