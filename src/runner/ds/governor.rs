//! Runtime bounds. Exceeding any of them raises a [`ErrorKind::Governor`] fault that no
//! `try/catch` intercepts.
//!
//! [`ErrorKind::Governor`]: super::error::ErrorKind::Governor

use serde::Deserialize;
use tracing::warn;

use super::error::ScriptError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GovernorLimits {
    /// Loop iterations across the whole run.
    pub max_iterations: u64,
    pub max_call_depth: usize,
    /// Longest string a concatenation may produce, in bytes.
    pub max_string_length: usize,
}

impl Default for GovernorLimits {
    fn default() -> Self {
        GovernorLimits {
            max_iterations: 1_000_000,
            max_call_depth: 256,
            max_string_length: 1 << 20,
        }
    }
}

#[derive(Debug)]
pub struct Governor {
    limits: GovernorLimits,
    iterations: u64,
    call_depth: usize,
}

impl Governor {
    pub fn new(limits: GovernorLimits) -> Self {
        Governor {
            limits,
            iterations: 0,
            call_depth: 0,
        }
    }

    pub fn limits(&self) -> &GovernorLimits {
        &self.limits
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn call_depth(&self) -> usize {
        self.call_depth
    }

    /// Count one loop iteration.
    pub fn tick(&mut self, line: usize) -> Result<(), ScriptError> {
        self.iterations += 1;
        if self.iterations > self.limits.max_iterations {
            warn!(line, limit = self.limits.max_iterations, "iteration limit exceeded");
            return Err(ScriptError::governor(format!(
                "iteration limit of {} exceeded",
                self.limits.max_iterations
            ))
            .at_line(line));
        }
        Ok(())
    }

    pub fn enter_call(&mut self, line: usize) -> Result<(), ScriptError> {
        if self.call_depth >= self.limits.max_call_depth {
            warn!(line, limit = self.limits.max_call_depth, "call depth limit exceeded");
            return Err(ScriptError::governor(format!(
                "call depth limit of {} exceeded",
                self.limits.max_call_depth
            ))
            .at_line(line));
        }
        self.call_depth += 1;
        Ok(())
    }

    pub fn exit_call(&mut self) {
        self.call_depth = self.call_depth.saturating_sub(1);
    }

    pub fn check_string(&self, len: usize) -> Result<(), ScriptError> {
        if len > self.limits.max_string_length {
            return Err(ScriptError::governor(format!(
                "string length {} exceeds limit of {}",
                len, self.limits.max_string_length
            )));
        }
        Ok(())
    }

    /// Start a fresh run with the same limits.
    pub fn reset(&mut self) {
        self.iterations = 0;
        self.call_depth = 0;
    }
}

impl Default for Governor {
    fn default() -> Self {
        Governor::new(GovernorLimits::default())
    }
}
