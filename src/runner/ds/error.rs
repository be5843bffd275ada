//! Script faults.
//!
//! A fault carries an [`ErrorKind`]; the kind alone decides whether a `try/catch` may
//! intercept it. Governor and explicit-fail faults always bypass recovery.

use std::fmt;

use thiserror::Error;

use crate::parser::error::ParseError;
use crate::runner::plugin::registry::RegistryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed registration or engine setup.
    Configuration,
    /// Unparsable input.
    Syntax,
    /// A construct used outside its required context.
    Structural,
    /// A runtime bound (iterations, call depth, string length) was exceeded.
    Governor,
    /// Deliberate abort requested by the script.
    ExplicitFail,
    /// Ordinary fault: script-raised, missing member, bad conversion, ...
    Runtime,
}

impl ErrorKind {
    pub fn bypasses_catch(self) -> bool {
        matches!(self, ErrorKind::Governor | ErrorKind::ExplicitFail)
    }

    pub fn is_recoverable(self) -> bool {
        self == ErrorKind::Runtime
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Syntax => "syntax",
            ErrorKind::Structural => "structural",
            ErrorKind::Governor => "limit",
            ErrorKind::ExplicitFail => "fail",
            ErrorKind::Runtime => "runtime",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{name}: {message}")]
pub struct ScriptError {
    pub kind: ErrorKind,
    pub name: String,
    pub message: String,
    pub source_name: String,
    /// 0 until the evaluator attributes the fault to a statement.
    pub line: usize,
    pub trace: Vec<String>,
}

impl ScriptError {
    pub fn new(kind: ErrorKind, name: impl Into<String>, message: impl Into<String>) -> Self {
        ScriptError {
            kind,
            name: name.into(),
            message: message.into(),
            source_name: String::new(),
            line: 0,
            trace: vec![],
        }
    }

    pub fn runtime(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Runtime, name, message)
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::runtime("TypeError", message)
    }

    pub fn reference_error(message: impl Into<String>) -> Self {
        Self::runtime("ReferenceError", message)
    }

    pub fn range_error(message: impl Into<String>) -> Self {
        Self::runtime("RangeError", message)
    }

    pub fn governor(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Governor, "LimitExceeded", message)
    }

    pub fn explicit_fail(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExplicitFail, "Failure", message)
    }

    pub fn structural(message: impl Into<String>, line: usize) -> Self {
        Self::new(ErrorKind::Structural, "StructureError", message).at_line(line)
    }

    /// Attribute the fault to `line` unless a deeper statement already did.
    pub fn at_line(mut self, line: usize) -> Self {
        if self.line == 0 {
            self.line = line;
        }
        self
    }

    pub fn in_source(mut self, source_name: &str) -> Self {
        if self.source_name.is_empty() {
            self.source_name = source_name.to_string();
        }
        self
    }

    pub fn with_frame(mut self, frame: String) -> Self {
        self.trace.push(frame);
        self
    }

    pub fn is_recoverable(&self) -> bool {
        self.kind.is_recoverable()
    }
}

impl From<ParseError> for ScriptError {
    fn from(e: ParseError) -> Self {
        let line = e.line();
        let (kind, name) = if e.is_structural() {
            (ErrorKind::Structural, "StructureError")
        } else {
            (ErrorKind::Syntax, "SyntaxError")
        };
        let message = match e {
            ParseError::Lex { message, .. }
            | ParseError::Invalid { message, .. }
            | ParseError::Structural { message, .. } => message,
            ParseError::Unexpected {
                found, expected, ..
            } => format!("unexpected {}, expected {}", found, expected),
        };
        ScriptError::new(kind, name, message).at_line(line)
    }
}

impl From<RegistryError> for ScriptError {
    fn from(e: RegistryError) -> Self {
        ScriptError::new(ErrorKind::Configuration, "ConfigurationError", e.to_string())
    }
}

/// The structured value a catch block receives.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorValue {
    pub name: String,
    pub message: String,
    pub source_name: String,
    pub line: usize,
    pub trace: Vec<String>,
}

impl ErrorValue {
    /// Re-raise as a recoverable fault (`throw e;` inside a catch block).
    pub fn to_error(&self) -> ScriptError {
        ScriptError {
            kind: ErrorKind::Runtime,
            name: self.name.clone(),
            message: self.message.clone(),
            source_name: self.source_name.clone(),
            line: self.line,
            trace: self.trace.clone(),
        }
    }
}

impl From<&ScriptError> for ErrorValue {
    fn from(e: &ScriptError) -> Self {
        ErrorValue {
            name: e.name.clone(),
            message: e.message.clone(),
            source_name: e.source_name.clone(),
            line: e.line,
            trace: e.trace.clone(),
        }
    }
}

impl fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}
