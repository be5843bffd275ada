use thiserror::Error;

/// Failure while turning source into a syntax tree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("line {line}: {message}")]
    Lex { message: String, line: usize },

    #[error("line {line}: unexpected {found}, expected {expected}")]
    Unexpected {
        found: String,
        expected: String,
        line: usize,
    },

    #[error("line {line}: {message}")]
    Invalid { message: String, line: usize },

    /// A construct used outside the context it requires (`break` outside a loop, ...).
    #[error("line {line}: {message}")]
    Structural { message: String, line: usize },
}

impl ParseError {
    pub fn unexpected(found: impl ToString, expected: impl Into<String>, line: usize) -> Self {
        ParseError::Unexpected {
            found: found.to_string(),
            expected: expected.into(),
            line,
        }
    }

    pub fn invalid(message: impl Into<String>, line: usize) -> Self {
        ParseError::Invalid {
            message: message.into(),
            line,
        }
    }

    pub fn structural(message: impl Into<String>, line: usize) -> Self {
        ParseError::Structural {
            message: message.into(),
            line,
        }
    }

    pub fn line(&self) -> usize {
        match self {
            ParseError::Lex { line, .. }
            | ParseError::Unexpected { line, .. }
            | ParseError::Invalid { line, .. }
            | ParseError::Structural { line, .. } => *line,
        }
    }

    pub fn is_structural(&self) -> bool {
        matches!(self, ParseError::Structural { .. })
    }
}

pub type ParseResult<T> = Result<T, ParseError>;
