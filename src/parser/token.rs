use std::fmt;
use std::fmt::{Display, Formatter};

/// Structural kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    Keyword,
    Symbol,
    Number,
    String,
    Date,
    Eof,
}

impl TokenKind {
    /// Kinds whose text can be looked up literally in the plugin registry.
    pub fn has_literal_text(&self) -> bool {
        matches!(
            self,
            TokenKind::Identifier | TokenKind::Keyword | TokenKind::Symbol
        )
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Identifier => "identifier",
            TokenKind::Keyword => "keyword",
            TokenKind::Symbol => "symbol",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Date => "date",
            TokenKind::Eof => "end of input",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourcePos {
    /// 1-based line.
    pub line: usize,
    /// 1-based column.
    pub column: usize,
    /// Byte offset into the source.
    pub offset: usize,
}

impl SourcePos {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        SourcePos {
            line,
            column,
            offset,
        }
    }
}

/// A lexed token. Strings carry their unescaped content, dates their `YYYY-MM-DD` text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub pos: SourcePos,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, pos: SourcePos) -> Self {
        Token {
            kind,
            text: text.into(),
            pos,
        }
    }

    pub fn eof(pos: SourcePos) -> Self {
        Token::new(TokenKind::Eof, "", pos)
    }

    /// True when this is an identifier, keyword or symbol spelled `text`.
    pub fn is(&self, text: &str) -> bool {
        self.kind.has_literal_text() && self.text == text
    }

    pub fn is_identifier(&self) -> bool {
        self.kind == TokenKind::Identifier
    }

    pub fn line(&self) -> usize {
        self.pos.line
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "end of input"),
            TokenKind::String => write!(f, "\"{}\"", self.text),
            TokenKind::Date => write!(f, "#{}#", self.text),
            _ => write!(f, "{}", self.text),
        }
    }
}
