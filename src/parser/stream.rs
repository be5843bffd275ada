use super::error::{ParseError, ParseResult};
use super::token::{SourcePos, Token, TokenKind};

/// Cursor over a pre-lexed token list with arbitrary lookahead.
pub struct TokenStream {
    tokens: Vec<Token>,
    index: usize,
    eof: Token,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        let eof_pos = tokens
            .last()
            .map(|t| SourcePos::new(t.pos.line, t.pos.column + t.text.len(), t.pos.offset))
            .unwrap_or_else(|| SourcePos::new(1, 1, 0));
        TokenStream {
            tokens,
            index: 0,
            eof: Token::eof(eof_pos),
        }
    }

    pub fn current(&self) -> &Token {
        self.peek(0)
    }

    /// Token `n` positions ahead of the current one; end-of-input past the end.
    pub fn peek(&self, n: usize) -> &Token {
        self.tokens.get(self.index + n).unwrap_or(&self.eof)
    }

    pub fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.index < self.tokens.len() {
            self.index += 1;
        }
        token
    }

    pub fn at_end(&self) -> bool {
        self.index >= self.tokens.len()
    }

    pub fn check(&self, text: &str) -> bool {
        self.current().is(text)
    }

    /// Consume the current token if it is spelled `text`.
    pub fn eat(&mut self, text: &str) -> bool {
        if self.check(text) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, text: &str) -> ParseResult<Token> {
        if self.check(text) {
            Ok(self.advance())
        } else {
            let found = self.current();
            Err(ParseError::unexpected(
                found,
                format!("'{}'", text),
                found.line(),
            ))
        }
    }

    pub fn expect_identifier(&mut self) -> ParseResult<Token> {
        if self.current().kind == TokenKind::Identifier {
            Ok(self.advance())
        } else {
            let found = self.current();
            Err(ParseError::unexpected(found, "an identifier", found.line()))
        }
    }

    pub fn position(&self) -> usize {
        self.index
    }

    pub fn reset(&mut self, position: usize) {
        self.index = position.min(self.tokens.len());
    }
}
