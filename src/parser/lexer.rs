//! Raw source → token list.
//!
//! The grammar only knows structural token shapes. Keywords, word operators and other
//! spellings are layered on afterwards by lexical and token plugins from the registry.

use pest::error::{Error, LineColLocation};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use super::error::ParseError;
use super::token::{SourcePos, Token, TokenKind};

#[derive(Parser)]
#[grammar = "parser/lexer.pest"] // relative to src
struct TokenGrammar;

/// Tokenize `source`. The returned list does not contain an end-of-input token;
/// [`TokenStream`](super::stream::TokenStream) synthesizes one.
pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut pairs = TokenGrammar::parse(Rule::tokens, source).map_err(lex_error)?;
    let mut tokens = vec![];
    let root = match pairs.next() {
        Some(root) => root,
        None => return Ok(tokens),
    };
    for pair in root.into_inner() {
        let pos = pos_of(&pair);
        let token = match pair.as_rule() {
            Rule::identifier => Token::new(TokenKind::Identifier, pair.as_str(), pos),
            Rule::symbol => Token::new(TokenKind::Symbol, pair.as_str(), pos),
            Rule::number => Token::new(TokenKind::Number, pair.as_str(), pos),
            Rule::string => {
                let body = pair.into_inner().next().map(|p| p.as_str()).unwrap_or("");
                Token::new(TokenKind::String, unescape(body), pos)
            }
            Rule::date => {
                let body = pair.into_inner().next().map(|p| p.as_str()).unwrap_or("");
                Token::new(TokenKind::Date, body, pos)
            }
            Rule::EOI => break,
            other => {
                return Err(ParseError::Lex {
                    message: format!("unexpected lexer rule {:?}", other),
                    line: pos.line,
                })
            }
        };
        tokens.push(token);
    }
    Ok(tokens)
}

fn pos_of(pair: &Pair<Rule>) -> SourcePos {
    let span = pair.as_span();
    let (line, column) = span.start_pos().line_col();
    SourcePos::new(line, column, span.start())
}

fn lex_error(e: Error<Rule>) -> ParseError {
    let (line, column) = match e.line_col {
        LineColLocation::Pos(lc) => lc,
        LineColLocation::Span(lc, _) => lc,
    };
    ParseError::Lex {
        message: format!("unrecognized input at column {}", column),
        line,
    }
}

fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
