//! Token-level extensions: word operators and the extension keywords.

use crate::parser::token::{Token, TokenKind};
use crate::runner::plugin::types::{LexicalPlugin, PluginInfo, TokenPlugin, Trigger};

/// `and` → `&&`, `or` → `||`, `is not` → `!=`, `is` → `==`.
pub struct WordOperators {
    info: PluginInfo,
}

impl WordOperators {
    pub fn new() -> Self {
        WordOperators {
            info: PluginInfo::new("word-operators")
                .keyword("and")
                .keyword("or")
                .keyword("is")
                .grammar("and | or | is | is not")
                .example("if (status is not \"closed\" and total > 0) notify();"),
        }
    }
}

impl LexicalPlugin for WordOperators {
    fn combine(&self, tokens: &[Token]) -> Option<(Token, usize)> {
        let first = tokens.first()?;
        if first.kind != TokenKind::Identifier {
            return None;
        }
        let symbol = |text: &str| Token::new(TokenKind::Symbol, text, first.pos);
        match first.text.as_str() {
            "and" => Some((symbol("&&"), 1)),
            "or" => Some((symbol("||"), 1)),
            "is" if tokens.get(1).map_or(false, |t| t.is("not")) => Some((symbol("!="), 2)),
            "is" => Some((symbol("=="), 1)),
            _ => None,
        }
    }
}

/// Reserves `fail` and `unless`.
pub struct ExtensionKeywords {
    info: PluginInfo,
}

pub const EXTENSION_KEYWORDS: &[&str] = &["fail", "unless"];

impl ExtensionKeywords {
    pub fn new() -> Self {
        let info = EXTENSION_KEYWORDS.iter().fold(
            PluginInfo::new("extension-keywords").grammar(EXTENSION_KEYWORDS.join(" ")),
            |info, keyword| info.trigger(Trigger::text(*keyword)),
        );
        ExtensionKeywords { info }
    }
}

impl TokenPlugin for ExtensionKeywords {
    fn classify(&self, _token: &Token) -> Option<TokenKind> {
        Some(TokenKind::Keyword)
    }
}

grammar_plugin!(WordOperators, ExtensionKeywords);
