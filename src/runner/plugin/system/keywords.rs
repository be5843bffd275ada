use crate::parser::token::{Token, TokenKind};
use crate::runner::plugin::types::{PluginInfo, TokenPlugin, Trigger, PRECEDENCE_HIGHEST};

/// Reserved words of the core grammar.
pub const KEYWORDS: &[&str] = &[
    "if", "else", "while", "for", "foreach", "in", "break", "continue", "return", "try", "catch",
    "throw", "var", "let", "function", "true", "false", "null", "not",
];

/// Reclassifies reserved identifiers as keywords so the identifier fallback never sees them.
pub struct KeywordClassifier {
    info: PluginInfo,
}

impl KeywordClassifier {
    pub fn new() -> Self {
        let info = KEYWORDS.iter().fold(
            PluginInfo::new("keywords")
                .system()
                .precedence(PRECEDENCE_HIGHEST)
                .grammar(KEYWORDS.join(" ")),
            |info, keyword| info.trigger(Trigger::text(*keyword)),
        );
        KeywordClassifier { info }
    }
}

grammar_plugin!(KeywordClassifier);

impl TokenPlugin for KeywordClassifier {
    fn classify(&self, _token: &Token) -> Option<TokenKind> {
        Some(TokenKind::Keyword)
    }
}
