//! Core types for the grammar plugin architecture.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use crate::parser::ast::NodeId;
use crate::parser::error::{ParseError, ParseResult};
use crate::parser::token::{Token, TokenKind};
use crate::parser::{BlockScope, Parser};

use super::registry::RegistryError;

/// Reserved precedence for high-priority unary forms.
pub const PRECEDENCE_HIGHEST: i32 = 0;
/// Precedence of ordinary plugins.
pub const PRECEDENCE_NORMAL: i32 = 100;
/// Reserved precedence for fallback forms tried after everything else.
pub const PRECEDENCE_FALLBACK: i32 = 10_000;

/// What makes the registry consider a plugin a candidate for a token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Trigger {
    /// Literal token text (`if`, `+`, `today`).
    Text(String),
    Identifier,
    Number,
    String,
    Date,
    /// Postfix position: after a complete operand.
    Suffix,
}

impl Trigger {
    pub fn text(text: impl Into<String>) -> Self {
        Trigger::Text(text.into())
    }

    /// The literal key for a token, valid for identifier, keyword and symbol tokens only.
    pub fn literal_for(token: &Token) -> Option<Trigger> {
        if token.kind.has_literal_text() {
            Some(Trigger::Text(token.text.clone()))
        } else {
            None
        }
    }

    /// The generic structural key derived from a token's kind.
    pub fn generic_for(token: &Token) -> Option<Trigger> {
        match token.kind {
            TokenKind::Identifier => Some(Trigger::Identifier),
            TokenKind::Number => Some(Trigger::Number),
            TokenKind::String => Some(Trigger::String),
            TokenKind::Date => Some(Trigger::Date),
            TokenKind::Keyword | TokenKind::Symbol | TokenKind::Eof => None,
        }
    }

    pub fn is_generic(&self) -> bool {
        !matches!(self, Trigger::Text(_))
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Text(t) => write!(f, "'{}'", t),
            Trigger::Identifier => write!(f, "generic-identifier"),
            Trigger::Number => write!(f, "generic-number"),
            Trigger::String => write!(f, "generic-string"),
            Trigger::Date => write!(f, "generic-date"),
            Trigger::Suffix => write!(f, "suffix"),
        }
    }
}

/// Registry partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PluginCategory {
    Lexical,
    Token,
    Expression,
    Postfix,
    SystemStatement,
    ExtensionStatement,
}

impl PluginCategory {
    pub const ALL: [PluginCategory; 6] = [
        PluginCategory::Lexical,
        PluginCategory::Token,
        PluginCategory::Expression,
        PluginCategory::Postfix,
        PluginCategory::SystemStatement,
        PluginCategory::ExtensionStatement,
    ];

    pub fn key(self) -> &'static str {
        match self {
            PluginCategory::Lexical => "lexical",
            PluginCategory::Token => "token",
            PluginCategory::Expression => "expression",
            PluginCategory::Postfix => "postfix",
            PluginCategory::SystemStatement => "system-statement",
            PluginCategory::ExtensionStatement => "extension-statement",
        }
    }
}

impl fmt::Display for PluginCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Symbolic plugin-type keys accepted by
/// [`register_custom_by_type`](super::registry::PluginRegistry::register_custom_by_type).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginType {
    Lexical,
    Token,
    Expression,
    Postfix,
    Statement,
}

impl PluginType {
    pub fn matches(self, category: PluginCategory) -> bool {
        match self {
            PluginType::Lexical => category == PluginCategory::Lexical,
            PluginType::Token => category == PluginCategory::Token,
            PluginType::Expression => category == PluginCategory::Expression,
            PluginType::Postfix => category == PluginCategory::Postfix,
            PluginType::Statement => matches!(
                category,
                PluginCategory::SystemStatement | PluginCategory::ExtensionStatement
            ),
        }
    }
}

impl FromStr for PluginType {
    type Err = RegistryError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        match key {
            "lexical" => Ok(PluginType::Lexical),
            "token" => Ok(PluginType::Token),
            "expression" => Ok(PluginType::Expression),
            "postfix" => Ok(PluginType::Postfix),
            "statement" => Ok(PluginType::Statement),
            other => Err(RegistryError::UnknownPluginType(other.to_string())),
        }
    }
}

/// Registration and documentation metadata shared by every plugin contract.
#[derive(Debug, Clone)]
pub struct PluginInfo {
    pub name: String,
    pub precedence: i32,
    pub triggers: Vec<Trigger>,
    pub is_system: bool,
    pub is_statement: bool,
    pub requires_terminator: bool,
    pub supports_assignment: bool,
    pub grammar: String,
    pub examples: Vec<String>,
}

impl PluginInfo {
    pub fn new(name: impl Into<String>) -> Self {
        PluginInfo {
            name: name.into(),
            precedence: PRECEDENCE_NORMAL,
            triggers: Vec::new(),
            is_system: false,
            is_statement: false,
            requires_terminator: false,
            supports_assignment: false,
            grammar: String::new(),
            examples: Vec::new(),
        }
    }

    pub fn precedence(mut self, precedence: i32) -> Self {
        self.precedence = precedence;
        self
    }

    pub fn trigger(mut self, trigger: Trigger) -> Self {
        self.triggers.push(trigger);
        self
    }

    pub fn keyword(self, text: &str) -> Self {
        self.trigger(Trigger::text(text))
    }

    pub fn system(mut self) -> Self {
        self.is_system = true;
        self
    }

    pub fn statement(mut self) -> Self {
        self.is_statement = true;
        self
    }

    pub fn terminated(mut self) -> Self {
        self.requires_terminator = true;
        self
    }

    pub fn assignable(mut self) -> Self {
        self.supports_assignment = true;
        self
    }

    pub fn grammar(mut self, grammar: impl Into<String>) -> Self {
        self.grammar = grammar.into();
        self
    }

    pub fn example(mut self, example: impl Into<String>) -> Self {
        self.examples.push(example.into());
        self
    }

    pub fn is_postfix(&self) -> bool {
        self.triggers == [Trigger::Suffix]
    }
}

/// Resources a plugin holds for the session and releases at shutdown.
pub trait Disposable {
    fn dispose(&self) -> Result<(), String>;
}

/// Capabilities every plugin contract shares.
pub trait GrammarPlugin {
    fn info(&self) -> &PluginInfo;

    fn as_disposable(&self) -> Option<&dyn Disposable> {
        None
    }
}

/// Merges a run of tokens into one before parsing begins.
pub trait LexicalPlugin: GrammarPlugin {
    /// `tokens[0]` carries one of the plugin's trigger texts. Returns the merged token
    /// and how many input tokens it replaces.
    fn combine(&self, tokens: &[Token]) -> Option<(Token, usize)>;
}

/// Reclassifies a single token (e.g. identifier → keyword).
pub trait TokenPlugin: GrammarPlugin {
    fn classify(&self, token: &Token) -> Option<TokenKind>;
}

/// Prefix expressions, statements and postfix forms.
pub trait ExpressionPlugin: GrammarPlugin {
    /// Lookahead-based disambiguation; the parser is positioned on the trigger token.
    fn can_handle(&self, _parser: &Parser<'_>) -> bool {
        true
    }

    /// Consume the construct starting at the trigger and return its node.
    fn parse(&self, parser: &mut Parser<'_>) -> ParseResult<NodeId>;

    /// Postfix plugins: extend `left` with the construct starting at the current token.
    fn parse_suffix(&self, parser: &mut Parser<'_>, left: NodeId) -> ParseResult<NodeId> {
        let _ = left;
        let token = parser.current();
        Err(ParseError::invalid(
            format!("{} is not a postfix form", self.info().name),
            token.line(),
        ))
    }

    /// Postfix plugins: how tightly the form binds to its left operand.
    fn binding_power(&self, _token: &Token) -> u8 {
        0
    }

    /// Runs once, right after `parse` returns, with the completed node.
    fn after_parse(&self, _parser: &mut Parser<'_>, _node: NodeId) -> ParseResult<()> {
        Ok(())
    }

    /// Block-entry hook. The default opens a parse scope and a runtime-scoped block.
    fn parse_block(&self, parser: &mut Parser<'_>) -> ParseResult<NodeId> {
        parser.parse_block(BlockScope::Push)
    }

    /// A `{ ... }` block or a single statement, through this plugin's block hook.
    fn parse_body(&self, parser: &mut Parser<'_>) -> ParseResult<NodeId> {
        if parser.check("{") {
            self.parse_block(parser)
        } else {
            parser.parse_statement()
        }
    }
}

/// A registrable plugin, tagged by the contract it implements.
#[derive(Clone)]
pub enum Plugin {
    Lexical(Rc<dyn LexicalPlugin>),
    Token(Rc<dyn TokenPlugin>),
    Expression(Rc<dyn ExpressionPlugin>),
}

impl Plugin {
    pub fn lexical(plugin: impl LexicalPlugin + 'static) -> Self {
        Plugin::Lexical(Rc::new(plugin))
    }

    pub fn token(plugin: impl TokenPlugin + 'static) -> Self {
        Plugin::Token(Rc::new(plugin))
    }

    pub fn expression(plugin: impl ExpressionPlugin + 'static) -> Self {
        Plugin::Expression(Rc::new(plugin))
    }

    pub fn info(&self) -> &PluginInfo {
        match self {
            Plugin::Lexical(p) => p.info(),
            Plugin::Token(p) => p.info(),
            Plugin::Expression(p) => p.info(),
        }
    }

    pub fn as_disposable(&self) -> Option<&dyn Disposable> {
        match self {
            Plugin::Lexical(p) => p.as_disposable(),
            Plugin::Token(p) => p.as_disposable(),
            Plugin::Expression(p) => p.as_disposable(),
        }
    }

    /// The registry partition the plugin lands in as a statement or prefix form.
    pub fn category(&self) -> PluginCategory {
        match self {
            Plugin::Lexical(_) => PluginCategory::Lexical,
            Plugin::Token(_) => PluginCategory::Token,
            Plugin::Expression(p) => {
                let info = p.info();
                if info.is_postfix() {
                    PluginCategory::Postfix
                } else if info.is_statement && info.is_system {
                    PluginCategory::SystemStatement
                } else if info.is_statement {
                    PluginCategory::ExtensionStatement
                } else {
                    PluginCategory::Expression
                }
            }
        }
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("name", &self.info().name)
            .field("category", &self.category())
            .field("precedence", &self.info().precedence)
            .finish()
    }
}
