//! Plugin registry: trigger-keyed, precedence-ordered candidate lists.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::parser::token::{Token, TokenKind};
use crate::parser::Parser;

use super::custom;
use super::system;
use super::types::{
    ExpressionPlugin, GrammarPlugin, LexicalPlugin, Plugin, PluginCategory, PluginInfo,
    PluginType, TokenPlugin, Trigger,
};

/// Error type for plugin registration and teardown.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("unknown plugin type '{0}'")]
    UnknownPluginType(String),

    #[error("unknown extension plugin '{0}'")]
    UnknownPlugin(String),

    #[error("malformed plugin '{plugin}': {reason}")]
    Malformed { plugin: String, reason: String },

    #[error("failed to dispose plugin '{plugin}': {reason}")]
    DisposeFailed { plugin: String, reason: String },
}

type Candidates<T> = HashMap<Trigger, Vec<Rc<T>>>;

/// Plugin counts per registry category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PluginCounts {
    pub lexical: usize,
    pub token: usize,
    pub expression: usize,
    pub postfix: usize,
    pub system_statement: usize,
    pub extension_statement: usize,
}

impl PluginCounts {
    pub fn get(&self, category: PluginCategory) -> usize {
        match category {
            PluginCategory::Lexical => self.lexical,
            PluginCategory::Token => self.token,
            PluginCategory::Expression => self.expression,
            PluginCategory::Postfix => self.postfix,
            PluginCategory::SystemStatement => self.system_statement,
            PluginCategory::ExtensionStatement => self.extension_statement,
        }
    }

    fn slot(&mut self, category: PluginCategory) -> &mut usize {
        match category {
            PluginCategory::Lexical => &mut self.lexical,
            PluginCategory::Token => &mut self.token,
            PluginCategory::Expression => &mut self.expression,
            PluginCategory::Postfix => &mut self.postfix,
            PluginCategory::SystemStatement => &mut self.system_statement,
            PluginCategory::ExtensionStatement => &mut self.extension_statement,
        }
    }

    pub fn total(&self) -> usize {
        PluginCategory::ALL.iter().map(|c| self.get(*c)).sum()
    }
}

impl fmt::Display for PluginCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = PluginCategory::ALL
            .iter()
            .map(|c| format!("{}={}", c, self.get(*c)))
            .collect();
        write!(f, "{}", parts.join(" "))
    }
}

/// Registry of grammar plugins for one interpreter session.
///
/// Plugins are registered before parsing starts and are read-only afterwards. The only
/// interior mutability is the advisory *last matched* cache, which makes the registry
/// `!Sync`: concurrent sessions each own a registry.
pub struct PluginRegistry {
    lexical: Candidates<dyn LexicalPlugin>,
    tokens: Candidates<dyn TokenPlugin>,
    expressions: Candidates<dyn ExpressionPlugin>,
    postfix: Vec<Rc<dyn ExpressionPlugin>>,
    system_statements: Candidates<dyn ExpressionPlugin>,
    extension_statements: Candidates<dyn ExpressionPlugin>,
    /// Every registration in order, with the category it was filed under.
    registered: Vec<(PluginCategory, Plugin)>,
    disposables: Vec<Plugin>,
    has_literal_combinators: bool,
    last_matched: RefCell<Option<Rc<dyn ExpressionPlugin>>>,
}

impl PluginRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        PluginRegistry {
            lexical: HashMap::new(),
            tokens: HashMap::new(),
            expressions: HashMap::new(),
            postfix: Vec::new(),
            system_statements: HashMap::new(),
            extension_statements: HashMap::new(),
            registered: Vec::new(),
            disposables: Vec::new(),
            has_literal_combinators: false,
            last_matched: RefCell::new(None),
        }
    }

    /// Create a registry with the system grammar installed.
    pub fn with_system() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.register_all_system()?;
        Ok(registry)
    }

    /// Register a single plugin under each of its triggers.
    pub fn register(&mut self, plugin: Plugin) -> Result<(), RegistryError> {
        validate(&plugin)?;
        let category = plugin.category();
        match &plugin {
            Plugin::Lexical(p) => {
                for trigger in &p.info().triggers {
                    insert_sorted(self.lexical.entry(trigger.clone()).or_default(), p.clone());
                }
            }
            Plugin::Token(p) => {
                for trigger in &p.info().triggers {
                    insert_sorted(self.tokens.entry(trigger.clone()).or_default(), p.clone());
                }
            }
            Plugin::Expression(p) => {
                let info = p.info();
                if info.is_postfix() {
                    insert_sorted(&mut self.postfix, p.clone());
                } else {
                    for trigger in &info.triggers {
                        insert_sorted(
                            self.expressions.entry(trigger.clone()).or_default(),
                            p.clone(),
                        );
                        if info.is_statement {
                            let tier = if info.is_system {
                                &mut self.system_statements
                            } else {
                                &mut self.extension_statements
                            };
                            insert_sorted(tier.entry(trigger.clone()).or_default(), p.clone());
                        }
                        if *trigger == Trigger::Number {
                            self.has_literal_combinators = true;
                        }
                    }
                }
            }
        }
        if plugin.as_disposable().is_some() {
            self.disposables.push(plugin.clone());
        }
        debug!(
            plugin = %plugin.info().name,
            category = %category,
            precedence = plugin.info().precedence,
            "registered grammar plugin"
        );
        self.registered.push((category, plugin));
        Ok(())
    }

    /// Register a collection, ordered by precedence first (stable for equal values).
    pub fn register_all(&mut self, mut plugins: Vec<Plugin>) -> Result<(), RegistryError> {
        for plugin in &plugins {
            validate(plugin)?;
        }
        plugins.sort_by_key(|p| p.info().precedence);
        for plugin in plugins {
            self.register(plugin)?;
        }
        Ok(())
    }

    /// Register the core control-flow grammar.
    pub fn register_all_system(&mut self) -> Result<(), RegistryError> {
        let plugins = system::plugins();
        let count = plugins.len();
        self.register_all(plugins)?;
        info!(count, "registered system grammar");
        Ok(())
    }

    /// Register every extension in the catalog.
    pub fn register_all_custom(&mut self) -> Result<(), RegistryError> {
        let plugins = custom::catalog();
        let count = plugins.len();
        self.register_all(plugins)?;
        info!(count, "registered extension grammar");
        Ok(())
    }

    /// Register the named extensions only. Unknown names fail before anything is registered.
    pub fn register_custom_subset(&mut self, names: &[&str]) -> Result<(), RegistryError> {
        let catalog = custom::catalog();
        let mut selected = Vec::with_capacity(names.len());
        for name in names {
            let plugin = catalog
                .iter()
                .find(|p| p.info().name == *name)
                .ok_or_else(|| RegistryError::UnknownPlugin(name.to_string()))?;
            selected.push(plugin.clone());
        }
        info!(count = selected.len(), "registered extension subset");
        self.register_all(selected)
    }

    /// Register the extensions of one symbolic plugin type (`lexical`, `token`,
    /// `expression`, `postfix`, `statement`).
    pub fn register_custom_by_type(&mut self, type_key: &str) -> Result<(), RegistryError> {
        let plugin_type: PluginType = type_key.parse()?;
        let selected: Vec<Plugin> = custom::catalog()
            .into_iter()
            .filter(|p| plugin_type.matches(p.category()))
            .collect();
        info!(plugin_type = type_key, count = selected.len(), "registered extensions by type");
        self.register_all(selected)
    }

    /// Resolve the prefix-expression plugin for the parser's current token.
    pub fn match_expression(&self, parser: &Parser<'_>) -> Option<Rc<dyn ExpressionPlugin>> {
        let token = parser.current();
        let found = candidates(&self.expressions, token)
            .find(|p| !p.info().is_statement && p.can_handle(parser))
            .cloned();
        self.remember(found)
    }

    /// Resolve the postfix plugin continuing an operand at the current token.
    pub fn match_postfix(&self, parser: &Parser<'_>) -> Option<Rc<dyn ExpressionPlugin>> {
        if parser.current().kind == TokenKind::Eof {
            return None;
        }
        let found = self.postfix.iter().find(|p| p.can_handle(parser)).cloned();
        self.remember(found)
    }

    /// Two-tier statement resolution. The lower precedence wins; on a tie the system tier
    /// wins.
    pub fn match_statement(&self, parser: &Parser<'_>) -> Option<Rc<dyn ExpressionPlugin>> {
        let token = parser.current();
        let system = candidates(&self.system_statements, token)
            .find(|p| p.can_handle(parser))
            .cloned();
        let extension = candidates(&self.extension_statements, token)
            .find(|p| p.can_handle(parser))
            .cloned();
        let chosen = match (system, extension) {
            (Some(s), Some(e)) => {
                if e.info().precedence < s.info().precedence {
                    Some(e)
                } else {
                    Some(s)
                }
            }
            (Some(s), None) => Some(s),
            (None, e) => e,
        };
        self.remember(chosen)
    }

    /// The plugin returned by the most recent successful match.
    pub fn last_matched(&self) -> Option<Rc<dyn ExpressionPlugin>> {
        self.last_matched.borrow().clone()
    }

    fn remember(
        &self,
        found: Option<Rc<dyn ExpressionPlugin>>,
    ) -> Option<Rc<dyn ExpressionPlugin>> {
        if let Some(plugin) = &found {
            trace!(plugin = %plugin.info().name, "matched plugin");
            *self.last_matched.borrow_mut() = Some(plugin.clone());
        }
        found
    }

    /// Whether a plugin claims `generic-number`; when false the driver builds number
    /// literals without consulting the registry.
    pub fn has_literal_combinators(&self) -> bool {
        self.has_literal_combinators
    }

    /// Run lexical plugins over a token list.
    pub fn apply_lexical(&self, tokens: Vec<Token>) -> Vec<Token> {
        if self.lexical.is_empty() {
            return tokens;
        }
        let mut out = Vec::with_capacity(tokens.len());
        let mut i = 0;
        while i < tokens.len() {
            let merged = candidates(&self.lexical, &tokens[i])
                .find_map(|p| p.combine(&tokens[i..]))
                .filter(|(_, consumed)| *consumed > 0);
            match merged {
                Some((token, consumed)) => {
                    out.push(token);
                    i += consumed;
                }
                None => {
                    out.push(tokens[i].clone());
                    i += 1;
                }
            }
        }
        out
    }

    /// Run token plugins over identifier tokens.
    pub fn classify_tokens(&self, tokens: &mut [Token]) {
        if self.tokens.is_empty() {
            return;
        }
        for token in tokens.iter_mut() {
            if token.kind != TokenKind::Identifier {
                continue;
            }
            let kind = candidates(&self.tokens, token).find_map(|p| p.classify(token));
            if let Some(kind) = kind {
                token.kind = kind;
            }
        }
    }

    pub fn counts(&self) -> PluginCounts {
        let mut counts = PluginCounts::default();
        for (category, _) in &self.registered {
            *counts.slot(*category) += 1;
        }
        counts
    }

    pub fn count(&self, category: PluginCategory) -> usize {
        self.counts().get(category)
    }

    /// Visit every plugin registered in `category`, in registration order.
    pub fn for_each(&self, category: PluginCategory, mut f: impl FnMut(&PluginInfo)) {
        for (c, plugin) in &self.registered {
            if *c == category {
                f(plugin.info());
            }
        }
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.registered.iter().any(|(_, p)| p.info().name == name)
    }

    /// Dispose every enrolled plugin. A failure is logged and collected; the remaining
    /// plugins are still disposed.
    pub fn dispose_all(&mut self) -> Vec<RegistryError> {
        let mut failures = vec![];
        for plugin in self.disposables.drain(..) {
            if let Some(disposable) = plugin.as_disposable() {
                if let Err(reason) = disposable.dispose() {
                    warn!(plugin = %plugin.info().name, %reason, "plugin disposal failed");
                    failures.push(RegistryError::DisposeFailed {
                        plugin: plugin.info().name.clone(),
                        reason,
                    });
                }
            }
        }
        failures
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("counts", &self.counts())
            .field("has_literal_combinators", &self.has_literal_combinators)
            .finish()
    }
}

/// Insert after every candidate with lower or equal precedence, so ties keep
/// registration order.
fn insert_sorted<T: GrammarPlugin + ?Sized>(list: &mut Vec<Rc<T>>, plugin: Rc<T>) {
    let precedence = plugin.info().precedence;
    let at = list.partition_point(|p| p.info().precedence <= precedence);
    list.insert(at, plugin);
}

/// Literal-text candidates first, then the generic key for the token's kind.
fn candidates<'a, T: ?Sized + 'a>(
    map: &'a Candidates<T>,
    token: &Token,
) -> impl Iterator<Item = &'a Rc<T>> + 'a {
    let literal = Trigger::literal_for(token).and_then(|k| map.get(&k));
    let generic = Trigger::generic_for(token).and_then(|k| map.get(&k));
    literal.into_iter().flatten().chain(generic.into_iter().flatten())
}

fn validate(plugin: &Plugin) -> Result<(), RegistryError> {
    let info = plugin.info();
    let malformed = |reason: &str| RegistryError::Malformed {
        plugin: info.name.clone(),
        reason: reason.to_string(),
    };
    if info.triggers.is_empty() {
        return Err(malformed("no trigger tokens"));
    }
    let has_suffix = info.triggers.contains(&Trigger::Suffix);
    match plugin {
        Plugin::Lexical(_) if info.triggers.iter().any(Trigger::is_generic) => {
            Err(malformed("lexical plugins trigger on literal text only"))
        }
        Plugin::Token(_)
            if info
                .triggers
                .iter()
                .any(|t| !matches!(t, Trigger::Text(_) | Trigger::Identifier)) =>
        {
            Err(malformed("token plugins trigger on identifier text"))
        }
        Plugin::Expression(_) if has_suffix && info.triggers.len() > 1 => {
            Err(malformed("the suffix trigger cannot be combined with others"))
        }
        Plugin::Expression(_) if has_suffix && info.is_statement => {
            Err(malformed("postfix forms cannot be statements"))
        }
        _ => Ok(()),
    }
}
