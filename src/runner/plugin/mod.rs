//! Grammar plugins.
//!
//! Every construct the parser understands, from string literals to `try/catch`, is a
//! plugin registered against one or more trigger tokens. The [`registry`] resolves which
//! plugin handles a token; [`system`] holds the core grammar and [`custom`] the optional
//! extensions a host may enable by name or by type.

/// Implements [`GrammarPlugin`](types::GrammarPlugin) for a struct with an `info` field.
macro_rules! grammar_plugin {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::runner::plugin::types::GrammarPlugin for $ty {
                fn info(&self) -> &$crate::runner::plugin::types::PluginInfo {
                    &self.info
                }
            }
        )+
    };
}

pub mod config;
pub mod custom;
pub mod registry;
pub mod system;
pub mod types;

pub use config::{ExtensionMode, GrammarProfile};
pub use registry::{PluginCounts, PluginRegistry, RegistryError};
pub use types::{
    Disposable, ExpressionPlugin, GrammarPlugin, LexicalPlugin, Plugin, PluginCategory,
    PluginInfo, PluginType, TokenPlugin, Trigger, PRECEDENCE_FALLBACK, PRECEDENCE_HIGHEST,
    PRECEDENCE_NORMAL,
};
