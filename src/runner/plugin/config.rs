//! Grammar profile: which plugins a session registers.
//!
//! ```toml
//! [grammar]
//! system = true
//! extensions = "subset"          # all | none | subset | by-type
//! plugins = ["date-literal", "unless"]
//! types = ["statement"]          # used with extensions = "by-type"
//! ```

use serde::Deserialize;
use tracing::info;

use super::custom;
use super::registry::{PluginRegistry, RegistryError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtensionMode {
    #[default]
    All,
    None,
    /// The catalog plugins named in `plugins`.
    Subset,
    /// The catalog plugins of the types named in `types`.
    ByType,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GrammarProfile {
    pub system: bool,
    pub extensions: ExtensionMode,
    pub plugins: Vec<String>,
    pub types: Vec<String>,
}

impl Default for GrammarProfile {
    fn default() -> Self {
        GrammarProfile {
            system: true,
            extensions: ExtensionMode::All,
            plugins: Vec::new(),
            types: Vec::new(),
        }
    }
}

impl GrammarProfile {
    /// System grammar only.
    pub fn core() -> Self {
        GrammarProfile {
            extensions: ExtensionMode::None,
            ..Self::default()
        }
    }

    /// Every extension except advanced member access, for constrained hosts.
    pub fn constrained() -> Self {
        GrammarProfile {
            extensions: ExtensionMode::Subset,
            plugins: custom::catalog_names()
                .into_iter()
                .filter(|name| name != "safe-member")
                .collect(),
            ..Self::default()
        }
    }

    /// Register the profile's plugins into `registry`.
    pub fn apply(&self, registry: &mut PluginRegistry) -> Result<(), RegistryError> {
        if self.system {
            registry.register_all_system()?;
        }
        match self.extensions {
            ExtensionMode::All => registry.register_all_custom()?,
            ExtensionMode::None => {}
            ExtensionMode::Subset => {
                let names: Vec<&str> = self.plugins.iter().map(String::as_str).collect();
                registry.register_custom_subset(&names)?;
            }
            ExtensionMode::ByType => {
                for type_key in &self.types {
                    registry.register_custom_by_type(type_key)?;
                }
            }
        }
        info!(counts = %registry.counts(), "grammar profile applied");
        Ok(())
    }

    /// A fresh registry holding the profile's plugins.
    pub fn build_registry(&self) -> Result<PluginRegistry, RegistryError> {
        let mut registry = PluginRegistry::new();
        self.apply(&mut registry)?;
        Ok(registry)
    }
}
