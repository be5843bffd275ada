//! Engine configuration, loadable from TOML.
//!
//! ```toml
//! source_name = "rules.wf"
//! echo_output = true
//!
//! [governor]
//! max_iterations = 100000
//! max_call_depth = 64
//!
//! [grammar]
//! extensions = "by-type"
//! types = ["statement", "lexical"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::runner::ds::governor::GovernorLimits;
use crate::runner::plugin::config::GrammarProfile;
use crate::runner::plugin::registry::RegistryError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Name reported in error locations and traces.
    pub source_name: String,
    /// Write `print` output to stdout as well as collecting it.
    pub echo_output: bool,
    pub governor: GovernorLimits,
    pub grammar: GrammarProfile,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            source_name: String::from("<script>"),
            echo_output: false,
            governor: GovernorLimits::default(),
            grammar: GrammarProfile::default(),
        }
    }
}

impl EngineConfig {
    /// Default limits with the constrained grammar profile.
    pub fn constrained() -> Self {
        EngineConfig {
            grammar: GrammarProfile::constrained(),
            ..Self::default()
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::plugin::config::ExtensionMode;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            source_name = "rules.wf"

            [governor]
            max_iterations = 10

            [grammar]
            extensions = "by-type"
            types = ["statement"]
            "#,
        )
        .unwrap();
        assert_eq!(config.source_name, "rules.wf");
        assert_eq!(config.governor.max_iterations, 10);
        assert_eq!(config.governor.max_call_depth, GovernorLimits::default().max_call_depth);
        assert_eq!(config.grammar.extensions, ExtensionMode::ByType);
        assert!(config.grammar.system);
    }

    #[test]
    fn test_bad_toml_is_reported() {
        let err = EngineConfig::from_toml_str("[grammar]\nextensions = \"some\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }
}
