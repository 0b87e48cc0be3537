//! Analyzer configuration, persisted as TOML.
//!
//! Every field has a default, so an empty file (or no file at all) yields the
//! standard valuation: root base strength `0.5`, ε `1e-6`, related-post
//! grafting off.

use std::path::Path;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::argumentation::ScoringConfig;

/// Errors from loading or validating configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(agora::config::read),
        help("Ensure the config file exists and is valid TOML.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}")]
    #[diagnostic(
        code(agora::config::parse),
        help("Check the TOML syntax. Known tables are [scoring] and [related].")
    )]
    Parse { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(agora::config::write),
        help("Ensure you have write permissions to the target directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config value `{field}`: {message}")]
    #[diagnostic(
        code(agora::config::invalid),
        help(
            "scoring.root_base_strength must lie in (0, 1] and scoring.epsilon in [0, 1). \
             Remove the key to fall back to the default."
        )
    )]
    Invalid { field: &'static str, message: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Related-post grafting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedConfig {
    /// Graft topically related posts under the root.
    #[serde(default)]
    pub enabled: bool,
    /// Maximum number of related posts considered per analysis.
    #[serde(default = "default_max_posts")]
    pub max_posts: usize,
}

fn default_max_posts() -> usize {
    100
}

impl Default for RelatedConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_posts: default_max_posts(),
        }
    }
}

/// Top-level analyzer configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub related: RelatedConfig,
}

impl AnalyzerConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        Self::parse(text, "<inline>")
    }

    /// Load and validate a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse(&text, &path.display().to_string())
    }

    fn parse(text: &str, origin: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as TOML.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let text = self.to_toml_string()?;
        std::fs::write(path, text).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: "<serialize>".into(),
            message: e.to_string(),
        })
    }

    /// Check value ranges the valuation depends on.
    pub fn validate(&self) -> ConfigResult<()> {
        let root = self.scoring.root_base_strength;
        if !(root > 0.0 && root <= 1.0) {
            return Err(ConfigError::Invalid {
                field: "scoring.root_base_strength",
                message: format!("{root} is outside (0, 1]"),
            });
        }
        let epsilon = self.scoring.epsilon;
        if !(0.0..1.0).contains(&epsilon) {
            return Err(ConfigError::Invalid {
                field: "scoring.epsilon",
                message: format!("{epsilon} is outside [0, 1)"),
            });
        }
        Ok(())
    }
}
