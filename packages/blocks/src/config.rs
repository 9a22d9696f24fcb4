use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const DEFAULT_CONFIG_NAME: &str = "blocks.config.json";

/// Parser configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParserConfig {
    /// Legacy block names and the names they were renamed to
    #[serde(default = "default_aliases")]
    pub aliases: BTreeMap<String, String>,

    /// Report coercion mismatches and other diagnostics
    #[serde(default = "default_dev_mode")]
    pub dev_mode: bool,
}

fn default_aliases() -> BTreeMap<String, String> {
    [
        ("core/text", "core/paragraph"),
        ("core/cover-text", "core/paragraph"),
    ]
    .into_iter()
    .map(|(from, to)| (from.to_string(), to.to_string()))
    .collect()
}

fn default_dev_mode() -> bool {
    cfg!(debug_assertions)
}

impl ParserConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load config from a directory, falling back to the defaults when no
    /// config file exists
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = dir.as_ref().join(DEFAULT_CONFIG_NAME);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        Self::from_json_str(&content)
    }

    pub fn with_alias(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.aliases.insert(from.into(), to.into());
        self
    }

    pub fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self
    }

    /// Current name of a block, after rewriting legacy aliases
    pub fn canonical_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map(String::as_str).unwrap_or(name)
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            aliases: default_aliases(),
            dev_mode: default_dev_mode(),
        }
    }
}
