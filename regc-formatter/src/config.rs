// Configuration for generated source layout

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file searched for by [`Config::from_dir`]
pub const CONFIG_FILE_NAME: &str = "regcfmt.json";

/// Formatter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Number of spaces per indent level
    #[serde(default = "default_indent_size")]
    pub indent_size: usize,

    /// Sort and deduplicate `use` statements
    #[serde(default = "default_true")]
    pub sort_imports: bool,

    /// Blank line between consecutive declaration blocks
    #[serde(default = "default_true")]
    pub separate_blocks: bool,
}

fn default_indent_size() -> usize {
    3
}
fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            indent_size: default_indent_size(),
            sort_imports: true,
            separate_blocks: true,
        }
    }
}

impl Config {
    /// Load configuration from a regcfmt.json file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from `dir` or its nearest ancestor holding a
    /// regcfmt.json; defaults when none exists
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let mut current = Some(dir.as_ref());
        while let Some(path) = current {
            let config_path = path.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Self::from_file(config_path);
            }
            current = path.parent();
        }

        Ok(Self::default())
    }

    pub fn with_indent_size(mut self, indent_size: usize) -> Self {
        self.indent_size = indent_size;
        self
    }
}
