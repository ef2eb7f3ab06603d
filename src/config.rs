//! Configuration file support.
//!
//! The config file is YAML with kebab-case keys:
//! ```yaml
//! database: /usr/share/tabchord/chords.yaml
//! min-strings: 3
//! ```
//! Command-line flags override the file, the file overrides the defaults.
//! With no database configured the built-in reference database is used (see
//! [`ChordDatabase::reference`](crate::ChordDatabase::reference)).

use crate::error::TabError;
use crate::matcher::{MatchOptions, DEFAULT_MIN_STRINGS};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Settings read from the config file; every key is optional
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    pub database: Option<PathBuf>,
    pub min_strings: Option<usize>,
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, TabError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| TabError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        Self::from_yaml_str(&text)
            .map_err(|e| TabError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    /// Database path: explicit flag, then config file. `None` selects the
    /// built-in reference database.
    pub fn database_path(&self, flag: Option<&PathBuf>) -> Option<PathBuf> {
        flag.cloned().or_else(|| self.database.clone())
    }

    /// Match options: explicit flag, then config file, then default
    pub fn match_options(&self, min_strings: Option<usize>) -> MatchOptions {
        MatchOptions::with_min_strings(
            min_strings
                .or(self.min_strings)
                .unwrap_or(DEFAULT_MIN_STRINGS),
        )
    }
}
