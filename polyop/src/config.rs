//! Runtime configuration
//!
//! Admission limits for the adaptive nodes. The limits bound how many
//! distinct foreign representation combinations a single call site caches
//! before it switches to the generic implementation.

use crate::error::DriverError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default admission limit of the add node
pub const DEFAULT_ADD_LIMIT: usize = 3;

/// Default admission limit of the to-text node
pub const DEFAULT_TO_TEXT_LIMIT: usize = 5;

/// Node configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Foreign numeric combinations cached per add call site
    pub add_limit: usize,

    /// Foreign representations cached per to-text call site
    pub to_text_limit: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            add_limit: DEFAULT_ADD_LIMIT,
            to_text_limit: DEFAULT_TO_TEXT_LIMIT,
        }
    }
}

impl RuntimeConfig {
    /// Create a configuration with default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the add node's admission limit
    pub fn add_limit(mut self, limit: usize) -> Self {
        self.add_limit = limit;
        self
    }

    /// Set the to-text node's admission limit
    pub fn to_text_limit(mut self, limit: usize) -> Self {
        self.to_text_limit = limit;
        self
    }

    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, DriverError> {
        toml::from_str(source).map_err(|err| DriverError::config(err.to_string()))
    }

    /// Load a TOML file
    pub fn load(path: &Path) -> Result<Self, DriverError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }
}
