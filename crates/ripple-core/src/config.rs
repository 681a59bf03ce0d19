//! Kernel configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// How graph validation reports problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Collect every problem and report them together.
    #[default]
    Aggregate,
    /// Stop at the first problem.
    FailFast,
}

/// Configuration for the reactive kernel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KernelConfig {
    /// Validation reporting strategy
    pub validation: ValidationMode,

    /// Turn panics inside cell bodies into cell failures
    pub catch_panics: bool,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            validation: ValidationMode::Aggregate,
            catch_panics: true,
        }
    }
}

impl KernelConfig {
    /// Create a config that reports the first validation problem only.
    pub fn fail_fast() -> Self {
        Self {
            validation: ValidationMode::FailFast,
            ..Default::default()
        }
    }

    /// Parse a config from JSON text. Missing fields take their defaults.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Read a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text).map_err(std::io::Error::other)
    }
}
