//! Stall configuration loading from config.toml
//!
//! The set of stalls is fixed per deployment. The presentation layer offers these stalls
//! for billing, editing and reporting.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Stalls that can be selected
    pub stalls: Vec<StallConfig>,
}

/// Configuration for a single stall
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct StallConfig {
    /// Identifier stored in `stall_id` columns
    pub id: i64,
    /// Display name
    pub name: String,
}

impl Config {
    /// The two stalls the tool ships with when no config file is present.
    #[must_use]
    pub fn default_stalls() -> Self {
        Self {
            stalls: vec![
                StallConfig {
                    id: 1,
                    name: "Stall 1".to_string(),
                },
                StallConfig {
                    id: 2,
                    name: "Stall 2".to_string(),
                },
            ],
        }
    }

    /// Whether `stall_id` is one of the configured stalls.
    #[must_use]
    pub fn contains(&self, stall_id: i64) -> bool {
        self.stalls.iter().any(|stall| stall.id == stall_id)
    }

    /// Display name for `stall_id`, if configured.
    #[must_use]
    pub fn stall_name(&self, stall_id: i64) -> Option<&str> {
        self.stalls
            .iter()
            .find(|stall| stall.id == stall_id)
            .map(|stall| stall.name.as_str())
    }

    fn validate(&self) -> Result<()> {
        if self.stalls.is_empty() {
            return Err(Error::Config {
                message: "At least one stall must be configured".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for stall in &self.stalls {
            if stall.id <= 0 {
                return Err(Error::Config {
                    message: format!("Stall id must be positive, got {}", stall.id),
                });
            }
            if !seen.insert(stall.id) {
                return Err(Error::Config {
                    message: format!("Duplicate stall id {}", stall.id),
                });
            }
        }
        Ok(())
    }
}

/// Parses and validates stall configuration from TOML text.
pub fn parse_config(contents: &str) -> Result<Config> {
    let config: Config = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    config.validate()?;
    Ok(config)
}

/// Loads stall configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - No stalls are listed, or an id is non-positive or repeated
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load stall configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    parse_config(&contents)
}

/// Loads stall configuration from the default location (./config.toml)
pub fn load_default_config() -> Result<Config> {
    load_config("config.toml")
}
