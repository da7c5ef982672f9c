//! Reader limits.
//!
//! Caps applied to counts read from the container so a corrupt file cannot
//! drive unbounded allocation.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CrateResult;

/// Limits applied while reading a crate container.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Upper bound (exclusive) on the number of TOC sections.
    pub max_toc_sections: u64,

    /// Upper bound (inclusive) on the number of tokens.
    pub max_num_tokens: u64,

    /// Upper bound (inclusive) on the length of an index table.
    pub max_num_indices: u64,

    /// Bytes a single section decode may allocate.
    pub max_memory_budget: u64,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_toc_sections: 32,
            max_num_tokens: 1 << 24,
            max_num_indices: 1 << 24,
            max_memory_budget: 2 << 30,
        }
    }
}

impl ReaderConfig {
    /// Parse a config from JSON. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Load a config from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> CrateResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ReaderConfig::from_json_str(r#"{ "max_toc_sections": 8 }"#).unwrap();
        assert_eq!(config.max_toc_sections, 8);
        assert_eq!(config.max_num_tokens, ReaderConfig::default().max_num_tokens);
    }

    #[test]
    fn test_round_trip_through_file() {
        let path = std::env::temp_dir().join(format!("usdc_config_{}.json", std::process::id()));
        let config = ReaderConfig {
            max_toc_sections: 4,
            max_num_tokens: 100,
            max_num_indices: 200,
            max_memory_budget: 4096,
        };
        std::fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();

        assert_eq!(ReaderConfig::from_json_file(&path).unwrap(), config);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_bad_json_is_error() {
        assert!(ReaderConfig::from_json_str("{ nope").is_err());
    }
}
