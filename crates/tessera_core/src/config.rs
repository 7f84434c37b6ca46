//! # Store Configuration
//!
//! Loaded once at startup from TOML:
//!
//! ```toml
//! initial_capacity = 4096
//! trace_structural_ops = false
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{StoreError, StoreResult};

/// Tuning knobs for a [`RecursiveArrays`](crate::RecursiveArrays).
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Rows to reserve in every column at construction.
    pub initial_capacity: usize,
    /// Emit a `trace` event for every create, erase, resize and reserve.
    pub trace_structural_ops: bool,
}

impl StoreConfig {
    /// Config that pre-allocates `capacity` rows.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            initial_capacity: capacity,
            ..Self::default()
        }
    }

    /// Parses a config from TOML text.
    pub fn from_toml_str(text: &str) -> StoreResult<Self> {
        toml::from_str(text).map_err(|e| StoreError::Config(e.to_string()))
    }

    /// Reads and parses a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = StoreConfig::from_toml_str("").unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.initial_capacity, 0);
        assert!(!config.trace_structural_ops);
    }

    #[test]
    fn test_config_parse() {
        let config = StoreConfig::from_toml_str(
            "initial_capacity = 512\ntrace_structural_ops = true\n",
        )
        .unwrap();
        assert_eq!(config.initial_capacity, 512);
        assert!(config.trace_structural_ops);
    }

    #[test]
    fn test_config_rejects_unknown_keys() {
        let err = StoreConfig::from_toml_str("capacity = 3").unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn test_config_missing_file() {
        let err = StoreConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, StoreError::Config(msg) if msg.contains("not/here.toml")));
    }

    #[test]
    fn test_config_load_from_file() {
        let path = std::env::temp_dir().join(format!("tessera-config-{}.toml", std::process::id()));
        std::fs::write(&path, "initial_capacity = 64\ntrace_structural_ops = true\n").unwrap();

        let loaded = StoreConfig::load(&path);
        std::fs::remove_file(&path).unwrap();

        let config = loaded.unwrap();
        assert_eq!(config.initial_capacity, 64);
        assert!(config.trace_structural_ops);
    }
}
