//! Store configuration
//!
//! A `StoreConfig` is built once at startup (in code or from a JSON file) and
//! handed to [`ObjectStore::new`](crate::ObjectStore::new), which keeps it
//! for its whole lifetime.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory under the root that holds every stored key
pub const STORE_DIR: &str = "pickle_store";

/// Default root, relative to the working directory
pub const DEFAULT_ROOT: &str = "sandbox";

/// Default zstd level for table payloads and generic blobs
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

/// How much of a table the store verifies after writing it
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundTripCheck {
    /// Column names and order, dtypes, every value and the index
    #[default]
    Full,
    /// Column dtypes only
    DtypesOnly,
}

/// Configuration for an [`ObjectStore`](crate::ObjectStore)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Root directory; keys live under `<root>/pickle_store/`
    pub root: PathBuf,
    /// Sub-directory used when a call passes none
    pub default_subdir: Option<String>,
    /// zstd compression level
    pub compression_level: i32,
    /// Verification performed by `dump_table`
    pub round_trip: RoundTripCheck,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            default_subdir: None,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            round_trip: RoundTripCheck::Full,
        }
    }
}

impl StoreConfig {
    /// Config rooted at `root` with every other field defaulted
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn default_subdir(mut self, subdir: impl Into<String>) -> Self {
        self.default_subdir = Some(subdir.into());
        self
    }

    pub fn compression_level(mut self, level: i32) -> Self {
        self.compression_level = level;
        self
    }

    pub fn round_trip(mut self, check: RoundTripCheck) -> Self {
        self.round_trip = check;
        self
    }

    /// Read a config from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: StoreConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the fields that can be wrong independently of the filesystem
    pub fn validate(&self) -> Result<()> {
        if let Some(subdir) = &self.default_subdir {
            crate::store::validate_subdir(subdir)?;
        }
        let levels = zstd::compression_level_range();
        if !levels.contains(&self.compression_level) {
            return Err(Error::Config(format!(
                "compression level {} outside {:?}",
                self.compression_level, levels
            )));
        }
        Ok(())
    }

    /// `<root>/pickle_store`
    pub fn store_path(&self) -> PathBuf {
        self.root.join(STORE_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.store_path(), PathBuf::from("sandbox/pickle_store"));
        assert_eq!(config.round_trip, RoundTripCheck::Full);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_file_partial() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(
            &path,
            r#"{"root": "/tmp/cache", "round_trip": "dtypes_only"}"#,
        )
        .unwrap();

        let config = StoreConfig::from_json_file(&path).unwrap();
        assert_eq!(config.root, PathBuf::from("/tmp/cache"));
        assert_eq!(config.round_trip, RoundTripCheck::DtypesOnly);
        assert_eq!(config.compression_level, DEFAULT_COMPRESSION_LEVEL);
        assert_eq!(config.default_subdir, None);
    }

    #[test]
    fn test_from_json_file_missing() {
        let dir = tempdir().unwrap();
        let result = StoreConfig::from_json_file(dir.path().join("nope.json"));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_bad_subdir() {
        let config = StoreConfig::default().default_subdir("../escape");
        assert!(config.validate().is_err());
    }
}
