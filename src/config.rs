//! Tokenizer configuration.
//!
//! A [`TokenizerConfig`] is read once at startup and decides where the word
//! lists come from and how tweets are fetched. Every field has a default, so
//! `{}` is a valid configuration.
//!
//! # JSON shape
//!
//! ```json
//! {
//!   "resources_dir": "/opt/tweetok/resources",
//!   "fetch": {
//!     "batch_size": 100
//!   }
//! }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{Result, TokenizerError};

/// Largest lookup batch the tweet service accepts.
pub const MAX_BATCH_SIZE: usize = 100;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenizerConfig {
    /// Directory holding `DOMAINS`, `EMOTICONS` and `NONBREAKING_PREFIXES`.
    /// `None` selects the bundled lists.
    #[serde(default)]
    pub resources_dir: Option<PathBuf>,

    #[serde(default)]
    pub fetch: FetchConfig,

    /// Captures any fields not recognized by the schema.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_json::Value>,
}

/// Settings for tweet lookup.
///
/// Service credentials are not part of the schema until a network-backed
/// source exists; they land in `unknown_fields` and are reported as unknown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Ids per lookup request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_json::Value>,
}

fn default_batch_size() -> usize {
    MAX_BATCH_SIZE
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            unknown_fields: HashMap::new(),
        }
    }
}

impl TokenizerConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a configuration file. Call [`validate`](Self::validate)
    /// once any overrides have been applied.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        Self::from_json(&raw)
    }

    pub fn with_resources_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.resources_dir = Some(dir.into());
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.fetch.batch_size = batch_size;
        self
    }

    /// Dotted paths of every unrecognized field.
    pub fn unknown_field_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .unknown_fields
            .keys()
            .cloned()
            .chain(self.fetch.unknown_fields.keys().map(|k| format!("fetch.{k}")))
            .collect();
        paths.sort();
        paths
    }

    /// Check the values that can be checked without touching the network.
    ///
    /// Unknown fields are not an error; they are logged as warnings.
    pub fn validate(&self) -> Result<()> {
        let batch_size = self.fetch.batch_size;
        if batch_size == 0 || batch_size > MAX_BATCH_SIZE {
            return Err(TokenizerError::Config {
                path: "fetch.batch_size".to_string(),
                message: format!("must be between 1 and {MAX_BATCH_SIZE}, got {batch_size}"),
            });
        }

        if let Some(dir) = &self.resources_dir {
            if !dir.is_dir() {
                return Err(TokenizerError::Config {
                    path: "resources_dir".to_string(),
                    message: format!("{} is not a directory", dir.display()),
                });
            }
        }

        #[cfg(feature = "tracing")]
        for field in self.unknown_field_paths() {
            tracing::warn!(field = %field, "ignoring unknown configuration field");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_default() {
        let cfg = TokenizerConfig::from_json("{}").unwrap();
        assert!(cfg.resources_dir.is_none());
        assert_eq!(cfg.fetch.batch_size, 100);
        assert!(cfg.unknown_field_paths().is_empty());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_full_config() {
        let json = r#"{ "resources_dir": "/tmp", "fetch": { "batch_size": 50 } }"#;
        let cfg = TokenizerConfig::from_json(json).unwrap();
        assert_eq!(cfg.fetch.batch_size, 50);
        assert_eq!(cfg.resources_dir, Some(PathBuf::from("/tmp")));
        assert!(cfg.unknown_field_paths().is_empty());
    }

    #[test]
    fn test_credentials_are_unknown_fields() {
        let json = r#"{ "fetch": { "consumer_key": "ck", "access_secret": "as" } }"#;
        let cfg = TokenizerConfig::from_json(json).unwrap();
        assert_eq!(
            cfg.unknown_field_paths(),
            vec!["fetch.access_secret", "fetch.consumer_key"]
        );
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_unknown_fields_captured() {
        let json = r#"{ "bogus": 1, "fetch": { "extra": true } }"#;
        let cfg = TokenizerConfig::from_json(json).unwrap();
        assert_eq!(cfg.unknown_field_paths(), vec!["bogus", "fetch.extra"]);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_batch_size_bounds() {
        for bad in [0, 101] {
            let err = TokenizerConfig::default()
                .with_batch_size(bad)
                .validate()
                .unwrap_err();
            assert!(matches!(err, TokenizerError::Config { ref path, .. } if path == "fetch.batch_size"));
        }
        assert!(TokenizerConfig::default().with_batch_size(1).validate().is_ok());
    }

    #[test]
    fn test_missing_resources_dir_rejected() {
        let err = TokenizerConfig::default()
            .with_resources_dir("/definitely/not/here")
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("resources_dir"));

        let dir = tempfile::tempdir().unwrap();
        let cfg = TokenizerConfig::default().with_resources_dir(dir.path());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_from_file_parses_without_validating() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "fetch": { "batch_size": 0 } }"#).unwrap();
        let cfg = TokenizerConfig::from_file(&path).unwrap();
        assert_eq!(cfg.fetch.batch_size, 0);
        assert!(cfg.validate().is_err());
        assert!(cfg.with_batch_size(10).validate().is_ok());

        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            TokenizerConfig::from_file(&path),
            Err(TokenizerError::ConfigParse(_))
        ));
    }
}
