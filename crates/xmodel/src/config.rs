// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Engine configuration.
//!
//! - **Level 1 (Static)**: accessor-path syntax constants.
//! - **Level 2 (Dynamic)**: [`EngineConfig`] limits, optionally loaded from YAML
//!   (feature `config-loaders`).
//!
//! # Example YAML
//!
//! ```yaml
//! max_alias_depth: 16
//! max_dimensions: 4
//! ```

use crate::error::{Error, Result};

/// Joins a prefix and a member name in an accessor path (`a.b`).
pub const MEMBER_SEPARATOR: &str = ".";

/// Joins a namespace scope and a local name (`Outer::Inner`).
pub const SCOPE_SEPARATOR: &str = "::";

/// Reserved leaf value of a union discriminator; joined without separator (`u#`).
pub const DISCRIMINATOR_MARKER: &str = "#";

/// Suffix of the symbolic length accessor of a template-owned collection (`pts#`).
pub const LENGTH_SUFFIX: &str = "#";

/// Default upper bound on alias (typedef) chain length.
pub const DEFAULT_MAX_ALIAS_DEPTH: usize = 64;

/// Default upper bound on collection qualifier dimensions.
pub const DEFAULT_MAX_DIMENSIONS: usize = 32;

/// Runtime limits of a [`Repository`](crate::Repository).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config-loaders", derive(serde::Deserialize))]
#[cfg_attr(feature = "config-loaders", serde(default))]
pub struct EngineConfig {
    /// Longest alias chain followed before giving up.
    pub max_alias_depth: usize,
    /// Most dimensions a single collection qualifier may carry.
    pub max_dimensions: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_alias_depth: DEFAULT_MAX_ALIAS_DEPTH,
            max_dimensions: DEFAULT_MAX_DIMENSIONS,
        }
    }
}

impl EngineConfig {
    /// Check that every limit is usable.
    pub fn validate(&self) -> Result<()> {
        if self.max_alias_depth == 0 {
            return Err(Error::Config("max_alias_depth must be > 0".into()));
        }
        if self.max_dimensions == 0 {
            return Err(Error::Config("max_dimensions must be > 0".into()));
        }
        Ok(())
    }
}

#[cfg(feature = "config-loaders")]
impl EngineConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| Error::Config(format!("YAML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file.
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| Error::ConfigFileNotFound(path.display().to_string()))?;
        log::debug!("[xmodel::config] loading {}", path.display());
        Self::from_yaml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = EngineConfig::default();
        assert_eq!(config.max_alias_depth, DEFAULT_MAX_ALIAS_DEPTH);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_limits_rejected() {
        let config = EngineConfig {
            max_alias_depth: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[cfg(feature = "config-loaders")]
    #[test]
    fn yaml_partial_document_keeps_defaults() {
        let config = EngineConfig::from_yaml_str("max_dimensions: 4\n").expect("parse");
        assert_eq!(config.max_dimensions, 4);
        assert_eq!(config.max_alias_depth, DEFAULT_MAX_ALIAS_DEPTH);
    }

    #[cfg(feature = "config-loaders")]
    #[test]
    fn yaml_file_roundtrip() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "max_alias_depth: 8").expect("write");
        let config = EngineConfig::from_yaml_file(file.path()).expect("load");
        assert_eq!(config.max_alias_depth, 8);

        assert!(matches!(
            EngineConfig::from_yaml_file("/nonexistent/xmodel.yaml"),
            Err(Error::ConfigFileNotFound(_))
        ));
    }

    #[cfg(feature = "config-loaders")]
    #[test]
    fn yaml_invalid_values_rejected() {
        assert!(EngineConfig::from_yaml_str("max_alias_depth: 0\n").is_err());
        assert!(EngineConfig::from_yaml_str("max_alias_depth: [1]\n").is_err());
    }
}
