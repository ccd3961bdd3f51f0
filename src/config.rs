// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Combination configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default file picked up from the working directory
pub const DEFAULT_CONFIG_FILE: &str = "polycsg.toml";

/// How a partition node picks its splitting plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SplitterStrategy {
    /// Plane of the first remaining polygon
    First,
    /// Among `sample` evenly spaced candidates, the plane that splits the fewest polygons
    LeastSplits { sample: usize },
}

impl Default for SplitterStrategy {
    fn default() -> Self {
        Self::LeastSplits { sample: 8 }
    }
}

/// Combination configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsgConfig {
    /// Build partitions and repair T-junctions on the rayon pool
    pub parallel: bool,
    /// Upper bound on fragments created per request
    pub max_fragments: Option<usize>,
    /// Merge coplanar neighbouring fragments into single faces
    pub merge_coplanar: bool,
    /// Drop vertices lying in the middle of a straight edge
    pub simplify_collinear: bool,
    /// Kept last so it serializes as a trailing table
    pub splitter: SplitterStrategy,
}

impl Default for CsgConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            max_fragments: None,
            merge_coplanar: true,
            simplify_collinear: true,
            splitter: SplitterStrategy::default(),
        }
    }
}

impl CsgConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: CsgConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Explicit file if given, else `polycsg.toml` in the working directory, else defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if PathBuf::from(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("polycsg.toml");
        let config = CsgConfig {
            parallel: false,
            max_fragments: Some(5000),
            merge_coplanar: true,
            simplify_collinear: false,
            splitter: SplitterStrategy::First,
        };

        config.save(&path).unwrap();
        assert_eq!(CsgConfig::load(Some(&path)).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: CsgConfig = toml::from_str(
            r#"
            parallel = false

            [splitter]
            kind = "least_splits"
            sample = 3
            "#,
        )
        .unwrap();

        assert!(!config.parallel);
        assert_eq!(config.splitter, SplitterStrategy::LeastSplits { sample: 3 });
        assert_eq!(config.max_fragments, None);
        assert!(config.merge_coplanar);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(CsgConfig::from_file("/nonexistent/polycsg.toml").is_err());
    }
}
