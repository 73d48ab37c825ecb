//! Configuration types and validation for the cleaner
//! Author: kartik4091
//! Created: 2026-10-19

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Default stem suffix for derived output paths
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_cleaned";

/// Configuration for a cleaning run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanerConfig {
    /// Delete page annotations
    pub remove_annotations: bool,
    /// Truncate image XObject streams
    pub remove_images: bool,
    /// Drop unreferenced objects and renumber on save
    pub prune_unreferenced: bool,
    /// Deflate remaining streams on save
    pub compress_streams: bool,
    /// Appended to the input stem when no output path is given
    pub output_suffix: String,
    /// Walk and count without writing the output file
    pub dry_run: bool,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            remove_annotations: true,
            remove_images: true,
            prune_unreferenced: true,
            compress_streams: true,
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
            dry_run: false,
        }
    }
}

impl CleanerConfig {
    /// Loads a config file, trying JSON first and YAML second.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {}", path.display(), e)))?;

        let config = Self::parse(&content)?;
        debug!("Loaded cleaner config from {}", path.display());
        Ok(config)
    }

    /// Parses config text in either supported format and validates it.
    pub fn parse(content: &str) -> Result<Self> {
        let config: CleanerConfig = serde_json::from_str(content)
            .or_else(|_| serde_yaml::from_str(content))
            .map_err(|e| Error::Config(format!("config parsing error: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.output_suffix.is_empty() {
            return Err(Error::Config(
                "output_suffix must not be empty (the output would replace the input)".into(),
            ));
        }
        if self.output_suffix.contains(['/', '\\']) {
            return Err(Error::Config(format!(
                "output_suffix must not contain path separators: {:?}",
                self.output_suffix
            )));
        }
        Ok(())
    }
}
