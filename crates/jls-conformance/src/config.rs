//! Harness configuration
//!
//! Every field has a default, so an empty JSON object is a valid
//! configuration file.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How a stream with a non-zero near-lossless bound is verified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NearLosslessVerification {
    /// Every sample must lie within the bound
    #[default]
    Bounded,
    /// Trust the codec and only compare sizes
    Skip,
}

/// Settings shared by every check of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Extensions (without dot) of single-component references
    pub monochrome_extensions: Vec<String>,
    /// Extensions (without dot) of three-component references
    pub color_extensions: Vec<String>,
    /// Near-lossless bound handed to the encoder
    pub near_lossless: i32,
    /// Write each encoded stream next to its reference
    pub write_encoded: bool,
    pub near_lossless_verification: NearLosslessVerification,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            monochrome_extensions: vec!["pgm".into()],
            color_extensions: vec!["ppm".into()],
            near_lossless: 0,
            write_encoded: true,
            near_lossless_verification: NearLosslessVerification::default(),
        }
    }
}

impl HarnessConfig {
    /// Read a configuration from a JSON file
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        serde_json::from_str(&text).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn with_near_lossless(mut self, near_lossless: i32) -> Self {
        self.near_lossless = near_lossless;
        self
    }

    pub fn with_write_encoded(mut self, write_encoded: bool) -> Self {
        self.write_encoded = write_encoded;
        self
    }

    pub fn with_verification(mut self, verification: NearLosslessVerification) -> Self {
        self.near_lossless_verification = verification;
        self
    }
}
