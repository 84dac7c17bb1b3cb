//! Error types for the conformance harness
//!
//! Only collaborator failures are errors. A decoded image that disagrees
//! with its reference is a [`Verdict`](crate::verify::Verdict), not an error.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for harness operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort the current run
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Reading, writing or traversing the filesystem failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A reference image could not be parsed or written
    #[error("Reference image error in {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The reference image has a sample layout the codec cannot be fed
    #[error("Unsupported raster layout in {}: {layout}", path.display())]
    UnsupportedLayout { path: PathBuf, layout: String },

    /// Bits per sample or component count outside what a raster can hold
    #[error(
        "Unsupported raster geometry: {component_count} component(s) at {bits_per_sample} bits"
    )]
    UnsupportedGeometry {
        bits_per_sample: i32,
        component_count: i32,
    },

    /// Sample buffer does not match the declared geometry
    #[error("Buffer size mismatch: expected {expected}, got {actual}")]
    BufferSize { expected: usize, actual: usize },

    /// The codec engine rejected its input or failed internally
    #[error("{engine} codec error: {message}")]
    Codec {
        engine: &'static str,
        message: String,
    },

    /// The harness configuration file is malformed
    #[error("Invalid configuration {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn codec(engine: &'static str, message: impl Into<String>) -> Self {
        Self::Codec {
            engine,
            message: message.into(),
        }
    }
}
