//! # jls-conformance
//!
//! Round-trip conformance testing for JPEG-LS codecs.
//!
//! Every reference raster below a directory is encoded, written out as a
//! `.jls` stream, decoded again and compared with the original samples.
//! Color references are checked under all three interleave modes.
//!
//! ## Engines
//!
//! - **identity**: stores samples uncompressed, for checking the harness itself
//! - **charls**: the CharLS library (cargo feature `charls`)
//!
//! ## Quick Start
//!
//! ```no_run
//! use jls_conformance::{ConsoleReporter, Harness, HarnessConfig, IdentityCodec};
//! use std::path::Path;
//!
//! let config = HarnessConfig::default();
//! let mut reporter = ConsoleReporter;
//! let mut harness = Harness::new(&IdentityCodec, &config, &mut reporter);
//!
//! let summary = harness.run_directory(Path::new("test-images")).unwrap();
//! assert!(summary.passed());
//! ```

pub mod batch;
pub mod check;
pub mod codec;
pub mod config;
pub mod error;
pub mod interleave;
pub mod patterns;
pub mod raster;
pub mod report;
pub mod verify;

pub use batch::{BatchSummary, RasterKind};
pub use check::{Harness, TestOutcome};
pub use codec::{Codec, FrameDecoder, FrameEncoder, FrameInfo, IdentityCodec};
pub use config::{HarnessConfig, NearLosslessVerification};
pub use error::{Error, Result};
pub use interleave::InterleaveMode;
pub use raster::RasterImage;
pub use report::{ConsoleReporter, Reporter};
pub use verify::{Verdict, Verification};

#[cfg(feature = "charls")]
pub use codec::CharlsCodec;

/// Version of jls-conformance
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
