//! Single-mode and multi-mode checks
//!
//! A single-mode check runs one reference through load, optional planar
//! transform, encode, write-out, decode and compare. A color reference is
//! checked once per interleave mode.

use crate::codec::Codec;
use crate::config::HarnessConfig;
use crate::error::{Error, Result};
use crate::interleave::InterleaveMode;
use crate::raster;
use crate::report::Reporter;
use crate::verify::{Verdict, verify_round_trip};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Metrics and verdict of one encode/decode round trip
#[derive(Debug, Clone)]
pub struct TestOutcome {
    pub mode: InterleaveMode,
    pub verdict: Verdict,
    /// Reference size in bytes
    pub original_size: usize,
    /// Encoded stream size in bytes
    pub encoded_size: usize,
    /// `original_size / encoded_size`
    pub compression_ratio: f64,
    /// Near-lossless bound reported by the decoder
    pub near_lossless: i32,
    pub encode_duration: Duration,
    pub decode_duration: Duration,
}

impl TestOutcome {
    pub fn passed(&self) -> bool {
        self.verdict.passed()
    }
}

/// Path the encoded stream of `source` is written to, e.g. `image-line.jls`
pub fn output_path(source: &Path, mode: InterleaveMode) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    source.with_file_name(format!("{}-{}.jls", stem, mode.as_str()))
}

/// Runs checks against one codec engine
pub struct Harness<'a> {
    codec: &'a dyn Codec,
    config: &'a HarnessConfig,
    reporter: &'a mut dyn Reporter,
}

impl<'a> Harness<'a> {
    pub fn new(
        codec: &'a dyn Codec,
        config: &'a HarnessConfig,
        reporter: &'a mut dyn Reporter,
    ) -> Self {
        Self {
            codec,
            config,
            reporter,
        }
    }

    pub fn config(&self) -> &HarnessConfig {
        self.config
    }

    pub(crate) fn reporter(&mut self) -> &mut (dyn Reporter + 'a) {
        &mut *self.reporter
    }

    /// Check `source` under a single interleave mode.
    ///
    /// `color` only affects the width of the mode column in the report.
    pub fn check_file(
        &mut self,
        source: &Path,
        mode: InterleaveMode,
        color: bool,
    ) -> Result<TestOutcome> {
        let reference = raster::load_reference_for(source, mode)?;

        let (encoded, encode_duration) = {
            let frame = reference.frame_info();
            let mut encoder = self.codec.encoder(frame, mode, self.config.near_lossless)?;
            let mut encoded = vec![0u8; encoder.estimated_destination_size()?];

            let start = Instant::now();
            let encoded_size = encoder.encode(reference.pixels(), &mut encoded)?;
            let encode_duration = start.elapsed();

            encoded.truncate(encoded_size);
            (encoded, encode_duration)
        };

        if self.config.write_encoded {
            let destination = output_path(source, mode);
            std::fs::write(&destination, &encoded).map_err(|e| Error::io(&destination, e))?;
            log::debug!("wrote {} ({} bytes)", destination.display(), encoded.len());
        }

        let original_size = reference.pixels().len();
        let compression_ratio = original_size as f64 / encoded.len() as f64;

        let verification = verify_round_trip(
            self.codec,
            &encoded,
            reference.pixels(),
            reference.bits_per_sample(),
            self.config.near_lossless_verification,
        )?;

        if !verification.verdict.passed() {
            log::debug!("{}: {:?}", source.display(), verification.verdict);
            self.reporter.mismatch(&verification.verdict);
        }

        let outcome = TestOutcome {
            mode,
            verdict: verification.verdict,
            original_size,
            encoded_size: encoded.len(),
            compression_ratio,
            near_lossless: verification.near_lossless,
            encode_duration,
            decode_duration: verification.decode_duration,
        };
        self.reporter.outcome(&outcome, color);

        Ok(outcome)
    }

    /// Check a color reference under every interleave mode, stopping at the
    /// first mode that fails.
    pub fn check_color_file(&mut self, source: &Path) -> Result<bool> {
        for mode in InterleaveMode::ALL {
            if !self.check_file(source, mode, true)?.passed() {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
