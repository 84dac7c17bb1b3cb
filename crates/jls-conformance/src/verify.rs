//! Round-trip verification
//!
//! Decodes an encoded bitstream and compares the result with the samples that
//! were handed to the encoder.

use crate::codec::Codec;
use crate::config::NearLosslessVerification;
use crate::error::Result;
use crate::interleave::sample_size;
use std::fmt;
use std::time::{Duration, Instant};

/// Outcome of comparing decoded samples with the reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    /// Decoded buffer length differs from the reference
    SizeMismatch { expected: usize, actual: usize },
    /// First differing byte of a lossless stream
    ValueMismatch { offset: usize, expected: u8, actual: u8 },
    /// First sample outside the near-lossless bound
    DeviationExceeded {
        sample: usize,
        expected: u16,
        actual: u16,
        bound: i32,
    },
}

impl Verdict {
    pub fn passed(&self) -> bool {
        matches!(self, Verdict::Passed)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Passed => write!(f, "Pixel data matches"),
            Verdict::SizeMismatch { .. } => write!(f, "Pixel data size doesn't match"),
            Verdict::ValueMismatch { .. } => write!(f, "Pixel data value doesn't match"),
            Verdict::DeviationExceeded { .. } => {
                write!(f, "Pixel data deviation exceeds near-lossless bound")
            }
        }
    }
}

/// Result of one decode-and-compare pass
#[derive(Debug, Clone)]
pub struct Verification {
    pub verdict: Verdict,
    /// Near-lossless bound read from the stream
    pub near_lossless: i32,
    /// Time spent in the decode call alone
    pub decode_duration: Duration,
}

/// Decode `encoded` and compare it with `original`.
///
/// Codec failures are errors. Disagreeing samples are reported through the
/// returned [`Verdict`].
pub fn verify_round_trip(
    codec: &dyn Codec,
    encoded: &[u8],
    original: &[u8],
    bits_per_sample: i32,
    policy: NearLosslessVerification,
) -> Result<Verification> {
    let mut decoder = codec.decoder(encoded)?;
    let mut decoded = vec![0u8; decoder.destination_size()?];

    let start = Instant::now();
    decoder.decode(&mut decoded)?;
    let decode_duration = start.elapsed();

    let near_lossless = decoder.near_lossless();
    log::debug!(
        "decoded {:?} with near-lossless {} in {:?}",
        decoder.frame_info(),
        near_lossless,
        decode_duration
    );

    let verdict = if decoded.len() != original.len() {
        Verdict::SizeMismatch {
            expected: original.len(),
            actual: decoded.len(),
        }
    } else if near_lossless == 0 {
        compare_exact(original, &decoded)
    } else {
        match policy {
            NearLosslessVerification::Bounded => {
                compare_bounded(original, &decoded, bits_per_sample, near_lossless)
            }
            NearLosslessVerification::Skip => Verdict::Passed,
        }
    };

    Ok(Verification {
        verdict,
        near_lossless,
        decode_duration,
    })
}

/// Byte-for-byte comparison, stopping at the first difference
pub fn compare_exact(original: &[u8], decoded: &[u8]) -> Verdict {
    match original.iter().zip(decoded).position(|(a, b)| a != b) {
        Some(offset) => Verdict::ValueMismatch {
            offset,
            expected: original[offset],
            actual: decoded[offset],
        },
        None => Verdict::Passed,
    }
}

/// Per-sample comparison allowing a deviation of at most `bound`
pub fn compare_bounded(original: &[u8], decoded: &[u8], bits_per_sample: i32, bound: i32) -> Verdict {
    let size = sample_size(bits_per_sample);
    let samples = original.chunks_exact(size).zip(decoded.chunks_exact(size));

    for (sample, (a, b)) in samples.enumerate() {
        let (expected, actual) = if size == 2 {
            (u16::from_ne_bytes([a[0], a[1]]), u16::from_ne_bytes([b[0], b[1]]))
        } else {
            (u16::from(a[0]), u16::from(b[0]))
        };

        if i32::from(expected.abs_diff(actual)) > bound {
            return Verdict::DeviationExceeded {
                sample,
                expected,
                actual,
                bound,
            };
        }
    }

    Verdict::Passed
}
