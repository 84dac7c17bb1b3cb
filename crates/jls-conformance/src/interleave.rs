//! Interleave modes and the planar transform
//!
//! The reference loader always yields pixel-interleaved samples. To compare
//! against a stream encoded with [`InterleaveMode::None`] the reference has to
//! be rearranged into one plane per component first.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How multi-component samples are arranged in a buffer or bitstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterleaveMode {
    /// One complete plane per component
    #[default]
    None,
    /// Components grouped per row
    Line,
    /// Components grouped per pixel (the loader layout)
    Sample,
}

impl InterleaveMode {
    /// Modes a color reference is checked under, in check order
    pub const ALL: [InterleaveMode; 3] = [
        InterleaveMode::None,
        InterleaveMode::Line,
        InterleaveMode::Sample,
    ];

    /// Lowercase name, also used as the output file suffix
    pub fn as_str(self) -> &'static str {
        match self {
            InterleaveMode::None => "none",
            InterleaveMode::Line => "line",
            InterleaveMode::Sample => "sample",
        }
    }

    /// Numeric value as stored in a JPEG-LS scan header
    pub fn to_raw(self) -> u8 {
        match self {
            InterleaveMode::None => 0,
            InterleaveMode::Line => 1,
            InterleaveMode::Sample => 2,
        }
    }

    pub fn from_raw(value: u8) -> Option<Self> {
        match value {
            0 => Some(InterleaveMode::None),
            1 => Some(InterleaveMode::Line),
            2 => Some(InterleaveMode::Sample),
            _ => None,
        }
    }
}

impl fmt::Display for InterleaveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Bytes used to store one sample of the given depth
pub fn sample_size(bits_per_sample: i32) -> usize {
    if bits_per_sample > 8 { 2 } else { 1 }
}

/// Whether a reference must be made planar before it can be compared
/// against a stream encoded with `mode`.
///
/// Only three-component rasters are rearranged; planar is the identity for a
/// single component and other component counts are out of scope.
pub fn needs_planar_transform(mode: InterleaveMode, component_count: i32) -> bool {
    mode == InterleaveMode::None && component_count == 3
}

/// Rearrange a pixel-interleaved triplet buffer into three planes.
///
/// The buffer is replaced in place and keeps its length. Plane order follows
/// the input component order.
pub fn triplet_to_planar(buffer: &mut Vec<u8>, width: usize, height: usize, bits_per_sample: i32) {
    let size = sample_size(bits_per_sample);
    let samples_per_plane = width * height;
    let mut work = vec![0u8; buffer.len()];

    for i in 0..samples_per_plane {
        for component in 0..3 {
            let src = (i * 3 + component) * size;
            let dst = (i + component * samples_per_plane) * size;
            work[dst..dst + size].copy_from_slice(&buffer[src..src + size]);
        }
    }

    std::mem::swap(buffer, &mut work);
}
