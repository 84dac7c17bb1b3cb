//! Reference raster images
//!
//! A [`RasterImage`] is the uncompressed ground truth a check encodes and
//! expects back. Samples are pixel-interleaved as loaded; depths above 8 bits
//! are stored as native-endian 16-bit words.

use crate::codec::FrameInfo;
use crate::error::{Error, Result};
use crate::interleave::{self, InterleaveMode, sample_size};
use image::codecs::pnm::PnmDecoder;
use image::{DynamicImage, ImageError};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Uncompressed raster with its geometry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    bits_per_sample: i32,
    component_count: i32,
    pixels: Vec<u8>,
}

impl RasterImage {
    /// Wrap a sample buffer, checking it matches the geometry
    pub fn new(
        width: u32,
        height: u32,
        bits_per_sample: i32,
        component_count: i32,
        pixels: Vec<u8>,
    ) -> Result<Self> {
        if !(1..=16).contains(&bits_per_sample) || component_count < 1 {
            return Err(Error::UnsupportedGeometry {
                bits_per_sample,
                component_count,
            });
        }

        let expected = Self::expected_len(width, height, bits_per_sample, component_count);
        if pixels.len() != expected {
            return Err(Error::BufferSize {
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            bits_per_sample,
            component_count,
            pixels,
        })
    }

    /// Buffer length implied by a geometry
    pub fn expected_len(width: u32, height: u32, bits_per_sample: i32, component_count: i32) -> usize {
        width as usize
            * height as usize
            * component_count.max(0) as usize
            * sample_size(bits_per_sample)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bits_per_sample(&self) -> i32 {
        self.bits_per_sample
    }

    pub fn component_count(&self) -> i32 {
        self.component_count
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Geometry as handed to a codec
    pub fn frame_info(&self) -> FrameInfo {
        FrameInfo {
            width: self.width,
            height: self.height,
            bits_per_sample: self.bits_per_sample,
            component_count: self.component_count,
        }
    }

    /// Rearrange samples into component planes
    pub fn make_planar(&mut self) {
        interleave::triplet_to_planar(
            &mut self.pixels,
            self.width as usize,
            self.height as usize,
            self.bits_per_sample,
        );
    }
}

/// Load a portable anymap (PGM or PPM, ASCII or binary).
///
/// Bits per sample follow the file's maxval, so a maxval of 4095 loads as
/// 12 bits. Sample values are returned exactly as stored.
pub fn load_reference(path: &Path) -> Result<RasterImage> {
    let image_error = |source: ImageError| Error::Image {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let decoder = PnmDecoder::new(BufReader::new(file)).map_err(image_error)?;
    let max_value = decoder.header().maximal_sample();
    if max_value == 0 {
        return Err(Error::UnsupportedLayout {
            path: path.to_path_buf(),
            layout: "maxval 0".into(),
        });
    }
    let bits_per_sample = (u32::BITS - max_value.leading_zeros()) as i32;

    let decoded = DynamicImage::from_decoder(decoder).map_err(image_error)?;
    let (width, height) = (decoded.width(), decoded.height());
    let (component_count, pixels) = match decoded {
        DynamicImage::ImageLuma8(buffer) => (1, narrow_to_max(buffer.into_raw(), max_value)),
        DynamicImage::ImageRgb8(buffer) => (3, narrow_to_max(buffer.into_raw(), max_value)),
        DynamicImage::ImageLuma16(buffer) => (1, wide_to_max(buffer.into_raw(), max_value)),
        DynamicImage::ImageRgb16(buffer) => (3, wide_to_max(buffer.into_raw(), max_value)),
        other => {
            return Err(Error::UnsupportedLayout {
                path: path.to_path_buf(),
                layout: format!("{:?}", other.color()),
            });
        }
    };

    log::debug!(
        "loaded {}: {}x{}, maxval {}, {} bits, {} component(s)",
        path.display(),
        width,
        height,
        max_value,
        bits_per_sample,
        component_count
    );

    RasterImage::new(width, height, bits_per_sample, component_count, pixels)
}

/// Load a reference laid out to match a stream encoded with `mode`
pub fn load_reference_for(path: &Path, mode: InterleaveMode) -> Result<RasterImage> {
    let mut image = load_reference(path)?;
    if interleave::needs_planar_transform(mode, image.component_count()) {
        image.make_planar();
    }
    Ok(image)
}

/// Map a sample the decoder stretched onto `0..=container_max` back onto
/// `0..=max_value`.
fn restore_sample(value: u32, max_value: u32, container_max: u32) -> u32 {
    let (value, max_value, container_max) = (
        u64::from(value),
        u64::from(max_value),
        u64::from(container_max),
    );
    ((value * max_value + container_max / 2) / container_max) as u32
}

fn narrow_to_max(mut samples: Vec<u8>, max_value: u32) -> Vec<u8> {
    let container_max = u32::from(u8::MAX);
    if max_value != container_max {
        for sample in &mut samples {
            *sample = restore_sample(u32::from(*sample), max_value, container_max) as u8;
        }
    }
    samples
}

fn wide_to_max(mut samples: Vec<u16>, max_value: u32) -> Vec<u8> {
    let container_max = u32::from(u16::MAX);
    if max_value != container_max {
        for sample in &mut samples {
            *sample = restore_sample(u32::from(*sample), max_value, container_max) as u16;
        }
    }
    bytemuck::cast_slice::<u16, u8>(&samples).to_vec()
}
