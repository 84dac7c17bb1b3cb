//! Synthetic reference images
//!
//! Deterministic rasters for exercising the harness without a reference
//! corpus, and a PNM writer to turn them into files the loader reads back.

use crate::error::{Error, Result};
use crate::interleave::sample_size;
use crate::raster::RasterImage;
use image::ExtendedColorType;
use image::codecs::pnm::{GraymapHeader, PixmapHeader, PnmEncoder, PnmHeader, SampleEncoding};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Test pattern types
#[derive(Debug, Clone, Copy)]
pub enum TestPattern {
    /// Horizontal ramp over the full sample range, shifted per component
    GradientH,
    /// 4x4 blocks alternating between zero and full scale
    Checker,
    /// Every sample equal, clamped to the sample range
    Constant(u16),
    /// Uniform noise with seed, incompressible
    Random(u64),
}

/// Common test sizes
pub mod sizes {
    pub const TINY: (u32, u32) = (4, 4);
    pub const SMALL: (u32, u32) = (32, 24);
    /// Odd dimensions to catch row-stride mistakes
    pub const ODD: (u32, u32) = (17, 9);
}

/// Sample encoding of a written PNM file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PnmEncoding {
    Binary,
    Ascii,
}

/// Generate a pixel-interleaved raster of 1 or 3 components at 1 to 16 bits
pub fn generate_raster(
    pattern: TestPattern,
    width: u32,
    height: u32,
    component_count: i32,
    bits_per_sample: i32,
) -> Result<RasterImage> {
    if !(1..=16).contains(&bits_per_sample) || !matches!(component_count, 1 | 3) {
        return Err(Error::UnsupportedGeometry {
            bits_per_sample,
            component_count,
        });
    }

    let max_value = ((1u32 << bits_per_sample) - 1) as u16;
    let components = component_count as usize;
    let (w, h) = (width as usize, height as usize);
    let mut samples = Vec::with_capacity(w * h * components);

    match pattern {
        TestPattern::GradientH => {
            let range = u32::from(max_value) + 1;
            for _y in 0..h {
                for x in 0..w {
                    let base = x as u32 * u32::from(max_value) / w.saturating_sub(1).max(1) as u32;
                    for c in 0..components {
                        samples.push(((base + c as u32 * range / 3) % range) as u16);
                    }
                }
            }
        }
        TestPattern::Checker => {
            for y in 0..h {
                for x in 0..w {
                    let v = if (x / 4 + y / 4) % 2 == 0 { max_value } else { 0 };
                    samples.extend(std::iter::repeat_n(v, components));
                }
            }
        }
        TestPattern::Constant(value) => {
            samples.resize(w * h * components, value.min(max_value));
        }
        TestPattern::Random(seed) => {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            for _ in 0..w * h * components {
                samples.push(rng.gen_range(0..=max_value));
            }
        }
    }

    let pixels = if sample_size(bits_per_sample) == 2 {
        bytemuck::cast_slice::<u16, u8>(&samples).to_vec()
    } else {
        samples.iter().map(|&v| v as u8).collect()
    };

    RasterImage::new(width, height, bits_per_sample, component_count, pixels)
}

/// Write `image` as a PGM (one component) or PPM (three components).
///
/// The maxval is the largest value of the raster's bit depth, so a 12-bit
/// raster is written with maxval 4095 and loads back unchanged.
pub fn write_pnm(image: &RasterImage, path: &Path, encoding: PnmEncoding) -> Result<()> {
    let (width, height) = (image.width(), image.height());
    let max_value = (1u32 << image.bits_per_sample()) - 1;
    let deep = sample_size(image.bits_per_sample()) == 2;
    let encoding = match encoding {
        PnmEncoding::Binary => SampleEncoding::Binary,
        PnmEncoding::Ascii => SampleEncoding::Ascii,
    };

    let header: PnmHeader = match image.component_count() {
        1 => GraymapHeader {
            encoding,
            height,
            width,
            maxwhite: max_value,
        }
        .into(),
        3 => PixmapHeader {
            encoding,
            height,
            width,
            maxval: max_value,
        }
        .into(),
        _ => {
            return Err(Error::UnsupportedLayout {
                path: path.to_path_buf(),
                layout: format!(
                    "{} component(s) at {} bits",
                    image.component_count(),
                    image.bits_per_sample()
                ),
            });
        }
    };

    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut writer = BufWriter::new(file);
    let image_error = |source| Error::Image {
        path: path.to_path_buf(),
        source,
    };

    let words: Vec<u16> = image
        .pixels()
        .chunks_exact(2)
        .map(|w| u16::from_ne_bytes([w[0], w[1]]))
        .collect();

    match (image.component_count(), deep) {
        // The PNM encoder only writes 8-bit pixmaps
        (3, true) => write_wide_pixmap(&mut writer, &header, &words, encoding)
            .map_err(|e| Error::io(path, e))?,
        (1, true) => PnmEncoder::new(&mut writer)
            .with_header(header)
            .encode(words.as_slice(), width, height, ExtendedColorType::L16)
            .map_err(image_error)?,
        (1, false) => PnmEncoder::new(&mut writer)
            .with_header(header)
            .encode(image.pixels(), width, height, ExtendedColorType::L8)
            .map_err(image_error)?,
        _ => PnmEncoder::new(&mut writer)
            .with_header(header)
            .encode(image.pixels(), width, height, ExtendedColorType::Rgb8)
            .map_err(image_error)?,
    }

    writer.flush().map_err(|e| Error::io(path, e))
}

/// Pixmap with two bytes per sample: header, then big-endian words or one
/// ASCII pixel per line.
fn write_wide_pixmap(
    writer: &mut impl Write,
    header: &PnmHeader,
    words: &[u16],
    encoding: SampleEncoding,
) -> std::io::Result<()> {
    header.write(writer)?;
    match encoding {
        SampleEncoding::Binary => {
            for word in words {
                writer.write_all(&word.to_be_bytes())?;
            }
        }
        SampleEncoding::Ascii => {
            for pixel in words.chunks_exact(3) {
                writeln!(writer, "{} {} {}", pixel[0], pixel[1], pixel[2])?;
            }
        }
    }
    Ok(())
}
