//! Stored-sample engine
//!
//! Writes the frame header followed by the raw samples. It has no compression
//! at all, which makes it a reference point for the harness itself: every
//! check must pass with it, and any failure points at the harness.

use super::{Codec, FrameDecoder, FrameEncoder, FrameInfo};
use crate::error::{Error, Result};
use crate::interleave::InterleaveMode;
use crate::raster::RasterImage;

const ENGINE: &str = "identity";

const MAGIC: [u8; 4] = *b"JLSI";

/// Header layout: magic, width, height, bits, components, interleave, near.
pub const HEADER_LEN: usize = 16;

/// Extra bytes in the size estimate, so callers must truncate to the
/// actual encoded size.
pub const ESTIMATE_SLACK: usize = 256;

#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityCodec;

impl Codec for IdentityCodec {
    fn name(&self) -> &'static str {
        ENGINE
    }

    fn encoder(
        &self,
        frame: FrameInfo,
        interleave_mode: InterleaveMode,
        near_lossless: i32,
    ) -> Result<Box<dyn FrameEncoder>> {
        if !(1..=16).contains(&frame.bits_per_sample) {
            return Err(Error::codec(
                ENGINE,
                format!("invalid bits per sample {}", frame.bits_per_sample),
            ));
        }
        if !(1..=255).contains(&frame.component_count) {
            return Err(Error::codec(
                ENGINE,
                format!("invalid component count {}", frame.component_count),
            ));
        }
        let near_lossless = u8::try_from(near_lossless).map_err(|_| {
            Error::codec(ENGINE, format!("invalid near-lossless value {near_lossless}"))
        })?;

        Ok(Box::new(IdentityEncoder {
            frame,
            interleave_mode,
            near_lossless,
        }))
    }

    fn decoder<'a>(&self, source: &'a [u8]) -> Result<Box<dyn FrameDecoder + 'a>> {
        IdentityDecoder::read_header(source).map(|d| Box::new(d) as Box<dyn FrameDecoder + 'a>)
    }
}

struct IdentityEncoder {
    frame: FrameInfo,
    interleave_mode: InterleaveMode,
    near_lossless: u8,
}

impl IdentityEncoder {
    fn payload_len(&self) -> usize {
        RasterImage::expected_len(
            self.frame.width,
            self.frame.height,
            self.frame.bits_per_sample,
            self.frame.component_count,
        )
    }
}

impl FrameEncoder for IdentityEncoder {
    fn estimated_destination_size(&self) -> Result<usize> {
        Ok(HEADER_LEN + self.payload_len() + ESTIMATE_SLACK)
    }

    fn encode(&mut self, source: &[u8], destination: &mut [u8]) -> Result<usize> {
        let payload_len = self.payload_len();
        if source.len() != payload_len {
            return Err(Error::codec(
                ENGINE,
                format!("source is {} bytes, frame needs {}", source.len(), payload_len),
            ));
        }

        let total = HEADER_LEN + payload_len;
        if destination.len() < total {
            return Err(Error::codec(ENGINE, "destination buffer too small"));
        }

        let header = &mut destination[..HEADER_LEN];
        header[0..4].copy_from_slice(&MAGIC);
        header[4..8].copy_from_slice(&self.frame.width.to_le_bytes());
        header[8..12].copy_from_slice(&self.frame.height.to_le_bytes());
        header[12] = self.frame.bits_per_sample as u8;
        header[13] = self.frame.component_count as u8;
        header[14] = self.interleave_mode.to_raw();
        header[15] = self.near_lossless;
        destination[HEADER_LEN..total].copy_from_slice(source);

        Ok(total)
    }
}

struct IdentityDecoder<'a> {
    frame: FrameInfo,
    near_lossless: i32,
    payload: &'a [u8],
}

impl<'a> IdentityDecoder<'a> {
    fn read_header(source: &'a [u8]) -> Result<Self> {
        if source.len() < HEADER_LEN || source[0..4] != MAGIC {
            return Err(Error::codec(ENGINE, "missing stream header"));
        }

        let word = |at: usize| {
            u32::from_le_bytes([source[at], source[at + 1], source[at + 2], source[at + 3]])
        };
        let frame = FrameInfo {
            width: word(4),
            height: word(8),
            bits_per_sample: i32::from(source[12]),
            component_count: i32::from(source[13]),
        };
        if InterleaveMode::from_raw(source[14]).is_none() {
            return Err(Error::codec(
                ENGINE,
                format!("invalid interleave mode {}", source[14]),
            ));
        }

        Ok(Self {
            frame,
            near_lossless: i32::from(source[15]),
            payload: &source[HEADER_LEN..],
        })
    }
}

impl FrameDecoder for IdentityDecoder<'_> {
    fn frame_info(&self) -> FrameInfo {
        self.frame
    }

    fn near_lossless(&self) -> i32 {
        self.near_lossless
    }

    fn destination_size(&self) -> Result<usize> {
        Ok(RasterImage::expected_len(
            self.frame.width,
            self.frame.height,
            self.frame.bits_per_sample,
            self.frame.component_count,
        ))
    }

    fn decode(&mut self, destination: &mut [u8]) -> Result<()> {
        let needed = self.destination_size()?;
        if self.payload.len() < needed {
            return Err(Error::codec(ENGINE, "bitstream is truncated"));
        }
        if destination.len() < needed {
            return Err(Error::codec(ENGINE, "destination buffer too small"));
        }
        destination[..needed].copy_from_slice(&self.payload[..needed]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(width: u32, height: u32, bits: i32, components: i32) -> FrameInfo {
        FrameInfo {
            width,
            height,
            bits_per_sample: bits,
            component_count: components,
        }
    }

    #[test]
    fn test_estimate_over_allocates() {
        let mut encoder = IdentityCodec
            .encoder(frame(4, 2, 8, 3), InterleaveMode::Line, 0)
            .unwrap();
        let estimate = encoder.estimated_destination_size().unwrap();
        let mut destination = vec![0u8; estimate];
        let written = encoder.encode(&[7u8; 24], &mut destination).unwrap();
        assert_eq!(written, HEADER_LEN + 24);
        assert!(estimate > written);
    }

    #[test]
    fn test_decoder_reports_header_fields() {
        let source = [3u8; 2 * 2 * 2];
        let mut encoder = IdentityCodec
            .encoder(frame(2, 2, 12, 1), InterleaveMode::None, 2)
            .unwrap();
        let mut encoded = vec![0u8; encoder.estimated_destination_size().unwrap()];
        let written = encoder.encode(&source, &mut encoded).unwrap();
        encoded.truncate(written);

        let mut decoder = IdentityCodec.decoder(&encoded).unwrap();
        assert_eq!(decoder.frame_info(), frame(2, 2, 12, 1));
        assert_eq!(decoder.near_lossless(), 2);

        let mut decoded = vec![0u8; decoder.destination_size().unwrap()];
        decoder.decode(&mut decoded).unwrap();
        assert_eq!(decoded, source);
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        assert!(IdentityCodec.encoder(frame(1, 1, 17, 1), InterleaveMode::None, 0).is_err());
        assert!(IdentityCodec.encoder(frame(1, 1, 8, 0), InterleaveMode::None, 0).is_err());
        assert!(IdentityCodec.encoder(frame(1, 1, 8, 1), InterleaveMode::None, -1).is_err());
    }

    #[test]
    fn test_rejects_foreign_stream() {
        assert!(IdentityCodec.decoder(&[0xff, 0xd8, 0xff, 0xf7]).is_err());
    }

    #[test]
    fn test_truncated_payload_fails_decode() {
        let mut encoder = IdentityCodec
            .encoder(frame(2, 1, 8, 1), InterleaveMode::None, 0)
            .unwrap();
        let mut encoded = vec![0u8; encoder.estimated_destination_size().unwrap()];
        let written = encoder.encode(&[1, 2], &mut encoded).unwrap();

        let shortened = &encoded[..written - 1];
        let mut decoder = IdentityCodec.decoder(shortened).unwrap();
        let mut decoded = vec![0u8; decoder.destination_size().unwrap()];
        assert!(decoder.decode(&mut decoded).is_err());
    }
}
