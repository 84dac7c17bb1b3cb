//! Codec engine seam
//!
//! The harness never encodes or decodes by itself. It drives an engine through
//! these traits, the same sequence of calls regardless of which library sits
//! behind them.

use crate::error::Result;
use crate::interleave::InterleaveMode;

pub mod identity;

#[cfg(feature = "charls")]
pub mod charls;

pub use identity::IdentityCodec;

#[cfg(feature = "charls")]
pub use self::charls::CharlsCodec;

/// Frame geometry shared by encoder and decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameInfo {
    pub width: u32,
    pub height: u32,
    pub bits_per_sample: i32,
    pub component_count: i32,
}

/// An engine able to produce encoders and decoders
pub trait Codec {
    /// Short engine name used in diagnostics
    fn name(&self) -> &'static str;

    /// Create an encoder configured for one frame
    fn encoder(
        &self,
        frame: FrameInfo,
        interleave_mode: InterleaveMode,
        near_lossless: i32,
    ) -> Result<Box<dyn FrameEncoder>>;

    /// Create a decoder over `source`, reading its header
    fn decoder<'a>(&self, source: &'a [u8]) -> Result<Box<dyn FrameDecoder + 'a>>;
}

/// Encoder for a single frame
pub trait FrameEncoder {
    /// Upper bound of the encoded size
    fn estimated_destination_size(&self) -> Result<usize>;

    /// Encode `source` into `destination`, returning the bytes written
    fn encode(&mut self, source: &[u8], destination: &mut [u8]) -> Result<usize>;
}

/// Decoder over one encoded bitstream whose header has been read
pub trait FrameDecoder {
    fn frame_info(&self) -> FrameInfo;

    /// Near-lossless bound the stream was encoded with
    fn near_lossless(&self) -> i32;

    /// Exact buffer size `decode` needs
    fn destination_size(&self) -> Result<usize>;

    fn decode(&mut self, destination: &mut [u8]) -> Result<()>;
}
