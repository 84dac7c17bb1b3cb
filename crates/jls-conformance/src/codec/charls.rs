//! CharLS engine
//!
//! Binds the CharLS C API of the system library. Handles are owned by the
//! encoder and decoder wrappers and destroyed when those drop.

#![allow(non_camel_case_types)]

use super::{Codec, FrameDecoder, FrameEncoder, FrameInfo};
use crate::error::{Error, Result};
use crate::interleave::InterleaveMode;
use std::ffi::CStr;
use std::marker::PhantomData;
use std::os::raw::{c_char, c_void};
use std::ptr::NonNull;

const ENGINE: &str = "charls";

#[repr(C)]
struct charls_jpegls_encoder {
    _private: [u8; 0],
}

#[repr(C)]
struct charls_jpegls_decoder {
    _private: [u8; 0],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
struct charls_frame_info {
    width: u32,
    height: u32,
    bits_per_sample: i32,
    component_count: i32,
}

/// `charls_jpegls_errc`, zero on success
type charls_jpegls_errc = i32;

#[link(name = "charls")]
unsafe extern "C" {
    fn charls_get_error_message(error_value: i32) -> *const c_char;

    fn charls_jpegls_encoder_create() -> *mut charls_jpegls_encoder;
    fn charls_jpegls_encoder_destroy(encoder: *const charls_jpegls_encoder);
    fn charls_jpegls_encoder_set_frame_info(
        encoder: *mut charls_jpegls_encoder,
        frame_info: *const charls_frame_info,
    ) -> charls_jpegls_errc;
    fn charls_jpegls_encoder_set_near_lossless(
        encoder: *mut charls_jpegls_encoder,
        near_lossless: i32,
    ) -> charls_jpegls_errc;
    fn charls_jpegls_encoder_set_interleave_mode(
        encoder: *mut charls_jpegls_encoder,
        interleave_mode: i32,
    ) -> charls_jpegls_errc;
    fn charls_jpegls_encoder_get_estimated_destination_size(
        encoder: *const charls_jpegls_encoder,
        size_in_bytes: *mut usize,
    ) -> charls_jpegls_errc;
    fn charls_jpegls_encoder_set_destination_buffer(
        encoder: *mut charls_jpegls_encoder,
        destination_buffer: *mut c_void,
        destination_size: usize,
    ) -> charls_jpegls_errc;
    fn charls_jpegls_encoder_encode_from_buffer(
        encoder: *mut charls_jpegls_encoder,
        source_buffer: *const c_void,
        source_size: usize,
        stride: u32,
    ) -> charls_jpegls_errc;
    fn charls_jpegls_encoder_get_bytes_written(
        encoder: *const charls_jpegls_encoder,
        bytes_written: *mut usize,
    ) -> charls_jpegls_errc;

    fn charls_jpegls_decoder_create() -> *mut charls_jpegls_decoder;
    fn charls_jpegls_decoder_destroy(decoder: *const charls_jpegls_decoder);
    fn charls_jpegls_decoder_set_source_buffer(
        decoder: *mut charls_jpegls_decoder,
        source_buffer: *const c_void,
        source_size: usize,
    ) -> charls_jpegls_errc;
    fn charls_jpegls_decoder_read_header(decoder: *mut charls_jpegls_decoder) -> charls_jpegls_errc;
    fn charls_jpegls_decoder_get_frame_info(
        decoder: *const charls_jpegls_decoder,
        frame_info: *mut charls_frame_info,
    ) -> charls_jpegls_errc;
    fn charls_jpegls_decoder_get_near_lossless(
        decoder: *const charls_jpegls_decoder,
        component: i32,
        near_lossless: *mut i32,
    ) -> charls_jpegls_errc;
    fn charls_jpegls_decoder_get_destination_size(
        decoder: *const charls_jpegls_decoder,
        stride: u32,
        destination_size: *mut usize,
    ) -> charls_jpegls_errc;
    fn charls_jpegls_decoder_decode_to_buffer(
        decoder: *mut charls_jpegls_decoder,
        destination_buffer: *mut c_void,
        destination_size: usize,
        stride: u32,
    ) -> charls_jpegls_errc;
}

fn check(errc: charls_jpegls_errc) -> Result<()> {
    if errc == 0 {
        return Ok(());
    }

    // SAFETY: CharLS returns a pointer to a static, NUL-terminated string.
    let message = unsafe { charls_get_error_message(errc) };
    let message = if message.is_null() {
        format!("error code {errc}")
    } else {
        let text = unsafe { CStr::from_ptr(message) }.to_string_lossy();
        format!("{text} (error code {errc})")
    };
    Err(Error::codec(ENGINE, message))
}

/// CharLS as a codec engine
#[derive(Debug, Clone, Copy, Default)]
pub struct CharlsCodec;

impl Codec for CharlsCodec {
    fn name(&self) -> &'static str {
        ENGINE
    }

    fn encoder(
        &self,
        frame: FrameInfo,
        interleave_mode: InterleaveMode,
        near_lossless: i32,
    ) -> Result<Box<dyn FrameEncoder>> {
        let handle = NonNull::new(unsafe { charls_jpegls_encoder_create() })
            .ok_or_else(|| Error::codec(ENGINE, "failed to create encoder"))?;
        let encoder = CharlsEncoder { handle };

        let frame_info = charls_frame_info {
            width: frame.width,
            height: frame.height,
            bits_per_sample: frame.bits_per_sample,
            component_count: frame.component_count,
        };
        // SAFETY: the handle is live until `encoder` drops, arguments outlive the calls.
        unsafe {
            check(charls_jpegls_encoder_set_frame_info(encoder.raw(), &frame_info))?;
            check(charls_jpegls_encoder_set_interleave_mode(
                encoder.raw(),
                i32::from(interleave_mode.to_raw()),
            ))?;
            check(charls_jpegls_encoder_set_near_lossless(encoder.raw(), near_lossless))?;
        }

        Ok(Box::new(encoder))
    }

    fn decoder<'a>(&self, source: &'a [u8]) -> Result<Box<dyn FrameDecoder + 'a>> {
        let handle = NonNull::new(unsafe { charls_jpegls_decoder_create() })
            .ok_or_else(|| Error::codec(ENGINE, "failed to create decoder"))?;
        let mut decoder = CharlsDecoder {
            handle,
            frame: FrameInfo::default(),
            near_lossless: 0,
            _source: PhantomData,
        };

        let mut frame_info = charls_frame_info::default();
        let mut near_lossless = 0;
        // SAFETY: `source` outlives the decoder through the `'a` lifetime it carries.
        unsafe {
            check(charls_jpegls_decoder_set_source_buffer(
                decoder.raw(),
                source.as_ptr().cast(),
                source.len(),
            ))?;
            check(charls_jpegls_decoder_read_header(decoder.raw()))?;
            check(charls_jpegls_decoder_get_frame_info(decoder.raw(), &mut frame_info))?;
            check(charls_jpegls_decoder_get_near_lossless(
                decoder.raw(),
                0,
                &mut near_lossless,
            ))?;
        }

        decoder.frame = FrameInfo {
            width: frame_info.width,
            height: frame_info.height,
            bits_per_sample: frame_info.bits_per_sample,
            component_count: frame_info.component_count,
        };
        decoder.near_lossless = near_lossless;
        Ok(Box::new(decoder))
    }
}

struct CharlsEncoder {
    handle: NonNull<charls_jpegls_encoder>,
}

impl CharlsEncoder {
    fn raw(&self) -> *mut charls_jpegls_encoder {
        self.handle.as_ptr()
    }
}

impl FrameEncoder for CharlsEncoder {
    fn estimated_destination_size(&self) -> Result<usize> {
        let mut size = 0;
        check(unsafe { charls_jpegls_encoder_get_estimated_destination_size(self.raw(), &mut size) })?;
        Ok(size)
    }

    fn encode(&mut self, source: &[u8], destination: &mut [u8]) -> Result<usize> {
        let mut written = 0;
        // SAFETY: both buffers stay borrowed for the whole encode.
        unsafe {
            check(charls_jpegls_encoder_set_destination_buffer(
                self.raw(),
                destination.as_mut_ptr().cast(),
                destination.len(),
            ))?;
            check(charls_jpegls_encoder_encode_from_buffer(
                self.raw(),
                source.as_ptr().cast(),
                source.len(),
                0,
            ))?;
            check(charls_jpegls_encoder_get_bytes_written(self.raw(), &mut written))?;
        }
        Ok(written)
    }
}

impl Drop for CharlsEncoder {
    fn drop(&mut self) {
        unsafe { charls_jpegls_encoder_destroy(self.raw()) }
    }
}

struct CharlsDecoder<'a> {
    handle: NonNull<charls_jpegls_decoder>,
    frame: FrameInfo,
    near_lossless: i32,
    _source: PhantomData<&'a [u8]>,
}

impl CharlsDecoder<'_> {
    fn raw(&self) -> *mut charls_jpegls_decoder {
        self.handle.as_ptr()
    }
}

impl FrameDecoder for CharlsDecoder<'_> {
    fn frame_info(&self) -> FrameInfo {
        self.frame
    }

    fn near_lossless(&self) -> i32 {
        self.near_lossless
    }

    fn destination_size(&self) -> Result<usize> {
        let mut size = 0;
        check(unsafe { charls_jpegls_decoder_get_destination_size(self.raw(), 0, &mut size) })?;
        Ok(size)
    }

    fn decode(&mut self, destination: &mut [u8]) -> Result<()> {
        check(unsafe {
            charls_jpegls_decoder_decode_to_buffer(
                self.raw(),
                destination.as_mut_ptr().cast(),
                destination.len(),
                0,
            )
        })
    }
}

impl Drop for CharlsDecoder<'_> {
    fn drop(&mut self) {
        unsafe { charls_jpegls_decoder_destroy(self.raw()) }
    }
}
