//! Shared fixtures and codec doubles for the integration tests

#![allow(dead_code)]

use jls_conformance::patterns::{PnmEncoding, TestPattern, generate_raster, write_pnm};
use jls_conformance::{
    Codec, FrameDecoder, FrameEncoder, FrameInfo, IdentityCodec, InterleaveMode, Reporter,
    Result, TestOutcome, Verdict,
};
use std::path::{Path, PathBuf};

/// Write a synthetic reference into `dir` and return its path
pub fn write_reference(
    dir: &Path,
    name: &str,
    pattern: TestPattern,
    (width, height): (u32, u32),
    component_count: i32,
    bits_per_sample: i32,
) -> PathBuf {
    let image = generate_raster(pattern, width, height, component_count, bits_per_sample)
        .expect("pattern geometry");
    let path = dir.join(name);
    write_pnm(&image, &path, PnmEncoding::Binary).expect("write reference");
    path
}

/// Progress event seen by [`RecordingReporter`]
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Checking(PathBuf),
    Mismatch(Verdict),
    Outcome { mode: InterleaveMode, passed: bool },
    Status { path: PathBuf, passed: bool },
}

#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub events: Vec<Event>,
    pub outcomes: Vec<TestOutcome>,
}

impl RecordingReporter {
    pub fn checked_paths(&self) -> Vec<PathBuf> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Checking(p) => Some(p.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn statuses(&self) -> Vec<(PathBuf, bool)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Status { path, passed } => Some((path.clone(), *passed)),
                _ => None,
            })
            .collect()
    }

    pub fn modes(&self) -> Vec<InterleaveMode> {
        self.outcomes.iter().map(|o| o.mode).collect()
    }
}

impl Reporter for RecordingReporter {
    fn checking(&mut self, path: &Path) {
        self.events.push(Event::Checking(path.to_path_buf()));
    }

    fn mismatch(&mut self, verdict: &Verdict) {
        self.events.push(Event::Mismatch(verdict.clone()));
    }

    fn outcome(&mut self, outcome: &TestOutcome, _color: bool) {
        self.events.push(Event::Outcome {
            mode: outcome.mode,
            passed: outcome.passed(),
        });
        self.outcomes.push(outcome.clone());
    }

    fn status(&mut self, path: &Path, passed: bool) {
        self.events.push(Event::Status {
            path: path.to_path_buf(),
            passed,
        });
    }
}

/// Identity engine whose decoder flips the first sample of frames with a
/// given width, or of frames under a given interleave mode.
pub struct DamagingCodec {
    pub width: Option<u32>,
    pub mode: Option<InterleaveMode>,
}

impl Codec for DamagingCodec {
    fn name(&self) -> &'static str {
        "damaging"
    }

    fn encoder(
        &self,
        frame: FrameInfo,
        interleave_mode: InterleaveMode,
        near_lossless: i32,
    ) -> Result<Box<dyn FrameEncoder>> {
        IdentityCodec.encoder(frame, interleave_mode, near_lossless)
    }

    fn decoder<'a>(&self, source: &'a [u8]) -> Result<Box<dyn FrameDecoder + 'a>> {
        let mode = source.get(14).copied().and_then(InterleaveMode::from_raw);
        let inner = IdentityCodec.decoder(source)?;
        let damage = self.width == Some(inner.frame_info().width)
            || (self.mode.is_some() && self.mode == mode);
        Ok(Box::new(DamagingDecoder { inner, damage }))
    }
}

struct DamagingDecoder<'a> {
    inner: Box<dyn FrameDecoder + 'a>,
    damage: bool,
}

impl FrameDecoder for DamagingDecoder<'_> {
    fn frame_info(&self) -> FrameInfo {
        self.inner.frame_info()
    }

    fn near_lossless(&self) -> i32 {
        self.inner.near_lossless()
    }

    fn destination_size(&self) -> Result<usize> {
        self.inner.destination_size()
    }

    fn decode(&mut self, destination: &mut [u8]) -> Result<()> {
        self.inner.decode(destination)?;
        if self.damage {
            if let Some(first) = destination.first_mut() {
                *first ^= 0xff;
            }
        }
        Ok(())
    }
}

/// Identity engine whose decoder adds `delta` to every 8-bit sample, like a
/// near-lossless codec using its error budget.
pub struct PerturbingCodec {
    pub delta: u8,
}

impl Codec for PerturbingCodec {
    fn name(&self) -> &'static str {
        "perturbing"
    }

    fn encoder(
        &self,
        frame: FrameInfo,
        interleave_mode: InterleaveMode,
        near_lossless: i32,
    ) -> Result<Box<dyn FrameEncoder>> {
        IdentityCodec.encoder(frame, interleave_mode, near_lossless)
    }

    fn decoder<'a>(&self, source: &'a [u8]) -> Result<Box<dyn FrameDecoder + 'a>> {
        let inner = IdentityCodec.decoder(source)?;
        Ok(Box::new(PerturbingDecoder {
            inner,
            delta: self.delta,
        }))
    }
}

struct PerturbingDecoder<'a> {
    inner: Box<dyn FrameDecoder + 'a>,
    delta: u8,
}

impl FrameDecoder for PerturbingDecoder<'_> {
    fn frame_info(&self) -> FrameInfo {
        self.inner.frame_info()
    }

    fn near_lossless(&self) -> i32 {
        self.inner.near_lossless()
    }

    fn destination_size(&self) -> Result<usize> {
        self.inner.destination_size()
    }

    fn decode(&mut self, destination: &mut [u8]) -> Result<()> {
        self.inner.decode(destination)?;
        for sample in destination.iter_mut() {
            *sample = if *sample > u8::MAX - self.delta {
                *sample - self.delta
            } else {
                *sample + self.delta
            };
        }
        Ok(())
    }
}

/// Identity engine whose decoder reports one byte less than the frame needs
pub struct ShortDecodeCodec;

impl Codec for ShortDecodeCodec {
    fn name(&self) -> &'static str {
        "short"
    }

    fn encoder(
        &self,
        frame: FrameInfo,
        interleave_mode: InterleaveMode,
        near_lossless: i32,
    ) -> Result<Box<dyn FrameEncoder>> {
        IdentityCodec.encoder(frame, interleave_mode, near_lossless)
    }

    fn decoder<'a>(&self, source: &'a [u8]) -> Result<Box<dyn FrameDecoder + 'a>> {
        Ok(Box::new(ShortDecoder {
            inner: IdentityCodec.decoder(source)?,
        }))
    }
}

struct ShortDecoder<'a> {
    inner: Box<dyn FrameDecoder + 'a>,
}

impl FrameDecoder for ShortDecoder<'_> {
    fn frame_info(&self) -> FrameInfo {
        self.inner.frame_info()
    }

    fn near_lossless(&self) -> i32 {
        self.inner.near_lossless()
    }

    fn destination_size(&self) -> Result<usize> {
        Ok(self.inner.destination_size()?.saturating_sub(1))
    }

    fn decode(&mut self, destination: &mut [u8]) -> Result<()> {
        let mut full = vec![0u8; self.inner.destination_size()?];
        self.inner.decode(&mut full)?;
        destination.copy_from_slice(&full[..destination.len()]);
        Ok(())
    }
}
