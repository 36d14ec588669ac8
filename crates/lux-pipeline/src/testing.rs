//! In-memory pipeline for tests.
//!
//! [`FakePipeline`] serves registered synthetic images keyed by path,
//! computes honest diff statistics over the RGBA16 buffers, and counts
//! every call so tests can assert how often the viewer rebuilt a derived
//! image.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::diff::DiffResult;
use crate::error::{PipelineError, Result};
use crate::highlight::{HighlightPixel, HighlightResult, HighlightStats};
use crate::image::{Decoded, ImageData, PixelInfo, CHANNELS};
use crate::pipeline::Pipeline;
use crate::tonemap::ConvertRequest;

/// A registered source: what `decode` returns for one path.
#[derive(Debug, Clone)]
struct Source {
    image: ImageData,
    format_name: String,
    frame_count: u32,
}

/// Deterministic, in-memory [`Pipeline`] implementation.
///
/// Interior mutability keeps the trait's `&self` signatures; the viewer
/// model is single-threaded by design so `Cell`/`RefCell` suffice.
#[derive(Debug, Default)]
pub struct FakePipeline {
    sources: RefCell<HashMap<PathBuf, Source>>,
    fail_conversion: Cell<bool>,
    decode_calls: Cell<usize>,
    convert_calls: Cell<usize>,
    diff_calls: Cell<usize>,
    highlight_calls: Cell<usize>,
}

impl FakePipeline {
    /// Creates an empty fake.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a still image for `path`.
    pub fn add_image(&self, path: impl Into<PathBuf>, image: ImageData) {
        self.add_stream(path, image, 1);
    }

    /// Registers a multi-frame stream for `path`; every frame decodes to
    /// the same image.
    pub fn add_stream(&self, path: impl Into<PathBuf>, image: ImageData, frame_count: u32) {
        self.sources.borrow_mut().insert(
            path.into(),
            Source {
                image,
                format_name: "fake".into(),
                frame_count,
            },
        );
    }

    /// Makes every subsequent `convert` call fail.
    pub fn fail_conversions(&self, fail: bool) {
        self.fail_conversion.set(fail);
    }

    /// Number of `decode` calls so far.
    pub fn decode_count(&self) -> usize {
        self.decode_calls.get()
    }

    /// Number of `convert` calls so far.
    pub fn convert_count(&self) -> usize {
        self.convert_calls.get()
    }

    /// Number of `diff` calls so far.
    pub fn diff_count(&self) -> usize {
        self.diff_calls.get()
    }

    /// Number of `highlight` calls so far.
    pub fn highlight_count(&self) -> usize {
        self.highlight_calls.get()
    }
}

impl Pipeline for FakePipeline {
    fn decode(&self, path: &Path, frame_index: u32) -> Result<Decoded> {
        self.decode_calls.set(self.decode_calls.get() + 1);
        let sources = self.sources.borrow();
        let source = sources
            .get(path)
            .ok_or_else(|| PipelineError::decode(path, "no such source"))?;
        if frame_index >= source.frame_count {
            return Err(PipelineError::UnsupportedFrame {
                requested: frame_index,
                available: source.frame_count,
            });
        }
        Ok(Decoded {
            image: source.image.clone(),
            format_name: source.format_name.clone(),
            frame_index,
            frame_count: source.frame_count,
        })
    }

    fn convert(&self, image: &ImageData, request: &ConvertRequest) -> Result<ImageData> {
        self.convert_calls.set(self.convert_calls.get() + 1);
        if self.fail_conversion.get() {
            return Err(PipelineError::conversion("conversion disabled by test"));
        }
        // No color math in the fake: re-tag the buffer with the
        // destination profile and depth.
        Ok(ImageData::new(
            image.width(),
            image.height(),
            request.depth,
            request.profile,
            image.pixels().as_ref().clone(),
        ))
    }

    fn diff(
        &self,
        first: &ImageData,
        second: &ImageData,
        _min_intensity: f32,
        threshold: u16,
    ) -> Result<DiffResult> {
        self.diff_calls.set(self.diff_calls.get() + 1);
        if first.dims() != second.dims() {
            return Err(PipelineError::conversion("diff dimension mismatch"));
        }

        let a = first.pixels();
        let b = second.pixels();
        let pixel_count = first.pixel_count();
        let mut diffs = Vec::with_capacity(pixel_count);
        let mut match_count = 0usize;
        let mut under = 0usize;
        let mut over = 0usize;
        let mut largest = 0u16;

        for i in 0..pixel_count {
            let base = i * CHANNELS;
            let mut pixel_diff = 0u16;
            for c in 0..CHANNELS {
                let d = a[base + c].abs_diff(b[base + c]);
                pixel_diff = pixel_diff.max(d);
            }
            largest = largest.max(pixel_diff);
            if pixel_diff == 0 {
                match_count += 1;
            } else if pixel_diff < threshold {
                under += 1;
            } else {
                over += 1;
            }
            diffs.push(pixel_diff);
        }

        Ok(DiffResult {
            image: ImageData::new(
                first.width(),
                first.height(),
                16,
                *first.profile(),
                a.as_ref().clone(),
            ),
            diffs,
            match_count,
            under_threshold_count: under,
            over_threshold_count: over,
            largest_channel_diff: largest,
            pixel_count,
        })
    }

    fn highlight(&self, image: &ImageData, reference_luminance: u32) -> Result<HighlightResult> {
        self.highlight_calls.set(self.highlight_calls.get() + 1);
        let max_nits = reference_luminance as f32;
        let source_peak = match image.profile().max_luminance {
            0 => max_nits,
            nits => nits as f32,
        };

        let pixel_count = image.pixel_count();
        let buffer = image.pixels();
        let mut pixels = Vec::with_capacity(pixel_count);
        let mut stats = HighlightStats {
            pixel_count,
            ..Default::default()
        };

        for i in 0..pixel_count {
            let base = i * CHANNELS;
            let max_channel = buffer[base].max(buffer[base + 1]).max(buffer[base + 2]);
            let nits = f32::from(max_channel) / f32::from(u16::MAX) * source_peak;
            if nits > max_nits {
                stats.overbright_pixel_count += 1;
                stats.hdr_pixel_count += 1;
            }
            if nits > stats.brightest_pixel_nits {
                stats.brightest_pixel_nits = nits;
                stats.brightest_pixel_x = (i % image.width() as usize) as u32;
                stats.brightest_pixel_y = (i / image.width() as usize) as u32;
            }
            pixels.push(HighlightPixel {
                nits,
                max_nits,
                out_of_gamut: 0.0,
            });
        }

        Ok(HighlightResult {
            image: ImageData::new(
                image.width(),
                image.height(),
                16,
                *image.profile(),
                buffer.as_ref().clone(),
            ),
            pixels,
            stats,
        })
    }

    fn pixel_info(&self, image: &ImageData, x: u32, y: u32) -> Option<PixelInfo> {
        let raw = image.pixel(x, y)?;
        let peak = match image.profile().max_luminance {
            0 => 100.0,
            nits => nits as f32,
        };
        let max_channel = raw[0].max(raw[1]).max(raw[2]);
        Some(PixelInfo {
            raw,
            x: 0.3127,
            y: 0.3290,
            luminance: f32::from(max_channel) / f32::from(u16::MAX) * peak,
        })
    }
}
