//! The pipeline trait: everything the viewer asks of the color library.

use std::path::Path;

use crate::diff::DiffResult;
use crate::error::Result;
use crate::highlight::HighlightResult;
use crate::image::{Decoded, ImageData, PixelInfo};
use crate::tonemap::ConvertRequest;

/// Interface to the external color-management library.
///
/// All calls are synchronous and may be slow (the viewer's deferred-load
/// sequencer exists because of this). Implementations are expected to be
/// deterministic for a given input; the viewer caches derived results
/// and only re-invokes a method when one of its inputs changed.
pub trait Pipeline {
    /// Decodes a file, selecting `frame_index` for multi-frame streams
    /// (still images accept only frame 0).
    fn decode(&self, path: &Path, frame_index: u32) -> Result<Decoded>;

    /// Converts an image into the requested depth/profile, optionally
    /// tone-mapping per the request.
    fn convert(&self, image: &ImageData, request: &ConvertRequest) -> Result<ImageData>;

    /// Diffs two images of equal dimensions.
    ///
    /// `min_intensity` lifts dark-but-different pixels to at least that
    /// display intensity in the visualization; `threshold` is the
    /// per-channel magnitude below which pixels count as matching.
    fn diff(
        &self,
        first: &ImageData,
        second: &ImageData,
        min_intensity: f32,
        threshold: u16,
    ) -> Result<DiffResult>;

    /// Classifies pixels against sRGB at the given reference luminance.
    fn highlight(&self, image: &ImageData, reference_luminance: u32) -> Result<HighlightResult>;

    /// Probe values for a single pixel, `None` outside the image.
    fn pixel_info(&self, image: &ImageData, x: u32, y: u32) -> Option<PixelInfo>;
}
