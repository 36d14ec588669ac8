//! Image diff results.

use crate::image::ImageData;

/// Result of diffing two equally-sized images.
///
/// `image` is a visualization of per-pixel differences (rendered in the
/// first image's color volume); `diffs` holds the per-pixel largest
/// channel delta for probing.
#[derive(Debug, Clone)]
pub struct DiffResult {
    /// Renderable diff visualization.
    pub image: ImageData,
    /// Per-pixel largest channel difference, row-major.
    pub diffs: Vec<u16>,
    /// Pixels identical in every channel.
    pub match_count: usize,
    /// Pixels differing, but under the threshold.
    pub under_threshold_count: usize,
    /// Pixels differing at or over the threshold.
    pub over_threshold_count: usize,
    /// Largest single-channel difference anywhere in the pair.
    pub largest_channel_diff: u16,
    /// Total pixels compared.
    pub pixel_count: usize,
}

impl DiffResult {
    /// Per-pixel diff magnitude at `(x, y)`.
    pub fn diff_at(&self, x: u32, y: u32) -> Option<u16> {
        if x >= self.image.width() || y >= self.image.height() {
            return None;
        }
        let idx = (y as usize) * (self.image.width() as usize) + (x as usize);
        self.diffs.get(idx).copied()
    }
}
