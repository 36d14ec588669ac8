//! sRGB highlight overlay results.
//!
//! A highlight pass classifies every pixel of the displayed image against
//! standard-gamut brightness at a reference luminance: overbright,
//! out-of-gamut, both, or plain HDR.

use crate::image::ImageData;

/// Per-pixel highlight classification values.
#[derive(Debug, Clone, Copy, Default)]
pub struct HighlightPixel {
    /// Pixel luminance in nits.
    pub nits: f32,
    /// Luminance this pixel would clip to in sRGB at the reference level.
    pub max_nits: f32,
    /// Out-of-gamut fraction (0 = inside standard gamut).
    pub out_of_gamut: f32,
}

/// Aggregate highlight statistics.
#[derive(Debug, Clone, Copy, Default)]
pub struct HighlightStats {
    /// Total pixels classified.
    pub pixel_count: usize,
    /// Pixels brighter than the sRGB ceiling.
    pub overbright_pixel_count: usize,
    /// Pixels outside the standard gamut.
    pub out_of_gamut_pixel_count: usize,
    /// Pixels that are both overbright and out of gamut.
    pub both_pixel_count: usize,
    /// Pixels requiring HDR to display faithfully.
    pub hdr_pixel_count: usize,
    /// Location of the brightest pixel.
    pub brightest_pixel_x: u32,
    /// Location of the brightest pixel.
    pub brightest_pixel_y: u32,
    /// Luminance of the brightest pixel in nits.
    pub brightest_pixel_nits: f32,
}

/// Result of a highlight pass.
#[derive(Debug, Clone)]
pub struct HighlightResult {
    /// Renderable overlay visualization.
    pub image: ImageData,
    /// Per-pixel classification, row-major.
    pub pixels: Vec<HighlightPixel>,
    /// Aggregate statistics.
    pub stats: HighlightStats,
}

impl HighlightResult {
    /// Per-pixel classification at `(x, y)`.
    pub fn pixel_at(&self, x: u32, y: u32) -> Option<&HighlightPixel> {
        if x >= self.image.width() || y >= self.image.height() {
            return None;
        }
        let idx = (y as usize) * (self.image.width() as usize) + (x as usize);
        self.pixels.get(idx)
    }
}
