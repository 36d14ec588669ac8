//! Decoded image handles.
//!
//! [`ImageData`] is the opaque currency between the viewer and the
//! pipeline: RGBA16 interleaved pixels behind an `Arc` (cloning an image
//! shares the buffer), plus the attached [`Profile`] and source bit
//! depth.

use std::sync::Arc;

use crate::profile::Profile;

/// Number of channels in every pipeline buffer (RGBA).
pub const CHANNELS: usize = 4;

/// A decoded or derived image: RGBA16 pixels plus color metadata.
#[derive(Debug, Clone)]
pub struct ImageData {
    width: u32,
    height: u32,
    /// Source bit depth per channel (8/10/12/16); buffers are always
    /// stored at 16 bits regardless.
    depth: u8,
    profile: Profile,
    pixels: Arc<Vec<u16>>,
}

impl ImageData {
    /// Creates an image from an existing RGBA16 buffer.
    ///
    /// The buffer length must be `width * height * 4`; a mismatched
    /// buffer is a caller bug and panics in debug builds only.
    pub fn new(width: u32, height: u32, depth: u8, profile: Profile, pixels: Vec<u16>) -> Self {
        debug_assert_eq!(pixels.len(), (width as usize) * (height as usize) * CHANNELS);
        Self {
            width,
            height,
            depth,
            profile,
            pixels: Arc::new(pixels),
        }
    }

    /// Solid-color image, mostly useful for tests and placeholders.
    pub fn solid(width: u32, height: u32, depth: u8, profile: Profile, rgba: [u16; 4]) -> Self {
        let count = (width as usize) * (height as usize);
        let mut pixels = Vec::with_capacity(count * CHANNELS);
        for _ in 0..count {
            pixels.extend_from_slice(&rgba);
        }
        Self::new(width, height, depth, profile, pixels)
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)` convenience accessor.
    #[inline]
    pub fn dims(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Source bit depth per channel.
    #[inline]
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Attached color profile.
    #[inline]
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Total pixel count.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Shared RGBA16 buffer, as handed to the GPU uploader.
    #[inline]
    pub fn pixels(&self) -> &Arc<Vec<u16>> {
        &self.pixels
    }

    /// Raw channel values at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u16; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * CHANNELS;
        let p = &self.pixels[idx..idx + CHANNELS];
        Some([p[0], p[1], p[2], p[3]])
    }
}

/// Result of a decode call.
#[derive(Debug, Clone)]
pub struct Decoded {
    /// The decoded image.
    pub image: ImageData,
    /// Container/codec name reported by the decoder ("avif", "png", ...).
    pub format_name: String,
    /// Frame that was decoded (0 for still images).
    pub frame_index: u32,
    /// Total frames in the stream (1 for still images).
    pub frame_count: u32,
}

/// Probe values for a single pixel, as shown in the info pane.
#[derive(Debug, Clone, Copy, Default)]
pub struct PixelInfo {
    /// Raw channel code values.
    pub raw: [u16; 4],
    /// CIE x chromaticity.
    pub x: f32,
    /// CIE y chromaticity.
    pub y: f32,
    /// Absolute luminance in nits.
    pub luminance: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_fill_and_pixel_access() {
        let img = ImageData::solid(4, 2, 8, Profile::sdr(80), [1, 2, 3, 4]);
        assert_eq!(img.dims(), (4, 2));
        assert_eq!(img.pixel_count(), 8);
        assert_eq!(img.pixel(3, 1), Some([1, 2, 3, 4]));
        assert_eq!(img.pixel(4, 0), None);
        assert_eq!(img.pixel(0, 2), None);
    }

    #[test]
    fn clone_shares_buffer() {
        let img = ImageData::solid(16, 16, 16, Profile::sdr(100), [0; 4]);
        let copy = img.clone();
        assert!(Arc::ptr_eq(img.pixels(), copy.pixels()));
    }
}
