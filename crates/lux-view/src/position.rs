//! Image placement: fit-to-viewport sizing, panning, anchored zoom.

use crate::blit::RectF;

/// Minimum zoom scale (fit to viewport).
pub const MIN_SCALE: f32 = 1.0;

/// Maximum zoom scale.
pub const MAX_SCALE: f32 = 32.0;

/// Double-click zoom tiers, cycled in order and wrapping past the end.
pub const SCALE_TIERS: [f32; 6] = [1.0, 2.0, 4.0, 8.0, 16.0, 32.0];

/// Tier that follows `scale`: the successor of the largest tier at or
/// below `scale`, wrapping back to the first tier.
pub fn next_tier(scale: f32) -> f32 {
    let mut current = 0;
    for (i, &tier) in SCALE_TIERS.iter().enumerate() {
        if scale >= tier {
            current = i;
        }
    }
    SCALE_TIERS[(current + 1) % SCALE_TIERS.len()]
}

/// Where the image sits on screen.
///
/// `x, y, w, h` are viewport pixels; `scale` is the zoom factor on top
/// of the aspect-preserving fit. With no image loaded the rect collapses
/// to a unit square at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    /// Left edge in viewport pixels.
    pub x: f32,
    /// Top edge in viewport pixels.
    pub y: f32,
    /// On-screen width in pixels.
    pub w: f32,
    /// On-screen height in pixels.
    pub h: f32,
    /// Zoom factor, `1.0` = fit.
    pub scale: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            w: 1.0,
            h: 1.0,
            scale: MIN_SCALE,
        }
    }
}

impl ViewTransform {
    /// Aspect-preserving fit of `image` into `viewport`, scaled.
    fn fitted_size(image: (u32, u32), viewport: (f32, f32), scale: f32) -> (f32, f32) {
        let (iw, ih) = (image.0 as f32, image.1 as f32);
        let (vw, vh) = viewport;
        if iw <= 0.0 || ih <= 0.0 || vw <= 0.0 || vh <= 0.0 {
            return (1.0, 1.0);
        }
        let image_aspect = iw / ih;
        let view_aspect = vw / vh;
        let (base_w, base_h) = if image_aspect > view_aspect {
            (vw, vw / image_aspect)
        } else {
            (vh * image_aspect, vh)
        };
        (base_w * scale, base_h * scale)
    }

    fn center(&mut self, viewport: (f32, f32)) {
        self.x = (viewport.0 - self.w) / 2.0;
        self.y = (viewport.1 - self.h) / 2.0;
    }

    /// Fit scale, recompute size, and center. Used on image load and on
    /// viewport resize; a pan or zoom is intentionally discarded because
    /// the old placement is meaningless at the new size.
    pub fn reset(&mut self, image: Option<(u32, u32)>, viewport: (f32, f32)) {
        self.scale = MIN_SCALE;
        self.refit(image, viewport);
    }

    /// Recomputes size at the current scale and centers.
    pub fn refit(&mut self, image: Option<(u32, u32)>, viewport: (f32, f32)) {
        match image {
            Some(dims) => {
                let (w, h) = Self::fitted_size(dims, viewport, self.scale);
                self.w = w;
                self.h = h;
                self.center(viewport);
            }
            None => {
                *self = Self::default();
            }
        }
    }

    /// Sets the zoom scale while keeping the image point under `anchor`
    /// stationary on screen. Returning to fit scale recenters instead.
    pub fn set_scale_anchored(
        &mut self,
        scale: f32,
        anchor: (f32, f32),
        image: Option<(u32, u32)>,
        viewport: (f32, f32),
    ) {
        let Some(dims) = image else { return };
        let clamped = scale.clamp(MIN_SCALE, MAX_SCALE);
        let u = if self.w > 0.0 {
            (anchor.0 - self.x) / self.w
        } else {
            0.5
        };
        let v = if self.h > 0.0 {
            (anchor.1 - self.y) / self.h
        } else {
            0.5
        };
        self.scale = clamped;
        let (w, h) = Self::fitted_size(dims, viewport, clamped);
        self.w = w;
        self.h = h;
        if (clamped - MIN_SCALE).abs() < f32::EPSILON {
            self.center(viewport);
        } else {
            self.x = anchor.0 - u * w;
            self.y = anchor.1 - v * h;
        }
    }

    /// Additive wheel zoom anchored at the cursor.
    pub fn wheel_zoom(
        &mut self,
        anchor: (f32, f32),
        delta: f32,
        image: Option<(u32, u32)>,
        viewport: (f32, f32),
    ) {
        self.set_scale_anchored(self.scale + delta, anchor, image, viewport);
    }

    /// Double-click zoom: advance to the next scale tier, anchored.
    pub fn cycle_tier(
        &mut self,
        anchor: (f32, f32),
        image: Option<(u32, u32)>,
        viewport: (f32, f32),
    ) {
        self.set_scale_anchored(next_tier(self.scale), anchor, image, viewport);
    }

    /// Drag pan by a screen-space delta.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }

    /// Maps a viewport point to integer image coordinates, `None` when
    /// the point misses the image.
    pub fn image_coords(&self, point: (f32, f32), image: (u32, u32)) -> Option<(u32, u32)> {
        if self.w <= 0.0 || self.h <= 0.0 {
            return None;
        }
        let u = (point.0 - self.x) / self.w;
        let v = (point.1 - self.y) / self.h;
        if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
            return None;
        }
        let x = (u * image.0 as f32) as u32;
        let y = (v * image.1 as f32) as u32;
        Some((x.min(image.0 - 1), y.min(image.1 - 1)))
    }

    /// Current placement as a pixel-space rect.
    #[inline]
    pub fn rect(&self) -> RectF {
        RectF::new(self.x, self.y, self.w, self.h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const VIEW: (f32, f32) = (1920.0, 1080.0);
    const IMAGE: Option<(u32, u32)> = Some((3840, 2160));

    fn fitted() -> ViewTransform {
        let mut t = ViewTransform::default();
        t.reset(IMAGE, VIEW);
        t
    }

    #[test]
    fn reset_fits_and_centers() {
        let t = fitted();
        assert_relative_eq!(t.w, 1920.0);
        assert_relative_eq!(t.h, 1080.0);
        assert_relative_eq!(t.x, 0.0);
        assert_relative_eq!(t.y, 0.0);

        // Tall image pillarboxes.
        let mut tall = ViewTransform::default();
        tall.reset(Some((1080, 2160)), VIEW);
        assert_relative_eq!(tall.h, 1080.0);
        assert_relative_eq!(tall.w, 540.0);
        assert_relative_eq!(tall.x, (1920.0 - 540.0) / 2.0);
    }

    #[test]
    fn anchored_zoom_keeps_anchor_stationary() {
        let mut t = fitted();
        let anchor = (700.0, 400.0);
        let before = (
            (anchor.0 - t.x) / t.w * 3840.0,
            (anchor.1 - t.y) / t.h * 2160.0,
        );
        t.set_scale_anchored(5.0, anchor, IMAGE, VIEW);
        let after = (
            (anchor.0 - t.x) / t.w * 3840.0,
            (anchor.1 - t.y) / t.h * 2160.0,
        );
        assert_relative_eq!(before.0, after.0, epsilon = 1e-2);
        assert_relative_eq!(before.1, after.1, epsilon = 1e-2);
    }

    #[test]
    fn zoom_clamps_to_bounds() {
        let mut t = fitted();
        t.wheel_zoom((0.0, 0.0), 100.0, IMAGE, VIEW);
        assert_relative_eq!(t.scale, MAX_SCALE);
        t.wheel_zoom((0.0, 0.0), -100.0, IMAGE, VIEW);
        assert_relative_eq!(t.scale, MIN_SCALE);
    }

    #[test]
    fn returning_to_fit_recenters() {
        let mut t = fitted();
        t.set_scale_anchored(4.0, (10.0, 10.0), IMAGE, VIEW);
        t.pan(300.0, -200.0);
        t.set_scale_anchored(1.0, (10.0, 10.0), IMAGE, VIEW);
        assert_relative_eq!(t.x, 0.0);
        assert_relative_eq!(t.y, 0.0);
    }

    #[test]
    fn tier_cycle_wraps() {
        assert_relative_eq!(next_tier(1.0), 2.0);
        assert_relative_eq!(next_tier(2.0), 4.0);
        assert_relative_eq!(next_tier(31.0), 32.0);
        assert_relative_eq!(next_tier(32.0), 1.0);
        // Between tiers: successor of the tier at or below.
        assert_relative_eq!(next_tier(3.0), 4.0);
        assert_relative_eq!(next_tier(0.5), 2.0);
    }

    #[test]
    fn image_coords_round_trip() {
        let t = fitted();
        assert_eq!(t.image_coords((0.0, 0.0), (3840, 2160)), Some((0, 0)));
        assert_eq!(
            t.image_coords((1919.9, 1079.9), (3840, 2160)),
            Some((3839, 2159))
        );
        assert_eq!(t.image_coords((1920.0, 0.0), (3840, 2160)), None);
        assert_eq!(t.image_coords((-1.0, 0.0), (3840, 2160)), None);
    }

    #[test]
    fn no_image_collapses_to_unit_rect() {
        let mut t = fitted();
        t.refit(None, VIEW);
        assert_eq!(t, ViewTransform::default());
    }
}
