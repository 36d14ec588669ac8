//! Render-list primitives.
//!
//! The viewer never touches a GPU; each frame it emits a flat list of
//! [`Blit`] commands in normalized viewport coordinates, and the host
//! renderer walks the list in order.

/// RGBA color multiplier, components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha.
    pub a: f32,
}

impl Color {
    /// Opaque white (identity multiplier).
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);

    /// Builds a color from components.
    #[inline]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Gray at the given level, fully opaque.
    #[inline]
    pub const fn gray(level: f32) -> Self {
        Self::rgba(level, level, level, 1.0)
    }

    /// Parses `#rrggbb` (as used by overlay text color escapes).
    pub fn from_hex(text: &str) -> Option<Self> {
        let digits = text.strip_prefix('#')?;
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let parse = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map(|v| f32::from(v) / 255.0)
        };
        Some(Self {
            r: parse(0..2).ok()?,
            g: parse(2..4).ok()?,
            b: parse(4..6).ok()?,
            a: 1.0,
        })
    }

    /// Scales the color channels (not alpha) by `factor`.
    #[must_use]
    pub fn dimmed(self, factor: f32) -> Self {
        Self {
            r: self.r * factor,
            g: self.g * factor,
            b: self.b * factor,
            a: self.a,
        }
    }

    /// Returns the color with alpha replaced.
    #[must_use]
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

/// Axis-aligned rectangle, `(x, y)` top-left.
///
/// Used both for normalized blit geometry and for pixel-space control
/// hit areas; the coordinate space is the caller's.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RectF {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub w: f32,
    /// Height.
    pub h: f32,
}

impl RectF {
    /// Builds a rect from position and size.
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// True when `(px, py)` lies inside the rect.
    #[inline]
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px < self.x + self.w && py >= self.y && py < self.y + self.h
    }

    /// This rect with every component divided by the viewport size.
    #[must_use]
    pub fn normalized(&self, viewport: (f32, f32)) -> Self {
        Self {
            x: self.x / viewport.0,
            y: self.y / viewport.1,
            w: self.w / viewport.0,
            h: self.h / viewport.1,
        }
    }
}

/// What a blit samples from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlitKind {
    /// Sample the prepared image; `src` is the normalized source rect.
    Image {
        /// Normalized source rect within the prepared image.
        src: RectF,
    },
    /// Solid fill of the destination rect.
    Fill,
    /// Sample the glyph atlas; `src` is the glyph's normalized atlas rect.
    Text {
        /// Normalized source rect within the glyph atlas.
        src: RectF,
    },
}

/// One render command: draw `kind` into `dst`, multiplied by `color`.
///
/// `dst` is normalized to the viewport (`0..1` on both axes).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blit {
    /// Normalized destination rect.
    pub dst: RectF,
    /// Color multiplier.
    pub color: Color,
    /// Source of the blit.
    pub kind: BlitKind,
}

impl Blit {
    /// Full-image blit of the prepared image into `dst`.
    pub fn image(dst: RectF) -> Self {
        Self {
            dst,
            color: Color::WHITE,
            kind: BlitKind::Image {
                src: RectF::new(0.0, 0.0, 1.0, 1.0),
            },
        }
    }

    /// Solid fill.
    pub fn fill(dst: RectF, color: Color) -> Self {
        Self {
            dst,
            color,
            kind: BlitKind::Fill,
        }
    }

    /// Glyph blit.
    pub fn text(dst: RectF, src: RectF, color: Color) -> Self {
        Self {
            dst,
            color,
            kind: BlitKind::Text { src },
        }
    }
}
