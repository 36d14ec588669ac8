//! Fixed monospace glyph table.
//!
//! Text rendering uses a baked ASCII atlas: a 16x6 grid of equal cells
//! covering codes 32..=126. The table is a fixed array indexed by
//! character code, so lookup is a bounds check and never a search.

use crate::blit::RectF;

/// First character in the atlas (space).
pub const FIRST_CHAR: u32 = 32;

/// Last character in the atlas (tilde).
pub const LAST_CHAR: u32 = 126;

/// Number of glyphs in the atlas.
pub const GLYPH_COUNT: usize = (LAST_CHAR - FIRST_CHAR + 1) as usize;

/// Atlas columns.
const COLS: u32 = 16;

/// Cell size in atlas pixels.
const CELL_W: u32 = 16;
const CELL_H: u32 = 32;

/// Atlas rows (last row may be partially used).
const ROWS: u32 = (GLYPH_COUNT as u32 + COLS - 1) / COLS;

/// Atlas texture dimensions in pixels.
pub const ATLAS_WIDTH: u32 = COLS * CELL_W;
/// Atlas texture dimensions in pixels.
pub const ATLAS_HEIGHT: u32 = ROWS * CELL_H;

/// Nominal line height in layout pixels at scale 1.
pub const LINE_HEIGHT: f32 = CELL_H as f32;

/// One atlas glyph, in atlas pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    /// Cell origin within the atlas.
    pub x: u16,
    /// Cell origin within the atlas.
    pub y: u16,
    /// Cell size.
    pub width: u16,
    /// Cell size.
    pub height: u16,
    /// Horizontal pen advance after this glyph.
    pub advance: u16,
}

impl Glyph {
    /// Atlas rect normalized to texture coordinates.
    pub fn atlas_rect(&self) -> RectF {
        RectF::new(
            f32::from(self.x) / ATLAS_WIDTH as f32,
            f32::from(self.y) / ATLAS_HEIGHT as f32,
            f32::from(self.width) / ATLAS_WIDTH as f32,
            f32::from(self.height) / ATLAS_HEIGHT as f32,
        )
    }
}

const fn build_table() -> [Glyph; GLYPH_COUNT] {
    let mut table = [Glyph {
        x: 0,
        y: 0,
        width: CELL_W as u16,
        height: CELL_H as u16,
        advance: CELL_W as u16,
    }; GLYPH_COUNT];
    let mut i = 0;
    while i < GLYPH_COUNT {
        let col = (i as u32) % COLS;
        let row = (i as u32) / COLS;
        table[i].x = (col * CELL_W) as u16;
        table[i].y = (row * CELL_H) as u16;
        i += 1;
    }
    table
}

static GLYPHS: [Glyph; GLYPH_COUNT] = build_table();

/// Looks up the glyph for `c`, `None` outside the printable ASCII range.
#[inline]
pub fn glyph(c: char) -> Option<&'static Glyph> {
    let index = (c as u32).checked_sub(FIRST_CHAR)?;
    GLYPHS.get(index as usize)
}

/// Advance width of `text` in layout pixels at the given line height.
///
/// Escape sequences are not interpreted here; callers measuring colored
/// text should strip escapes first.
pub fn measure(text: &str, height: f32) -> f32 {
    let scale = height / LINE_HEIGHT;
    text.chars()
        .filter_map(glyph)
        .map(|g| f32::from(g.advance) * scale)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn covers_printable_ascii() {
        assert!(glyph(' ').is_some());
        assert!(glyph('~').is_some());
        assert!(glyph('A').is_some());
        assert!(glyph('\n').is_none());
        assert!(glyph('\u{00e9}').is_none());
    }

    #[test]
    fn cells_tile_the_atlas() {
        let a = glyph('!').unwrap();
        let space = glyph(' ').unwrap();
        assert_eq!(a.x, space.x + space.width);
        assert_eq!(a.y, space.y);

        // Row wrap after 16 columns: '0' is glyph 16.
        let zero = glyph('0').unwrap();
        assert_eq!(zero.x, 0);
        assert_eq!(u32::from(zero.y), CELL_H);
    }

    #[test]
    fn atlas_rects_stay_normalized() {
        let g = glyph('~').unwrap();
        let r = g.atlas_rect();
        assert!(r.x + r.w <= 1.0 + f32::EPSILON);
        assert!(r.y + r.h <= 1.0 + f32::EPSILON);
    }

    #[test]
    fn measure_scales_with_height() {
        let w32 = measure("abc", LINE_HEIGHT);
        let w16 = measure("abc", LINE_HEIGHT / 2.0);
        assert_relative_eq!(w32, 2.0 * w16);
        assert_relative_eq!(w32, 3.0 * CELL_W as f32);
    }
}
