//! Per-frame render-list construction.
//!
//! `render` is the single per-frame entry point: it advances the load
//! sequencer, keeps the prepared image current, and emits the frame's
//! blit list plus the control hit areas that pointer events consult
//! until the next frame.

use lux_pipeline::Pipeline;

use crate::blit::{Blit, Color, RectF};
use crate::control::{ActiveControl, SliderId, SliderValue};
use crate::glyph;
use crate::loader::{human_size, short_name, LoadRequest, SequencerStep};
use crate::transfer::surface_text_level;
use crate::viewer::Viewer;

const MARGIN: f32 = 10.0;
const TEXT_HEIGHT: f32 = 18.0;
const LINE_SPACING: f32 = 21.0;
const INFO_WIDTH: f32 = 360.0;
const SLIDER_WIDTH: f32 = 220.0;
const SLIDER_HEIGHT: f32 = 18.0;
const SLIDER_HANDLE_WIDTH: f32 = 8.0;

/// Lines at which the info pane gets a backing panel.
const INFO_PANEL_THRESHOLD: usize = 3;

/// Everything the host draws for one frame.
#[derive(Debug, Default)]
pub struct Frame {
    /// Blit commands, in draw order.
    pub blits: Vec<Blit>,
    /// Control hit areas registered by this frame.
    pub controls: Vec<ActiveControl>,
}

/// Lays out one line of text, handling backtick color escapes.
///
/// `` `` `` resets to the base color; `` ` ``+`#rrggbb` overrides it until
/// the next reset. Escapes advance no pen distance.
pub(crate) fn push_text(
    blits: &mut Vec<Blit>,
    viewport: (f32, f32),
    text: &str,
    x: f32,
    y: f32,
    height: f32,
    base: Color,
) {
    let scale = height / glyph::LINE_HEIGHT;
    let mut pen_x = x;
    let mut color = base;
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '`' {
            if chars.get(i + 1) == Some(&'`') {
                color = base;
                i += 2;
                continue;
            }
            if chars.get(i + 1) == Some(&'#') && i + 8 <= chars.len() {
                let code: String = chars[i + 1..i + 8].iter().collect();
                if let Some(override_color) = Color::from_hex(&code) {
                    // Overrides inherit the base intensity and fade.
                    color = override_color.dimmed(base.r).with_alpha(base.a);
                }
                i += 8;
                continue;
            }
            i += 1;
            continue;
        }
        if let Some(g) = glyph::glyph(chars[i]) {
            let dst = RectF::new(
                pen_x,
                y,
                f32::from(g.width) * scale,
                f32::from(g.height) * scale,
            );
            blits.push(Blit::text(dst.normalized(viewport), g.atlas_rect(), color));
            pen_x += f32::from(g.advance) * scale;
        }
        i += 1;
    }
}

/// Drawable characters of `text` with color escapes removed, for width
/// measurement.
fn visible_text(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '`' {
            if chars.get(i + 1) == Some(&'`') {
                i += 2;
            } else if chars.get(i + 1) == Some(&'#') && i + 8 <= chars.len() {
                i += 8;
            } else {
                i += 1;
            }
            continue;
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

fn format_slider_value(value: SliderValue) -> String {
    match value {
        SliderValue::Int { value, .. } => value.to_string(),
        SliderValue::Float { value, .. } => format!("{value:.3}"),
    }
}

fn percent(part: usize, total: usize) -> f32 {
    if total == 0 {
        0.0
    } else {
        part as f32 / total as f32 * 100.0
    }
}

impl<P: Pipeline> Viewer<P> {
    /// Builds the frame. Call once per host frame, unconditionally.
    pub fn render(&mut self) -> Frame {
        let viewport = self.viewport();
        let mut frame = Frame::default();

        match self.sequencer.tick() {
            SequencerStep::Announce(request) => {
                let level = surface_text_level(1.0, self.hdr_output(), self.sdr_white());
                let color = Color::gray(level);
                let lines = self.announce_lines(&request);
                for (i, line) in lines.iter().enumerate() {
                    push_text(
                        &mut frame.blits,
                        viewport,
                        line,
                        MARGIN,
                        MARGIN + i as f32 * LINE_SPACING,
                        TEXT_HEIGHT,
                        color,
                    );
                }
                self.active_controls.clear();
                return frame;
            }
            SequencerStep::Load(request) => self.perform(request),
            SequencerStep::Idle => {}
        }

        self.ensure_prepared_current();

        if self.prepared_image().is_some() {
            frame
                .blits
                .push(Blit::image(self.transform.rect().normalized(viewport)));
        }

        self.rebuild_info();

        if self.overlay.visible() {
            let fade = self.overlay.fade();
            let level = surface_text_level(fade, self.hdr_output(), self.sdr_white());
            let text_color = Color::gray(level).with_alpha(fade);

            if self.info.len() > INFO_PANEL_THRESHOLD {
                let panel = RectF::new(viewport.0 - INFO_WIDTH, 0.0, INFO_WIDTH, viewport.1);
                frame.blits.push(Blit::fill(
                    panel.normalized(viewport),
                    Color::rgba(0.0, 0.0, 0.0, 0.5 * fade),
                ));
            }

            // Status line, bottom-left.
            let mut status = format!("SDR: {} nits", self.sdr_white());
            if let Some(peak) = self.hlg_peak() {
                status.push_str(&format!(", HLG peak: {peak} nits"));
            }
            let hdr_state = if self.platform.hdr_active {
                "Active"
            } else if self.platform.hdr_available {
                "Inactive"
            } else {
                "Unavailable"
            };
            status.push_str(&format!(", HDR: {hdr_state}"));
            push_text(
                &mut frame.blits,
                viewport,
                &status,
                MARGIN,
                viewport.1 - MARGIN - TEXT_HEIGHT,
                TEXT_HEIGHT,
                text_color,
            );

            // Overlay messages, top-left.
            for (i, line) in self.overlay.lines().iter().enumerate() {
                push_text(
                    &mut frame.blits,
                    viewport,
                    line,
                    MARGIN,
                    MARGIN + i as f32 * LINE_SPACING,
                    TEXT_HEIGHT,
                    text_color,
                );
            }

            let slider_top =
                MARGIN + (self.overlay.lines().len() as f32 + 1.0) * LINE_SPACING;
            self.push_sliders(&mut frame, viewport, slider_top, level, fade, text_color);

            // Info pane, right-aligned against the viewport edge.
            let right = viewport.0 - MARGIN;
            let mut y = viewport.1 - MARGIN - self.info.len() as f32 * LINE_SPACING;
            for line in &self.info {
                let x = right - glyph::measure(&visible_text(line), TEXT_HEIGHT);
                push_text(
                    &mut frame.blits,
                    viewport,
                    line,
                    x,
                    y,
                    TEXT_HEIGHT,
                    text_color,
                );
                y += LINE_SPACING;
            }
        }

        self.active_controls = frame.controls.clone();
        frame
    }

    fn announce_lines(&self, request: &LoadRequest) -> Vec<String> {
        match request {
            LoadRequest::Single { offset } => {
                let count = self.file_count();
                if count == 0 {
                    return vec!["No files to load".to_string()];
                }
                let index =
                    (self.file_index as i64 + i64::from(*offset)).rem_euclid(count as i64) as usize;
                let name = self
                    .files
                    .get(index)
                    .map(|p| short_name(p))
                    .unwrap_or_default();
                vec![format!("Loading [{}/{}]: {name}", index + 1, count)]
            }
            LoadRequest::Diff { first, second } => vec![
                "Loading diff:".to_string(),
                format!("* 1: {}", short_name(first)),
                format!("* 2: {}", short_name(second)),
            ],
            LoadRequest::Frame { index } => vec![format!("Loading frame {}...", index + 1)],
        }
    }

    fn push_sliders(
        &self,
        frame: &mut Frame,
        viewport: (f32, f32),
        top: f32,
        level: f32,
        fade: f32,
        text_color: Color,
    ) {
        let mut shown: Vec<SliderId> = Vec::new();
        if self.tonemap_forced {
            shown.extend([
                SliderId::TonemapLuminance,
                SliderId::TonemapContrast,
                SliderId::TonemapClipPoint,
                SliderId::TonemapSpeed,
                SliderId::TonemapPower,
            ]);
        }
        if self.srgb_highlight {
            shown.push(SliderId::HighlightLuminance);
        }
        if self.unspecified_source() {
            shown.push(SliderId::UnspecLuminance);
        }
        if self.frame_count() > 1 {
            shown.push(SliderId::VideoFrame);
        }

        let mut y = top;
        for id in shown {
            let slider = *self.slider(id);
            let label = format!("{}: {}", id.label(), format_slider_value(slider.value));
            push_text(
                &mut frame.blits,
                viewport,
                &label,
                MARGIN,
                y,
                TEXT_HEIGHT,
                text_color,
            );
            y += TEXT_HEIGHT + 2.0;

            let track = RectF::new(MARGIN, y, SLIDER_WIDTH, SLIDER_HEIGHT);
            frame.blits.push(Blit::fill(
                track.normalized(viewport),
                Color::gray(level * 0.25).with_alpha(0.8 * fade),
            ));
            let handle_x =
                track.x + slider.value.fraction() * (track.w - SLIDER_HANDLE_WIDTH);
            let handle = RectF::new(handle_x, track.y, SLIDER_HANDLE_WIDTH, track.h);
            frame.blits.push(Blit::fill(
                handle.normalized(viewport),
                Color::gray(level).with_alpha(fade),
            ));
            frame.controls.push(ActiveControl { id, rect: track });
            y += SLIDER_HEIGHT + MARGIN;
        }
    }

    fn rebuild_info(&mut self) {
        let mut info = Vec::new();
        let Some(primary) = &self.primary else {
            self.info = info;
            return;
        };
        let image = &primary.image;
        info.push(format!(
            "{}x{}, {} bpc, {}",
            image.width(),
            image.height(),
            image.depth(),
            primary.format_name
        ));
        info.push(format!("Profile: {}", image.profile().describe()));
        info.push(format!("Size: {}", human_size(primary.file_size)));
        if self.frame_count() > 1 {
            info.push(format!(
                "Frame: {}/{}",
                self.frame_index() + 1,
                self.frame_count()
            ));
        }
        if self.secondary.is_some() {
            info.push(format!("Showing: {}", self.selection.label()));
        }

        if let Some(diff) = &self.diff {
            info.push(String::new());
            info.push(format!("Diff threshold: {}", self.diff_threshold));
            info.push(format!(
                "`#7fff7f Match: {} ({:.1}%)``",
                diff.match_count,
                percent(diff.match_count, diff.pixel_count)
            ));
            info.push(format!(
                "`#ffff7f Under: {} ({:.1}%)``",
                diff.under_threshold_count,
                percent(diff.under_threshold_count, diff.pixel_count)
            ));
            info.push(format!(
                "`#ff7f7f Over: {} ({:.1}%)``",
                diff.over_threshold_count,
                percent(diff.over_threshold_count, diff.pixel_count)
            ));
            info.push(format!("Largest diff: {}", diff.largest_channel_diff));
        }

        if let Some(highlight) = &self.highlight {
            let stats = &highlight.stats;
            info.push(String::new());
            info.push("sRGB highlight:".to_string());
            info.push(format!(
                "`#ff7f7f Overbright: {} ({:.1}%)``",
                stats.overbright_pixel_count,
                percent(stats.overbright_pixel_count, stats.pixel_count)
            ));
            info.push(format!(
                "`#7f7fff Out of gamut: {} ({:.1}%)``",
                stats.out_of_gamut_pixel_count,
                percent(stats.out_of_gamut_pixel_count, stats.pixel_count)
            ));
            info.push(format!(
                "Both: {} ({:.1}%)",
                stats.both_pixel_count,
                percent(stats.both_pixel_count, stats.pixel_count)
            ));
            info.push(format!(
                "HDR pixels: {} ({:.1}%)",
                stats.hdr_pixel_count,
                percent(stats.hdr_pixel_count, stats.pixel_count)
            ));
            info.push(format!(
                "Brightest: {:.0} nits @ {},{}",
                stats.brightest_pixel_nits, stats.brightest_pixel_x, stats.brightest_pixel_y
            ));
        }

        if let Some((px, py)) = self.probe {
            info.push(String::new());
            info.push(format!("Pixel: {px}, {py}"));
            if let Some(pixel) = &self.probe_primary {
                let r = pixel.raw;
                info.push(format!("  raw: {} {} {} {}", r[0], r[1], r[2], r[3]));
                info.push(format!(
                    "  xyY: {:.4} {:.4} {:.2} nits",
                    pixel.x, pixel.y, pixel.luminance
                ));
            }
            if let Some(pixel) = &self.probe_secondary {
                let r = pixel.raw;
                info.push(format!("  raw 2: {} {} {} {}", r[0], r[1], r[2], r[3]));
                info.push(format!(
                    "  xyY 2: {:.4} {:.4} {:.2} nits",
                    pixel.x, pixel.y, pixel.luminance
                ));
            }
            if let Some(diff) = &self.diff {
                let magnitude = diff.diff_at(px, py).unwrap_or(0);
                let color = if magnitude == 0 {
                    "`#7fff7f"
                } else if magnitude < self.diff_threshold {
                    "`#ffff7f"
                } else {
                    "`#ff7f7f"
                };
                info.push(format!("  {color} diff: {magnitude}``"));
            }
        }

        self.info = info;
    }

    fn unspecified_source(&self) -> bool {
        self.primary
            .as_ref()
            .is_some_and(|s| s.image.profile().max_luminance == 0)
    }
}
