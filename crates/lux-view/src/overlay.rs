//! Transient message overlay.
//!
//! Load results and keyboard feedback land here; lines show at full
//! intensity for a while, then fade out over the final second. Any user
//! activity kicks the timer so the overlay stays up while someone is
//! actually looking.

use std::time::{Duration, Instant};

/// How long overlay text stays up after the last kick.
pub const OVERLAY_DURATION: Duration = Duration::from_secs(30);

/// Fade-out tail at the end of the overlay duration.
pub const OVERLAY_FADE: Duration = Duration::from_secs(1);

/// Overlay intensity for a given time since the last kick: full until
/// the fade tail, linear to zero across it.
pub fn fade_for(elapsed: Duration) -> f32 {
    let total = OVERLAY_DURATION.as_secs_f32();
    let fade = OVERLAY_FADE.as_secs_f32();
    let t = elapsed.as_secs_f32();
    if t < total - fade {
        1.0
    } else if t < total {
        (total - t) / fade
    } else {
        0.0
    }
}

/// The overlay message stack.
#[derive(Debug, Default)]
pub struct Overlay {
    lines: Vec<String>,
    shown_at: Option<Instant>,
}

impl Overlay {
    /// Empty overlay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lines, oldest first.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Appends a line and restarts the timer.
    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
        self.shown_at = Some(Instant::now());
    }

    /// Replaces all lines and restarts the timer.
    pub fn replace(&mut self, lines: Vec<String>) {
        self.lines = lines;
        self.shown_at = Some(Instant::now());
    }

    /// Drops all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.shown_at = None;
    }

    /// Restarts the timer without changing content. Called on any user
    /// interaction.
    pub fn kick(&mut self) {
        if !self.lines.is_empty() {
            self.shown_at = Some(Instant::now());
        }
    }

    /// Expires the overlay immediately without dropping its content.
    pub fn kill(&mut self) {
        self.shown_at = self.shown_at.map(|_| Instant::now() - OVERLAY_DURATION);
    }

    /// Current fade intensity in `[0, 1]`.
    pub fn fade(&self) -> f32 {
        match self.shown_at {
            Some(at) => fade_for(at.elapsed()),
            None => 0.0,
        }
    }

    /// True when there is anything to draw.
    pub fn visible(&self) -> bool {
        !self.lines.is_empty() && self.fade() > 0.0
    }
}
