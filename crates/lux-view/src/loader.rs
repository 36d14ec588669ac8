//! Deferred load sequencing and file-name helpers.
//!
//! Decodes are slow and synchronous, so a load request never runs on
//! the frame that asked for it: the sequencer announces the pending load
//! for a couple of frames (giving the host time to present the
//! "Loading..." text) and only then performs it. A newer request simply
//! replaces the pending one.

use std::path::{Path, PathBuf};

/// Frames spent announcing a pending load before performing it.
pub const LOAD_ANNOUNCE_FRAMES: u8 = 2;

/// What the viewer has been asked to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadRequest {
    /// Load the file at `offset` from the current position in the file
    /// list (0 = reload current, 1 = next, -1 = previous; wraps).
    Single {
        /// Offset into the file list, relative and wrapping.
        offset: i32,
    },
    /// Load two files and diff them.
    Diff {
        /// First (reference) image.
        first: PathBuf,
        /// Second image.
        second: PathBuf,
    },
    /// Re-decode the current file at another video frame.
    Frame {
        /// Absolute frame index.
        index: u32,
    },
}

/// One step of the sequencer, taken each rendered frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequencerStep {
    /// Nothing pending.
    Idle,
    /// Keep announcing; draw the loading text for this request.
    Announce(LoadRequest),
    /// Perform this request now.
    Load(LoadRequest),
}

#[derive(Debug, Default)]
enum LoadPhase {
    #[default]
    Idle,
    Announcing {
        remaining: u8,
        request: LoadRequest,
    },
}

/// Deferred-load state machine. See the module docs.
#[derive(Debug, Default)]
pub struct LoadSequencer {
    phase: LoadPhase,
}

impl LoadSequencer {
    /// Empty sequencer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a request, replacing any pending one and restarting the
    /// announce countdown.
    pub fn request(&mut self, request: LoadRequest) {
        self.phase = LoadPhase::Announcing {
            remaining: LOAD_ANNOUNCE_FRAMES,
            request,
        };
    }

    /// Pending request, if any.
    pub fn pending(&self) -> Option<&LoadRequest> {
        match &self.phase {
            LoadPhase::Idle => None,
            LoadPhase::Announcing { request, .. } => Some(request),
        }
    }

    /// Drops any pending request.
    pub fn cancel(&mut self) {
        self.phase = LoadPhase::Idle;
    }

    /// Advances one frame.
    pub fn tick(&mut self) -> SequencerStep {
        match std::mem::take(&mut self.phase) {
            LoadPhase::Idle => SequencerStep::Idle,
            LoadPhase::Announcing { remaining, request } => {
                if remaining > 0 {
                    self.phase = LoadPhase::Announcing {
                        remaining: remaining - 1,
                        request: request.clone(),
                    };
                    SequencerStep::Announce(request)
                } else {
                    SequencerStep::Load(request)
                }
            }
        }
    }
}

/// File name portion of a path, for overlay text.
pub fn short_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Strips the longest common directory prefix from two path strings.
///
/// The cut always lands on a separator boundary so neither result
/// starts mid-component. Used to keep diff overlay lines readable when
/// both files live deep in the same tree.
pub fn elide_common_prefix<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    let common = a
        .bytes()
        .zip(b.bytes())
        .take_while(|(x, y)| x == y)
        .count();
    let boundary = a[..common]
        .rfind(['/', '\\'])
        .map(|i| i + 1)
        .unwrap_or(0);
    (&a[boundary..], &b[boundary..])
}

/// Human-readable byte count for info lines.
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.2} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn announce_then_load() {
        let mut seq = LoadSequencer::new();
        seq.request(LoadRequest::Single { offset: 1 });
        assert_eq!(
            seq.tick(),
            SequencerStep::Announce(LoadRequest::Single { offset: 1 })
        );
        assert_eq!(
            seq.tick(),
            SequencerStep::Announce(LoadRequest::Single { offset: 1 })
        );
        assert_eq!(
            seq.tick(),
            SequencerStep::Load(LoadRequest::Single { offset: 1 })
        );
        assert_eq!(seq.tick(), SequencerStep::Idle);
    }

    #[test]
    fn newer_request_wins() {
        let mut seq = LoadSequencer::new();
        seq.request(LoadRequest::Single { offset: 1 });
        seq.tick();
        seq.request(LoadRequest::Frame { index: 7 });
        // Countdown restarted for the new request.
        assert_eq!(
            seq.tick(),
            SequencerStep::Announce(LoadRequest::Frame { index: 7 })
        );
        seq.tick();
        assert_eq!(
            seq.tick(),
            SequencerStep::Load(LoadRequest::Frame { index: 7 })
        );
    }

    #[test]
    fn cancel_clears_pending() {
        let mut seq = LoadSequencer::new();
        seq.request(LoadRequest::Single { offset: -1 });
        assert!(seq.pending().is_some());
        seq.cancel();
        assert_eq!(seq.tick(), SequencerStep::Idle);
    }

    #[test]
    fn common_prefix_elision_cuts_on_separators() {
        let (a, b) = elide_common_prefix("/renders/v1/shot_a.exr", "/renders/v2/shot_a.exr");
        assert_eq!(a, "v1/shot_a.exr");
        assert_eq!(b, "v2/shot_a.exr");

        // No shared directory: untouched.
        let (a, b) = elide_common_prefix("alpha.png", "beta.png");
        assert_eq!(a, "alpha.png");
        assert_eq!(b, "beta.png");

        // Shared file-name prefix must not be cut mid-component.
        let (a, b) = elide_common_prefix("/x/shot_001.png", "/x/shot_002.png");
        assert_eq!(a, "shot_001.png");
        assert_eq!(b, "shot_002.png");
    }

    #[test]
    fn sizes_humanize() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(2048), "2.00 KB");
        assert_eq!(human_size(5 * 1024 * 1024), "5.00 MB");
    }
}
