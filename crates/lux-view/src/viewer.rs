//! The viewer context: all presentation state plus the policy that
//! keeps a display-ready image prepared.
//!
//! A [`Viewer`] is owned by the host window and driven entirely by host
//! callbacks (platform changes, mouse events, render ticks). Everything
//! runs on the caller's thread; slow pipeline work is kept off input
//! paths by the deferred-load sequencer in [`crate::loader`].

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use lux_pipeline::{
    hlg_peak_luminance, ConvertRequest, Curve, CurveKind, DiffResult, HighlightResult, ImageData,
    Pipeline, PixelInfo, Primaries, Profile, TonemapParams,
};

use crate::control::{
    hit_test, pointer_fraction, ActiveControl, ControlFlags, Slider, SliderId, SliderValue,
};
use crate::loader::{short_name, LoadRequest, LoadSequencer};
use crate::overlay::Overlay;
use crate::position::ViewTransform;
use crate::transfer::PQ_PEAK;

/// What the host display currently offers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlatformState {
    /// Viewport width in pixels.
    pub width: f32,
    /// Viewport height in pixels.
    pub height: f32,
    /// True when this display supports HDR output at all.
    pub hdr_available: bool,
    /// True when the surface is HDR-capable and HDR output is on.
    pub hdr_active: bool,
    /// True when the surface expects linear (gamma 1.0) output.
    pub linear_output: bool,
    /// Extended dynamic range headroom as a multiple of SDR white.
    pub max_edr: f32,
}

impl Default for PlatformState {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
            hdr_available: false,
            hdr_active: false,
            linear_output: false,
            max_edr: 1.0,
        }
    }
}

/// Which loaded rendition is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    /// The first (or only) image.
    #[default]
    Primary,
    /// The second image of a diff pair.
    Secondary,
    /// The diff visualization.
    Diff,
}

impl Selection {
    /// Display label for overlay and info text.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Primary => "Image 1",
            Self::Secondary => "Image 2",
            Self::Diff => "Diff",
        }
    }
}

/// How bright differing pixels render in the diff visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiffIntensity {
    /// Differences keep their original brightness.
    Original,
    /// Differences are lifted to at least a dim floor.
    #[default]
    Bright,
    /// Differences render at full intensity, matches go black.
    DiffOnly,
}

impl DiffIntensity {
    /// Minimum display intensity handed to the pipeline's diff.
    pub const fn min_intensity(self) -> f32 {
        match self {
            Self::Original => 0.0,
            Self::Bright => 0.1,
            Self::DiffOnly => 1.0,
        }
    }

    /// Display label for overlay text.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Original => "Original",
            Self::Bright => "Bright",
            Self::DiffOnly => "Diff Only",
        }
    }
}

/// One loaded source file.
#[derive(Debug, Clone)]
pub(crate) struct SourceSlot {
    pub(crate) image: ImageData,
    pub(crate) path: PathBuf,
    pub(crate) file_size: u64,
    pub(crate) format_name: String,
}

/// Every slider the viewer can show.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Sliders {
    pub(crate) tonemap_contrast: Slider,
    pub(crate) tonemap_clip_point: Slider,
    pub(crate) tonemap_speed: Slider,
    pub(crate) tonemap_power: Slider,
    pub(crate) tonemap_luminance: Slider,
    pub(crate) highlight_luminance: Slider,
    pub(crate) unspec_luminance: Slider,
    pub(crate) video_frame: Slider,
}

impl Default for Sliders {
    fn default() -> Self {
        Self {
            tonemap_contrast: Slider::new(
                SliderValue::float(1.0, 0.0, 4.0, 0.001),
                ControlFlags::PREPARE,
            ),
            tonemap_clip_point: Slider::new(
                SliderValue::float(1.0, 0.0, 4.0, 0.001),
                ControlFlags::PREPARE,
            ),
            tonemap_speed: Slider::new(
                SliderValue::float(1.0, 0.0, 8.0, 0.001),
                ControlFlags::PREPARE,
            ),
            tonemap_power: Slider::new(
                SliderValue::float(1.0, 0.0, 4.0, 0.001),
                ControlFlags::PREPARE,
            ),
            tonemap_luminance: Slider::new(
                SliderValue::int(80, 10, 2000, 10),
                ControlFlags::PREPARE,
            ),
            highlight_luminance: Slider::new(
                SliderValue::int(100, 10, 1000, 10),
                ControlFlags::PREPARE,
            ),
            unspec_luminance: Slider::new(
                SliderValue::int(100, 10, 10000, 10),
                ControlFlags::PREPARE,
            ),
            video_frame: Slider::new(SliderValue::int(0, 0, 0, 1), ControlFlags::RELOAD),
        }
    }
}

/// The presentation core. See the crate docs for the big picture.
#[derive(Debug)]
pub struct Viewer<P: Pipeline> {
    pub(crate) pipeline: P,
    pub(crate) platform: PlatformState,

    pub(crate) files: Vec<PathBuf>,
    pub(crate) file_index: usize,

    pub(crate) primary: Option<SourceSlot>,
    pub(crate) secondary: Option<SourceSlot>,
    pub(crate) diff: Option<DiffResult>,
    pub(crate) highlight: Option<HighlightResult>,

    pub(crate) prepared: Option<ImageData>,
    prepared_hdr: bool,
    prepared_white: u32,
    image_dirty: bool,

    pub(crate) selection: Selection,
    pub(crate) diff_intensity: DiffIntensity,
    pub(crate) diff_threshold: u16,
    pub(crate) srgb_highlight: bool,
    pub(crate) tonemap_forced: bool,
    pub(crate) max_edr_clip: bool,

    pub(crate) frame_index: u32,
    pub(crate) frame_count: u32,

    pub(crate) transform: ViewTransform,
    pub(crate) probe: Option<(u32, u32)>,
    pub(crate) probe_primary: Option<PixelInfo>,
    pub(crate) probe_secondary: Option<PixelInfo>,

    pub(crate) sliders: Sliders,
    drag_control: Option<SliderId>,
    dragging_view: bool,
    last_mouse: (f32, f32),
    pub(crate) active_controls: Vec<ActiveControl>,

    pub(crate) sequencer: LoadSequencer,
    pub(crate) overlay: Overlay,
    pub(crate) info: Vec<String>,
}

impl<P: Pipeline> Viewer<P> {
    /// Creates a viewer around a pipeline.
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            platform: PlatformState::default(),
            files: Vec::new(),
            file_index: 0,
            primary: None,
            secondary: None,
            diff: None,
            highlight: None,
            prepared: None,
            prepared_hdr: false,
            prepared_white: 0,
            image_dirty: false,
            selection: Selection::default(),
            diff_intensity: DiffIntensity::default(),
            diff_threshold: 0,
            srgb_highlight: false,
            tonemap_forced: false,
            max_edr_clip: false,
            frame_index: 0,
            frame_count: 1,
            transform: ViewTransform::default(),
            probe: None,
            probe_primary: None,
            probe_secondary: None,
            sliders: Sliders::default(),
            drag_control: None,
            dragging_view: false,
            last_mouse: (0.0, 0.0),
            active_controls: Vec::new(),
            sequencer: LoadSequencer::new(),
            overlay: Overlay::new(),
            info: Vec::new(),
        }
    }

    /// The pipeline behind this viewer.
    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    // ------------------------------------------------------------------
    // File list

    /// Replaces the navigable file list.
    pub fn set_file_list(&mut self, files: Vec<PathBuf>) {
        self.files = files;
        self.file_index = 0;
    }

    /// Number of navigable files.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Path of the current file, if the list is non-empty.
    pub fn current_file(&self) -> Option<&Path> {
        self.files.get(self.file_index).map(PathBuf::as_path)
    }

    // ------------------------------------------------------------------
    // Platform hooks

    /// Current platform state.
    pub fn platform(&self) -> &PlatformState {
        &self.platform
    }

    /// Viewport resize. Pan and zoom are reset: the image is refit and
    /// recentered at the new size.
    pub fn set_platform_size(&mut self, width: f32, height: f32) {
        self.platform.width = width.max(1.0);
        self.platform.height = height.max(1.0);
        let dims = self.shown_dims();
        self.transform.reset(dims, self.viewport());
    }

    /// Whether the display supports HDR at all.
    pub fn set_hdr_available(&mut self, available: bool) {
        self.platform.hdr_available = available;
        if !available && self.platform.hdr_active {
            self.set_hdr_active(false);
        }
    }

    /// HDR output turned on or off; re-preparation happens on the next
    /// render pass.
    pub fn set_hdr_active(&mut self, active: bool) {
        if self.platform.hdr_active != active {
            info!(active, "hdr output changed");
            self.platform.hdr_active = active;
            if active {
                self.platform.hdr_available = true;
            }
        }
    }

    /// Host surface expects linear output.
    pub fn set_linear_output(&mut self, linear: bool) {
        if self.platform.linear_output != linear {
            self.platform.linear_output = linear;
            self.prepare();
        }
    }

    /// Extended-dynamic-range headroom reported by the display.
    pub fn set_max_edr(&mut self, max_edr: f32) {
        self.platform.max_edr = max_edr.max(1.0);
        if self.max_edr_clip {
            self.prepare();
        }
    }

    // ------------------------------------------------------------------
    // Load requests (deferred)

    /// Requests a load at `offset` from the current file (wrapping).
    pub fn load_image(&mut self, offset: i32) {
        self.sequencer.request(LoadRequest::Single { offset });
    }

    /// Requests a diff of two files.
    pub fn load_diff(&mut self, first: impl Into<PathBuf>, second: impl Into<PathBuf>) {
        self.sequencer.request(LoadRequest::Diff {
            first: first.into(),
            second: second.into(),
        });
    }

    /// Requests another video frame of the current file.
    pub fn set_video_frame(&mut self, index: u32) {
        if self.frame_count <= 1 {
            return;
        }
        let index = index.min(self.frame_count - 1);
        if index != self.frame_index {
            self.sequencer.request(LoadRequest::Frame { index });
        }
    }

    /// Requests the video frame at a fraction of the stream.
    pub fn set_video_frame_fraction(&mut self, fraction: f32) {
        if self.frame_count <= 1 {
            return;
        }
        let span = (self.frame_count - 1) as f32;
        self.set_video_frame((fraction.clamp(0.0, 1.0) * span).round() as u32);
    }

    /// Reloads the current content immediately, bypassing the announce
    /// countdown. Used when the file on disk changed.
    pub fn refresh(&mut self) {
        self.sequencer.cancel();
        let diff_pair = match (&self.primary, &self.secondary) {
            (Some(p), Some(s)) => Some((p.path.clone(), s.path.clone())),
            _ => None,
        };
        if let Some((first, second)) = diff_pair {
            self.perform(LoadRequest::Diff { first, second });
        } else if self.primary.is_some() {
            self.perform(LoadRequest::Frame {
                index: self.frame_index,
            });
        } else if !self.files.is_empty() {
            self.perform(LoadRequest::Single { offset: 0 });
        }
    }

    // ------------------------------------------------------------------
    // Load execution

    pub(crate) fn perform(&mut self, request: LoadRequest) {
        match request {
            LoadRequest::Single { offset } => self.perform_single(offset),
            LoadRequest::Diff { first, second } => self.perform_diff(&first, &second),
            LoadRequest::Frame { index } => self.perform_frame(index),
        }
    }

    fn perform_single(&mut self, offset: i32) {
        let count = self.files.len();
        if count == 0 {
            self.unload();
            self.overlay.replace(vec!["No files to load".to_string()]);
            return;
        }
        self.file_index =
            (self.file_index as i64 + i64::from(offset)).rem_euclid(count as i64) as usize;
        let path = self.files[self.file_index].clone();
        let position = format!("[{}/{}]", self.file_index + 1, count);

        self.secondary = None;
        self.diff = None;
        self.highlight = None;

        match self.pipeline.decode(&path, 0) {
            Ok(decoded) => {
                info!(path = %path.display(), format = %decoded.format_name, "loaded");
                let file_size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
                self.frame_index = 0;
                self.frame_count = decoded.frame_count;
                self.sliders.video_frame.value =
                    SliderValue::int(0, 0, self.frame_count.saturating_sub(1) as i32, 1);
                let dims = decoded.image.dims();
                self.primary = Some(SourceSlot {
                    image: decoded.image,
                    path: path.clone(),
                    file_size,
                    format_name: decoded.format_name,
                });
                self.selection = Selection::Primary;
                self.prepare();
                self.transform.reset(Some(dims), self.viewport());
                self.overlay
                    .replace(vec![format!("{position} Loaded: {}", short_name(&path))]);
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "load failed");
                self.unload();
                self.overlay.replace(vec![format!(
                    "{position} Failed to load: {}",
                    short_name(&path)
                )]);
            }
        }
    }

    fn perform_diff(&mut self, first: &Path, second: &Path) {
        use crate::error::DiffFailure;
        use crate::loader::elide_common_prefix;

        self.unload();

        let first_decoded = self.pipeline.decode(first, 0);
        let second_decoded = self.pipeline.decode(second, 0);

        let first_text = first.to_string_lossy();
        let second_text = second.to_string_lossy();
        let (first_short, second_short) = elide_common_prefix(&first_text, &second_text);

        let failure = match (&first_decoded, &second_decoded) {
            (Err(_), Err(_)) => Some(DiffFailure::BothFailed),
            (Err(_), Ok(_)) => Some(DiffFailure::FirstFailed),
            (Ok(_), Err(_)) => Some(DiffFailure::SecondFailed),
            (Ok(a), Ok(b)) if a.image.dims() != b.image.dims() => {
                Some(DiffFailure::DimensionMismatch)
            }
            _ => None,
        };
        if let Some(reason) = failure {
            warn!(%reason, first = %first.display(), second = %second.display(), "diff load failed");
            self.overlay.replace(vec![
                format!("Failed to load diff: {reason}"),
                format!("* 1: {first_short}"),
                format!("* 2: {second_short}"),
            ]);
            return;
        }
        let (Ok(a), Ok(b)) = (first_decoded, second_decoded) else {
            return;
        };

        let dims = a.image.dims();
        self.frame_index = 0;
        self.frame_count = 1;
        self.sliders.video_frame.value = SliderValue::int(0, 0, 0, 1);
        self.primary = Some(SourceSlot {
            image: a.image,
            path: first.to_path_buf(),
            file_size: fs::metadata(first).map(|m| m.len()).unwrap_or(0),
            format_name: a.format_name,
        });
        self.secondary = Some(SourceSlot {
            image: b.image,
            path: second.to_path_buf(),
            file_size: fs::metadata(second).map(|m| m.len()).unwrap_or(0),
            format_name: b.format_name,
        });
        self.selection = Selection::Diff;
        self.diff_intensity = DiffIntensity::Bright;
        self.prepare();
        self.transform.reset(Some(dims), self.viewport());
        self.overlay.replace(vec![
            "Loaded diff:".to_string(),
            format!("* 1: {first_short}"),
            format!("* 2: {second_short}"),
        ]);
    }

    fn perform_frame(&mut self, index: u32) {
        let Some(path) = self.primary.as_ref().map(|s| s.path.clone()) else {
            return;
        };
        let index = index.min(self.frame_count.saturating_sub(1));
        match self.pipeline.decode(&path, index) {
            Ok(decoded) => {
                debug!(index, "frame loaded");
                self.frame_index = decoded.frame_index;
                self.frame_count = decoded.frame_count;
                self.sliders.video_frame.value = SliderValue::int(
                    self.frame_index as i32,
                    0,
                    self.frame_count.saturating_sub(1) as i32,
                    1,
                );
                if let Some(slot) = &mut self.primary {
                    slot.image = decoded.image;
                }
                self.diff = None;
                self.highlight = None;
                // Frame scrubbing keeps pan and zoom.
                self.prepare();
                if self.frame_count > 1 {
                    self.overlay.replace(vec![format!(
                        "Frame {}/{}",
                        self.frame_index + 1,
                        self.frame_count
                    )]);
                }
            }
            Err(err) => {
                warn!(path = %path.display(), index, error = %err, "frame load failed");
                self.overlay
                    .replace(vec![format!("Failed to load frame {index}")]);
            }
        }
    }

    /// Drops all loaded content.
    pub fn unload(&mut self) {
        self.primary = None;
        self.secondary = None;
        self.diff = None;
        self.highlight = None;
        self.prepared = None;
        self.selection = Selection::Primary;
        self.frame_index = 0;
        self.frame_count = 1;
        self.probe = None;
        self.probe_primary = None;
        self.probe_secondary = None;
        self.image_dirty = true;
    }

    // ------------------------------------------------------------------
    // Color preparation

    /// SDR white level in nits (the tonemap luminance slider).
    pub fn sdr_white(&self) -> u32 {
        self.sliders.tonemap_luminance.value.as_i32().max(1) as u32
    }

    /// True when the prepared image targets an HDR color volume.
    pub fn hdr_output(&self) -> bool {
        self.platform.hdr_active && !self.tonemap_forced
    }

    fn tonemap_params(&self) -> TonemapParams {
        TonemapParams {
            contrast: self.sliders.tonemap_contrast.value.as_f32(),
            clip_point: self.sliders.tonemap_clip_point.value.as_f32(),
            speed: self.sliders.tonemap_speed.value.as_f32(),
            power: self.sliders.tonemap_power.value.as_f32(),
            luminance: self.sdr_white(),
        }
    }

    /// Destination color volume for the current platform and toggles.
    fn destination_profile(&self) -> Profile {
        let sdr_white = self.sdr_white();
        if self.hdr_output() {
            let max_luminance = if self.max_edr_clip {
                ((sdr_white as f32 * self.platform.max_edr) as u32).clamp(sdr_white, PQ_PEAK)
            } else {
                PQ_PEAK
            };
            Profile {
                primaries: Primaries::Bt2020,
                curve: if self.platform.linear_output {
                    Curve::gamma(1.0)
                } else {
                    Curve::pq()
                },
                max_luminance,
            }
        } else {
            Profile {
                primaries: Primaries::Bt709,
                curve: Curve::gamma(if self.platform.linear_output { 1.0 } else { 2.2 }),
                max_luminance: sdr_white,
            }
        }
    }

    /// Rebuilds the display-ready image from the current sources,
    /// selection and platform.
    ///
    /// Derived results (diff, highlight) are rebuilt only when a prior
    /// edit invalidated them. On conversion failure the previously
    /// prepared image stays on screen.
    pub fn prepare(&mut self) {
        if self.primary.is_none() {
            return;
        }
        // Selection collapses to the primary when the pair is gone.
        if self.secondary.is_none() && self.selection != Selection::Primary {
            self.selection = Selection::Primary;
        }
        let unspec = self.sliders.unspec_luminance.value.as_i32().max(1) as u32;

        self.normalize_secondary(unspec);
        self.ensure_diff();

        let shown = match self.selection {
            Selection::Primary => self.primary.as_ref().map(|s| s.image.clone()),
            Selection::Secondary => self.secondary.as_ref().map(|s| s.image.clone()),
            Selection::Diff => self.diff.as_ref().map(|d| d.image.clone()),
        };
        let Some(mut shown) = shown else {
            return;
        };

        // Highlight replaces the shown image outside of diff view.
        let mut value_faithful = self.selection == Selection::Diff;
        if self.srgb_highlight && self.selection != Selection::Diff {
            if self.highlight.is_none() {
                let reference = self.sliders.highlight_luminance.value.as_i32().max(1) as u32;
                match self.pipeline.highlight(&shown, reference) {
                    Ok(result) => self.highlight = Some(result),
                    Err(err) => warn!(error = %err, "highlight pass failed"),
                }
            }
            if let Some(result) = &self.highlight {
                shown = result.image.clone();
                value_faithful = true;
            }
        } else {
            self.highlight = None;
        }

        let profile = self.destination_profile();
        let mut request = ConvertRequest::prepared(profile, self.tonemap_params(), unspec);
        if value_faithful {
            request = request.without_tonemap();
        }
        match self.pipeline.convert(&shown, &request) {
            Ok(image) => {
                debug!(profile = %profile.describe(), "prepared");
                self.prepared = Some(image);
                self.prepared_hdr = self.hdr_output();
                self.prepared_white = self.sdr_white();
                self.image_dirty = true;
            }
            Err(err) => {
                warn!(error = %err, "color preparation failed, keeping previous image");
            }
        }
    }

    /// Converts the secondary into the primary's color volume when they
    /// disagree, so the diff compares like with like.
    fn normalize_secondary(&mut self, unspec: u32) {
        let mismatch = match (&self.primary, &self.secondary) {
            (Some(p), Some(s)) => {
                !s.image.profile().matches(p.image.profile()) || s.image.depth() != p.image.depth()
            }
            _ => return,
        };
        if !mismatch {
            return;
        }
        let (target_profile, target_depth, s_image) = match (&self.primary, &self.secondary) {
            (Some(p), Some(s)) => (*p.image.profile(), p.image.depth(), s.image.clone()),
            _ => return,
        };
        let request = ConvertRequest {
            depth: target_depth,
            profile: target_profile,
            ..ConvertRequest::prepared(target_profile, self.tonemap_params(), unspec)
        }
        .without_tonemap();
        match self.pipeline.convert(&s_image, &request) {
            Ok(image) => {
                debug!(profile = %target_profile.describe(), "secondary normalized");
                if let Some(slot) = &mut self.secondary {
                    slot.image = image;
                }
                self.diff = None;
            }
            Err(err) => warn!(error = %err, "secondary normalization failed"),
        }
    }

    /// Rebuilds the diff result if a pair is loaded and the cached one
    /// was invalidated.
    fn ensure_diff(&mut self) {
        if self.diff.is_some() {
            return;
        }
        let pair = match (&self.primary, &self.secondary) {
            (Some(p), Some(s)) => Some((p.image.clone(), s.image.clone())),
            _ => None,
        };
        let Some((first, second)) = pair else { return };
        match self.pipeline.diff(
            &first,
            &second,
            self.diff_intensity.min_intensity(),
            self.diff_threshold,
        ) {
            Ok(result) => self.diff = Some(result),
            Err(err) => warn!(error = %err, "diff failed"),
        }
    }

    /// Re-prepares when the platform or white level drifted from what
    /// the prepared image was built for. Called by the render pass.
    pub(crate) fn ensure_prepared_current(&mut self) {
        if self.prepared.is_some()
            && (self.hdr_output() != self.prepared_hdr || self.sdr_white() != self.prepared_white)
        {
            self.prepare();
        }
    }

    // ------------------------------------------------------------------
    // View toggles

    /// Current selection.
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Switches the displayed rendition; ignored when the target is not
    /// loaded.
    pub fn set_selection(&mut self, selection: Selection) {
        let available = match selection {
            Selection::Primary => self.primary.is_some(),
            Selection::Secondary | Selection::Diff => self.secondary.is_some(),
        };
        if !available || selection == self.selection {
            return;
        }
        self.selection = selection;
        self.highlight = None;
        if selection == Selection::Diff {
            // Highlight classification is undefined for diff pixels.
            self.srgb_highlight = false;
        }
        self.prepare();
        self.overlay
            .replace(vec![format!("Showing: {}", selection.label())]);
    }

    /// Current diff match threshold.
    pub fn diff_threshold(&self) -> u16 {
        self.diff_threshold
    }

    /// Adjusts the diff threshold by a signed delta, clamped to the
    /// representable range. Invalidates and rebuilds the diff.
    pub fn adjust_diff_threshold(&mut self, delta: i32) {
        let new = (i64::from(self.diff_threshold) + i64::from(delta))
            .clamp(0, i64::from(u16::MAX)) as u16;
        if new == self.diff_threshold {
            return;
        }
        self.diff_threshold = new;
        if self.secondary.is_some() {
            self.diff = None;
            self.prepare();
        }
        self.overlay
            .replace(vec![format!("Diff threshold: {new}")]);
    }

    /// Current diff intensity mode.
    pub fn diff_intensity(&self) -> DiffIntensity {
        self.diff_intensity
    }

    /// Switches the diff intensity mode, rebuilding the visualization.
    pub fn set_diff_intensity(&mut self, intensity: DiffIntensity) {
        if intensity == self.diff_intensity {
            return;
        }
        self.diff_intensity = intensity;
        if self.secondary.is_some() {
            self.diff = None;
            self.prepare();
        }
        self.overlay
            .replace(vec![format!("Diff intensity: {}", intensity.label())]);
    }

    /// True when the sRGB highlight pass is active.
    pub fn srgb_highlight(&self) -> bool {
        self.srgb_highlight
    }

    /// Toggles the sRGB highlight pass. No-op in diff view.
    pub fn toggle_srgb_highlight(&mut self) {
        if self.selection == Selection::Diff {
            return;
        }
        self.srgb_highlight = !self.srgb_highlight;
        self.highlight = None;
        self.prepare();
        self.overlay.replace(vec![format!(
            "sRGB highlight: {}",
            if self.srgb_highlight { "on" } else { "off" }
        )]);
    }

    /// True when tonemapped SDR output is forced despite an HDR display.
    pub fn tonemap_forced(&self) -> bool {
        self.tonemap_forced
    }

    /// Toggles forced SDR tonemapping (shows the tonemap sliders).
    pub fn toggle_tonemap(&mut self) {
        self.tonemap_forced = !self.tonemap_forced;
        self.prepare();
        self.overlay.replace(vec![format!(
            "Tonemapping: {}",
            if self.tonemap_forced { "forced" } else { "auto" }
        )]);
    }

    /// Toggles clipping the HDR output volume to the display's EDR
    /// headroom instead of the full PQ range.
    pub fn toggle_max_edr_clip(&mut self) {
        self.max_edr_clip = !self.max_edr_clip;
        self.prepare();
        self.overlay.replace(vec![format!(
            "EDR clip: {}",
            if self.max_edr_clip { "on" } else { "off" }
        )]);
    }

    // ------------------------------------------------------------------
    // Mouse

    /// Left button pressed.
    pub fn mouse_left_down(&mut self, x: f32, y: f32) {
        self.overlay.kick();
        self.last_mouse = (x, y);
        if let Some(control) = hit_test(&self.active_controls, x, y).copied() {
            self.drag_control = Some(control.id);
            self.apply_slider_pointer(control, x);
        } else {
            self.dragging_view = true;
        }
    }

    /// Left button released.
    pub fn mouse_left_up(&mut self, _x: f32, _y: f32) {
        if let Some(id) = self.drag_control.take() {
            let slider = *self.slider(id);
            if slider.flags.reload {
                let index = slider.value.as_i32().max(0) as u32;
                self.sequencer.request(LoadRequest::Frame { index });
            }
        }
        self.dragging_view = false;
    }

    /// Pointer moved (pressed or not).
    pub fn mouse_move(&mut self, x: f32, y: f32) {
        self.overlay.kick();
        if let Some(id) = self.drag_control {
            if let Some(control) = self.active_controls.iter().find(|c| c.id == id).copied() {
                self.apply_slider_pointer(control, x);
            }
        } else if self.dragging_view {
            self.transform
                .pan(x - self.last_mouse.0, y - self.last_mouse.1);
        }
        self.last_mouse = (x, y);
        self.update_probe(x, y);
    }

    /// Left button double-clicked: cycle the zoom tier at the cursor.
    pub fn mouse_double_click(&mut self, x: f32, y: f32) {
        self.overlay.kick();
        if hit_test(&self.active_controls, x, y).is_none() {
            let dims = self.shown_dims();
            self.transform.cycle_tier((x, y), dims, self.viewport());
        }
    }

    /// Wheel scrolled; `delta` is in zoom-scale units (host pre-scales
    /// native wheel ticks).
    pub fn mouse_wheel(&mut self, x: f32, y: f32, delta: f32) {
        self.overlay.kick();
        let dims = self.shown_dims();
        self.transform
            .wheel_zoom((x, y), delta, dims, self.viewport());
    }

    fn apply_slider_pointer(&mut self, control: ActiveControl, x: f32) {
        let fraction = pointer_fraction(&control.rect, x);
        let slider = self.slider_mut(control.id);
        let changed = slider.value.set_fraction(fraction);
        let wants_prepare = slider.flags.prepare;
        if changed && wants_prepare {
            self.prepare();
        }
    }

    fn update_probe(&mut self, x: f32, y: f32) {
        let dims = self.shown_dims();
        self.probe = dims.and_then(|d| self.transform.image_coords((x, y), d));
        match self.probe {
            Some((px, py)) => {
                self.probe_primary = self
                    .primary
                    .as_ref()
                    .and_then(|s| self.pipeline.pixel_info(&s.image, px, py));
                self.probe_secondary = self
                    .secondary
                    .as_ref()
                    .and_then(|s| self.pipeline.pixel_info(&s.image, px, py));
            }
            None => {
                self.probe_primary = None;
                self.probe_secondary = None;
            }
        }
    }

    // ------------------------------------------------------------------
    // Sliders

    /// Read access to a slider.
    pub fn slider(&self, id: SliderId) -> &Slider {
        match id {
            SliderId::TonemapContrast => &self.sliders.tonemap_contrast,
            SliderId::TonemapClipPoint => &self.sliders.tonemap_clip_point,
            SliderId::TonemapSpeed => &self.sliders.tonemap_speed,
            SliderId::TonemapPower => &self.sliders.tonemap_power,
            SliderId::TonemapLuminance => &self.sliders.tonemap_luminance,
            SliderId::HighlightLuminance => &self.sliders.highlight_luminance,
            SliderId::UnspecLuminance => &self.sliders.unspec_luminance,
            SliderId::VideoFrame => &self.sliders.video_frame,
        }
    }

    fn slider_mut(&mut self, id: SliderId) -> &mut Slider {
        match id {
            SliderId::TonemapContrast => &mut self.sliders.tonemap_contrast,
            SliderId::TonemapClipPoint => &mut self.sliders.tonemap_clip_point,
            SliderId::TonemapSpeed => &mut self.sliders.tonemap_speed,
            SliderId::TonemapPower => &mut self.sliders.tonemap_power,
            SliderId::TonemapLuminance => &mut self.sliders.tonemap_luminance,
            SliderId::HighlightLuminance => &mut self.sliders.highlight_luminance,
            SliderId::UnspecLuminance => &mut self.sliders.unspec_luminance,
            SliderId::VideoFrame => &mut self.sliders.video_frame,
        }
    }

    /// Sets a slider's value directly (keyboard shortcuts, scripting),
    /// honoring the slider's side effects.
    pub fn set_slider_value(&mut self, id: SliderId, value: f32) {
        let slider = self.slider_mut(id);
        let changed = slider.value.set(value);
        let flags = slider.flags;
        if !changed {
            return;
        }
        if flags.prepare {
            self.prepare();
        }
        if flags.reload {
            let index = self.slider(id).value.as_i32().max(0) as u32;
            self.sequencer.request(LoadRequest::Frame { index });
        }
    }

    // ------------------------------------------------------------------
    // Render-facing accessors

    /// Dimensions of whatever rendition is selected.
    pub(crate) fn shown_dims(&self) -> Option<(u32, u32)> {
        self.primary.as_ref().map(|s| s.image.dims())
    }

    /// Viewport size in pixels.
    pub(crate) fn viewport(&self) -> (f32, f32) {
        (self.platform.width, self.platform.height)
    }

    /// The display-ready image, if any.
    pub fn prepared_image(&self) -> Option<&ImageData> {
        self.prepared.as_ref()
    }

    /// True once after each successful preparation; the host uploads
    /// the prepared buffer when this fires.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.image_dirty, false)
    }

    /// Whether the host should sample the image with linear filtering.
    ///
    /// Diff visualization and an active pixel probe want unfiltered
    /// texels, so filtering turns off for those.
    pub fn uses_linear_sampling(&self) -> bool {
        self.selection != Selection::Diff && self.probe.is_none()
    }

    /// Current zoom/pan placement.
    pub fn transform(&self) -> &ViewTransform {
        &self.transform
    }

    /// Overlay text lines (for hosts that mirror them elsewhere).
    pub fn overlay_lines(&self) -> &[String] {
        self.overlay.lines()
    }

    /// Info pane lines as built by the last render pass.
    pub fn info_lines(&self) -> &[String] {
        &self.info
    }

    /// Cached diff result.
    pub fn diff_result(&self) -> Option<&DiffResult> {
        self.diff.as_ref()
    }

    /// Cached highlight result.
    pub fn highlight_result(&self) -> Option<&HighlightResult> {
        self.highlight.as_ref()
    }

    /// Current video frame index.
    pub fn frame_index(&self) -> u32 {
        self.frame_index
    }

    /// Frame count of the current stream (1 for stills).
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Peak luminance implied by an HLG source at the current SDR white,
    /// when any loaded source is HLG-encoded.
    pub fn hlg_peak(&self) -> Option<u32> {
        let hlg = |slot: &Option<SourceSlot>| {
            slot.as_ref()
                .is_some_and(|s| s.image.profile().curve.kind == CurveKind::Hlg)
        };
        if hlg(&self.primary) || hlg(&self.secondary) {
            Some(hlg_peak_luminance(self.sdr_white()))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lux_pipeline::testing::FakePipeline;
    use lux_pipeline::ImageData;

    use crate::loader::LOAD_ANNOUNCE_FRAMES;

    fn image(width: u32, height: u32) -> ImageData {
        ImageData::solid(width, height, 8, Profile::sdr(0), [32768; 4])
    }

    fn viewer_with(files: &[(&str, ImageData)]) -> Viewer<FakePipeline> {
        let pipeline = FakePipeline::new();
        for (path, img) in files {
            pipeline.add_image(*path, img.clone());
        }
        let mut viewer = Viewer::new(pipeline);
        viewer.set_platform_size(1920.0, 1080.0);
        viewer.set_file_list(files.iter().map(|(p, _)| PathBuf::from(p)).collect());
        viewer
    }

    /// Renders through a full announce countdown plus the load frame.
    fn pump(viewer: &mut Viewer<FakePipeline>) {
        for _ in 0..=LOAD_ANNOUNCE_FRAMES {
            let _ = viewer.render();
        }
    }

    #[test]
    fn load_defers_until_announce_frames_elapse() {
        let mut viewer = viewer_with(&[("/a.png", image(8, 8))]);
        viewer.load_image(0);
        assert_eq!(viewer.pipeline().decode_count(), 0);

        let _ = viewer.render();
        let _ = viewer.render();
        assert_eq!(viewer.pipeline().decode_count(), 0);
        let _ = viewer.render();
        assert_eq!(viewer.pipeline().decode_count(), 1);
        assert!(viewer.prepared_image().is_some());
        assert!(viewer.take_dirty());
        assert!(!viewer.take_dirty());
    }

    #[test]
    fn sdr_policy_targets_bt709_gamma() {
        let mut viewer = viewer_with(&[("/a.png", image(8, 8))]);
        viewer.load_image(0);
        pump(&mut viewer);

        let profile = *viewer.prepared_image().unwrap().profile();
        assert_eq!(profile.primaries, Primaries::Bt709);
        assert_eq!(profile.curve.kind, CurveKind::Gamma);
        assert!((profile.curve.gamma - 2.2).abs() < 1e-6);
        assert_eq!(profile.max_luminance, 80);
    }

    #[test]
    fn hdr_policy_targets_bt2020_pq_at_full_range() {
        let mut viewer = viewer_with(&[("/a.png", image(8, 8))]);
        viewer.load_image(0);
        pump(&mut viewer);

        viewer.set_hdr_active(true);
        let _ = viewer.render();

        let profile = *viewer.prepared_image().unwrap().profile();
        assert_eq!(profile.primaries, Primaries::Bt2020);
        assert_eq!(profile.curve.kind, CurveKind::Pq);
        assert_eq!(profile.max_luminance, 10000);
    }

    #[test]
    fn linear_surface_swaps_pq_for_gamma_one() {
        let mut viewer = viewer_with(&[("/a.png", image(8, 8))]);
        viewer.load_image(0);
        pump(&mut viewer);
        viewer.set_hdr_active(true);
        viewer.set_linear_output(true);
        let _ = viewer.render();

        let profile = *viewer.prepared_image().unwrap().profile();
        assert_eq!(profile.primaries, Primaries::Bt2020);
        assert!(profile.curve.is_linear());
        assert_eq!(profile.max_luminance, 10000);
    }

    #[test]
    fn forced_tonemap_overrides_hdr_display() {
        let mut viewer = viewer_with(&[("/a.png", image(8, 8))]);
        viewer.load_image(0);
        pump(&mut viewer);
        viewer.set_hdr_active(true);
        viewer.toggle_tonemap();
        let _ = viewer.render();

        let profile = *viewer.prepared_image().unwrap().profile();
        assert_eq!(profile.primaries, Primaries::Bt709);
        assert_eq!(profile.max_luminance, 80);
    }

    #[test]
    fn edr_clip_limits_the_hdr_volume() {
        let mut viewer = viewer_with(&[("/a.png", image(8, 8))]);
        viewer.load_image(0);
        pump(&mut viewer);
        viewer.set_hdr_active(true);
        viewer.set_max_edr(4.0);
        viewer.toggle_max_edr_clip();
        let _ = viewer.render();

        let profile = *viewer.prepared_image().unwrap().profile();
        assert_eq!(profile.max_luminance, 320);
    }

    #[test]
    fn luminance_slider_rebuilds_at_new_white() {
        let mut viewer = viewer_with(&[("/a.png", image(8, 8))]);
        viewer.load_image(0);
        pump(&mut viewer);
        let converts = viewer.pipeline().convert_count();

        viewer.set_slider_value(SliderId::TonemapLuminance, 200.0);

        assert_eq!(viewer.pipeline().convert_count(), converts + 1);
        let profile = *viewer.prepared_image().unwrap().profile();
        assert_eq!(profile.max_luminance, 200);
        assert!((profile.curve.gamma - 2.2).abs() < 1e-6);
        assert!(viewer.take_dirty());
    }

    #[test]
    fn conversion_failure_keeps_previous_image() {
        let mut viewer = viewer_with(&[("/a.png", image(8, 8))]);
        viewer.load_image(0);
        pump(&mut viewer);
        let before = *viewer.prepared_image().unwrap().profile();

        viewer.pipeline().fail_conversions(true);
        viewer.set_slider_value(SliderId::TonemapLuminance, 500.0);

        let after = *viewer.prepared_image().unwrap().profile();
        assert!(before.matches(&after));
    }

    #[test]
    fn navigation_wraps_both_directions() {
        let mut viewer = viewer_with(&[("/a.png", image(8, 8)), ("/b.png", image(8, 8))]);
        viewer.load_image(-1);
        pump(&mut viewer);
        assert_eq!(viewer.current_file().unwrap(), Path::new("/b.png"));
        viewer.load_image(1);
        pump(&mut viewer);
        assert_eq!(viewer.current_file().unwrap(), Path::new("/a.png"));
    }

    #[test]
    fn diff_builds_once_and_rebuilds_on_threshold_change() {
        let mut viewer = viewer_with(&[("/a.png", image(8, 8)), ("/b.png", image(8, 8))]);
        viewer.load_diff("/a.png", "/b.png");
        pump(&mut viewer);

        assert_eq!(viewer.selection(), Selection::Diff);
        assert_eq!(viewer.diff_intensity(), DiffIntensity::Bright);
        assert_eq!(viewer.pipeline().diff_count(), 1);

        // A plain re-preparation reuses the cached diff.
        viewer.prepare();
        assert_eq!(viewer.pipeline().diff_count(), 1);

        viewer.adjust_diff_threshold(10);
        assert_eq!(viewer.diff_threshold(), 10);
        assert_eq!(viewer.pipeline().diff_count(), 2);
    }

    #[test]
    fn diff_threshold_clamps_at_zero() {
        let mut viewer = viewer_with(&[("/a.png", image(8, 8)), ("/b.png", image(8, 8))]);
        viewer.load_diff("/a.png", "/b.png");
        pump(&mut viewer);
        let diffs = viewer.pipeline().diff_count();

        viewer.adjust_diff_threshold(-50);
        assert_eq!(viewer.diff_threshold(), 0);
        // No change, no rebuild.
        assert_eq!(viewer.pipeline().diff_count(), diffs);
    }

    #[test]
    fn diff_dimension_mismatch_unloads_and_reports() {
        let mut viewer = viewer_with(&[("/a.png", image(8, 8)), ("/b.png", image(16, 8))]);
        viewer.load_diff("/a.png", "/b.png");
        pump(&mut viewer);

        assert!(viewer.prepared_image().is_none());
        assert!(viewer.diff_result().is_none());
        let lines = viewer.overlay_lines();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("dimensions"));
        assert!(lines[1].contains("a.png"));
        assert!(lines[2].contains("b.png"));
    }

    #[test]
    fn highlight_toggle_is_a_noop_in_diff_view() {
        let mut viewer = viewer_with(&[("/a.png", image(8, 8)), ("/b.png", image(8, 8))]);
        viewer.load_diff("/a.png", "/b.png");
        pump(&mut viewer);
        let converts = viewer.pipeline().convert_count();

        viewer.toggle_srgb_highlight();
        assert!(!viewer.srgb_highlight());
        assert_eq!(viewer.pipeline().highlight_count(), 0);
        assert_eq!(viewer.pipeline().convert_count(), converts);

        // On the primary image the pass runs.
        viewer.set_selection(Selection::Primary);
        viewer.toggle_srgb_highlight();
        assert!(viewer.srgb_highlight());
        assert_eq!(viewer.pipeline().highlight_count(), 1);
        assert!(viewer.highlight_result().is_some());

        // Switching back into diff view drops the highlight state.
        viewer.set_selection(Selection::Diff);
        assert!(!viewer.srgb_highlight());
        assert!(viewer.highlight_result().is_none());
    }

    #[test]
    fn selection_requires_a_loaded_target() {
        let mut viewer = viewer_with(&[("/a.png", image(8, 8))]);
        viewer.load_image(0);
        pump(&mut viewer);

        viewer.set_selection(Selection::Diff);
        assert_eq!(viewer.selection(), Selection::Primary);
        viewer.set_selection(Selection::Secondary);
        assert_eq!(viewer.selection(), Selection::Primary);
    }

    #[test]
    fn refresh_bypasses_the_announce_countdown() {
        let mut viewer = viewer_with(&[("/a.png", image(8, 8))]);
        viewer.load_image(0);
        pump(&mut viewer);
        assert_eq!(viewer.pipeline().decode_count(), 1);

        viewer.refresh();
        assert_eq!(viewer.pipeline().decode_count(), 2);
    }

    #[test]
    fn video_frame_scrub_keeps_the_transform() {
        let pipeline = FakePipeline::new();
        pipeline.add_stream("/clip.y4m", image(8, 8), 10);
        let mut viewer = Viewer::new(pipeline);
        viewer.set_platform_size(1920.0, 1080.0);
        viewer.set_file_list(vec![PathBuf::from("/clip.y4m")]);
        viewer.load_image(0);
        pump(&mut viewer);
        assert_eq!(viewer.frame_count(), 10);

        viewer.mouse_wheel(500.0, 500.0, 3.0);
        let zoomed = *viewer.transform();

        viewer.set_video_frame(7);
        pump(&mut viewer);
        assert_eq!(viewer.frame_index(), 7);
        assert_eq!(*viewer.transform(), zoomed);

        // Fractional scrub rounds to the nearest frame.
        viewer.set_video_frame_fraction(0.5);
        pump(&mut viewer);
        assert_eq!(viewer.frame_index(), 5);
    }

    #[test]
    fn probe_disables_linear_sampling() {
        let mut viewer = viewer_with(&[("/a.png", image(8, 8))]);
        viewer.load_image(0);
        pump(&mut viewer);
        assert!(viewer.uses_linear_sampling());

        viewer.mouse_move(960.0, 540.0);
        assert!(!viewer.uses_linear_sampling());

        viewer.mouse_move(-5.0, -5.0);
        assert!(viewer.uses_linear_sampling());
    }

    #[test]
    fn failed_single_load_unloads() {
        let mut viewer = viewer_with(&[("/a.png", image(8, 8))]);
        viewer.set_file_list(vec![PathBuf::from("/missing.png")]);
        viewer.load_image(0);
        pump(&mut viewer);

        assert!(viewer.prepared_image().is_none());
        assert!(viewer.overlay_lines()[0].contains("Failed to load"));
    }
}
