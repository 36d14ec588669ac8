//! Tonemap parameters and conversion requests.

use crate::profile::Profile;

/// Whether the pipeline may tone-map while converting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TonemapMode {
    /// Pipeline decides based on source/destination luminance, using the
    /// supplied [`TonemapParams`] when it does.
    #[default]
    Auto,
    /// Never tone-map; out-of-range values clip. Used for diff and
    /// highlight renditions, which must stay value-faithful.
    Off,
}

/// Parametric tonemap curve controls.
///
/// The meaning of each knob belongs to the external pipeline; the viewer
/// only stores, edits (via sliders) and forwards them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TonemapParams {
    /// Curve contrast.
    pub contrast: f32,
    /// Luminance at which the curve reaches full clip.
    pub clip_point: f32,
    /// How quickly the shoulder approaches the clip point.
    pub speed: f32,
    /// Shoulder exponent.
    pub power: f32,
    /// Destination luminance in nits.
    pub luminance: u32,
}

impl Default for TonemapParams {
    fn default() -> Self {
        Self {
            contrast: 1.0,
            clip_point: 1.0,
            speed: 1.0,
            power: 1.0,
            luminance: 80,
        }
    }
}

/// Everything `convert` needs beyond the source image.
#[derive(Debug, Clone, Copy)]
pub struct ConvertRequest {
    /// Destination bit depth per channel.
    pub depth: u8,
    /// Destination color volume.
    pub profile: Profile,
    /// Tonemap policy for this conversion.
    pub tonemap: TonemapMode,
    /// Tonemap curve parameters (consulted per `tonemap`).
    pub params: TonemapParams,
    /// Luminance to assume for sources whose profile reports 0 nits.
    pub fallback_luminance: u32,
}

impl ConvertRequest {
    /// Conversion to 16 bpc with tonemapping allowed.
    pub fn prepared(profile: Profile, params: TonemapParams, fallback_luminance: u32) -> Self {
        Self {
            depth: 16,
            profile,
            tonemap: TonemapMode::Auto,
            params,
            fallback_luminance,
        }
    }

    /// Disables tonemapping, returning the adjusted request.
    #[must_use]
    pub fn without_tonemap(mut self) -> Self {
        self.tonemap = TonemapMode::Off;
        self
    }
}
