//! Sliders and their hit testing.
//!
//! Controls are re-registered every frame by the render pass; the frame
//! hands back the list of active hit areas, and pointer events walk that
//! list. A slider's value is a tagged integer or float with explicit
//! bounds and step, so pointer math rounds in the value's own domain.

use crate::blit::RectF;

/// Identity of every slider the viewer can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliderId {
    /// Tonemap curve contrast.
    TonemapContrast,
    /// Tonemap clip point.
    TonemapClipPoint,
    /// Tonemap shoulder speed.
    TonemapSpeed,
    /// Tonemap shoulder power.
    TonemapPower,
    /// SDR destination luminance in nits.
    TonemapLuminance,
    /// Reference luminance for the sRGB highlight pass.
    HighlightLuminance,
    /// Luminance assumed for sources that don't state one.
    UnspecLuminance,
    /// Video frame scrubber.
    VideoFrame,
}

impl SliderId {
    /// Short label drawn next to the slider.
    pub const fn label(self) -> &'static str {
        match self {
            Self::TonemapContrast => "Contrast",
            Self::TonemapClipPoint => "Clip Point",
            Self::TonemapSpeed => "Speed",
            Self::TonemapPower => "Power",
            Self::TonemapLuminance => "Luminance",
            Self::HighlightLuminance => "Highlight Nits",
            Self::UnspecLuminance => "Unspec Nits",
            Self::VideoFrame => "Frame",
        }
    }
}

/// What releasing or changing a slider triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlFlags {
    /// Value changes re-run color preparation.
    pub prepare: bool,
    /// Release requests a reload (frame scrubbing).
    pub reload: bool,
}

impl ControlFlags {
    /// Flags for a slider that re-prepares on change.
    pub const PREPARE: Self = Self {
        prepare: true,
        reload: false,
    };
    /// Flags for a slider that reloads on release.
    pub const RELOAD: Self = Self {
        prepare: false,
        reload: true,
    };
}

/// A slider value with bounds and step, integer or float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SliderValue {
    /// Integer-valued slider.
    Int {
        /// Current value.
        value: i32,
        /// Inclusive minimum.
        min: i32,
        /// Inclusive maximum.
        max: i32,
        /// Rounding granularity.
        step: i32,
    },
    /// Float-valued slider.
    Float {
        /// Current value.
        value: f32,
        /// Inclusive minimum.
        min: f32,
        /// Inclusive maximum.
        max: f32,
        /// Rounding granularity.
        step: f32,
    },
}

impl SliderValue {
    /// Integer slider.
    pub const fn int(value: i32, min: i32, max: i32, step: i32) -> Self {
        Self::Int {
            value,
            min,
            max,
            step,
        }
    }

    /// Float slider.
    pub const fn float(value: f32, min: f32, max: f32, step: f32) -> Self {
        Self::Float {
            value,
            min,
            max,
            step,
        }
    }

    /// Current value as `f32` regardless of variant.
    pub fn as_f32(&self) -> f32 {
        match *self {
            Self::Int { value, .. } => value as f32,
            Self::Float { value, .. } => value,
        }
    }

    /// Current value as `i32`, truncating for floats.
    pub fn as_i32(&self) -> i32 {
        match *self {
            Self::Int { value, .. } => value,
            Self::Float { value, .. } => value as i32,
        }
    }

    /// Handle position as a fraction of the track, in `[0, 1]`.
    pub fn fraction(&self) -> f32 {
        match *self {
            Self::Int {
                value, min, max, ..
            } => {
                if max <= min {
                    0.0
                } else {
                    (value - min) as f32 / (max - min) as f32
                }
            }
            Self::Float {
                value, min, max, ..
            } => {
                if max <= min {
                    0.0
                } else {
                    (value - min) / (max - min)
                }
            }
        }
    }

    /// Sets the value from a track fraction, rounding to the nearest
    /// multiple of `step` and clamping to bounds. Returns `true` when
    /// the stored value changed.
    pub fn set_fraction(&mut self, fraction: f32) -> bool {
        let fraction = fraction.clamp(0.0, 1.0);
        match self {
            Self::Int {
                value,
                min,
                max,
                step,
            } => {
                let raw = *min as f32 + fraction * (*max - *min) as f32;
                let step = (*step).max(1);
                let rounded = ((raw / step as f32).round() as i32 * step).clamp(*min, *max);
                let changed = rounded != *value;
                *value = rounded;
                changed
            }
            Self::Float {
                value,
                min,
                max,
                step,
            } => {
                let raw = *min + fraction * (*max - *min);
                let rounded = if *step > 0.0 {
                    ((raw / *step).round() * *step).clamp(*min, *max)
                } else {
                    raw
                };
                let changed = (rounded - *value).abs() > f32::EPSILON;
                *value = rounded;
                changed
            }
        }
    }

    /// Sets the value directly (clamped to bounds, not step-rounded).
    /// Returns `true` when the stored value changed.
    pub fn set(&mut self, new: f32) -> bool {
        match self {
            Self::Int { value, min, max, .. } => {
                let clamped = (new as i32).clamp(*min, *max);
                let changed = clamped != *value;
                *value = clamped;
                changed
            }
            Self::Float { value, min, max, .. } => {
                let clamped = new.clamp(*min, *max);
                let changed = (clamped - *value).abs() > f32::EPSILON;
                *value = clamped;
                changed
            }
        }
    }
}

/// A slider: its value plus what changing it triggers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slider {
    /// Current value, bounds and step.
    pub value: SliderValue,
    /// Side effects on change/release.
    pub flags: ControlFlags,
}

impl Slider {
    /// Builds a slider.
    pub const fn new(value: SliderValue, flags: ControlFlags) -> Self {
        Self { value, flags }
    }
}

/// A control registered by the most recent render pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveControl {
    /// Which slider this hit area belongs to.
    pub id: SliderId,
    /// Hit area in viewport pixels.
    pub rect: RectF,
}

/// First control whose rect contains the point, in registration order.
pub fn hit_test(controls: &[ActiveControl], x: f32, y: f32) -> Option<&ActiveControl> {
    controls.iter().find(|c| c.rect.contains(x, y))
}

/// Track fraction for a pointer x within a control rect.
pub fn pointer_fraction(rect: &RectF, x: f32) -> f32 {
    if rect.w <= 0.0 {
        return 0.0;
    }
    ((x - rect.x) / rect.w).clamp(0.0, 1.0)
}
