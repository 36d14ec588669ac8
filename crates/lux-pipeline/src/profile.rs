//! Color volume descriptions: primaries, transfer curve, peak luminance.
//!
//! A [`Profile`] is the viewer's unit of color negotiation with the
//! pipeline: every decoded image carries one, and the color-preparation
//! policy builds one to describe the display target.

/// Diffuse-white scene light for an HLG signal value of 0.75.
///
/// `hlg_eotf(0.75)` per ITU-R BT.2100-2.
const HLG_DIFFUSE_WHITE_SCENE: f32 = 0.265;

/// HLG system gamma for the reference viewing environment.
const HLG_SYSTEM_GAMMA: f32 = 1.2;

/// Stock color primaries (gamut) understood by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Primaries {
    /// ITU-R BT.709 / sRGB primaries (standard gamut).
    #[default]
    Bt709,
    /// ITU-R BT.2020 primaries (wide gamut).
    Bt2020,
}

impl Primaries {
    /// Display label for overlay text.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bt709 => "BT.709",
            Self::Bt2020 => "BT.2020",
        }
    }
}

/// Transfer curve family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurveKind {
    /// Pure power-law gamma; exponent carried in [`Curve::gamma`].
    #[default]
    Gamma,
    /// SMPTE ST 2084 perceptual quantizer.
    Pq,
    /// ITU-R BT.2100 hybrid log-gamma.
    Hlg,
}

impl CurveKind {
    /// Display label for overlay text.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Gamma => "Gamma",
            Self::Pq => "PQ",
            Self::Hlg => "HLG",
        }
    }
}

/// A transfer curve: kind plus gamma exponent.
///
/// `gamma` is meaningful only for [`CurveKind::Gamma`]; PQ and HLG carry
/// a nominal 1.0 so [`Profile::matches`] stays a plain field compare.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Curve {
    /// Curve family.
    pub kind: CurveKind,
    /// Power-law exponent (1.0 = linear).
    pub gamma: f32,
}

impl Curve {
    /// Pure gamma curve with the given exponent.
    #[inline]
    pub const fn gamma(gamma: f32) -> Self {
        Self {
            kind: CurveKind::Gamma,
            gamma,
        }
    }

    /// Perceptual quantizer curve.
    #[inline]
    pub const fn pq() -> Self {
        Self {
            kind: CurveKind::Pq,
            gamma: 1.0,
        }
    }

    /// Hybrid log-gamma curve.
    #[inline]
    pub const fn hlg() -> Self {
        Self {
            kind: CurveKind::Hlg,
            gamma: 1.0,
        }
    }

    /// True for a gamma curve with exponent 1.0.
    #[inline]
    pub fn is_linear(&self) -> bool {
        self.kind == CurveKind::Gamma && (self.gamma - 1.0).abs() < 1e-6
    }
}

impl Default for Curve {
    fn default() -> Self {
        Self::gamma(2.2)
    }
}

/// A color volume: primaries, transfer curve, and peak luminance in nits.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Profile {
    /// Gamut primaries.
    pub primaries: Primaries,
    /// Transfer curve.
    pub curve: Curve,
    /// Peak luminance in nits; 0 means unspecified by the source.
    pub max_luminance: u32,
}

impl Profile {
    /// Builds a profile from stock parts.
    pub const fn stock(primaries: Primaries, kind: CurveKind, max_luminance: u32) -> Self {
        let curve = match kind {
            CurveKind::Gamma => Curve::gamma(2.2),
            CurveKind::Pq => Curve::pq(),
            CurveKind::Hlg => Curve::hlg(),
        };
        Self {
            primaries,
            curve,
            max_luminance,
        }
    }

    /// sRGB-ish SDR profile at the given white level.
    pub const fn sdr(max_luminance: u32) -> Self {
        Self {
            primaries: Primaries::Bt709,
            curve: Curve::gamma(2.2),
            max_luminance,
        }
    }

    /// Returns `true` when two profiles describe the same color volume.
    pub fn matches(&self, other: &Profile) -> bool {
        self.primaries == other.primaries
            && self.curve.kind == other.curve.kind
            && (self.curve.gamma - other.curve.gamma).abs() < 1e-6
            && self.max_luminance == other.max_luminance
    }

    /// Replaces the peak luminance, returning the adjusted profile.
    #[must_use]
    pub fn with_luminance(mut self, max_luminance: u32) -> Self {
        self.max_luminance = max_luminance;
        self
    }

    /// Human-readable description for info lines.
    pub fn describe(&self) -> String {
        match self.curve.kind {
            CurveKind::Gamma => format!(
                "{} g{:.1} @ {} nits",
                self.primaries.label(),
                self.curve.gamma,
                self.max_luminance
            ),
            _ => format!(
                "{} {} @ {} nits",
                self.primaries.label(),
                self.curve.kind.label(),
                self.max_luminance
            ),
        }
    }
}

/// Peak display luminance implied by an HLG signal at a given diffuse
/// white level.
///
/// HLG is scene-referred; its display peak depends on where diffuse
/// white lands. With the reference OOTF (system gamma 1.2), signal 0.75
/// (diffuse white) maps to `peak * 0.265^1.2`, so
/// `peak = white / 0.265^1.2`. A 203 nit diffuse white yields the
/// customary ~1000 nit HLG peak.
pub fn hlg_peak_luminance(diffuse_white: u32) -> u32 {
    let ratio = HLG_DIFFUSE_WHITE_SCENE.powf(HLG_SYSTEM_GAMMA);
    (diffuse_white as f32 / ratio).round() as u32
}
