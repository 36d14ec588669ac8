//! Scalar transfer-function helpers for UI element brightness.
//!
//! The pipeline owns image color conversion; the viewer only needs PQ
//! and gamma scalars to compute the intensity of text and fills so they
//! sit at a comfortable brightness on both SDR and PQ-encoded HDR
//! surfaces.

/// SMPTE ST 2084 (PQ) constants.
const PQ_M1: f32 = 2610.0 / 16384.0;
const PQ_M2: f32 = 2523.0 / 4096.0 * 128.0;
const PQ_C1: f32 = 3424.0 / 4096.0;
const PQ_C2: f32 = 2413.0 / 4096.0 * 32.0;
const PQ_C3: f32 = 2392.0 / 4096.0 * 32.0;

/// PQ reference peak in nits.
pub const PQ_PEAK: u32 = 10000;

/// [`PQ_PEAK`] as a float, for signal normalization.
pub const PQ_PEAK_NITS: f32 = PQ_PEAK as f32;

/// PQ inverse EOTF: linear light (normalized to 10000 nits) to signal.
pub fn pq_oetf(linear: f32) -> f32 {
    let l = linear.clamp(0.0, 1.0);
    let lm = l.powf(PQ_M1);
    ((PQ_C1 + PQ_C2 * lm) / (1.0 + PQ_C3 * lm)).powf(PQ_M2)
}

/// PQ EOTF: signal to linear light normalized to 10000 nits.
pub fn pq_eotf(signal: f32) -> f32 {
    let v = signal.clamp(0.0, 1.0);
    let vp = v.powf(1.0 / PQ_M2);
    let num = (vp - PQ_C1).max(0.0);
    (num / (PQ_C2 - PQ_C3 * vp)).powf(1.0 / PQ_M1)
}

/// Power-law EOTF: signal to normalized linear light.
pub fn gamma_eotf(signal: f32, gamma: f32) -> f32 {
    signal.clamp(0.0, 1.0).powf(gamma)
}

/// Brightness multiplier for UI text and fills on the output surface.
///
/// `level` is a perceptual intensity in `[0, 1]` (alpha-like, already
/// fade-scaled). On an SDR surface it passes through unchanged. On a PQ
/// surface the same perceptual level is re-encoded so the element lands
/// at the SDR white level instead of the display peak: decode `level`
/// through gamma 2.2, scale by `sdr_white / 10000`, and PQ-encode.
pub fn surface_text_level(level: f32, hdr_active: bool, sdr_white: u32) -> f32 {
    if !hdr_active {
        return level;
    }
    let linear = gamma_eotf(level, 2.2) * sdr_white as f32 / PQ_PEAK_NITS;
    pq_oetf(linear)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn pq_anchors() {
        // Signal 1.0 is 10000 nits, signal 0.0 is black.
        assert_relative_eq!(pq_oetf(1.0), 1.0, epsilon = 1e-5);
        assert_relative_eq!(pq_oetf(0.0), 0.0, epsilon = 1e-5);
        // 100 nits encodes near signal 0.508 per ST 2084.
        assert_relative_eq!(pq_oetf(100.0 / PQ_PEAK_NITS), 0.5081, epsilon = 1e-3);
    }

    #[test]
    fn pq_round_trip() {
        for i in 0..=20 {
            let l = i as f32 / 20.0;
            assert_relative_eq!(pq_eotf(pq_oetf(l)), l, epsilon = 1e-4);
        }
    }

    #[test]
    fn text_level_passthrough_on_sdr() {
        assert_relative_eq!(surface_text_level(0.75, false, 80), 0.75);
    }

    #[test]
    fn text_level_maps_white_to_sdr_white_on_pq() {
        // Full-intensity text on a PQ surface lands at the SDR white
        // level, not at the display peak.
        let level = surface_text_level(1.0, true, 80);
        assert_relative_eq!(pq_eotf(level) * PQ_PEAK_NITS, 80.0, epsilon = 0.1);
        // Brighter SDR white means brighter text.
        assert!(surface_text_level(1.0, true, 200) > level);
    }
}
