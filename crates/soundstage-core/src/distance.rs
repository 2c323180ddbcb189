//! Distance and air model.
//!
//! Every function here is pure: the same offset and depth always produce
//! bit-identical targets.

use crate::constants::{
    AIR_CUTOFF_BASE, AIR_HIGHPASS_MARGIN_HZ, AIR_MAX_HZ, DISTANCE_FALLBACK,
};
use crate::layout::{BandId, BandLayout};
use crate::math::{clamp_or, lerp};

/// Near/far anchors of the distance model. `depth` arguments below are the
/// depth control as a `0..=1` factor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistanceModel {
    pub near: f32,
    pub far: f32,
    pub direct_near: f32,
    pub direct_far: f32,
    pub early_near: f32,
    pub early_far: f32,
    pub reverb_near: f32,
    pub reverb_far: f32,
    pub blend_base: f32,
    pub blend_depth: f32,
    pub low_resonance_far: f32,
    pub vocal_resonance_far: f32,
    pub reverb_trim_far: f32,
}

impl Default for DistanceModel {
    fn default() -> Self {
        Self {
            near: 0.8,
            far: 4.5,
            direct_near: 1.0,
            direct_far: 0.62,
            early_near: 0.7,
            early_far: 1.15,
            reverb_near: 0.6,
            reverb_far: 1.35,
            blend_base: 1.0,
            blend_depth: 0.65,
            low_resonance_far: 1.22,
            vocal_resonance_far: 1.14,
            reverb_trim_far: 0.9,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistanceProfile {
    pub distance_norm: f32,
    pub direct: f32,
    pub early: f32,
    pub reverb: f32,
}

impl DistanceProfile {
    pub const UNITY: Self = Self {
        distance_norm: 0.0,
        direct: 1.0,
        early: 1.0,
        reverb: 1.0,
    };
}

/// Gain compensation for the low/vocal bands and a trim for the wet busses.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResonanceComp {
    pub low: f32,
    pub vocal: f32,
    pub reverb: f32,
}

impl ResonanceComp {
    pub const UNITY: Self = Self {
        low: 1.0,
        vocal: 1.0,
        reverb: 1.0,
    };
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AirAbsorption {
    pub factor: f32,
    pub min_hz: f32,
}

impl AirAbsorption {
    /// Low band absorbs least.
    pub fn for_band(id: BandId) -> Self {
        match id {
            BandId::Low => Self {
                factor: 0.35,
                min_hz: 2400.0,
            },
            BandId::Mid => Self {
                factor: 0.8,
                min_hz: 4200.0,
            },
            BandId::High => Self {
                factor: 1.15,
                min_hz: 5200.0,
            },
        }
    }
}

impl DistanceModel {
    /// Bring a raw source distance into the modelled range.
    pub fn clamp_distance(&self, distance: f32) -> f32 {
        clamp_or(
            distance,
            self.near * 0.45,
            self.far * 1.8,
            DISTANCE_FALLBACK,
        )
    }

    pub fn distance_norm(&self, distance: f32) -> f32 {
        let span = (self.far - self.near).max(0.001);
        clamp_or((distance - self.near) / span, 0.0, 1.0, 0.0)
    }

    pub fn blend(&self, distance_norm: f32, depth: f32) -> f32 {
        clamp_or(
            distance_norm * (self.blend_base + depth * self.blend_depth),
            0.0,
            1.0,
            0.0,
        )
    }

    pub fn profile(&self, distance: f32, depth: f32) -> DistanceProfile {
        let distance_norm = self.distance_norm(distance);
        let t = self.blend(distance_norm, depth);
        DistanceProfile {
            distance_norm,
            direct: lerp(self.direct_near, self.direct_far, t),
            early: lerp(self.early_near, self.early_far, t),
            reverb: lerp(self.reverb_near, self.reverb_far, t),
        }
    }

    pub fn resonance(&self, distance_norm: f32, depth: f32) -> ResonanceComp {
        let t = self.blend(distance_norm, depth);
        ResonanceComp {
            low: lerp(1.0, self.low_resonance_far, t),
            vocal: lerp(1.0, self.vocal_resonance_far, t),
            reverb: lerp(1.0, self.reverb_trim_far, t),
        }
    }

    /// Lowpass cutoff simulating high-frequency loss over distance. Never
    /// drops below the band's own highpass plus a margin.
    pub fn air_cutoff_hz(&self, distance_norm: f32, depth: f32, band: &BandLayout) -> f32 {
        let air = AirAbsorption::for_band(band.id);
        let absorb = clamp_or(
            distance_norm * (0.25 + depth * 0.32) * air.factor,
            0.0,
            1.0,
            0.0,
        );
        let cutoff = AIR_MAX_HZ * AIR_CUTOFF_BASE.powf(absorb);
        let min_cutoff = air
            .min_hz
            .max(band.highpass_floor_hz() + AIR_HIGHPASS_MARGIN_HZ);
        clamp_or(cutoff, min_cutoff, AIR_MAX_HZ, AIR_MAX_HZ)
    }
}

/// High-frequency tilt shared by the early-tap and reverb-tone filters.
pub fn air_tilt(distance_norm: f32, depth: f32) -> f32 {
    1.0 - distance_norm * (0.03 + depth * 0.07)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::band;

    #[test]
    fn far_distance_hits_far_constants() {
        let m = DistanceModel::default();
        for depth in [0.0, 0.3, 0.7, 1.0] {
            for d in [m.far, m.far + 0.5, 100.0] {
                let p = m.profile(d, depth);
                assert_eq!(p.distance_norm, 1.0);
                assert_eq!(p.direct, m.direct_far);
                assert_eq!(p.early, m.early_far);
                assert_eq!(p.reverb, m.reverb_far);
            }
        }
    }

    #[test]
    fn near_distance_hits_near_constants() {
        let m = DistanceModel::default();
        let p = m.profile(0.1, 0.8);
        assert_eq!(p.distance_norm, 0.0);
        assert_eq!(p.direct, m.direct_near);
        assert_eq!(m.resonance(0.0, 0.8), ResonanceComp::UNITY);
    }

    #[test]
    fn nan_distance_falls_back() {
        let m = DistanceModel::default();
        assert_eq!(m.clamp_distance(f32::NAN), DISTANCE_FALLBACK);
        assert_eq!(m.distance_norm(f32::NAN), 0.0);
        assert_eq!(m.clamp_distance(0.0), m.near * 0.45);
        assert_eq!(m.clamp_distance(1e9), m.far * 1.8);
    }

    #[test]
    fn low_band_keeps_more_air_than_high() {
        let m = DistanceModel::default();
        let low = m.air_cutoff_hz(1.0, 1.0, band(BandId::Low));
        let high = m.air_cutoff_hz(1.0, 1.0, band(BandId::High));
        assert!(low > high);
        assert_eq!(m.air_cutoff_hz(0.0, 1.0, band(BandId::Mid)), AIR_MAX_HZ);
    }

    #[test]
    fn air_cutoff_respects_highpass_floor() {
        let m = DistanceModel::default();
        let high = band(BandId::High);
        let cutoff = m.air_cutoff_hz(1.0, 1.0, high);
        assert!(cutoff >= high.highpass_floor_hz() + AIR_HIGHPASS_MARGIN_HZ);
        assert!(cutoff <= AIR_MAX_HZ);
    }
}
