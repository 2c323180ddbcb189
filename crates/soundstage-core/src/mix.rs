//! Gain and filter targets for every bus, derived from the distance profile,
//! resonance compensation, adaptive EQ and user controls.

use crate::adaptive::AdaptiveMixState;
use crate::constants::{
    AIR_MAX_HZ, EARLY_ATTENUATION, EARLY_CUTOFF_MAX_HZ, EARLY_CUTOFF_MIN_HZ, MAKEUP_MAX,
    MAKEUP_SPAN, MID_BOOST, PRESENCE_BOOST_DB, REVERB_ATTENUATION, REVERB_TONE_MAX_HZ,
    REVERB_TONE_MIN_HZ, SIDE_ATTENUATION, SIDE_GAIN_BOOST, SIDE_LEFT_BIAS, SIDE_RIGHT_BIAS,
};
use crate::controls::{Controls, Eq3};
use crate::distance::{air_tilt, DistanceModel, DistanceProfile, ResonanceComp};
use crate::layout::{BandId, DIRECT_BANDS};
use crate::math::clamp_or;
use crate::preset::SpatialConfig;
use smallvec::SmallVec;

#[derive(Clone, Debug, PartialEq)]
pub struct BandMix {
    pub id: BandId,
    pub gain: f32,
    pub air_cutoff_hz: f32,
    pub lane_delays_sec: SmallVec<[f32; 2]>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MixTargets {
    pub profile: DistanceProfile,
    pub resonance: ResonanceComp,
    pub direct_gain: f32,
    pub bands: [BandMix; 3],
    pub side_left_gain: f32,
    pub side_right_gain: f32,
    pub early_gain: f32,
    pub early_cutoff_hz: f32,
    pub reverb_gain: f32,
    pub reverb_tone_hz: f32,
    pub reverb_low_shelf_db: f32,
    pub reverb_presence_db: f32,
    pub makeup: f32,
    /// `volume * makeup`.
    pub master_gain: f32,
    pub eq: Eq3,
}

pub struct MixInputs<'a> {
    pub config: &'a SpatialConfig,
    pub controls: &'a Controls,
    pub adaptive: &'a AdaptiveMixState,
    pub model: &'a DistanceModel,
    pub bypass: bool,
    /// Raw direct-source distance; clamped here.
    pub distance: f32,
}

/// Compensates the level lost when the direct path is pulled back.
pub fn makeup_gain(direct_factor: f32, bypass: bool) -> f32 {
    if bypass {
        return 1.0;
    }
    (1.0 + (1.0 - direct_factor) * MAKEUP_SPAN).clamp(1.0, MAKEUP_MAX)
}

pub fn compute_mix(inp: &MixInputs) -> MixTargets {
    let cfg = inp.config;
    let c = inp.controls;
    let depth = c.depth_factor();
    let bypass = inp.bypass;

    let (profile, resonance, adaptive) = if bypass {
        (DistanceProfile::UNITY, ResonanceComp::UNITY, (1.0, 1.0, 1.0))
    } else {
        let distance = inp.model.clamp_distance(inp.distance);
        let profile = inp.model.profile(distance, depth);
        let resonance = inp.model.resonance(profile.distance_norm, depth);
        let a = inp.adaptive;
        (profile, resonance, (a.bass_factor, a.vocal_factor, a.treble_factor))
    };
    let norm = profile.distance_norm;

    let side_base = if bypass { 0.62 } else { 0.48 + (1.0 - depth) * 0.24 };
    let side_trim = if bypass { 1.0 } else { SIDE_ATTENUATION };
    let side = side_base * (1.0 - norm * 0.08) * SIDE_GAIN_BOOST * side_trim;

    let bands = DIRECT_BANDS.map(|band| {
        let gain = match band.id {
            BandId::Low => band.gain * resonance.low * adaptive.0,
            BandId::Mid => {
                let boost = if bypass { 1.0 } else { MID_BOOST };
                band.gain * resonance.vocal * boost * adaptive.1
            }
            BandId::High => {
                band.gain * (0.92 + depth * 0.42) * (1.0 - norm * 0.02) * adaptive.2
            }
        };
        let air_cutoff_hz = if bypass {
            AIR_MAX_HZ
        } else {
            inp.model.air_cutoff_hz(norm, depth, &band)
        };
        let lane_delays_sec = band
            .lane_delays_sec
            .iter()
            .map(|&d| if bypass { 0.0 } else { d })
            .collect();
        BandMix {
            id: band.id,
            gain,
            air_cutoff_hz,
            lane_delays_sec,
        }
    });

    let tilt = air_tilt(norm, depth);
    let damp = cfg.early.room.damp;
    let early_cutoff_hz = clamp_or(damp * tilt, EARLY_CUTOFF_MIN_HZ, EARLY_CUTOFF_MAX_HZ, damp);
    let tone = c.tone_factor();
    let reverb_tone_hz = (damp * 0.92 * (0.82 + tone * 0.88) * tilt)
        .clamp(REVERB_TONE_MIN_HZ, REVERB_TONE_MAX_HZ);

    let (early_gain, reverb_gain, reverb_low_shelf_db, reverb_presence_db) = if bypass {
        (0.0, 0.0, 0.0, 0.0)
    } else {
        (
            cfg.early.gain
                * depth
                * c.early_factor()
                * profile.early
                * resonance.reverb
                * EARLY_ATTENUATION,
            cfg.reverb.gain
                * depth
                * profile.reverb
                * resonance.reverb
                * (0.82 + tone * 0.22)
                * REVERB_ATTENUATION,
            1.4 + (resonance.low - 1.0) * 8.0,
            0.8 + (resonance.vocal - 1.0) * 7.0 + PRESENCE_BOOST_DB,
        )
    };

    let makeup = makeup_gain(profile.direct, bypass);
    MixTargets {
        profile,
        resonance,
        direct_gain: cfg.direct.gain * profile.direct,
        bands,
        side_left_gain: side * SIDE_LEFT_BIAS,
        side_right_gain: side * SIDE_RIGHT_BIAS,
        early_gain,
        early_cutoff_hz,
        reverb_gain,
        reverb_tone_hz,
        reverb_low_shelf_db,
        reverb_presence_db,
        makeup,
        master_gain: c.volume * makeup,
        eq: c.eq,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::PresetCatalog;

    fn mix(id: &str, distance: f32, bypass: bool) -> MixTargets {
        let config = PresetCatalog::builtin().resolve(id).config;
        let controls = Controls::default();
        let adaptive = AdaptiveMixState {
            bass_factor: 0.9,
            vocal_factor: 1.05,
            treble_factor: 1.1,
            ..Default::default()
        };
        compute_mix(&MixInputs {
            config: &config,
            controls: &controls,
            adaptive: &adaptive,
            model: &DistanceModel::default(),
            bypass,
            distance,
        })
    }

    #[test]
    fn bypass_silences_wet_busses() {
        let m = mix("cathedral", 3.0, true);
        assert_eq!(m.early_gain, 0.0);
        assert_eq!(m.reverb_gain, 0.0);
        assert_eq!(m.reverb_low_shelf_db, 0.0);
        assert_eq!(m.reverb_presence_db, 0.0);
        assert_eq!(m.makeup, 1.0);
    }

    #[test]
    fn bypass_uses_unity_distance_factors() {
        let m = mix("void", 4.0, true);
        let config = PresetCatalog::builtin().resolve("void").config;
        assert_eq!(m.direct_gain, config.direct.gain);
        assert_eq!(m.bands[0].gain, DIRECT_BANDS[0].gain);
        assert!(m.bands.iter().all(|b| b.air_cutoff_hz == AIR_MAX_HZ));
        assert!(m
            .bands
            .iter()
            .all(|b| b.lane_delays_sec.iter().all(|&d| d == 0.0)));
    }

    #[test]
    fn distance_pulls_direct_down_and_reverb_up() {
        let near = mix("hall", 0.9, false);
        let far = mix("hall", 4.0, false);
        assert!(far.direct_gain < near.direct_gain);
        assert!(far.reverb_gain > near.reverb_gain);
        assert!(far.makeup > near.makeup);
        assert!(far.makeup <= MAKEUP_MAX);
    }

    #[test]
    fn high_band_keeps_lane_delay_when_active() {
        let m = mix("club", 1.2, false);
        assert_eq!(m.bands[2].lane_delays_sec.as_slice(), &[0.0, 0.012]);
        assert!(m.early_gain > 0.0);
    }

    #[test]
    fn cutoffs_stay_in_range() {
        for d in [0.0, 1.0, 5.0, f32::NAN] {
            let m = mix("void", d, false);
            assert!((EARLY_CUTOFF_MIN_HZ..=EARLY_CUTOFF_MAX_HZ).contains(&m.early_cutoff_hz));
            assert!((REVERB_TONE_MIN_HZ..=REVERB_TONE_MAX_HZ).contains(&m.reverb_tone_hz));
            assert!(m.master_gain.is_finite());
        }
    }
}
