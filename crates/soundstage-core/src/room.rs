//! Early-reflection geometry and the wet-bus send filters.

use crate::constants::{
    EARLY_COUNT, EARLY_JITTER_MAX_SEC, EARLY_MIN_DELAY_SEC, PRE_DELAY_MAX_SEC,
    PRE_DELAY_MIN_SEC,
};
use crate::preset::RoomConfig;
use glam::Vec3;
use rand::prelude::*;

/// Per-tap delay offsets, drawn once per engine so taps never line up into a
/// comb.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EarlyJitter(pub [f32; EARLY_COUNT]);

impl EarlyJitter {
    pub fn from_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut taps = [0.0; EARLY_COUNT];
        for t in taps.iter_mut() {
            *t = rng.gen_range(-EARLY_JITTER_MAX_SEC..=EARLY_JITTER_MAX_SEC);
        }
        Self(taps)
    }
}

pub fn tap_positions(room: &RoomConfig) -> [Vec3; EARLY_COUNT] {
    let mut out = [Vec3::ZERO; EARLY_COUNT];
    for (i, p) in out.iter_mut().enumerate() {
        let angle = i as f32 / EARLY_COUNT as f32 * std::f32::consts::TAU;
        let y = if i % 2 == 0 {
            room.elevation
        } else {
            -room.elevation
        };
        *p = Vec3::new(
            angle.cos() * room.radius,
            y,
            angle.sin() * room.radius - room.depth,
        );
    }
    out
}

pub fn tap_delays(room: &RoomConfig, depth: f32, jitter: &EarlyJitter) -> [f32; EARLY_COUNT] {
    let depth_scale = 0.75 + depth * 0.5;
    let mut out = [0.0; EARLY_COUNT];
    for (i, d) in out.iter_mut().enumerate() {
        let base = (room.delay_base
            + room.delay_spread * i as f32 / (EARLY_COUNT - 1) as f32)
            * depth_scale;
        let jitter = jitter.0[i] * (0.6 + depth_scale * 0.4);
        *d = (base + jitter).max(EARLY_MIN_DELAY_SEC);
    }
    out
}

pub fn early_highpass_hz(depth: f32) -> f32 {
    90.0 + depth * 170.0
}

pub fn reverb_highpass_hz(depth: f32) -> f32 {
    140.0 + depth * 220.0
}

pub fn reverb_pre_delay_sec(depth: f32, length: f32) -> f32 {
    let base = 0.012 + depth * 0.03;
    (base * (0.7 + length * 0.5)).clamp(PRE_DELAY_MIN_SEC, PRE_DELAY_MAX_SEC)
}

/// Everything the host needs to (re)configure the early taps and the wet
/// send chain. Changes only with the preset, depth or reverb length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoomTargets {
    pub tap_positions: [Vec3; EARLY_COUNT],
    pub tap_delays_sec: [f32; EARLY_COUNT],
    pub early_highpass_hz: f32,
    pub reverb_highpass_hz: f32,
    pub pre_delay_sec: f32,
}

impl RoomTargets {
    pub fn compute(room: &RoomConfig, depth: f32, length: f32, jitter: &EarlyJitter) -> Self {
        Self {
            tap_positions: tap_positions(room),
            tap_delays_sec: tap_delays(room, depth, jitter),
            early_highpass_hz: early_highpass_hz(depth),
            reverb_highpass_hz: reverb_highpass_hz(depth),
            pre_delay_sec: reverb_pre_delay_sec(depth, length),
        }
    }
}
