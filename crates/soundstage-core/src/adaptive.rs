//! Slow, spectrum-driven EQ factors that keep bass, vocals and treble balanced
//! across tracks.

use crate::bands::BandLevels;
use crate::math::exp_alpha;

const TAU_SEC: f32 = 0.9;
const MAX_DT_SEC: f64 = 0.25;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AdaptiveMixState {
    pub bass_factor: f32,
    pub vocal_factor: f32,
    pub treble_factor: f32,
    pub vocal_presence: f32,
    pub last_update_time_sec: Option<f64>,
}

impl Default for AdaptiveMixState {
    fn default() -> Self {
        Self {
            bass_factor: 1.0,
            vocal_factor: 1.0,
            treble_factor: 1.0,
            vocal_presence: 0.5,
            last_update_time_sec: None,
        }
    }
}

impl AdaptiveMixState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Ease the factors toward targets derived from `bands`. The first call
    /// after a reset only records the timestamp.
    pub fn update(&mut self, now_sec: f64, bands: &BandLevels) {
        let Some(last) = self.last_update_time_sec.replace(now_sec) else {
            return;
        };
        let dt = (now_sec - last).clamp(0.0, MAX_DT_SEC) as f32;
        let a = exp_alpha(dt, TAU_SEC);

        let presence_target =
            ((bands.mid - (bands.low + bands.high) * 0.5) * 2.2 + 0.5).clamp(0.0, 1.0);
        self.vocal_presence += (presence_target - self.vocal_presence) * a;

        let bass_target = (1.0 + (0.45 - bands.low) * 0.4).clamp(0.86, 1.14);
        let vocal_target = (1.0 + (0.5 - self.vocal_presence) * 0.16).clamp(0.92, 1.1);
        let treble_target = (1.0 + (0.22 - bands.high) * 0.5).clamp(0.88, 1.12);
        self.bass_factor += (bass_target - self.bass_factor) * a;
        self.vocal_factor += (vocal_target - self.vocal_factor) * a;
        self.treble_factor += (treble_target - self.treble_factor) * a;
    }
}
