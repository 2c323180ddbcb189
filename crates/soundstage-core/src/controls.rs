//! User-facing scalar controls, stored in UI units and clamped on write.

use crate::math::clamp_or;

pub const VOLUME_RANGE: (f32, f32) = (0.0, 1.0);
pub const DEPTH_RANGE: (f32, f32) = (0.0, 100.0);
pub const FOCUS_RANGE: (f32, f32) = (-100.0, 100.0);
pub const EARLY_MIX_RANGE: (f32, f32) = (0.0, 140.0);
pub const REVERB_LENGTH_RANGE: (f32, f32) = (40.0, 160.0);
pub const REVERB_TONE_RANGE: (f32, f32) = (0.0, 100.0);
pub const MOTION_INTENSITY_RANGE: (f32, f32) = (0.0, 160.0);
pub const EQ_RANGE_DB: (f32, f32) = (-12.0, 12.0);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Eq3 {
    pub bass_db: f32,
    pub mid_db: f32,
    pub treble_db: f32,
}

impl Eq3 {
    pub const FLAT: Self = Self {
        bass_db: 0.0,
        mid_db: 0.0,
        treble_db: 0.0,
    };
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Controls {
    pub volume: f32,
    /// Percent, 0..=100.
    pub depth: f32,
    /// Percent, -100..=100; turns the listener and shifts the stage in depth.
    pub focus: f32,
    /// Percent, 0..=140.
    pub early_mix: f32,
    /// Percent, 40..=160.
    pub reverb_length: f32,
    /// Percent, 0..=100.
    pub reverb_tone: f32,
    pub motion_enabled: bool,
    /// Percent, 0..=160.
    pub motion_intensity: f32,
    pub eq: Eq3,
    pub visualizer_enabled: bool,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            volume: 0.8,
            depth: 70.0,
            focus: 0.0,
            early_mix: 100.0,
            reverb_length: 100.0,
            reverb_tone: 50.0,
            motion_enabled: true,
            motion_intensity: 90.0,
            eq: Eq3::FLAT,
            visualizer_enabled: true,
        }
    }
}

fn clamp_range(value: f32, range: (f32, f32), fallback: f32) -> f32 {
    clamp_or(value, range.0, range.1, fallback)
}

impl Controls {
    pub fn set_volume(&mut self, v: f32) {
        self.volume = clamp_range(v, VOLUME_RANGE, Self::default().volume);
    }

    pub fn set_depth(&mut self, v: f32) {
        self.depth = clamp_range(v, DEPTH_RANGE, Self::default().depth);
    }

    pub fn set_focus(&mut self, v: f32) {
        self.focus = clamp_range(v, FOCUS_RANGE, 0.0);
    }

    pub fn set_early_mix(&mut self, v: f32) {
        self.early_mix = clamp_range(v, EARLY_MIX_RANGE, 100.0);
    }

    pub fn set_reverb_length(&mut self, v: f32) {
        self.reverb_length = clamp_range(v, REVERB_LENGTH_RANGE, 100.0);
    }

    pub fn set_reverb_tone(&mut self, v: f32) {
        self.reverb_tone = clamp_range(v, REVERB_TONE_RANGE, 50.0);
    }

    pub fn set_motion_intensity(&mut self, v: f32) {
        self.motion_intensity = clamp_range(v, MOTION_INTENSITY_RANGE, 90.0);
    }

    pub fn set_eq(&mut self, bass_db: f32, mid_db: f32, treble_db: f32) {
        self.eq = Eq3 {
            bass_db: clamp_range(bass_db, EQ_RANGE_DB, 0.0),
            mid_db: clamp_range(mid_db, EQ_RANGE_DB, 0.0),
            treble_db: clamp_range(treble_db, EQ_RANGE_DB, 0.0),
        };
    }

    /// Re-clamp every field; used after deserializing untrusted values.
    pub fn sanitized(self) -> Self {
        let mut c = Self {
            motion_enabled: self.motion_enabled,
            visualizer_enabled: self.visualizer_enabled,
            ..Self::default()
        };
        c.set_volume(self.volume);
        c.set_depth(self.depth);
        c.set_focus(self.focus);
        c.set_early_mix(self.early_mix);
        c.set_reverb_length(self.reverb_length);
        c.set_reverb_tone(self.reverb_tone);
        c.set_motion_intensity(self.motion_intensity);
        c.set_eq(self.eq.bass_db, self.eq.mid_db, self.eq.treble_db);
        c
    }

    pub fn depth_factor(&self) -> f32 {
        self.depth / 100.0
    }

    pub fn focus_factor(&self) -> f32 {
        self.focus / 100.0
    }

    pub fn early_factor(&self) -> f32 {
        self.early_mix / 100.0
    }

    pub fn length_factor(&self) -> f32 {
        self.reverb_length / 100.0
    }

    pub fn tone_factor(&self) -> f32 {
        self.reverb_tone / 100.0
    }

    pub fn motion_scale(&self) -> f32 {
        self.motion_intensity / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_clamp_and_default_nan() {
        let mut c = Controls::default();
        c.set_depth(250.0);
        assert_eq!(c.depth, 100.0);
        c.set_depth(f32::NAN);
        assert_eq!(c.depth, 70.0);
        c.set_focus(-400.0);
        assert_eq!(c.focus, -100.0);
        c.set_reverb_length(0.0);
        assert_eq!(c.reverb_length, 40.0);
        c.set_eq(30.0, f32::INFINITY, -30.0);
        assert_eq!(
            c.eq,
            Eq3 {
                bass_db: 12.0,
                mid_db: 0.0,
                treble_db: -12.0
            }
        );
    }

    #[test]
    fn sanitized_keeps_valid_values() {
        let mut c = Controls::default();
        c.set_volume(0.3);
        c.motion_enabled = false;
        assert_eq!(c.sanitized(), c);
    }
}
