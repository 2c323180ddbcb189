//! Animated hand-over between two spatial configurations.

use crate::constants::{TRANSITION_DEFAULT_MS, TRANSITION_MAX_MS};
use crate::math::{lerp, smoothstep};
use crate::preset::{
    DirectConfig, EarlyConfig, MotionConfig, ReverbConfig, RoomConfig, SpatialConfig,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ApplyMode {
    /// Commit the target immediately.
    Instant,
    /// Ease over the given duration in milliseconds (clamped).
    Animated(f64),
}

impl Default for ApplyMode {
    fn default() -> Self {
        ApplyMode::Animated(TRANSITION_DEFAULT_MS)
    }
}

pub fn clamp_duration_ms(ms: f64) -> f64 {
    if ms.is_finite() {
        ms.clamp(0.0, TRANSITION_MAX_MS)
    } else {
        TRANSITION_DEFAULT_MS
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TransitionState {
    pub from: SpatialConfig,
    pub to: SpatialConfig,
    pub start_time_ms: f64,
    pub duration_ms: f64,
}

/// Result of advancing a transition by one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransitionStep {
    Running(SpatialConfig),
    Finished(SpatialConfig),
}

impl TransitionState {
    pub fn new(from: SpatialConfig, to: SpatialConfig, start_time_ms: f64, duration_ms: f64) -> Self {
        Self {
            from,
            to,
            start_time_ms,
            duration_ms: clamp_duration_ms(duration_ms),
        }
    }

    /// Linear progress in `[0, 1]`. A zero duration is already complete.
    pub fn progress(&self, now_ms: f64) -> f32 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        let t = (now_ms - self.start_time_ms) / self.duration_ms;
        if t.is_finite() {
            t.clamp(0.0, 1.0) as f32
        } else {
            1.0
        }
    }

    pub fn step(&self, now_ms: f64) -> TransitionStep {
        let t = self.progress(now_ms);
        if t >= 1.0 {
            TransitionStep::Finished(self.to)
        } else {
            TransitionStep::Running(interpolate_config(&self.from, &self.to, smoothstep(t)))
        }
    }
}

/// Field-wise interpolation; `motion.kind` flips to the target at the
/// midpoint.
pub fn interpolate_config(from: &SpatialConfig, to: &SpatialConfig, t: f32) -> SpatialConfig {
    let room = |a: &RoomConfig, b: &RoomConfig| RoomConfig {
        radius: lerp(a.radius, b.radius, t),
        depth: lerp(a.depth, b.depth, t),
        elevation: lerp(a.elevation, b.elevation, t),
        delay_base: lerp(a.delay_base, b.delay_base, t),
        delay_spread: lerp(a.delay_spread, b.delay_spread, t),
        damp: lerp(a.damp, b.damp, t),
    };
    let p = from.direct.position;
    let q = to.direct.position;
    SpatialConfig {
        direct: DirectConfig {
            gain: lerp(from.direct.gain, to.direct.gain, t),
            position: glam::Vec3::new(lerp(p.x, q.x, t), lerp(p.y, q.y, t), lerp(p.z, q.z, t)),
        },
        early: EarlyConfig {
            gain: lerp(from.early.gain, to.early.gain, t),
            room: room(&from.early.room, &to.early.room),
        },
        reverb: ReverbConfig {
            gain: lerp(from.reverb.gain, to.reverb.gain, t),
            duration_sec: lerp(from.reverb.duration_sec, to.reverb.duration_sec, t),
            decay: lerp(from.reverb.decay, to.reverb.decay, t),
        },
        motion: MotionConfig {
            kind: if t < 0.5 { from.motion.kind } else { to.motion.kind },
            speed_hz: lerp(from.motion.speed_hz, to.motion.speed_hz, t),
            radius: lerp(from.motion.radius, to.motion.radius, t),
            elevation: lerp(from.motion.elevation, to.motion.elevation, t),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::{MotionType, PresetCatalog};

    fn pair() -> (SpatialConfig, SpatialConfig) {
        let c = PresetCatalog::builtin();
        (c.resolve("studio").config, c.resolve("void").config)
    }

    #[test]
    fn endpoints_are_exact() {
        let (a, b) = pair();
        assert_eq!(interpolate_config(&a, &b, 0.0), a);
        assert_eq!(interpolate_config(&a, &b, 1.0), b);
    }

    #[test]
    fn motion_kind_switches_at_midpoint() {
        let (a, b) = pair();
        assert_eq!(interpolate_config(&a, &b, 0.49).motion.kind, MotionType::None);
        assert_eq!(interpolate_config(&a, &b, 0.5).motion.kind, MotionType::Orbit);
    }

    #[test]
    fn duration_is_clamped() {
        let (a, b) = pair();
        assert_eq!(TransitionState::new(a, b, 0.0, 9000.0).duration_ms, TRANSITION_MAX_MS);
        assert_eq!(TransitionState::new(a, b, 0.0, -5.0).duration_ms, 0.0);
        assert_eq!(clamp_duration_ms(f64::NAN), TRANSITION_DEFAULT_MS);
    }

    #[test]
    fn step_finishes_with_exact_target() {
        let (a, b) = pair();
        let tr = TransitionState::new(a, b, 1000.0, 320.0);
        assert_eq!(tr.step(1000.0), TransitionStep::Running(a));
        assert!(matches!(tr.step(1160.0), TransitionStep::Running(_)));
        assert_eq!(tr.step(1320.0), TransitionStep::Finished(b));
        assert_eq!(tr.step(5000.0), TransitionStep::Finished(b));
    }

    #[test]
    fn zero_duration_finishes_immediately() {
        let (a, b) = pair();
        let tr = TransitionState::new(a, b, 10.0, 0.0);
        assert_eq!(tr.step(10.0), TransitionStep::Finished(b));
    }
}
