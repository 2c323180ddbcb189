//! Listener pose, scene trajectories and per-panner positions.

use crate::constants::{
    ACCOMPANIMENT_LEFT, ACCOMPANIMENT_RIGHT, EARLY_COUNT, FOCUS_DEPTH_SPAN, FOCUS_YAW_SPAN,
    MOTION_INTENSITY_EPSILON,
};
use crate::controls::Controls;
use crate::layout::{BandId, Role, DIRECT_BANDS};
use crate::preset::{MotionConfig, MotionType, SpatialConfig};
use glam::Vec3;
use smallvec::SmallVec;
use std::f64::consts::{PI, TAU};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ListenerPose {
    pub position: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
}

impl Default for ListenerPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            forward: Vec3::NEG_Z,
            up: Vec3::Y,
        }
    }
}

/// Layered oscillation applied on top of the scene trajectory for one
/// musical role.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PartMotion {
    pub speed: f32,
    pub phase: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl PartMotion {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Bass => Self {
                speed: 0.18,
                phase: 0.0,
                x: 0.12,
                y: 0.04,
                z: 0.1,
            },
            Role::Vocal => Self {
                speed: 0.11,
                phase: 1.7,
                x: 0.08,
                y: 0.05,
                z: 0.06,
            },
            Role::Drum => Self {
                speed: 0.27,
                phase: 3.1,
                x: 0.16,
                y: 0.06,
                z: 0.12,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LaneTarget {
    pub band: BandId,
    pub lane: usize,
    pub position: Vec3,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PannerTargets {
    pub lanes: SmallVec<[LaneTarget; 4]>,
    /// Left then right.
    pub accompaniment: [Vec3; 2],
    pub early_taps: [Vec3; EARLY_COUNT],
    /// Distance of the composite direct source from the listener origin.
    pub direct_distance: f32,
}

/// Everything the motion layer reads for one frame.
#[derive(Clone, Copy, Debug)]
pub struct Stage<'a> {
    pub config: &'a SpatialConfig,
    pub controls: &'a Controls,
    pub bypass: bool,
    pub tap_positions: &'a [Vec3; EARLY_COUNT],
}

impl Stage<'_> {
    pub fn motion_active(&self) -> bool {
        motion_active(self.config, self.controls)
    }

    fn speed(&self) -> f32 {
        if self.motion_active() {
            motion_speed(
                &self.config.motion,
                self.controls.depth_factor(),
                self.controls.motion_scale(),
            )
        } else {
            0.0
        }
    }
}

pub fn motion_active(config: &SpatialConfig, controls: &Controls) -> bool {
    controls.motion_enabled
        && config.motion.kind != MotionType::None
        && controls.motion_scale() > MOTION_INTENSITY_EPSILON
}

/// Trajectory rate in Hz after depth and intensity scaling.
pub fn motion_speed(motion: &MotionConfig, depth: f32, scale: f32) -> f32 {
    motion.speed_hz * (0.7 + depth * 0.6) * (0.45 + scale * 0.55)
}

pub fn radius_scale(scale: f32) -> f32 {
    0.45 + scale * 0.55
}

fn angle(time_sec: f64, rate_hz: f32, k: f64) -> f32 {
    (time_sec * rate_hz as f64 * k) as f32
}

pub fn listener_pose(stage: &Stage, time_sec: f64) -> ListenerPose {
    let active = stage.motion_active();
    let speed = stage.speed();
    let pose_boost = 0.6 + stage.controls.depth_factor() * 0.7;
    let mut yaw = stage.controls.focus_factor() * FOCUS_YAW_SPAN;
    let mut pitch = 0.0;
    let mut bob = 0.0;
    if active {
        let a = angle(time_sec, speed, TAU);
        if stage.config.motion.kind == MotionType::Orbit {
            yaw += a.sin() * 0.08 * pose_boost;
        }
        pitch = angle(time_sec, speed, PI).sin() * 0.04 * pose_boost;
        bob = a.sin() * 0.015;
    }
    let cos_pitch = pitch.cos();
    ListenerPose {
        position: Vec3::new(0.0, bob, 0.0),
        forward: Vec3::new(yaw.sin() * cos_pitch, pitch.sin(), -yaw.cos() * cos_pitch),
        up: Vec3::Y,
    }
}

/// Offset of the whole stage along the preset's trajectory.
pub fn scene_offset(stage: &Stage, time_sec: f64) -> Vec3 {
    if !stage.motion_active() {
        return Vec3::ZERO;
    }
    let m = &stage.config.motion;
    let scale = stage.controls.motion_scale();
    let a = angle(time_sec, stage.speed(), TAU);
    let r = m.radius * radius_scale(scale);
    let elev = m.elevation * (0.75 + scale * 0.5);
    match m.kind {
        MotionType::Orbit => {
            let wobble = (a * 0.5).sin() * r * 0.35;
            let rx = r * (0.95 + (a * 0.4).sin() * 0.18);
            let rz = r * (1.05 + (a * 0.45).cos() * 0.22);
            Vec3::new(a.cos() * rx, (a * 0.55).sin() * elev, a.sin() * rz + wobble)
        }
        MotionType::Float => Vec3::new(
            a.sin() * r,
            (a * 0.8).cos() * elev,
            (a * 0.4).sin() * r * 0.4,
        ),
        MotionType::Pulse => Vec3::new(
            (a * 1.6).sin() * r * 0.7,
            (a * 1.3).cos() * elev * 0.72,
            (a * 0.9).sin() * r * 0.3,
        ),
        MotionType::None => Vec3::ZERO,
    }
}

pub fn part_offset(stage: &Stage, role: Role, time_sec: f64) -> Vec3 {
    if !stage.motion_active() || stage.bypass {
        return Vec3::ZERO;
    }
    let cfg = PartMotion::for_role(role);
    let depth = stage.controls.depth_factor();
    let scale = stage.controls.motion_scale();
    let boost_xy = 0.6 + scale * 0.4;
    let boost_z = 0.5 + scale * 0.5;
    let speed_scale = 0.74 + depth * 0.95 + boost_xy * 0.05;
    let role_speed = if role == Role::Vocal { 0.42 } else { 0.68 };
    let a = angle(time_sec, cfg.speed * speed_scale * role_speed, TAU) + cfg.phase;
    let amp_xy = boost_xy * 1.28;
    Vec3::new(
        (a * 1.15).sin() * cfg.x * amp_xy,
        (a * 0.78).sin() * cfg.y * amp_xy,
        (a * 0.62).cos() * cfg.z * boost_z,
    )
}

pub fn panner_targets(stage: &Stage, time_sec: f64) -> PannerTargets {
    let depth = stage.controls.depth_factor();
    let strength = if stage.bypass { 0.0 } else { 1.0 };
    let focus_push = stage.controls.focus_factor() * FOCUS_DEPTH_SPAN;
    let base = stage.config.direct.position + scene_offset(stage, time_sec)
        - Vec3::new(0.0, 0.0, focus_push);
    let direct_distance = base.length();

    let separation = (0.18 + depth * 0.55) * strength;
    let mut lanes = SmallVec::new();
    for band in DIRECT_BANDS.iter() {
        let centre = base + part_offset(stage, band.role, time_sec);
        let lift = band.elevation * (0.6 + depth * 0.6) * strength;
        let push = band.depth * (0.6 + depth * 0.6) * strength;
        let spread = band.spread * separation;
        let count = band.lane_count();
        for lane in 0..count {
            let dx = match (count, lane) {
                (1, _) => 0.0,
                (_, 0) => -spread,
                _ => spread,
            };
            lanes.push(LaneTarget {
                band: band.id,
                lane,
                position: centre + Vec3::new(dx, lift, push),
            });
        }
    }

    let side_spread = (0.95 + depth * 0.35) * if stage.bypass { 0.88 } else { 1.0 };
    let z_shift = if stage.bypass { 0.0 } else { depth * 0.2 };
    let side = |p: [f32; 3]| Vec3::new(p[0] * side_spread, p[1], p[2] - z_shift);

    let mut early_taps = *stage.tap_positions;
    if stage.motion_active() {
        let m = &stage.config.motion;
        let rs = radius_scale(stage.controls.motion_scale());
        let boost = if m.kind == MotionType::Orbit { 0.35 } else { 0.2 };
        let speed = stage.speed();
        for (i, tap) in early_taps.iter_mut().enumerate() {
            let ph = angle(time_sec, speed, TAU) + i as f32 * 1.2;
            *tap += Vec3::new(
                ph.cos() * m.radius * boost * rs,
                (ph * 0.8).sin() * m.elevation * 0.35 * rs,
                ph.sin() * m.radius * boost * 0.6 * rs,
            );
        }
    }

    PannerTargets {
        lanes,
        accompaniment: [side(ACCOMPANIMENT_LEFT), side(ACCOMPANIMENT_RIGHT)],
        early_taps,
        direct_distance,
    }
}
