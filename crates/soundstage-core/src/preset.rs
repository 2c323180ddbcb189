//! Spatial configuration types and the built-in preset catalog.

use crate::error::EngineError;
use fnv::FnvHashMap;
use glam::Vec3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MotionType {
    #[default]
    None,
    Orbit,
    Float,
    Pulse,
}

impl MotionType {
    pub fn as_str(self) -> &'static str {
        match self {
            MotionType::None => "none",
            MotionType::Orbit => "orbit",
            MotionType::Float => "float",
            MotionType::Pulse => "pulse",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectConfig {
    pub gain: f32,
    pub position: Vec3,
}

/// Geometry of the early-reflection room; fully determines tap delays and
/// tap positions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoomConfig {
    pub radius: f32,
    pub depth: f32,
    pub elevation: f32,
    pub delay_base: f32,
    pub delay_spread: f32,
    /// Tap lowpass cutoff in Hz.
    pub damp: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EarlyConfig {
    pub gain: f32,
    pub room: RoomConfig,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReverbConfig {
    pub gain: f32,
    pub duration_sec: f32,
    pub decay: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionConfig {
    pub kind: MotionType,
    pub speed_hz: f32,
    pub radius: f32,
    pub elevation: f32,
}

/// The engine's base state. Replaced wholesale by presets and transitions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpatialConfig {
    pub direct: DirectConfig,
    pub early: EarlyConfig,
    pub reverb: ReverbConfig,
    pub motion: MotionConfig,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            direct: DirectConfig {
                gain: 1.0,
                position: Vec3::new(0.0, 0.0, -1.2),
            },
            early: EarlyConfig {
                gain: 0.25,
                room: RoomConfig {
                    radius: 1.2,
                    depth: 1.2,
                    elevation: 0.2,
                    delay_base: 0.01,
                    delay_spread: 0.02,
                    damp: 8000.0,
                },
            },
            reverb: ReverbConfig {
                gain: 0.25,
                duration_sec: 2.0,
                decay: 2.0,
            },
            motion: MotionConfig {
                kind: MotionType::None,
                speed_hz: 0.2,
                radius: 0.6,
                elevation: 0.2,
            },
        }
    }
}

impl SpatialConfig {
    /// Enforce non-negative gains and positive reverb/room timing.
    pub fn sanitized(mut self) -> Self {
        fn non_negative(v: f32) -> f32 {
            if v.is_finite() {
                v.max(0.0)
            } else {
                0.0
            }
        }
        self.direct.gain = non_negative(self.direct.gain);
        self.early.gain = non_negative(self.early.gain);
        self.reverb.gain = non_negative(self.reverb.gain);
        self.reverb.duration_sec = non_negative(self.reverb.duration_sec).max(0.05);
        self.reverb.decay = non_negative(self.reverb.decay);
        self.early.room.delay_base = non_negative(self.early.room.delay_base);
        self.early.room.delay_spread = non_negative(self.early.room.delay_spread);
        self.early.room.damp = non_negative(self.early.room.damp).max(20.0);
        self.motion.speed_hz = non_negative(self.motion.speed_hz);
        self
    }
}

#[derive(Clone, Debug)]
pub struct Preset {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub config: SpatialConfig,
}

/// Fixed, non-empty list of presets with id lookup.
#[derive(Clone, Debug)]
pub struct PresetCatalog {
    presets: Vec<Preset>,
    index: FnvHashMap<&'static str, usize>,
}

impl Default for PresetCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PresetCatalog {
    pub fn builtin() -> Self {
        let presets: Vec<Preset> = builtin_presets()
            .into_iter()
            .map(|p| Preset {
                config: p.config.sanitized(),
                ..p
            })
            .collect();
        let index = presets
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id, i))
            .collect::<FnvHashMap<_, _>>();
        Self { presets, index }
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.iter()
    }

    pub fn default_preset(&self) -> &Preset {
        &self.presets[0]
    }

    pub fn get(&self, id: &str) -> Option<&Preset> {
        self.index.get(id).map(|&i| &self.presets[i])
    }

    pub fn try_get(&self, id: &str) -> Result<&Preset, EngineError> {
        self.get(id)
            .ok_or_else(|| EngineError::UnknownPreset(id.to_string()))
    }

    /// Look up `id`, falling back to the first preset.
    pub fn resolve(&self, id: &str) -> &Preset {
        match self.try_get(id) {
            Ok(p) => p,
            Err(e) => {
                log::warn!("[preset] {e}; using `{}`", self.default_preset().id);
                self.default_preset()
            }
        }
    }

    /// Step through the catalog from `from_id`, wrapping in both directions.
    /// An unknown `from_id` counts as the first preset.
    pub fn cycle(&self, from_id: &str, step: i32) -> &Preset {
        let len = self.presets.len() as i64;
        let current = self.index.get(from_id).copied().unwrap_or(0) as i64;
        let next = (current + step as i64).rem_euclid(len) as usize;
        &self.presets[next]
    }
}

#[allow(clippy::too_many_arguments)]
fn preset(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    direct: (f32, [f32; 3]),
    early_gain: f32,
    room: [f32; 6],
    reverb: [f32; 3],
    motion: (MotionType, f32, f32, f32),
) -> Preset {
    Preset {
        id,
        name,
        description,
        config: SpatialConfig {
            direct: DirectConfig {
                gain: direct.0,
                position: Vec3::from_array(direct.1),
            },
            early: EarlyConfig {
                gain: early_gain,
                room: RoomConfig {
                    radius: room[0],
                    depth: room[1],
                    elevation: room[2],
                    delay_base: room[3],
                    delay_spread: room[4],
                    damp: room[5],
                },
            },
            reverb: ReverbConfig {
                gain: reverb[0],
                duration_sec: reverb[1],
                decay: reverb[2],
            },
            motion: MotionConfig {
                kind: motion.0,
                speed_hz: motion.1,
                radius: motion.2,
                elevation: motion.3,
            },
        },
    }
}

// room: [radius, depth, elevation, delay_base, delay_spread, damp]
// reverb: [gain, duration, decay]
fn builtin_presets() -> Vec<Preset> {
    use MotionType as M;
    vec![
        preset(
            "studio",
            "Studio Focus",
            "Close and crisp",
            (0.98, [0.0, 0.0, -1.1]),
            0.3,
            [0.7, 0.7, 0.14, 0.007, 0.018, 9000.0],
            [0.2, 1.2, 1.7],
            (M::None, 0.1, 0.4, 0.1),
        ),
        preset(
            "hall",
            "Wide Hall",
            "Spacious and balanced",
            (0.9, [0.0, 0.0, -1.55]),
            0.5,
            [1.8, 1.5, 0.24, 0.014, 0.035, 7000.0],
            [0.5, 2.9, 2.7],
            (M::Float, 0.1, 0.58, 0.16),
        ),
        preset(
            "club",
            "Club Pulse",
            "Short tail, punchy",
            (1.0, [0.14, 0.0, -1.0]),
            0.44,
            [1.0, 1.0, 0.18, 0.01, 0.025, 6800.0],
            [0.38, 1.7, 2.2],
            (M::Pulse, 0.24, 0.45, 0.12),
        ),
        preset(
            "orbit",
            "Orbit",
            "A moving wide stage",
            (0.85, [0.0, 0.0, -1.7]),
            0.55,
            [2.0, 1.9, 0.28, 0.017, 0.045, 6800.0],
            [0.55, 3.2, 2.6],
            (M::Orbit, 0.22, 0.88, 0.28),
        ),
        preset(
            "cathedral",
            "Cathedral",
            "High and rich reverberation",
            (0.78, [0.0, 0.0, -2.0]),
            0.68,
            [2.5, 2.3, 0.4, 0.024, 0.065, 5600.0],
            [0.75, 4.8, 3.2],
            (M::Float, 0.08, 0.65, 0.26),
        ),
        preset(
            "cinema",
            "Cinematic",
            "Huge and enveloping",
            (0.8, [-0.14, 0.06, -1.9]),
            0.6,
            [2.3, 2.0, 0.32, 0.02, 0.055, 6000.0],
            [0.68, 4.0, 2.9],
            (M::Orbit, 0.16, 0.75, 0.22),
        ),
        preset(
            "hyper",
            "Hyperspace",
            "Stretching beyond the room",
            (0.72, [0.0, 0.08, -2.2]),
            0.75,
            [3.0, 2.8, 0.45, 0.028, 0.09, 5200.0],
            [0.9, 5.0, 3.6],
            (M::Orbit, 0.18, 1.2, 0.4),
        ),
        preset(
            "arena",
            "Arena Surge",
            "Pressure of a giant venue",
            (0.8, [0.1, 0.0, -2.1]),
            0.72,
            [2.6, 2.3, 0.36, 0.024, 0.07, 5700.0],
            [0.8, 4.4, 3.2],
            (M::Pulse, 0.2, 0.8, 0.28),
        ),
        preset(
            "void",
            "Deep Void",
            "A deep, hollow tail",
            (0.68, [0.0, 0.05, -2.6]),
            0.85,
            [3.2, 2.9, 0.45, 0.03, 0.085, 4800.0],
            [0.95, 6.2, 3.8],
            (M::Orbit, 0.14, 1.05, 0.36),
        ),
    ]
}
