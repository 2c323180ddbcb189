//! Platform-independent core of the soundstage spatial-audio engine.
//!
//! Nothing in this crate touches an audio API. The web front-end feeds
//! analyser snapshots into [`SpatialEngine::tick`] and applies the returned
//! targets to its node graph.

pub mod adaptive;
pub mod bands;
pub mod constants;
pub mod controls;
pub mod distance;
pub mod engine;
pub mod error;
pub mod impulse;
pub mod layout;
pub mod math;
pub mod mix;
pub mod motion;
pub mod preset;
pub mod room;
pub mod settings;
pub mod tempo;
pub mod transition;

pub use adaptive::AdaptiveMixState;
pub use bands::BandLevels;
pub use controls::{Controls, Eq3};
pub use distance::{DistanceModel, DistanceProfile, ResonanceComp};
pub use engine::{FrameInput, FrameOutput, SpatialEngine};
pub use error::EngineError;
pub use impulse::{generate_impulse, ImpulseSpec};
pub use layout::{BandId, Role, DIRECT_BANDS};
pub use mix::MixTargets;
pub use motion::{ListenerPose, PannerTargets};
pub use preset::{MotionType, Preset, PresetCatalog, SpatialConfig};
pub use room::RoomTargets;
pub use settings::SettingsSnapshot;
pub use tempo::{fold_bpm, TempoEstimator, TempoParams, TempoReadout};
pub use transition::{ApplyMode, TransitionState};
