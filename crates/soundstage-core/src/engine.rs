//! The spatial engine: one owned context that turns a frame of analyser data
//! into gain, filter and position targets.
//!
//! Hosts call the setters in response to user input and [`SpatialEngine::tick`]
//! once per display frame while [`SpatialEngine::should_run_loop`] holds. No
//! entry point fails; bad input is clamped or replaced with defaults.

use crate::adaptive::AdaptiveMixState;
use crate::bands::{waveform_peak, BandLevels};
use crate::controls::Controls;
use crate::distance::DistanceModel;
use crate::impulse::ImpulseSpec;
use crate::mix::{compute_mix, MixInputs, MixTargets};
use crate::motion::{listener_pose, motion_active, panner_targets, ListenerPose, PannerTargets, Stage};
use crate::preset::{PresetCatalog, SpatialConfig};
use crate::room::{EarlyJitter, RoomTargets};
use crate::settings::SettingsSnapshot;
use crate::tempo::{TempoEstimator, TempoParams, TempoReadout};
use crate::transition::{ApplyMode, TransitionState, TransitionStep};

/// One frame of host input.
#[derive(Clone, Copy, Debug)]
pub struct FrameInput<'a> {
    /// Monotonic clock in seconds; drives tempo, adaptive EQ and transitions.
    pub now_sec: f64,
    /// Media playback position in seconds; drives motion trajectories.
    pub playback_time_sec: f64,
    pub spectrum: &'a [u8],
    pub waveform: &'a [u8],
    pub paused: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FrameOutput {
    pub bands: BandLevels,
    pub waveform_peak: f32,
    pub tempo: TempoReadout,
    pub mix: MixTargets,
    pub panners: PannerTargets,
    pub listener: ListenerPose,
    pub room: RoomTargets,
    /// Set only when the host should rebuild its convolution buffer.
    pub impulse: Option<ImpulseSpec>,
    /// The host should store [`SpatialEngine::settings_snapshot`].
    pub persist_requested: bool,
    pub transition_active: bool,
}

#[derive(Clone, Debug)]
pub struct SpatialEngine {
    catalog: PresetCatalog,
    preset_id: &'static str,
    config: SpatialConfig,
    controls: Controls,
    bypass: bool,
    model: DistanceModel,
    tempo: TempoEstimator,
    adaptive: AdaptiveMixState,
    jitter: EarlyJitter,
    transition: Option<TransitionState>,
    last_impulse: Option<ImpulseSpec>,
    persist_pending: bool,
    last_now_sec: f64,
}

impl SpatialEngine {
    /// `seed` fixes the early-tap jitter so a session is reproducible.
    pub fn new(seed: u64) -> Self {
        let catalog = PresetCatalog::builtin();
        let first = catalog.default_preset();
        let (preset_id, config) = (first.id, first.config);
        Self {
            catalog,
            preset_id,
            config,
            controls: Controls::default(),
            bypass: false,
            model: DistanceModel::default(),
            tempo: TempoEstimator::new(TempoParams::default()),
            adaptive: AdaptiveMixState::default(),
            jitter: EarlyJitter::from_seed(seed),
            transition: None,
            last_impulse: None,
            persist_pending: false,
            last_now_sec: 0.0,
        }
    }

    pub fn catalog(&self) -> &PresetCatalog {
        &self.catalog
    }

    pub fn preset_id(&self) -> &'static str {
        self.preset_id
    }

    pub fn config(&self) -> &SpatialConfig {
        &self.config
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    pub fn bypass(&self) -> bool {
        self.bypass
    }

    pub fn transition_active(&self) -> bool {
        self.transition.is_some()
    }

    pub fn tempo(&self) -> &TempoEstimator {
        &self.tempo
    }

    pub fn adaptive(&self) -> &AdaptiveMixState {
        &self.adaptive
    }

    /// Switch to `id` (unknown ids fall back to the first preset). Any
    /// running transition is dropped; an animated change starts from the
    /// configuration currently in effect.
    pub fn apply_preset(&mut self, id: &str, now_sec: f64, mode: ApplyMode) -> &'static str {
        let preset = self.catalog.resolve(id);
        let (target_id, target) = (preset.id, preset.config);
        self.preset_id = target_id;
        let duration_ms = match mode {
            ApplyMode::Instant => 0.0,
            ApplyMode::Animated(ms) => ms,
        };
        let transition = TransitionState::new(self.config, target, now_sec * 1000.0, duration_ms);
        if transition.duration_ms <= 0.0 {
            self.transition = None;
            self.config = target;
            self.persist_pending = true;
        } else {
            self.transition = Some(transition);
        }
        log::info!("[preset] {target_id} ({mode:?})");
        target_id
    }

    pub fn cycle_preset(&mut self, step: i32, now_sec: f64) -> &'static str {
        let next = self.catalog.cycle(self.preset_id, step).id;
        self.apply_preset(next, now_sec, ApplyMode::default())
    }

    fn touch(&mut self) {
        self.persist_pending = true;
    }

    pub fn set_volume(&mut self, v: f32) {
        self.controls.set_volume(v);
        self.touch();
    }

    pub fn set_depth(&mut self, v: f32) {
        self.controls.set_depth(v);
        self.touch();
    }

    pub fn set_focus(&mut self, v: f32) {
        self.controls.set_focus(v);
        self.touch();
    }

    pub fn set_early_mix(&mut self, v: f32) {
        self.controls.set_early_mix(v);
        self.touch();
    }

    pub fn set_reverb_length(&mut self, v: f32) {
        self.controls.set_reverb_length(v);
        self.touch();
    }

    pub fn set_reverb_tone(&mut self, v: f32) {
        self.controls.set_reverb_tone(v);
        self.touch();
    }

    pub fn set_motion_enabled(&mut self, on: bool) {
        self.controls.motion_enabled = on;
        self.touch();
    }

    pub fn set_motion_intensity(&mut self, v: f32) {
        self.controls.set_motion_intensity(v);
        self.touch();
    }

    pub fn set_eq(&mut self, bass_db: f32, mid_db: f32, treble_db: f32) {
        self.controls.set_eq(bass_db, mid_db, treble_db);
        self.touch();
    }

    pub fn set_visualizer_enabled(&mut self, on: bool) {
        self.controls.visualizer_enabled = on;
        self.touch();
    }

    pub fn set_bypass(&mut self, on: bool) {
        if self.bypass != on {
            log::info!("[engine] bypass {}", if on { "on" } else { "off" });
        }
        self.bypass = on;
    }

    pub fn toggle_bypass(&mut self) -> bool {
        self.set_bypass(!self.bypass);
        self.bypass
    }

    /// Forget everything learned from the previous source.
    pub fn on_track_loaded(&mut self) {
        self.tempo.reset();
        self.adaptive.reset();
        log::info!("[tempo] state reset for new source");
    }

    pub fn should_run_loop(&self) -> bool {
        self.controls.visualizer_enabled
            || motion_active(&self.config, &self.controls)
            || self.transition.is_some()
    }

    pub fn settings_snapshot(&self) -> SettingsSnapshot {
        SettingsSnapshot::capture(self.preset_id, &self.controls)
    }

    /// Load persisted settings; corrupt JSON or unknown presets fall back to
    /// defaults. Restoring never asks the host to persist again.
    pub fn restore_settings(&mut self, json: &str) {
        let snapshot = SettingsSnapshot::from_json_or_default(json);
        self.controls = snapshot.controls();
        self.apply_preset(&snapshot.preset, self.last_now_sec, ApplyMode::Instant);
        self.persist_pending = false;
        log::info!("[settings] restored preset `{}`", self.preset_id);
    }

    pub fn reset_settings(&mut self) {
        self.controls = Controls::default();
        let first = self.catalog.default_preset().id;
        self.apply_preset(first, self.last_now_sec, ApplyMode::Instant);
        self.persist_pending = true;
    }

    fn advance_transition(&mut self, now_sec: f64) {
        let Some(transition) = &self.transition else {
            return;
        };
        match transition.step(now_sec * 1000.0) {
            TransitionStep::Running(config) => self.config = config,
            TransitionStep::Finished(config) => {
                self.config = config;
                self.transition = None;
                self.persist_pending = true;
                log::debug!("[preset] transition to {} complete", self.preset_id);
            }
        }
    }

    fn current_impulse(&self) -> ImpulseSpec {
        ImpulseSpec::from_reverb(&self.config.reverb, self.controls.length_factor())
    }

    fn next_impulse(&mut self) -> Option<ImpulseSpec> {
        if self.transition.is_some() {
            return None;
        }
        let spec = self.current_impulse();
        match self.last_impulse {
            Some(last) if !spec.differs_meaningfully(&last) => None,
            _ => {
                self.last_impulse = Some(spec);
                Some(spec)
            }
        }
    }

    /// Impulse for the configuration in effect right now, recorded as the one
    /// the host has loaded. Used when the graph is built outside `tick`.
    pub fn sync_impulse(&mut self) -> ImpulseSpec {
        let spec = self.current_impulse();
        self.last_impulse = Some(spec);
        spec
    }

    pub fn tick(&mut self, input: &FrameInput) -> FrameOutput {
        let now = if input.now_sec.is_finite() {
            input.now_sec
        } else {
            self.last_now_sec
        };
        self.last_now_sec = now;
        self.advance_transition(now);

        let bands = BandLevels::sample(input.spectrum);
        let mut onset = false;
        if !input.paused {
            onset = self.tempo.update(now, bands);
            self.adaptive.update(now, &bands);
        }
        let tempo = TempoReadout {
            bpm: self.tempo.bpm(),
            confidence: self.tempo.confidence(),
            pulse: self.tempo.beat_pulse(now),
            onset,
        };

        let depth = self.controls.depth_factor();
        let room = RoomTargets::compute(
            &self.config.early.room,
            depth,
            self.controls.length_factor(),
            &self.jitter,
        );

        let playback = if input.playback_time_sec.is_finite() {
            input.playback_time_sec
        } else {
            0.0
        };
        let stage = Stage {
            config: &self.config,
            controls: &self.controls,
            bypass: self.bypass,
            tap_positions: &room.tap_positions,
        };
        let panners = panner_targets(&stage, playback);
        let listener = listener_pose(&stage, playback);

        let mix = compute_mix(&MixInputs {
            config: &self.config,
            controls: &self.controls,
            adaptive: &self.adaptive,
            model: &self.model,
            bypass: self.bypass,
            distance: panners.direct_distance,
        });

        let impulse = self.next_impulse();
        FrameOutput {
            bands,
            waveform_peak: waveform_peak(input.waveform),
            tempo,
            mix,
            panners,
            listener,
            room,
            impulse,
            persist_requested: std::mem::take(&mut self.persist_pending),
            transition_active: self.transition.is_some(),
        }
    }
}

impl Default for SpatialEngine {
    fn default() -> Self {
        Self::new(0x5eed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(now_sec: f64) -> FrameInput<'static> {
        FrameInput {
            now_sec,
            playback_time_sec: now_sec,
            spectrum: &[],
            waveform: &[],
            paused: false,
        }
    }

    #[test]
    fn starts_on_first_preset() {
        let e = SpatialEngine::new(1);
        assert_eq!(e.preset_id(), "studio");
        assert_eq!(*e.config(), e.catalog().resolve("studio").config);
    }

    #[test]
    fn instant_apply_commits_and_requests_persist() {
        let mut e = SpatialEngine::new(1);
        e.apply_preset("hall", 0.0, ApplyMode::Instant);
        assert!(!e.transition_active());
        let out = e.tick(&frame(0.016));
        assert!(out.persist_requested);
        assert!(!e.tick(&frame(0.032)).persist_requested);
    }

    #[test]
    fn transition_keeps_loop_alive_until_done() {
        let mut e = SpatialEngine::new(1);
        e.set_visualizer_enabled(false);
        assert!(!e.should_run_loop());
        e.apply_preset("cathedral", 1.0, ApplyMode::default());
        assert!(e.should_run_loop());
        let mid = e.tick(&frame(1.1));
        assert!(mid.transition_active);
        assert!(mid.impulse.is_none());
        let done = e.tick(&frame(1.5));
        assert!(!done.transition_active);
        assert!(done.persist_requested);
        assert_eq!(*e.config(), e.catalog().resolve("cathedral").config);
        assert!(done.impulse.is_some());
    }

    #[test]
    fn impulse_is_emitted_once_per_meaningful_change() {
        let mut e = SpatialEngine::new(1);
        assert!(e.tick(&frame(0.0)).impulse.is_some());
        assert!(e.tick(&frame(0.016)).impulse.is_none());
        e.set_reverb_length(101.0);
        assert!(e.tick(&frame(0.032)).impulse.is_none());
        e.set_reverb_length(140.0);
        assert!(e.tick(&frame(0.048)).impulse.is_some());
    }

    #[test]
    fn impulse_loaded_mid_transition_is_replaced_at_the_end() {
        let mut e = SpatialEngine::new(1);
        let studio = e.tick(&frame(0.0)).impulse.expect("initial impulse");
        e.apply_preset("cathedral", 0.0, ApplyMode::Animated(1000.0));
        e.tick(&frame(0.1));
        let loaded = e.sync_impulse();
        assert!(loaded.differs_meaningfully(&studio));

        e.apply_preset("studio", 0.15, ApplyMode::Animated(1000.0));
        let mut emitted = Vec::new();
        for i in 1..=40 {
            if let Some(spec) = e.tick(&frame(0.15 + i as f64 * 0.05)).impulse {
                emitted.push(spec);
            }
        }
        assert_eq!(emitted, vec![studio]);
    }

    #[test]
    fn sync_impulse_suppresses_a_duplicate_emit() {
        let mut e = SpatialEngine::new(1);
        e.sync_impulse();
        assert!(e.tick(&frame(0.0)).impulse.is_none());
    }

    #[test]
    fn bypass_round_trip() {
        let mut e = SpatialEngine::new(1);
        assert!(e.toggle_bypass());
        let out = e.tick(&frame(0.0));
        assert_eq!(out.mix.early_gain, 0.0);
        assert_eq!(out.mix.reverb_gain, 0.0);
        assert!(!e.toggle_bypass());
        assert!(e.tick(&frame(0.016)).mix.reverb_gain > 0.0);
    }

    #[test]
    fn paused_frames_do_not_feed_tempo() {
        let mut e = SpatialEngine::new(1);
        let loud = [255u8; 256];
        let input = FrameInput {
            now_sec: 0.5,
            playback_time_sec: 0.5,
            spectrum: &loud,
            waveform: &[],
            paused: true,
        };
        let out = e.tick(&input);
        assert!(!out.tempo.onset);
        assert_eq!(e.adaptive().last_update_time_sec, None);
        assert_eq!(out.bands.low, 1.0);
    }
}
