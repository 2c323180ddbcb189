// Frame-level integration tests: drive the engine the way the web host does.

use soundstage_core::transition::ApplyMode;
use soundstage_core::{FrameInput, SettingsSnapshot, SpatialEngine};

const FPS: f64 = 60.0;

fn silent(now_sec: f64) -> FrameInput<'static> {
    FrameInput {
        now_sec,
        playback_time_sec: now_sec,
        spectrum: &[],
        waveform: &[],
        paused: false,
    }
}

fn click_spectrum(on: bool) -> Vec<u8> {
    let mut s = vec![0u8; 1024];
    if on {
        s[..64].iter_mut().for_each(|v| *v = 240);
    }
    s
}

#[test]
fn flat_zero_spectrum_yields_finite_silence() {
    let mut e = SpatialEngine::new(3);
    let zeros = [0u8; 1024];
    let wave = [128u8; 2048];
    for i in 0..120 {
        let now = i as f64 / FPS;
        let out = e.tick(&FrameInput {
            now_sec: now,
            playback_time_sec: now,
            spectrum: &zeros,
            waveform: &wave,
            paused: false,
        });
        assert_eq!(out.bands.low, 0.0);
        assert_eq!(out.bands.mid, 0.0);
        assert_eq!(out.bands.high, 0.0);
        assert_eq!(out.tempo.pulse, 0.0);
        assert_eq!(out.waveform_peak, 0.0);
        assert!(out.mix.master_gain.is_finite());
        assert!(out.mix.direct_gain.is_finite());
        assert!(out.panners.direct_distance.is_finite());
        assert!(out
            .panners
            .lanes
            .iter()
            .all(|l| l.position.is_finite()));
    }
    assert_eq!(e.tempo().state.flux_envelope, 0.0);
}

#[test]
fn click_train_locks_tempo_through_engine() {
    let mut e = SpatialEngine::new(3);
    let on = click_spectrum(true);
    let off = click_spectrum(false);
    let mut onsets = 0;
    let mut last = None;
    for i in 0..(30 * 20) {
        let now = i as f64 / FPS;
        let spectrum = if i % 30 < 2 { &on } else { &off };
        let out = e.tick(&FrameInput {
            now_sec: now,
            playback_time_sec: now,
            spectrum,
            waveform: &[],
            paused: false,
        });
        if out.tempo.onset {
            onsets += 1;
        }
        last = Some(out.tempo);
    }
    let tempo = last.unwrap();
    assert!(onsets >= 10, "only {onsets} onsets");
    assert!((tempo.bpm - 120.0).abs() <= 3.0, "bpm {}", tempo.bpm);
    assert!(tempo.confidence >= 0.6, "confidence {}", tempo.confidence);
}

#[test]
fn track_load_resets_tempo() {
    let mut e = SpatialEngine::new(3);
    let on = click_spectrum(true);
    let off = click_spectrum(false);
    for i in 0..(30 * 12) {
        let now = i as f64 / FPS;
        let spectrum = if i % 30 < 2 { &on } else { &off };
        e.tick(&FrameInput {
            now_sec: now,
            playback_time_sec: now,
            spectrum,
            waveform: &[],
            paused: false,
        });
    }
    assert!(e.tempo().confidence() > 0.0);
    e.on_track_loaded();
    assert_eq!(e.tempo().confidence(), 0.0);
    assert!(e.tempo().state.interval_history.is_empty());
}

#[test]
fn superseding_transition_never_lands_on_overridden_target() {
    let mut e = SpatialEngine::new(3);
    let studio = e.catalog().resolve("studio").config;
    let hall = e.catalog().resolve("hall").config;
    let void = e.catalog().resolve("void").config;

    e.apply_preset("hall", 0.0, ApplyMode::Animated(400.0));
    e.tick(&silent(0.1));
    let midway = *e.config();
    assert_ne!(midway, studio);
    assert_ne!(midway, hall);

    e.apply_preset("void", 0.1, ApplyMode::Animated(400.0));
    for i in 1..=40 {
        let out = e.tick(&silent(0.1 + i as f64 * 0.02));
        assert_ne!(*e.config(), hall);
        if !out.transition_active {
            break;
        }
    }
    assert_eq!(*e.config(), void);
    assert_eq!(e.preset_id(), "void");
}

#[test]
fn unknown_preset_falls_back_to_first() {
    let mut e = SpatialEngine::new(3);
    e.apply_preset("orbit", 0.0, ApplyMode::Instant);
    assert_eq!(e.apply_preset("no-such-room", 0.0, ApplyMode::Instant), "studio");
}

#[test]
fn loop_gate_follows_visualizer_motion_and_transitions() {
    let mut e = SpatialEngine::new(3);
    e.set_visualizer_enabled(false);
    assert!(!e.should_run_loop(), "studio has no motion");
    e.apply_preset("orbit", 0.0, ApplyMode::Instant);
    assert!(e.should_run_loop());
    e.set_motion_enabled(false);
    assert!(!e.should_run_loop());
    e.set_motion_enabled(true);
    e.set_motion_intensity(0.0);
    assert!(!e.should_run_loop());
}

#[test]
fn settings_survive_a_round_trip() {
    let mut e = SpatialEngine::new(3);
    e.apply_preset("cinema", 0.0, ApplyMode::Instant);
    e.set_depth(35.0);
    e.set_focus(-20.0);
    e.set_eq(3.0, -2.0, 1.5);
    e.set_visualizer_enabled(false);
    let json = e.settings_snapshot().to_json();

    let mut restored = SpatialEngine::new(9);
    restored.restore_settings(&json);
    assert_eq!(restored.preset_id(), "cinema");
    assert_eq!(restored.controls(), e.controls());
    assert!(!restored.tick(&silent(0.0)).persist_requested);
}

#[test]
fn corrupt_settings_restore_defaults() {
    let mut e = SpatialEngine::new(3);
    e.set_depth(10.0);
    e.restore_settings("{\"depth\": ");
    assert_eq!(e.settings_snapshot(), SettingsSnapshot::default());
}

#[test]
fn reset_settings_requests_persist() {
    let mut e = SpatialEngine::new(3);
    e.apply_preset("arena", 0.0, ApplyMode::Instant);
    e.tick(&silent(0.0));
    e.reset_settings();
    assert_eq!(e.preset_id(), "studio");
    assert!(e.tick(&silent(0.016)).persist_requested);
}

#[test]
fn one_bad_stored_field_does_not_discard_the_rest() {
    let mut e = SpatialEngine::new(3);
    e.restore_settings(r#"{"preset":"cathedral","volume":0.3,"depth":null,"motionToggle":false}"#);
    assert_eq!(e.preset_id(), "cathedral");
    assert_eq!(e.controls().volume, 0.3);
    assert!(!e.controls().motion_enabled);
    assert_eq!(e.controls().depth, SettingsSnapshot::default().depth);
}

#[test]
fn animated_preset_moves_distance_and_direct_gain() {
    let mut e = SpatialEngine::new(3);
    e.apply_preset("orbit", 0.0, ApplyMode::Instant);
    let mut samples = Vec::new();
    for i in 0..300 {
        let now = i as f64 * 0.1;
        let out = e.tick(&FrameInput {
            now_sec: now,
            playback_time_sec: now,
            spectrum: &[],
            waveform: &[],
            paused: true,
        });
        assert!(out.panners.direct_distance.is_finite());
        assert!(out.mix.direct_gain.is_finite());
        samples.push((out.panners.direct_distance, out.mix.direct_gain));
    }
    let range = |f: fn(&(f32, f32)) -> f32| {
        let lo = samples.iter().map(f).fold(f32::INFINITY, f32::min);
        let hi = samples.iter().map(f).fold(f32::NEG_INFINITY, f32::max);
        hi - lo
    };
    assert!(range(|s| s.0) > 0.2, "distance barely moved");
    assert!(range(|s| s.1) > 0.01, "direct gain barely moved");

    let nearest = samples.iter().min_by(|a, b| a.0.total_cmp(&b.0)).unwrap();
    let farthest = samples.iter().max_by(|a, b| a.0.total_cmp(&b.0)).unwrap();
    assert!(farthest.1 <= nearest.1);
}
