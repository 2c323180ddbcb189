//! Beat and tempo tracking from per-frame band energies.
//!
//! Two nested cycles run here: onset detection on every frame, and tempo
//! recomputation on every confirmed onset. Nothing in this module can fail;
//! sparse or noisy input simply leaves the confidence at zero.

use crate::bands::BandLevels;
use crate::math::{exp_alpha, smoothstep};
use smallvec::SmallVec;
use std::collections::VecDeque;

/// Tunable constants for the estimator.
#[derive(Clone, Debug)]
pub struct TempoParams {
    pub low_weight: f32,
    pub mid_weight: f32,
    pub high_weight: f32,
    pub envelope_smoothing: f32,
    pub floor_smoothing: f32,
    pub base_margin: f32,
    pub low_margin: f32,
    pub refractory_sec: f64,
    pub min_interval_sec: f64,
    pub max_interval_sec: f64,
    pub history_len: usize,
    pub min_history: usize,
    pub min_cluster: usize,
    pub fold_min_bpm: f32,
    pub fold_max_bpm: f32,
    pub cluster_window_bpm: f32,
    pub spread_norm_bpm: f32,
    /// The first estimate is taken as-is; this many estimates after it
    /// still use the fast rates before settling onto the slow ones.
    pub fast_updates: u32,
    pub bpm_fast: f32,
    pub bpm_slow: f32,
    pub confidence_fast: f32,
    pub confidence_slow: f32,
    pub phase_lock_confidence: f32,
    pub phase_nudge: f64,
    pub usable_confidence: f32,
    pub full_confidence: f32,
    /// Beat periods without an onset before confidence starts to fade.
    pub stale_beats: f64,
    /// Time constant of that fade.
    pub stale_decay_sec: f32,
    /// Fraction of the beat spent in the linear attack.
    pub pulse_attack: f32,
    pub pulse_decay: f32,
    pub pulse_rise: f32,
    pub pulse_release: f32,
}

impl Default for TempoParams {
    fn default() -> Self {
        Self {
            low_weight: 1.55,
            mid_weight: 0.9,
            high_weight: 0.25,
            envelope_smoothing: 0.18,
            floor_smoothing: 0.008,
            base_margin: 0.012,
            low_margin: 0.08,
            refractory_sec: 0.21,
            min_interval_sec: 0.24,
            max_interval_sec: 1.1,
            history_len: 32,
            min_history: 6,
            min_cluster: 4,
            fold_min_bpm: 70.0,
            fold_max_bpm: 190.0,
            cluster_window_bpm: 14.0,
            spread_norm_bpm: 10.0,
            fast_updates: 3,
            bpm_fast: 0.55,
            bpm_slow: 0.2,
            confidence_fast: 0.6,
            confidence_slow: 0.3,
            phase_lock_confidence: 0.45,
            phase_nudge: 0.35,
            usable_confidence: 0.28,
            full_confidence: 0.6,
            stale_beats: 4.0,
            stale_decay_sec: 1.5,
            pulse_attack: 0.08,
            pulse_decay: 6.0,
            pulse_rise: 0.45,
            pulse_release: 0.12,
        }
    }
}

/// Mutable estimator state; reset whenever a new source is loaded.
#[derive(Clone, Debug, Default)]
pub struct TempoState {
    pub bpm_estimate: f32,
    pub confidence: f32,
    pub interval_history: VecDeque<f64>,
    pub beat_anchor_time_sec: Option<f64>,
    pub flux_envelope: f32,
    pub flux_floor: f32,
    pub last_onset_time_sec: Option<f64>,
    pub last_flux: f32,
    prev_energy: f32,
    above_threshold: bool,
    estimate_count: u32,
    last_update_sec: Option<f64>,
    pulse_level: f32,
}

/// Values exposed to visualization.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TempoReadout {
    pub bpm: f32,
    pub confidence: f32,
    pub pulse: f32,
    pub onset: bool,
}

#[derive(Clone, Debug, Default)]
pub struct TempoEstimator {
    pub params: TempoParams,
    pub state: TempoState,
}

impl TempoEstimator {
    pub fn new(params: TempoParams) -> Self {
        Self {
            params,
            state: TempoState::default(),
        }
    }

    pub fn reset(&mut self) {
        self.state = TempoState::default();
    }

    pub fn bpm(&self) -> f32 {
        self.state.bpm_estimate
    }

    pub fn confidence(&self) -> f32 {
        self.state.confidence
    }

    /// Feed one frame of band energies. Returns true when an onset fired.
    pub fn update(&mut self, now_sec: f64, bands: BandLevels) -> bool {
        let dt = self
            .state
            .last_update_sec
            .map_or(0.0, |last| (now_sec - last).clamp(0.0, 0.25));
        self.state.last_update_sec = Some(now_sec);
        self.fade_when_stale(now_sec, dt as f32);

        let p = &self.params;
        let s = &mut self.state;

        let energy =
            bands.low * p.low_weight + bands.mid * p.mid_weight + bands.high * p.high_weight;
        let energy = if energy.is_finite() { energy } else { 0.0 };
        let flux = (energy - s.prev_energy).max(0.0);
        s.prev_energy = energy;
        s.last_flux = flux;
        s.flux_envelope += (flux - s.flux_envelope) * p.envelope_smoothing;
        s.flux_floor += (flux - s.flux_floor) * p.floor_smoothing;

        let threshold = s.flux_floor + p.base_margin + bands.low.max(0.0) * p.low_margin;
        let above = s.flux_envelope > threshold;
        let rising = above && !s.above_threshold;
        s.above_threshold = above;
        if !rising {
            return false;
        }
        if let Some(last) = s.last_onset_time_sec {
            if now_sec - last < p.refractory_sec {
                return false;
            }
        }
        self.register_onset(now_sec);
        true
    }

    fn register_onset(&mut self, now_sec: f64) {
        let p = &self.params;
        let s = &mut self.state;
        if let Some(last) = s.last_onset_time_sec {
            let interval = now_sec - last;
            if interval >= p.min_interval_sec && interval <= p.max_interval_sec {
                while s.interval_history.len() >= p.history_len.max(1) {
                    s.interval_history.pop_front();
                }
                s.interval_history.push_back(interval);
            }
        }
        s.last_onset_time_sec = Some(now_sec);
        self.recompute_tempo(now_sec);
    }

    fn recompute_tempo(&mut self, onset_sec: f64) {
        let p = &self.params;
        let s = &mut self.state;
        if s.interval_history.len() < p.min_history {
            return;
        }

        let mut candidates: SmallVec<[f32; 32]> = s
            .interval_history
            .iter()
            .map(|&iv| fold_bpm((60.0 / iv) as f32, p.fold_min_bpm, p.fold_max_bpm))
            .filter(|bpm| *bpm > 0.0)
            .collect();
        if candidates.is_empty() {
            return;
        }
        candidates.sort_by(|a, b| a.total_cmp(b));
        let median = median_of_sorted(&candidates);

        let cluster: SmallVec<[f32; 32]> = candidates
            .iter()
            .copied()
            .filter(|bpm| (bpm - median).abs() <= p.cluster_window_bpm)
            .collect();
        if cluster.len() < p.min_cluster {
            return;
        }

        let n = cluster.len() as f32;
        let average = cluster.iter().sum::<f32>() / n;
        let spread = cluster.iter().map(|bpm| (bpm - average).abs()).sum::<f32>() / n;
        let cluster_fraction = n / candidates.len() as f32;
        let detected =
            (0.6 * cluster_fraction + 0.4 * (1.0 - spread / p.spread_norm_bpm)).clamp(0.0, 1.0);

        let fast = s.estimate_count <= p.fast_updates;
        // The first estimate seeds the smoother directly.
        if s.estimate_count == 0 {
            s.bpm_estimate = average;
        } else {
            let alpha = if fast { p.bpm_fast } else { p.bpm_slow };
            s.bpm_estimate += (average - s.bpm_estimate) * alpha;
        }
        let alpha = if fast { p.confidence_fast } else { p.confidence_slow };
        s.confidence = (s.confidence + (detected - s.confidence) * alpha).clamp(0.0, 1.0);
        s.estimate_count += 1;

        if s.confidence > p.phase_lock_confidence {
            self.nudge_anchor(onset_sec);
        }
    }

    // Decays confidence once no onset has arrived for `stale_beats` periods.
    fn fade_when_stale(&mut self, now_sec: f64, dt_sec: f32) {
        let p = &self.params;
        let s = &mut self.state;
        let Some(last) = s.last_onset_time_sec else {
            return;
        };
        if s.bpm_estimate <= 0.0 || s.confidence <= 0.0 {
            return;
        }
        let period = 60.0 / s.bpm_estimate as f64;
        if now_sec - last <= period * p.stale_beats {
            return;
        }
        s.confidence -= s.confidence * exp_alpha(dt_sec, p.stale_decay_sec);
        if s.confidence < 1e-3 {
            s.confidence = 0.0;
        }
    }

    // Eases the phase anchor toward the latest onset by a fraction of the
    // wrapped phase error.
    fn nudge_anchor(&mut self, onset_sec: f64) {
        let s = &mut self.state;
        if s.bpm_estimate <= 0.0 {
            return;
        }
        let period = 60.0 / s.bpm_estimate as f64;
        s.beat_anchor_time_sec = Some(match s.beat_anchor_time_sec {
            None => onset_sec,
            Some(anchor) => {
                let offset = (onset_sec - anchor).rem_euclid(period);
                let error = if offset > period * 0.5 {
                    offset - period
                } else {
                    offset
                };
                anchor + error * self.params.phase_nudge
            }
        });
    }

    /// Beat-synchronous pulse in `[0, 1]`, zero when the tempo is not usable.
    pub fn beat_pulse(&mut self, now_sec: f64) -> f32 {
        let p = &self.params;
        let s = &mut self.state;
        let confidence = s.confidence;

        let anchor = s.beat_anchor_time_sec.or(s.last_onset_time_sec);
        let raw = match anchor {
            Some(anchor) if s.bpm_estimate > 0.0 => {
                let period = 60.0 / s.bpm_estimate as f64;
                let phase = ((now_sec - anchor).rem_euclid(period) / period) as f32;
                let shape = if phase < p.pulse_attack {
                    phase / p.pulse_attack
                } else {
                    (-(phase - p.pulse_attack) * p.pulse_decay).exp()
                };
                shape * confidence
            }
            _ => 0.0,
        };

        let span = (p.full_confidence - p.usable_confidence).max(1e-3);
        let gate = smoothstep((confidence - p.usable_confidence) / span);
        let target = raw * gate;
        let rate = if target > s.pulse_level {
            p.pulse_rise
        } else {
            p.pulse_release
        };
        s.pulse_level += (target - s.pulse_level) * rate;
        if !s.pulse_level.is_finite() {
            s.pulse_level = 0.0;
        }

        if confidence < p.usable_confidence {
            return 0.0;
        }
        s.pulse_level.clamp(0.0, 1.0)
    }
}

/// Fold a tempo candidate into `[min, max]` by doubling or halving.
/// Non-positive or non-finite input folds to 0.
pub fn fold_bpm(bpm: f32, min: f32, max: f32) -> f32 {
    if !bpm.is_finite() || bpm <= 0.0 {
        return 0.0;
    }
    let mut v = bpm;
    for _ in 0..32 {
        if v < min {
            v *= 2.0;
        } else if v > max {
            v *= 0.5;
        } else {
            break;
        }
    }
    v
}

fn median_of_sorted(values: &[f32]) -> f32 {
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) * 0.5
    } else {
        values[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FPS: f64 = 60.0;

    fn click(on: bool) -> BandLevels {
        if on {
            BandLevels {
                low: 1.0,
                mid: 0.6,
                high: 0.3,
            }
        } else {
            BandLevels {
                low: 0.05,
                mid: 0.05,
                high: 0.05,
            }
        }
    }

    fn run_click_train(est: &mut TempoEstimator, frames_per_beat: usize, beats: usize) -> usize {
        let mut onsets = 0;
        for i in 0..frames_per_beat * beats {
            let t = i as f64 / FPS;
            if est.update(t, click(i % frames_per_beat == 0)) {
                onsets += 1;
            }
        }
        onsets
    }

    #[test]
    fn octave_folding_maps_to_same_bucket() {
        assert_eq!(fold_bpm(55.0, 70.0, 190.0), 110.0);
        assert_eq!(fold_bpm(110.0, 70.0, 190.0), 110.0);
        assert_eq!(fold_bpm(220.0, 70.0, 190.0), 110.0);
        assert_eq!(fold_bpm(0.0, 70.0, 190.0), 0.0);
        assert_eq!(fold_bpm(f32::NAN, 70.0, 190.0), 0.0);
    }

    #[test]
    fn converges_on_120_bpm_click_train() {
        let mut est = TempoEstimator::default();
        let onsets = run_click_train(&mut est, 30, 16);
        assert!(onsets >= 10, "only {onsets} onsets detected");
        assert!((est.bpm() - 120.0).abs() <= 3.0, "bpm {}", est.bpm());
        assert!(est.confidence() >= 0.6, "confidence {}", est.confidence());
    }

    #[test]
    fn close_clicks_trigger_once() {
        let mut est = TempoEstimator::default();
        // Two clicks 5 frames apart (~83 ms) with a silent gap between them.
        let mut fired = 0;
        for i in 0..40 {
            let on = i == 0 || i == 5;
            if est.update(i as f64 / FPS, click(on)) {
                fired += 1;
            }
        }
        assert_eq!(fired, 1);
    }

    #[test]
    fn implausible_intervals_are_not_recorded() {
        let mut est = TempoEstimator::default();
        // 2 s between clicks is slower than any accepted beat period.
        run_click_train(&mut est, 120, 6);
        assert!(est.state.interval_history.is_empty());
        assert_eq!(est.confidence(), 0.0);
        assert_eq!(est.bpm(), 0.0);
    }

    #[test]
    fn history_is_bounded() {
        let mut est = TempoEstimator::default();
        run_click_train(&mut est, 30, 60);
        assert!(est.state.interval_history.len() <= est.params.history_len);
    }

    #[test]
    fn pulse_is_zero_below_usable_confidence() {
        let mut est = TempoEstimator::default();
        est.state.bpm_estimate = 120.0;
        est.state.beat_anchor_time_sec = Some(0.0);
        est.state.confidence = 0.27;
        for i in 0..500 {
            assert_eq!(est.beat_pulse(i as f64 * 0.013), 0.0);
        }
        let mut fresh = TempoEstimator::default();
        assert_eq!(fresh.beat_pulse(12.5), 0.0);
    }

    #[test]
    fn pulse_peaks_near_the_beat() {
        let mut est = TempoEstimator::default();
        run_click_train(&mut est, 30, 16);
        let anchor = est.state.beat_anchor_time_sec.expect("phase should lock");
        let period = 60.0 / est.bpm() as f64;
        let mut on_beat = 0.0_f32;
        let mut off_beat = 1.0_f32;
        for k in 0..40 {
            let beat = anchor + period * (20 + k) as f64;
            // Let the smoother settle onto each region before reading it.
            for j in 0..4 {
                on_beat = est.beat_pulse(beat + period * 0.08 + j as f64 * 0.001);
            }
            for j in 0..12 {
                off_beat = est.beat_pulse(beat + period * 0.7 + j as f64 * 0.001);
            }
        }
        assert!(on_beat > off_beat, "on {on_beat} off {off_beat}");
        assert!(on_beat <= 1.0);
    }

    #[test]
    fn silence_produces_no_flux_or_nan() {
        let mut est = TempoEstimator::default();
        for i in 0..120 {
            assert!(!est.update(i as f64 / FPS, BandLevels::default()));
            assert_eq!(est.state.last_flux, 0.0);
        }
        assert!(est.state.flux_envelope.is_finite());
        assert!(est.state.flux_floor.is_finite());
        assert_eq!(est.beat_pulse(3.0), 0.0);
    }

    #[test]
    fn confidence_fades_after_the_clicks_stop() {
        let mut est = TempoEstimator::default();
        run_click_train(&mut est, 30, 16);
        assert!(est.confidence() >= 0.6);
        let bpm = est.bpm();

        let start = 16.0 * 30.0 / FPS;
        let frames = (20.0 * FPS) as usize;
        let mut last_pulse = 1.0;
        for i in 0..frames {
            let t = start + i as f64 / FPS;
            assert!(!est.update(t, click(false)));
            let pulse = est.beat_pulse(t);
            if i + (FPS as usize) >= frames {
                assert_eq!(pulse, 0.0, "pulse at {t}");
            }
            last_pulse = pulse;
        }
        assert_eq!(est.confidence(), 0.0);
        assert_eq!(last_pulse, 0.0);
        // The tempo itself is kept for when the beat returns.
        assert_eq!(est.bpm(), bpm);
    }

    #[test]
    fn confidence_holds_between_regular_beats() {
        let mut est = TempoEstimator::default();
        run_click_train(&mut est, 30, 16);
        let before = est.confidence();
        // One and a half beats of silence is well inside the stale window.
        for i in 0..45 {
            est.update(8.0 + i as f64 / FPS, click(false));
        }
        assert_eq!(est.confidence(), before);
    }

    #[test]
    fn first_estimate_is_taken_as_is() {
        let mut est = TempoEstimator::default();
        est.state.interval_history.extend([0.5; 6]);
        est.recompute_tempo(10.0);
        assert_eq!(est.bpm(), 120.0);
        assert!((est.confidence() - 0.6).abs() < 1e-6);
        // The next one still moves at the fast rate.
        est.recompute_tempo(10.5);
        assert!((est.confidence() - 0.84).abs() < 1e-5);
    }

    #[test]
    fn reset_clears_everything() {
        let mut est = TempoEstimator::default();
        run_click_train(&mut est, 30, 12);
        est.reset();
        assert_eq!(est.bpm(), 0.0);
        assert_eq!(est.confidence(), 0.0);
        assert!(est.state.interval_history.is_empty());
        assert!(est.state.last_onset_time_sec.is_none());
    }
}
