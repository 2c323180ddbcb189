// Host-side tuning for WebAudio ramps, the analyser and DOM wiring.
// Engine-side tuning lives in `soundstage_core::constants`.

// setTargetAtTime time constants (seconds)
pub const GAIN_RAMP_TAU_SEC: f64 = 0.06;
pub const FILTER_RAMP_TAU_SEC: f64 = 0.12;
pub const PANNER_RAMP_TAU_SEC: f64 = 0.08;
pub const LISTENER_RAMP_TAU_SEC: f64 = 0.1;
pub const DELAY_RAMP_TAU_SEC: f64 = 0.05;

// Analyser
pub const ANALYSER_FFT_SIZE: u32 = 2048;
pub const ANALYSER_SMOOTHING: f64 = 0.85;

// Delay line capacities (seconds)
pub const LANE_DELAY_MAX_SEC: f64 = 0.1;
pub const EARLY_DELAY_MAX_SEC: f64 = 1.0;
pub const PRE_DELAY_MAX_SEC: f64 = 1.0;

// Reverb return voicing
pub const REVERB_LOW_SHELF_HZ: f32 = 150.0;
pub const REVERB_PRESENCE_HZ: f32 = 1850.0;
pub const REVERB_PRESENCE_Q: f32 = 0.85;

// Master EQ
pub const EQ_LOW_SHELF_HZ: f32 = 120.0;
pub const EQ_MID_PEAK_HZ: f32 = 1050.0;
pub const EQ_MID_Q: f32 = 0.9;
pub const EQ_HIGH_SHELF_HZ: f32 = 6200.0;

// Keyboard volume nudge
pub const VOLUME_STEP: f32 = 0.05;

// Seed for the impulse noise; per-channel seeds are derived from it
pub const IMPULSE_SEED: u32 = 0x1234_ABCD;

pub const SETTINGS_KEY: &str = "soundstage-settings-v1";

// DOM ids
pub const MEDIA_ID: &str = "media";
pub const FILE_INPUT_ID: &str = "file-input";
pub const HUD_ID: &str = "stage-hud";
pub const BYPASS_BUTTON_ID: &str = "bypass-btn";
pub const RESET_BUTTON_ID: &str = "reset-btn";
pub const PRESET_ATTR: &str = "data-preset";
pub const PRESET_ACTIVE_CLASS: &str = "active";
pub const HUD_HIDDEN_CLASS: &str = "hidden";
pub const BYPASS_ACTIVE_CLASS: &str = "bypass-on";

// Control inputs
pub const VOLUME_INPUT_ID: &str = "volume";
pub const DEPTH_INPUT_ID: &str = "depth";
pub const FOCUS_INPUT_ID: &str = "focus";
pub const EARLY_MIX_INPUT_ID: &str = "early-mix";
pub const REVERB_LENGTH_INPUT_ID: &str = "reverb-length";
pub const REVERB_TONE_INPUT_ID: &str = "reverb-tone";
pub const MOTION_TOGGLE_ID: &str = "motion-toggle";
pub const MOTION_INTENSITY_INPUT_ID: &str = "motion-intensity";
pub const EQ_BASS_INPUT_ID: &str = "eq-bass";
pub const EQ_MID_INPUT_ID: &str = "eq-mid";
pub const EQ_TREBLE_INPUT_ID: &str = "eq-treble";
pub const VISUALIZER_TOGGLE_ID: &str = "visualizer-toggle";
