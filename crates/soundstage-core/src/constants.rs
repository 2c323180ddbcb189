// Shared tuning constants for the spatial engine. Every value here is a
// default that was tuned by ear; none is derived from acoustics.

// Spectral band index ranges for a 2048-point analyser (1024 bins)
pub const LOW_BAND: (usize, usize) = (0, 12);
pub const MID_BAND: (usize, usize) = (12, 64);
pub const HIGH_BAND: (usize, usize) = (64, 180);

// Early reflection taps
pub const EARLY_COUNT: usize = 6;
pub const EARLY_JITTER_MAX_SEC: f32 = 0.003;
pub const EARLY_MIN_DELAY_SEC: f32 = 0.001;
pub const EARLY_CUTOFF_MIN_HZ: f32 = 5600.0;
pub const EARLY_CUTOFF_MAX_HZ: f32 = 16000.0;

// Air absorption
pub const AIR_MAX_HZ: f32 = 20000.0;
pub const AIR_CUTOFF_BASE: f32 = 0.22; // cutoff = AIR_MAX_HZ * base^absorb
pub const AIR_HIGHPASS_MARGIN_HZ: f32 = 350.0;

// Reverb tone filter limits
pub const REVERB_TONE_MIN_HZ: f32 = 4200.0;
pub const REVERB_TONE_MAX_HZ: f32 = 14500.0;

// Reverb pre-delay limits (seconds)
pub const PRE_DELAY_MIN_SEC: f32 = 0.006;
pub const PRE_DELAY_MAX_SEC: f32 = 0.085;

// Relative change that makes a new impulse response worth building
pub const IMPULSE_REBUILD_RATIO: f32 = 0.04;

// Vocal clarity trims
pub const SIDE_ATTENUATION: f32 = 0.9;
pub const MID_BOOST: f32 = 1.06;
pub const PRESENCE_BOOST_DB: f32 = 0.6;
pub const EARLY_ATTENUATION: f32 = 0.88;
pub const REVERB_ATTENUATION: f32 = 0.85;

// Stereo accompaniment (side channel) tuning
pub const SIDE_GAIN_BOOST: f32 = 1.08;
pub const SIDE_LEFT_BIAS: f32 = 0.98;
pub const SIDE_RIGHT_BIAS: f32 = 1.02;
pub const ACCOMPANIMENT_LEFT: [f32; 3] = [-1.4, 0.05, -0.9];
pub const ACCOMPANIMENT_RIGHT: [f32; 3] = [1.4, 0.05, -0.9];

// Output make-up gain
pub const MAKEUP_SPAN: f32 = 0.55;
pub const MAKEUP_MAX: f32 = 1.35;

// Focus control: z push for panners, yaw for the listener
pub const FOCUS_DEPTH_SPAN: f32 = 1.2;
pub const FOCUS_YAW_SPAN: f32 = 0.35;

// Motion intensity below this is treated as off
pub const MOTION_INTENSITY_EPSILON: f32 = 0.01;

// Preset transitions (milliseconds)
pub const TRANSITION_DEFAULT_MS: f64 = 320.0;
pub const TRANSITION_MAX_MS: f64 = 1400.0;

// Distance fallback when the host hands us a non-finite offset
pub const DISTANCE_FALLBACK: f32 = 1.2;
