use crate::constants::IMPULSE_REBUILD_RATIO;
use crate::preset::ReverbConfig;

/// Shape of the convolution impulse the host should hold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImpulseSpec {
    pub duration_sec: f32,
    pub decay: f32,
}

impl ImpulseSpec {
    /// Reverb config scaled by the reverb length control (`1.0` = as preset).
    pub fn from_reverb(reverb: &ReverbConfig, length: f32) -> Self {
        Self {
            duration_sec: (reverb.duration_sec * length).max(0.05),
            decay: (reverb.decay * length).max(0.0),
        }
    }

    /// True when either field moved by more than the rebuild ratio.
    pub fn differs_meaningfully(&self, other: &ImpulseSpec) -> bool {
        fn rel(a: f32, b: f32) -> f32 {
            (a - b).abs() / a.abs().max(b.abs()).max(1e-6)
        }
        rel(self.duration_sec, other.duration_sec) > IMPULSE_REBUILD_RATIO
            || rel(self.decay, other.decay) > IMPULSE_REBUILD_RATIO
    }
}

fn xorshift32(state: &mut u32) -> f32 {
    let mut x = *state;
    x ^= x << 13;
    x ^= x >> 17;
    x ^= x << 5;
    *state = x;
    (x as f32 / u32::MAX as f32) * 2.0 - 1.0
}

/// Deterministic stereo noise burst with a `(1 - i/len)^decay` fade.
pub fn generate_impulse(sample_rate: f32, spec: &ImpulseSpec, seed: u32) -> [Vec<f32>; 2] {
    let len = (sample_rate.max(0.0) * spec.duration_sec.max(0.0)) as usize;
    let mut channels = [Vec::with_capacity(len), Vec::with_capacity(len)];
    for (ch, buf) in channels.iter_mut().enumerate() {
        // xorshift state must be non-zero
        let mut state = (seed ^ (0x9E37_79B9u32.wrapping_mul(ch as u32 + 1))).max(1);
        for i in 0..len {
            let fade = (1.0 - i as f32 / len as f32).powf(spec.decay);
            buf.push(xorshift32(&mut state) * fade);
        }
    }
    channels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_changes_do_not_rebuild() {
        let a = ImpulseSpec {
            duration_sec: 2.0,
            decay: 2.0,
        };
        let b = ImpulseSpec {
            duration_sec: 2.05,
            decay: 2.0,
        };
        let c = ImpulseSpec {
            duration_sec: 2.0,
            decay: 2.4,
        };
        assert!(!a.differs_meaningfully(&b));
        assert!(a.differs_meaningfully(&c));
    }

    #[test]
    fn impulse_is_deterministic_and_fades() {
        let spec = ImpulseSpec {
            duration_sec: 0.1,
            decay: 2.0,
        };
        let a = generate_impulse(8000.0, &spec, 42);
        let b = generate_impulse(8000.0, &spec, 42);
        assert_eq!(a, b);
        assert_eq!(a[0].len(), 800);
        assert_ne!(a[0], a[1]);
        assert!(a[0].iter().all(|v| v.abs() <= 1.0));
        let head: f32 = a[0][..100].iter().map(|v| v.abs()).sum();
        let tail: f32 = a[0][700..].iter().map(|v| v.abs()).sum();
        assert!(head > tail);
    }

    #[test]
    fn zero_duration_yields_empty_buffers() {
        let spec = ImpulseSpec {
            duration_sec: 0.0,
            decay: 1.0,
        };
        let [l, r] = generate_impulse(48000.0, &spec, 1);
        assert!(l.is_empty() && r.is_empty());
    }
}
