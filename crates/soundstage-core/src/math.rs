//! Small numeric helpers shared by every engine component.
//!
//! All interpolation in the engine goes through [`lerp`] so that the distance
//! model, mix automation and preset transitions ease identically and produce
//! reproducible test vectors.

/// Linear interpolation written as a weighted sum so that `t = 0` yields
/// exactly `a` and `t = 1` yields exactly `b`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Cubic smoothstep `3t² - 2t³` on a clamped `t`.
#[inline]
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Clamp that maps non-finite input to `fallback`.
#[inline]
pub fn clamp_or(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

/// Blend factor for an exponential approach with time constant `tau_sec`.
#[inline]
pub fn exp_alpha(dt_sec: f32, tau_sec: f32) -> f32 {
    if tau_sec <= 0.0 {
        return 1.0;
    }
    1.0 - (-dt_sec.max(0.0) / tau_sec).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_hits_endpoints_exactly() {
        let (a, b) = (0.123_456_7_f32, 98.765_43_f32);
        assert_eq!(lerp(a, b, 0.0), a);
        assert_eq!(lerp(a, b, 1.0), b);
    }

    #[test]
    fn smoothstep_is_symmetric_around_half() {
        assert_eq!(smoothstep(0.5), 0.5);
        assert!((smoothstep(0.25) + smoothstep(0.75) - 1.0).abs() < 1e-6);
        assert_eq!(smoothstep(-3.0), 0.0);
        assert_eq!(smoothstep(7.0), 1.0);
    }

    #[test]
    fn clamp_or_rejects_nan() {
        assert_eq!(clamp_or(f32::NAN, 0.0, 1.0, 0.4), 0.4);
        assert_eq!(clamp_or(f32::INFINITY, 0.0, 1.0, 0.4), 0.4);
        assert_eq!(clamp_or(3.0, 0.0, 1.0, 0.4), 1.0);
    }
}
