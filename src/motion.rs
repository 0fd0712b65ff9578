//! Per-tick interpolation helpers shared by the hero and the gallery.
//!
//! Every smoothed value in the crate moves by `lerp(current, target, factor)`
//! with the factor clamped to `[0, 1]`, so a value never overshoots its target
//! and never moves by more than `factor * |target - current|` in one tick.

use glam::Vec3;

pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from * (1.0 - t) + to * t
}

/// `rate * delta` clamped to a usable lerp factor.
pub fn smoothing_factor(rate: f32, delta: f32) -> f32 {
    (rate * delta.max(0.0)).clamp(0.0, 1.0)
}

/// Exponential approach of `current` toward `target` at `rate` per second.
pub fn approach(current: f32, target: f32, rate: f32, delta: f32) -> f32 {
    lerp(current, target, smoothing_factor(rate, delta))
}

pub fn approach_vec3(current: Vec3, target: Vec3, rate: f32, delta: f32) -> Vec3 {
    current.lerp(target, smoothing_factor(rate, delta))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_endpoints_are_exact() {
        assert_eq!(lerp(0.3, 0.7, 0.0), 0.3);
        assert_eq!(lerp(0.3, 0.7, 1.0), 0.7);
    }

    #[test]
    fn factor_is_clamped() {
        assert_eq!(smoothing_factor(5.0, 1.0), 1.0);
        assert_eq!(smoothing_factor(5.0, -0.1), 0.0);
        assert!((smoothing_factor(2.0, 0.1) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn approach_never_overshoots() {
        let mut value = 0.0;
        for _ in 0..100 {
            let next = approach(value, 1.0, 5.0, 0.5);
            assert!(next >= value && next <= 1.0);
            value = next;
        }
        assert_eq!(value, 1.0);
    }

    #[test]
    fn approach_vec3_moves_componentwise() {
        let next = approach_vec3(Vec3::ZERO, Vec3::new(1.0, 2.0, 0.0), 5.0, 0.1);
        assert!((next.x - 0.5).abs() < 1e-6);
        assert!((next.y - 1.0).abs() < 1e-6);
        assert_eq!(next.z, 0.0);
    }
}
