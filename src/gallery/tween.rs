//! Time-driven interpolation
//!
//! Tweens are advanced by the frame loop with the frame's delta time; they
//! never read a clock themselves.

use std::time::Duration;

use cgmath::Vector3;

/// Values a [`Tween`] can move between
pub trait Interpolate: Copy {
    fn interpolate(self, to: Self, t: f32) -> Self;
}

impl Interpolate for f32 {
    fn interpolate(self, to: Self, t: f32) -> Self {
        self + (to - self) * t
    }
}

impl Interpolate for Vector3<f32> {
    fn interpolate(self, to: Self, t: f32) -> Self {
        self + (to - self) * t
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Easing {
    #[default]
    Linear,
    /// Cubic ease-in-out
    Power2InOut,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::Power2InOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

/// Interpolation from `from` to `to` over a fixed duration
#[derive(Clone, Debug)]
pub struct Tween<T: Interpolate> {
    from: T,
    to: T,
    duration: f32,
    elapsed: f32,
    easing: Easing,
}

impl<T: Interpolate> Tween<T> {
    pub fn new(from: T, to: T, duration: Duration, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration: duration.as_secs_f32(),
            elapsed: 0.0,
            easing,
        }
    }

    /// Moves time forward by `dt` seconds and returns the new value
    pub fn advance(&mut self, dt: f32) -> T {
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
        self.value()
    }

    pub fn value(&self) -> T {
        self.from.interpolate(self.to, self.easing.apply(self.progress()))
    }

    /// Linear progress in `[0, 1]`
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            self.elapsed / self.duration
        }
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }

    pub fn target(&self) -> T {
        self.to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn test_power2_in_out_shape() {
        let e = Easing::Power2InOut;
        assert!(e.apply(0.0).abs() < EPS);
        assert!((e.apply(0.5) - 0.5).abs() < EPS);
        assert!((e.apply(1.0) - 1.0).abs() < EPS);
        assert!((e.apply(0.25) - 0.0625).abs() < EPS);
        assert!((e.apply(0.25) + e.apply(0.75) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_tween_clamps_at_end() {
        let mut tween = Tween::new(1.0_f32, 0.0, Duration::from_secs(2), Easing::Linear);
        assert!((tween.advance(0.5) - 0.75).abs() < EPS);
        assert!(!tween.is_finished());
        assert!(tween.advance(10.0).abs() < EPS);
        assert!(tween.is_finished());
    }

    #[test]
    fn test_vector_tween() {
        let mut tween = Tween::new(
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(10.0, -10.0, 2.0),
            Duration::from_secs(1),
            Easing::Linear,
        );
        let v = tween.advance(0.5);
        assert!((v.x - 5.0).abs() < EPS && (v.y + 5.0).abs() < EPS && (v.z - 1.0).abs() < EPS);
    }

    #[test]
    fn test_zero_duration_finishes_immediately() {
        let tween = Tween::new(3.0_f32, 7.0, Duration::ZERO, Easing::Power2InOut);
        assert!(tween.is_finished());
        assert!((tween.value() - 7.0).abs() < EPS);
    }
}
