//! Strength-driven tunable ranges

use crate::rand::ParticleRng;

/// Bounds for a value that scales with an intensity from 0 to 100
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    min: f32,
    max: f32,
}

impl Range {
    /// Bounds are stored in ascending order whichever way they are passed
    pub fn new(a: f32, b: f32) -> Self {
        if a <= b {
            Self { min: a, max: b }
        } else {
            Self { min: b, max: a }
        }
    }

    pub fn fixed(value: f32) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    /// Linear interpolation at `strength`, clamped to `[0, 100]`.
    /// Returns exactly `min` at 0 and exactly `max` at 100.
    pub fn interpolated(&self, strength: i32) -> f32 {
        let strength = strength.clamp(0, 100);
        match strength {
            0 => self.min,
            100 => self.max,
            s => (self.min + (self.max - self.min) * (s as f32 / 100.0)).min(self.max),
        }
    }

    /// `interpolated` rounded to the nearest integer
    pub fn interpolated_int(&self, strength: i32) -> i32 {
        self.interpolated(strength).round() as i32
    }

    /// A uniformly distributed value in `[min, max]`
    pub fn random(&self, rng: &mut ParticleRng) -> f32 {
        rng.range(self.min, self.max)
    }
}
