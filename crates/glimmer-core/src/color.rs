//! RGBA colour value and compositing modes

use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// How a draw call combines its source with what is already on screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlendingMode {
    #[default]
    AlphaBlend,
    Multiply,
    Additive,
}

/// RGBA colour with 8 bit channels.
///
/// All mutators keep every channel in `[0, 255]`; float accessors map that
/// range onto `[0.0, 1.0]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    pub const GRAY: Self = Self::new(128, 128, 128, 255);
    pub const RED: Self = Self::new(255, 0, 0, 255);
    pub const GREEN: Self = Self::new(0, 255, 0, 255);
    pub const BLUE: Self = Self::new(0, 0, 255, 255);
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Build from float channels, clamping to `[0, 1]` and rounding
    pub fn from_floats(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            r: float_to_channel(r),
            g: float_to_channel(g),
            b: float_to_channel(b),
            a: float_to_channel(a),
        }
    }

    pub fn red_f(&self) -> f32 {
        self.r as f32 / 255.0
    }

    pub fn green_f(&self) -> f32 {
        self.g as f32 / 255.0
    }

    pub fn blue_f(&self) -> f32 {
        self.b as f32 / 255.0
    }

    pub fn alpha_f(&self) -> f32 {
        self.a as f32 / 255.0
    }

    pub fn set_alpha_f(&mut self, alpha: f32) {
        self.a = float_to_channel(alpha);
    }

    pub fn with_alpha(mut self, alpha: u8) -> Self {
        self.a = alpha;
        self
    }

    /// Channel-wise fixed-point product: `a * b / 255`
    pub fn multiply(&mut self, other: Color) {
        self.r = mul_channel(self.r, other.r);
        self.g = mul_channel(self.g, other.g);
        self.b = mul_channel(self.b, other.b);
        self.a = mul_channel(self.a, other.a);
    }

    pub fn multiplied(mut self, other: Color) -> Self {
        self.multiply(other);
        self
    }

    /// Channel-wise saturating sum
    pub fn add(&mut self, other: Color) {
        self.r = self.r.saturating_add(other.r);
        self.g = self.g.saturating_add(other.g);
        self.b = self.b.saturating_add(other.b);
        self.a = self.a.saturating_add(other.a);
    }

    /// Move towards `other` by `factor` (0 keeps self, 1 yields other)
    pub fn blend(&mut self, other: Color, factor: f32) {
        let t = factor.clamp(0.0, 1.0);
        self.r = lerp_channel(self.r, other.r, t);
        self.g = lerp_channel(self.g, other.g, t);
        self.b = lerp_channel(self.b, other.b, t);
        self.a = lerp_channel(self.a, other.a, t);
    }

    pub fn to_array_f32(&self) -> [f32; 4] {
        [self.red_f(), self.green_f(), self.blue_f(), self.alpha_f()]
    }

    pub fn from_array_f32(arr: [f32; 4]) -> Self {
        Self::from_floats(arr[0], arr[1], arr[2], arr[3])
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// A colour that can be read but never changed in place.
///
/// Getting a `Color` out of it copies the value, so any later mutation
/// happens on the copy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrozenColor(Color);

impl FrozenColor {
    pub const fn new(color: Color) -> Self {
        Self(color)
    }

    pub const fn get(&self) -> Color {
        self.0
    }
}

impl Deref for FrozenColor {
    type Target = Color;

    fn deref(&self) -> &Color {
        &self.0
    }
}

impl From<Color> for FrozenColor {
    fn from(color: Color) -> Self {
        Self(color)
    }
}

impl From<FrozenColor> for Color {
    fn from(frozen: FrozenColor) -> Self {
        frozen.0
    }
}

fn float_to_channel(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn mul_channel(a: u8, b: u8) -> u8 {
    ((a as u16 * b as u16) / 255) as u8
}

fn lerp_channel(a: u8, b: u8, t: f32) -> u8 {
    let v = a as f32 + (b as f32 - a as f32) * t;
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiply_is_fixed_point() {
        let mut c = Color::new(255, 128, 10, 255);
        c.multiply(Color::new(255, 128, 255, 0));
        assert_eq!(c, Color::new(255, 64, 10, 0));

        assert_eq!(Color::WHITE.multiplied(Color::GRAY), Color::GRAY);
    }

    #[test]
    fn add_saturates() {
        let mut c = Color::new(200, 100, 0, 255);
        c.add(Color::new(100, 100, 1, 1));
        assert_eq!(c, Color::new(255, 200, 1, 255));
    }

    #[test]
    fn float_channels_clamp_and_round() {
        let c = Color::from_floats(1.5, -0.2, 0.5, 0.999);
        assert_eq!(c, Color::new(255, 0, 128, 255));
        assert!((Color::GRAY.red_f() - 0.502).abs() < 0.01);

        let mut c = Color::WHITE;
        c.set_alpha_f(0.25);
        assert_eq!(c.a, 64);
    }

    #[test]
    fn blend_endpoints() {
        let mut c = Color::BLACK;
        c.blend(Color::WHITE, 0.0);
        assert_eq!(c, Color::BLACK);
        c.blend(Color::WHITE, 1.0);
        assert_eq!(c, Color::WHITE);

        let mut mid = Color::new(0, 0, 0, 0);
        mid.blend(Color::new(200, 100, 50, 255), 0.5);
        assert_eq!(mid, Color::new(100, 50, 25, 128));
    }

    #[test]
    fn frozen_color_copies_on_read() {
        const FROZEN: FrozenColor = FrozenColor::new(Color::RED);
        let mut copy: Color = FROZEN.get();
        copy.multiply(Color::GRAY);

        assert_eq!(FROZEN.r, 255);
        assert_eq!(copy.r, 128);
        assert_eq!(Color::from(FROZEN), Color::RED);
    }
}
