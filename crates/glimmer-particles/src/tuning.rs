//! Emitter tunables with built-in defaults and TOML overrides

use crate::range::Range;
use glimmer_core::Color;

/// Tunables of a rain emitter. Every `Range` is interpolated with the
/// precipitation strength, except `spawn_height` which is sampled randomly.
#[derive(Debug, Clone, PartialEq)]
pub struct RainTuning {
    /// Drops spawned per burst
    pub drop_count: Range,
    /// Milliseconds between bursts
    pub spawn_interval: Range,
    /// Cap on live drops
    pub max_drops: Range,
    /// Length of the rendered streak in pixels
    pub drop_size: Range,
    /// Horizontal speed, scaled by wind / 10000 per tick
    pub speed_horizontal: Range,
    /// Fall speed, scaled by 1/100 per tick
    pub speed_vertical: Range,
    pub splash_size: Range,
    pub alpha: Range,
    /// Levels above the ground a drop starts at (volumetric rain only)
    pub spawn_height: Range,
    /// Upper bound on a drop's lifetime in milliseconds
    pub lifetime: i32,
    /// Levels above and below the player searched for a tile
    pub column_above: i32,
    pub column_below: i32,
    pub color: Color,
}

impl RainTuning {
    /// Drops falling through the map onto tiles
    pub fn volumetric() -> Self {
        Self {
            drop_count: Range::new(1.0, 25.0),
            spawn_interval: Range::new(30.0, 60.0),
            max_drops: Range::new(50.0, 1500.0),
            drop_size: Range::new(6.0, 16.0),
            speed_horizontal: Range::new(5.0, 20.0),
            speed_vertical: Range::new(20.0, 50.0),
            splash_size: Range::new(2.0, 6.0),
            alpha: Range::new(60.0, 160.0),
            spawn_height: Range::new(2.0, 4.0),
            lifetime: 5000,
            column_above: 2,
            column_below: 2,
            color: Color::opaque(170, 180, 200),
        }
    }

    /// Streaks drawn in screen space in front of the map
    pub fn overlay() -> Self {
        Self {
            drop_count: Range::new(1.0, 15.0),
            spawn_interval: Range::new(30.0, 60.0),
            max_drops: Range::new(30.0, 600.0),
            drop_size: Range::new(10.0, 24.0),
            speed_horizontal: Range::new(500.0, 1500.0),
            speed_vertical: Range::new(2000.0, 4000.0),
            splash_size: Range::fixed(0.0),
            alpha: Range::new(40.0, 120.0),
            spawn_height: Range::fixed(0.0),
            lifetime: 3000,
            column_above: 0,
            column_below: 0,
            color: Color::opaque(200, 210, 230),
        }
    }

    /// Override fields of `base` with the values present in `table`
    pub fn from_toml(table: &toml::value::Table, base: Self) -> Self {
        let mut tuning = base;

        if let Some(v) = table.get("drop_count") {
            tuning.drop_count = toml_range(v, tuning.drop_count);
        }
        if let Some(v) = table.get("spawn_interval") {
            tuning.spawn_interval = toml_range(v, tuning.spawn_interval);
        }
        if let Some(v) = table.get("max_drops") {
            tuning.max_drops = toml_range(v, tuning.max_drops);
        }
        if let Some(v) = table.get("drop_size") {
            tuning.drop_size = toml_range(v, tuning.drop_size);
        }
        if let Some(v) = table.get("speed_horizontal") {
            tuning.speed_horizontal = toml_range(v, tuning.speed_horizontal);
        }
        if let Some(v) = table.get("speed_vertical") {
            tuning.speed_vertical = toml_range(v, tuning.speed_vertical);
        }
        if let Some(v) = table.get("splash_size") {
            tuning.splash_size = toml_range(v, tuning.splash_size);
        }
        if let Some(v) = table.get("alpha") {
            tuning.alpha = toml_range(v, tuning.alpha);
        }
        if let Some(v) = table.get("spawn_height") {
            tuning.spawn_height = toml_range(v, tuning.spawn_height);
        }
        if let Some(v) = table.get("lifetime") {
            tuning.lifetime = v.as_integer().unwrap_or(5000).clamp(1, 60_000) as i32;
        }
        if let Some(v) = table.get("column_above") {
            tuning.column_above = v.as_integer().unwrap_or(2).clamp(0, 16) as i32;
        }
        if let Some(v) = table.get("column_below") {
            tuning.column_below = v.as_integer().unwrap_or(2).clamp(0, 16) as i32;
        }
        if let Some(v) = table.get("color") {
            tuning.color = toml_color(v, tuning.color);
        }

        tuning
    }
}

/// Tunables of a chimney smoke emitter
#[derive(Debug, Clone, PartialEq)]
pub struct SmokeTuning {
    /// Milliseconds between puffs
    pub spawn_interval: i32,
    pub max_puffs: usize,
    /// Puff lifetime in milliseconds
    pub lifetime: Range,
    /// Milliseconds before death at which a puff starts fading
    pub fade: i32,
    /// Levels per tick
    pub rise_speed: f32,
    /// Tiles per tick at full wind
    pub drift: f32,
    /// Size in pixels at spawn
    pub size: Range,
    /// Pixels gained per tick
    pub growth: f32,
    pub color: Color,
    pub texture: String,
}

impl Default for SmokeTuning {
    fn default() -> Self {
        Self {
            spawn_interval: 300,
            max_puffs: 24,
            lifetime: Range::new(2500.0, 4000.0),
            fade: 1000,
            rise_speed: 0.06,
            drift: 0.05,
            size: Range::new(8.0, 14.0),
            growth: 0.6,
            color: Color::new(200, 200, 200, 160),
            texture: "smoke".to_string(),
        }
    }
}

impl SmokeTuning {
    pub fn from_toml(table: &toml::value::Table) -> Self {
        let mut tuning = Self::default();

        if let Some(v) = table.get("spawn_interval") {
            tuning.spawn_interval = v.as_integer().unwrap_or(300).clamp(1, 60_000) as i32;
        }
        if let Some(v) = table.get("max_puffs") {
            let n = v.as_integer().unwrap_or(24).max(0) as usize;
            tuning.max_puffs = n.min(1000);
        }
        if let Some(v) = table.get("lifetime") {
            tuning.lifetime = toml_range(v, tuning.lifetime);
        }
        if let Some(v) = table.get("fade") {
            tuning.fade = v.as_integer().unwrap_or(1000).max(0) as i32;
        }
        if let Some(v) = table.get("rise_speed") {
            tuning.rise_speed = toml_f32(v, tuning.rise_speed);
        }
        if let Some(v) = table.get("drift") {
            tuning.drift = toml_f32(v, tuning.drift);
        }
        if let Some(v) = table.get("size") {
            tuning.size = toml_range(v, tuning.size);
        }
        if let Some(v) = table.get("growth") {
            tuning.growth = toml_f32(v, tuning.growth);
        }
        if let Some(v) = table.get("color") {
            tuning.color = toml_color(v, tuning.color);
        }
        if let Some(v) = table.get("texture") {
            if let Some(s) = v.as_str() {
                tuning.texture = s.to_string();
            }
        }

        tuning
    }
}

// ── TOML helpers (handle integer/float coercion) ──

fn toml_f32(v: &toml::Value, default: f32) -> f32 {
    v.as_float()
        .map(|f| f as f32)
        .or_else(|| v.as_integer().map(|i| i as f32))
        .unwrap_or(default)
}

/// `[min, max]` or a single number for a fixed value
fn toml_range(v: &toml::Value, default: Range) -> Range {
    if let Some(arr) = v.as_array() {
        if arr.len() >= 2 {
            return Range::new(toml_f32(&arr[0], default.min()), toml_f32(&arr[1], default.max()));
        }
        return default;
    }
    if v.is_float() || v.is_integer() {
        return Range::fixed(toml_f32(v, default.min()));
    }
    default
}

/// `[r, g, b]` or `[r, g, b, a]` with 0-255 components
fn toml_color(v: &toml::Value, default: Color) -> Color {
    if let Some(arr) = v.as_array() {
        if arr.len() >= 3 {
            let channel = |i: usize, fallback: u8| {
                arr.get(i)
                    .map(|c| toml_f32(c, fallback as f32).clamp(0.0, 255.0).round() as u8)
                    .unwrap_or(fallback)
            };
            return Color::new(
                channel(0, default.r),
                channel(1, default.g),
                channel(2, default.b),
                channel(3, 255),
            );
        }
    }
    default
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        for tuning in [RainTuning::volumetric(), RainTuning::overlay()] {
            assert!(tuning.drop_count.min() >= 1.0);
            assert!(tuning.spawn_interval.min() > 0.0);
            assert!(tuning.max_drops.max() >= tuning.drop_count.max());
            assert!(tuning.lifetime > 0);
        }
        let smoke = SmokeTuning::default();
        assert!(smoke.max_puffs > 0);
        assert!(smoke.lifetime.min() > smoke.fade as f32);
    }

    #[test]
    fn rain_overrides_from_toml() {
        let toml_str = r#"
drop_count = [2, 40]
max_drops = 100
alpha = [200.0, 50]
column_below = 4
color = [10, 20, 30]
"#;
        let table: toml::value::Table = toml::from_str(toml_str).unwrap();
        let tuning = RainTuning::from_toml(&table, RainTuning::volumetric());
        assert_eq!(tuning.drop_count, Range::new(2.0, 40.0));
        assert_eq!(tuning.max_drops, Range::fixed(100.0));
        assert_eq!(tuning.alpha, Range::new(50.0, 200.0));
        assert_eq!(tuning.column_below, 4);
        assert_eq!(tuning.color, Color::new(10, 20, 30, 255));
        // Untouched fields keep the base
        assert_eq!(tuning.speed_vertical, RainTuning::volumetric().speed_vertical);
    }

    #[test]
    fn smoke_from_toml() {
        let toml_str = r#"
spawn_interval = 150
rise_speed = 1
texture = "effects/steam"
"#;
        let table: toml::value::Table = toml::from_str(toml_str).unwrap();
        let tuning = SmokeTuning::from_toml(&table);
        assert_eq!(tuning.spawn_interval, 150);
        assert!((tuning.rise_speed - 1.0).abs() < 1e-6);
        assert_eq!(tuning.texture, "effects/steam");
        assert_eq!(tuning.max_puffs, SmokeTuning::default().max_puffs);
    }
}
