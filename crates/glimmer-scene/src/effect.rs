//! Post-processing passes applied after all scene elements are rendered

use glimmer_core::{BlendingMode, Color, Rectangle};
use glimmer_graphics::Graphics;
use parking_lot::Mutex;

/// What a rendering backend must offer for an effect to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectCapability {
    /// Full-screen blended fills
    Overlay,
    /// Programmable fragment shaders
    Shader,
}

/// A full-screen pass run after the scene's elements
pub trait SceneEffect: Send + Sync {
    fn name(&self) -> &str;

    fn capability(&self) -> EffectCapability;

    fn apply(&self, g: &mut dyn Graphics, viewport: Rectangle);
}

/// Fills the viewport with one colour, e.g. night darkening or a lightning flash
pub struct TintEffect {
    name: String,
    color: Mutex<Color>,
    mode: BlendingMode,
}

impl TintEffect {
    pub fn new(name: &str, color: Color, mode: BlendingMode) -> Self {
        Self {
            name: name.to_string(),
            color: Mutex::new(color),
            mode,
        }
    }

    pub fn color(&self) -> Color {
        *self.color.lock()
    }

    pub fn set_color(&self, color: Color) {
        *self.color.lock() = color;
    }
}

impl SceneEffect for TintEffect {
    fn name(&self) -> &str {
        &self.name
    }

    fn capability(&self) -> EffectCapability {
        EffectCapability::Overlay
    }

    fn apply(&self, g: &mut dyn Graphics, viewport: Rectangle) {
        let color = self.color();
        if color.a == 0 {
            return;
        }
        let previous = g.blending_mode();
        g.set_blending_mode(self.mode);
        g.fill_rect(viewport, color);
        g.set_blending_mode(previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glimmer_graphics::{DrawCommand, RecordingGraphics};

    #[test]
    fn tint_restores_blending_mode() {
        let tint = TintEffect::new("night", Color::new(0, 0, 40, 120), BlendingMode::Multiply);
        let mut g = RecordingGraphics::new();
        tint.apply(&mut g, Rectangle::new(0, 0, 800, 600));

        assert_eq!(g.blending_mode(), BlendingMode::AlphaBlend);
        assert!(matches!(
            g.commands()[0],
            DrawCommand::FillRect {
                mode: BlendingMode::Multiply,
                ..
            }
        ));
    }

    #[test]
    fn transparent_tint_draws_nothing() {
        let tint = TintEffect::new("flash", Color::WHITE, BlendingMode::Additive);
        tint.set_color(Color::TRANSPARENT);
        let mut g = RecordingGraphics::new();
        tint.apply(&mut g, Rectangle::new(0, 0, 10, 10));
        assert!(g.is_empty());
    }
}
