//! Draw-call sink

use crate::texture::Texture;
use glimmer_core::{BlendingMode, Color, Rectangle};

/// Target of every draw call issued by scene elements.
///
/// Coordinates are screen pixels. Each call is composited with the blending
/// mode that is current when it is issued.
pub trait Graphics {
    fn blending_mode(&self) -> BlendingMode;

    fn set_blending_mode(&mut self, mode: BlendingMode);

    /// Draw `texture` stretched into `dest`, tinted by `color`
    fn draw_texture(&mut self, texture: &Texture, dest: Rectangle, color: Color, flip_x: bool);

    fn draw_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Color);

    fn fill_rect(&mut self, rect: Rectangle, color: Color);
}

/// One recorded draw call
#[derive(Debug, Clone)]
pub enum DrawCommand {
    Texture {
        source: String,
        dest: Rectangle,
        color: Color,
        flip_x: bool,
        mode: BlendingMode,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        width: f32,
        color: Color,
        mode: BlendingMode,
    },
    FillRect {
        rect: Rectangle,
        color: Color,
        mode: BlendingMode,
    },
}

/// A `Graphics` implementation that stores draw calls instead of rasterizing
/// them. Used for headless runs and tests.
#[derive(Debug, Default)]
pub struct RecordingGraphics {
    mode: BlendingMode,
    commands: Vec<DrawCommand>,
}

impl RecordingGraphics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Remove and return everything recorded so far
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
            .count()
    }

    pub fn texture_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Texture { .. }))
            .count()
    }
}

impl Graphics for RecordingGraphics {
    fn blending_mode(&self) -> BlendingMode {
        self.mode
    }

    fn set_blending_mode(&mut self, mode: BlendingMode) {
        self.mode = mode;
    }

    fn draw_texture(&mut self, texture: &Texture, dest: Rectangle, color: Color, flip_x: bool) {
        self.commands.push(DrawCommand::Texture {
            source: texture.source().to_string(),
            dest,
            color,
            flip_x,
            mode: self.mode,
        });
    }

    fn draw_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Color) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            width,
            color,
            mode: self.mode,
        });
    }

    fn fill_rect(&mut self, rect: Rectangle, color: Color) {
        self.commands.push(DrawCommand::FillRect {
            rect,
            color,
            mode: self.mode,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    #[test]
    fn records_calls_with_current_mode() {
        let mut g = RecordingGraphics::new();
        g.draw_line((0.0, 0.0), (1.0, 1.0), 1.0, Color::WHITE);
        g.set_blending_mode(BlendingMode::Additive);
        g.fill_rect(Rectangle::new(0, 0, 2, 2), Color::RED);
        let tex = Texture::from_image("dot", RgbaImage::new(1, 1));
        g.draw_texture(&tex, Rectangle::new(5, 5, 1, 1), Color::WHITE, true);

        assert_eq!(g.len(), 3);
        assert_eq!(g.line_count(), 1);
        assert_eq!(g.texture_count(), 1);
        assert!(matches!(
            g.commands()[0],
            DrawCommand::Line {
                mode: BlendingMode::AlphaBlend,
                ..
            }
        ));
        assert!(matches!(
            g.commands()[1],
            DrawCommand::FillRect {
                mode: BlendingMode::Additive,
                ..
            }
        ));

        let taken = g.take();
        assert_eq!(taken.len(), 3);
        assert!(g.is_empty());
    }
}
