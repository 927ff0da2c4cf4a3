//! Sprites: same-sized frames plus placement metadata

use crate::graphics::Graphics;
use crate::manager::TextureManager;
use crate::texture::Texture;
use glimmer_core::{Color, GlimmerError, Rectangle, Result};

/// An immutable set of animation frames sharing one size.
///
/// The anchor is a fraction of the frame size that lands on the draw
/// position; the pixel offset is applied on top of it. Mirrored sprites flip
/// both horizontally.
#[derive(Debug, Clone)]
pub struct Sprite {
    name: String,
    frames: Vec<Texture>,
    offset_x: i32,
    offset_y: i32,
    anchor_x: f32,
    anchor_y: f32,
    mirror: bool,
}

impl Sprite {
    pub fn new(
        name: &str,
        frames: Vec<Texture>,
        offset: (i32, i32),
        anchor: (f32, f32),
        mirror: bool,
    ) -> Result<Self> {
        let Some(first) = frames.first() else {
            return Err(GlimmerError::SpriteError(format!(
                "sprite '{name}' has no frames"
            )));
        };
        let (width, height) = (first.width(), first.height());
        for (index, frame) in frames.iter().enumerate().skip(1) {
            if frame.width() != width || frame.height() != height {
                return Err(GlimmerError::SpriteFrameMismatch {
                    index,
                    width,
                    height,
                    got_width: frame.width(),
                    got_height: frame.height(),
                });
            }
        }

        Ok(Self {
            name: name.to_string(),
            frames,
            offset_x: offset.0,
            offset_y: offset.1,
            anchor_x: anchor.0,
            anchor_y: anchor.1,
            mirror,
        })
    }

    /// Resolve the frames of a sprite through the texture manager.
    ///
    /// A single frame sprite uses `name` itself; animated sprites use
    /// `name-0` .. `name-(frame_count - 1)`.
    pub fn load(
        textures: &mut TextureManager,
        directory: &str,
        name: &str,
        frame_count: usize,
        offset: (i32, i32),
        anchor: (f32, f32),
        mirror: bool,
    ) -> Result<Self> {
        let names: Vec<String> = if frame_count <= 1 {
            vec![name.to_string()]
        } else {
            (0..frame_count).map(|i| format!("{name}-{i}")).collect()
        };

        let mut frames = Vec::with_capacity(names.len());
        for frame_name in &names {
            let texture = textures
                .texture_in(directory, frame_name)
                .ok_or_else(|| GlimmerError::TextureNotFound(format!("{directory}/{frame_name}")))?;
            frames.push(texture);
        }
        Self::new(name, frames, offset, anchor, mirror)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.frames[0].width()
    }

    pub fn height(&self) -> u32 {
        self.frames[0].height()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Frame by index, wrapping around for looping animations
    pub fn frame(&self, index: usize) -> &Texture {
        &self.frames[index % self.frames.len()]
    }

    pub fn offset(&self) -> (i32, i32) {
        (self.offset_x, self.offset_y)
    }

    pub fn anchor(&self) -> (f32, f32) {
        (self.anchor_x, self.anchor_y)
    }

    pub fn is_mirrored(&self) -> bool {
        self.mirror
    }

    /// Screen rectangle covered when drawn at (x, y) with `scale`
    pub fn display_rect(&self, x: i32, y: i32, scale: f32) -> Rectangle {
        let width = (self.width() as f32 * scale).round() as i32;
        let height = (self.height() as f32 * scale).round() as i32;

        let (offset_x, anchor_x) = if self.mirror {
            (-self.offset_x, 1.0 - self.anchor_x)
        } else {
            (self.offset_x, self.anchor_x)
        };

        let left = x + (offset_x as f32 * scale).round() as i32
            - (width as f32 * anchor_x).round() as i32;
        let top = y
            - (self.offset_y as f32 * scale).round() as i32
            - (height as f32 * self.anchor_y).round() as i32;

        Rectangle::new(left, top, width, height)
    }

    pub fn draw(
        &self,
        g: &mut dyn Graphics,
        x: i32,
        y: i32,
        frame: usize,
        color: Color,
        scale: f32,
    ) {
        let dest = self.display_rect(x, y, scale);
        g.draw_texture(self.frame(frame), dest, color, self.mirror);
    }
}
