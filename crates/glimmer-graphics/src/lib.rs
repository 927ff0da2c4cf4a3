//! Glimmer Graphics - textures, atlas streaming and sprites
//!
//! - `Texture` - a region of a shared RGBA image
//! - `TextureManager` - resolves logical names, streaming atlas pages lazily
//! - `Sprite` - same-sized animation frames with placement metadata
//! - `Graphics` - the draw-call sink scene elements render into

pub mod atlas;
pub mod graphics;
pub mod manager;
pub mod sprite;
pub mod texture;

pub use graphics::{DrawCommand, Graphics, RecordingGraphics};
pub use manager::TextureManager;
pub use sprite::Sprite;
pub use texture::Texture;
