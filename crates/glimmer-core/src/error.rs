//! Error types for Glimmer

use thiserror::Error;

/// The main error type for Glimmer operations
#[derive(Debug, Error)]
pub enum GlimmerError {
    #[error("Texture not found: {0}")]
    TextureNotFound(String),

    #[error("Failed to decode image '{path}': {reason}")]
    ImageDecode { path: String, reason: String },

    #[error("Atlas manifest error in {path}: {reason}")]
    AtlasManifest { path: String, reason: String },

    #[error("Sprite error: {0}")]
    SpriteError(String),

    #[error("Sprite frame {index} is {got_width}x{got_height}, expected {width}x{height}")]
    SpriteFrameMismatch {
        index: usize,
        width: u32,
        height: u32,
        got_width: u32,
        got_height: u32,
    },

    #[error("Particle activation failed: {0} was never set")]
    IncompleteParticle(&'static str),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),
}

/// Result type alias for Glimmer operations
pub type Result<T> = std::result::Result<T, GlimmerError>;

impl From<toml::de::Error> for GlimmerError {
    fn from(err: toml::de::Error) -> Self {
        GlimmerError::TomlParseError(err.to_string())
    }
}
