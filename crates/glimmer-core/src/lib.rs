//! Glimmer Core - Foundational types for the Glimmer client core
//!
//! This crate provides the value types every other Glimmer crate depends on:
//! - `Color`, `FrozenColor`, `BlendingMode` - draw-call colour primitives
//! - `Vec3`, `Location`, `Rectangle` - map and screen geometry
//! - Error types and Result alias

mod color;
mod error;
mod geometry;

pub use color::{BlendingMode, Color, FrozenColor};
pub use error::{GlimmerError, Result};
pub use geometry::{display_coordinates, Location, Rectangle, Vec3, LEVEL_HEIGHT, STEP_X, STEP_Y};
