//! Glimmer Scene - ordered, thread-safe collection of scene elements
//!
//! - `SceneElement` - something the scene updates, renders and offers events to
//! - `Scene` - snapshot-per-frame update/render with a deferred event queue
//! - `EventQueue` / `EventPublisher` - lock-free event hand-off from any thread
//! - `SceneEffect` - post-processing passes filtered by backend capability

mod effect;
mod element;
mod event;
mod scene;

pub use effect::{EffectCapability, SceneEffect, TintEffect};
pub use element::{GameContainer, HeadlessContainer, SceneElement};
pub use event::{EventPublisher, EventQueue, SceneEvent};
pub use scene::Scene;
