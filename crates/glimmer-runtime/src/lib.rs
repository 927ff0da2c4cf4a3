//! Glimmer Runtime - client wiring
//!
//! Provides the pieces a client loop is built from:
//! - `ClientConfig` - TOML configuration with defaults for every field
//! - `ClientContext` - owns the texture manager, scene and particle recycler
//! - `FrameClock` - millisecond frame deltas with stall clamping

mod clock;
mod config;
mod context;

pub use clock::{FrameClock, MAX_DELTA_MS};
pub use config::{ClientConfig, ViewportConfig, WeatherConfig};
pub use context::{ClientContext, EMITTER_ORDER};
