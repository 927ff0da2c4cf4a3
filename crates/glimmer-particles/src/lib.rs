//! Glimmer Particles - pooled, tile-aware particle simulation
//!
//! Provides:
//! - `ParticleRecycler` - shared free list handing out builder-configured particles
//! - `ParticlePool` - per-tile (or screen overlay) particle storage that is also a scene element
//! - `ParticleEmitter` - spawn/update/render contract, with live counts tied to particle lifetimes
//! - Weather rain (volumetric and overlay) and chimney smoke emitters

pub mod emitter;
pub mod particle;
pub mod pool;
pub mod rain;
pub mod rain_overlay;
pub mod rand;
pub mod range;
pub mod smoke;
pub mod tuning;
pub mod world;

pub use emitter::{
    EmitterElement, EmitterRef, LiveToken, ParticleCounter, ParticleEmitter, ParticleUpdate,
    SharedEmitter,
};
pub use particle::Particle;
pub use pool::{ParticleBuilder, ParticlePool, ParticleRecycler};
pub use rain::WeatherRainEmitter;
pub use rain_overlay::OverlayRainEmitter;
pub use range::Range;
pub use smoke::SmokeEmitter;
pub use tuning::{RainTuning, SmokeTuning};
pub use world::{
    GameMap, GridTile, PrecipitationType, Tile, TileGrid, Weather, WeatherState, WeatherValues,
};
