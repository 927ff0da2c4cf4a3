//! The slice of the game world the emitters read: weather, map and tiles

use crate::pool::{ParticlePool, ParticleRecycler};
use glimmer_core::{Color, Location, Rectangle};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrecipitationType {
    #[default]
    None,
    Rain,
    Snow,
}

impl PrecipitationType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "none" => Some(Self::None),
            "rain" => Some(Self::Rain),
            "snow" => Some(Self::Snow),
            _ => None,
        }
    }
}

/// Current weather as seen from the player's position
pub trait Weather: Send + Sync {
    /// `false` while the player is under a roof
    fn is_outside(&self) -> bool;

    /// Precipitation strength, nominally 0 to 100
    fn prec_strength(&self) -> i32;

    fn prec_type(&self) -> PrecipitationType;

    /// Wind strength, -100 to 100; positive blows toward screen right
    fn wind(&self) -> i32;

    fn ambient_light(&self) -> Color;
}

/// A map tile able to hold particles
pub trait Tile: Send + Sync {
    fn location(&self) -> Location;

    fn particle_pool(&self) -> ParticlePool;
}

/// The loaded part of the game map
pub trait GameMap: Send + Sync {
    fn tile_at(&self, location: &Location) -> Option<Arc<dyn Tile>>;

    /// Visible tile window relative to the player; right and bottom are exclusive
    fn clipping(&self) -> Rectangle;

    fn player_location(&self) -> Location;
}

/// A plain snapshot of weather values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherValues {
    pub outside: bool,
    pub strength: i32,
    pub prec_type: PrecipitationType,
    pub wind: i32,
    pub ambient: Color,
}

impl Default for WeatherValues {
    fn default() -> Self {
        Self {
            outside: true,
            strength: 0,
            prec_type: PrecipitationType::None,
            wind: 0,
            ambient: Color::WHITE,
        }
    }
}

/// Thread-safe weather that can be changed while emitters read it
#[derive(Default)]
pub struct WeatherState {
    values: RwLock<WeatherValues>,
}

impl WeatherState {
    pub fn new(values: WeatherValues) -> Self {
        Self {
            values: RwLock::new(values),
        }
    }

    /// Rain of `strength` with the given wind, player outside
    pub fn raining(strength: i32, wind: i32) -> Self {
        Self::new(WeatherValues {
            strength,
            wind,
            prec_type: PrecipitationType::Rain,
            ..WeatherValues::default()
        })
    }

    pub fn values(&self) -> WeatherValues {
        *self.values.read()
    }

    pub fn set(&self, values: WeatherValues) {
        *self.values.write() = values;
    }

    pub fn modify(&self, f: impl FnOnce(&mut WeatherValues)) {
        f(&mut *self.values.write());
    }
}

impl Weather for WeatherState {
    fn is_outside(&self) -> bool {
        self.values.read().outside
    }

    fn prec_strength(&self) -> i32 {
        self.values.read().strength
    }

    fn prec_type(&self) -> PrecipitationType {
        self.values.read().prec_type
    }

    fn wind(&self) -> i32 {
        self.values.read().wind
    }

    fn ambient_light(&self) -> Color {
        self.values.read().ambient
    }
}

/// A tile with nothing but a location and a particle pool
pub struct GridTile {
    location: Location,
    pool: ParticlePool,
}

impl GridTile {
    pub fn new(recycler: ParticleRecycler, location: Location) -> Self {
        Self {
            location,
            pool: ParticlePool::for_tile(recycler, location),
        }
    }
}

impl Tile for GridTile {
    fn location(&self) -> Location {
        self.location
    }

    fn particle_pool(&self) -> ParticlePool {
        self.pool.clone()
    }
}

/// In-memory map of tiles, used for headless runs and tests
pub struct TileGrid {
    tiles: RwLock<HashMap<Location, Arc<GridTile>>>,
    recycler: ParticleRecycler,
    clipping: Rectangle,
    player: RwLock<Location>,
}

impl TileGrid {
    pub fn new(recycler: ParticleRecycler, player: Location, clipping: Rectangle) -> Self {
        Self {
            tiles: RwLock::new(HashMap::new()),
            recycler,
            clipping,
            player: RwLock::new(player),
        }
    }

    /// A grid with one tile at the player's level for every visible column
    pub fn flat(recycler: ParticleRecycler, player: Location, clipping: Rectangle) -> Self {
        let grid = Self::new(recycler, player, clipping);
        for dy in clipping.top()..clipping.bottom() {
            for dx in clipping.left()..clipping.right() {
                grid.add_tile(Location::new(player.x + dx, player.y + dy, player.z));
            }
        }
        grid
    }

    /// Add a tile, replacing any tile already at `location`
    pub fn add_tile(&self, location: Location) -> Arc<GridTile> {
        let tile = Arc::new(GridTile::new(self.recycler.clone(), location));
        if let Some(old) = self.tiles.write().insert(location, Arc::clone(&tile)) {
            old.pool.release_all();
        }
        tile
    }

    /// Remove a tile and release its particles
    pub fn remove_tile(&self, location: &Location) -> bool {
        match self.tiles.write().remove(location) {
            Some(tile) => {
                tile.pool.release_all();
                true
            }
            None => false,
        }
    }

    pub fn set_player_location(&self, location: Location) {
        *self.player.write() = location;
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.read().len()
    }

    /// Particle pools of every tile
    pub fn pools(&self) -> Vec<ParticlePool> {
        self.tiles.read().values().map(|t| t.pool.clone()).collect()
    }

    /// Total particles held by all tiles
    pub fn particle_count(&self) -> usize {
        self.tiles.read().values().map(|t| t.pool.len()).sum()
    }
}

impl GameMap for TileGrid {
    fn tile_at(&self, location: &Location) -> Option<Arc<dyn Tile>> {
        let tile = self.tiles.read().get(location).cloned()?;
        Some(tile as Arc<dyn Tile>)
    }

    fn clipping(&self) -> Rectangle {
        self.clipping
    }

    fn player_location(&self) -> Location {
        *self.player.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_grid_covers_clipping() {
        let player = Location::new(10, 10, 0);
        let clipping = Rectangle::from_edges(-2, -2, 3, 3);
        let grid = TileGrid::flat(ParticleRecycler::new(), player, clipping);
        assert_eq!(grid.tile_count(), 25);
        assert!(grid.tile_at(&Location::new(8, 8, 0)).is_some());
        assert!(grid.tile_at(&Location::new(12, 12, 0)).is_some());
        assert!(grid.tile_at(&Location::new(13, 12, 0)).is_none());
        assert!(grid.tile_at(&Location::new(10, 10, 1)).is_none());
    }

    #[test]
    fn tile_pool_carries_location() {
        let clipping = Rectangle::new(0, 0, 1, 1);
        let grid = TileGrid::new(ParticleRecycler::new(), Location::default(), clipping);
        grid.add_tile(Location::new(1, 2, 3));
        let tile = grid.tile_at(&Location::new(1, 2, 3)).unwrap();
        assert_eq!(tile.particle_pool().location(), Some(Location::new(1, 2, 3)));
        assert!(tile.particle_pool().same_pool(&tile.particle_pool()));
    }

    #[test]
    fn remove_tile() {
        let clipping = Rectangle::new(0, 0, 1, 1);
        let grid = TileGrid::new(ParticleRecycler::new(), Location::default(), clipping);
        grid.add_tile(Location::new(0, 0, 0));
        assert!(grid.remove_tile(&Location::new(0, 0, 0)));
        assert!(!grid.remove_tile(&Location::new(0, 0, 0)));
        assert_eq!(grid.tile_count(), 0);
    }

    #[test]
    fn weather_state_updates() {
        let weather = WeatherState::raining(40, -20);
        assert_eq!(weather.prec_type(), PrecipitationType::Rain);
        assert_eq!(weather.prec_strength(), 40);

        weather.modify(|v| v.outside = false);
        assert!(!weather.is_outside());
        assert_eq!(weather.wind(), -20);
    }

    #[test]
    fn precipitation_names() {
        assert_eq!(PrecipitationType::from_name("Rain"), Some(PrecipitationType::Rain));
        assert_eq!(PrecipitationType::from_name("hail"), None);
    }
}
