//! Shared client services handed to the components that need them

use crate::config::ClientConfig;
use glimmer_core::{Location, Result};
use glimmer_graphics::TextureManager;
use glimmer_particles::{
    EmitterElement, GameMap, OverlayRainEmitter, ParticlePool, ParticleRecycler, SharedEmitter,
    SmokeEmitter, Weather, WeatherRainEmitter,
};
use glimmer_scene::{Scene, SceneElement};
use parking_lot::{Mutex, MutexGuard, RwLock};
use std::sync::Arc;

/// Scene order for emitter elements; they spawn before any pool updates
pub const EMITTER_ORDER: i32 = i32::MAX;

/// Owns the texture manager, the scene and the particle recycler of one client
pub struct ClientContext {
    config: ClientConfig,
    textures: Mutex<TextureManager>,
    scene: Arc<Scene>,
    recycler: ParticleRecycler,
}

impl ClientContext {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let capabilities = config.effect_capabilities()?;
        let mut textures = TextureManager::new(&config.asset_root);
        for directory in &config.texture_directories {
            textures.add_directory(directory);
        }
        log::debug!(
            "Client context: assets at {}, {} atlas directories, capabilities {:?}",
            config.asset_root.display(),
            config.texture_directories.len(),
            capabilities
        );

        Ok(Self {
            textures: Mutex::new(textures),
            scene: Arc::new(Scene::with_capabilities(&capabilities)),
            recycler: ParticleRecycler::new(),
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn scene(&self) -> &Arc<Scene> {
        &self.scene
    }

    pub fn recycler(&self) -> &ParticleRecycler {
        &self.recycler
    }

    /// Exclusive access to the texture manager
    pub fn textures(&self) -> MutexGuard<'_, TextureManager> {
        self.textures.lock()
    }

    /// Load one more atlas page. Returns overall progress in `[0, 1]`.
    pub fn load_step(&self) -> f32 {
        let progress = self.textures.lock().load_remaining();
        log::info!("Texture loading {:.0}%", progress * 100.0);
        progress
    }

    pub fn is_loaded(&self) -> bool {
        self.textures.lock().is_fully_loaded()
    }

    /// Add tile pools to the scene
    pub fn attach_pools(&self, pools: impl IntoIterator<Item = ParticlePool>) -> usize {
        pools
            .into_iter()
            .filter(|pool| self.scene.add_element(pool.as_element()))
            .count()
    }

    /// Drive an emitter from the scene. Keep the returned element to remove it later.
    pub fn add_emitter(&self, emitter: SharedEmitter) -> Arc<dyn SceneElement> {
        let element: Arc<dyn SceneElement> = Arc::new(EmitterElement::new(emitter, EMITTER_ORDER));
        self.scene.add_element(Arc::clone(&element));
        element
    }

    /// Volumetric rain with the configured tunables
    pub fn add_weather_rain(
        &self,
        weather: Arc<dyn Weather>,
        map: Arc<dyn GameMap>,
        seed: u32,
    ) -> Arc<RwLock<WeatherRainEmitter>> {
        let tuning = self.config.rain_tuning();
        let rain = WeatherRainEmitter::new(weather, map, self.recycler.clone(), tuning, seed);
        self.add_emitter(rain.clone());
        rain
    }

    /// Screen-space rain; its pool is added to the scene as well
    pub fn add_overlay_rain(
        &self,
        weather: Arc<dyn Weather>,
        seed: u32,
    ) -> Arc<RwLock<OverlayRainEmitter>> {
        let tuning = self.config.overlay_rain_tuning();
        let rain = OverlayRainEmitter::new(weather, self.recycler.clone(), tuning, seed);
        self.scene.add_element(rain.read().pool().as_element());
        self.add_emitter(rain.clone());
        rain
    }

    /// Smoke rising from `location`, textured from the texture manager
    pub fn add_smoke(
        &self,
        location: Location,
        weather: Arc<dyn Weather>,
        map: Arc<dyn GameMap>,
        seed: u32,
    ) -> Arc<RwLock<SmokeEmitter>> {
        let smoke = SmokeEmitter::new(
            location,
            weather,
            map,
            self.recycler.clone(),
            &mut self.textures.lock(),
            self.config.smoke_tuning(),
            seed,
        );
        self.add_emitter(smoke.clone());
        smoke
    }
}
