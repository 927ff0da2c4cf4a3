//! Chimney smoke rising from a single tile

use crate::emitter::{
    approach_velocity, tick_fraction, EmitterRef, ParticleCounter, ParticleEmitter, ParticleUpdate,
};
use crate::particle::Particle;
use crate::pool::ParticleRecycler;
use crate::rand::ParticleRng;
use crate::tuning::SmokeTuning;
use crate::world::{GameMap, Weather};
use glimmer_core::{display_coordinates, Color, Location, Rectangle, Vec3};
use glimmer_graphics::{Graphics, Texture, TextureManager};
use glimmer_scene::GameContainer;
use parking_lot::RwLock;
use std::sync::{Arc, Weak};

/// Emits puffs from one tile. Puffs rise, drift with the wind, grow and
/// fade out over their lifetime.
pub struct SmokeEmitter {
    handle: Weak<RwLock<SmokeEmitter>>,
    location: Location,
    weather: Arc<dyn Weather>,
    map: Arc<dyn GameMap>,
    recycler: ParticleRecycler,
    tuning: SmokeTuning,
    texture: Option<Texture>,
    counter: ParticleCounter,
    rng: ParticleRng,
    spawn_countdown: i32,
    active: bool,
    target_velocity: Vec3,
    tint: Color,
}

impl SmokeEmitter {
    /// Resolves the puff texture up front; puffs are drawn as plain
    /// rectangles if it cannot be found.
    pub fn new(
        location: Location,
        weather: Arc<dyn Weather>,
        map: Arc<dyn GameMap>,
        recycler: ParticleRecycler,
        textures: &mut TextureManager,
        tuning: SmokeTuning,
        seed: u32,
    ) -> Arc<RwLock<Self>> {
        let texture = textures.texture(&tuning.texture);
        if texture.is_none() {
            log::warn!("Smoke texture '{}' not found, using untextured puffs", tuning.texture);
        }
        let target_velocity = Vec3::new(0.0, 0.0, tuning.rise_speed);
        Arc::new_cyclic(|handle| {
            RwLock::new(Self {
                handle: handle.clone(),
                location,
                weather,
                map,
                recycler,
                tuning,
                texture,
                counter: ParticleCounter::new(),
                rng: ParticleRng::new(seed),
                spawn_countdown: 0,
                active: true,
                target_velocity,
                tint: Color::WHITE,
            })
        })
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Stop or resume emitting. Puffs already in the air keep going.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn has_texture(&self) -> bool {
        self.texture.is_some()
    }

    fn spawn_puff(&mut self) -> bool {
        let Some(tile) = self.map.tile_at(&self.location) else {
            log::trace!("No tile at {:?} for smoke", self.location);
            return false;
        };
        let position = self.location.to_vec3()
            + Vec3::new(self.rng.range(-0.15, 0.15), self.rng.range(-0.15, 0.15), 0.5);
        let lifetime = self.tuning.lifetime.random(&mut self.rng).round().max(1.0) as i32;
        let size = self.tuning.size.random(&mut self.rng);
        let handle: EmitterRef = self.handle.clone();

        let puff = self
            .recycler
            .request()
            .position(position)
            .velocity(Vec3::new(0.0, 0.0, self.tuning.rise_speed))
            .size(size)
            .lifetime(lifetime)
            .emitter(handle, &self.counter)
            .activate();
        match puff {
            Ok(puff) => {
                tile.particle_pool().insert(puff);
                true
            }
            Err(e) => {
                log::warn!("Failed to spawn smoke puff: {e}");
                false
            }
        }
    }
}

impl ParticleEmitter for SmokeEmitter {
    fn update_emitter(&mut self, _container: &dyn GameContainer, delta: u32) {
        let drift = self.weather.wind() as f32 / 100.0 * self.tuning.drift;
        self.target_velocity = Vec3::new(drift, -drift, self.tuning.rise_speed);
        self.tint = self.tuning.color.multiplied(self.weather.ambient_light());

        if !self.active {
            return;
        }
        self.spawn_countdown -= delta as i32;
        if self.spawn_countdown > 0 {
            return;
        }
        self.spawn_countdown += self.tuning.spawn_interval.max(1);
        if self.counter.count() < self.tuning.max_puffs {
            self.spawn_puff();
        }
    }

    fn update_particle(&self, particle: &mut Particle, delta: u32) -> ParticleUpdate {
        let remaining = particle.lifetime - delta as i32;
        if remaining <= 0 {
            return ParticleUpdate::Release;
        }
        particle.lifetime = remaining;
        particle.velocity = approach_velocity(particle.velocity, self.target_velocity, delta);
        particle.position += particle.velocity * tick_fraction(delta);
        particle.size += self.tuning.growth * tick_fraction(delta);

        let cell = particle.position.cell();
        match particle.pool_location() {
            Some(pool) if pool.x == cell.x && pool.y == cell.y => ParticleUpdate::Keep,
            _ => match self.map.tile_at(&Location::new(cell.x, cell.y, self.location.z)) {
                Some(tile) => ParticleUpdate::MoveTo(tile.particle_pool()),
                None => ParticleUpdate::Release,
            },
        }
    }

    fn render_particle(
        &self,
        particle: &Particle,
        g: &mut dyn Graphics,
        offset_x: i32,
        offset_y: i32,
    ) {
        let p = particle.position;
        let (sx, sy) = display_coordinates(p.x, p.y, p.z);
        let fade = if self.tuning.fade > 0 {
            (particle.lifetime as f32 / self.tuning.fade as f32).min(1.0)
        } else {
            1.0
        };
        let mut color = self.tint;
        color.set_alpha_f(color.alpha_f() * fade);

        let size = particle.size.round().max(1.0) as i32;
        let dest = Rectangle::new(
            (sx - offset_x as f32 - particle.size / 2.0).round() as i32,
            (sy - offset_y as f32 - particle.size / 2.0).round() as i32,
            size,
            size,
        );
        match &self.texture {
            Some(texture) => g.draw_texture(texture, dest, color, false),
            None => g.fill_rect(dest, color),
        }
    }

    fn particle_count(&self) -> usize {
        self.counter.count()
    }
}
