//! Weather rain: drops that fall through the map and splash on tiles

use crate::emitter::{
    approach_velocity, tick_fraction, EmitterRef, ParticleCounter, ParticleEmitter, ParticleUpdate,
};
use crate::particle::Particle;
use crate::pool::ParticleRecycler;
use crate::rand::ParticleRng;
use crate::tuning::RainTuning;
use crate::world::{GameMap, PrecipitationType, Tile, Weather};
use glimmer_core::{display_coordinates, Color, Location, Vec3, LEVEL_HEIGHT, STEP_X, STEP_Y};
use glimmer_graphics::Graphics;
use glimmer_scene::GameContainer;
use parking_lot::RwLock;
use std::sync::{Arc, Weak};

/// Spawns rain drops over the visible part of the map.
///
/// Drops live in the particle pool of the tile column they are above. When
/// a drop passes below its tile's level it is clamped there and rendered
/// once as a splash, then released.
pub struct WeatherRainEmitter {
    handle: Weak<RwLock<WeatherRainEmitter>>,
    weather: Arc<dyn Weather>,
    map: Arc<dyn GameMap>,
    recycler: ParticleRecycler,
    tuning: RainTuning,
    counter: ParticleCounter,
    rng: ParticleRng,
    spawn_countdown: i32,
    render_rain: bool,
    target_velocity: Vec3,
    drop_length: f32,
    splash_size: f32,
    color: Color,
}

impl WeatherRainEmitter {
    pub fn new(
        weather: Arc<dyn Weather>,
        map: Arc<dyn GameMap>,
        recycler: ParticleRecycler,
        tuning: RainTuning,
        seed: u32,
    ) -> Arc<RwLock<Self>> {
        Arc::new_cyclic(|handle| {
            RwLock::new(Self {
                handle: handle.clone(),
                weather,
                map,
                recycler,
                tuning,
                counter: ParticleCounter::new(),
                rng: ParticleRng::new(seed),
                spawn_countdown: 0,
                render_rain: false,
                target_velocity: Vec3::ZERO,
                drop_length: 0.0,
                splash_size: 0.0,
                color: Color::TRANSPARENT,
            })
        })
    }

    /// `false` while the weather does not call for visible rain
    pub fn is_rendering_rain(&self) -> bool {
        self.render_rain
    }

    /// Velocity every drop is steered toward, in map units per tick
    pub fn target_velocity(&self) -> Vec3 {
        self.target_velocity
    }

    pub fn counter(&self) -> &ParticleCounter {
        &self.counter
    }

    pub fn tuning(&self) -> &RainTuning {
        &self.tuning
    }

    /// Topmost tile of the column at `(x, y)` within the search window around the player
    fn column_tile(&self, x: i32, y: i32) -> Option<Arc<dyn Tile>> {
        let player = self.map.player_location();
        let top = player.z + self.tuning.column_above;
        let bottom = player.z - self.tuning.column_below;
        (bottom..=top)
            .rev()
            .find_map(|z| self.map.tile_at(&Location::new(x, y, z)))
    }

    /// Wrap a position that left the clipping window back in on the far side
    fn wrap_into_clipping(&self, position: &mut Vec3) {
        let player = self.map.player_location();
        let clip = self.map.clipping();
        let (px, py) = (player.x as f32, player.y as f32);
        position.x = wrap_axis(position.x - px, clip.left(), clip.right()) + px;
        position.y = wrap_axis(position.y - py, clip.top(), clip.bottom()) + py;
    }

    fn spawn_drop(&mut self) -> bool {
        let clip = self.map.clipping();
        if clip.is_empty() {
            return false;
        }
        let player = self.map.player_location();
        let x = player.x + self.rng.range_i32(clip.left(), clip.right());
        let y = player.y + self.rng.range_i32(clip.top(), clip.bottom());
        let Some(tile) = self.column_tile(x, y) else {
            return false;
        };

        let ground = tile.location().z as f32;
        let position = Vec3::new(
            x as f32 + self.rng.range(-0.45, 0.45),
            y as f32 + self.rng.range(-0.45, 0.45),
            ground + self.tuning.spawn_height.random(&mut self.rng),
        );
        let handle: EmitterRef = self.handle.clone();
        let drop = self
            .recycler
            .request()
            .position(position)
            .velocity(self.target_velocity)
            .size(self.drop_length)
            .lifetime(self.tuning.lifetime)
            .emitter(handle, &self.counter)
            .activate();

        match drop {
            Ok(drop) => {
                tile.particle_pool().insert(drop);
                true
            }
            Err(e) => {
                log::warn!("Failed to spawn rain drop: {e}");
                false
            }
        }
    }
}

/// Wrap `value` into `[low - 0.5, high - 0.5)` so it rounds onto a cell in `[low, high)`
fn wrap_axis(value: f32, low: i32, high: i32) -> f32 {
    let span = (high - low) as f32;
    if span <= 0.0 {
        return value;
    }
    let start = low as f32 - 0.5;
    start + (value - start).rem_euclid(span)
}

impl ParticleEmitter for WeatherRainEmitter {
    fn update_emitter(&mut self, _container: &dyn GameContainer, delta: u32) {
        let strength = self.weather.prec_strength();
        let raining = self.weather.is_outside()
            && self.weather.prec_type() == PrecipitationType::Rain
            && strength > 0;
        if raining != self.render_rain {
            let state = if raining { "started" } else { "stopped" };
            log::debug!("Rain {state} (strength {strength})");
        }
        self.render_rain = raining;
        if !raining {
            return;
        }

        let t = &self.tuning;
        let horizontal =
            self.weather.wind() as f32 * t.speed_horizontal.interpolated(strength) / 10_000.0;
        let vertical = t.speed_vertical.interpolated(strength) / 100.0;
        self.target_velocity = Vec3::new(horizontal, -horizontal, -vertical);
        self.drop_length = t.drop_size.interpolated(strength);
        self.splash_size = t.splash_size.interpolated(strength);
        let alpha = t.alpha.interpolated(strength).clamp(0.0, 255.0).round() as u8;
        self.color = t.color.multiplied(self.weather.ambient_light()).with_alpha(alpha);

        self.spawn_countdown -= delta as i32;
        if self.spawn_countdown > 0 {
            return;
        }
        self.spawn_countdown += t.spawn_interval.interpolated_int(strength).max(1);

        let max_allowed = t.max_drops.interpolated_int(strength) as i64;
        let wanted = t.drop_count.interpolated_int(strength) as i64;
        let spawn = (max_allowed - self.counter.count() as i64).min(wanted).max(0);

        let mut spawned = 0;
        for _ in 0..spawn {
            if self.spawn_drop() {
                spawned += 1;
            }
        }
        log::trace!("Spawned {spawned}/{spawn} rain drops, {} live", self.counter.count());
    }

    fn update_particle(&self, particle: &mut Particle, delta: u32) -> ParticleUpdate {
        if particle.is_dying() {
            // The splash has been drawn
            return ParticleUpdate::Release;
        }
        let remaining = particle.lifetime - delta as i32;
        if remaining <= 0 {
            return ParticleUpdate::Release;
        }
        particle.lifetime = remaining;

        particle.velocity = approach_velocity(particle.velocity, self.target_velocity, delta);
        particle.position += particle.velocity * tick_fraction(delta);

        let mut outcome = ParticleUpdate::Keep;
        let mut ground = particle.pool_location().map(|l| l.z as f32);
        let cell = particle.position.cell();
        let left_cell = particle
            .pool_location()
            .map_or(true, |pool| pool.x != cell.x || pool.y != cell.y);

        if left_cell {
            self.wrap_into_clipping(&mut particle.position);
            let cell = particle.position.cell();
            match self.column_tile(cell.x, cell.y) {
                Some(tile) => {
                    ground = Some(tile.location().z as f32);
                    outcome = ParticleUpdate::MoveTo(tile.particle_pool());
                }
                None => return ParticleUpdate::Release,
            }
        }

        if let Some(ground) = ground {
            if particle.position.z < ground {
                particle.position.z = ground;
                particle.lifetime = Particle::DYING;
            }
        }
        outcome
    }

    fn render_particle(
        &self,
        particle: &Particle,
        g: &mut dyn Graphics,
        offset_x: i32,
        offset_y: i32,
    ) {
        if !self.render_rain {
            return;
        }
        let p = particle.position;
        let (sx, sy) = display_coordinates(p.x, p.y, p.z);
        let x = sx - offset_x as f32;
        let y = sy - offset_y as f32;

        if particle.is_dying() {
            let s = self.splash_size;
            if s > 0.0 {
                g.draw_line((x, y), (x - s, y - s * 0.6), 1.0, self.color);
                g.draw_line((x, y), (x, y - s), 1.0, self.color);
                g.draw_line((x, y), (x + s, y - s * 0.6), 1.0, self.color);
            }
            return;
        }

        let v = particle.velocity;
        let dx = (v.x - v.y) * STEP_X;
        let dy = (v.x + v.y) * STEP_Y - v.z * LEVEL_HEIGHT;
        let len = (dx * dx + dy * dy).sqrt();
        let (nx, ny) = if len > 1e-4 { (dx / len, dy / len) } else { (0.0, 1.0) };
        let tail = (x - nx * particle.size, y - ny * particle.size);
        g.draw_line(tail, (x, y), 1.0, self.color);
    }

    fn particle_count(&self) -> usize {
        self.counter.count()
    }
}
