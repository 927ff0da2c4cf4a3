//! Screen-space rain drawn in front of the map

use crate::emitter::{
    approach_velocity, tick_fraction, EmitterRef, ParticleCounter, ParticleEmitter, ParticleUpdate,
};
use crate::particle::Particle;
use crate::pool::{ParticlePool, ParticleRecycler};
use crate::rand::ParticleRng;
use crate::tuning::RainTuning;
use crate::world::{PrecipitationType, Weather};
use glimmer_core::{Color, Rectangle, Vec3};
use glimmer_graphics::Graphics;
use glimmer_scene::GameContainer;
use parking_lot::RwLock;
use std::sync::{Arc, Weak};

/// Scene order of the overlay pool; drawn after every tile
pub const OVERLAY_ORDER: i32 = i32::MIN / 2;

/// Rain streaks in viewport pixels, independent of the map.
///
/// Drops wrap horizontally across the viewport and are released once they
/// fall past its bottom edge. Positions ignore the camera offset.
pub struct OverlayRainEmitter {
    handle: Weak<RwLock<OverlayRainEmitter>>,
    weather: Arc<dyn Weather>,
    pool: ParticlePool,
    tuning: RainTuning,
    counter: ParticleCounter,
    rng: ParticleRng,
    spawn_countdown: i32,
    render_rain: bool,
    viewport: Rectangle,
    target_velocity: Vec3,
    drop_length: f32,
    color: Color,
}

impl OverlayRainEmitter {
    /// The emitter owns a screen-space pool; add `pool().as_element()` to the scene
    pub fn new(
        weather: Arc<dyn Weather>,
        recycler: ParticleRecycler,
        tuning: RainTuning,
        seed: u32,
    ) -> Arc<RwLock<Self>> {
        Arc::new_cyclic(|handle| {
            RwLock::new(Self {
                handle: handle.clone(),
                weather,
                pool: ParticlePool::overlay(recycler, OVERLAY_ORDER),
                tuning,
                counter: ParticleCounter::new(),
                rng: ParticleRng::new(seed),
                spawn_countdown: 0,
                render_rain: false,
                viewport: Rectangle::default(),
                target_velocity: Vec3::ZERO,
                drop_length: 0.0,
                color: Color::TRANSPARENT,
            })
        })
    }

    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    pub fn is_rendering_rain(&self) -> bool {
        self.render_rain
    }

    /// Pixels per tick; positive y is down the screen
    pub fn target_velocity(&self) -> Vec3 {
        self.target_velocity
    }

    fn spawn_drop(&mut self) -> bool {
        let view = self.viewport;
        if view.is_empty() {
            return false;
        }
        let position = Vec3::new(
            self.rng.range(view.left() as f32, view.right() as f32),
            self.rng.range(view.top() as f32, view.bottom() as f32),
            0.0,
        );
        let handle: EmitterRef = self.handle.clone();
        let drop = self
            .pool
            .recycler()
            .request()
            .position(position)
            .velocity(self.target_velocity)
            .size(self.drop_length)
            .lifetime(self.tuning.lifetime)
            .emitter(handle, &self.counter)
            .activate();

        match drop {
            Ok(drop) => {
                self.pool.insert(drop);
                true
            }
            Err(e) => {
                log::warn!("Failed to spawn overlay rain drop: {e}");
                false
            }
        }
    }
}

impl ParticleEmitter for OverlayRainEmitter {
    fn update_emitter(&mut self, container: &dyn GameContainer, delta: u32) {
        let strength = self.weather.prec_strength();
        self.render_rain = self.weather.is_outside()
            && self.weather.prec_type() == PrecipitationType::Rain
            && strength > 0;
        if !self.render_rain {
            return;
        }

        self.viewport = container.viewport();
        let t = &self.tuning;
        let horizontal =
            self.weather.wind() as f32 * t.speed_horizontal.interpolated(strength) / 10_000.0;
        let vertical = t.speed_vertical.interpolated(strength) / 100.0;
        self.target_velocity = Vec3::new(horizontal, vertical, 0.0);
        self.drop_length = t.drop_size.interpolated(strength);
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
        for _ in 0..spawn {
            if !self.spawn_drop() {
                break;
            }
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

        let view = self.viewport;
        if particle.position.y >= view.bottom() as f32 {
            return ParticleUpdate::Release;
        }
        let width = view.width as f32;
        if width > 0.0 {
            let left = view.left() as f32;
            particle.position.x = left + (particle.position.x - left).rem_euclid(width);
        }
        ParticleUpdate::Keep
    }

    fn render_particle(
        &self,
        particle: &Particle,
        g: &mut dyn Graphics,
        _offset_x: i32,
        _offset_y: i32,
    ) {
        if !self.render_rain {
            return;
        }
        let p = particle.position;
        let v = particle.velocity;
        let len = (v.x * v.x + v.y * v.y).sqrt();
        let (nx, ny) = if len > 1e-4 { (v.x / len, v.y / len) } else { (0.0, 1.0) };
        let tail = (p.x - nx * particle.size, p.y - ny * particle.size);
        g.draw_line(tail, (p.x, p.y), 1.0, self.color);
    }

    fn particle_count(&self) -> usize {
        self.counter.count()
    }
}
