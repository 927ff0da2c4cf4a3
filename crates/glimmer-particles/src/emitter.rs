//! Emitter contract, live-particle accounting and the shared motion rules

use crate::particle::Particle;
use crate::pool::ParticlePool;
use glimmer_core::Vec3;
use glimmer_graphics::Graphics;
use glimmer_scene::{GameContainer, SceneElement};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

/// Velocities are expressed per physics tick of this many milliseconds
pub const TICK_MS: f32 = 50.0;

pub type SharedEmitter = Arc<RwLock<dyn ParticleEmitter>>;

/// Non-owning handle stored in every particle
pub type EmitterRef = Weak<RwLock<dyn ParticleEmitter>>;

/// What a pool should do with a particle after its emitter updated it
pub enum ParticleUpdate {
    Keep,
    /// Return the particle to the recycler
    Release,
    /// Hand the particle to another pool (it crossed into another tile)
    MoveTo(ParticlePool),
}

/// Spawns particles and governs their motion and drawing.
///
/// `update_emitter` runs once per frame with exclusive access. The per-particle
/// calls come from the pools holding the particles and only need shared access.
pub trait ParticleEmitter: Send + Sync {
    fn update_emitter(&mut self, container: &dyn GameContainer, delta: u32);

    fn update_particle(&self, particle: &mut Particle, delta: u32) -> ParticleUpdate;

    fn render_particle(
        &self,
        particle: &Particle,
        g: &mut dyn Graphics,
        offset_x: i32,
        offset_y: i32,
    );

    /// Number of live particles spawned by this emitter
    fn particle_count(&self) -> usize;
}

/// Live-particle count shared between an emitter and its particles
#[derive(Debug, Clone, Default)]
pub struct ParticleCounter {
    live: Arc<AtomicUsize>,
}

impl ParticleCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }

    /// Count one more live particle. The count drops again when the token does.
    pub fn spawned(&self) -> LiveToken {
        self.live.fetch_add(1, Ordering::AcqRel);
        LiveToken {
            live: Arc::clone(&self.live),
        }
    }
}

/// Proof that a particle is counted as live; dropping it counts the death
#[derive(Debug)]
pub struct LiveToken {
    live: Arc<AtomicUsize>,
}

impl Drop for LiveToken {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Move `current` half way toward `target` per tick, scaled by `delta`
pub fn approach_velocity(current: Vec3, target: Vec3, delta: u32) -> Vec3 {
    let blend = (0.5 * delta as f32 / TICK_MS).min(1.0);
    current + (target - current) * blend
}

/// Fraction of a physics tick covered by `delta` milliseconds
pub fn tick_fraction(delta: u32) -> f32 {
    delta as f32 / TICK_MS
}

/// Puts an emitter into a scene so its `update_emitter` runs every frame
pub struct EmitterElement {
    emitter: SharedEmitter,
    order: i32,
}

impl EmitterElement {
    pub fn new(emitter: SharedEmitter, order: i32) -> Self {
        Self { emitter, order }
    }

    pub fn emitter(&self) -> &SharedEmitter {
        &self.emitter
    }
}

impl SceneElement for EmitterElement {
    fn order(&self) -> i32 {
        self.order
    }

    fn update(&self, container: &dyn GameContainer, delta: u32) {
        self.emitter.write().update_emitter(container, delta);
    }

    /// Particles are drawn by the pools holding them
    fn render(&self, _g: &mut dyn Graphics, _offset_x: i32, _offset_y: i32) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_tracks_tokens() {
        let counter = ParticleCounter::new();
        let a = counter.spawned();
        let b = counter.spawned();
        assert_eq!(counter.count(), 2);

        drop(a);
        assert_eq!(counter.count(), 1);
        drop(b);
        assert_eq!(counter.count(), 0);
    }

    #[test]
    fn counter_clones_share_state() {
        let counter = ParticleCounter::new();
        let other = counter.clone();
        let _token = other.spawned();
        assert_eq!(counter.count(), 1);
    }

    #[test]
    fn approach_reaches_half_way_per_tick() {
        let v = approach_velocity(Vec3::ZERO, Vec3::new(2.0, 0.0, -4.0), 50);
        assert_eq!(v, Vec3::new(1.0, 0.0, -2.0));
    }

    #[test]
    fn approach_at_target_is_unchanged() {
        let target = Vec3::new(0.3, -0.3, -0.45);
        for delta in [0, 1, 16, 50, 100, 1000] {
            assert_eq!(approach_velocity(target, target, delta), target);
        }
    }

    #[test]
    fn approach_never_overshoots() {
        let v = approach_velocity(Vec3::ZERO, Vec3::new(1.0, 1.0, 1.0), 10_000);
        assert_eq!(v, Vec3::new(1.0, 1.0, 1.0));
    }
}
