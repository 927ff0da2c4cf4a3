//! Particle recycling and per-tile particle pools

use crate::emitter::{EmitterRef, ParticleCounter, ParticleUpdate, SharedEmitter};
use crate::particle::Particle;
use glimmer_core::{GlimmerError, Location, Result, Vec3};
use glimmer_graphics::Graphics;
use glimmer_scene::{GameContainer, SceneElement};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Free list of inactive particles shared by every pool and emitter
#[derive(Clone, Default)]
pub struct ParticleRecycler {
    free: Arc<Mutex<Vec<Particle>>>,
    pass: Arc<UpdatePass>,
}

/// Numbers the update passes over the pools sharing a recycler, so a particle
/// handed to another pool is not advanced twice in one frame.
///
/// A new pass starts with the first pool update after any pool rendered, or
/// when a pool is updated again within the current pass.
#[derive(Debug)]
struct UpdatePass {
    current: AtomicU64,
    rendered: AtomicBool,
}

impl Default for UpdatePass {
    fn default() -> Self {
        Self {
            current: AtomicU64::new(1),
            rendered: AtomicBool::new(false),
        }
    }
}

impl UpdatePass {
    /// Pass number for a pool whose previous update ran in pass `last`
    fn begin(&self, last: u64) -> u64 {
        let current = self.current.load(Ordering::Acquire);
        if self.rendered.swap(false, Ordering::AcqRel) || last == current {
            self.current.fetch_add(1, Ordering::AcqRel) + 1
        } else {
            current
        }
    }

    fn rendered(&self) {
        self.rendered.store(true, Ordering::Release);
    }
}

impl ParticleRecycler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take an inactive particle (or a fresh one) and start configuring it
    pub fn request(&self) -> ParticleBuilder {
        let particle = self.free.lock().pop().unwrap_or_else(Particle::blank);
        ParticleBuilder {
            particle: Some(particle),
            recycler: self.clone(),
            position: false,
            velocity: false,
            size: false,
            lifetime: false,
        }
    }

    /// Reset a particle and put it on the free list
    pub fn release(&self, mut particle: Particle) {
        particle.reset();
        self.free.lock().push(particle);
    }

    /// Number of particles waiting for reuse
    pub fn free_count(&self) -> usize {
        self.free.lock().len()
    }
}

/// Configures a requested particle. Every property must be set before
/// `activate`; a builder that is dropped returns its particle to the free list.
pub struct ParticleBuilder {
    particle: Option<Particle>,
    recycler: ParticleRecycler,
    position: bool,
    velocity: bool,
    size: bool,
    lifetime: bool,
}

impl ParticleBuilder {
    pub fn position(mut self, position: Vec3) -> Self {
        if let Some(p) = self.particle.as_mut() {
            p.position = position;
            self.position = true;
        }
        self
    }

    pub fn velocity(mut self, velocity: Vec3) -> Self {
        if let Some(p) = self.particle.as_mut() {
            p.velocity = velocity;
            self.velocity = true;
        }
        self
    }

    pub fn size(mut self, size: f32) -> Self {
        if let Some(p) = self.particle.as_mut() {
            p.size = size;
            self.size = true;
        }
        self
    }

    /// Lifetime in milliseconds
    pub fn lifetime(mut self, lifetime: i32) -> Self {
        if let Some(p) = self.particle.as_mut() {
            p.lifetime = lifetime;
            self.lifetime = true;
        }
        self
    }

    /// Bind the particle to its emitter and count it as live
    pub fn emitter(mut self, emitter: EmitterRef, counter: &ParticleCounter) -> Self {
        if let Some(p) = self.particle.as_mut() {
            p.bind(emitter, counter.spawned());
        }
        self
    }

    /// Finish configuration. On error the particle goes back to the free list.
    pub fn activate(mut self) -> Result<Particle> {
        let missing = if !self.position {
            Some("position")
        } else if !self.velocity {
            Some("velocity")
        } else if !self.size {
            Some("size")
        } else if !self.lifetime {
            Some("lifetime")
        } else if !self.particle.as_ref().is_some_and(Particle::is_bound) {
            Some("emitter")
        } else {
            None
        };

        if let Some(field) = missing {
            // Drop hands the particle back
            return Err(GlimmerError::IncompleteParticle(field));
        }
        self.particle
            .take()
            .ok_or(GlimmerError::IncompleteParticle("particle"))
    }
}

impl Drop for ParticleBuilder {
    fn drop(&mut self) {
        if let Some(particle) = self.particle.take() {
            self.recycler.release(particle);
        }
    }
}

struct PoolShared {
    particles: Mutex<Vec<Particle>>,
    recycler: ParticleRecycler,
    location: Option<Location>,
    order: i32,
    last_pass: AtomicU64,
}

/// Holds the active particles of one tile (or of a screen overlay) and runs
/// them through their emitters each frame.
///
/// Cloning gives another handle to the same pool.
#[derive(Clone)]
pub struct ParticlePool {
    shared: Arc<PoolShared>,
}

impl ParticlePool {
    pub fn new(recycler: ParticleRecycler, location: Option<Location>, order: i32) -> Self {
        Self {
            shared: Arc::new(PoolShared {
                particles: Mutex::new(Vec::new()),
                recycler,
                location,
                order,
                last_pass: AtomicU64::new(0),
            }),
        }
    }

    /// Pool owned by the tile at `location`
    pub fn for_tile(recycler: ParticleRecycler, location: Location) -> Self {
        Self::new(recycler, Some(location), tile_order(&location))
    }

    /// Screen-space pool not bound to any tile
    pub fn overlay(recycler: ParticleRecycler, order: i32) -> Self {
        Self::new(recycler, None, order)
    }

    pub fn location(&self) -> Option<Location> {
        self.shared.location
    }

    pub fn recycler(&self) -> &ParticleRecycler {
        &self.shared.recycler
    }

    /// Take ownership of a particle
    pub fn insert(&self, mut particle: Particle) {
        particle.set_pool_location(self.shared.location);
        self.shared.particles.lock().push(particle);
    }

    pub fn len(&self) -> usize {
        self.shared.particles.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn same_pool(&self, other: &ParticlePool) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Advance every particle by `delta` milliseconds
    pub fn update_particles(&self, delta: u32) {
        self.shared.update_particles(delta);
    }

    pub fn render_particles(&self, g: &mut dyn Graphics, offset_x: i32, offset_y: i32) {
        self.shared.render_particles(g, offset_x, offset_y);
    }

    /// Return every particle to the recycler, e.g. when the tile is unloaded
    pub fn release_all(&self) {
        let particles = std::mem::take(&mut *self.shared.particles.lock());
        for particle in particles {
            self.shared.recycler.release(particle);
        }
    }

    /// The pool as a scene element. Every call yields the same element, so
    /// it can later be removed again.
    pub fn as_element(&self) -> Arc<dyn SceneElement> {
        self.shared.clone()
    }
}

impl PoolShared {
    fn update_particles(&self, delta: u32) {
        let pass = self.recycler.pass.begin(self.last_pass.load(Ordering::Acquire));
        self.last_pass.store(pass, Ordering::Release);

        // Emitters are called without the pool lock held
        let batch = std::mem::take(&mut *self.particles.lock());
        let mut kept = Vec::with_capacity(batch.len());
        let mut moved = Vec::new();

        for mut particle in batch {
            if particle.handed_off_in(pass) {
                // Already advanced by the pool that handed it over
                kept.push(particle);
                continue;
            }
            let Some(emitter) = particle.emitter() else {
                self.recycler.release(particle);
                continue;
            };
            let outcome = emitter.read().update_particle(&mut particle, delta);
            match outcome {
                ParticleUpdate::Keep => kept.push(particle),
                ParticleUpdate::Release => self.recycler.release(particle),
                ParticleUpdate::MoveTo(target) => {
                    if std::ptr::eq(Arc::as_ptr(&target.shared), self) {
                        kept.push(particle);
                    } else {
                        particle.mark_handed_off(pass);
                        moved.push((target, particle));
                    }
                }
            }
        }

        {
            let mut particles = self.particles.lock();
            let inserted = std::mem::replace(&mut *particles, kept);
            particles.extend(inserted);
        }
        for (target, particle) in moved {
            target.insert(particle);
        }
    }

    fn render_particles(&self, g: &mut dyn Graphics, offset_x: i32, offset_y: i32) {
        self.recycler.pass.rendered();

        // Lock order is emitter then pool, the same as an emitter spawning
        let mut emitters: Vec<SharedEmitter> = Vec::new();
        for particle in self.particles.lock().iter() {
            if let Some(emitter) = particle.emitter() {
                if !emitters.iter().any(|e| Arc::ptr_eq(e, &emitter)) {
                    emitters.push(emitter);
                }
            }
        }
        let guards: Vec<_> = emitters.iter().map(|e| (emitter_id(e), e.read())).collect();

        let particles = self.particles.lock();
        for particle in particles.iter() {
            let Some(emitter) = particle.emitter() else {
                continue;
            };
            let id = emitter_id(&emitter);
            // Particles spawned since the emitters were collected wait for the next frame
            if let Some((_, guard)) = guards.iter().find(|(g_id, _)| *g_id == id) {
                guard.render_particle(particle, g, offset_x, offset_y);
            }
        }
    }
}

impl SceneElement for PoolShared {
    fn order(&self) -> i32 {
        self.order
    }

    fn update(&self, _container: &dyn GameContainer, delta: u32) {
        self.update_particles(delta);
    }

    fn render(&self, g: &mut dyn Graphics, offset_x: i32, offset_y: i32) {
        self.render_particles(g, offset_x, offset_y);
    }
}

fn emitter_id(emitter: &SharedEmitter) -> usize {
    Arc::as_ptr(emitter) as *const () as usize
}

/// Scene order of a tile: tiles further back and lower down come first
pub fn tile_order(location: &Location) -> i32 {
    -((location.x + location.y) * 8 + location.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::ParticleEmitter;
    use parking_lot::RwLock;

    /// Keeps particles until their lifetime runs out, or moves them when asked
    struct Countdown {
        counter: ParticleCounter,
        move_to: Option<ParticlePool>,
    }

    impl ParticleEmitter for Countdown {
        fn update_emitter(&mut self, _container: &dyn GameContainer, _delta: u32) {}

        fn update_particle(&self, particle: &mut Particle, delta: u32) -> ParticleUpdate {
            particle.lifetime -= delta as i32;
            if particle.lifetime <= 0 {
                return ParticleUpdate::Release;
            }
            match &self.move_to {
                Some(target) => ParticleUpdate::MoveTo(target.clone()),
                None => ParticleUpdate::Keep,
            }
        }

        fn render_particle(&self, particle: &Particle, g: &mut dyn Graphics, _ox: i32, _oy: i32) {
            let p = particle.position;
            g.draw_line((p.x, p.y), (p.x, p.y + 1.0), 1.0, glimmer_core::Color::WHITE);
        }

        fn particle_count(&self) -> usize {
            self.counter.count()
        }
    }

    fn countdown(move_to: Option<ParticlePool>) -> (SharedEmitter, ParticleCounter) {
        let counter = ParticleCounter::new();
        let emitter: SharedEmitter = Arc::new(RwLock::new(Countdown {
            counter: counter.clone(),
            move_to,
        }));
        (emitter, counter)
    }

    fn spawn(
        recycler: &ParticleRecycler,
        emitter: &SharedEmitter,
        counter: &ParticleCounter,
        lifetime: i32,
    ) -> Particle {
        recycler
            .request()
            .position(Vec3::new(1.0, 2.0, 0.0))
            .velocity(Vec3::ZERO)
            .size(1.0)
            .lifetime(lifetime)
            .emitter(Arc::downgrade(emitter), counter)
            .activate()
            .unwrap()
    }

    #[test]
    fn activate_requires_every_property() {
        let recycler = ParticleRecycler::new();
        let result = recycler.request().position(Vec3::ZERO).size(1.0).lifetime(10).activate();
        assert!(matches!(result, Err(GlimmerError::IncompleteParticle("velocity"))));
        // The half-built particle went back to the free list
        assert_eq!(recycler.free_count(), 1);
    }

    #[test]
    fn activate_requires_an_emitter() {
        let recycler = ParticleRecycler::new();
        let result = recycler
            .request()
            .position(Vec3::ZERO)
            .velocity(Vec3::ZERO)
            .size(1.0)
            .lifetime(10)
            .activate();
        assert!(matches!(result, Err(GlimmerError::IncompleteParticle("emitter"))));
    }

    #[test]
    fn failed_activation_does_not_leak_a_live_count() {
        let recycler = ParticleRecycler::new();
        let (emitter, counter) = countdown(None);
        let result = recycler
            .request()
            .emitter(Arc::downgrade(&emitter), &counter)
            .activate();
        assert!(result.is_err());
        assert_eq!(counter.count(), 0);
    }

    #[test]
    fn released_particles_are_reused() {
        let recycler = ParticleRecycler::new();
        let (emitter, counter) = countdown(None);
        let pool = ParticlePool::for_tile(recycler.clone(), Location::new(0, 0, 0));

        pool.insert(spawn(&recycler, &emitter, &counter, 30));
        assert_eq!(counter.count(), 1);

        pool.update_particles(50);
        assert!(pool.is_empty());
        assert_eq!(recycler.free_count(), 1);
        assert_eq!(counter.count(), 0);

        let again = spawn(&recycler, &emitter, &counter, 30);
        assert_eq!(recycler.free_count(), 0);
        assert_eq!(again.lifetime, 30);
        assert_eq!(counter.count(), 1);
    }

    #[test]
    fn live_count_matches_active_particles() {
        let recycler = ParticleRecycler::new();
        let (emitter, counter) = countdown(None);
        let pool = ParticlePool::overlay(recycler.clone(), 0);

        for lifetime in [40, 90, 140, 190] {
            pool.insert(spawn(&recycler, &emitter, &counter, lifetime));
        }
        for _ in 0..5 {
            assert_eq!(counter.count(), pool.len());
            pool.update_particles(50);
        }
        assert_eq!(counter.count(), 0);
        assert!(pool.is_empty());
    }

    #[test]
    fn particles_of_a_dropped_emitter_are_released() {
        let recycler = ParticleRecycler::new();
        let (emitter, counter) = countdown(None);
        let pool = ParticlePool::overlay(recycler.clone(), 0);
        pool.insert(spawn(&recycler, &emitter, &counter, 1000));

        drop(emitter);
        pool.update_particles(10);
        assert!(pool.is_empty());
        assert_eq!(counter.count(), 0);
    }

    #[test]
    fn moved_particles_change_pools() {
        let recycler = ParticleRecycler::new();
        let target = ParticlePool::for_tile(recycler.clone(), Location::new(4, 4, 1));
        let (emitter, counter) = countdown(Some(target.clone()));
        let source = ParticlePool::for_tile(recycler.clone(), Location::new(3, 4, 1));

        source.insert(spawn(&recycler, &emitter, &counter, 1000));
        source.update_particles(10);

        assert!(source.is_empty());
        assert_eq!(target.len(), 1);
        assert_eq!(counter.count(), 1);
        let moved = target.shared.particles.lock().pop().unwrap();
        assert_eq!(moved.pool_location(), Some(Location::new(4, 4, 1)));
    }

    fn lifetime_in(pool: &ParticlePool) -> i32 {
        pool.shared.particles.lock()[0].lifetime
    }

    #[test]
    fn handed_off_particle_waits_for_the_next_pass() {
        let recycler = ParticleRecycler::new();
        let target = ParticlePool::for_tile(recycler.clone(), Location::new(1, 0, 0));
        let (emitter, counter) = countdown(Some(target.clone()));
        let source = ParticlePool::for_tile(recycler.clone(), Location::new(0, 0, 0));
        source.insert(spawn(&recycler, &emitter, &counter, 1000));

        source.update_particles(50);
        target.update_particles(50);
        assert_eq!(lifetime_in(&target), 950);

        // Updating the source again starts the next pass
        source.update_particles(50);
        target.update_particles(50);
        assert_eq!(lifetime_in(&target), 900);
    }

    #[test]
    fn render_starts_a_new_pass() {
        let recycler = ParticleRecycler::new();
        let target = ParticlePool::for_tile(recycler.clone(), Location::new(1, 0, 0));
        let (emitter, counter) = countdown(Some(target.clone()));
        let source = ParticlePool::for_tile(recycler.clone(), Location::new(0, 0, 0));
        source.insert(spawn(&recycler, &emitter, &counter, 1000));

        source.update_particles(50);
        target.update_particles(50);
        let mut g = glimmer_graphics::RecordingGraphics::new();
        target.render_particles(&mut g, 0, 0);
        assert_eq!(g.line_count(), 1);

        target.update_particles(50);
        assert_eq!(lifetime_in(&target), 900);
    }

    #[test]
    fn moving_into_own_pool_keeps_particle() {
        let recycler = ParticleRecycler::new();
        let pool = ParticlePool::overlay(recycler.clone(), 0);
        let (emitter, counter) = countdown(Some(pool.clone()));
        pool.insert(spawn(&recycler, &emitter, &counter, 1000));

        pool.update_particles(10);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn render_delegates_to_emitter() {
        let recycler = ParticleRecycler::new();
        let (emitter, counter) = countdown(None);
        let pool = ParticlePool::overlay(recycler.clone(), 0);
        pool.insert(spawn(&recycler, &emitter, &counter, 1000));
        pool.insert(spawn(&recycler, &emitter, &counter, 1000));

        let mut g = glimmer_graphics::RecordingGraphics::new();
        pool.render_particles(&mut g, 0, 0);
        assert_eq!(g.line_count(), 2);
    }

    #[test]
    fn release_all_empties_pool() {
        let recycler = ParticleRecycler::new();
        let (emitter, counter) = countdown(None);
        let pool = ParticlePool::overlay(recycler.clone(), 0);
        for _ in 0..3 {
            pool.insert(spawn(&recycler, &emitter, &counter, 1000));
        }
        pool.release_all();
        assert!(pool.is_empty());
        assert_eq!(recycler.free_count(), 3);
        assert_eq!(counter.count(), 0);
    }

    #[test]
    fn free_list_size_is_restored() {
        let recycler = ParticleRecycler::new();
        let (emitter, counter) = countdown(None);
        let pool = ParticlePool::overlay(recycler.clone(), 0);
        for _ in 0..6 {
            recycler.release(Particle::blank());
        }
        let before = recycler.free_count();

        for _ in 0..4 {
            pool.insert(spawn(&recycler, &emitter, &counter, 1000));
        }
        assert_eq!(recycler.free_count(), before - 4);
        pool.release_all();
        assert_eq!(recycler.free_count(), before);
    }

    #[test]
    fn element_identity_is_stable() {
        let pool = ParticlePool::overlay(ParticleRecycler::new(), 3);
        let a = pool.as_element();
        let b = pool.clone().as_element();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.order(), 3);
    }

    #[test]
    fn nearer_tiles_render_later() {
        let back = tile_order(&Location::new(0, 0, 0));
        let front = tile_order(&Location::new(2, 3, 0));
        assert!(back > front);
    }
}
