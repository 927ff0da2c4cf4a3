//! Particle state

use crate::emitter::{EmitterRef, LiveToken, SharedEmitter};
use glimmer_core::{Location, Vec3};

/// A simulated point sprite.
///
/// Position is in map units (or screen pixels for overlay pools). The
/// particle never owns its emitter: the handle is weak and a particle whose
/// emitter is gone gets released on the next pool update.
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub size: f32,
    /// Remaining lifetime in milliseconds; `DYING` means "render once more, then release"
    pub lifetime: i32,
    emitter: Option<EmitterRef>,
    token: Option<LiveToken>,
    pool_location: Option<Location>,
    handoff_pass: u64,
}

impl Particle {
    pub const DYING: i32 = 0;

    pub(crate) fn blank() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            size: 0.0,
            lifetime: 0,
            emitter: None,
            token: None,
            pool_location: None,
            handoff_pass: 0,
        }
    }

    pub fn is_dying(&self) -> bool {
        self.lifetime == Self::DYING
    }

    /// The emitter governing this particle, if it still exists
    pub fn emitter(&self) -> Option<SharedEmitter> {
        self.emitter.as_ref().and_then(|e| e.upgrade())
    }

    /// Location of the tile whose pool holds this particle
    pub fn pool_location(&self) -> Option<Location> {
        self.pool_location
    }

    pub(crate) fn bind(&mut self, emitter: EmitterRef, token: LiveToken) {
        self.emitter = Some(emitter);
        self.token = Some(token);
    }

    pub(crate) fn is_bound(&self) -> bool {
        self.emitter.is_some() && self.token.is_some()
    }

    pub(crate) fn set_pool_location(&mut self, location: Option<Location>) {
        self.pool_location = location;
    }

    /// Record the update pass in which the particle changed pools
    pub(crate) fn mark_handed_off(&mut self, pass: u64) {
        self.handoff_pass = pass;
    }

    pub(crate) fn handed_off_in(&self, pass: u64) -> bool {
        self.handoff_pass == pass
    }

    /// Back to the inactive state. Dropping the token counts the particle
    /// as dead for its emitter.
    pub(crate) fn reset(&mut self) {
        *self = Self::blank();
    }
}
