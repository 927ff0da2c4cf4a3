//! The scene: an ordered element set with per-frame snapshots

use crate::effect::{EffectCapability, SceneEffect};
use crate::element::{GameContainer, SceneElement};
use crate::event::{EventPublisher, EventQueue, SceneEvent};
use glimmer_core::Rectangle;
use glimmer_graphics::Graphics;
use parking_lot::Mutex;
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Descending order first, then insertion sequence
type ElementKey = (Reverse<i32>, u64);

type Frame = Arc<Vec<Arc<dyn SceneElement>>>;

#[derive(Default)]
struct ElementSet {
    ordered: BTreeMap<ElementKey, Arc<dyn SceneElement>>,
    keys: HashMap<usize, ElementKey>,
    next_seq: u64,
}

impl ElementSet {
    fn insert(&mut self, element: Arc<dyn SceneElement>) -> bool {
        let id = element_id(&element);
        if self.keys.contains_key(&id) {
            return false;
        }
        let key = (Reverse(element.order()), self.next_seq);
        self.next_seq += 1;
        self.keys.insert(id, key);
        self.ordered.insert(key, element);
        true
    }

    fn remove(&mut self, element: &Arc<dyn SceneElement>) -> Option<Arc<dyn SceneElement>> {
        let key = self.keys.remove(&element_id(element))?;
        self.ordered.remove(&key)
    }
}

/// Elements are identified by the allocation they live in
fn element_id(element: &Arc<dyn SceneElement>) -> usize {
    Arc::as_ptr(element) as *const () as usize
}

/// Ordered collection of scene elements.
///
/// Structural changes may come from any thread. `update` takes a snapshot of
/// the element set at the start of a frame; event dispatch, update and the
/// following `render` all use that snapshot, so changes made during a frame
/// show up in the next one.
pub struct Scene {
    elements: Mutex<ElementSet>,
    frame: Mutex<Frame>,
    events: EventQueue,
    effects: Mutex<Vec<Arc<dyn SceneEffect>>>,
    capabilities: Vec<EffectCapability>,
    viewport: Mutex<Rectangle>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// A scene whose backend supports overlay effects only
    pub fn new() -> Self {
        Self::with_capabilities(&[EffectCapability::Overlay])
    }

    pub fn with_capabilities(capabilities: &[EffectCapability]) -> Self {
        Self {
            elements: Mutex::new(ElementSet::default()),
            frame: Mutex::new(Arc::new(Vec::new())),
            events: EventQueue::new(),
            effects: Mutex::new(Vec::new()),
            capabilities: capabilities.to_vec(),
            viewport: Mutex::new(Rectangle::default()),
        }
    }

    /// Insert an element. Returns `false` if it is already part of the scene.
    pub fn add_element(&self, element: Arc<dyn SceneElement>) -> bool {
        self.elements.lock().insert(element)
    }

    /// Returns `false` if the element was not part of the scene
    pub fn remove_element(&self, element: &Arc<dyn SceneElement>) -> bool {
        self.elements.lock().remove(element).is_some()
    }

    /// Re-sort an element after its `order()` changed
    pub fn update_element_location(&self, element: &Arc<dyn SceneElement>) -> bool {
        let mut set = self.elements.lock();
        match set.remove(element) {
            Some(existing) => set.insert(existing),
            None => false,
        }
    }

    pub fn contains(&self, element: &Arc<dyn SceneElement>) -> bool {
        self.elements.lock().keys.contains_key(&element_id(element))
    }

    pub fn len(&self) -> usize {
        self.elements.lock().ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Queue an event for the next `update`
    pub fn publish_event(&self, event: SceneEvent) {
        self.events.push(event);
    }

    pub fn event_publisher(&self) -> EventPublisher {
        self.events.publisher()
    }

    /// Run one frame: snapshot, dispatch queued events, update every element
    pub fn update(&self, container: &dyn GameContainer, delta: u32) {
        let frame: Frame = {
            let set = self.elements.lock();
            Arc::new(set.ordered.values().cloned().collect())
        };
        *self.frame.lock() = Arc::clone(&frame);
        *self.viewport.lock() = container.viewport();

        for event in self.events.drain() {
            // The element rendered last sits on top and sees events first
            for element in frame.iter().rev() {
                if element.handle_event(container, delta, &event) {
                    break;
                }
            }
        }

        for element in frame.iter() {
            element.update(container, delta);
        }
    }

    /// Render the snapshot taken by the last `update`, then the effects
    pub fn render(&self, g: &mut dyn Graphics, offset_x: i32, offset_y: i32) {
        let frame = Arc::clone(&self.frame.lock());
        for element in frame.iter() {
            element.render(g, offset_x, offset_y);
        }

        let effects = self.effects.lock().clone();
        let viewport = *self.viewport.lock();
        for effect in &effects {
            effect.apply(g, viewport);
        }
    }

    /// Number of elements in the current frame snapshot
    pub fn frame_len(&self) -> usize {
        self.frame.lock().len()
    }

    /// Append an effect. Effects needing an unsupported capability are ignored.
    pub fn add_effect(&self, effect: Arc<dyn SceneEffect>) -> bool {
        if !self.capabilities.contains(&effect.capability()) {
            log::debug!(
                "Ignoring effect '{}': backend lacks {:?}",
                effect.name(),
                effect.capability()
            );
            return false;
        }
        let mut effects = self.effects.lock();
        if effects.iter().any(|e| Arc::ptr_eq(e, &effect)) {
            return false;
        }
        effects.push(effect);
        true
    }

    pub fn remove_effect(&self, effect: &Arc<dyn SceneEffect>) -> bool {
        let mut effects = self.effects.lock();
        let before = effects.len();
        effects.retain(|e| !Arc::ptr_eq(e, effect));
        effects.len() != before
    }

    pub fn clear_effects(&self) {
        self.effects.lock().clear();
    }

    pub fn effect_count(&self) -> usize {
        self.effects.lock().len()
    }
}
