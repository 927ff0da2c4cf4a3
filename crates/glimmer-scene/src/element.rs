//! Scene element trait and the container it is driven with

use crate::event::SceneEvent;
use glimmer_core::Rectangle;
use glimmer_graphics::Graphics;

/// The window or surface the scene runs in
pub trait GameContainer {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Screen rectangle of the visible area
    fn viewport(&self) -> Rectangle {
        Rectangle::new(0, 0, self.width() as i32, self.height() as i32)
    }
}

/// Fixed-size container for headless runs and tests
#[derive(Debug, Clone, Copy)]
pub struct HeadlessContainer {
    pub width: u32,
    pub height: u32,
}

impl HeadlessContainer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl GameContainer for HeadlessContainer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

/// Something the scene updates and renders once per frame.
///
/// Elements are shared between the scene and their owners, so every method
/// takes `&self`. The scene reads `order()` when the element is inserted; a
/// changed order only takes effect after `Scene::update_element_location`.
/// Higher orders are updated and rendered first.
pub trait SceneElement: Send + Sync {
    fn order(&self) -> i32;

    fn update(&self, container: &dyn GameContainer, delta: u32);

    fn render(&self, g: &mut dyn Graphics, offset_x: i32, offset_y: i32);

    /// Offer an event; return `true` to stop it from reaching other elements
    fn handle_event(
        &self,
        _container: &dyn GameContainer,
        _delta: u32,
        _event: &SceneEvent,
    ) -> bool {
        false
    }
}
