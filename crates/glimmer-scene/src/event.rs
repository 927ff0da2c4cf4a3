//! Event queue fed from any thread and drained by the update thread

use crossbeam::channel::{self, Receiver, Sender};

/// Input and game events offered to scene elements
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    PointerMoved { x: i32, y: i32 },
    PointerPressed { x: i32, y: i32, button: u8 },
    PointerReleased { x: i32, y: i32, button: u8 },
    KeyPressed(String),
    /// Application specific notification
    Custom(String),
}

/// Unbounded multi-producer queue of scene events
pub struct EventQueue {
    sender: Sender<SceneEvent>,
    receiver: Receiver<SceneEvent>,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventQueue {
    pub fn new() -> Self {
        let (sender, receiver) = channel::unbounded();
        Self { sender, receiver }
    }

    /// Push an event onto the queue
    pub fn push(&self, event: SceneEvent) {
        // Cannot fail: the queue owns the receiving end
        let _ = self.sender.send(event);
    }

    /// A cloneable handle for producers on other threads
    pub fn publisher(&self) -> EventPublisher {
        EventPublisher {
            sender: self.sender.clone(),
        }
    }

    /// Take every event queued so far
    pub fn drain(&self) -> Vec<SceneEvent> {
        self.receiver.try_iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }
}

/// Producer side of an `EventQueue`; never blocks
#[derive(Clone)]
pub struct EventPublisher {
    sender: Sender<SceneEvent>,
}

impl EventPublisher {
    /// Queue an event. Silently dropped if the scene is gone.
    pub fn publish(&self, event: SceneEvent) {
        let _ = self.sender.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_drain() {
        let queue = EventQueue::new();
        assert!(queue.is_empty());

        queue.push(SceneEvent::KeyPressed("space".into()));
        queue.push(SceneEvent::PointerMoved { x: 3, y: 4 });

        assert_eq!(queue.len(), 2);
        let events = queue.drain();
        assert_eq!(events[0], SceneEvent::KeyPressed("space".into()));
        assert!(queue.is_empty());
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_publish_from_threads() {
        let queue = EventQueue::new();
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let publisher = queue.publisher();
                std::thread::spawn(move || {
                    for i in 0..25 {
                        publisher.publish(SceneEvent::PointerMoved { x: t, y: i });
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(queue.drain().len(), 100);
    }
}
