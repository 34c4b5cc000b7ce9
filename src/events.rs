//! Synchronous observer bus connecting systems that detect conditions to listeners that react to them.
//!
//! Each event type gets its own [`EventBus`], so a listener can only ever be handed the payload it was
//! written for. Notification runs every listener inline, in registration order, before returning.

use std::fmt;

use strum_macros::{EnumIter, IntoStaticStr};
use tracing::trace;

use crate::entity::{EntityId, EntityManager};

/// A payload that can be broadcast through an [`EventBus`].
pub trait Event: fmt::Debug {
    /// Name used in logs.
    const NAME: &'static str;
}

/// `entity` touched `with`. Collisions are always broadcast in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionEvent {
    pub entity: EntityId,
    pub with: EntityId,
}

impl Event for CollisionEvent {
    const NAME: &'static str = "collision";
}

/// Edge of the world an entity reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Side {
    Right,
    Left,
    Top,
    Bottom,
}

/// `entity` has a collision area touching or beyond the world's `side`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BorderEvent {
    pub entity: EntityId,
    pub side: Side,
}

impl Event for BorderEvent {
    const NAME: &'static str = "border";
}

/// A reaction to an event. Listeners receive the entity manager so they can mutate components in place.
pub type Listener<E> = Box<dyn FnMut(&E, &mut EntityManager)>;

/// Registered listeners for one event type.
pub struct EventBus<E: Event> {
    listeners: Vec<Listener<E>>,
}

impl<E: Event> Default for EventBus<E> {
    fn default() -> Self {
        Self { listeners: Vec::new() }
    }
}

impl<E: Event> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("event", &E::NAME)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<E: Event> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&E, &mut EntityManager) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Runs every listener for `event`, in registration order. Without subscribers this does nothing.
    pub fn notify(&mut self, event: &E, manager: &mut EntityManager) {
        trace!(event = E::NAME, ?event, listeners = self.listeners.len(), "Notifying");
        for listener in &mut self.listeners {
            listener(event, manager);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_notify_without_subscribers() {
        let mut bus = EventBus::<BorderEvent>::new();
        let mut manager = EntityManager::new();
        bus.notify(
            &BorderEvent {
                entity: EntityId(0),
                side: Side::Top,
            },
            &mut manager,
        );
        assert!(bus.is_empty());
    }

    #[test]
    fn test_listeners_run_in_registration_order() {
        let mut bus = EventBus::<CollisionEvent>::new();
        let calls = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            let calls = Rc::clone(&calls);
            bus.subscribe(move |_, _| calls.borrow_mut().push(tag));
        }

        let mut manager = EntityManager::new();
        let event = CollisionEvent {
            entity: EntityId(1),
            with: EntityId(2),
        };
        bus.notify(&event, &mut manager);

        assert_eq!(*calls.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_side_names() {
        let name: &'static str = Side::Bottom.into();
        assert_eq!(name, "bottom");
    }
}
