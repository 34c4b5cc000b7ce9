use std::cell::RefCell;
use std::rc::Rc;

use glam::IVec2;
use macaw::config::WorldConfig;
use macaw::entity::{Collision, EntityId, EntityManager, Position};
use macaw::events::{BorderEvent, CollisionEvent, EventBus, Side};
use macaw::systems::CollisionSystem;
use pretty_assertions::assert_eq;
use speculoos::prelude::*;
use strum::IntoEnumIterator;

#[test]
fn test_side_names() {
    let names: Vec<&'static str> = Side::iter().map(Into::into).collect();
    assert_eq!(names, vec!["right", "left", "top", "bottom"]);
}

#[test]
fn test_listener_mutates_manager() {
    let mut manager = EntityManager::new();
    let id = manager.create("thing").add(Position::new(0, 0)).id();

    let mut bus = EventBus::<BorderEvent>::new();
    bus.subscribe(|event, manager| {
        if let Some(position) = manager.get_mut(event.entity).and_then(|e| e.get_mut::<Position>()) {
            position.pos.y += 10;
        }
    });
    assert_eq!(bus.len(), 1);

    bus.notify(&BorderEvent { entity: id, side: Side::Top }, &mut manager);
    bus.notify(&BorderEvent { entity: id, side: Side::Top }, &mut manager);

    assert_eq!(manager.get(id).unwrap().get::<Position>().unwrap().pos, IVec2::new(0, 20));
}

#[test]
fn test_reactions_are_visible_to_later_comparisons() {
    let mut manager = EntityManager::new();
    let [a, b, c] = ["a", "b", "c"].map(|kind| {
        manager
            .create(kind)
            .add(Position::new(50, 50))
            .add(Collision::single(10, 10))
            .id()
    });

    let mut system = CollisionSystem::new(WorldConfig { width: 400, height: 400 });
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    system.on_collision(move |event: &CollisionEvent, manager: &mut EntityManager| {
        sink.borrow_mut().push((event.entity, event.with));
        // Push B out of the way as soon as A reports it
        if event.entity == EntityId(0) && event.with == EntityId(1) {
            if let Some(position) = manager.get_mut(event.with).and_then(|e| e.get_mut::<Position>()) {
                position.pos = IVec2::new(300, 300);
            }
        }
    });

    system.update(&mut manager);

    assert_eq!(*seen.borrow(), vec![(a, b), (b, a), (a, c), (c, a)]);
}

#[test]
fn test_collision_bus_is_independent_of_border_bus() {
    let mut system = CollisionSystem::new(WorldConfig::default());
    system.on_collision(|_, _| {});

    assert_that(&system.collisions.len()).is_equal_to(1);
    assert_that(&system.borders.is_empty()).is_true();
}
