use glam::{IVec2, Vec2};
use macaw::entity::{
    Collision, Component, ComponentKind, ComponentSet, EntityId, EntityManager, FilterCursor, Physics, Position, Render,
};
use pretty_assertions::assert_eq;
use speculoos::prelude::*;

fn spawn(manager: &mut EntityManager, count: usize) -> Vec<EntityId> {
    (0..count).map(|_| manager.create("thing").id()).collect()
}

#[test]
fn test_create_assigns_sequential_ids() {
    let mut manager = EntityManager::new();
    let ids = spawn(&mut manager, 4);

    assert_eq!(ids, vec![EntityId(0), EntityId(1), EntityId(2), EntityId(3)]);
    assert_eq!(manager.counter(), 4);
    assert_eq!(manager.len(), 4);
}

#[test]
fn test_new_entity_is_empty() {
    let mut manager = EntityManager::new();
    let entity = manager.create("ghost");

    assert_eq!(entity.kind(), "ghost");
    assert_that(&entity.components().is_empty()).is_true();
    assert_eq!(entity.components().kinds(), ComponentSet::empty());
}

#[test]
fn test_lowest_free_id_is_reused_first() {
    let mut manager = EntityManager::new();
    spawn(&mut manager, 10);

    for id in [5, 2, 8] {
        assert_that(&manager.delete(EntityId(id))).is_true();
    }
    assert_eq!(
        manager.free_ids().collect::<Vec<_>>(),
        vec![EntityId(2), EntityId(5), EntityId(8)]
    );

    let reused: Vec<EntityId> = spawn(&mut manager, 3);
    assert_eq!(reused, vec![EntityId(2), EntityId(5), EntityId(8)]);
    assert_eq!(manager.counter(), 10);
}

#[test]
fn test_create_extends_once_free_list_is_exhausted() {
    let mut manager = EntityManager::new();
    spawn(&mut manager, 3);
    manager.delete(EntityId(1));

    assert_eq!(manager.create("a").id(), EntityId(1));
    assert_eq!(manager.create("b").id(), EntityId(3));
    assert_eq!(manager.counter(), 4);
}

#[test]
fn test_reused_slot_starts_fresh() {
    let mut manager = EntityManager::new();
    manager.create("old").add(Position::new(1, 2)).add(Collision::single(4, 4));
    manager.delete(EntityId(0));

    let entity = manager.create("new");
    assert_eq!(entity.id(), EntityId(0));
    assert_eq!(entity.kind(), "new");
    assert_that(&entity.has(ComponentKind::Position)).is_false();
}

#[test]
fn test_delete_twice_or_out_of_range() {
    let mut manager = EntityManager::new();
    spawn(&mut manager, 2);

    assert_that(&manager.delete(EntityId(1))).is_true();
    assert_that(&manager.delete(EntityId(1))).is_false();
    assert_that(&manager.delete(EntityId(42))).is_false();
    assert_eq!(manager.free_ids().count(), 1);
    assert_that(&manager.get(EntityId(1))).is_none();
}

#[test]
fn test_component_replace_and_delete() {
    let mut manager = EntityManager::new();
    let entity = manager.create("thing");
    entity.add(Position::new(1, 1));
    let previous = entity.components_mut().add(Component::Position(Position::new(5, 5)));

    assert_eq!(previous, Some(Component::Position(Position::new(1, 1))));
    assert_eq!(entity.get::<Position>(), Some(&Position::new(5, 5)));
    assert_eq!(entity.components().len(), 1);

    assert_that(&entity.delete(ComponentKind::Position)).is_some();
    assert_that(&entity.delete(ComponentKind::Position)).is_none();
    assert_that(&entity.components().is_empty()).is_true();
}

#[test]
fn test_get_pair_mut_mutates_both() {
    let mut manager = EntityManager::new();
    let id = manager
        .create("ball")
        .add(Position::new(0, 0))
        .add(Physics::with_velocity(Vec2::new(1.0, 0.0)))
        .id();

    let entity = manager.get_mut(id).unwrap();
    let (position, physics) = entity.get_pair_mut::<Position, Physics>().unwrap();
    position.pos = IVec2::new(3, 3);
    physics.velocity.x = -1.0;

    assert_eq!(entity.get::<Position>().unwrap().pos, IVec2::new(3, 3));
    assert_eq!(entity.get::<Physics>().unwrap().velocity, Vec2::new(-1.0, 0.0));
    assert_that(&entity.get_pair_mut::<Position, Position>()).is_none();
    assert_that(&entity.get_pair_mut::<Position, Render>()).is_none();
}

#[test]
fn test_filter_yields_exactly_matching_entities_ascending() {
    let mut manager = EntityManager::new();
    let mut expected = Vec::new();
    for i in 0..20 {
        let entity = manager.create("thing").add(Position::new(i, 0));
        if i % 3 == 0 {
            entity.add(Collision::single(1, 1));
            expected.push(entity.id());
        }
    }
    // A deleted match must not show up
    manager.delete(EntityId(9));
    expected.retain(|id| *id != EntityId(9));

    let required = ComponentSet::POSITION | ComponentSet::COLLISION;
    let found: Vec<EntityId> = manager.iter_filter(required, None).map(|entity| entity.id()).collect();
    assert_eq!(found, expected);

    let after: Vec<EntityId> = manager
        .iter_filter(required, Some(EntityId(6)))
        .map(|entity| entity.id())
        .collect();
    assert_eq!(after, vec![EntityId(12), EntityId(15), EntityId(18)]);
}

#[test]
fn test_empty_filter_matches_every_live_entity() {
    let mut manager = EntityManager::new();
    spawn(&mut manager, 5);
    manager.delete(EntityId(3));

    assert_eq!(manager.iter_filter(ComponentSet::empty(), None).count(), 4);
    assert_eq!(manager.iter().count(), 4);
}

#[test]
fn test_filter_on_empty_manager() {
    let manager = EntityManager::new();
    assert_that(&manager.iter_filter(ComponentSet::POSITION, None).next()).is_none();
    assert_that(&manager.is_empty()).is_true();
}

#[test]
fn test_nested_cursors_visit_each_pair_once() {
    let mut manager = EntityManager::new();
    let count = 7;
    for i in 0..count {
        manager.create("body").add(Position::new(i, 0)).add(Collision::single(1, 1));
    }
    // Noise that does not qualify
    manager.create("marker").add(Position::new(0, 0));

    let required = ComponentSet::POSITION | ComponentSet::COLLISION;
    let mut pairs = Vec::new();
    let mut outer = FilterCursor::new(required, None);
    while let Some(a) = outer.next(&manager) {
        let mut inner = FilterCursor::new(required, Some(a));
        while let Some(b) = inner.next(&manager) {
            pairs.push((a, b));
        }
    }

    assert_eq!(pairs.len(), (count * (count - 1) / 2) as usize);
    assert_that(&pairs.iter().all(|(a, b)| a.0 < b.0)).is_true();
}

#[test]
fn test_cursor_allows_mutation_between_steps() {
    let mut manager = EntityManager::new();
    for _ in 0..4 {
        manager.create("thing").add(Position::new(0, 0));
    }

    let mut cursor = FilterCursor::new(ComponentSet::POSITION, None);
    let mut visited = Vec::new();
    while let Some(id) = cursor.next(&manager) {
        visited.push(id);
        if id == EntityId(0) {
            manager.delete(EntityId(2));
        }
        if let Some(position) = manager.get_mut(id).and_then(|entity| entity.get_mut::<Position>()) {
            position.pos.x += 1;
        }
    }

    assert_eq!(visited, vec![EntityId(0), EntityId(1), EntityId(3)]);
    assert_that(&manager.iter().all(|entity| entity.get::<Position>().unwrap().pos.x == 1)).is_true();
}
