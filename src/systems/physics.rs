use tracing::trace;

use crate::entity::{ComponentSet, EntityManager, FilterCursor, Physics, Position};

/// Components an entity needs to be moved by [`physics_system`].
pub const MOVABLE: ComponentSet = ComponentSet::POSITION.union(ComponentSet::PHYSICS);

/// Advances every movable entity by one fixed tick.
///
/// The prediction made on the previous tick becomes the current position, acceleration is applied to the
/// velocity, and the next prediction is computed from the new position. An entity that has no prediction
/// yet only receives its first one, so it starts moving on the following tick.
pub fn physics_system(manager: &mut EntityManager) {
    let mut cursor = FilterCursor::new(MOVABLE, None);
    let mut moved = 0usize;
    while let Some(id) = cursor.next(manager) {
        let Some((position, physics)) = manager
            .get_mut(id)
            .and_then(|entity| entity.get_pair_mut::<Position, Physics>())
        else {
            continue;
        };
        step(position, physics);
        moved += 1;
    }
    trace!(moved, "Physics tick complete");
}

fn step(position: &mut Position, physics: &mut Physics) {
    if let Some(predicted) = physics.predicted {
        position.pos = predicted.round().as_ivec2();
        physics.velocity += physics.acceleration;
    }
    physics.predicted = Some(position.pos.as_vec2() + physics.velocity);
}
