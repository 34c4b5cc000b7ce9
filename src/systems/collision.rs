use glam::IVec2;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::config::WorldConfig;
use crate::entity::{Collision, ComponentSet, EntityId, EntityManager, FilterCursor, Physics, Position};
use crate::events::{BorderEvent, CollisionEvent, EventBus, Side};
use crate::geometry::Rect;

/// Components an entity needs to take part in collision detection.
pub const COLLIDER: ComponentSet = ComponentSet::POSITION.union(ComponentSet::COLLISION);

type Areas = SmallVec<[Rect; 4]>;

/// Collision areas of an entity in world coordinates, along with its Z-plane.
fn world_areas(manager: &EntityManager, id: EntityId) -> Option<(f32, Areas)> {
    let entity = manager.get(id)?;
    let position = entity.get::<Position>()?;
    let collision = entity.get::<Collision>()?;
    let areas = collision.areas.iter().map(|area| area.offset(position.pos)).collect();
    Some((position.z, areas))
}

/// The first overlapping pair of areas between two bodies, as the overlap rectangle.
fn first_overlap(first: &[Rect], second: &[Rect]) -> Option<Rect> {
    first
        .iter()
        .find_map(|a| second.iter().find_map(|b| a.intersection(b)))
}

/// Overlap between two entities' bodies, ignoring their Z-planes.
pub fn body_overlap(manager: &EntityManager, a: EntityId, b: EntityId) -> Option<Rect> {
    let (_, first) = world_areas(manager, a)?;
    let (_, second) = world_areas(manager, b)?;
    first_overlap(&first, &second)
}

/// Returns `true` if both entities share a Z-plane and any of their areas intersect.
pub fn is_colliding(manager: &EntityManager, a: EntityId, b: EntityId) -> bool {
    let (Some((z1, first)), Some((z2, second))) = (world_areas(manager, a), world_areas(manager, b)) else {
        return false;
    };
    z1 == z2 && first_overlap(&first, &second).is_some()
}

/// World edges touched or crossed by `area`, in right, left, top, bottom order.
fn crossed_sides(area: &Rect, world: &WorldConfig) -> impl Iterator<Item = Side> {
    [
        (area.right() >= world.width as i32, Side::Right),
        (area.x <= 0, Side::Left),
        (area.y <= 0, Side::Top),
        (area.bottom() >= world.height as i32, Side::Bottom),
    ]
    .into_iter()
    .filter_map(|(crossed, side)| crossed.then_some(side))
}

/// Detects entity-vs-border and entity-vs-entity overlap and broadcasts the results.
///
/// Every collider is checked against the world border first, so all border events of a pass precede its
/// pairwise events. Pairs are then compared with a nested scan where the inner cursor starts right after the
/// outer entity, so each unordered pair is tested once per update. The cost is quadratic in the number of
/// colliders.
///
/// Listeners run synchronously while the scan is in progress: a reaction that moves an entity is visible to
/// every later comparison of the same update. Listeners must not delete the entity being reported.
#[derive(Debug)]
pub struct CollisionSystem {
    world: WorldConfig,
    pub collisions: EventBus<CollisionEvent>,
    pub borders: EventBus<BorderEvent>,
}

impl CollisionSystem {
    pub fn new(world: WorldConfig) -> Self {
        Self {
            world,
            collisions: EventBus::new(),
            borders: EventBus::new(),
        }
    }

    pub fn world(&self) -> WorldConfig {
        self.world
    }

    pub fn on_collision(&mut self, listener: impl FnMut(&CollisionEvent, &mut EntityManager) + 'static) {
        self.collisions.subscribe(listener);
    }

    pub fn on_border(&mut self, listener: impl FnMut(&BorderEvent, &mut EntityManager) + 'static) {
        self.borders.subscribe(listener);
    }

    pub fn update(&mut self, manager: &mut EntityManager) {
        let mut borders = FilterCursor::new(COLLIDER, None);
        while let Some(id) = borders.next(manager) {
            self.detect_border(id, manager);
        }

        let mut comparisons = 0usize;
        let mut outer = FilterCursor::new(COLLIDER, None);
        while let Some(id) = outer.next(manager) {
            let mut inner = FilterCursor::new(COLLIDER, Some(id));
            while let Some(other) = inner.next(manager) {
                comparisons += 1;
                if is_colliding(manager, id, other) {
                    trace!(entity = %id, with = %other, "Collision detected");
                    self.collisions.notify(&CollisionEvent { entity: id, with: other }, manager);
                    self.collisions.notify(&CollisionEvent { entity: other, with: id }, manager);
                }
            }
        }
        trace!(comparisons, "Collision pass complete");
    }

    fn detect_border(&mut self, id: EntityId, manager: &mut EntityManager) {
        let Some((_, areas)) = world_areas(manager, id) else {
            return;
        };
        let sides: SmallVec<[Side; 4]> = areas.iter().flat_map(|area| crossed_sides(area, &self.world)).collect();
        for side in sides {
            trace!(entity = %id, ?side, "Border reached");
            self.borders.notify(&BorderEvent { entity: id, side }, manager);
        }
    }
}

/// Offset that moves a body out of an overlap of `amount` pixels, in the direction it now travels.
fn nudge(velocity: f32, amount: i32) -> i32 {
    if velocity > 0.0 {
        amount
    } else if velocity < 0.0 {
        -amount
    } else {
        0
    }
}

/// Bounces `event.entity` off `event.with`.
///
/// A simple elastic heuristic, not a physics solver: the overlap of the first intersecting pair of areas
/// decides the axis. Along the axis with the smaller penetration the velocity and acceleration are
/// reversed and the body is pushed out by the penetration depth; on a tie both axes are. Entities without
/// [`Physics`] (walls, static obstacles) are left alone.
pub fn invert_velocity(event: &CollisionEvent, manager: &mut EntityManager) {
    let Some(overlap) = body_overlap(manager, event.entity, event.with) else {
        return;
    };
    let Some((position, physics)) = manager
        .get_mut(event.entity)
        .and_then(|entity| entity.get_pair_mut::<Position, Physics>())
    else {
        return;
    };
    debug!(entity = %event.entity, with = %event.with, "Inverting velocity");

    let displacement = IVec2::new(overlap.w as i32, overlap.h as i32);
    if displacement.x < displacement.y {
        physics.velocity.x = -physics.velocity.x;
        physics.acceleration.x = -physics.acceleration.x;
        position.pos.x += nudge(physics.velocity.x, displacement.x);

        let mut predicted = physics.predicted.unwrap_or_else(|| position.pos.as_vec2());
        predicted.x = position.pos.x as f32 + physics.velocity.x;
        physics.predicted = Some(predicted);
    } else if displacement.y < displacement.x {
        physics.velocity.y = -physics.velocity.y;
        physics.acceleration.y = -physics.acceleration.y;
        position.pos.y += nudge(physics.velocity.y, displacement.y);

        let mut predicted = physics.predicted.unwrap_or_else(|| position.pos.as_vec2());
        predicted.y = position.pos.y as f32 + physics.velocity.y;
        physics.predicted = Some(predicted);
    } else {
        physics.velocity = -physics.velocity;
        physics.acceleration = -physics.acceleration;
        position.pos.x += nudge(physics.velocity.x, displacement.x);
        position.pos.y += nudge(physics.velocity.y, displacement.y);
        physics.predicted = Some(position.pos.as_vec2() + physics.velocity);
    }
}

/// Turns an entity's velocity back into the world when it reaches a border while moving outwards.
pub fn reflect_from_border(event: &BorderEvent, manager: &mut EntityManager) {
    let Some((position, physics)) = manager
        .get_mut(event.entity)
        .and_then(|entity| entity.get_pair_mut::<Position, Physics>())
    else {
        return;
    };

    let outwards = match event.side {
        Side::Right => physics.velocity.x > 0.0,
        Side::Left => physics.velocity.x < 0.0,
        Side::Top => physics.velocity.y < 0.0,
        Side::Bottom => physics.velocity.y > 0.0,
    };
    if !outwards {
        return;
    }

    debug!(entity = %event.entity, side = ?event.side, "Reflecting from border");
    match event.side {
        Side::Right | Side::Left => {
            physics.velocity.x = -physics.velocity.x;
            physics.acceleration.x = -physics.acceleration.x;
        }
        Side::Top | Side::Bottom => {
            physics.velocity.y = -physics.velocity.y;
            physics.acceleration.y = -physics.acceleration.y;
        }
    }
    physics.predicted = Some(position.pos.as_vec2() + physics.velocity);
}
