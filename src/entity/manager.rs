use std::collections::VecDeque;

use tracing::trace;

use crate::entity::{ComponentSet, Entity, EntityId};

/// Owns every entity, hands out ids and answers filtered queries.
///
/// Slots are indexed by id. The slot vector only ever grows, so its length is the allocation counter: an id
/// is live iff it is below the counter and its slot is occupied. Freed ids are kept sorted ascending and the
/// lowest one is always reused first.
#[derive(Debug, Default)]
pub struct EntityManager {
    entities: Vec<Option<Entity>>,
    free: VecDeque<u32>,
}

/// Index at which `value` is found, or at which it would have to be inserted to keep `sorted` ascending.
fn lower_bound(sorted: &VecDeque<u32>, value: u32) -> usize {
    sorted.partition_point(|&existing| existing < value)
}

impl EntityManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an entity with an empty component store.
    ///
    /// Reuses the lowest freed id if there is one, otherwise extends the slot storage.
    pub fn create(&mut self, kind: impl Into<String>) -> &mut Entity {
        let kind = kind.into();
        let index = match self.free.pop_front() {
            Some(id) => {
                trace!(id, kind = %kind, "Reusing entity slot");
                id as usize
            }
            None => {
                self.entities.push(None);
                trace!(id = self.entities.len() - 1, kind = %kind, "Allocating entity slot");
                self.entities.len() - 1
            }
        };
        let entity = Entity::new(EntityId(index as u32), kind);
        self.entities[index].insert(entity)
    }

    /// Deletes the entity, returning `false` if the slot was already empty (or never allocated).
    pub fn delete(&mut self, id: EntityId) -> bool {
        let Some(slot) = self.entities.get_mut(id.index()) else {
            return false;
        };
        if slot.take().is_none() {
            return false;
        }
        let at = lower_bound(&self.free, id.0);
        self.free.insert(at, id.0);
        trace!(%id, "Deleted entity");
        true
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.index()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Every slot, including empty ones, indexed by id.
    pub fn entities(&self) -> &[Option<Entity>] {
        &self.entities
    }

    /// Iterates over live entities in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().flatten()
    }

    /// Lazily yields the live entities carrying every component in `required`, in ascending id order,
    /// starting strictly after `after` when given.
    pub fn iter_filter(&self, required: ComponentSet, after: Option<EntityId>) -> FilterIter<'_> {
        FilterIter {
            manager: self,
            cursor: FilterCursor::new(required, after),
        }
    }

    /// Number of allocated slots, live or not. Ids below this are "in range".
    pub fn counter(&self) -> usize {
        self.entities.len()
    }

    /// Freed ids awaiting reuse, ascending.
    pub fn free_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.free.iter().map(|&id| EntityId(id))
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.entities.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Explicit state of a filtered scan.
///
/// The cursor does not borrow the manager between steps, so callers may mutate entities (including the one
/// just yielded) between calls to [`FilterCursor::next`]. Deleting entities that the scan has not reached yet
/// simply makes them skipped.
#[derive(Debug, Clone)]
pub struct FilterCursor {
    required: ComponentSet,
    next: usize,
}

impl FilterCursor {
    pub fn new(required: ComponentSet, after: Option<EntityId>) -> Self {
        Self {
            required,
            next: after.map_or(0, |id| id.index() + 1),
        }
    }

    /// Advances to the next qualifying entity. `None` marks exhaustion.
    pub fn next(&mut self, manager: &EntityManager) -> Option<EntityId> {
        while let Some(slot) = manager.entities.get(self.next) {
            self.next += 1;
            match slot {
                Some(entity) if entity.has_all(self.required) => return Some(entity.id()),
                _ => continue,
            }
        }
        None
    }
}

/// Borrowing iterator over a filtered scan. See [`EntityManager::iter_filter`].
pub struct FilterIter<'a> {
    manager: &'a EntityManager,
    cursor: FilterCursor,
}

impl<'a> Iterator for FilterIter<'a> {
    type Item = &'a Entity;

    fn next(&mut self) -> Option<Self::Item> {
        let manager = self.manager;
        self.cursor.next(manager).and_then(|id| manager.get(id))
    }
}
