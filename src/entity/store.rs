use strum::EnumCount;

use crate::entity::component::{Component, ComponentData, ComponentKind, ComponentSet};

/// Per-entity table mapping each [`ComponentKind`] to at most one value.
///
/// Backed by a fixed array indexed by the kind's discriminant, so lookups never hash.
#[derive(Debug, Clone, Default)]
pub struct ComponentStore {
    slots: [Option<Component>; ComponentKind::COUNT],
    kinds: ComponentSet,
}

impl ComponentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the component of `kind`, if present.
    pub fn get(&self, kind: ComponentKind) -> Option<&Component> {
        self.slots[kind.index()].as_ref()
    }

    pub fn get_mut(&mut self, kind: ComponentKind) -> Option<&mut Component> {
        self.slots[kind.index()].as_mut()
    }

    /// Stores `component`, replacing and returning any existing value of the same kind.
    pub fn add(&mut self, component: Component) -> Option<Component> {
        let kind = component.kind();
        self.kinds |= kind.into();
        self.slots[kind.index()].replace(component)
    }

    /// Removes the component of `kind`. A no-op when absent.
    pub fn delete(&mut self, kind: ComponentKind) -> Option<Component> {
        self.kinds.remove(kind.into());
        self.slots[kind.index()].take()
    }

    pub fn has(&self, kind: ComponentKind) -> bool {
        self.kinds.contains(kind.into())
    }

    /// The set of kinds currently stored.
    pub fn kinds(&self) -> ComponentSet {
        self.kinds
    }

    pub fn len(&self) -> usize {
        self.kinds.bits().count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.slots.iter().flatten()
    }

    pub fn get_typed<T: ComponentData>(&self) -> Option<&T> {
        self.get(T::KIND).and_then(T::from_component)
    }

    pub fn get_typed_mut<T: ComponentData>(&mut self) -> Option<&mut T> {
        self.get_mut(T::KIND).and_then(T::from_component_mut)
    }

    pub fn remove_typed<T: ComponentData>(&mut self) -> Option<T> {
        self.delete(T::KIND).and_then(T::from_owned)
    }

    /// Mutably borrows two different components at once.
    ///
    /// Returns `None` if either is missing or if `A` and `B` are the same kind.
    pub fn get_pair_mut<A: ComponentData, B: ComponentData>(&mut self) -> Option<(&mut A, &mut B)> {
        if A::KIND == B::KIND {
            return None;
        }
        let (mut first, mut second) = (None, None);
        for slot in self.slots.iter_mut().flatten() {
            let kind = slot.kind();
            if kind == A::KIND {
                first = A::from_component_mut(slot);
            } else if kind == B::KIND {
                second = B::from_component_mut(slot);
            }
        }
        Some((first?, second?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::component::{Physics, Position};
    use glam::Vec2;

    #[test]
    fn test_add_overwrites_same_kind() {
        let mut store = ComponentStore::new();
        assert!(store.add(Position::new(1, 1).into()).is_none());
        let previous = store.add(Position::new(2, 2).into());

        assert_eq!(previous, Some(Position::new(1, 1).into()));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_typed::<Position>(), Some(&Position::new(2, 2)));
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let mut store = ComponentStore::new();
        assert!(store.delete(ComponentKind::Physics).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_kinds_track_add_and_delete() {
        let mut store = ComponentStore::new();
        store.add(Position::default().into());
        store.add(Physics::default().into());
        assert_eq!(store.kinds(), ComponentSet::POSITION | ComponentSet::PHYSICS);

        store.delete(ComponentKind::Position);
        assert_eq!(store.kinds(), ComponentSet::PHYSICS);
        assert!(!store.has(ComponentKind::Position));
    }

    #[test]
    fn test_pair_mut_borrows_both() {
        let mut store = ComponentStore::new();
        store.add(Position::new(0, 0).into());
        store.add(Physics::with_velocity(Vec2::new(3.0, 0.0)).into());

        let (position, physics) = store.get_pair_mut::<Position, Physics>().unwrap();
        position.pos.x += physics.velocity.x as i32;
        physics.velocity.x = -physics.velocity.x;

        assert_eq!(store.get_typed::<Position>().unwrap().pos.x, 3);
        assert_eq!(store.get_typed::<Physics>().unwrap().velocity.x, -3.0);
    }

    #[test]
    fn test_pair_mut_requires_both_and_distinct() {
        let mut store = ComponentStore::new();
        store.add(Position::default().into());
        assert!(store.get_pair_mut::<Position, Physics>().is_none());
        assert!(store.get_pair_mut::<Position, Position>().is_none());
    }
}
