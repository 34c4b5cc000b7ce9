//! Entities, their component stores, and the manager that owns them.

use std::fmt;

pub mod component;
pub mod manager;
pub mod store;

pub use component::{
    Animation, Camera, Collision, Component, ComponentData, ComponentKind, ComponentSet, Font, Grid, Physics, Position,
    Rectangle, Render, RenderKind,
};
pub use manager::{EntityManager, FilterCursor, FilterIter};
pub use store::ComponentStore;

/// Identifier of an entity slot. Ids are reused after deletion, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub u32);

impl EntityId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A simulation object: an id, a free-form type label and its components.
///
/// Entities are owned by the [`EntityManager`]; everything else refers to them by [`EntityId`].
#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    kind: String,
    components: ComponentStore,
}

impl Entity {
    pub(crate) fn new(id: EntityId, kind: String) -> Self {
        Self {
            id,
            kind,
            components: ComponentStore::new(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    /// The type label given at creation, e.g. `"ball"`.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn components(&self) -> &ComponentStore {
        &self.components
    }

    pub fn components_mut(&mut self) -> &mut ComponentStore {
        &mut self.components
    }

    /// Adds or replaces a component. Chainable for building entities.
    pub fn add(&mut self, component: impl Into<Component>) -> &mut Self {
        self.components.add(component.into());
        self
    }

    pub fn delete(&mut self, kind: ComponentKind) -> Option<Component> {
        self.components.delete(kind)
    }

    pub fn has(&self, kind: ComponentKind) -> bool {
        self.components.has(kind)
    }

    pub fn has_all(&self, required: ComponentSet) -> bool {
        self.components.kinds().contains(required)
    }

    pub fn get<T: ComponentData>(&self) -> Option<&T> {
        self.components.get_typed()
    }

    pub fn get_mut<T: ComponentData>(&mut self) -> Option<&mut T> {
        self.components.get_typed_mut()
    }

    pub fn remove<T: ComponentData>(&mut self) -> Option<T> {
        self.components.remove_typed()
    }

    pub fn get_pair_mut<A: ComponentData, B: ComponentData>(&mut self) -> Option<(&mut A, &mut B)> {
        self.components.get_pair_mut()
    }
}
