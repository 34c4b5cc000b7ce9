//! Systems query the entity manager for a required component set every frame and act on the matches.
//!
//! Per frame the driver runs, in order: [`physics_system`] and [`CollisionSystem::update`] once per fixed
//! tick, then [`RenderSystem::update`] once.

pub mod collision;
pub mod physics;
pub mod render;

pub use collision::{invert_velocity, reflect_from_border, CollisionSystem};
pub use physics::physics_system;
pub use render::RenderSystem;
