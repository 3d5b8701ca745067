//! Particle entity/component store
//!
//! Components are a closed set known at compile time, so the store keeps one
//! typed column per component and a per-entity presence mask instead of any
//! dynamic type lookup.

mod components;
mod entity;
mod store;

pub use components::{ComponentSet, ParticleState, Position, Velocity};
pub use entity::Entity;
pub use store::ParticleStore;
