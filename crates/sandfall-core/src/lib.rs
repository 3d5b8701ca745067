//! Simulation core for Sandfall
//!
//! This crate provides everything behind the window:
//! - Particle store with position, velocity and falling components (`ecs`)
//! - Occupancy and settlement grids (`grid`)
//! - Pointer-driven source and the spawn decision (`source`, `spawn`)
//! - Per-tick physics and pile settlement (`physics`)
//! - Fixed-rate loop and its thread handle (`simulation`)
//! - Double-buffered grid handoff to the renderer (`bridge`)

pub mod bridge;
pub mod config;
pub mod constants;
pub mod ecs;
pub mod error;
pub mod grid;
pub mod physics;
pub mod rng;
pub mod simulation;
pub mod source;
pub mod spawn;
pub mod stats;

pub use bridge::{Frame, FrameStats, Publisher, RedrawSignal, RenderBridge};
pub use config::SimConfig;
pub use ecs::{ComponentSet, Entity, ParticleState, ParticleStore, Position, Velocity};
pub use error::{ConfigError, SimError};
pub use grid::Grid;
pub use physics::{PhysicsStep, StepReport};
pub use simulation::{
    spawn, EventSender, InputForwarder, Simulation, SimulationHandle, TickReport,
};
pub use source::{InputEvent, PointerEvent, PointerKind, Source};
pub use stats::{NoopStats, SimStats, TickCounters};
