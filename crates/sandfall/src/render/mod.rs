//! Rendering module for the sandbox window

mod renderer;

pub use renderer::{grid_to_rgba, Renderer};
