//! UI module for the sandbox window

mod hud;

pub use hud::{show_hud, HudStats};
