//! # Sandfall
//!
//! Window front-end for the falling-sand simulation. Hold the left mouse
//! button to pour sand, press C to clear, Escape to quit.

pub mod app;
pub mod config;
pub mod render;
pub mod ui;

pub use app::{App, AppEvent};
pub use config::AppConfig;
