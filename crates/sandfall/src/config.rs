//! Configuration for the sandbox window

use serde::{Deserialize, Serialize};

use sandfall_core::SimConfig;

/// Window and presentation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Window width in logical pixels
    pub window_width: u32,
    /// Window height in logical pixels
    pub window_height: u32,
    pub title: String,
    /// RGBA colour of occupied cells
    pub sand_color: [u8; 4],
    /// RGBA colour of empty cells
    pub background_color: [u8; 4],
    /// Show the stats overlay
    pub show_hud: bool,
    /// Simulation settings handed to the core
    pub simulation: SimConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let simulation = SimConfig::default();
        Self {
            window_width: simulation.width as u32,
            window_height: simulation.height as u32,
            title: "Sandfall".to_string(),
            sand_color: [0xee, 0xee, 0xee, 0xff],
            background_color: [0x05, 0x05, 0x05, 0xff],
            show_hud: true,
            simulation,
        }
    }
}

impl AppConfig {
    /// Load config with defaults
    pub fn load() -> Self {
        Self::default()
    }
}
