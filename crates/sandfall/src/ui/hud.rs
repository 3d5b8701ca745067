//! HUD overlay

use egui::{Align2, Color32};
use sandfall_core::FrameStats;

/// Stats for the HUD display
pub struct HudStats {
    pub fps: f32,
    pub frame: FrameStats,
    pub max_particles: usize,
}

/// Show the HUD overlay
pub fn show_hud(ctx: &egui::Context, stats: &HudStats) {
    egui::Area::new(egui::Id::new("sandfall_hud"))
        .anchor(Align2::RIGHT_TOP, [-10.0, 10.0])
        .show(ctx, |ui| {
            egui::Frame::new()
                .fill(Color32::from_rgba_unmultiplied(0, 0, 0, 180))
                .inner_margin(8.0)
                .outer_margin(0.0)
                .corner_radius(4.0)
                .show(ui, |ui| {
                    ui.label(format!("FPS: {:.0}", stats.fps));
                    ui.label(format!("Tick: {}", stats.frame.tick));
                    ui.label(format!(
                        "Particles: {} / {}",
                        stats.frame.live, stats.max_particles
                    ));
                    ui.label(format!("Falling: {}", stats.frame.falling));
                    ui.label(format!("Settled: {}", stats.frame.settled));
                    ui.label(format!("Spawned: {}", stats.frame.spawned));
                    if stats.frame.discarded > 0 {
                        ui.label(format!("Discarded: {}", stats.frame.discarded));
                    }
                    if stats.frame.live >= stats.max_particles {
                        ui.colored_label(Color32::YELLOW, "FULL");
                    }
                });
        });
}
