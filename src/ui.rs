//! egui status overlay.
//!
//! Shows the solver mode and simulated time in the bottom-left corner,
//! styled as flat panels with hard borders and a monospace font.

use egui::epaint::Shadow;
use egui::{Align2, FontFamily, FontId, Frame, Margin, Rounding, Stroke, Style, Visuals};

use crate::dungeon::Dungeon;
use crate::map::Mode;

pub mod colors {
    use egui::Color32;

    pub const PANEL_BG: Color32 = Color32::from_rgba_premultiplied(25, 22, 20, 220);
    pub const PANEL_BORDER: Color32 = Color32::from_rgb(60, 52, 45);
    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(220, 210, 195);
    pub const TEXT_ACCENT: Color32 = Color32::from_rgb(210, 180, 100);
}

/// Snapshot of what the overlay displays.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusData {
    pub mode: Mode,
    pub time: f32,
    pub steps: u64,
    pub paused: bool,
}

impl StatusData {
    pub fn from_dungeon(dungeon: &Dungeon) -> Self {
        let space = dungeon.map().space();
        Self {
            mode: dungeon.mode(),
            time: space.current_time(),
            steps: space.step_count(),
            paused: dungeon.is_paused(),
        }
    }

    pub fn mode_label(&self) -> String {
        format!("Mode: {:?}", self.mode)
    }

    pub fn time_label(&self) -> String {
        format!("Time: {:.2}s ({} steps)", self.time, self.steps)
    }
}

pub fn overlay_style() -> Style {
    let mut visuals = Visuals::dark();
    visuals.window_rounding = Rounding::ZERO;
    visuals.window_shadow = Shadow::NONE;
    visuals.popup_shadow = Shadow::NONE;
    visuals.window_fill = colors::PANEL_BG;
    visuals.window_stroke = Stroke::new(1.0, colors::PANEL_BORDER);
    visuals.override_text_color = Some(colors::TEXT_PRIMARY);

    Style {
        visuals,
        ..Style::default()
    }
}

fn overlay_frame() -> Frame {
    Frame::none()
        .fill(colors::PANEL_BG)
        .stroke(Stroke::new(1.0, colors::PANEL_BORDER))
        .inner_margin(Margin::same(6.0))
}

pub fn draw_status(ctx: &egui::Context, data: &StatusData) {
    let font = FontId::new(14.0, FontFamily::Monospace);

    egui::Area::new(egui::Id::new("status"))
        .anchor(Align2::LEFT_BOTTOM, [10.0, -10.0])
        .interactable(false)
        .show(ctx, |ui| {
            overlay_frame().show(ui, |ui| {
                ui.label(egui::RichText::new(data.mode_label()).font(font.clone()));
                ui.label(egui::RichText::new(data.time_label()).font(font.clone()));
                if data.paused {
                    ui.label(
                        egui::RichText::new("PAUSED  [B]egin  [Space] pause  [R]eset")
                            .font(font.clone())
                            .color(colors::TEXT_ACCENT),
                    );
                }
            });
        });
}
