//! HUD overlay drawn with egui on top of the fractal.

use egui::{Align2, Frame, Margin, Rounding, Stroke};

use crate::frame::FrameParams;

/// Translucent panel colors
pub mod colors {
    use egui::Color32;

    pub const PANEL_BG: Color32 = Color32::from_rgba_premultiplied(12, 12, 16, 200);
    pub const PANEL_BORDER: Color32 = Color32::from_rgb(70, 70, 80);
    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(225, 225, 230);
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(150, 150, 160);
}

/// Data needed to draw the HUD
pub struct HudData {
    pub params: Option<FrameParams>,
    pub frames: u64,
    pub max_iterations: u32,
}

/// Actions requested through the HUD this frame
#[derive(Default)]
pub struct HudActions {
    pub reset_view: bool,
}

fn panel_frame() -> Frame {
    Frame::none()
        .fill(colors::PANEL_BG)
        .stroke(Stroke::new(1.0, colors::PANEL_BORDER))
        .rounding(Rounding::same(4.0))
        .inner_margin(Margin::same(8.0))
}

pub fn draw_hud(ctx: &egui::Context, data: &HudData, actions: &mut HudActions) {
    egui::Window::new("view")
        .title_bar(false)
        .resizable(false)
        .collapsible(false)
        .anchor(Align2::LEFT_TOP, [8.0, 8.0])
        .frame(panel_frame())
        .show(ctx, |ui| {
            match &data.params {
                Some(params) => {
                    ui.colored_label(
                        colors::TEXT_PRIMARY,
                        format!("center  {:+.12} {:+.12}i", params.origin.x, params.origin.y),
                    );
                    ui.colored_label(colors::TEXT_PRIMARY, format!("zoom    {:.4e}", params.scale));
                    ui.colored_label(
                        colors::TEXT_MUTED,
                        format!("extent  {:.3e} x {:.3e}", params.delta.x * 2.0, params.delta.y * 2.0),
                    );
                }
                None => {
                    ui.colored_label(colors::TEXT_MUTED, "no frame yet");
                }
            }
            ui.colored_label(
                colors::TEXT_MUTED,
                format!("iter {}  frame {}", data.max_iterations, data.frames),
            );
            ui.add_space(4.0);
            if ui.button("Reset view").clicked() {
                actions.reset_view = true;
            }
        });
}
