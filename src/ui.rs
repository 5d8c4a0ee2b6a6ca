use egui::Context;

use crate::controller::{DragState, FrameCommands};

/// Tessellated overlay ready for the egui render pass
pub struct OverlayFrame {
    pub primitives: Vec<egui::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
    pub pixels_per_point: f32,
}

/// Texture updates waiting for a frame that actually reaches the screen.
/// egui sends each image (the font atlas included) only once, so deltas of
/// a skipped frame must be kept until the next drawn one.
#[derive(Default)]
pub struct PendingTextures {
    delta: egui::TexturesDelta,
}

impl PendingTextures {
    pub fn queue(&mut self, delta: egui::TexturesDelta) {
        self.delta.append(delta);
    }

    /// Everything queued so far. Uploads go before the overlay pass, frees after it.
    pub fn take(&mut self) -> egui::TexturesDelta {
        std::mem::take(&mut self.delta)
    }

    pub fn is_empty(&self) -> bool {
        self.delta.is_empty()
    }
}

/// Read-only debug overlay. It is never fed pointer events, so the cube
/// keeps exclusive ownership of the mouse.
pub struct DebugOverlay {
    ctx: Context,
}

impl DebugOverlay {
    pub fn new() -> Self {
        Self { ctx: Context::default() }
    }

    pub fn build(&self, drag: &DragState, frame: &FrameCommands, pixels_per_point: f32) -> OverlayFrame {
        let (width, height) = frame.viewport;

        let mut raw_input = egui::RawInput::default();
        raw_input.time = Some(frame.time / 1000.0);
        raw_input.screen_rect = Some(egui::Rect::from_min_size(
            egui::Pos2::new(0.0, 0.0),
            egui::vec2(
                width as f32 / pixels_per_point,
                height as f32 / pixels_per_point,
            ),
        ));
        self.ctx.set_pixels_per_point(pixels_per_point);

        let full_output = self.ctx.run(raw_input, |ctx| {
            draw_debug_window(ctx, drag, frame.dt);
        });

        let primitives = self.ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        OverlayFrame {
            primitives,
            textures_delta: full_output.textures_delta,
            pixels_per_point: full_output.pixels_per_point,
        }
    }
}

impl Default for DebugOverlay {
    fn default() -> Self {
        Self::new()
    }
}

fn fps_from_dt(dt_ms: f64) -> f64 {
    if dt_ms > 0.0 { 1000.0 / dt_ms } else { 0.0 }
}

fn draw_debug_window(ctx: &Context, drag: &DragState, dt_ms: f64) {
    egui::Window::new("Debug")
        .default_pos([8.0, 8.0])
        .resizable(false)
        .collapsible(false)
        .show(ctx, |ui| {
            ui.label(egui::RichText::new(format!("FPS: {:.0}", fps_from_dt(dt_ms))).small());
            ui.label(
                egui::RichText::new(format!(
                    "Yaw: {:.1} Pitch: {:.1}",
                    drag.theta.to_degrees(),
                    drag.phi.to_degrees()
                ))
                .small(),
            );
            ui.label(
                egui::RichText::new(format!(
                    "Velocity: {:.4}, {:.4}",
                    drag.velocity.0, drag.velocity.1
                ))
                .small(),
            );
            ui.label(
                egui::RichText::new(if drag.dragging { "Dragging" } else { "Idle" }).small(),
            );
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_delta() -> egui::epaint::ImageDelta {
        let image = egui::ColorImage::from_rgba_unmultiplied([1, 1], &[255, 255, 255, 255]);
        egui::epaint::ImageDelta::full(image, egui::TextureOptions::LINEAR)
    }

    #[test]
    fn skipped_frame_keeps_texture_uploads() {
        let font = egui::TextureId::Managed(0);
        let mut pending = PendingTextures::default();

        // first frame carries the font atlas but never reaches the screen
        pending.queue(egui::TexturesDelta { set: vec![(font, image_delta())], free: vec![] });
        // next frame has nothing new
        pending.queue(egui::TexturesDelta::default());

        let delta = pending.take();
        assert_eq!(delta.set.len(), 1);
        assert_eq!(delta.set[0].0, font);
        assert!(pending.is_empty());
    }

    #[test]
    fn queued_frees_are_kept_in_order() {
        let a = egui::TextureId::Managed(1);
        let b = egui::TextureId::Managed(2);
        let mut pending = PendingTextures::default();
        pending.queue(egui::TexturesDelta { set: vec![(a, image_delta())], free: vec![] });
        pending.queue(egui::TexturesDelta { set: vec![(b, image_delta())], free: vec![a] });

        let delta = pending.take();
        let set: Vec<_> = delta.set.iter().map(|(id, _)| *id).collect();
        assert_eq!(set, vec![a, b]);
        assert_eq!(delta.free, vec![a]);
    }

    #[test]
    fn fps_handles_first_frame() {
        assert_eq!(fps_from_dt(0.0), 0.0);
        assert_eq!(fps_from_dt(20.0), 50.0);
    }
}
