use eframe::egui;
use crate::api::CropRect;
use crate::style::{primary_button, secondary_button, ThemeMode};

use super::ce_geometry::{
    confirm_region, drag_region, hit_test, initial_region, valid_ratio, CropRegion, DragSession,
    Handle, ImageExtent,
};
use super::ce_overlay::{overlay_shapes, OverlayShape};

pub const ASPECT_PRESETS: [(&str, Option<f32>); 6] = [
    ("Free", None),
    ("1:1", Some(1.0)),
    ("16:9", Some(16.0 / 9.0)),
    ("4:3", Some(4.0 / 3.0)),
    ("9:16", Some(9.0 / 16.0)),
    ("3:4", Some(3.0 / 4.0)),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CropOutcome {
    Confirmed(CropRect),
    Cancelled,
}

/// Interactive crop-region editor for one image. Owns the current region
/// and any in-flight drag; all coordinates it works in are image pixels,
/// the caller supplies the screen mapping.
pub struct CropEditor {
    extent: ImageExtent,
    ratio: Option<f32>,
    region: CropRegion,
    drag: Option<DragSession>,
    preset_index: usize,
}

impl CropEditor {
    pub fn new(extent: ImageExtent) -> Self {
        Self {
            extent,
            ratio: None,
            region: initial_region(extent, None),
            drag: None,
            preset_index: 0,
        }
    }

    pub fn region(&self) -> CropRegion { self.region }
    pub fn extent(&self) -> ImageExtent { self.extent }
    pub fn ratio(&self) -> Option<f32> { self.ratio }

    /// Switching the lock resets the selection to a fresh centered region
    /// of the new shape. A region dragged under the old constraint would
    /// rarely satisfy the new one.
    pub fn set_ratio(&mut self, ratio: Option<f32>) {
        self.ratio = valid_ratio(ratio);
        self.region = initial_region(self.extent, self.ratio);
        self.drag = None;
    }

    pub fn reset(&mut self) {
        self.region = initial_region(self.extent, self.ratio);
        self.drag = None;
    }

    /// Snapshot rectangle for the backend, sanitized and clamped.
    pub fn confirm(&self) -> CropRect {
        confirm_region(self.region, self.extent)
    }

    pub fn shapes(&self) -> Vec<OverlayShape> {
        let canvas = egui::Rect::from_min_size(
            egui::pos2(0.0, 0.0),
            egui::vec2(self.extent.width, self.extent.height),
        );
        overlay_shapes(self.region, canvas, self.ratio)
    }

    pub fn cursor_at(&self, image_pos: egui::Pos2) -> Option<egui::CursorIcon> {
        if let Some(drag) = &self.drag {
            return Some(Handle::cursor_for(drag.mode));
        }
        hit_test(image_pos, self.region, self.ratio).map(Handle::cursor_for)
    }

    /// Feeds one frame of pointer input through the drag state machine.
    /// `to_image` converts the response's screen positions into image
    /// pixels. Pointer-down outside every handle and the body is ignored.
    pub fn interact(&mut self, response: &egui::Response, to_image: impl Fn(egui::Pos2) -> egui::Pos2) {
        if response.drag_started_by(egui::PointerButton::Primary) {
            if let Some(pos) = response.interact_pointer_pos() {
                let image_pos: egui::Pos2 = to_image(pos);
                if let Some(mode) = hit_test(image_pos, self.region, self.ratio) {
                    self.drag = Some(DragSession { mode, start: image_pos, initial: self.region });
                }
            }
        } else if response.dragged_by(egui::PointerButton::Primary) {
            if let (Some(session), Some(pos)) = (self.drag, response.interact_pointer_pos()) {
                self.region = drag_region(&session, to_image(pos), self.extent, self.ratio);
            }
        }
        if response.drag_stopped_by(egui::PointerButton::Primary) {
            self.drag = None;
        }
    }

    /// Aspect presets, size readout and the Apply/Cancel pair. Returns the
    /// outcome when one of the terminal buttons is clicked.
    pub fn controls_ui(&mut self, ui: &mut egui::Ui, theme: ThemeMode) -> Option<CropOutcome> {
        let mut outcome: Option<CropOutcome> = None;

        ui.horizontal_wrapped(|ui| {
            ui.label("Aspect:");
            for (i, (label, ratio)) in ASPECT_PRESETS.iter().enumerate() {
                if ui.selectable_label(self.preset_index == i, *label).clicked()
                    && self.preset_index != i
                {
                    self.preset_index = i;
                    self.set_ratio(*ratio);
                }
            }

            ui.separator();
            let r: CropRegion = self.region;
            ui.label(format!("{} × {} px", r.width.round() as u32, r.height.round() as u32));
        });

        ui.add_space(4.0);
        ui.horizontal(|ui| {
            if primary_button(ui, "Apply Crop", theme).clicked() {
                outcome = Some(CropOutcome::Confirmed(self.confirm()));
            }
            if secondary_button(ui, "Cancel", theme).clicked() {
                outcome = Some(CropOutcome::Cancelled);
            }
        });

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::ce_geometry::MIN_SIZE;

    #[test]
    fn new_editor_starts_with_centered_free_region() {
        let editor = CropEditor::new(ImageExtent::new(1000.0, 500.0));
        assert_eq!(editor.ratio(), None);
        let r: CropRegion = editor.region();
        assert_eq!((r.x, r.y, r.width, r.height), (300.0, 50.0, 400.0, 400.0));
    }

    #[test]
    fn set_ratio_reinitializes_region_to_new_shape() {
        let mut editor = CropEditor::new(ImageExtent::new(1600.0, 900.0));
        editor.set_ratio(Some(16.0 / 9.0));
        let r: CropRegion = editor.region();
        assert_eq!((r.width, r.height), (1280.0, 720.0));

        editor.set_ratio(None);
        assert_eq!(editor.region().width, editor.region().height);
    }

    #[test]
    fn invalid_ratio_falls_back_to_free_crop() {
        let mut editor = CropEditor::new(ImageExtent::new(1000.0, 500.0));
        editor.set_ratio(Some(f32::NAN));
        assert_eq!(editor.ratio(), None);
        editor.set_ratio(Some(-2.0));
        assert_eq!(editor.ratio(), None);
    }

    #[test]
    fn confirm_yields_integer_rect_inside_image() {
        let editor = CropEditor::new(ImageExtent::new(1000.0, 500.0));
        let rect: CropRect = editor.confirm();
        assert_eq!(rect, CropRect { x: 300, y: 50, width: 400, height: 400 });
        assert!(rect.width >= MIN_SIZE as u32);
    }
}
