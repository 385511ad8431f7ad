use eframe::egui;
use crate::style::ColorPalette;

use super::ce_geometry::{handle_anchors, valid_ratio, CropRegion, Handle, HANDLE_SIZE};

/// One drawable element of the crop overlay, in image space. Computed as
/// data first so a frame can be described without touching a painter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayShape {
    /// Dimming over the area outside the region.
    Mask(egui::Rect),
    /// The region outline.
    Border(egui::Rect),
    /// Rule-of-thirds guide inside the region.
    GridLine(egui::Pos2, egui::Pos2),
    /// A draggable handle square, centered on its anchor.
    HandleSquare(Handle, egui::Rect),
}

/// Describes the full overlay for one frame. Pure function of the region
/// and ratio; calling it twice with the same inputs yields the same shapes.
pub fn overlay_shapes(region: CropRegion, canvas: egui::Rect, ratio: Option<f32>) -> Vec<OverlayShape> {
    let rect = egui::Rect::from_min_size(
        egui::pos2(region.x, region.y),
        egui::vec2(region.width, region.height),
    );
    let mut shapes: Vec<OverlayShape> = Vec::with_capacity(17);

    if rect.min.y > canvas.min.y {
        shapes.push(OverlayShape::Mask(egui::Rect::from_min_max(canvas.min, egui::pos2(canvas.max.x, rect.min.y))));
    }
    if rect.max.y < canvas.max.y {
        shapes.push(OverlayShape::Mask(egui::Rect::from_min_max(egui::pos2(canvas.min.x, rect.max.y), canvas.max)));
    }
    if rect.min.x > canvas.min.x {
        shapes.push(OverlayShape::Mask(egui::Rect::from_min_max(egui::pos2(canvas.min.x, rect.min.y), egui::pos2(rect.min.x, rect.max.y))));
    }
    if rect.max.x < canvas.max.x {
        shapes.push(OverlayShape::Mask(egui::Rect::from_min_max(egui::pos2(rect.max.x, rect.min.y), egui::pos2(canvas.max.x, rect.max.y))));
    }

    shapes.push(OverlayShape::Border(rect));

    for i in 1..3 {
        let t: f32 = i as f32 / 3.0;
        let gx: f32 = rect.min.x + rect.width() * t;
        let gy: f32 = rect.min.y + rect.height() * t;
        shapes.push(OverlayShape::GridLine(egui::pos2(gx, rect.min.y), egui::pos2(gx, rect.max.y)));
        shapes.push(OverlayShape::GridLine(egui::pos2(rect.min.x, gy), egui::pos2(rect.max.x, gy)));
    }

    let locked: bool = valid_ratio(ratio).is_some();
    for (h, anchor) in handle_anchors(region) {
        if locked && !h.is_corner() { continue; }
        shapes.push(OverlayShape::HandleSquare(
            h,
            egui::Rect::from_center_size(anchor, egui::vec2(HANDLE_SIZE, HANDLE_SIZE)),
        ));
    }

    shapes
}

/// Renders a shape list. `to_screen` maps image space to screen space but
/// deliberately does not scale handle rects, so handles stay a constant
/// on-screen size at any zoom.
pub fn paint(
    painter: &egui::Painter,
    shapes: &[OverlayShape],
    to_screen: impl Fn(egui::Pos2) -> egui::Pos2,
) {
    let mask: egui::Color32 = egui::Color32::from_black_alpha(140);
    for shape in shapes {
        match *shape {
            OverlayShape::Mask(r) => {
                let sr = egui::Rect::from_min_max(to_screen(r.min), to_screen(r.max));
                painter.rect_filled(sr, 0.0, mask);
            }
            OverlayShape::Border(r) => {
                let sr = egui::Rect::from_min_max(to_screen(r.min), to_screen(r.max));
                painter.rect_stroke(sr, 0.0, egui::Stroke::new(2.0, ColorPalette::BLUE_400), egui::StrokeKind::Outside);
            }
            OverlayShape::GridLine(a, b) => {
                painter.line_segment(
                    [to_screen(a), to_screen(b)],
                    egui::Stroke::new(1.0, egui::Color32::from_white_alpha(90)),
                );
            }
            OverlayShape::HandleSquare(_, r) => {
                let sr = egui::Rect::from_center_size(to_screen(r.center()), r.size());
                painter.rect_filled(sr, 2.0, ColorPalette::BLUE_400);
                painter.rect_stroke(sr, 2.0, egui::Stroke::new(1.0, egui::Color32::WHITE), egui::StrokeKind::Outside);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region() -> CropRegion {
        CropRegion { x: 100.0, y: 100.0, width: 300.0, height: 300.0 }
    }

    fn canvas() -> egui::Rect {
        egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(1000.0, 500.0))
    }

    #[test]
    fn shapes_are_deterministic_across_frames() {
        let a = overlay_shapes(region(), canvas(), None);
        let b = overlay_shapes(region(), canvas(), None);
        assert_eq!(a, b);
    }

    #[test]
    fn free_crop_shows_eight_handles_and_four_grid_lines() {
        let shapes = overlay_shapes(region(), canvas(), None);
        let handles = shapes.iter().filter(|s| matches!(s, OverlayShape::HandleSquare(..))).count();
        let grid = shapes.iter().filter(|s| matches!(s, OverlayShape::GridLine(..))).count();
        assert_eq!(handles, 8);
        assert_eq!(grid, 4);
    }

    #[test]
    fn locked_crop_shows_corner_handles_only() {
        let shapes = overlay_shapes(region(), canvas(), Some(1.0));
        let handles: Vec<Handle> = shapes
            .iter()
            .filter_map(|s| match s {
                OverlayShape::HandleSquare(h, _) => Some(*h),
                _ => None,
            })
            .collect();
        assert_eq!(handles.len(), 4);
        assert!(handles.iter().all(|h| h.is_corner()));
    }

    #[test]
    fn full_canvas_region_emits_no_mask() {
        let full = CropRegion { x: 0.0, y: 0.0, width: 1000.0, height: 500.0 };
        let shapes = overlay_shapes(full, canvas(), None);
        assert!(!shapes.iter().any(|s| matches!(s, OverlayShape::Mask(_))));
    }
}
