use eframe::egui;
use crate::api::CropRect;

pub const MIN_SIZE: f32 = 20.0;
pub const HANDLE_SIZE: f32 = 10.0;

/// Native pixel size of the image being cropped. Fixed for the lifetime of
/// one editing session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageExtent {
    pub width: f32,
    pub height: f32,
}

impl ImageExtent {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// The selected rectangle, in image pixel space (not screen pixels).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl CropRegion {
    pub fn right(&self) -> f32 { self.x + self.width }
    pub fn bottom(&self) -> f32 { self.y + self.height }

    pub fn contains(&self, pos: egui::Pos2) -> bool {
        pos.x >= self.x && pos.x <= self.right() && pos.y >= self.y && pos.y <= self.bottom()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle { Move, N, S, E, W, NE, NW, SE, SW }

impl Handle {
    fn on_north(self) -> bool { matches!(self, Handle::N | Handle::NE | Handle::NW) }
    fn on_west(self) -> bool { matches!(self, Handle::W | Handle::NW | Handle::SW) }
    fn on_east(self) -> bool { matches!(self, Handle::E | Handle::NE | Handle::SE) }

    pub fn is_corner(self) -> bool {
        matches!(self, Handle::NE | Handle::NW | Handle::SE | Handle::SW)
    }

    pub fn cursor_for(h: Handle) -> egui::CursorIcon {
        match h {
            Handle::Move => egui::CursorIcon::Grab,
            Handle::N | Handle::S => egui::CursorIcon::ResizeVertical,
            Handle::E | Handle::W => egui::CursorIcon::ResizeHorizontal,
            Handle::NE | Handle::SW => egui::CursorIcon::ResizeNeSw,
            Handle::NW | Handle::SE => egui::CursorIcon::ResizeNwSe,
        }
    }
}

/// Live drag bookkeeping, created on pointer-down and dropped on pointer-up.
#[derive(Debug, Clone, Copy)]
pub struct DragSession {
    pub mode: Handle,
    pub start: egui::Pos2,
    pub initial: CropRegion,
}

fn sanitize(value: f32, fallback: f32) -> f32 {
    if value.is_finite() { value } else { fallback }
}

/// A locked ratio must be finite and positive; anything else means free crop.
pub fn valid_ratio(ratio: Option<f32>) -> Option<f32> {
    ratio.filter(|r: &f32| r.is_finite() && *r > 0.0)
}

/// Centered starting region at 80% of the constrained extent. A square over
/// the smaller dimension when unconstrained, so it fits either orientation.
pub fn initial_region(extent: ImageExtent, ratio: Option<f32>) -> CropRegion {
    let (raw_w, raw_h) = match valid_ratio(ratio) {
        Some(r) => {
            let image_ratio: f32 = extent.width / extent.height;
            if image_ratio > r {
                let h: f32 = extent.height * 0.8;
                (h * r, h)
            } else {
                let w: f32 = extent.width * 0.8;
                (w, w / r)
            }
        }
        None => {
            let base: f32 = extent.width.min(extent.height) * 0.8;
            (base, base)
        }
    };

    let fallback: f32 = sanitize(extent.width.min(extent.height) * 0.8, MIN_SIZE);
    let width: f32 = sanitize(raw_w, fallback);
    let height: f32 = sanitize(raw_h, fallback);

    CropRegion {
        x: sanitize((extent.width - width) / 2.0, 0.0),
        y: sanitize((extent.height - height) / 2.0, 0.0),
        width,
        height,
    }
}

/// Anchor points for all eight handles, corners first. Edge handles are only
/// part of the active set when no ratio is locked; callers skip them then.
pub fn handle_anchors(region: CropRegion) -> [(Handle, egui::Pos2); 8] {
    let (x, y, w, h) = (region.x, region.y, region.width, region.height);
    [
        (Handle::NW, egui::pos2(x, y)),
        (Handle::NE, egui::pos2(x + w, y)),
        (Handle::SW, egui::pos2(x, y + h)),
        (Handle::SE, egui::pos2(x + w, y + h)),
        (Handle::N, egui::pos2(x + w / 2.0, y)),
        (Handle::S, egui::pos2(x + w / 2.0, y + h)),
        (Handle::E, egui::pos2(x + w, y + h / 2.0)),
        (Handle::W, egui::pos2(x, y + h / 2.0)),
    ]
}

/// Hit-tests a pointer position (image space) against the handle set, then
/// the region body. First containing handle wins; corners are checked before
/// edges so boundary ties resolve the same way every frame.
pub fn hit_test(pos: egui::Pos2, region: CropRegion, ratio: Option<f32>) -> Option<Handle> {
    let locked: bool = valid_ratio(ratio).is_some();
    for (h, anchor) in handle_anchors(region) {
        if locked && !h.is_corner() { continue; }
        let zone = egui::Rect::from_center_size(anchor, egui::vec2(HANDLE_SIZE, HANDLE_SIZE));
        if pos.x >= zone.min.x && pos.x <= zone.max.x && pos.y >= zone.min.y && pos.y <= zone.max.y {
            return Some(h);
        }
    }
    if region.contains(pos) { return Some(Handle::Move); }
    None
}

/// Derives the candidate region for the current pointer position from the
/// drag snapshot. Pure: called on every pointer-move, no allocation.
pub fn drag_region(
    session: &DragSession,
    pointer: egui::Pos2,
    extent: ImageExtent,
    ratio: Option<f32>,
) -> CropRegion {
    let initial: CropRegion = session.initial;
    let dx: f32 = pointer.x - session.start.x;
    let dy: f32 = pointer.y - session.start.y;

    if session.mode == Handle::Move {
        return CropRegion {
            x: (initial.x + dx).min(extent.width - initial.width).max(0.0),
            y: (initial.y + dy).min(extent.height - initial.height).max(0.0),
            ..initial
        };
    }

    let mut next: CropRegion = initial;

    if let Some(r) = valid_ratio(ratio) {
        // Only corner handles resize under a locked ratio; an edge drag
        // would break the ratio, so it leaves the region untouched.
        if !session.mode.is_corner() {
            return initial;
        }
        let new_width: f32 = if session.mode.on_east() {
            (initial.width + dx).max(MIN_SIZE)
        } else {
            (initial.width - dx).max(MIN_SIZE)
        };
        let new_height: f32 = new_width / r;
        if session.mode.on_north() {
            next.y = initial.bottom() - new_height;
        }
        if session.mode.on_west() {
            next.x = initial.right() - new_width;
        }
        next.width = new_width;
        next.height = new_height;
    } else {
        match session.mode {
            Handle::NW => {
                let w: f32 = (initial.width - dx).max(MIN_SIZE);
                let h: f32 = (initial.height - dy).max(MIN_SIZE);
                next.x = (initial.right() - w).max(0.0);
                next.y = (initial.bottom() - h).max(0.0);
                next.width = initial.right() - next.x;
                next.height = initial.bottom() - next.y;
            }
            Handle::NE => {
                let h: f32 = (initial.height - dy).max(MIN_SIZE);
                next.y = (initial.bottom() - h).max(0.0);
                next.width = (initial.width + dx).max(MIN_SIZE);
                next.height = initial.bottom() - next.y;
            }
            Handle::SW => {
                let w: f32 = (initial.width - dx).max(MIN_SIZE);
                next.x = (initial.right() - w).max(0.0);
                next.width = initial.right() - next.x;
                next.height = (initial.height + dy).max(MIN_SIZE);
            }
            Handle::SE => {
                next.width = (initial.width + dx).max(MIN_SIZE);
                next.height = (initial.height + dy).max(MIN_SIZE);
            }
            Handle::N => {
                let h: f32 = (initial.height - dy).max(MIN_SIZE);
                next.y = (initial.bottom() - h).max(0.0);
                next.height = initial.bottom() - next.y;
            }
            Handle::S => {
                next.height = (initial.height + dy).max(MIN_SIZE);
            }
            Handle::E => {
                next.width = (initial.width + dx).max(MIN_SIZE);
            }
            Handle::W => {
                let w: f32 = (initial.width - dx).max(MIN_SIZE);
                next.x = (initial.right() - w).max(0.0);
                next.width = initial.right() - next.x;
            }
            Handle::Move => unreachable!(),
        }
    }

    // Trim the trailing edge so the region never leaves the image. The
    // position is left as-is; growth just stops at the wall.
    if next.x + next.width > extent.width {
        next.width = extent.width - next.x;
    }
    if next.y + next.height > extent.height {
        next.height = extent.height - next.y;
    }

    next
}

/// Final sanitization before handing the rectangle to the backend: guard
/// against non-finite fields, clamp into the image, round last so the
/// clamping math runs on exact values.
pub fn confirm_region(region: CropRegion, extent: ImageExtent) -> CropRect {
    let safe_x: f32 = sanitize(region.x, 0.0);
    let safe_y: f32 = sanitize(region.y, 0.0);
    let safe_w: f32 = sanitize(region.width, MIN_SIZE);
    let safe_h: f32 = sanitize(region.height, MIN_SIZE);

    let width: f32 = safe_w.max(MIN_SIZE).min(extent.width);
    let height: f32 = safe_h.max(MIN_SIZE).min(extent.height);
    let x: f32 = safe_x.min(extent.width - width).max(0.0);
    let y: f32 = safe_y.min(extent.height - height).max(0.0);

    CropRect {
        x: x.round() as u32,
        y: y.round() as u32,
        width: width.round() as u32,
        height: height.round() as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXTENT: ImageExtent = ImageExtent { width: 1000.0, height: 500.0 };

    fn drag(mode: Handle, initial: CropRegion, dx: f32, dy: f32, ratio: Option<f32>) -> CropRegion {
        let session = DragSession { mode, start: egui::pos2(0.0, 0.0), initial };
        drag_region(&session, egui::pos2(dx, dy), EXTENT, ratio)
    }

    #[test]
    fn free_init_is_centered_square_over_smaller_dimension() {
        let r: CropRegion = initial_region(EXTENT, None);
        assert_eq!(r.x, 300.0);
        assert_eq!(r.y, 50.0);
        assert_eq!(r.width, 400.0);
        assert_eq!(r.height, 400.0);
    }

    #[test]
    fn ratio_init_constrains_by_width_when_image_matches_ratio() {
        let extent = ImageExtent::new(1600.0, 900.0);
        let r: CropRegion = initial_region(extent, Some(16.0 / 9.0));
        assert_eq!(r.width, 1280.0);
        assert_eq!(r.height, 720.0);
        assert_eq!(r.x, 160.0);
        assert_eq!(r.y, 90.0);
    }

    #[test]
    fn ratio_init_constrains_by_height_when_image_is_wider() {
        let r: CropRegion = initial_region(EXTENT, Some(1.0));
        assert_eq!(r.height, 400.0);
        assert_eq!(r.width, 400.0);
        assert!((r.x - 300.0).abs() < f32::EPSILON);
    }

    #[test]
    fn init_neutralizes_non_finite_extent() {
        let r: CropRegion = initial_region(ImageExtent::new(f32::NAN, f32::NAN), None);
        assert_eq!(r.width, MIN_SIZE);
        assert_eq!(r.height, MIN_SIZE);
        assert_eq!(r.x, 0.0);
        assert_eq!(r.y, 0.0);
    }

    #[test]
    fn corners_hit_before_edges_and_body_last() {
        let region = CropRegion { x: 100.0, y: 100.0, width: 200.0, height: 200.0 };
        assert_eq!(hit_test(egui::pos2(100.0, 100.0), region, None), Some(Handle::NW));
        assert_eq!(hit_test(egui::pos2(300.0, 300.0), region, None), Some(Handle::SE));
        assert_eq!(hit_test(egui::pos2(200.0, 100.0), region, None), Some(Handle::N));
        assert_eq!(hit_test(egui::pos2(200.0, 200.0), region, None), Some(Handle::Move));
        assert_eq!(hit_test(egui::pos2(50.0, 50.0), region, None), None);
    }

    #[test]
    fn edge_handles_absent_under_locked_ratio() {
        let region = CropRegion { x: 100.0, y: 100.0, width: 200.0, height: 200.0 };
        assert_eq!(hit_test(egui::pos2(200.0, 100.0), region, Some(1.0)), Some(Handle::Move));
        assert_eq!(hit_test(egui::pos2(100.0, 200.0), region, Some(1.0)), Some(Handle::Move));
        assert_eq!(hit_test(egui::pos2(100.0, 100.0), region, Some(1.0)), Some(Handle::NW));
    }

    #[test]
    fn se_drag_grows_both_dimensions() {
        let initial = CropRegion { x: 100.0, y: 100.0, width: 200.0, height: 200.0 };
        let r: CropRegion = drag(Handle::SE, initial, 50.0, 30.0, None);
        assert_eq!(r.x, 100.0);
        assert_eq!(r.y, 100.0);
        assert_eq!(r.width, 250.0);
        assert_eq!(r.height, 230.0);
    }

    #[test]
    fn move_clamps_inside_image() {
        let initial = CropRegion { x: 100.0, y: 100.0, width: 200.0, height: 200.0 };
        let r: CropRegion = drag(Handle::Move, initial, 10_000.0, -10_000.0, None);
        assert_eq!(r.x, 800.0);
        assert_eq!(r.y, 0.0);
        assert_eq!(r.width, 200.0);
        assert_eq!(r.height, 200.0);
    }

    #[test]
    fn locked_corner_drag_preserves_ratio_and_anchors() {
        let ratio: f32 = 16.0 / 9.0;
        let initial = CropRegion { x: 200.0, y: 100.0, width: 320.0, height: 180.0 };
        let r: CropRegion = drag(Handle::NW, initial, -40.0, 0.0, Some(ratio));
        assert!((r.width / r.height - ratio).abs() < 1e-4);
        // Opposite (bottom-right) corner stays fixed.
        assert!((r.right() - initial.right()).abs() < 1e-3);
        assert!((r.bottom() - initial.bottom()).abs() < 1e-3);
    }

    #[test]
    fn locked_edge_drag_is_rejected() {
        let initial = CropRegion { x: 200.0, y: 100.0, width: 320.0, height: 180.0 };
        let r: CropRegion = drag(Handle::E, initial, 80.0, 0.0, Some(16.0 / 9.0));
        assert_eq!(r, initial);
    }

    #[test]
    fn edge_drag_never_inverts_even_for_huge_deltas() {
        let initial = CropRegion { x: 100.0, y: 100.0, width: 60.0, height: 60.0 };
        for (mode, dx, dy) in [
            (Handle::N, 0.0, 5000.0),
            (Handle::S, 0.0, -5000.0),
            (Handle::E, -5000.0, 0.0),
            (Handle::W, 5000.0, 0.0),
        ] {
            let r: CropRegion = drag(mode, initial, dx, dy, None);
            assert!(r.width >= MIN_SIZE, "{mode:?} inverted width: {r:?}");
            assert!(r.height >= MIN_SIZE, "{mode:?} inverted height: {r:?}");
        }
    }

    #[test]
    fn resize_growth_stops_at_the_wall() {
        let initial = CropRegion { x: 800.0, y: 300.0, width: 150.0, height: 150.0 };
        let r: CropRegion = drag(Handle::SE, initial, 500.0, 500.0, None);
        assert_eq!(r.right(), EXTENT.width);
        assert_eq!(r.bottom(), EXTENT.height);
    }

    #[test]
    fn confirm_sanitizes_non_finite_fields() {
        let region = CropRegion { x: -5.0, y: 10.0, width: f32::NAN, height: 50.0 };
        let rect = confirm_region(region, EXTENT);
        assert_eq!(rect.x, 0);
        assert_eq!(rect.width, MIN_SIZE as u32);
        assert!(rect.x + rect.width <= EXTENT.width as u32);
    }

    #[test]
    fn confirm_shifts_rect_back_inside_with_size_preserved() {
        let region = CropRegion { x: 990.0, y: 10.0, width: 100.0, height: 50.0 };
        let rect = confirm_region(region, EXTENT);
        assert_eq!(rect, CropRect { x: 900, y: 10, width: 100, height: 50 });
    }
}
