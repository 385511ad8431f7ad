use atelier::api::CropRect;
use atelier::modules::crop_editor::{
    confirm_region, drag_region, hit_test, initial_region, overlay_shapes, CropEditor, CropRegion,
    DragSession, Handle, ImageExtent, OverlayShape, MIN_SIZE,
};
use eframe::egui;

const EXTENT: ImageExtent = ImageExtent { width: 1000.0, height: 500.0 };

fn drag(
    mode: Handle,
    initial: CropRegion,
    dx: f32,
    dy: f32,
    extent: ImageExtent,
    ratio: Option<f32>,
) -> CropRegion {
    let session = DragSession { mode, start: egui::pos2(0.0, 0.0), initial };
    drag_region(&session, egui::pos2(dx, dy), extent, ratio)
}

fn inside(region: CropRegion, extent: ImageExtent) -> bool {
    region.x >= 0.0
        && region.y >= 0.0
        && region.right() <= extent.width + 1e-3
        && region.bottom() <= extent.height + 1e-3
}

#[test]
fn free_initialization_is_centered_at_eighty_percent() {
    let region = initial_region(EXTENT, None);
    assert_eq!(region.x, 300.0);
    assert_eq!(region.y, 50.0);
    assert_eq!(region.width, 400.0);
    assert_eq!(region.height, 400.0);
}

#[test]
fn ratio_initialization_matches_image_proportions() {
    let extent = ImageExtent::new(1600.0, 900.0);
    let region = initial_region(extent, Some(16.0 / 9.0));
    assert_eq!(region.width, 1280.0);
    assert_eq!(region.height, 720.0);
    assert_eq!(region.x, 160.0);
    assert_eq!(region.y, 90.0);
}

#[test]
fn se_corner_drag_moves_only_the_trailing_edges() {
    let initial = CropRegion { x: 100.0, y: 100.0, width: 200.0, height: 200.0 };
    let region = drag(Handle::SE, initial, 50.0, 30.0, EXTENT, None);
    assert_eq!(region, CropRegion { x: 100.0, y: 100.0, width: 250.0, height: 230.0 });
}

#[test]
fn confirm_shifts_overflowing_rect_back_with_size_preserved() {
    let region = CropRegion { x: 990.0, y: 10.0, width: 100.0, height: 50.0 };
    let rect = confirm_region(region, EXTENT);
    assert_eq!(rect, CropRect { x: 900, y: 10, width: 100, height: 50 });
}

#[test]
fn initial_region_stays_inside_for_any_finite_extent() {
    for (w, h) in [(30.0, 30.0), (100.0, 4000.0), (4000.0, 100.0), (1.0, 1.0)] {
        let extent = ImageExtent::new(w, h);
        for ratio in [None, Some(1.0), Some(16.0 / 9.0), Some(9.0 / 16.0)] {
            let region = initial_region(extent, ratio);
            assert!(inside(region, extent), "extent {w}x{h} ratio {ratio:?}: {region:?}");
        }
    }
}

#[test]
fn locked_ratio_survives_a_corner_drag_sequence() {
    let ratio = 4.0 / 3.0;
    let mut region = initial_region(EXTENT, Some(ratio));
    for (mode, dx, dy) in [
        (Handle::SE, 60.0, -10.0),
        (Handle::NW, -35.0, 12.0),
        (Handle::NE, 25.0, 40.0),
        (Handle::SW, 40.0, 5.0),
    ] {
        region = drag(mode, region, dx, dy, EXTENT, Some(ratio));
        assert!(
            (region.width / region.height - ratio).abs() < 1e-3,
            "{mode:?} broke the lock: {region:?}"
        );
    }
}

#[test]
fn move_sequence_keeps_region_contained() {
    let mut region = initial_region(EXTENT, None);
    for (dx, dy) in [(500.0, 500.0), (-2000.0, -2000.0), (350.0, 80.0), (9999.0, 0.0)] {
        region = drag(Handle::Move, region, dx, dy, EXTENT, None);
        assert!(inside(region, EXTENT), "after ({dx}, {dy}): {region:?}");
        assert_eq!(region.width, 400.0);
        assert_eq!(region.height, 400.0);
    }
}

#[test]
fn edge_handles_never_invert_under_oversized_deltas() {
    let initial = CropRegion { x: 100.0, y: 100.0, width: 60.0, height: 60.0 };
    for (mode, dx, dy) in [
        (Handle::N, 0.0, 5000.0),
        (Handle::S, 0.0, -5000.0),
        (Handle::E, -5000.0, 0.0),
        (Handle::W, 5000.0, 0.0),
    ] {
        let region = drag(mode, initial, dx, dy, EXTENT, None);
        assert!(region.width >= MIN_SIZE, "{mode:?}: {region:?}");
        assert!(region.height >= MIN_SIZE, "{mode:?}: {region:?}");
        assert!(inside(region, EXTENT), "{mode:?}: {region:?}");
    }
}

#[test]
fn hit_testing_prefers_corners_then_edges_then_body() {
    let region = CropRegion { x: 100.0, y: 100.0, width: 200.0, height: 200.0 };
    assert_eq!(hit_test(egui::pos2(100.0, 100.0), region, None), Some(Handle::NW));
    assert_eq!(hit_test(egui::pos2(300.0, 199.0), region, None), Some(Handle::E));
    assert_eq!(hit_test(egui::pos2(150.0, 150.0), region, None), Some(Handle::Move));
    assert_eq!(hit_test(egui::pos2(10.0, 10.0), region, None), None);
    // With a locked ratio the edge midpoints fall through to the body.
    assert_eq!(hit_test(egui::pos2(200.0, 100.0), region, Some(1.0)), Some(Handle::Move));
}

#[test]
fn overlay_is_pure_and_stable_across_calls() {
    let region = CropRegion { x: 120.0, y: 80.0, width: 300.0, height: 240.0 };
    let canvas = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(1000.0, 500.0));
    let first = overlay_shapes(region, canvas, None);
    let second = overlay_shapes(region, canvas, None);
    assert_eq!(first, second);

    let handles = first
        .iter()
        .filter(|s| matches!(s, OverlayShape::HandleSquare(..)))
        .count();
    assert_eq!(handles, 8);

    let locked = overlay_shapes(region, canvas, Some(1.0));
    let locked_handles = locked
        .iter()
        .filter(|s| matches!(s, OverlayShape::HandleSquare(..)))
        .count();
    assert_eq!(locked_handles, 4);
}

#[test]
fn confirm_neutralizes_pathological_regions() {
    let cases = [
        CropRegion { x: f32::NAN, y: f32::INFINITY, width: f32::NAN, height: -40.0 },
        CropRegion { x: -500.0, y: -500.0, width: 1.0, height: 1.0 },
        CropRegion { x: 5000.0, y: 5000.0, width: 5000.0, height: 5000.0 },
    ];
    for region in cases {
        let rect = confirm_region(region, EXTENT);
        assert!(rect.width >= MIN_SIZE as u32, "{region:?} -> {rect:?}");
        assert!(rect.height >= MIN_SIZE as u32, "{region:?} -> {rect:?}");
        assert!(rect.x + rect.width <= EXTENT.width as u32, "{region:?} -> {rect:?}");
        assert!(rect.y + rect.height <= EXTENT.height as u32, "{region:?} -> {rect:?}");
    }
}

#[test]
fn editor_round_trip_from_init_to_confirm() {
    let mut editor = CropEditor::new(ImageExtent::new(1000.0, 500.0));
    editor.set_ratio(Some(1.0));
    let rect = editor.confirm();
    assert_eq!(rect, CropRect { x: 300, y: 50, width: 400, height: 400 });

    editor.set_ratio(None);
    editor.reset();
    assert_eq!(editor.confirm(), CropRect { x: 300, y: 50, width: 400, height: 400 });
}
