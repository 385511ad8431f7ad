mod ce_geometry;
mod ce_main;
mod ce_overlay;

pub use ce_geometry::{
    confirm_region, drag_region, handle_anchors, hit_test, initial_region, valid_ratio,
    CropRegion, DragSession, Handle, ImageExtent, HANDLE_SIZE, MIN_SIZE,
};
pub use ce_main::{CropEditor, CropOutcome, ASPECT_PRESETS};
pub use ce_overlay::{overlay_shapes, paint, OverlayShape};
