use eframe::egui;
use anyhow::Context as _;
use chrono::Utc;
use std::fs;
use std::path::PathBuf;

use crate::api::{
    ApiRequest, CropPreset, Dimensions, FilterKind, FlipAxis, ProcessOp,
};
use crate::modules::crop_editor::{CropEditor, ImageExtent};
use crate::modules::{EditorModule, MenuAction, MenuContribution, MenuItem};

/// Which property panel is open below the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ToolPanel {
    None,
    Resize,
    Rotate,
    Flip,
    Grayscale,
    Brightness,
    Contrast,
    Filter,
    Download,
}

#[derive(Debug, Clone)]
pub(super) struct ResizeInputs {
    pub width_px: u32,
    pub height_px: u32,
    pub percentage: f32,
    pub use_percentage: bool,
    pub maintain_aspect_ratio: bool,
}

pub(super) const DOWNLOAD_FORMATS: [&str; 4] = ["original", "jpeg", "png", "webp"];

/// The editing workspace for one uploaded image. Pixel work happens on the
/// backend; this module prepares the requests, keeps the session metadata
/// current, and previews the image it was created from.
pub struct SessionEditor {
    pub(super) path: PathBuf,
    pub(super) filename: String,
    pub(super) session_id: String,
    pub(super) extension: String,
    pub(super) format: String,
    pub(super) size_bytes: u64,
    pub(super) dimensions: Dimensions,
    pub(super) base_url: String,

    rgba: image::RgbaImage,
    pub(super) texture: Option<egui::TextureId>,

    pub(super) panel: ToolPanel,
    pub(super) crop: Option<CropEditor>,
    pub(super) requests: Vec<ApiRequest>,
    pub(super) undo_depth: usize,
    pub(super) redo_depth: usize,

    pub(super) resize: ResizeInputs,
    pub(super) rotate_angle: f32,
    pub(super) flip_axis: FlipAxis,
    pub(super) grayscale_intensity: u8,
    pub(super) brightness_level: i32,
    pub(super) contrast_level: i32,
    pub(super) filter_kind: FilterKind,
    pub(super) filter_intensity: u8,
    pub(super) download_format: &'static str,
    pub(super) download_filename: String,
}

impl SessionEditor {
    /// Opens a local file as a new backend session: decodes it for the
    /// preview texture, records the upload request, and seeds the metadata
    /// the backend would echo back.
    pub fn open(path: PathBuf, base_url: String) -> anyhow::Result<Self> {
        let filename: String = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "untitled".to_string());
        let extension: String = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_else(|| "png".to_string());

        let size_bytes: u64 = fs::metadata(&path)
            .with_context(|| format!("reading metadata for {}", path.display()))?
            .len();
        let decoded = image::open(&path)
            .with_context(|| format!("decoding {}", path.display()))?;
        let rgba: image::RgbaImage = decoded.to_rgba8();
        let dimensions = Dimensions { width: rgba.width(), height: rgba.height() };

        let session_id: String = format!("sess-{}", Utc::now().timestamp_millis());
        let upload: ApiRequest = ApiRequest::upload(&base_url, &filename);
        log::info!("session {}: {} {} ({}x{})", session_id, upload.method, upload.url, dimensions.width, dimensions.height);

        let format: String = match extension.as_str() {
            "jpg" | "jpeg" => "JPEG".to_string(),
            other => other.to_ascii_uppercase(),
        };

        Ok(Self {
            path,
            filename: filename.clone(),
            session_id,
            extension,
            format,
            size_bytes,
            dimensions,
            base_url,
            rgba,
            texture: None,
            panel: ToolPanel::None,
            crop: None,
            requests: vec![upload],
            undo_depth: 0,
            redo_depth: 0,
            resize: ResizeInputs {
                width_px: dimensions.width,
                height_px: dimensions.height,
                percentage: 100.0,
                use_percentage: false,
                maintain_aspect_ratio: true,
            },
            rotate_angle: 90.0,
            flip_axis: FlipAxis::Horizontal,
            grayscale_intensity: 100,
            brightness_level: 0,
            contrast_level: 0,
            filter_kind: FilterKind::Blur,
            filter_intensity: 50,
            download_format: DOWNLOAD_FORMATS[0],
            download_filename: filename,
        })
    }

    pub fn extent(&self) -> ImageExtent {
        ImageExtent::new(self.dimensions.width as f32, self.dimensions.height as f32)
    }

    pub fn can_undo(&self) -> bool { self.undo_depth > 0 }
    pub fn can_redo(&self) -> bool { self.redo_depth > 0 }

    pub fn requests(&self) -> &[ApiRequest] { &self.requests }

    /// Prepares and records one processing request, then updates the local
    /// metadata the way the backend's response would.
    pub(super) fn apply(&mut self, op: ProcessOp) {
        let request: ApiRequest = ApiRequest::process(&self.base_url, &self.session_id, &self.extension, &op);
        log::info!("session {}: {} {}", self.session_id, request.method, request.url);

        match &op {
            ProcessOp::Undo => {
                if self.undo_depth > 0 {
                    self.undo_depth -= 1;
                    self.redo_depth += 1;
                }
            }
            ProcessOp::Redo => {
                if self.redo_depth > 0 {
                    self.redo_depth -= 1;
                    self.undo_depth += 1;
                }
            }
            other => {
                self.dimensions = predicted_dimensions(other, self.dimensions);
                self.undo_depth += 1;
                self.redo_depth = 0;
            }
        }

        self.requests.push(request);
    }

    pub(super) fn show_panel(&mut self, panel: ToolPanel) {
        self.crop = None;
        self.panel = panel;
    }

    pub(super) fn start_crop(&mut self) {
        if self.crop.is_none() {
            self.crop = Some(CropEditor::new(self.extent()));
        }
        self.panel = ToolPanel::None;
    }

    pub(super) fn cancel_crop(&mut self) {
        self.crop = None;
    }

    pub(super) fn confirm_crop(&mut self) {
        if let Some(editor) = self.crop.take() {
            self.apply(ProcessOp::CropCustom(editor.confirm()));
        }
    }

    pub(super) fn apply_crop_preset(&mut self, preset: CropPreset) {
        self.crop = None;
        self.apply(ProcessOp::CropPreset { preset });
    }

    pub(super) fn ensure_texture(&mut self, ctx: &egui::Context) {
        if self.texture.is_some() {
            return;
        }
        let (w, h) = (self.rgba.width() as usize, self.rgba.height() as usize);
        let color_image: egui::ColorImage = egui::ColorImage {
            size: [w, h],
            source_size: egui::vec2(w as f32, h as f32),
            pixels: self
                .rgba
                .pixels()
                .map(|p| egui::Color32::from_rgba_unmultiplied(p.0[0], p.0[1], p.0[2], p.0[3]))
                .collect(),
        };
        self.texture = Some(ctx.tex_manager().write().alloc(
            "session_editor_preview".into(),
            color_image.into(),
            egui::TextureOptions::default(),
        ));
    }

    pub(super) fn human_size(&self) -> String {
        format_bytes(self.size_bytes)
    }
}

/// Local estimate of the dimensions the backend will report back, so the
/// metadata panel stays current without a round trip.
pub(super) fn predicted_dimensions(op: &ProcessOp, current: Dimensions) -> Dimensions {
    match op {
        ProcessOp::Resize { width_px, height_px, percentage, maintain_aspect_ratio } => {
            if let Some(pct) = percentage {
                let scale: f32 = pct / 100.0;
                return Dimensions {
                    width: ((current.width as f32 * scale).round() as u32).max(1),
                    height: ((current.height as f32 * scale).round() as u32).max(1),
                };
            }
            match (width_px, height_px) {
                (Some(w), Some(h)) if !maintain_aspect_ratio => Dimensions { width: *w, height: *h },
                (Some(w), _) if *maintain_aspect_ratio => {
                    let ratio: f32 = current.height as f32 / current.width as f32;
                    Dimensions { width: *w, height: ((*w as f32 * ratio).round() as u32).max(1) }
                }
                (_, Some(h)) if *maintain_aspect_ratio => {
                    let ratio: f32 = current.width as f32 / current.height as f32;
                    Dimensions { width: ((*h as f32 * ratio).round() as u32).max(1), height: *h }
                }
                (Some(w), None) => Dimensions { width: *w, height: current.height },
                (None, Some(h)) => Dimensions { width: current.width, height: *h },
                _ => current,
            }
        }
        ProcessOp::Rotate { angle } => {
            // Quarter turns swap the axes; anything else expands the canvas
            // on the backend, which we cannot predict exactly.
            let quarter: bool = (angle.rem_euclid(180.0) - 90.0).abs() < f32::EPSILON;
            if quarter {
                Dimensions { width: current.height, height: current.width }
            } else {
                current
            }
        }
        ProcessOp::CropCustom(rect) => Dimensions { width: rect.width, height: rect.height },
        ProcessOp::CropPreset { preset } => {
            let (w, h) = (current.width as f32, current.height as f32);
            let target: f32 = match preset {
                CropPreset::Square => 1.0,
                CropPreset::Wide16x9 => 16.0 / 9.0,
                CropPreset::Portrait4x6 => 4.0 / 6.0,
                CropPreset::A4 => 210.0 / 297.0,
            };
            if w / h > target {
                Dimensions { width: (h * target).round() as u32, height: current.height }
            } else {
                Dimensions { width: current.width, height: (w / target).round() as u32 }
            }
        }
        _ => current,
    }
}

pub(super) fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value: f64 = bytes as f64;
    let mut unit: usize = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

impl EditorModule for SessionEditor {
    fn ui(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        self.ensure_texture(ctx);
        self.render_workspace(ui, ctx);
    }

    fn get_title(&self) -> String {
        format!("{} — {}", self.filename, self.session_id)
    }

    fn get_menu_contributions(&self) -> MenuContribution {
        MenuContribution {
            file_items: vec![
                (MenuItem::new("Download..."), MenuAction::Download),
                (MenuItem::new("Close Session"), MenuAction::CloseSession),
            ],
            edit_items: vec![
                (
                    MenuItem::new("Undo").with_shortcut("Ctrl+Z").enabled(self.can_undo()),
                    MenuAction::Undo,
                ),
                (
                    MenuItem::new("Redo").with_shortcut("Ctrl+Y").enabled(self.can_redo()),
                    MenuAction::Redo,
                ),
            ],
            image_items: vec![
                (MenuItem::new("Resize..."), MenuAction::ShowResize),
                (MenuItem::new("Rotate..."), MenuAction::ShowRotate),
                (MenuItem::new("Flip..."), MenuAction::ShowFlip),
                (
                    MenuItem::new("Crop...").enabled(self.crop.is_none()),
                    MenuAction::StartCrop,
                ),
            ],
            filter_items: vec![
                (MenuItem::new("Grayscale..."), MenuAction::ShowGrayscale),
                (MenuItem::new("Brightness..."), MenuAction::ShowBrightness),
                (MenuItem::new("Contrast..."), MenuAction::ShowContrast),
                (MenuItem::new("Blur / Sharpen..."), MenuAction::ShowFilter),
            ],
        }
    }

    fn handle_menu_action(&mut self, action: MenuAction) {
        match action {
            MenuAction::Undo => {
                if self.can_undo() {
                    self.apply(ProcessOp::Undo);
                }
            }
            MenuAction::Redo => {
                if self.can_redo() {
                    self.apply(ProcessOp::Redo);
                }
            }
            MenuAction::StartCrop => self.start_crop(),
            MenuAction::ConfirmCrop => self.confirm_crop(),
            MenuAction::CancelCrop => self.cancel_crop(),
            MenuAction::ShowResize => self.show_panel(ToolPanel::Resize),
            MenuAction::ShowRotate => self.show_panel(ToolPanel::Rotate),
            MenuAction::ShowFlip => self.show_panel(ToolPanel::Flip),
            MenuAction::ShowGrayscale => self.show_panel(ToolPanel::Grayscale),
            MenuAction::ShowBrightness => self.show_panel(ToolPanel::Brightness),
            MenuAction::ShowContrast => self.show_panel(ToolPanel::Contrast),
            MenuAction::ShowFilter => self.show_panel(ToolPanel::Filter),
            MenuAction::Download => self.show_panel(ToolPanel::Download),
            MenuAction::CloseSession => {}
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::CropRect;

    const D: Dimensions = Dimensions { width: 800, height: 600 };

    #[test]
    fn percentage_resize_scales_both_axes() {
        let op = ProcessOp::Resize {
            width_px: None,
            height_px: None,
            percentage: Some(50.0),
            maintain_aspect_ratio: true,
        };
        assert_eq!(predicted_dimensions(&op, D), Dimensions { width: 400, height: 300 });
    }

    #[test]
    fn width_resize_with_aspect_derives_height() {
        let op = ProcessOp::Resize {
            width_px: Some(400),
            height_px: None,
            percentage: None,
            maintain_aspect_ratio: true,
        };
        assert_eq!(predicted_dimensions(&op, D), Dimensions { width: 400, height: 300 });
    }

    #[test]
    fn quarter_turn_swaps_axes_half_turn_does_not() {
        let quarter = ProcessOp::Rotate { angle: 90.0 };
        let half = ProcessOp::Rotate { angle: 180.0 };
        assert_eq!(predicted_dimensions(&quarter, D), Dimensions { width: 600, height: 800 });
        assert_eq!(predicted_dimensions(&half, D), D);
    }

    #[test]
    fn custom_crop_takes_rect_dimensions() {
        let op = ProcessOp::CropCustom(CropRect { x: 10, y: 10, width: 200, height: 100 });
        assert_eq!(predicted_dimensions(&op, D), Dimensions { width: 200, height: 100 });
    }

    #[test]
    fn square_preset_crops_the_longer_axis() {
        let op = ProcessOp::CropPreset { preset: CropPreset::Square };
        assert_eq!(predicted_dimensions(&op, D), Dimensions { width: 600, height: 600 });
    }

    #[test]
    fn byte_formatting_picks_a_sensible_unit() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }
}
