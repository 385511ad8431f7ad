use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5001/api";

/// Pixel-space crop rectangle, origin top-left. This is the exact body of
/// the `crop-custom` endpoint, so field names and integer types are fixed
/// by the backend contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipAxis {
    Horizontal,
    Vertical,
}

impl FlipAxis {
    pub fn as_str(self) -> &'static str {
        match self {
            FlipAxis::Horizontal => "horizontal",
            FlipAxis::Vertical => "vertical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Blur,
    Sharpen,
}

impl FilterKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterKind::Blur => "blur",
            FilterKind::Sharpen => "sharpen",
        }
    }
}

/// Named crop presets understood by the `crop` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropPreset {
    Square,
    Wide16x9,
    Portrait4x6,
    A4,
}

impl CropPreset {
    pub fn as_str(self) -> &'static str {
        match self {
            CropPreset::Square => "square",
            CropPreset::Wide16x9 => "16x9",
            CropPreset::Portrait4x6 => "4x6",
            CropPreset::A4 => "a4",
        }
    }
}

/// One processing operation on an open image session. Each variant maps to
/// a `POST /process/{session}/{ext}/{endpoint}` route.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOp {
    Resize {
        width_px: Option<u32>,
        height_px: Option<u32>,
        percentage: Option<f32>,
        maintain_aspect_ratio: bool,
    },
    Rotate { angle: f32 },
    Flip { axis: FlipAxis },
    CropPreset { preset: CropPreset },
    CropCustom(CropRect),
    Grayscale { intensity: u8 },
    Brightness { level: i32 },
    Contrast { level: i32 },
    Filter { kind: FilterKind, intensity: u8 },
    Undo,
    Redo,
}

impl ProcessOp {
    pub fn endpoint(&self) -> &'static str {
        match self {
            ProcessOp::Resize { .. } => "resize",
            ProcessOp::Rotate { .. } => "rotate",
            ProcessOp::Flip { .. } => "flip",
            ProcessOp::CropPreset { .. } => "crop",
            ProcessOp::CropCustom(_) => "crop-custom",
            ProcessOp::Grayscale { .. } => "grayscale",
            ProcessOp::Brightness { .. } => "brightness",
            ProcessOp::Contrast { .. } => "contrast",
            ProcessOp::Filter { .. } => "filter",
            ProcessOp::Undo => "undo",
            ProcessOp::Redo => "redo",
        }
    }

    /// JSON body for the request. Undo/redo take none.
    pub fn body(&self) -> Option<Value> {
        match self {
            ProcessOp::Resize { width_px, height_px, percentage, maintain_aspect_ratio } => {
                let mut body = serde_json::Map::new();
                if let Some(w) = width_px { body.insert("width_px".into(), json!(w)); }
                if let Some(h) = height_px { body.insert("height_px".into(), json!(h)); }
                if let Some(p) = percentage { body.insert("percentage".into(), json!(p)); }
                body.insert("maintain_aspect_ratio".into(), json!(maintain_aspect_ratio));
                Some(Value::Object(body))
            }
            ProcessOp::Rotate { angle } => Some(json!({ "angle": angle })),
            ProcessOp::Flip { axis } => Some(json!({ "axis": axis.as_str() })),
            ProcessOp::CropPreset { preset } => Some(json!({ "preset": preset.as_str() })),
            ProcessOp::CropCustom(rect) => serde_json::to_value(rect).ok(),
            ProcessOp::Grayscale { intensity } => Some(json!({ "intensity": intensity })),
            ProcessOp::Brightness { level } => Some(json!({ "level": level })),
            ProcessOp::Contrast { level } => Some(json!({ "level": level })),
            ProcessOp::Filter { kind, intensity } => {
                Some(json!({ "type": kind.as_str(), "intensity": intensity }))
            }
            ProcessOp::Undo | ProcessOp::Redo => None,
        }
    }

    pub fn path(&self, session_id: &str, extension: &str) -> String {
        format!("/process/{}/{}/{}", session_id, extension, self.endpoint())
    }
}

/// A fully prepared backend request: everything the transport layer needs.
/// Dispatching it over a socket is deployment glue outside this crate.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: &'static str,
    pub url: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn process(base_url: &str, session_id: &str, extension: &str, op: &ProcessOp) -> Self {
        Self {
            method: "POST",
            url: format!("{}{}", base_url, op.path(session_id, extension)),
            body: op.body(),
        }
    }

    pub fn upload(base_url: &str, filename: &str) -> Self {
        // Multipart form upload; the body here records the file being sent.
        Self {
            method: "POST",
            url: format!("{}/upload", base_url),
            body: Some(json!({ "file": filename })),
        }
    }
}

/// Builds the GET download URL, with optional format conversion and filename
/// override carried as query parameters.
pub fn download_url(
    base_url: &str,
    session_id: &str,
    extension: &str,
    format: Option<&str>,
    filename: Option<&str>,
) -> String {
    let mut url = format!("{}/download/{}/{}", base_url, session_id, extension);
    let mut params: Vec<String> = Vec::new();
    if let Some(f) = format { params.push(format!("format={}", f)); }
    if let Some(n) = filename { params.push(format!("filename={}", n)); }
    if !params.is_empty() {
        url.push('?');
        url.push_str(&params.join("&"));
    }
    url
}

/// Session descriptor returned by `/upload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub image_session_id: String,
    pub filename: String,
    pub original_extension: String,
    pub initial_dimensions: Dimensions,
    pub format: String,
    pub size_bytes: u64,
}

/// Metadata returned by every `/process/...` route. The undo/redo flags are
/// only present on routes that touch the history stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub new_dimensions: Dimensions,
    pub new_size_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_undo: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_redo: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crop_custom_body_matches_backend_contract() {
        let op = ProcessOp::CropCustom(CropRect { x: 900, y: 10, width: 100, height: 50 });
        assert_eq!(op.path("abc123", "png"), "/process/abc123/png/crop-custom");
        assert_eq!(
            op.body().unwrap(),
            json!({ "x": 900, "y": 10, "width": 100, "height": 50 })
        );
    }

    #[test]
    fn undo_redo_have_no_body() {
        assert_eq!(ProcessOp::Undo.body(), None);
        assert_eq!(ProcessOp::Redo.path("s", "jpg"), "/process/s/jpg/redo");
    }

    #[test]
    fn resize_body_omits_unset_fields() {
        let op = ProcessOp::Resize {
            width_px: Some(640),
            height_px: None,
            percentage: None,
            maintain_aspect_ratio: true,
        };
        assert_eq!(
            op.body().unwrap(),
            json!({ "width_px": 640, "maintain_aspect_ratio": true })
        );
    }

    #[test]
    fn download_url_query_building() {
        assert_eq!(
            download_url("http://localhost:5001/api", "s1", "png", None, None),
            "http://localhost:5001/api/download/s1/png"
        );
        assert_eq!(
            download_url("http://localhost:5001/api", "s1", "png", Some("webp"), Some("out")),
            "http://localhost:5001/api/download/s1/png?format=webp&filename=out"
        );
    }

    #[test]
    fn process_response_round_trip() {
        let raw = r#"{"new_dimensions":{"width":800,"height":600},"new_size_bytes":52311,"can_undo":true,"can_redo":false}"#;
        let parsed: ProcessResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.new_dimensions, Dimensions { width: 800, height: 600 });
        assert_eq!(parsed.can_undo, Some(true));

        let bare = r#"{"new_dimensions":{"width":10,"height":10},"new_size_bytes":1}"#;
        let parsed: ProcessResponse = serde_json::from_str(bare).unwrap();
        assert_eq!(parsed.can_undo, None);
    }
}
