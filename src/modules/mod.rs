use eframe::egui;

pub mod crop_editor;
pub mod session_editor;

/// Actions a module exposes through the shared menu bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Undo,
    Redo,
    ShowResize,
    ShowRotate,
    ShowFlip,
    StartCrop,
    ConfirmCrop,
    CancelCrop,
    ShowGrayscale,
    ShowBrightness,
    ShowContrast,
    ShowFilter,
    Download,
    CloseSession,
}

#[derive(Debug, Clone)]
pub struct MenuItem {
    pub label: String,
    pub shortcut: Option<String>,
    pub enabled: bool,
}

impl MenuItem {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into(), shortcut: None, enabled: true }
    }

    pub fn with_shortcut(mut self, shortcut: impl Into<String>) -> Self {
        self.shortcut = Some(shortcut.into());
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Menu items a module contributes to the app-level menus. Empty item lists
/// leave the corresponding menu out entirely.
#[derive(Debug, Clone, Default)]
pub struct MenuContribution {
    pub file_items: Vec<(MenuItem, MenuAction)>,
    pub edit_items: Vec<(MenuItem, MenuAction)>,
    pub image_items: Vec<(MenuItem, MenuAction)>,
    pub filter_items: Vec<(MenuItem, MenuAction)>,
}

pub trait EditorModule {
    fn ui(&mut self, ui: &mut egui::Ui, ctx: &egui::Context);
    fn get_title(&self) -> String;
    fn get_menu_contributions(&self) -> MenuContribution {
        MenuContribution::default()
    }
    fn handle_menu_action(&mut self, action: MenuAction);
    fn as_any(&self) -> &dyn std::any::Any;
}
