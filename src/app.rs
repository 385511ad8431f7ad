use eframe::egui;
use crate::api::DEFAULT_BASE_URL;
use crate::modules::session_editor::SessionEditor;
use crate::modules::{EditorModule, MenuAction, MenuContribution, MenuItem};
use crate::style::{self, ColorPalette, ThemeMode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const IMAGE_EXTENSIONS: [&str; 9] = ["jpg", "jpeg", "png", "webp", "bmp", "tiff", "tif", "gif", "ico"];

#[derive(Serialize, Deserialize, Clone)]
struct RecentFile { path: PathBuf, timestamp: i64 }

#[derive(Serialize, Deserialize)]
struct RecentFiles { files: Vec<RecentFile> }

impl RecentFiles {
    fn new() -> Self {
        Self { files: Vec::new() }
    }

    fn load() -> Self {
        let config_path = Self::get_config_path();
        if let Ok(contents) = fs::read_to_string(&config_path) {
            if let Ok(recent) = serde_json::from_str(&contents) {
                return recent;
            }
        }
        Self::new()
    }

    fn save(&self) {
        let config_path = Self::get_config_path();
        if let Some(parent) = config_path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Ok(json) = serde_json::to_string_pretty(self) {
            let _ = fs::write(config_path, json);
        }
    }

    fn get_config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("atelier");
        path.push("recent_files.json");
        path
    }

    fn add_file(&mut self, path: PathBuf) {
        self.files.retain(|f| f.path != path);

        let timestamp = chrono::Utc::now().timestamp();
        self.files.insert(0, RecentFile { path, timestamp });

        if self.files.len() > 20 {
            self.files.truncate(20);
        }

        self.save();
    }

    fn get_files(&self) -> &[RecentFile] {
        &self.files
    }

    fn remove_file(&mut self, path: &PathBuf) {
        self.files.retain(|f| &f.path != path);
        self.save();
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq)]
pub enum ThemePreference { System, Light, Dark }

#[derive(Serialize, Deserialize)]
struct AppSettings {
    theme_preference: ThemePreference,
    backend_base_url: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme_preference: ThemePreference::System,
            backend_base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl AppSettings {
    fn load() -> Self {
        let config_path = Self::get_config_path();
        if let Ok(contents) = fs::read_to_string(&config_path) {
            if let Ok(settings) = serde_json::from_str(&contents) {
                return settings;
            }
        }
        Self::default()
    }

    fn save(&self) {
        let config_path = Self::get_config_path();
        if let Some(parent) = config_path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Ok(json) = serde_json::to_string_pretty(self) {
            let _ = fs::write(config_path, json);
        }
    }

    fn get_config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("atelier");
        path.push("app_settings.json");
        path
    }
}

#[derive(PartialEq)]
enum HomeAction { OpenImage, ShowSettings }

fn menu_items(
    ui: &mut egui::Ui,
    items: &[(MenuItem, MenuAction)],
    pending: &mut Option<MenuAction>,
) {
    for (item, action) in items {
        let label = if let Some(ref shortcut) = item.shortcut {
            format!("{} ({})", item.label, shortcut)
        } else {
            item.label.clone()
        };

        if ui.add_enabled(item.enabled, egui::Button::new(label)).clicked() {
            *pending = Some(*action);
            ui.close();
        }
    }
}

pub struct Atelier {
    active_module: Option<Box<dyn EditorModule>>,
    sidebar_open: bool,
    theme_mode: ThemeMode,
    theme_preference: ThemePreference,
    backend_base_url: String,
    recent_files: RecentFiles,
    recent_files_expanded: bool,
    show_settings: bool,
    last_error: Option<String>,
}

impl Atelier {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings = AppSettings::load();

        let system_theme = match cc.egui_ctx.theme() {
            egui::Theme::Dark => ThemeMode::Dark,
            egui::Theme::Light => ThemeMode::Light,
        };

        let initial_theme = match settings.theme_preference {
            ThemePreference::System => system_theme,
            ThemePreference::Light => ThemeMode::Light,
            ThemePreference::Dark => ThemeMode::Dark,
        };

        style::apply_theme(&cc.egui_ctx, initial_theme);

        Self {
            active_module: None,
            sidebar_open: true,
            theme_mode: initial_theme,
            theme_preference: settings.theme_preference,
            backend_base_url: settings.backend_base_url,
            recent_files: RecentFiles::load(),
            recent_files_expanded: true,
            show_settings: false,
            last_error: None,
        }
    }

    fn open_file(&mut self, path: PathBuf) {
        match SessionEditor::open(path.clone(), self.backend_base_url.clone()) {
            Ok(editor) => {
                self.recent_files.add_file(path);
                self.active_module = Some(Box::new(editor));
                self.last_error = None;
            }
            Err(err) => {
                log::warn!("failed to open {}: {:#}", path.display(), err);
                self.last_error = Some(format!("Could not open {}: {}", path.display(), err));
            }
        }
    }

    fn pick_image(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &IMAGE_EXTENSIONS)
            .pick_file()
        {
            self.open_file(path);
        }
    }

    fn go_home(&mut self) {
        self.active_module = None;
    }

    fn save_settings(&self) {
        AppSettings {
            theme_preference: self.theme_preference,
            backend_base_url: self.backend_base_url.clone(),
        }
        .save();
    }

    fn top_bar(&mut self, ctx: &egui::Context) {
        let contributions: MenuContribution = if let Some(module) = &self.active_module {
            module.get_menu_contributions()
        } else {
            Default::default()
        };

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.add_space(4.0);
            egui::MenuBar::new().ui(ui, |ui| {
                let mut go_home = false;
                if self.active_module.is_some() {
                    if ui.button("Home").clicked() {
                        go_home = true;
                    }
                    ui.separator();
                }
                if go_home {
                    self.go_home();
                    return;
                }

                let mut pending: Option<MenuAction> = None;

                ui.menu_button("File", |ui| {
                    if ui.button("Open Image...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Images", &IMAGE_EXTENSIONS)
                            .pick_file()
                        {
                            self.open_file(path);
                        }
                        ui.close();
                    }

                    if !contributions.file_items.is_empty() {
                        ui.separator();
                        menu_items(ui, &contributions.file_items, &mut pending);
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                        ui.close();
                    }
                });

                if !contributions.edit_items.is_empty() {
                    ui.menu_button("Edit", |ui| {
                        menu_items(ui, &contributions.edit_items, &mut pending);
                    });
                }
                if !contributions.image_items.is_empty() {
                    ui.menu_button("Image", |ui| {
                        menu_items(ui, &contributions.image_items, &mut pending);
                    });
                }
                if !contributions.filter_items.is_empty() {
                    ui.menu_button("Filter", |ui| {
                        menu_items(ui, &contributions.filter_items, &mut pending);
                    });
                }

                match pending {
                    Some(MenuAction::CloseSession) => self.go_home(),
                    Some(action) => {
                        if let Some(module) = &mut self.active_module {
                            module.handle_menu_action(action);
                        }
                    }
                    None => {}
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Settings").clicked() {
                        self.show_settings = true;
                    }
                    let sidebar_label = if self.sidebar_open { "Hide Sidebar" } else { "Show Sidebar" };
                    if ui.button(sidebar_label).clicked() {
                        self.sidebar_open = !self.sidebar_open;
                    }
                    if let Some(module) = &self.active_module {
                        ui.weak(module.get_title());
                    }
                });
            });
            ui.add_space(4.0);
        });
    }

    fn sidebar(&mut self, ctx: &egui::Context) {
        if !self.sidebar_open { return; }

        egui::SidePanel::left("sidebar")
            .resizable(true)
            .default_width(240.0)
            .min_width(200.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        ui.add_space(8.0);

                        let theme_mode = self.theme_mode;

                        let recent_files: Vec<RecentFile> = self.recent_files.get_files().to_vec();
                        let mut file_to_open: Option<PathBuf> = None;
                        let mut file_to_remove: Option<PathBuf> = None;

                        style::sidebar_section(ui, "Recent Images", &mut self.recent_files_expanded, theme_mode, |ui| {
                            if recent_files.is_empty() {
                                ui.weak("No recent images");
                            } else {
                                for recent_file in &recent_files {
                                    if recent_file.path.exists() {
                                        let file_name = recent_file.path
                                            .file_name()
                                            .and_then(|n| n.to_str())
                                            .unwrap_or("Unknown");

                                        ui.horizontal(|ui| {
                                            if style::sidebar_item(ui, file_name, theme_mode).clicked() {
                                                file_to_open = Some(recent_file.path.clone());
                                            }

                                            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                                                let delete_color = if matches!(theme_mode, ThemeMode::Dark) {
                                                    ColorPalette::SLATE_100
                                                } else {
                                                    ColorPalette::GRAY_600
                                                };

                                                if ui.button(egui::RichText::new("🗑").color(delete_color).size(14.0)).clicked() {
                                                    file_to_remove = Some(recent_file.path.clone());
                                                }
                                            });
                                        });
                                    }
                                }
                            }
                        });

                        if let Some(path) = file_to_remove {
                            self.recent_files.remove_file(&path);
                        }
                        if let Some(path) = file_to_open {
                            self.open_file(path);
                        }

                        ui.add_space(8.0);
                    });

                ui.with_layout(egui::Layout::bottom_up(egui::Align::LEFT), |ui| {
                    ui.add_space(8.0);
                    ui.separator();
                    ui.add_space(4.0);
                    ui.horizontal(|ui| {
                        ui.weak("Backend:");
                        ui.label(egui::RichText::new(&self.backend_base_url).size(11.0).monospace());
                    });
                    ui.add_space(4.0);
                });
            });
    }

    fn landing_page(&mut self, ui: &mut egui::Ui) {
        let theme = self.theme_mode;
        let (title_col, sub_col, accent_line, ver_bg, ver_text_col) = match theme {
            ThemeMode::Dark => (
                egui::Color32::WHITE,
                ColorPalette::ZINC_400,
                ColorPalette::ZINC_800,
                egui::Color32::from_rgb(32, 32, 40),
                ColorPalette::ZINC_400,
            ),
            ThemeMode::Light => (
                ColorPalette::GRAY_900,
                ColorPalette::GRAY_500,
                ColorPalette::GRAY_200,
                ColorPalette::GRAY_100,
                ColorPalette::GRAY_500,
            ),
        };

        let mut action: Option<HomeAction> = None;
        let mut recent_to_open: Option<PathBuf> = None;
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                let avail_w = ui.available_width();
                let h_pad = 48.0_f32.max((avail_w - 960.0) / 2.0);
                let margin = egui::Margin { left: h_pad as i8, right: h_pad as i8, ..Default::default() };

                ui.add_space(36.0);

                egui::Frame::new().inner_margin(margin).show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.vertical(|ui| {
                            ui.horizontal(|ui| {
                                ui.label(
                                    egui::RichText::new("Atelier")
                                        .size(38.0)
                                        .strong()
                                        .color(title_col),
                                );
                                ui.add_space(10.0);
                                egui::Frame::new()
                                    .fill(ver_bg)
                                    .corner_radius(10.0)
                                    .inner_margin(egui::Margin { left: 8, right: 8, top: 3, bottom: 3 })
                                    .show(ui, |ui| {
                                        ui.label(
                                            egui::RichText::new("v".to_owned() + env!("CARGO_PKG_VERSION"))
                                                .size(11.0)
                                                .color(ver_text_col),
                                        );
                                    });
                            });
                            ui.label(
                                egui::RichText::new("Image editing, processed by your backend")
                                    .size(14.0)
                                    .color(sub_col),
                            );
                        });

                        ui.with_layout(
                            egui::Layout::right_to_left(egui::Align::Center),
                            |ui| {
                                if style::ghost_button(ui, "Settings", false, theme).clicked() {
                                    action = Some(HomeAction::ShowSettings);
                                }
                            },
                        );
                    });
                });

                ui.add_space(20.0);

                let start_x = ui.cursor().min.x;
                let sep_y = ui.cursor().min.y;
                let sep_rect = egui::Rect::from_min_size(
                    egui::pos2(start_x, sep_y),
                    egui::vec2(avail_w, 1.0),
                );
                ui.allocate_rect(sep_rect, egui::Sense::hover());
                ui.painter().rect_filled(sep_rect, 0.0, accent_line);

                let accent_rect = egui::Rect::from_min_size(
                    egui::pos2(start_x + h_pad, sep_y),
                    egui::vec2(100.0, 1.0),
                );
                ui.painter().rect_filled(accent_rect, 0.0, ColorPalette::BLUE_500);

                ui.add_space(36.0);
                egui::Frame::new().inner_margin(margin).show(ui, |ui| {
                    style::home_section_header(ui, "Quick Start", theme);
                    ui.add_space(12.0);

                    let mut open_image = false;
                    ui.columns(2, |cols| {
                        if style::tool_card(
                            &mut cols[0],
                            "Open Image",
                            "Start a new editing session",
                            ColorPalette::BLUE_500,
                            theme,
                        ).clicked() { open_image = true; }
                    });
                    if open_image { action = Some(HomeAction::OpenImage); }

                    let recent: Vec<RecentFile> = self.recent_files.get_files().iter().take(3).cloned().collect();
                    if !recent.is_empty() {
                        ui.add_space(32.0);
                        style::home_section_header(ui, "Recent", theme);
                        ui.add_space(12.0);

                        ui.columns(3, |cols| {
                            for (i, file) in recent.iter().enumerate() {
                                let name = file.path
                                    .file_name()
                                    .and_then(|n| n.to_str())
                                    .unwrap_or("Unknown")
                                    .to_string();
                                let when = chrono::DateTime::from_timestamp(file.timestamp, 0)
                                    .map(|t| t.format("%Y-%m-%d").to_string())
                                    .unwrap_or_default();
                                if style::tool_card(&mut cols[i], &name, &when, ColorPalette::GREEN_500, theme).clicked() {
                                    recent_to_open = Some(file.path.clone());
                                }
                            }
                        });
                    }
                });
            });

        if let Some(path) = recent_to_open {
            self.open_file(path);
            return;
        }
        match action {
            Some(HomeAction::OpenImage) => self.pick_image(),
            Some(HomeAction::ShowSettings) => self.show_settings = true,
            None => {}
        }
    }

    fn render_settings_modal(&mut self, ctx: &egui::Context) {
        if !self.show_settings { return; }
        let overlay = egui::Color32::from_rgba_premultiplied(0, 0, 0, 160);
        egui::Area::new(egui::Id::new("settings_overlay"))
            .fixed_pos(egui::pos2(0.0, 0.0))
            .order(egui::Order::Foreground)
            .interactable(false)
            .show(ctx, |ui| {
                ui.painter().rect_filled(ctx.content_rect(), 0.0, overlay);
            });

        let (bg, border, muted, text) = if matches!(self.theme_mode, ThemeMode::Dark) {
            (egui::Color32::from_rgb(22, 22, 27), ColorPalette::ZINC_700, ColorPalette::ZINC_500, ColorPalette::SLATE_200)
        } else {
            (egui::Color32::WHITE, ColorPalette::GRAY_200, ColorPalette::GRAY_400, ColorPalette::GRAY_700)
        };

        let mut sys_clicked = false;
        let mut light_clicked = false;
        let mut dark_clicked = false;
        let mut url_changed = false;
        let mut open = self.show_settings;

        let response = egui::Window::new("Settings")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .min_width(400.0)
            .frame(egui::Frame::new().fill(bg).stroke(egui::Stroke::new(1.0, border)).corner_radius(10.0).inner_margin(28.0))
            .open(&mut open)
            .order(egui::Order::Tooltip)
            .show(ctx, |ui| {
                ui.label(egui::RichText::new("APPEARANCE").size(11.0).color(muted));
                ui.add_space(10.0);
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new("Theme").size(14.0).color(text));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        dark_clicked = ui.selectable_label(matches!(self.theme_preference, ThemePreference::Dark), "Dark").clicked();
                        light_clicked = ui.selectable_label(matches!(self.theme_preference, ThemePreference::Light), "Light").clicked();
                        sys_clicked = ui.selectable_label(matches!(self.theme_preference, ThemePreference::System), "System").clicked();
                    });
                });

                ui.add_space(16.0);
                ui.separator();
                ui.add_space(16.0);

                ui.label(egui::RichText::new("BACKEND").size(11.0).color(muted));
                ui.add_space(10.0);
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new("Base URL").size(14.0).color(text));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.add(egui::TextEdit::singleline(&mut self.backend_base_url).desired_width(220.0)).lost_focus() {
                            url_changed = true;
                        }
                    });
                });
                ui.add_space(4.0);
                ui.label(egui::RichText::new("New sessions use this address.").size(11.0).color(muted));
            });

        if let Some(r) = response {
            let clicked_outside = ctx.input(|i| {
                i.pointer.any_click()
                    && i.pointer.interact_pos().map_or(false, |p| !r.response.rect.contains(p))
            });
            if clicked_outside { open = false; }
        }

        self.show_settings = open;
        if sys_clicked {
            self.theme_preference = ThemePreference::System;
            self.theme_mode = match ctx.theme() { egui::Theme::Dark => ThemeMode::Dark, egui::Theme::Light => ThemeMode::Light };
            style::apply_theme(ctx, self.theme_mode);
            self.save_settings();
        }
        if light_clicked {
            self.theme_preference = ThemePreference::Light;
            self.theme_mode = ThemeMode::Light;
            style::apply_theme(ctx, self.theme_mode);
            self.save_settings();
        }
        if dark_clicked {
            self.theme_preference = ThemePreference::Dark;
            self.theme_mode = ThemeMode::Dark;
            style::apply_theme(ctx, self.theme_mode);
            self.save_settings();
        }
        if url_changed { self.save_settings(); }
    }

    fn render_error_bar(&mut self, ctx: &egui::Context) {
        let Some(message) = self.last_error.clone() else { return };
        egui::TopBottomPanel::bottom("error_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(message).color(ColorPalette::RED_400));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Dismiss").clicked() {
                        self.last_error = None;
                    }
                });
            });
        });
    }
}

impl eframe::App for Atelier {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if matches!(self.theme_preference, ThemePreference::System) {
            let system_theme = match ctx.theme() {
                egui::Theme::Dark => ThemeMode::Dark,
                egui::Theme::Light => ThemeMode::Light,
            };

            if self.theme_mode != system_theme {
                self.theme_mode = system_theme;
                style::apply_theme(ctx, self.theme_mode);
            }
        }

        self.render_settings_modal(ctx);
        self.top_bar(ctx);
        self.sidebar(ctx);
        self.render_error_bar(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(module) = &mut self.active_module {
                module.ui(ui, ctx);
            } else {
                self.landing_page(ui);
            }
        });
    }
}
