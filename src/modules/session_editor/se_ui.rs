use eframe::egui;

use crate::api::{download_url, ApiRequest, CropPreset, FilterKind, FlipAxis, ProcessOp};
use crate::modules::crop_editor::{paint, CropOutcome};
use crate::style::{ColorPalette, ThemeMode};

use super::se_main::{SessionEditor, ToolPanel, DOWNLOAD_FORMATS};

impl SessionEditor {
    pub(super) fn render_workspace(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let theme: ThemeMode = if ui.visuals().dark_mode { ThemeMode::Dark } else { ThemeMode::Light };

        egui::SidePanel::right("session_metadata")
            .resizable(false)
            .exact_width(250.0)
            .show_inside(ui, |ui: &mut egui::Ui| {
                self.render_metadata(ui, theme);
                ui.separator();
                self.render_request_log(ui, theme);
            });

        egui::CentralPanel::default().show_inside(ui, |ui: &mut egui::Ui| {
            self.render_toolbar(ui, theme);
            ui.add_space(4.0);
            self.render_options_bar(ui, theme);
            ui.add_space(4.0);
            self.render_canvas(ui, ctx);
        });
    }

    fn render_toolbar(&mut self, ui: &mut egui::Ui, theme: ThemeMode) {
        let (bg, border) = if matches!(theme, ThemeMode::Dark) {
            (ColorPalette::ZINC_800, ColorPalette::ZINC_700)
        } else {
            (ColorPalette::GRAY_50, ColorPalette::GRAY_300)
        };

        egui::Frame::new()
            .fill(bg).stroke(egui::Stroke::new(1.0, border))
            .corner_radius(6.0)
            .inner_margin(egui::Margin { left: 8, right: 8, top: 4, bottom: 4 })
            .show(ui, |ui: &mut egui::Ui| {
                egui::ScrollArea::horizontal()
                    .auto_shrink([false, true])
                    .show(ui, |ui: &mut egui::Ui| {
                        ui.horizontal(|ui: &mut egui::Ui| {
                            self.panel_btn(ui, "Resize", ToolPanel::Resize, theme);
                            self.panel_btn(ui, "Rotate", ToolPanel::Rotate, theme);
                            self.panel_btn(ui, "Flip", ToolPanel::Flip, theme);

                            let crop_active: bool = self.crop.is_some();
                            if self.toggle_btn(ui, "Crop", crop_active, theme) {
                                if crop_active { self.cancel_crop(); } else { self.start_crop(); }
                            }

                            ui.separator();
                            self.panel_btn(ui, "Grayscale", ToolPanel::Grayscale, theme);
                            self.panel_btn(ui, "Brightness", ToolPanel::Brightness, theme);
                            self.panel_btn(ui, "Contrast", ToolPanel::Contrast, theme);
                            self.panel_btn(ui, "Filter", ToolPanel::Filter, theme);
                            ui.separator();

                            if ui.add_enabled(self.can_undo(), egui::Button::new("Undo")).clicked() {
                                self.apply(ProcessOp::Undo);
                            }
                            if ui.add_enabled(self.can_redo(), egui::Button::new("Redo")).clicked() {
                                self.apply(ProcessOp::Redo);
                            }
                            ui.separator();
                            self.panel_btn(ui, "Download", ToolPanel::Download, theme);
                        });
                    });
            });
    }

    fn panel_btn(&mut self, ui: &mut egui::Ui, label: &str, panel: ToolPanel, theme: ThemeMode) {
        let active: bool = self.panel == panel && self.crop.is_none();
        if self.toggle_btn(ui, label, active, theme) {
            self.crop = None;
            self.panel = if active { ToolPanel::None } else { panel };
        }
    }

    fn toggle_btn(&mut self, ui: &mut egui::Ui, label: &str, active: bool, theme: ThemeMode) -> bool {
        let (bg, hover, txt) = if active {
            (ColorPalette::BLUE_600, ColorPalette::BLUE_500, egui::Color32::WHITE)
        } else if matches!(theme, ThemeMode::Dark) {
            (ColorPalette::ZINC_700, ColorPalette::ZINC_600, ColorPalette::ZINC_200)
        } else {
            (ColorPalette::GRAY_200, ColorPalette::GRAY_300, ColorPalette::GRAY_800)
        };

        ui.scope(|ui: &mut egui::Ui| {
            let s: &mut egui::Style = ui.style_mut();
            s.visuals.widgets.inactive.bg_fill = bg;
            s.visuals.widgets.inactive.bg_stroke = egui::Stroke::NONE;
            s.visuals.widgets.hovered.bg_fill = hover;
            s.visuals.widgets.hovered.bg_stroke = egui::Stroke::NONE;
            s.visuals.widgets.active.bg_fill = hover;
            ui.add(egui::Button::new(egui::RichText::new(label).size(12.0).color(txt)).min_size(egui::vec2(0.0, 24.0)))
        }).inner.clicked()
    }

    fn render_options_bar(&mut self, ui: &mut egui::Ui, theme: ThemeMode) {
        ui.spacing_mut().slider_width = 120.0;
        let (bg, border, label_col) = if matches!(theme, ThemeMode::Dark) {
            (ColorPalette::ZINC_800, ColorPalette::ZINC_700, ColorPalette::ZINC_400)
        } else {
            (ColorPalette::GRAY_50, ColorPalette::GRAY_300, ColorPalette::ZINC_600)
        };

        if self.crop.is_some() {
            egui::Frame::new()
                .fill(bg).stroke(egui::Stroke::new(1.0, border))
                .corner_radius(6.0)
                .inner_margin(egui::Margin { left: 8, right: 8, top: 3, bottom: 3 })
                .show(ui, |ui: &mut egui::Ui| {
                    self.render_crop_options(ui, theme, label_col);
                });
            return;
        }
        if self.panel == ToolPanel::None {
            return;
        }

        egui::Frame::new()
            .fill(bg).stroke(egui::Stroke::new(1.0, border))
            .corner_radius(6.0)
            .inner_margin(egui::Margin { left: 8, right: 8, top: 3, bottom: 3 })
            .show(ui, |ui: &mut egui::Ui| {
                ui.horizontal(|ui: &mut egui::Ui| {
                    let label = |text: &str| egui::RichText::new(text).size(12.0).color(label_col);
                    match self.panel {
                        ToolPanel::Resize => {
                            ui.checkbox(&mut self.resize.use_percentage, label("Percent"));
                            if self.resize.use_percentage {
                                ui.add(egui::Slider::new(&mut self.resize.percentage, 1.0..=400.0).suffix("%"));
                            } else {
                                ui.label(label("W:"));
                                ui.add(egui::DragValue::new(&mut self.resize.width_px).range(1..=20000));
                                ui.label(label("H:"));
                                ui.add(egui::DragValue::new(&mut self.resize.height_px).range(1..=20000));
                                ui.checkbox(&mut self.resize.maintain_aspect_ratio, label("Keep aspect"));
                            }
                            if ui.button("Apply").clicked() {
                                let op: ProcessOp = if self.resize.use_percentage {
                                    ProcessOp::Resize {
                                        width_px: None,
                                        height_px: None,
                                        percentage: Some(self.resize.percentage),
                                        maintain_aspect_ratio: self.resize.maintain_aspect_ratio,
                                    }
                                } else {
                                    ProcessOp::Resize {
                                        width_px: Some(self.resize.width_px),
                                        height_px: Some(self.resize.height_px),
                                        percentage: None,
                                        maintain_aspect_ratio: self.resize.maintain_aspect_ratio,
                                    }
                                };
                                self.apply(op);
                            }
                        }
                        ToolPanel::Rotate => {
                            for angle in [90.0_f32, 180.0, 270.0] {
                                if ui.button(format!("{}°", angle)).clicked() {
                                    self.apply(ProcessOp::Rotate { angle });
                                }
                            }
                            ui.separator();
                            ui.label(label("Custom:"));
                            ui.add(egui::DragValue::new(&mut self.rotate_angle).range(-360.0..=360.0).suffix("°"));
                            if ui.button("Apply").clicked() {
                                self.apply(ProcessOp::Rotate { angle: self.rotate_angle });
                            }
                        }
                        ToolPanel::Flip => {
                            if ui.button("Horizontal").clicked() {
                                self.flip_axis = FlipAxis::Horizontal;
                                self.apply(ProcessOp::Flip { axis: FlipAxis::Horizontal });
                            }
                            if ui.button("Vertical").clicked() {
                                self.flip_axis = FlipAxis::Vertical;
                                self.apply(ProcessOp::Flip { axis: FlipAxis::Vertical });
                            }
                        }
                        ToolPanel::Grayscale => {
                            ui.label(label("Intensity:"));
                            ui.add(egui::Slider::new(&mut self.grayscale_intensity, 0..=100));
                            if ui.button("Apply").clicked() {
                                self.apply(ProcessOp::Grayscale { intensity: self.grayscale_intensity });
                            }
                        }
                        ToolPanel::Brightness => {
                            ui.label(label("Level:"));
                            ui.add(egui::Slider::new(&mut self.brightness_level, -100..=100));
                            if ui.button("Apply").clicked() {
                                self.apply(ProcessOp::Brightness { level: self.brightness_level });
                            }
                        }
                        ToolPanel::Contrast => {
                            ui.label(label("Level:"));
                            ui.add(egui::Slider::new(&mut self.contrast_level, -100..=100));
                            if ui.button("Apply").clicked() {
                                self.apply(ProcessOp::Contrast { level: self.contrast_level });
                            }
                        }
                        ToolPanel::Filter => {
                            egui::ComboBox::from_id_salt("filter_kind")
                                .selected_text(match self.filter_kind {
                                    FilterKind::Blur => "Blur",
                                    FilterKind::Sharpen => "Sharpen",
                                })
                                .width(90.0)
                                .show_ui(ui, |ui: &mut egui::Ui| {
                                    ui.selectable_value(&mut self.filter_kind, FilterKind::Blur, "Blur");
                                    ui.selectable_value(&mut self.filter_kind, FilterKind::Sharpen, "Sharpen");
                                });
                            ui.label(label("Intensity:"));
                            ui.add(egui::Slider::new(&mut self.filter_intensity, 0..=100));
                            if ui.button("Apply").clicked() {
                                self.apply(ProcessOp::Filter {
                                    kind: self.filter_kind,
                                    intensity: self.filter_intensity,
                                });
                            }
                        }
                        ToolPanel::Download => {
                            ui.label(label("Format:"));
                            egui::ComboBox::from_id_salt("download_format")
                                .selected_text(self.download_format)
                                .width(90.0)
                                .show_ui(ui, |ui: &mut egui::Ui| {
                                    for f in DOWNLOAD_FORMATS {
                                        ui.selectable_value(&mut self.download_format, f, f);
                                    }
                                });
                            ui.label(label("Filename:"));
                            ui.add(egui::TextEdit::singleline(&mut self.download_filename).desired_width(160.0));
                            if ui.button("Prepare Download").clicked() {
                                let format: Option<&str> =
                                    (self.download_format != "original").then_some(self.download_format);
                                let filename: Option<&str> =
                                    (!self.download_filename.is_empty()).then_some(self.download_filename.as_str());
                                let url: String = download_url(
                                    &self.base_url,
                                    &self.session_id,
                                    &self.extension,
                                    format,
                                    filename,
                                );
                                log::info!("session {}: GET {}", self.session_id, url);
                                self.requests.push(ApiRequest { method: "GET", url, body: None });
                            }
                        }
                        ToolPanel::None => {}
                    }
                });
            });
    }

    fn render_crop_options(&mut self, ui: &mut egui::Ui, theme: ThemeMode, label_col: egui::Color32) {
        let mut preset: Option<CropPreset> = None;
        ui.horizontal(|ui: &mut egui::Ui| {
            ui.label(egui::RichText::new("Server preset:").size(12.0).color(label_col));
            for (text, p) in [
                ("Square", CropPreset::Square),
                ("16:9", CropPreset::Wide16x9),
                ("4:6", CropPreset::Portrait4x6),
                ("A4", CropPreset::A4),
            ] {
                if ui.button(text).clicked() {
                    preset = Some(p);
                }
            }
        });
        if let Some(p) = preset {
            self.apply_crop_preset(p);
            return;
        }

        let outcome: Option<CropOutcome> = match self.crop.as_mut() {
            Some(editor) => editor.controls_ui(ui, theme),
            None => None,
        };
        match outcome {
            Some(CropOutcome::Confirmed(_)) => self.confirm_crop(),
            Some(CropOutcome::Cancelled) => self.cancel_crop(),
            None => {}
        }
    }

    fn render_canvas(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let avail: egui::Vec2 = ui.available_size();
        let (rect, response) = ui.allocate_exact_size(avail, egui::Sense::click_and_drag());
        let painter: egui::Painter = ui.painter_at(rect);

        let (img_w, img_h) = (self.dimensions.width as f32, self.dimensions.height as f32);
        if img_w <= 0.0 || img_h <= 0.0 {
            return;
        }
        let zoom: f32 = (rect.width() / img_w).min(rect.height() / img_h).min(1.0);
        let img_rect = egui::Rect::from_center_size(rect.center(), egui::vec2(img_w, img_h) * zoom);

        // Checkerboard behind the preview so transparency reads as such.
        let checker: f32 = 12.0;
        let (light, dark) = (egui::Color32::from_gray(70), egui::Color32::from_gray(55));
        let mut row: u32 = 0;
        let mut cy: f32 = img_rect.min.y;
        while cy < img_rect.max.y {
            let mut col: u32 = row % 2;
            let mut cx: f32 = img_rect.min.x;
            while cx < img_rect.max.x {
                let color: egui::Color32 = if col % 2 == 0 { light } else { dark };
                let tile = egui::Rect::from_min_size(egui::pos2(cx, cy), egui::vec2(checker, checker))
                    .intersect(img_rect);
                painter.rect_filled(tile, 0.0, color);
                cx += checker;
                col += 1;
            }
            cy += checker;
            row += 1;
        }

        if let Some(tex) = self.texture {
            painter.image(
                tex,
                img_rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        }
        painter.rect_stroke(img_rect, 0.0, egui::Stroke::new(1.0, ColorPalette::ZINC_500), egui::StrokeKind::Outside);

        // Scale recomputed from the live rect every frame, so window resizes
        // keep pointer math honest.
        let origin: egui::Pos2 = img_rect.min;
        let to_image = move |screen: egui::Pos2| -> egui::Pos2 {
            egui::pos2((screen.x - origin.x) / zoom, (screen.y - origin.y) / zoom)
        };
        let to_screen = move |image: egui::Pos2| -> egui::Pos2 {
            egui::pos2(origin.x + image.x * zoom, origin.y + image.y * zoom)
        };

        if let Some(editor) = self.crop.as_mut() {
            editor.interact(&response, to_image);
            if let Some(hover) = response.hover_pos() {
                if let Some(cursor) = editor.cursor_at(to_image(hover)) {
                    ctx.set_cursor_icon(cursor);
                }
            }
            paint(&painter, &editor.shapes(), to_screen);

            let r = editor.region();
            let label: String = format!("{} × {} px", r.width.round() as u32, r.height.round() as u32);
            let text_pos: egui::Pos2 = to_screen(egui::pos2(r.x, r.y)) + egui::vec2(4.0, -18.0);
            painter.text(text_pos + egui::vec2(1.0, 1.0), egui::Align2::LEFT_TOP, &label, egui::FontId::proportional(12.0), egui::Color32::from_black_alpha(160));
            painter.text(text_pos, egui::Align2::LEFT_TOP, &label, egui::FontId::proportional(12.0), egui::Color32::WHITE);
        }
    }

    fn render_metadata(&mut self, ui: &mut egui::Ui, theme: ThemeMode) {
        let label_col: egui::Color32 = if matches!(theme, ThemeMode::Dark) {
            ColorPalette::ZINC_400
        } else {
            ColorPalette::ZINC_600
        };
        ui.add_space(4.0);
        ui.heading("Session");
        ui.add_space(4.0);

        let row = |ui: &mut egui::Ui, name: &str, value: String| {
            ui.horizontal(|ui: &mut egui::Ui| {
                ui.label(egui::RichText::new(name).size(12.0).color(label_col));
                ui.label(egui::RichText::new(value).size(12.0));
            });
        };
        row(ui, "File:", self.filename.clone());
        row(ui, "Session:", self.session_id.clone());
        row(ui, "Format:", self.format.clone());
        row(ui, "Size:", self.human_size());
        row(ui, "Dimensions:", format!("{} × {}", self.dimensions.width, self.dimensions.height));
        row(ui, "Undo steps:", self.undo_depth.to_string());
        row(ui, "Redo steps:", self.redo_depth.to_string());
    }

    fn render_request_log(&mut self, ui: &mut egui::Ui, label_col_theme: ThemeMode) {
        let label_col: egui::Color32 = if matches!(label_col_theme, ThemeMode::Dark) {
            ColorPalette::ZINC_400
        } else {
            ColorPalette::ZINC_600
        };
        ui.heading("Requests");
        ui.add_space(4.0);
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui: &mut egui::Ui| {
                for req in self.requests.iter().rev() {
                    ui.label(egui::RichText::new(format!("{} {}", req.method, req.url)).size(11.0).monospace());
                    if let Some(body) = &req.body {
                        ui.label(
                            egui::RichText::new(body.to_string())
                                .size(10.0)
                                .monospace()
                                .color(label_col),
                        );
                    }
                    ui.add_space(4.0);
                }
            });
    }
}
