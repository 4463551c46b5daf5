use eframe::egui;

use super::PhoneMasterApp;
use crate::i18n::{tr, Text};
use crate::utils;

impl PhoneMasterApp {
    pub(super) fn render_lens(&mut self, ui: &mut egui::Ui) {
        let lang = self.prefs.language;
        ui.add_space(8.0);
        ui.heading(egui::RichText::new(tr(lang, Text::TabLens)).size(26.0).strong());
        ui.label(
            egui::RichText::new("Scan receipts, IDs and invoices into editable text.")
                .color(egui::Color32::GRAY),
        );
        ui.add_space(8.0);

        if !self.prefs.premium_unlocked {
            ui.label("AI Lens is a premium feature.");
            if ui.button(tr(lang, Text::Premium)).clicked() {
                self.payment.visible = true;
            }
            return;
        }

        if self.config.gemini_api_key.is_none() {
            ui.label(
                egui::RichText::new("Set GEMINI_API_KEY to enable document analysis.")
                    .color(egui::Color32::from_rgb(220, 150, 50)),
            );
        }

        ui.horizontal(|ui| {
            if ui
                .add_enabled(!self.lens.busy, egui::Button::new("Choose Image"))
                .clicked()
            {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Images", &["png", "jpg", "jpeg", "webp"])
                    .pick_file()
                {
                    self.lens.image = Some(path);
                    self.lens.text = None;
                    self.lens.analysis = None;
                }
            }
            if let Some(image) = &self.lens.image {
                ui.label(egui::RichText::new(utils::display_path(image)).color(egui::Color32::GRAY));
            }
        });

        let ready = self.lens.image.is_some() && !self.lens.busy;
        ui.horizontal(|ui| {
            if ui.add_enabled(ready, egui::Button::new("Extract Text")).clicked() {
                self.start_lens(false);
            }
            if ui.add_enabled(ready, egui::Button::new("Analyze")).clicked() {
                self.start_lens(true);
            }
            if self.lens.busy {
                ui.spinner();
            }
        });

        if let Some(analysis) = &self.lens.analysis {
            ui.add_space(8.0);
            egui::Frame::group(ui.style()).inner_margin(8.0).show(ui, |ui| {
                ui.label(egui::RichText::new(&analysis.category).strong().size(16.0));
                ui.label(analysis.summary.as_str());
                if !analysis.entities.is_empty() {
                    ui.add_space(4.0);
                    egui::Grid::new("lens_entities").striped(true).show(ui, |ui| {
                        for entity in &analysis.entities {
                            ui.label(egui::RichText::new(&entity.label).strong());
                            ui.label(entity.value.as_str());
                            ui.end_row();
                        }
                    });
                }
            });
        }

        let mut copy = None;
        if let Some(text) = &self.lens.text {
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("Extracted text").strong());
                if ui.small_button("Copy").clicked() {
                    copy = Some(text.clone());
                }
            });
            egui::Frame::group(ui.style()).inner_margin(8.0).show(ui, |ui| {
                ui.label(egui::RichText::new(text).monospace());
            });
        }
        if let Some(text) = copy {
            ui.ctx().copy_text(text);
        }
    }
}
