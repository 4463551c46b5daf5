use eframe::egui;

use super::PhoneMasterApp;
use crate::codes;
use crate::i18n::{tr, Text};

impl PhoneMasterApp {
    pub(super) fn render_codes(&mut self, ui: &mut egui::Ui) {
        ui.add_space(8.0);
        ui.heading(
            egui::RichText::new(tr(self.prefs.language, Text::TabCodes))
                .size(26.0)
                .strong(),
        );
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            ui.label("Search:");
            ui.text_edit_singleline(&mut self.codes_query);
        });
        ui.add_space(6.0);

        let hits = codes::search(&self.codes_query);
        if hits.is_empty() {
            ui.label(egui::RichText::new("No matching codes.").italics().color(egui::Color32::GRAY));
            return;
        }

        for code in hits {
            egui::Frame::group(ui.style()).inner_margin(8.0).show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.vertical(|ui| {
                        ui.label(egui::RichText::new(code.title).strong());
                        ui.label(egui::RichText::new(code.description).color(egui::Color32::GRAY));
                        ui.label(
                            egui::RichText::new(code.category.label())
                                .small()
                                .color(egui::Color32::from_rgb(100, 160, 220)),
                        );
                    });
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let copied = self.copied_code == Some(code.code);
                        let label = if copied { "Copied" } else { "Copy" };
                        if ui.button(label).clicked() {
                            ui.ctx().copy_text(code.code.to_string());
                            self.copied_code = Some(code.code);
                        }
                        ui.label(egui::RichText::new(code.code).monospace().size(15.0));
                    });
                });
            });
        }
    }
}
