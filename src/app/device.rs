use eframe::egui;

use super::PhoneMasterApp;
use crate::i18n::{tr, Text};
use crate::network;
use crate::utils;
use crate::widget;

fn usage_color(fraction: f32) -> egui::Color32 {
    if fraction > 0.9 {
        egui::Color32::from_rgb(220, 60, 60)
    } else if fraction > 0.7 {
        egui::Color32::from_rgb(220, 180, 50)
    } else {
        egui::Color32::from_rgb(80, 200, 80)
    }
}

impl PhoneMasterApp {
    pub(super) fn render_device(&mut self, ui: &mut egui::Ui) {
        let lang = self.prefs.language;
        ui.add_space(8.0);
        ui.heading(egui::RichText::new(tr(lang, Text::TabDevice)).size(26.0).strong());
        ui.add_space(8.0);

        let unavailable = tr(lang, Text::Unavailable);

        ui.label(egui::RichText::new("Storage").strong());
        match self.caps.storage {
            Some(info) => {
                let fraction = info.usage_percent();
                ui.add(
                    egui::ProgressBar::new(fraction)
                        .fill(usage_color(fraction))
                        .text(widget::storage_line(&self.caps)),
                );
                ui.label(format!("{} free", utils::format_size(info.available)));
            }
            None => {
                ui.label(egui::RichText::new(unavailable).italics().color(egui::Color32::GRAY));
            }
        }
        ui.add_space(8.0);

        ui.label(egui::RichText::new("Memory").strong());
        match self.caps.memory {
            Some(mem) => {
                let fraction = mem.usage_percent() as f32 / 100.0;
                ui.add(
                    egui::ProgressBar::new(fraction)
                        .fill(usage_color(fraction))
                        .text(widget::memory_line(&self.caps)),
                );
            }
            None => {
                ui.label(egui::RichText::new(unavailable).italics().color(egui::Color32::GRAY));
            }
        }
        ui.add_space(8.0);

        ui.label(egui::RichText::new("Battery").strong());
        match self.caps.battery {
            Some(battery) => {
                let state = if battery.charging { "charging" } else { "on battery" };
                ui.add(
                    egui::ProgressBar::new(battery.level as f32 / 100.0)
                        .text(format!("{}% ({state})", battery.level)),
                );
            }
            None => {
                ui.label(egui::RichText::new(unavailable).italics().color(egui::Color32::GRAY));
            }
        }

        ui.add_space(8.0);
        ui.label(egui::RichText::new("Network").strong());
        match self.network.as_ref().and_then(|m| m.current()) {
            Some(rate) => {
                ui.label(format!(
                    "Down {}  Up {}",
                    network::format_rate(rate.down_bps),
                    network::format_rate(rate.up_bps)
                ));
            }
            None if self.network.is_some() => {
                ui.label(egui::RichText::new("measuring...").italics().color(egui::Color32::GRAY));
            }
            None => {
                ui.label(
                    egui::RichText::new("Turn on the speed overlay in Settings to measure.")
                        .italics()
                        .color(egui::Color32::GRAY),
                );
            }
        }

        ui.add_space(12.0);
        if ui.button("Refresh").clicked() {
            self.caps.refresh();
        }
    }
}
