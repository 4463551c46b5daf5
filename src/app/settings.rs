use eframe::egui;

use super::{apply_theme, PhoneMasterApp};
use crate::i18n::{tr, Language, Text};
use crate::network::NetworkMeter;
use crate::payment;
use crate::prefs::Theme;
use crate::widget::Widget;

impl PhoneMasterApp {
    pub(super) fn render_settings(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let lang = self.prefs.language;
        ui.add_space(8.0);
        ui.heading(egui::RichText::new(tr(lang, Text::TabSettings)).size(26.0).strong());
        ui.add_space(8.0);

        let mut dark = self.prefs.theme == Theme::Dark;
        if ui.checkbox(&mut dark, "Dark mode").changed() {
            let theme = if dark { Theme::Dark } else { Theme::Light };
            let result = self.prefs.set_theme(&self.store, theme);
            if result.is_ok() {
                apply_theme(ctx, theme);
            }
            self.persist(result);
        }

        let mut language = lang;
        egui::ComboBox::from_label("Language")
            .selected_text(language.label())
            .show_ui(ui, |ui| {
                for option in Language::ALL {
                    ui.selectable_value(&mut language, option, option.label());
                }
            });
        if language != lang {
            let result = self.prefs.set_language(&self.store, language);
            self.persist(result);
        }

        ui.add_space(8.0);
        ui.separator();

        let mut widget_enabled = self.prefs.widget_enabled;
        let toggle = ui.add_enabled(
            self.caps.tray,
            egui::Checkbox::new(&mut widget_enabled, "Storage widget in system tray"),
        );
        if toggle.changed() {
            let result = self.prefs.set_widget_enabled(&self.store, widget_enabled);
            if result.is_ok() {
                self.widget = if widget_enabled {
                    Widget::new(&self.caps)
                } else {
                    None
                };
            }
            self.persist(result);
        }
        if !self.caps.tray {
            ui.label(
                egui::RichText::new(tr(lang, Text::Unavailable))
                    .small()
                    .color(egui::Color32::GRAY),
            );
        }

        let mut overlay = self.prefs.speed_overlay;
        if ui
            .checkbox(&mut overlay, "Network speed overlay")
            .on_hover_text("Live download and upload rate at the top of the window")
            .changed()
        {
            let result = self.prefs.set_speed_overlay(&self.store, overlay);
            if result.is_ok() {
                self.network = overlay.then(NetworkMeter::new);
            }
            self.persist(result);
        }

        ui.add_space(8.0);
        ui.separator();
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(tr(lang, Text::Premium)).strong());
            if self.prefs.premium_unlocked {
                ui.label(egui::RichText::new("Unlocked").color(egui::Color32::from_rgb(80, 200, 80)));
            } else if ui.button("Unlock").clicked() {
                self.payment.visible = true;
            }
        });

        ui.add_space(8.0);
        ui.separator();
        render_support(ui);

        ui.add_space(8.0);
        ui.label(
            egui::RichText::new(format!(
                "Preferences: {}",
                crate::utils::display_path(self.store.path())
            ))
            .small()
            .color(egui::Color32::GRAY),
        );
    }
}

fn render_support(ui: &mut egui::Ui) {
    ui.label(egui::RichText::new("Support the developer").strong());
    ui.horizontal(|ui| {
        ui.label(format!("M-PESA {}", payment::MPESA_NUMBER));
        if ui.small_button("Copy").clicked() {
            ui.ctx().copy_text(payment::MPESA_NUMBER.to_owned());
        }
        if ui.small_button("Dial").clicked() {
            ui.ctx().open_url(egui::OpenUrl::new_tab(payment::MPESA_USSD_URL));
        }
    });
    ui.horizontal(|ui| {
        ui.label(format!("PayPal {}", payment::PAYPAL_EMAIL));
        if ui.small_button("Copy").clicked() {
            ui.ctx().copy_text(payment::PAYPAL_EMAIL.to_owned());
        }
        if ui.small_button("Donate").clicked() {
            ui.ctx().open_url(egui::OpenUrl::new_tab(payment::paypal_donation_url()));
        }
    });
}
