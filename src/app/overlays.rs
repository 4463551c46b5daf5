use eframe::egui;

use super::PhoneMasterApp;
use crate::payment::{self, EXAMPLE_CODE};

/// Darkens the window and swallows clicks behind a modal.
pub(super) fn dim_background(ctx: &egui::Context, id: &str) {
    egui::Area::new(egui::Id::new(id))
        .fixed_pos(egui::Pos2::ZERO)
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            let screen = ui.ctx().screen_rect();
            ui.allocate_rect(screen, egui::Sense::click());
            ui.painter()
                .rect_filled(screen, 0.0, egui::Color32::from_black_alpha(160));
        });
}

/// Centered, untitled window drawn above the dimmed background.
pub(super) fn modal(id: &str, width: f32) -> egui::Window<'static> {
    egui::Window::new(id)
        .id(egui::Id::new(id))
        .title_bar(false)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([width, 0.0])
        .order(egui::Order::Foreground)
}

impl PhoneMasterApp {
    pub(super) fn render_onboarding(&mut self, ctx: &egui::Context) {
        dim_background(ctx, "onboarding_overlay");

        let mut done = false;
        modal("onboarding", 380.0).show(ctx, |ui| {
            ui.add_space(8.0);
            ui.vertical_centered(|ui| {
                ui.label(egui::RichText::new("Welcome to Phone Master").size(20.0).strong());
            });
            ui.add_space(8.0);
            for line in [
                "Scan a folder for junk and suspicious files, then delete what you pick.",
                "Nothing is deleted until you confirm it.",
                "AI Lens turns photos of receipts and documents into text.",
                "Codes lists hidden dialer codes you can copy.",
            ] {
                ui.label(format!("\u{2022} {line}"));
            }
            ui.add_space(12.0);
            ui.vertical_centered(|ui| {
                if ui.add_sized([160.0, 32.0], egui::Button::new("Get Started")).clicked() {
                    done = true;
                }
            });
            ui.add_space(8.0);
        });

        if done {
            let result = self.prefs.mark_onboarding_seen(&self.store);
            self.persist(result);
            // Dismiss for this session even if the flag could not be saved.
            self.prefs.onboarding_seen = true;
        }
    }

    pub(super) fn render_payment_dialog(&mut self, ctx: &egui::Context) {
        dim_background(ctx, "payment_overlay");

        let mut submit = false;
        let mut close = false;
        modal("payment", 360.0).show(ctx, |ui| {
            ui.add_space(8.0);
            ui.vertical_centered(|ui| {
                ui.label(egui::RichText::new("Unlock Premium").size(18.0).strong());
            });
            ui.add_space(8.0);
            ui.label("Pay with M-PESA, then enter the transaction code from the confirmation SMS.");
            ui.add_space(6.0);
            let input = ui.add(
                egui::TextEdit::singleline(&mut self.payment.code).hint_text(EXAMPLE_CODE),
            );
            if input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                submit = true;
            }
            if let Some(err) = &self.payment.error {
                ui.label(egui::RichText::new(err).color(egui::Color32::from_rgb(220, 60, 60)));
            }
            ui.add_space(12.0);
            ui.columns(2, |cols| {
                cols[0].vertical_centered(|ui| {
                    if ui.add_sized([140.0, 32.0], egui::Button::new("Close")).clicked() {
                        close = true;
                    }
                });
                cols[1].vertical_centered(|ui| {
                    if ui.add_sized([140.0, 32.0], egui::Button::new("Verify")).clicked() {
                        submit = true;
                    }
                });
            });
            ui.add_space(8.0);
        });

        if submit {
            match payment::unlock_premium(&mut self.prefs, &self.store, &self.payment.code) {
                Ok(()) => close = true,
                Err(e) => self.payment.error = Some(e.to_string()),
            }
        }
        if close {
            self.payment = Default::default();
        }
    }
}
