use eframe::egui;

use super::overlays::{dim_background, modal};
use super::{AuditPhase, PendingRemoval, PhoneMasterApp};
use crate::audit::DirectoryEntry;
use crate::i18n::{tr, Text};
use crate::remediation::Confirmation;
use crate::utils;

const GREEN: egui::Color32 = egui::Color32::from_rgb(80, 200, 80);
const AMBER: egui::Color32 = egui::Color32::from_rgb(220, 180, 50);
const RED: egui::Color32 = egui::Color32::from_rgb(220, 60, 60);
const MUTED: egui::Color32 = egui::Color32::from_rgb(160, 160, 170);

impl PhoneMasterApp {
    pub(super) fn render_security(&mut self, ui: &mut egui::Ui) {
        let lang = self.prefs.language;
        ui.add_space(8.0);
        ui.heading(egui::RichText::new(tr(lang, Text::TabSecurity)).size(26.0).strong());
        ui.add_space(8.0);

        self.render_definitions_card(ui);
        ui.separator();
        self.render_audit_controls(ui);
        ui.separator();
        self.render_audit_results(ui);
    }

    fn render_definitions_card(&mut self, ui: &mut egui::Ui) {
        let lang = self.prefs.language;
        egui::Frame::group(ui.style()).inner_margin(8.0).show(ui, |ui| {
            let defs = &self.security.definitions;
            ui.label(egui::RichText::new("Definitions").strong());
            ui.label(format!("Version: {}", defs.version));
            ui.label(format!("Signatures: {}", defs.total_signatures));
            ui.label(format!("Last update: {}", utils::format_epoch_ms(defs.last_update)));

            ui.horizontal(|ui| {
                let busy = self.security.definitions_busy;
                if ui
                    .add_enabled(!busy, egui::Button::new(tr(lang, Text::CheckUpdates)))
                    .clicked()
                {
                    self.check_definitions();
                }
                match self.security.update_available {
                    Some(true) => {
                        ui.label(egui::RichText::new("Update available").color(AMBER));
                        if ui.add_enabled(!busy, egui::Button::new("Update now")).clicked() {
                            self.update_definitions();
                        }
                    }
                    Some(false) => {
                        ui.label(egui::RichText::new("Up to date").color(GREEN));
                    }
                    None => {}
                }
                if busy {
                    ui.spinner();
                }
            });
        });
    }

    fn render_audit_controls(&mut self, ui: &mut egui::Ui) {
        let lang = self.prefs.language;
        let idle = self.security.phase == AuditPhase::Idle;

        ui.horizontal(|ui| {
            if ui
                .add_enabled(idle, egui::Button::new(tr(lang, Text::ChooseFolder)))
                .clicked()
            {
                if let Some(path) = rfd::FileDialog::new().pick_folder() {
                    self.security.root = Some(path);
                    self.security.report = None;
                }
            }
            match &self.security.root {
                Some(root) => ui.label(egui::RichText::new(utils::display_path(root)).color(MUTED)),
                None => ui.label(egui::RichText::new("No folder selected").italics().color(MUTED)),
            };
        });

        ui.horizontal(|ui| {
            let can_scan = idle && self.security.root.is_some();
            if ui
                .add_enabled(can_scan, egui::Button::new(tr(lang, Text::StartAudit)))
                .clicked()
            {
                self.start_audit();
            }

            if self.security.phase == AuditPhase::Auditing {
                if ui.button(tr(lang, Text::Cancel)).clicked() {
                    if let Some(cancel) = &self.security.cancel {
                        cancel.cancel();
                    }
                }
            }

            if !idle {
                ui.add_space(8.0);
                ui.spinner();
                ui.label(format!(
                    "{} ({} checked)",
                    self.security.progress_label, self.security.live_visited
                ));
            }
        });
    }

    fn render_audit_results(&mut self, ui: &mut egui::Ui) {
        let lang = self.prefs.language;
        let state = &mut self.security;
        let idle = state.phase == AuditPhase::Idle;

        let Some(report) = &state.report else {
            ui.label(
                egui::RichText::new("Not yet scanned. Choose a folder and press Scan.")
                    .italics()
                    .color(egui::Color32::GRAY),
            );
            return;
        };

        ui.label(format!("Entries checked: {}", report.files_visited));
        if report.unreadable > 0 {
            ui.label(
                egui::RichText::new(format!("{} entries could not be read", report.unreadable))
                    .color(AMBER),
            );
        }
        if report.cancelled {
            ui.label(egui::RichText::new("Scan was cancelled; results are partial.").color(AMBER));
        }

        ui.add_space(6.0);
        render_entry_list(
            ui,
            "junk",
            &format!(
                "Junk files ({}, {})",
                report.junk_matches.len(),
                utils::format_size(report.junk_bytes())
            ),
            &report.junk_matches,
            &mut state.junk_selected,
        );
        render_entry_list(
            ui,
            "risk",
            &format!(
                "Suspicious files ({}, {})",
                report.risk_matches.len(),
                utils::format_size(report.risk_bytes())
            ),
            &report.risk_matches,
            &mut state.risk_selected,
        );

        ui.add_space(6.0);
        let can_delete = idle && state.has_selection();
        let can_format = idle && state.root.is_some();
        let mut delete_clicked = false;
        let mut format_clicked = false;
        ui.horizontal(|ui| {
            let delete = egui::Button::new(
                egui::RichText::new(tr(lang, Text::DeleteSelected))
                    .color(if can_delete { RED } else { egui::Color32::GRAY }),
            );
            delete_clicked = ui.add_enabled(can_delete, delete).clicked();
            format_clicked = ui
                .add_enabled(can_format, egui::Button::new(tr(lang, Text::FormatFolder)))
                .clicked();
        });
        if delete_clicked {
            state.pending = Some(PendingRemoval::Selected(state.selected_entries()));
        } else if format_clicked {
            state.pending = state.root.clone().map(PendingRemoval::Format);
        }

        if let Some(last) = &state.last_removal {
            ui.add_space(4.0);
            ui.label(
                egui::RichText::new(format!(
                    "Last cleanup removed {} items and freed {}",
                    last.removed_count(),
                    utils::format_size(last.freed_bytes)
                ))
                .color(GREEN),
            );
            if !last.failed.is_empty() {
                ui.label(
                    egui::RichText::new(format!("{} items could not be removed", last.failed.len()))
                        .color(RED),
                );
            }
        }
    }

    pub(super) fn render_confirm_dialog(&mut self, ctx: &egui::Context) {
        let Some(pending) = &self.security.pending else {
            return;
        };
        let lang = self.prefs.language;
        let plan = RemovalPlan::describe(pending);

        dim_background(ctx, "confirm_overlay");
        let mut answer: Option<bool> = None;
        modal("confirm_removal", 360.0).show(ctx, |ui| {
            ui.add_space(8.0);
            ui.heading(egui::RichText::new("\u{26A0} Confirm Deletion").color(AMBER));
            ui.add_space(6.0);
            ui.label(plan.headline.as_str());

            if !plan.preview.is_empty() {
                ui.add_space(6.0);
                egui::ScrollArea::vertical().max_height(160.0).show(ui, |ui| {
                    for line in &plan.preview {
                        ui.monospace(line.as_str());
                    }
                });
            }
            if let Some(bytes) = plan.freed_bytes {
                ui.add_space(6.0);
                ui.label(
                    egui::RichText::new(format!("{} will be freed", utils::format_size(bytes)))
                        .strong()
                        .color(GREEN),
                );
            }
            ui.label(egui::RichText::new("This cannot be undone.").small().color(RED));
            ui.separator();

            ui.horizontal(|ui| {
                if ui.button(tr(lang, Text::Cancel)).clicked() {
                    answer = Some(false);
                }
                let delete = egui::Button::new(
                    egui::RichText::new("Delete").strong().color(egui::Color32::WHITE),
                )
                .fill(RED);
                if ui.add(delete).clicked() {
                    answer = Some(true);
                }
            });
            ui.add_space(4.0);
        });

        let Some(accepted) = answer else {
            return;
        };
        let pending = self.security.pending.take();
        if let (Some(confirmation), Some(pending)) = (Confirmation::from_user(accepted), pending) {
            self.start_remediation(confirmation, pending);
        }
    }
}

const PREVIEW_LINES: usize = 8;

/// Text shown in the confirmation dialog for a pending removal.
#[derive(Debug, PartialEq)]
struct RemovalPlan {
    headline: String,
    preview: Vec<String>,
    freed_bytes: Option<u64>,
}

impl RemovalPlan {
    fn describe(pending: &PendingRemoval) -> Self {
        match pending {
            PendingRemoval::Selected(entries) => {
                let mut preview: Vec<String> = entries
                    .iter()
                    .take(PREVIEW_LINES)
                    .map(DirectoryEntry::relative_display)
                    .collect();
                if entries.len() > PREVIEW_LINES {
                    preview.push(format!("... and {} more", entries.len() - PREVIEW_LINES));
                }
                Self {
                    headline: format!("Permanently delete {} items?", entries.len()),
                    preview,
                    freed_bytes: Some(entries.iter().map(|e| e.size_bytes).sum()),
                }
            }
            PendingRemoval::Format(root) => Self {
                headline: format!(
                    "Everything inside {} will be permanently deleted.",
                    utils::display_path(root)
                ),
                preview: vec![],
                freed_bytes: None,
            },
        }
    }
}

fn render_entry_list(
    ui: &mut egui::Ui,
    id: &str,
    title: &str,
    entries: &[DirectoryEntry],
    selected: &mut [bool],
) {
    egui::CollapsingHeader::new(egui::RichText::new(title).strong())
        .id_salt(id)
        .default_open(true)
        .show(ui, |ui| {
            if entries.is_empty() {
                ui.label(egui::RichText::new("Nothing found.").italics().color(egui::Color32::GRAY));
                return;
            }
            ui.horizontal(|ui| {
                if ui.small_button("Select All").clicked() {
                    selected.fill(true);
                }
                if ui.small_button("Select None").clicked() {
                    selected.fill(false);
                }
            });
            // Only the visible rows are laid out.
            let row_height = ui.spacing().interact_size.y;
            egui::ScrollArea::vertical()
                .id_salt(id)
                .max_height(row_height * 12.0)
                .auto_shrink([false, true])
                .show_rows(ui, row_height, entries.len(), |ui, rows| {
                    for i in rows {
                        let (Some(entry), Some(sel)) = (entries.get(i), selected.get_mut(i)) else {
                            continue;
                        };
                        ui.horizontal(|ui| {
                            ui.checkbox(sel, "");
                            ui.label(egui::RichText::new(entry.relative_display()).color(MUTED));
                            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                                ui.label(
                                    egui::RichText::new(utils::format_size(entry.size_bytes))
                                        .color(AMBER),
                                );
                            });
                        });
                    }
                });
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::EntryKind;
    use std::path::Path;

    fn entries(n: usize) -> Vec<DirectoryEntry> {
        let root = Path::new("/card");
        (0..n)
            .map(|i| DirectoryEntry::new(root, root.join(format!("f{i}.tmp")), EntryKind::File, 10))
            .collect()
    }

    #[test]
    fn long_selections_are_previewed_with_a_remainder() {
        let plan = RemovalPlan::describe(&PendingRemoval::Selected(entries(11)));
        assert_eq!(plan.headline, "Permanently delete 11 items?");
        assert_eq!(plan.preview.len(), PREVIEW_LINES + 1);
        assert_eq!(plan.preview[0], "f0.tmp");
        assert_eq!(plan.preview[PREVIEW_LINES], "... and 3 more");
        assert_eq!(plan.freed_bytes, Some(110));
    }

    #[test]
    fn format_plan_has_no_preview_or_size() {
        let plan = RemovalPlan::describe(&PendingRemoval::Format("/card/DCIM".into()));
        assert!(plan.headline.contains("DCIM"));
        assert!(plan.preview.is_empty());
        assert_eq!(plan.freed_bytes, None);
    }
}
