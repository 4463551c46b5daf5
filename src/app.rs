mod codes;
mod device;
mod lens;
mod overlays;
mod security;
mod settings;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use eframe::egui;
use tracing::{error, warn};

use crate::analysis::{DocumentAnalysis, DocumentAnalyzer, GeminiAnalyzer};
use crate::audit::{AuditEvent, AuditReport, Auditor, CancelFlag, DirectoryEntry};
use crate::capabilities::PlatformCapabilities;
use crate::config::AppConfig;
use crate::definitions::{DefinitionCache, DefinitionRecord};
use crate::i18n::{tr, Text};
use crate::network::{self, NetworkMeter};
use crate::prefs::{PreferenceStore, Theme, UserPreferences};
use crate::remediation::{self, Confirmation, FsRemover, RemovalReport};
use crate::rules::RuleSet;
use crate::widget::Widget;

/// Messages sent from background threads to the UI thread.
pub enum BgMessage {
    Audit(AuditEvent),
    AuditFinished(Result<AuditReport, String>),
    RemediationFinished(Result<RemovalReport, String>),
    DefinitionsChecked(bool),
    DefinitionsUpdated(Result<DefinitionRecord, String>),
    LensText(Result<String, String>),
    LensAnalysis(Result<DocumentAnalysis, String>),
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Security,
    Lens,
    Codes,
    Device,
    Settings,
}

impl Tab {
    const ALL: [Tab; 5] = [Tab::Security, Tab::Lens, Tab::Codes, Tab::Device, Tab::Settings];

    fn text(self) -> Text {
        match self {
            Tab::Security => Text::TabSecurity,
            Tab::Lens => Text::TabLens,
            Tab::Codes => Text::TabCodes,
            Tab::Device => Text::TabDevice,
            Tab::Settings => Text::TabSettings,
        }
    }
}

#[derive(PartialEq)]
pub enum AuditPhase {
    Idle,
    Auditing,
    Removing,
}

/// What the confirmation dialog is about to delete.
pub enum PendingRemoval {
    Selected(Vec<DirectoryEntry>),
    Format(PathBuf),
}

pub struct SecurityState {
    root: Option<PathBuf>,
    phase: AuditPhase,
    cancel: Option<CancelFlag>,
    progress_label: String,
    live_visited: usize,
    live_unreadable: usize,
    report: Option<AuditReport>,
    junk_selected: Vec<bool>,
    risk_selected: Vec<bool>,
    pending: Option<PendingRemoval>,
    last_removal: Option<RemovalReport>,
    definitions: DefinitionRecord,
    update_available: Option<bool>,
    definitions_busy: bool,
}

impl SecurityState {
    fn new(definitions: DefinitionRecord) -> Self {
        Self {
            root: None,
            phase: AuditPhase::Idle,
            cancel: None,
            progress_label: String::new(),
            live_visited: 0,
            live_unreadable: 0,
            report: None,
            junk_selected: vec![],
            risk_selected: vec![],
            pending: None,
            last_removal: None,
            definitions,
            update_available: None,
            definitions_busy: false,
        }
    }

    /// Selected entries from both lists, each path at most once.
    fn selected_entries(&self) -> Vec<DirectoryEntry> {
        let Some(report) = &self.report else {
            return vec![];
        };
        let mut seen: HashSet<&Path> = HashSet::new();
        let mut picked = Vec::new();
        let lists = [
            (&report.junk_matches, &self.junk_selected),
            (&report.risk_matches, &self.risk_selected),
        ];
        for (entries, selected) in lists {
            for (entry, sel) in entries.iter().zip(selected.iter()) {
                if *sel && seen.insert(entry.path.as_path()) {
                    picked.push(entry.clone());
                }
            }
        }
        picked
    }

    /// Drop removed entries, and anything below a removed directory, from
    /// both result lists.
    fn prune_removed(&mut self, removed: &[DirectoryEntry]) {
        let Some(report) = &mut self.report else {
            return;
        };
        let removed: HashSet<&Path> = removed.iter().map(|r| r.path.as_path()).collect();
        let gone = |e: &DirectoryEntry| e.path.ancestors().any(|a| removed.contains(a));
        retain_unremoved(&mut report.junk_matches, &mut self.junk_selected, gone);
        retain_unremoved(&mut report.risk_matches, &mut self.risk_selected, gone);
    }

    fn has_selection(&self) -> bool {
        self.junk_selected.contains(&true) || self.risk_selected.contains(&true)
    }
}

#[derive(Default)]
pub struct LensState {
    image: Option<PathBuf>,
    busy: bool,
    text: Option<String>,
    analysis: Option<DocumentAnalysis>,
}

#[derive(Default)]
pub struct PaymentDialog {
    visible: bool,
    code: String,
    error: Option<String>,
}

pub struct PhoneMasterApp {
    config: AppConfig,
    store: Arc<PreferenceStore>,
    prefs: UserPreferences,
    caps: PlatformCapabilities,
    auditor: Arc<Auditor>,
    definitions: Arc<DefinitionCache>,
    widget: Option<Widget>,
    tab: Tab,
    security: SecurityState,
    lens: LensState,
    codes_query: String,
    copied_code: Option<&'static str>,
    payment: PaymentDialog,
    sender: mpsc::Sender<BgMessage>,
    receiver: mpsc::Receiver<BgMessage>,
    errors: Vec<String>,
    network: Option<NetworkMeter>,
}

impl PhoneMasterApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: AppConfig,
        store: Arc<PreferenceStore>,
        caps: PlatformCapabilities,
    ) -> Self {
        let prefs = UserPreferences::load(&store);
        let auditor = Arc::new(Auditor::new(RuleSet::with_risk_markers(
            &config.risk_markers[..],
        )));

        let mut errors = Vec::new();
        let definitions = match DefinitionCache::from_config(Arc::clone(&store), &config) {
            Ok(cache) => cache,
            Err(e) => {
                warn!(error = %e, "falling back to built-in definitions feed");
                errors.push(e.to_string());
                DefinitionCache::new(
                    Arc::clone(&store),
                    Box::new(crate::definitions::StaticFeed),
                )
            }
        };
        let definitions = Arc::new(definitions);

        let widget = if prefs.widget_enabled {
            Widget::new(&caps)
        } else {
            None
        };

        apply_theme(&cc.egui_ctx, prefs.theme);
        let network = prefs.speed_overlay.then(NetworkMeter::new);

        let (sender, receiver) = mpsc::channel();
        let mut app = Self {
            security: SecurityState::new(definitions.local_record()),
            config,
            store,
            prefs,
            caps,
            auditor,
            definitions,
            widget,
            tab: Tab::Security,
            lens: LensState::default(),
            codes_query: String::new(),
            copied_code: None,
            payment: PaymentDialog::default(),
            sender,
            receiver,
            errors,
            network,
        };
        app.refresh_definitions_on_launch();
        app
    }

    fn start_audit(&mut self) {
        let Some(root) = self.security.root.clone() else {
            return;
        };
        let state = &mut self.security;
        state.phase = AuditPhase::Auditing;
        state.progress_label = "Starting scan...".to_string();
        state.live_visited = 0;
        state.live_unreadable = 0;
        state.report = None;
        state.junk_selected.clear();
        state.risk_selected.clear();
        state.last_removal = None;

        let cancel = CancelFlag::new();
        state.cancel = Some(cancel.clone());

        let tx = self.sender.clone();
        let auditor = Arc::clone(&self.auditor);
        std::thread::spawn(move || {
            let events = tx.clone();
            let result = auditor.audit(&root, &cancel, |event| {
                let _ = events.send(BgMessage::Audit(event.clone()));
            });
            let _ = tx.send(BgMessage::AuditFinished(result.map_err(|e| e.to_string())));
        });
    }

    /// Runs only with a confirmation taken from the dialog.
    fn start_remediation(&mut self, confirmation: Confirmation, pending: PendingRemoval) {
        self.security.phase = AuditPhase::Removing;
        self.security.progress_label = "Deleting...".to_string();

        let tx = self.sender.clone();
        std::thread::spawn(move || {
            let result = match pending {
                PendingRemoval::Selected(entries) => {
                    Ok(remediation::remove(&confirmation, &entries, &FsRemover))
                }
                PendingRemoval::Format(root) => {
                    remediation::format_root(&confirmation, &root, &FsRemover)
                        .map_err(|e| e.to_string())
                }
            };
            let _ = tx.send(BgMessage::RemediationFinished(result));
        });
    }

    fn check_definitions(&mut self) {
        self.security.definitions_busy = true;
        let tx = self.sender.clone();
        let cache = Arc::clone(&self.definitions);
        std::thread::spawn(move || {
            let _ = tx.send(BgMessage::DefinitionsChecked(cache.update_due()));
        });
    }

    /// Bring definitions up to date in the background once per launch.
    fn refresh_definitions_on_launch(&mut self) {
        self.security.definitions_busy = true;
        let tx = self.sender.clone();
        let cache = Arc::clone(&self.definitions);
        std::thread::spawn(move || {
            let _ = tx.send(launch_definitions_job(&cache));
        });
    }

    fn update_definitions(&mut self) {
        self.security.definitions_busy = true;
        let tx = self.sender.clone();
        let cache = Arc::clone(&self.definitions);
        std::thread::spawn(move || {
            let result = cache.apply_update().map_err(|e| e.to_string());
            let _ = tx.send(BgMessage::DefinitionsUpdated(result));
        });
    }

    fn start_lens(&mut self, structured: bool) {
        let Some(path) = self.lens.image.clone() else {
            return;
        };
        let analyzer = match GeminiAnalyzer::from_config(&self.config) {
            Ok(a) => a,
            Err(e) => {
                self.errors.push(e.to_string());
                return;
            }
        };
        self.lens.busy = true;
        self.lens.text = None;
        self.lens.analysis = None;

        let tx = self.sender.clone();
        std::thread::spawn(move || {
            let image = match std::fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    let msg = format!("Cannot read {}: {e}", path.display());
                    let _ = tx.send(if structured {
                        BgMessage::LensAnalysis(Err(msg))
                    } else {
                        BgMessage::LensText(Err(msg))
                    });
                    return;
                }
            };
            if structured {
                let result = analyzer.analyze(&image).map_err(|e| e.to_string());
                let _ = tx.send(BgMessage::LensAnalysis(result));
            } else {
                let result = analyzer.extract_text(&image).map_err(|e| e.to_string());
                let _ = tx.send(BgMessage::LensText(result));
            }
        });
    }

    fn drain_messages(&mut self) {
        while let Ok(msg) = self.receiver.try_recv() {
            match msg {
                BgMessage::Audit(event) => {
                    let state = &mut self.security;
                    match event {
                        AuditEvent::Entered(entry) => {
                            state.live_visited += 1;
                            state.progress_label = entry.relative_display();
                        }
                        AuditEvent::Classified { entry, .. } => {
                            state.live_visited += 1;
                            state.progress_label = entry.relative_display();
                        }
                        AuditEvent::Unreadable { .. } => state.live_unreadable += 1,
                    }
                }
                BgMessage::AuditFinished(result) => {
                    let state = &mut self.security;
                    state.phase = AuditPhase::Idle;
                    state.cancel = None;
                    state.progress_label.clear();
                    match result {
                        Ok(report) => {
                            state.junk_selected = vec![true; report.junk_matches.len()];
                            // Risky files stay unticked until the user opts in.
                            state.risk_selected = vec![false; report.risk_matches.len()];
                            state.report = Some(report);
                        }
                        Err(e) => self.errors.push(e),
                    }
                }
                BgMessage::RemediationFinished(result) => {
                    let state = &mut self.security;
                    state.phase = AuditPhase::Idle;
                    state.progress_label.clear();
                    match result {
                        Ok(report) => {
                            for failed in &report.failed {
                                self.errors.push(failed.to_error().to_string());
                            }
                            state.prune_removed(&report.removed);
                            state.last_removal = Some(report);
                        }
                        Err(e) => self.errors.push(e),
                    }
                }
                BgMessage::DefinitionsChecked(available) => {
                    self.security.definitions_busy = false;
                    self.security.update_available = Some(available);
                }
                BgMessage::DefinitionsUpdated(result) => {
                    self.security.definitions_busy = false;
                    match result {
                        Ok(record) => {
                            self.security.definitions = record;
                            self.security.update_available = Some(false);
                        }
                        Err(e) => self.errors.push(e),
                    }
                }
                BgMessage::LensText(result) => {
                    self.lens.busy = false;
                    match result {
                        Ok(text) => self.lens.text = Some(text),
                        Err(e) => self.errors.push(e),
                    }
                }
                BgMessage::LensAnalysis(result) => {
                    self.lens.busy = false;
                    match result {
                        Ok(analysis) => self.lens.analysis = Some(analysis),
                        Err(e) => self.errors.push(e),
                    }
                }
            }
        }
    }

    fn is_busy(&self) -> bool {
        self.security.phase != AuditPhase::Idle
            || self.security.definitions_busy
            || self.lens.busy
    }

    /// Persist a preference change; failures surface in the warnings list.
    fn persist(&mut self, result: crate::error::Result<()>) {
        if let Err(e) = result {
            error!(error = %e, "could not save preference");
            self.errors.push(e.to_string());
        }
    }

    fn render_tab_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            for tab in Tab::ALL {
                let label = tr(self.prefs.language, tab.text());
                if ui.selectable_label(self.tab == tab, label).clicked() {
                    self.tab = tab;
                }
            }
        });
    }

    fn render_errors(&mut self, ui: &mut egui::Ui) {
        if self.errors.is_empty() {
            return;
        }
        ui.add_space(4.0);
        let mut clear = false;
        egui::CollapsingHeader::new(
            egui::RichText::new(format!("Warnings ({})", self.errors.len()))
                .color(egui::Color32::from_rgb(220, 150, 50)),
        )
        .default_open(true)
        .show(ui, |ui| {
            for err in &self.errors {
                ui.label(egui::RichText::new(err).color(egui::Color32::from_rgb(220, 100, 50)));
            }
            if ui.small_button("Dismiss").clicked() {
                clear = true;
            }
        });
        if clear {
            self.errors.clear();
        }
    }
}

/// Applies an update only when one is due. A failed check means "up to date".
fn launch_definitions_job(cache: &DefinitionCache) -> BgMessage {
    if cache.update_due() {
        BgMessage::DefinitionsUpdated(cache.apply_update().map_err(|e| e.to_string()))
    } else {
        BgMessage::DefinitionsChecked(false)
    }
}

fn retain_unremoved(
    entries: &mut Vec<DirectoryEntry>,
    selected: &mut Vec<bool>,
    gone: impl Fn(&DirectoryEntry) -> bool,
) {
    let mut kept_entries = Vec::with_capacity(entries.len());
    let mut kept_selected = Vec::with_capacity(selected.len());
    for (entry, sel) in entries.drain(..).zip(selected.drain(..)) {
        if !gone(&entry) {
            kept_entries.push(entry);
            kept_selected.push(sel);
        }
    }
    *entries = kept_entries;
    *selected = kept_selected;
}

fn render_speed_strip(ui: &mut egui::Ui, meter: &NetworkMeter) {
    ui.horizontal(|ui| {
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            match meter.current() {
                Some(rate) => {
                    ui.label(
                        egui::RichText::new(format!("\u{2191} {}", network::format_rate(rate.up_bps)))
                            .monospace()
                            .color(egui::Color32::from_rgb(100, 160, 220)),
                    );
                    ui.label(
                        egui::RichText::new(format!("\u{2193} {}", network::format_rate(rate.down_bps)))
                            .monospace()
                            .color(egui::Color32::from_rgb(80, 200, 80)),
                    );
                }
                None => {
                    ui.label(egui::RichText::new("measuring...").small().color(egui::Color32::GRAY));
                }
            }
        });
    });
}

fn apply_theme(ctx: &egui::Context, theme: Theme) {
    ctx.set_visuals(match theme {
        Theme::Dark => egui::Visuals::dark(),
        Theme::Light => egui::Visuals::light(),
    });
}

impl eframe::App for PhoneMasterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_messages();

        if let Some(widget) = &mut self.widget {
            widget.tick(&mut self.caps);
        }

        if self.is_busy() {
            ctx.request_repaint();
        }
        if let Some(meter) = &mut self.network {
            meter.tick();
            ctx.request_repaint_after(network::SAMPLE_EVERY);
        }
        if self.widget.is_some() {
            ctx.request_repaint_after(Duration::from_secs(30));
        }

        if !self.prefs.onboarding_seen {
            self.render_onboarding(ctx);
        } else if self.security.pending.is_some() {
            self.render_confirm_dialog(ctx);
        } else if self.payment.visible {
            self.render_payment_dialog(ctx);
        }

        if let Some(meter) = &self.network {
            egui::TopBottomPanel::top("speed_overlay").show(ctx, |ui| {
                render_speed_strip(ui, meter);
            });
        }

        egui::TopBottomPanel::bottom("tab_bar").show(ctx, |ui| {
            ui.add_space(4.0);
            self.render_tab_bar(ui);
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    match self.tab {
                        Tab::Security => self.render_security(ui),
                        Tab::Lens => self.render_lens(ui),
                        Tab::Codes => self.render_codes(ui),
                        Tab::Device => self.render_device(ui),
                        Tab::Settings => self.render_settings(ctx, ui),
                    }
                    self.render_errors(ui);
                });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::EntryKind;
    use std::time::{Duration, Instant};

    fn entry(name: &str) -> DirectoryEntry {
        let root = Path::new("/card");
        DirectoryEntry::new(root, root.join(name), EntryKind::File, 1)
    }

    #[test]
    fn selection_merges_lists_without_duplicates() {
        let mut state = SecurityState::new(DefinitionRecord::seed(0));
        let both = entry("payload.tmp");
        state.report = Some(AuditReport {
            junk_matches: vec![entry("a.tmp"), both.clone()],
            risk_matches: vec![both.clone(), entry("evil.exe")],
            ..AuditReport::default()
        });
        state.junk_selected = vec![false, true];
        state.risk_selected = vec![true, true];

        let picked = state.selected_entries();
        assert_eq!(picked, vec![both, entry("evil.exe")]);
    }

    #[test]
    fn removed_entries_leave_the_lists() {
        let mut entries = vec![entry("a.tmp"), entry("b.tmp")];
        let mut selected = vec![true, false];
        let removed = entry("a.tmp");
        retain_unremoved(&mut entries, &mut selected, |e| e.path == removed.path);
        assert_eq!(entries, vec![entry("b.tmp")]);
        assert_eq!(selected, vec![false]);
    }

    #[test]
    fn large_overlapping_selection_is_linear() {
        let mut state = SecurityState::new(DefinitionRecord::seed(0));
        let junk: Vec<DirectoryEntry> = (0..50_000).map(|i| entry(&format!("f{i}.tmp"))).collect();
        // Every other junk file is also risky, plus some risk-only files.
        let mut risk: Vec<DirectoryEntry> = junk.iter().step_by(2).cloned().collect();
        risk.extend((0..1_000).map(|i| entry(&format!("x{i}.exe"))));
        state.junk_selected = vec![true; junk.len()];
        state.risk_selected = vec![true; risk.len()];
        state.report = Some(AuditReport {
            junk_matches: junk,
            risk_matches: risk,
            ..AuditReport::default()
        });

        let started = Instant::now();
        let picked = state.selected_entries();
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(picked.len(), 51_000);
        assert!(state.has_selection());
    }

    #[test]
    fn removing_a_directory_prunes_everything_below_it() {
        let mut state = SecurityState::new(DefinitionRecord::seed(0));
        let root = Path::new("/card");
        let cache_dir = DirectoryEntry::new(root, root.join("cache"), EntryKind::Directory, 0);
        state.report = Some(AuditReport {
            junk_matches: vec![entry("cache/a.tmp"), entry("b.log")],
            risk_matches: vec![entry("cache/evil.exe")],
            ..AuditReport::default()
        });
        state.junk_selected = vec![true, false];
        state.risk_selected = vec![false];

        state.prune_removed(&[cache_dir]);

        let report = state.report.as_ref().unwrap();
        assert_eq!(report.junk_matches, vec![entry("b.log")]);
        assert!(report.risk_matches.is_empty());
        assert_eq!(state.junk_selected, vec![false]);
        assert!(!state.has_selection());
    }

    struct Offline;

    impl crate::definitions::DefinitionFeed for Offline {
        fn latest(&self) -> crate::error::Result<crate::definitions::RemoteDefinitions> {
            Err(crate::error::Error::UpdateCheckFailed("offline".to_string()))
        }
    }

    fn cache(dir: &tempfile::TempDir, feed: Box<dyn crate::definitions::DefinitionFeed>) -> DefinitionCache {
        let store = PreferenceStore::open(dir.path().join("preferences.json")).unwrap();
        DefinitionCache::new(Arc::new(store), feed)
    }

    #[test]
    fn launch_applies_a_due_update() {
        let dir = tempfile::TempDir::new().unwrap();
        let cache = cache(&dir, Box::new(crate::definitions::StaticFeed));
        match launch_definitions_job(&cache) {
            BgMessage::DefinitionsUpdated(Ok(record)) => {
                assert_eq!(record.version, crate::definitions::REMOTE_VERSION);
            }
            _ => panic!("expected an applied update"),
        }
        assert_eq!(cache.local_record().version, crate::definitions::REMOTE_VERSION);
        assert!(matches!(launch_definitions_job(&cache), BgMessage::DefinitionsChecked(false)));
    }

    #[test]
    fn launch_with_unreachable_feed_keeps_the_seed() {
        let dir = tempfile::TempDir::new().unwrap();
        let cache = cache(&dir, Box::new(Offline));
        assert!(matches!(launch_definitions_job(&cache), BgMessage::DefinitionsChecked(false)));
        assert_eq!(cache.local_record().version, crate::definitions::SEED_VERSION);
    }
}
