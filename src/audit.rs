//! Directory auditor: depth-first walk of a user-granted root, classifying
//! every file by name and counting every entry.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::rules::{RuleSet, Verdict};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
}

/// One item found during an audit.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DirectoryEntry {
    /// Absolute path, used for remediation.
    pub path: PathBuf,
    /// Path segments from the audit root down to this entry.
    pub segments: Vec<String>,
    pub kind: EntryKind,
    pub name: String,
    pub size_bytes: u64,
}

impl DirectoryEntry {
    pub fn new(root: &Path, path: PathBuf, kind: EntryKind, size_bytes: u64) -> Self {
        let segments: Vec<String> = path
            .strip_prefix(root)
            .unwrap_or(&path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path,
            segments,
            kind,
            name,
            size_bytes,
        }
    }

    pub fn relative_display(&self) -> String {
        self.segments.join("/")
    }
}

/// One step of a traversal as produced by the walker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Visit {
    Entry(DirectoryEntry),
    Unreadable { path: PathBuf, reason: String },
}

/// Incremental progress delivered to the caller in traversal order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuditEvent {
    Entered(DirectoryEntry),
    Classified {
        entry: DirectoryEntry,
        verdict: Verdict,
    },
    Unreadable {
        path: PathBuf,
        reason: String,
    },
}

/// Result of auditing one root.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuditReport {
    pub root: PathBuf,
    /// Files and directories reached, the root itself excluded.
    pub files_visited: usize,
    pub junk_matches: Vec<DirectoryEntry>,
    pub risk_matches: Vec<DirectoryEntry>,
    /// Entries skipped because the platform refused to read them.
    pub unreadable: usize,
    pub cancelled: bool,
}

impl AuditReport {
    pub fn junk_bytes(&self) -> u64 {
        self.junk_matches.iter().map(|e| e.size_bytes).sum()
    }

    pub fn risk_bytes(&self) -> u64 {
        self.risk_matches.iter().map(|e| e.size_bytes).sum()
    }
}

#[derive(Clone, Debug, Default)]
pub struct CancelFlag {
    inner: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.load(Ordering::Relaxed)
    }
}

/// Tracks which roots currently have an audit running.
#[derive(Clone, Debug, Default)]
pub struct AuditRegistry {
    in_flight: Arc<Mutex<HashSet<PathBuf>>>,
}

/// Held for the lifetime of one audit; releases the root on drop.
#[derive(Debug)]
pub struct AuditGuard {
    registry: AuditRegistry,
    root: PathBuf,
}

impl AuditRegistry {
    pub fn begin(&self, root: &Path) -> Result<AuditGuard> {
        let key = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        let mut guard = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if !guard.insert(key.clone()) {
            return Err(Error::AuditInProgress(root.to_path_buf()));
        }
        Ok(AuditGuard {
            registry: self.clone(),
            root: key,
        })
    }

    pub fn is_running(&self, root: &Path) -> bool {
        let key = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&key)
    }
}

impl Drop for AuditGuard {
    fn drop(&mut self) {
        self.registry
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.root);
    }
}

/// Walk `root` depth-first without following links. Siblings are sorted by
/// file name so two walks of an unchanged tree agree.
pub fn walk(root: &Path) -> impl Iterator<Item = Visit> {
    let base = root.to_path_buf();
    WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .map(move |item| match item {
            Ok(entry) => {
                let kind = if entry.file_type().is_dir() {
                    EntryKind::Directory
                } else {
                    EntryKind::File
                };
                match entry.metadata() {
                    Ok(meta) => {
                        let size = if kind == EntryKind::File { meta.len() } else { 0 };
                        Visit::Entry(DirectoryEntry::new(
                            &base,
                            entry.into_path(),
                            kind,
                            size,
                        ))
                    }
                    Err(e) => Visit::Unreadable {
                        path: entry.into_path(),
                        reason: e.to_string(),
                    },
                }
            }
            Err(e) => Visit::Unreadable {
                path: e.path().map(Path::to_path_buf).unwrap_or_else(|| base.clone()),
                reason: e
                    .io_error()
                    .map(|io| io.to_string())
                    .unwrap_or_else(|| e.to_string()),
            },
        })
}

pub struct Auditor {
    rules: RuleSet,
    registry: AuditRegistry,
}

impl Auditor {
    pub fn new(rules: RuleSet) -> Self {
        Self::with_registry(rules, AuditRegistry::default())
    }

    pub fn with_registry(rules: RuleSet, registry: AuditRegistry) -> Self {
        Self { rules, registry }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn registry(&self) -> &AuditRegistry {
        &self.registry
    }

    /// Audit a directory on disk.
    ///
    /// Fails only if `root` cannot be opened or another audit of the same
    /// root is still running. Unreadable entries below the root are skipped
    /// and counted.
    pub fn audit(
        &self,
        root: &Path,
        cancel: &CancelFlag,
        on_event: impl FnMut(&AuditEvent),
    ) -> Result<AuditReport> {
        let meta = std::fs::metadata(root).map_err(|e| Error::access_denied(root, e))?;
        if !meta.is_dir() {
            return Err(Error::access_denied(root, "not a directory"));
        }
        std::fs::read_dir(root).map_err(|e| Error::access_denied(root, e))?;

        let _guard = self.registry.begin(root)?;
        info!(root = %root.display(), "audit started");
        let report = self.classify_visits(root, walk(root), cancel, on_event);
        info!(
            root = %root.display(),
            visited = report.files_visited,
            junk = report.junk_matches.len(),
            risk = report.risk_matches.len(),
            unreadable = report.unreadable,
            cancelled = report.cancelled,
            "audit finished"
        );
        Ok(report)
    }

    /// Fold a traversal into a report. Stops before the next visit once
    /// `cancel` is set.
    pub fn classify_visits(
        &self,
        root: &Path,
        visits: impl IntoIterator<Item = Visit>,
        cancel: &CancelFlag,
        mut on_event: impl FnMut(&AuditEvent),
    ) -> AuditReport {
        let mut report = AuditReport {
            root: root.to_path_buf(),
            ..AuditReport::default()
        };

        for visit in visits {
            if cancel.is_cancelled() {
                debug!(root = %root.display(), "audit cancelled");
                report.cancelled = true;
                break;
            }

            match visit {
                Visit::Entry(entry) => {
                    report.files_visited += 1;
                    match entry.kind {
                        EntryKind::Directory => on_event(&AuditEvent::Entered(entry)),
                        EntryKind::File => {
                            let verdict = self.rules.classify(&entry.name);
                            if verdict.junk {
                                report.junk_matches.push(entry.clone());
                            }
                            if verdict.risk {
                                report.risk_matches.push(entry.clone());
                            }
                            on_event(&AuditEvent::Classified { entry, verdict });
                        }
                    }
                }
                Visit::Unreadable { path, reason } => {
                    warn!(path = %path.display(), %reason, "skipping unreadable entry");
                    report.unreadable += 1;
                    on_event(&AuditEvent::Unreadable { path, reason });
                }
            }
        }

        report
    }
}
