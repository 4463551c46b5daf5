//! User-confirmed deletion of audited entries.
//!
//! Every destructive entry point takes a [`Confirmation`], and the only way
//! to obtain one is an explicit `true` answer from the user.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::audit::{DirectoryEntry, EntryKind};
use crate::error::{Error, Result};
use crate::utils;

/// Proof that the user agreed to a deletion. Not `Clone`, not `Default`.
#[derive(Debug)]
pub struct Confirmation {
    _private: (),
}

impl Confirmation {
    /// `None` unless the user explicitly said yes.
    pub fn from_user(accepted: bool) -> Option<Self> {
        accepted.then_some(Self { _private: () })
    }
}

/// Performs the actual removal of one entry. Returns bytes freed.
pub trait Remover {
    fn remove_entry(&self, entry: &DirectoryEntry) -> std::io::Result<u64>;
}

/// Deletes from the real file system; directories are removed recursively.
pub struct FsRemover;

impl Remover for FsRemover {
    fn remove_entry(&self, entry: &DirectoryEntry) -> std::io::Result<u64> {
        utils::safe_remove(&entry.path)
    }
}

#[derive(Debug)]
pub struct FailedRemoval {
    pub entry: DirectoryEntry,
    pub reason: String,
}

impl FailedRemoval {
    pub fn to_error(&self) -> Error {
        Error::RemovalFailed {
            path: self.entry.path.clone(),
            reason: self.reason.clone(),
        }
    }
}

#[derive(Debug, Default)]
pub struct RemovalReport {
    pub removed: Vec<DirectoryEntry>,
    pub freed_bytes: u64,
    pub failed: Vec<FailedRemoval>,
}

impl RemovalReport {
    pub fn removed_count(&self) -> usize {
        self.removed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Remove each entry independently; one failure never stops the rest.
/// Entries already removed earlier in the batch (e.g. a file inside a
/// directory removed before it) are reported as failed, not as removed.
pub fn remove(
    _confirmation: &Confirmation,
    entries: &[DirectoryEntry],
    remover: &dyn Remover,
) -> RemovalReport {
    let mut report = RemovalReport::default();

    for entry in entries {
        match remover.remove_entry(entry) {
            Ok(freed) => {
                info!(path = %entry.path.display(), freed, "removed");
                report.freed_bytes += freed;
                report.removed.push(entry.clone());
            }
            Err(e) => {
                warn!(path = %entry.path.display(), error = %e, "removal failed");
                report.failed.push(FailedRemoval {
                    entry: entry.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    report
}

/// Remove everything directly under `root`, each top-level entry on its own.
/// The root itself stays.
pub fn format_root(
    confirmation: &Confirmation,
    root: &Path,
    remover: &dyn Remover,
) -> Result<RemovalReport> {
    let read_dir = std::fs::read_dir(root).map_err(|e| Error::access_denied(root, e))?;

    let mut entries = Vec::new();
    let mut unlisted = Vec::new();
    for item in read_dir {
        match item {
            Ok(dir_entry) => {
                let path = dir_entry.path();
                let is_dir = dir_entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                let kind = if is_dir {
                    EntryKind::Directory
                } else {
                    EntryKind::File
                };
                let size = utils::entry_size(&path);
                entries.push(DirectoryEntry::new(root, path, kind, size));
            }
            Err(e) => unlisted.push(e),
        }
    }
    entries.sort_by(|a, b| a.path.cmp(&b.path));

    info!(root = %root.display(), count = entries.len(), "formatting folder");
    let mut report = remove(confirmation, &entries, remover);
    for e in unlisted {
        report.failed.push(FailedRemoval {
            entry: DirectoryEntry::new(root, PathBuf::from(root), EntryKind::Directory, 0),
            reason: format!("could not list entry: {e}"),
        });
    }
    Ok(report)
}
