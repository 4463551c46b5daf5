use std::fs;

use anyhow::{Context, Result};
use phonemaster::audit::{Auditor, CancelFlag};
use phonemaster::remediation::{self, Confirmation, FsRemover};
use phonemaster::rules::RuleSet;
use phonemaster::Error;
use tempfile::TempDir;

#[test]
fn declined_confirmation_yields_no_token() {
    assert!(Confirmation::from_user(false).is_none());
    assert!(Confirmation::from_user(true).is_some());
}

#[test]
fn selected_junk_is_removed_and_a_reaudit_no_longer_sees_it() -> Result<()> {
    let root = TempDir::new()?;
    fs::write(root.path().join("a.tmp"), b"12345")?;
    fs::write(root.path().join("b.txt"), b"hello")?;
    fs::create_dir(root.path().join("logs"))?;
    fs::write(root.path().join("logs").join("boot.log"), b"123")?;

    let auditor = Auditor::new(RuleSet::default());
    let report = auditor.audit(root.path(), &CancelFlag::new(), |_| {})?;
    assert_eq!(report.junk_matches.len(), 2);

    let confirmation = Confirmation::from_user(true).context("accepted")?;
    let removal = remediation::remove(&confirmation, &report.junk_matches, &FsRemover);
    assert!(removal.is_complete());
    assert_eq!(removal.removed_count(), 2);
    assert_eq!(removal.freed_bytes, 8);

    assert!(root.path().join("b.txt").exists());
    assert!(root.path().join("logs").is_dir());

    let after = auditor.audit(root.path(), &CancelFlag::new(), |_| {})?;
    assert!(after.junk_matches.is_empty());
    assert_eq!(after.files_visited, 2);
    Ok(())
}

#[test]
fn a_vanished_entry_fails_alone() -> Result<()> {
    let root = TempDir::new()?;
    fs::write(root.path().join("one.tmp"), b"1")?;
    fs::write(root.path().join("two.tmp"), b"22")?;

    let report = Auditor::new(RuleSet::default()).audit(root.path(), &CancelFlag::new(), |_| {})?;
    fs::remove_file(root.path().join("one.tmp"))?;

    let confirmation = Confirmation::from_user(true).context("accepted")?;
    let removal = remediation::remove(&confirmation, &report.junk_matches, &FsRemover);
    assert_eq!(removal.removed_count(), 1);
    assert_eq!(removal.failed.len(), 1);
    assert_eq!(removal.failed[0].entry.name, "one.tmp");
    assert!(matches!(removal.failed[0].to_error(), Error::RemovalFailed { .. }));
    assert!(!root.path().join("two.tmp").exists());
    Ok(())
}

#[test]
fn format_empties_the_root_but_keeps_it() -> Result<()> {
    let root = TempDir::new()?;
    fs::create_dir_all(root.path().join("DCIM").join("Camera"))?;
    fs::write(root.path().join("DCIM").join("Camera").join("img.jpg"), b"jpeg")?;
    fs::write(root.path().join("notes.txt"), b"hi")?;

    let confirmation = Confirmation::from_user(true).context("accepted")?;
    let removal = remediation::format_root(&confirmation, root.path(), &FsRemover)?;

    assert!(removal.is_complete());
    assert_eq!(removal.removed_count(), 2);
    assert_eq!(removal.freed_bytes, 6);
    assert!(root.path().is_dir());
    assert_eq!(fs::read_dir(root.path())?.count(), 0);
    Ok(())
}

#[test]
fn formatting_a_missing_root_is_access_denied() -> Result<()> {
    let root = TempDir::new()?;
    let confirmation = Confirmation::from_user(true).context("accepted")?;
    let result = remediation::format_root(&confirmation, &root.path().join("gone"), &FsRemover);
    assert!(matches!(result, Err(Error::AccessDenied { .. })));
    Ok(())
}
