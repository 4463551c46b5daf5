use std::fs;
use std::path::Path;

use anyhow::{bail, Result};
use phonemaster::audit::{AuditEvent, AuditRegistry, Auditor, CancelFlag};
use phonemaster::rules::RuleSet;
use phonemaster::Error;
use tempfile::TempDir;

fn names(entries: &[phonemaster::audit::DirectoryEntry]) -> Vec<String> {
    entries.iter().map(|e| e.relative_display()).collect()
}

fn create_tree(root: &Path, dirs: usize, files_per_dir: usize) -> Result<usize> {
    let mut count = 0;
    for d in 0..dirs {
        let dir = root.join(format!("d-{d:02}"));
        fs::create_dir(&dir)?;
        count += 1;
        for f in 0..files_per_dir {
            fs::write(dir.join(format!("f-{f:02}.bin")), b"x")?;
            count += 1;
        }
    }
    Ok(count)
}

#[test]
fn flat_folder_is_classified_into_both_lists() -> Result<()> {
    let root = TempDir::new()?;
    fs::write(root.path().join("a.tmp"), b"12345")?;
    fs::write(root.path().join("b.txt"), b"hello")?;
    fs::write(root.path().join("notes.cache.bak"), b"1")?;
    fs::write(root.path().join("evil.exe"), b"MZ")?;

    let auditor = Auditor::new(RuleSet::default());
    let report = auditor.audit(root.path(), &CancelFlag::new(), |_| {})?;

    assert_eq!(report.files_visited, 4);
    assert_eq!(names(&report.junk_matches), vec!["a.tmp", "notes.cache.bak"]);
    assert_eq!(names(&report.risk_matches), vec!["evil.exe"]);
    assert_eq!(report.junk_bytes(), 6);
    assert_eq!(report.unreadable, 0);
    assert!(!report.cancelled);
    Ok(())
}

#[test]
fn nested_directories_are_counted_and_reported_by_segments() -> Result<()> {
    let root = TempDir::new()?;
    let deep = root.path().join("Android").join("data");
    fs::create_dir_all(&deep)?;
    fs::write(deep.join("trace.log"), b"..")?;
    fs::write(root.path().join("photo.jpg"), b"..")?;

    let auditor = Auditor::new(RuleSet::default());
    let mut entered = Vec::new();
    let report = auditor.audit(root.path(), &CancelFlag::new(), |event| {
        if let AuditEvent::Entered(entry) = event {
            entered.push(entry.relative_display());
        }
    })?;

    // Android, Android/data, Android/data/trace.log, photo.jpg
    assert_eq!(report.files_visited, 4);
    assert_eq!(entered, vec!["Android", "Android/data"]);
    assert_eq!(report.junk_matches.len(), 1);
    assert_eq!(report.junk_matches[0].segments, vec!["Android", "data", "trace.log"]);
    Ok(())
}

#[test]
fn empty_root_yields_an_empty_report() -> Result<()> {
    let root = TempDir::new()?;
    let report = Auditor::new(RuleSet::default()).audit(root.path(), &CancelFlag::new(), |_| {})?;
    assert_eq!(report.files_visited, 0);
    assert!(report.junk_matches.is_empty());
    assert!(report.risk_matches.is_empty());
    Ok(())
}

#[test]
fn repeated_audits_of_an_unchanged_tree_agree() -> Result<()> {
    let root = TempDir::new()?;
    create_tree(root.path(), 4, 3)?;
    fs::write(root.path().join("d-01").join("old.tmp"), b"..")?;
    fs::write(root.path().join("d-02").join("payload.dat"), b"..")?;

    let auditor = Auditor::new(RuleSet::default());
    let first = auditor.audit(root.path(), &CancelFlag::new(), |_| {})?;
    let second = auditor.audit(root.path(), &CancelFlag::new(), |_| {})?;
    assert_eq!(first, second);
    assert!(!auditor.registry().is_running(root.path()));
    Ok(())
}

#[test]
fn missing_or_file_root_is_access_denied() -> Result<()> {
    let root = TempDir::new()?;
    let auditor = Auditor::new(RuleSet::default());

    let missing = root.path().join("absent");
    match auditor.audit(&missing, &CancelFlag::new(), |_| {}) {
        Err(Error::AccessDenied { path, .. }) => assert_eq!(path, missing),
        other => bail!("expected AccessDenied, got {other:?}"),
    }

    let file = root.path().join("plain.txt");
    fs::write(&file, b"x")?;
    assert!(matches!(
        auditor.audit(&file, &CancelFlag::new(), |_| {}),
        Err(Error::AccessDenied { .. })
    ));
    Ok(())
}

#[test]
fn a_second_audit_of_a_busy_root_is_refused() -> Result<()> {
    let root = TempDir::new()?;
    let registry = AuditRegistry::default();
    let auditor = Auditor::with_registry(RuleSet::default(), registry.clone());

    let guard = registry.begin(root.path())?;
    assert!(matches!(
        auditor.audit(root.path(), &CancelFlag::new(), |_| {}),
        Err(Error::AuditInProgress(_))
    ));
    drop(guard);

    auditor.audit(root.path(), &CancelFlag::new(), |_| {})?;
    Ok(())
}

#[test]
fn cancelling_mid_traversal_returns_a_partial_report() -> Result<()> {
    let root = TempDir::new()?;
    let total = create_tree(root.path(), 12, 10)?;

    let auditor = Auditor::new(RuleSet::default());
    let cancel = CancelFlag::new();
    let trigger = cancel.clone();
    let mut entered = 0usize;
    let report = auditor.audit(root.path(), &cancel, |event| {
        if matches!(event, AuditEvent::Entered(_)) {
            entered += 1;
            if entered == 3 {
                trigger.cancel();
            }
        }
    })?;

    assert!(report.cancelled);
    assert!(report.files_visited > 0);
    assert!(report.files_visited < total);
    assert!(!auditor.registry().is_running(root.path()));
    Ok(())
}

#[cfg(unix)]
#[test]
fn symlinked_directories_are_not_followed() -> Result<()> {
    let root = TempDir::new()?;
    let outside = TempDir::new()?;
    fs::write(outside.path().join("elsewhere.tmp"), b"..")?;
    std::os::unix::fs::symlink(outside.path(), root.path().join("link"))?;

    let report = Auditor::new(RuleSet::default()).audit(root.path(), &CancelFlag::new(), |_| {})?;
    assert_eq!(report.files_visited, 1);
    assert!(report.junk_matches.is_empty());
    Ok(())
}

#[cfg(unix)]
#[test]
fn entries_vanishing_mid_walk_are_unreadable_not_fatal() -> Result<()> {
    let root = TempDir::new()?;
    let doomed = root.path().join("a");
    fs::create_dir_all(doomed.join("b"))?;
    fs::write(doomed.join("c.tmp"), b"..")?;
    fs::write(root.path().join("z.log"), b"..")?;

    let auditor = Auditor::new(RuleSet::default());
    let mut unreadable = Vec::new();
    // `a` has already been listed when it is reported, so deleting it here
    // makes its children fail: `b` cannot be opened, `c.tmp` cannot be stat'ed.
    let report = auditor.audit(root.path(), &CancelFlag::new(), |event| match event {
        AuditEvent::Entered(entry) if entry.path == doomed => {
            let _ = fs::remove_dir_all(&doomed);
        }
        AuditEvent::Unreadable { path, .. } => unreadable.push(path.clone()),
        _ => {}
    })?;

    assert_eq!(report.unreadable, 2);
    assert_eq!(unreadable, vec![doomed.join("b"), doomed.join("c.tmp")]);
    assert_eq!(report.files_visited, 2);
    assert_eq!(names(&report.junk_matches), vec!["z.log"]);
    assert!(!report.cancelled);
    Ok(())
}
