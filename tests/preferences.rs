use std::fs;

use anyhow::Result;
use phonemaster::i18n::Language;
use phonemaster::payment;
use phonemaster::prefs::{keys, PreferenceStore, Theme, UserPreferences};
use tempfile::TempDir;

#[test]
fn settings_persist_across_reopen() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("nested").join("preferences.json");
    {
        let store = PreferenceStore::open(&path)?;
        let mut prefs = UserPreferences::load(&store);
        assert_eq!(prefs, UserPreferences::default());

        prefs.set_theme(&store, Theme::Dark)?;
        prefs.set_language(&store, Language::Sw)?;
        prefs.set_widget_enabled(&store, true)?;
        prefs.mark_onboarding_seen(&store)?;
        payment::unlock_premium(&mut prefs, &store, "qwe9876543")?;
    }

    let store = PreferenceStore::open(&path)?;
    let prefs = UserPreferences::load(&store);
    assert_eq!(prefs.theme, Theme::Dark);
    assert_eq!(prefs.language, Language::Sw);
    assert!(prefs.widget_enabled);
    assert!(prefs.onboarding_seen);
    assert!(prefs.premium_unlocked);
    assert!(!prefs.speed_overlay);
    Ok(())
}

#[test]
fn corrupt_file_reads_as_empty_and_is_replaced_on_write() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("preferences.json");
    fs::write(&path, b"{ not json")?;

    let store = PreferenceStore::open(&path)?;
    assert_eq!(store.get(keys::DARK_MODE), None);

    store.set_bool(keys::DARK_MODE, true)?;
    let reopened = PreferenceStore::open(&path)?;
    assert_eq!(reopened.get_bool(keys::DARK_MODE), Some(true));
    Ok(())
}

#[test]
fn unknown_language_code_falls_back_to_default() -> Result<()> {
    let dir = TempDir::new()?;
    let store = PreferenceStore::open(dir.path().join("preferences.json"))?;
    store.set_str(keys::LANGUAGE, "xx")?;
    assert_eq!(UserPreferences::load(&store).language, Language::En);
    Ok(())
}
