//! Antivirus definitions version cache.
//!
//! The local record is compared against a remote feed. The record is
//! replaced as one JSON value, so readers see either the old or the new
//! record and never a mix.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::prefs::{keys, PreferenceStore};

pub const SEED_VERSION: &str = "2024.01.01.00";
pub const SEED_SIGNATURES: u64 = 8_500;
pub const REMOTE_VERSION: &str = "2024.05.12.01";
pub const REMOTE_SIGNATURES: u64 = 14_205;
const SEED_AGE_MS: i64 = 7 * 86_400_000;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionRecord {
    pub version: String,
    /// Epoch milliseconds.
    pub last_update: i64,
    pub total_signatures: u64,
}

impl DefinitionRecord {
    pub fn seed(now_ms: i64) -> Self {
        Self {
            version: SEED_VERSION.to_string(),
            last_update: now_ms - SEED_AGE_MS,
            total_signatures: SEED_SIGNATURES,
        }
    }
}

/// What the feed says is current.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDefinitions {
    pub version: String,
    pub total_signatures: u64,
}

pub trait DefinitionFeed: Send + Sync {
    fn latest(&self) -> Result<RemoteDefinitions>;
}

/// Built-in constant "remote". Never fails.
pub struct StaticFeed;

impl DefinitionFeed for StaticFeed {
    fn latest(&self) -> Result<RemoteDefinitions> {
        Ok(RemoteDefinitions {
            version: REMOTE_VERSION.to_string(),
            total_signatures: REMOTE_SIGNATURES,
        })
    }
}

/// JSON document `{"version": "...", "totalSignatures": n}` served over HTTP.
pub struct HttpFeed {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpFeed {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl DefinitionFeed for HttpFeed {
    fn latest(&self) -> Result<RemoteDefinitions> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                if e.is_timeout() {
                    Error::UpdateCheckFailed(format!("timed out contacting {}", self.url))
                } else {
                    Error::UpdateCheckFailed(e.to_string())
                }
            })?;
        response
            .json::<RemoteDefinitions>()
            .map_err(|e| Error::UpdateCheckFailed(format!("malformed definitions feed: {e}")))
    }
}

pub struct DefinitionCache {
    store: Arc<PreferenceStore>,
    feed: Box<dyn DefinitionFeed>,
}

impl DefinitionCache {
    pub fn new(store: Arc<PreferenceStore>, feed: Box<dyn DefinitionFeed>) -> Self {
        Self { store, feed }
    }

    /// HTTP feed when a URL is configured, the static feed otherwise.
    pub fn from_config(store: Arc<PreferenceStore>, config: &AppConfig) -> Result<Self> {
        let feed: Box<dyn DefinitionFeed> = match &config.definitions_url {
            Some(url) => Box::new(HttpFeed::new(url.clone(), config.http_timeout)?),
            None => Box::new(StaticFeed),
        };
        Ok(Self::new(store, feed))
    }

    /// Stored record, or the seed when nothing usable is stored.
    pub fn local_record(&self) -> DefinitionRecord {
        self.store
            .get_json::<DefinitionRecord>(keys::DEFINITIONS)
            .unwrap_or_else(|| DefinitionRecord::seed(now_ms()))
    }

    pub fn is_update_available(&self) -> Result<bool> {
        let remote = self.feed.latest().map_err(|e| match e {
            Error::UpdateCheckFailed(_) => e,
            other => Error::UpdateCheckFailed(other.to_string()),
        })?;
        Ok(self.local_record().version != remote.version)
    }

    /// Fail-open wrapper: any failure means "no update".
    pub fn update_due(&self) -> bool {
        match self.is_update_available() {
            Ok(available) => available,
            Err(e) => {
                warn!(error = %e, "definitions check failed, assuming up to date");
                false
            }
        }
    }

    /// Fetch and persist the remote record. On any failure the previous
    /// record stays in place.
    pub fn apply_update(&self) -> Result<DefinitionRecord> {
        let remote = self
            .feed
            .latest()
            .map_err(|e| Error::UpdateDownloadFailed(e.to_string()))?;
        if remote.version.trim().is_empty() {
            return Err(Error::UpdateDownloadFailed(
                "feed returned an empty version".to_string(),
            ));
        }

        let record = DefinitionRecord {
            version: remote.version,
            last_update: now_ms(),
            total_signatures: remote.total_signatures,
        };
        self.store
            .set_json(keys::DEFINITIONS, &record)
            .map_err(|e| Error::UpdateDownloadFailed(e.to_string()))?;

        info!(
            version = %record.version,
            signatures = record.total_signatures,
            "definitions updated"
        );
        Ok(record)
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct FailingFeed;

    impl DefinitionFeed for FailingFeed {
        fn latest(&self) -> Result<RemoteDefinitions> {
            Err(Error::UpdateCheckFailed("network unreachable".into()))
        }
    }

    fn store(dir: &TempDir) -> Arc<PreferenceStore> {
        Arc::new(PreferenceStore::open(dir.path().join("preferences.json")).unwrap())
    }

    #[test]
    fn record_uses_camel_case_keys() {
        let record = DefinitionRecord {
            version: "v".into(),
            last_update: 5,
            total_signatures: 9,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["lastUpdate"], 5);
        assert_eq!(json["totalSignatures"], 9);
    }

    #[test]
    fn missing_record_reads_as_seed() {
        let dir = TempDir::new().unwrap();
        let cache = DefinitionCache::new(store(&dir), Box::new(StaticFeed));

        let record = cache.local_record();
        assert_eq!(record.version, SEED_VERSION);
        assert_eq!(record.total_signatures, SEED_SIGNATURES);
        assert!(record.last_update < now_ms());
    }

    #[test]
    fn failed_check_is_an_error_but_update_due_is_false() {
        let dir = TempDir::new().unwrap();
        let cache = DefinitionCache::new(store(&dir), Box::new(FailingFeed));

        assert!(matches!(
            cache.is_update_available(),
            Err(Error::UpdateCheckFailed(_))
        ));
        assert!(!cache.update_due());
    }

    #[test]
    fn failed_download_keeps_previous_record() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let good = DefinitionCache::new(Arc::clone(&store), Box::new(StaticFeed));
        let applied = good.apply_update().unwrap();

        let broken = DefinitionCache::new(store, Box::new(FailingFeed));
        assert!(matches!(
            broken.apply_update(),
            Err(Error::UpdateDownloadFailed(_))
        ));
        assert_eq!(broken.local_record(), applied);
    }

    #[test]
    fn interrupted_write_leaves_the_old_record() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let cache = DefinitionCache::new(Arc::clone(&store), Box::new(StaticFeed));
        let before = cache.local_record();

        // Occupy the target path so the final rename cannot commit.
        std::fs::create_dir(store.path()).unwrap();
        std::fs::write(store.path().join("blocker"), b"x").unwrap();

        assert!(cache.apply_update().is_err());
        let after = cache.local_record();
        assert_eq!(after.version, before.version);
        assert_eq!(after.total_signatures, before.total_signatures);
    }
}
