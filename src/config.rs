use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::rules::DEFAULT_RISK_MARKERS;

const DATA_DIR_ENV: &str = "PHONE_MASTER_DATA_DIR";
const DEFINITIONS_URL_ENV: &str = "PHONE_MASTER_DEFINITIONS_URL";
const HTTP_TIMEOUT_ENV: &str = "PHONE_MASTER_HTTP_TIMEOUT_SECS";
const GEMINI_MODEL_ENV: &str = "PHONE_MASTER_GEMINI_MODEL";
const RISK_MARKERS_ENV: &str = "PHONE_MASTER_RISK_MARKERS";
const LOG_FILTER_ENV: &str = "PHONE_MASTER_LOG";
const LOG_JSON_ENV: &str = "PHONE_MASTER_LOG_JSON";

pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";
pub const PREFERENCES_FILE: &str = "preferences.json";

/// Runtime configuration, resolved once in `main` and handed down.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    /// `None` means the built-in static definitions feed.
    pub definitions_url: Option<String>,
    pub http_timeout: Duration,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub risk_markers: Vec<String>,
    pub log_filter: String,
    pub log_json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            definitions_url: None,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            risk_markers: DEFAULT_RISK_MARKERS.iter().map(|m| m.to_string()).collect(),
            log_filter: "info".to_string(),
            log_json: false,
        }
    }
}

impl AppConfig {
    /// Defaults overlaid with whatever the process environment provides.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = non_empty(DATA_DIR_ENV) {
            config.data_dir = PathBuf::from(dir);
        }
        config.definitions_url = non_empty(DEFINITIONS_URL_ENV);

        if let Some(raw) = non_empty(HTTP_TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.http_timeout = Duration::from_secs(secs),
                _ => warn!(value = %raw, "ignoring invalid {HTTP_TIMEOUT_ENV}"),
            }
        }

        config.gemini_api_key = non_empty("GEMINI_API_KEY").or_else(|| non_empty("API_KEY"));
        if let Some(model) = non_empty(GEMINI_MODEL_ENV) {
            config.gemini_model = model;
        }

        if let Some(raw) = non_empty(RISK_MARKERS_ENV) {
            let markers: Vec<String> = raw
                .split(',')
                .map(|m| m.trim().to_lowercase())
                .filter(|m| !m.is_empty())
                .collect();
            if !markers.is_empty() {
                config.risk_markers = markers;
            }
        }

        if let Some(filter) = non_empty(LOG_FILTER_ENV) {
            config.log_filter = filter;
        }
        config.log_json = non_empty(LOG_JSON_ENV)
            .map(|v| parse_bool(&v).unwrap_or(false))
            .unwrap_or(false);

        config
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.data_dir.join(PREFERENCES_FILE)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("phone-master"))
        .unwrap_or_else(|| std::env::temp_dir().join("phone-master"))
}

fn parse_bool(value: &str) -> Option<bool> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("true") || value == "1" || value.eq_ignore_ascii_case("yes") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") || value == "0" || value.eq_ignore_ascii_case("no")
    {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config, AppConfig::default());
        assert!(config.preferences_path().ends_with(PREFERENCES_FILE));
    }

    #[test]
    fn overrides_are_applied_and_invalid_values_ignored() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (DATA_DIR_ENV, "/tmp/pm-data"),
            (DEFINITIONS_URL_ENV, "https://example.invalid/defs.json"),
            (HTTP_TIMEOUT_ENV, "not-a-number"),
            ("API_KEY", "secret"),
            (RISK_MARKERS_ENV, " Ransom , ,spy "),
            (LOG_JSON_ENV, "yes"),
        ]));

        assert_eq!(config.data_dir, PathBuf::from("/tmp/pm-data"));
        assert_eq!(
            config.definitions_url.as_deref(),
            Some("https://example.invalid/defs.json")
        );
        assert_eq!(config.http_timeout, DEFAULT_HTTP_TIMEOUT);
        assert_eq!(config.gemini_api_key.as_deref(), Some("secret"));
        assert_eq!(config.risk_markers, vec!["ransom", "spy"]);
        assert!(config.log_json);
    }

    #[test]
    fn gemini_key_takes_precedence_over_generic_key() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "gemini"),
            ("API_KEY", "generic"),
            (HTTP_TIMEOUT_ENV, "3"),
        ]));
        assert_eq!(config.gemini_api_key.as_deref(), Some("gemini"));
        assert_eq!(config.http_timeout, Duration::from_secs(3));
    }
}
