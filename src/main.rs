use std::sync::Arc;

use eframe::egui;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use phonemaster::app::PhoneMasterApp;
use phonemaster::capabilities::PlatformCapabilities;
use phonemaster::config::{AppConfig, PREFERENCES_FILE};
use phonemaster::prefs::PreferenceStore;

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn open_store(config: &AppConfig) -> Arc<PreferenceStore> {
    match PreferenceStore::open(config.preferences_path()) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            let fallback = std::env::temp_dir().join("phonemaster").join(PREFERENCES_FILE);
            error!(error = %e, fallback = %fallback.display(), "preferences unavailable, using a scratch store");
            match PreferenceStore::open(&fallback) {
                Ok(store) => Arc::new(store),
                Err(e) => {
                    error!(error = %e, "scratch store unavailable, preferences will not persist");
                    Arc::new(PreferenceStore::in_memory(fallback))
                }
            }
        }
    }
}

fn main() -> eframe::Result<()> {
    let config = AppConfig::from_env();
    init_tracing(&config);
    info!(data_dir = %config.data_dir.display(), "starting Phone Master");

    let store = open_store(&config);
    let caps = PlatformCapabilities::detect();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Phone Master")
            .with_inner_size([480.0, 760.0])
            .with_min_inner_size([360.0, 520.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Phone Master",
        options,
        Box::new(move |cc| Ok(Box::new(PhoneMasterApp::new(cc, config, store, caps)))),
    )
}
