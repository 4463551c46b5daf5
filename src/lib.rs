pub mod analysis;
pub mod app;
pub mod audit;
pub mod capabilities;
pub mod codes;
pub mod config;
pub mod definitions;
pub mod disk_info;
pub mod error;
pub mod i18n;
pub mod network;
pub mod payment;
pub mod prefs;
pub mod remediation;
pub mod rules;
pub mod utils;
pub mod widget;

pub use error::{Error, Result};
