//! Platform telemetry, detected once at startup and passed to screens.
//! Anything the platform cannot report is `None`.

use std::path::{Path, PathBuf};

use sysinfo::System;
use tracing::debug;

use crate::disk_info::{self, StorageInfo};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryInfo {
    pub used: u64,
    pub total: u64,
}

impl MemoryInfo {
    pub fn usage_percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (self.used as f64 / self.total as f64 * 100.0) as u32
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatteryInfo {
    /// 0..=100
    pub level: u8,
    pub charging: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlatformCapabilities {
    pub storage: Option<StorageInfo>,
    pub memory: Option<MemoryInfo>,
    pub battery: Option<BatteryInfo>,
    pub tray: bool,
}

impl PlatformCapabilities {
    pub fn detect() -> Self {
        let storage_root = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"));
        let caps = Self {
            storage: disk_info::storage_info(&storage_root),
            memory: memory_info(),
            battery: battery_info(Path::new(POWER_SUPPLY_DIR)),
            tray: cfg!(any(target_os = "macos", target_os = "windows", target_os = "linux")),
        };
        debug!(?caps, "platform capabilities detected");
        caps
    }

    /// Re-read the values that change while the app runs.
    pub fn refresh(&mut self) {
        let storage_root = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"));
        self.storage = disk_info::storage_info(&storage_root);
        self.memory = memory_info();
        self.battery = battery_info(Path::new(POWER_SUPPLY_DIR));
    }
}

pub fn memory_info() -> Option<MemoryInfo> {
    let mut sys = System::new();
    sys.refresh_memory();
    let total = sys.total_memory();
    if total == 0 {
        return None;
    }
    Some(MemoryInfo {
        used: sys.used_memory(),
        total,
    })
}

const POWER_SUPPLY_DIR: &str = "/sys/class/power_supply";

/// First battery found under a sysfs-style power supply directory.
pub fn battery_info(power_supply_dir: &Path) -> Option<BatteryInfo> {
    let read_dir = std::fs::read_dir(power_supply_dir).ok()?;
    for entry in read_dir.flatten() {
        let dir = entry.path();
        let kind = std::fs::read_to_string(dir.join("type")).unwrap_or_default();
        if kind.trim() != "Battery" {
            continue;
        }
        let Some(level) = std::fs::read_to_string(dir.join("capacity"))
            .ok()
            .and_then(|s| s.trim().parse::<u8>().ok())
        else {
            continue;
        };
        let status = std::fs::read_to_string(dir.join("status")).unwrap_or_default();
        return Some(BatteryInfo {
            level: level.min(100),
            charging: matches!(status.trim(), "Charging" | "Full"),
        });
    }
    None
}
