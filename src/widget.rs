use std::time::{Duration, Instant};

use tray_icon::menu::{Menu, MenuItem, PredefinedMenuItem};
use tray_icon::{Icon, TrayIcon, TrayIconBuilder};
use tracing::warn;

use crate::capabilities::PlatformCapabilities;
use crate::utils;

const REFRESH_EVERY: Duration = Duration::from_secs(30);

/// Home-screen style widget living in the system tray: free storage in the
/// title, storage and memory lines in the menu.
pub struct Widget {
    tray: TrayIcon,
    storage_item: MenuItem,
    memory_item: MenuItem,
    last_update: Instant,
}

fn create_icon() -> Option<Icon> {
    let size: usize = 22;
    let mut rgba = vec![0u8; size * size * 4];
    for y in 0..size {
        for x in 0..size {
            let idx = (y * size + x) * 4;
            let cx = x as f32 - 10.5;
            let cy = y as f32 - 10.5;
            let dist = (cx * cx + cy * cy).sqrt();
            if dist < 9.0 {
                rgba[idx] = 40;
                rgba[idx + 1] = 90;
                rgba[idx + 2] = 230;
                rgba[idx + 3] = 255;
            }
        }
    }
    Icon::from_rgba(rgba, size as u32, size as u32).ok()
}

pub fn storage_line(caps: &PlatformCapabilities) -> String {
    match caps.storage {
        Some(info) => format!(
            "Storage: {} used / {} total ({}%)",
            utils::format_size(info.used),
            utils::format_size(info.total),
            (info.usage_percent() * 100.0) as u32,
        ),
        None => "Storage: unavailable".to_string(),
    }
}

pub fn memory_line(caps: &PlatformCapabilities) -> String {
    match caps.memory {
        Some(mem) => format!(
            "Memory: {} / {} ({}%)",
            utils::format_size(mem.used),
            utils::format_size(mem.total),
            mem.usage_percent(),
        ),
        None => "Memory: unavailable".to_string(),
    }
}

impl Widget {
    /// `None` when the platform has no tray or refuses the icon.
    pub fn new(caps: &PlatformCapabilities) -> Option<Self> {
        if !caps.tray {
            return None;
        }
        let menu = Menu::new();

        let storage_item = MenuItem::new("Storage: calculating...", false, None);
        let memory_item = MenuItem::new("Memory: calculating...", false, None);
        let separator = PredefinedMenuItem::separator();
        let app_label = MenuItem::new("Phone Master", false, None);

        let _ = menu.append(&app_label);
        let _ = menu.append(&separator);
        let _ = menu.append(&storage_item);
        let _ = menu.append(&memory_item);

        let tray = match TrayIconBuilder::new()
            .with_menu(Box::new(menu))
            .with_tooltip("Phone Master")
            .with_icon(create_icon()?)
            .with_title("-- free")
            .build()
        {
            Ok(tray) => tray,
            Err(e) => {
                warn!(error = %e, "tray widget unavailable");
                return None;
            }
        };

        let mut widget = Self {
            tray,
            storage_item,
            memory_item,
            last_update: Instant::now(),
        };
        widget.show(caps);
        Some(widget)
    }

    fn show(&mut self, caps: &PlatformCapabilities) {
        self.storage_item.set_text(storage_line(caps));
        self.memory_item.set_text(memory_line(caps));
        if let Some(info) = caps.storage {
            self.tray
                .set_title(Some(format!("{} free", utils::format_size(info.available))));
        }
        self.last_update = Instant::now();
    }

    /// Call this from the eframe update loop. Refreshes every 30 seconds.
    pub fn tick(&mut self, caps: &mut PlatformCapabilities) {
        if self.last_update.elapsed() >= REFRESH_EVERY {
            caps.refresh();
            self.show(caps);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::MemoryInfo;
    use crate::disk_info::StorageInfo;

    #[test]
    fn lines_degrade_when_telemetry_is_missing() {
        let caps = PlatformCapabilities::default();
        assert_eq!(storage_line(&caps), "Storage: unavailable");
        assert_eq!(memory_line(&caps), "Memory: unavailable");
    }

    #[test]
    fn lines_show_usage() {
        let caps = PlatformCapabilities {
            storage: Some(StorageInfo {
                total: 2048,
                available: 1024,
                used: 1024,
            }),
            memory: Some(MemoryInfo {
                used: 1_048_576,
                total: 4 * 1_048_576,
            }),
            battery: None,
            tray: false,
        };
        assert_eq!(storage_line(&caps), "Storage: 1.00 KB used / 2.00 KB total (50%)");
        assert_eq!(memory_line(&caps), "Memory: 1.00 MB / 4.00 MB (25%)");
    }
}
