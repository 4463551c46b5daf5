use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StorageInfo {
    pub total: u64,
    pub available: u64,
    pub used: u64,
}

impl StorageInfo {
    pub fn usage_percent(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        self.used as f32 / self.total as f32
    }
}

/// Filesystem totals for the volume holding `path`.
#[cfg(unix)]
pub fn storage_info(path: &Path) -> Option<StorageInfo> {
    use std::ffi::CString;
    use std::mem::MaybeUninit;
    use std::os::unix::ffi::OsStrExt;

    let c_path = CString::new(path.as_os_str().as_bytes()).ok()?;
    let mut stat = MaybeUninit::<libc::statvfs>::uninit();
    let ret = unsafe { libc::statvfs(c_path.as_ptr(), stat.as_mut_ptr()) };
    if ret != 0 {
        return None;
    }
    let stat = unsafe { stat.assume_init() };
    let block_size = stat.f_frsize as u64;
    let total = stat.f_blocks as u64 * block_size;
    let available = stat.f_bavail as u64 * block_size;
    Some(StorageInfo {
        total,
        available,
        used: total.saturating_sub(available),
    })
}

#[cfg(not(unix))]
pub fn storage_info(_path: &Path) -> Option<StorageInfo> {
    None
}
