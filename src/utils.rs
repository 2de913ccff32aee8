//! Host detection helpers
//!
//! - Android API level lookup (system properties)
//! - Unrestricted storage root for hosts without scoped storage

use std::path::PathBuf;

/// First Android API level (11, "R") where shared storage is only reachable through the picker.
pub const SCOPED_STORAGE_API_LEVEL: u32 = 30;

/// Fallback when `EXTERNAL_STORAGE` is not set in the process environment.
pub const DEFAULT_EXTERNAL_STORAGE: &str = "/storage/emulated/0";

/// Parse the `ro.build.version.sdk` property value.
pub fn parse_api_level(value: &str) -> Option<u32> {
    value.trim().parse().ok()
}

/// Whether a host at `api_level` enforces scoped storage.
pub fn is_scoped_storage(api_level: u32) -> bool {
    api_level >= SCOPED_STORAGE_API_LEVEL
}

/// Android API level of the running device.
#[cfg(target_os = "android")]
pub fn android_api_level() -> Option<u32> {
    // PROP_VALUE_MAX from <sys/system_properties.h>
    const PROP_VALUE_MAX: usize = 92;

    let name = c"ro.build.version.sdk";
    let mut value = [0 as libc::c_char; PROP_VALUE_MAX];
    let len = unsafe { libc::__system_property_get(name.as_ptr(), value.as_mut_ptr()) };
    if len <= 0 {
        tracing::warn!("[Host] ro.build.version.sdk is not set");
        return None;
    }
    let value = unsafe { std::ffi::CStr::from_ptr(value.as_ptr()) };
    parse_api_level(&value.to_string_lossy())
}

/// Unrestricted root, if this host allows direct path access to shared storage.
///
/// On Android this is external storage on devices below API 30. Desktop
/// hosts have no scoped storage, so the home directory is used.
#[cfg(target_os = "android")]
pub fn legacy_root_path() -> Option<PathBuf> {
    let api_level = android_api_level()?;
    if is_scoped_storage(api_level) {
        tracing::debug!("[Host] API {} enforces scoped storage", api_level);
        return None;
    }
    let root = std::env::var("EXTERNAL_STORAGE")
        .unwrap_or_else(|_| DEFAULT_EXTERNAL_STORAGE.to_string());
    Some(PathBuf::from(root))
}

#[cfg(not(target_os = "android"))]
pub fn legacy_root_path() -> Option<PathBuf> {
    dirs::home_dir()
}
