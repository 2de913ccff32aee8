//! C ABI for native callers.
//!
//! Every entry point goes through the bridge installed with
//! [`crate::install_bridge`] and returns the failure sentinel when none is
//! installed or an argument is null or not UTF-8. Strings and lists handed
//! out here must be released with the matching `doctree_bridge_free_*`
//! function.

use std::ffi::{c_char, c_int, CStr, CString};
use std::ptr;

use crate::bridge::StorageBridge;
use crate::opener::INVALID_DESCRIPTOR;
use crate::types::RootStatus;

pub const ROOT_PENDING: c_int = 0;
pub const ROOT_READY: c_int = 1;
pub const ROOT_DENIED: c_int = -1;
pub const ROOT_NO_BRIDGE: c_int = -2;

unsafe fn str_arg<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok()
}

fn into_c_string(value: String) -> Option<*mut c_char> {
    match CString::new(value) {
        Ok(s) => Some(s.into_raw()),
        Err(e) => {
            tracing::warn!("[FFI] Dropping string with interior NUL: {:?}", e.into_vec());
            None
        }
    }
}

/// Poll the bridge for its root in a form C strings can carry.
///
/// A ready path with an interior NUL cannot be handed out. The grant is
/// already consumed at that point, so it is reported as a denial and the
/// next poll starts a fresh request.
fn poll_root(bridge: &StorageBridge) -> RootStatus {
    match bridge.request_root() {
        RootStatus::Ready(path) if path.as_str().contains('\0') => {
            tracing::warn!(
                "[FFI] Root path {:?} has an interior NUL; reporting denial",
                path.as_str()
            );
            RootStatus::Denied
        }
        status => status,
    }
}

/// Route bridge logs to stderr. Safe to call more than once.
#[no_mangle]
pub extern "C" fn doctree_bridge_init_logging() {
    crate::logging::init();
}

/// Poll for the storage root.
///
/// Returns null while the picker is open, `""` after a denial (or a granted
/// path C cannot represent), otherwise the root virtual path.
#[no_mangle]
pub extern "C" fn doctree_bridge_request_root_path() -> *mut c_char {
    let Some(bridge) = crate::global_bridge() else {
        return ptr::null_mut();
    };
    poll_root(bridge)
        .into_path_sentinel()
        .and_then(into_c_string)
        .unwrap_or(ptr::null_mut())
}

/// Poll for the storage root with an explicit state.
///
/// Returns `ROOT_PENDING`, `ROOT_DENIED`, `ROOT_NO_BRIDGE`, or `ROOT_READY`
/// with the path stored in `*out_path`.
///
/// # Safety
/// `out_path` must be null or valid for a pointer write.
#[no_mangle]
pub unsafe extern "C" fn doctree_bridge_poll_root(out_path: *mut *mut c_char) -> c_int {
    let Some(bridge) = crate::global_bridge() else {
        return ROOT_NO_BRIDGE;
    };
    match poll_root(bridge) {
        RootStatus::Pending => ROOT_PENDING,
        RootStatus::Denied => ROOT_DENIED,
        RootStatus::Ready(path) => {
            if !out_path.is_null() {
                *out_path = into_c_string(path.into_string()).unwrap_or(ptr::null_mut());
            }
            ROOT_READY
        }
    }
}

/// List a registered directory.
///
/// Returns an array of `*out_len` names, or null with `*out_len = 0` when
/// the listing is empty or failed.
///
/// # Safety
/// `path` must be null or a valid NUL-terminated string; `out_len` must be
/// null or valid for a write.
#[no_mangle]
pub unsafe extern "C" fn doctree_bridge_list_directory(
    path: *const c_char,
    out_len: *mut usize,
) -> *mut *mut c_char {
    if !out_len.is_null() {
        *out_len = 0;
    }
    let (Some(bridge), Some(path)) = (crate::global_bridge(), str_arg(path)) else {
        return ptr::null_mut();
    };

    let names: Vec<*mut c_char> = bridge
        .list_directory(path)
        .into_iter()
        .filter_map(into_c_string)
        .collect();
    if names.is_empty() {
        return ptr::null_mut();
    }
    if !out_len.is_null() {
        *out_len = names.len();
    }
    Box::into_raw(names.into_boxed_slice()) as *mut *mut c_char
}

/// Open a registered file. Returns a caller-owned descriptor, or `0`.
///
/// # Safety
/// `path` and `mode` must be null or valid NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn doctree_bridge_open_fd(path: *const c_char, mode: *const c_char) -> c_int {
    match (crate::global_bridge(), str_arg(path), str_arg(mode)) {
        (Some(bridge), Some(path), Some(mode)) => bridge.open_as_descriptor(path, mode),
        _ => INVALID_DESCRIPTOR,
    }
}

/// # Safety
/// `s` must be null or a string returned by this library, not yet freed.
#[no_mangle]
pub unsafe extern "C" fn doctree_bridge_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

/// # Safety
/// `list` and `len` must come from one `doctree_bridge_list_directory` call, not yet freed.
#[no_mangle]
pub unsafe extern "C" fn doctree_bridge_free_list(list: *mut *mut c_char, len: usize) {
    if list.is_null() {
        return;
    }
    let names = Box::from_raw(ptr::slice_from_raw_parts_mut(list, len));
    for name in names.iter() {
        doctree_bridge_free_string(*name);
    }
}
