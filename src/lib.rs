//! Virtual-path storage bridge.
//!
//! Lets native code address files under a permission-scoped document tree by
//! application-chosen string paths, and hands back raw descriptors for I/O.

use std::sync::{Arc, OnceLock};

pub mod bridge;
pub mod config;
pub mod enumerator;
pub mod error;
pub mod ffi;
pub mod fs_abstraction;
pub mod grant;
pub mod logging;
pub mod opener;
pub mod registry;
pub mod types;
pub mod utils;

#[cfg(all(target_os = "android", feature = "tauri-host"))]
pub mod android;

#[cfg(feature = "tauri-host")]
pub mod saf_plugin;

#[cfg(test)]
mod test_support;

pub use bridge::StorageBridge;
pub use config::BridgeConfig;
pub use error::{BridgeError, BridgeResult};
pub use fs_abstraction::{ChildCursor, DenyingPicker, LocalProvider, RootPicker, StorageProvider};
pub use grant::GrantCompletion;
pub use types::{AccessMode, ChildEntry, RootStatus, StorageHandle, VirtualPath};

/// Bridge served to native callers through the C ABI
static GLOBAL_BRIDGE: OnceLock<Arc<StorageBridge>> = OnceLock::new();

/// Make `bridge` the one native callers reach through [`ffi`].
///
/// Only the first install takes effect; returns whether this one did.
pub fn install_bridge(bridge: Arc<StorageBridge>) -> bool {
    GLOBAL_BRIDGE.set(bridge).is_ok()
}

/// The installed bridge, if any.
pub fn global_bridge() -> Option<&'static Arc<StorageBridge>> {
    GLOBAL_BRIDGE.get()
}
