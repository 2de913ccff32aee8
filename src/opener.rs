//! Descriptor opening.
//!
//! Resolves a registered path to its handle, has the provider open it, and
//! detaches the raw descriptor for the caller. After a successful open the
//! bridge keeps no reference: the caller owns and closes the descriptor.

use std::os::fd::{AsRawFd, IntoRawFd, OwnedFd, RawFd};

use crate::error::{BridgeError, BridgeResult};
use crate::fs_abstraction::StorageProvider;
use crate::registry::HandleRegistry;
use crate::types::AccessMode;

/// Returned for every failed open.
pub const INVALID_DESCRIPTOR: RawFd = 0;

/// Open `path` and detach the descriptor, or return [`INVALID_DESCRIPTOR`].
pub fn open(
    registry: &HandleRegistry,
    provider: &dyn StorageProvider,
    path: &str,
    mode: &str,
) -> RawFd {
    match try_open(registry, provider, path, mode) {
        Ok(fd) => fd.into_raw_fd(),
        Err(BridgeError::UnknownPath(path)) => {
            tracing::warn!("[Open] Did not find path in registry: {}", path);
            INVALID_DESCRIPTOR
        }
        Err(e) => {
            tracing::warn!("[Open] Failed to open {} ({}): {}", path, mode, e);
            INVALID_DESCRIPTOR
        }
    }
}

/// Fallible core of [`open`]. The descriptor stays owned until the caller detaches it.
pub fn try_open(
    registry: &HandleRegistry,
    provider: &dyn StorageProvider,
    path: &str,
    mode: &str,
) -> BridgeResult<OwnedFd> {
    let handle = registry
        .lookup(path)
        .ok_or_else(|| BridgeError::UnknownPath(path.to_string()))?;
    let mode = AccessMode::parse(mode)?;

    let fd = provider.open_descriptor(&handle, mode)?;
    if fd.as_raw_fd() == INVALID_DESCRIPTOR {
        // Descriptor 0 would read as failure; move it off the sentinel.
        return Ok(fd.try_clone()?);
    }
    Ok(fd)
}
