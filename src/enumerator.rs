//! Directory enumeration.
//!
//! Lists the immediate children of a registered directory, registering each
//! child under `parent + separator + name` as it goes. Provider failures are
//! logged and turn into an empty listing.

use crate::error::{BridgeError, BridgeResult};
use crate::fs_abstraction::StorageProvider;
use crate::registry::HandleRegistry;
use crate::types::VirtualPath;

/// Names of the children of `path`, directories suffixed with `directory_marker`.
///
/// Unknown paths and provider errors both yield an empty list. Order is
/// whatever the provider returns.
pub fn list_children(
    registry: &HandleRegistry,
    provider: &dyn StorageProvider,
    path: &str,
    separator: &str,
    directory_marker: &str,
) -> Vec<String> {
    match try_list_children(registry, provider, path, separator, directory_marker) {
        Ok(names) => names,
        Err(BridgeError::UnknownPath(path)) => {
            tracing::warn!("[Enumerate] Directory not in registry: {}", path);
            Vec::new()
        }
        Err(e) => {
            tracing::warn!("[Enumerate] Failed query for {}: {}", path, e);
            Vec::new()
        }
    }
}

/// Fallible core of [`list_children`].
///
/// Children seen before a mid-query failure stay registered; the partial
/// listing is discarded.
pub fn try_list_children(
    registry: &HandleRegistry,
    provider: &dyn StorageProvider,
    path: &str,
    separator: &str,
    directory_marker: &str,
) -> BridgeResult<Vec<String>> {
    let handle = registry
        .lookup(path)
        .ok_or_else(|| BridgeError::UnknownPath(path.to_string()))?;
    tracing::debug!("[Enumerate] Querying children of {} ({})", path, handle);

    let parent = VirtualPath::new(path);
    let mut names = Vec::new();
    // The cursor is dropped, and the provider query released, on every return below.
    let cursor = provider.query_children(&handle)?;
    for entry in cursor {
        let entry = entry?;
        names.push(entry.listed_name(directory_marker));
        registry.register(parent.child(separator, &entry.display_name), entry.handle);
    }
    Ok(names)
}
