//! Host storage abstraction layer.
//!
//! The bridge talks to the host only through the traits in this module:
//! - `StorageProvider`: enumerate children, open descriptors, persist grants
//! - `ChildCursor`: a live provider query, released on drop
//! - `RootPicker`: the user-facing directory picker
//!
//! `LocalProvider` implements the provider with direct filesystem access.
//! It backs the legacy unrestricted mode (Android before scoped storage)
//! and desktop hosts. The Android SAF provider lives in `android::saf`.

use std::fs::{self, OpenOptions};
use std::os::fd::OwnedFd;
use std::path::{Path, PathBuf};

use crate::error::{BridgeError, BridgeResult};
use crate::grant::GrantCompletion;
use crate::types::{AccessMode, ChildEntry, StorageHandle};

/// Rows of an in-flight children query.
///
/// Implementors release the provider-side query handle in `Drop`, so the
/// handle is freed on every exit path of the consumer.
pub trait ChildCursor: Iterator<Item = BridgeResult<ChildEntry>> + Send {}

impl<T> ChildCursor for T where T: Iterator<Item = BridgeResult<ChildEntry>> + Send {}

/// Host storage backend.
pub trait StorageProvider: Send + Sync {
    /// Start a query for the immediate children of a directory handle.
    fn query_children(&self, handle: &StorageHandle) -> BridgeResult<Box<dyn ChildCursor>>;

    /// Materialize a process-owned descriptor for a document.
    fn open_descriptor(&self, handle: &StorageHandle, mode: AccessMode) -> BridgeResult<OwnedFd>;

    /// Keep access to a granted root across process restarts.
    fn persist_grant(&self, handle: &StorageHandle) -> BridgeResult<()>;

    /// Unrestricted root path, when the host does not enforce scoped storage.
    fn legacy_root(&self) -> Option<String>;

    /// Virtual path a granted root is registered under.
    fn root_virtual_path(&self, handle: &StorageHandle) -> String {
        handle.as_str().to_string()
    }
}

/// User-facing root picker.
pub trait RootPicker: Send + Sync {
    /// Show the picker. The outcome is delivered through `completion`,
    /// later and from any thread.
    fn launch(&self, completion: GrantCompletion);
}

/// Picker for hosts that have none. Every request is denied.
#[derive(Debug, Default, Clone, Copy)]
pub struct DenyingPicker;

impl RootPicker for DenyingPicker {
    fn launch(&self, completion: GrantCompletion) {
        tracing::warn!("[Picker] No storage root picker on this host");
        completion.deny();
    }
}

// ============================================================================
// Direct filesystem provider
// ============================================================================

/// Provider over the real filesystem. Handles are absolute path strings.
#[derive(Debug, Clone)]
pub struct LocalProvider {
    legacy_root: Option<PathBuf>,
}

impl LocalProvider {
    /// Provider whose root is available without a picker.
    pub fn unrestricted(root: impl Into<PathBuf>) -> Self {
        Self {
            legacy_root: Some(root.into()),
        }
    }

    /// Provider that only serves handles handed to it by a picker.
    pub fn scoped() -> Self {
        Self { legacy_root: None }
    }

    fn open_options(mode: AccessMode) -> OpenOptions {
        let mut options = OpenOptions::new();
        match mode {
            AccessMode::Read => options.read(true),
            AccessMode::Write => options.write(true).create(true).truncate(true),
            AccessMode::Append => options.append(true).create(true),
            AccessMode::ReadWrite => options.read(true).write(true),
            AccessMode::ReadWriteTruncate => {
                options.read(true).write(true).create(true).truncate(true)
            }
        };
        options
    }
}

impl StorageProvider for LocalProvider {
    fn query_children(&self, handle: &StorageHandle) -> BridgeResult<Box<dyn ChildCursor>> {
        let dir = fs::read_dir(handle.as_str()).map_err(|e| {
            BridgeError::Provider(format!("Failed to read directory {}: {}", handle, e))
        })?;

        let cursor = dir.map(|entry| -> BridgeResult<ChildEntry> {
            let entry = entry?;
            let path = entry.path();
            let is_directory = entry.file_type()?.is_dir();
            Ok(ChildEntry {
                handle: StorageHandle::new(path.to_string_lossy()),
                display_name: entry.file_name().to_string_lossy().to_string(),
                is_directory,
            })
        });
        Ok(Box::new(cursor))
    }

    fn open_descriptor(&self, handle: &StorageHandle, mode: AccessMode) -> BridgeResult<OwnedFd> {
        let path = Path::new(handle.as_str());
        if path.is_dir() {
            return Err(BridgeError::Provider(format!("{} is a directory", handle)));
        }
        let file = Self::open_options(mode)
            .open(path)
            .map_err(|e| BridgeError::Provider(format!("Failed to open {}: {}", handle, e)))?;
        Ok(OwnedFd::from(file))
    }

    fn persist_grant(&self, _handle: &StorageHandle) -> BridgeResult<()> {
        // Filesystem access needs no grant
        Ok(())
    }

    fn legacy_root(&self) -> Option<String> {
        self.legacy_root
            .as_ref()
            .map(|root| root.to_string_lossy().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};

    fn names(provider: &LocalProvider, dir: &Path) -> Vec<(String, bool)> {
        let mut names: Vec<_> = provider
            .query_children(&StorageHandle::new(dir.to_string_lossy()))
            .unwrap()
            .map(|entry| {
                let entry = entry.unwrap();
                (entry.display_name, entry.is_directory)
            })
            .collect();
        names.sort();
        names
    }

    fn open_file(provider: &LocalProvider, handle: &StorageHandle, mode: AccessMode) -> fs::File {
        fs::File::from(provider.open_descriptor(handle, mode).unwrap())
    }

    fn read_back(path: &Path) -> String {
        String::from_utf8(fs::read(path).unwrap()).unwrap()
    }

    #[test]
    fn test_local_children() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("roms")).unwrap();
        fs::write(dir.path().join("save.srm"), b"sram").unwrap();

        let provider = LocalProvider::scoped();
        assert_eq!(
            names(&provider, dir.path()),
            vec![("roms".to_string(), true), ("save.srm".to_string(), false)]
        );
    }

    #[test]
    fn test_local_children_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let provider = LocalProvider::scoped();
        let missing = StorageHandle::new(dir.path().join("nope").to_string_lossy());
        assert!(matches!(provider.query_children(&missing), Err(BridgeError::Provider(_))));
    }

    #[test]
    fn test_local_open_modes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.srm");
        let handle = StorageHandle::new(path.to_string_lossy());
        let provider = LocalProvider::scoped();

        // Read of a missing file fails, write creates it
        assert!(provider.open_descriptor(&handle, AccessMode::Read).is_err());
        let mut file = open_file(&provider, &handle, AccessMode::Write);
        file.write_all(b"first").unwrap();
        drop(file);

        let mut file = open_file(&provider, &handle, AccessMode::Append);
        file.write_all(b"+more").unwrap();
        drop(file);

        let mut contents = String::new();
        fs::File::from(provider.open_descriptor(&handle, AccessMode::Read).unwrap())
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "first+more");
    }

    #[test]
    fn test_local_read_write_keeps_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.srm");
        let handle = StorageHandle::new(path.to_string_lossy());
        let provider = LocalProvider::scoped();

        // In-place read/write never creates the file
        assert!(provider.open_descriptor(&handle, AccessMode::ReadWrite).is_err());
        assert!(!path.exists());

        fs::write(&path, b"long old content").unwrap();
        let mut file = open_file(&provider, &handle, AccessMode::ReadWrite);
        file.write_all(b"ab").unwrap();
        drop(file);
        assert_eq!(read_back(&path), "abng old content");
    }

    #[test]
    fn test_local_read_write_truncate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.srm");
        let handle = StorageHandle::new(path.to_string_lossy());
        let provider = LocalProvider::scoped();

        fs::write(&path, b"long old content").unwrap();
        let mut file = open_file(&provider, &handle, AccessMode::ReadWriteTruncate);
        file.write_all(b"ab").unwrap();
        drop(file);
        assert_eq!(read_back(&path), "ab");

        // Creates a missing file
        fs::remove_file(&path).unwrap();
        drop(open_file(&provider, &handle, AccessMode::ReadWriteTruncate));
        assert!(path.exists());
    }

    #[test]
    fn test_local_open_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let provider = LocalProvider::scoped();
        let handle = StorageHandle::new(dir.path().to_string_lossy());
        assert!(provider.open_descriptor(&handle, AccessMode::Read).is_err());
    }

    #[test]
    fn test_legacy_root() {
        assert_eq!(
            LocalProvider::unrestricted("/storage/emulated/0").legacy_root(),
            Some("/storage/emulated/0".to_string())
        );
        assert_eq!(LocalProvider::scoped().legacy_root(), None);
    }
}
