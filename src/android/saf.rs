//! Storage Access Framework (SAF) provider for Android.
//!
//! Handles issued by this provider are JSON-serialized `FileUri` objects:
//! {"uri":"content://...","documentTopTreeUri":"content://..."}
//!
//! The granted root is registered under its plain `content://` URI, and its
//! children under `<uri>/<display name>`.

use std::os::fd::OwnedFd;

use tauri::{AppHandle, Runtime};
use tauri_plugin_android_fs::{AndroidFsExt, Entry, FileAccessMode, FileUri};

use crate::error::{BridgeError, BridgeResult};
use crate::fs_abstraction::{ChildCursor, RootPicker, StorageProvider};
use crate::grant::GrantCompletion;
use crate::types::{AccessMode, ChildEntry, StorageHandle};

/// Parse a stored handle back into a FileUri.
///
/// Plain content:// URIs are accepted too and wrapped in minimal JSON.
fn parse_uri(uri_json: &str) -> BridgeResult<FileUri> {
    if uri_json.trim().starts_with('{') {
        FileUri::from_json_str(uri_json)
            .map_err(|e| BridgeError::Provider(format!("Failed to parse FileUri JSON: {:?}", e)))
    } else {
        let json = format!(r#"{{"uri":"{}","documentTopTreeUri":null}}"#, uri_json);
        FileUri::from_json_str(&json).map_err(|e| {
            BridgeError::Provider(format!("Failed to create FileUri from URI: {:?}", e))
        })
    }
}

/// Convert a FileUri to a storable JSON string.
fn uri_to_string(uri: &FileUri) -> String {
    uri.to_json_string().unwrap_or_else(|_| String::new())
}

/// The content:// URI inside a serialized FileUri.
fn content_uri(handle: &StorageHandle) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(handle.as_str()).ok()?;
    json.get("uri").and_then(|v| v.as_str()).map(str::to_string)
}

fn file_access_mode(mode: AccessMode) -> FileAccessMode {
    match mode {
        AccessMode::Read => FileAccessMode::Read,
        AccessMode::Write => FileAccessMode::WriteTruncate,
        AccessMode::Append => FileAccessMode::WriteAppend,
        AccessMode::ReadWrite => FileAccessMode::ReadWrite,
        AccessMode::ReadWriteTruncate => FileAccessMode::ReadWriteTruncate,
    }
}

/// Provider backed by `tauri-plugin-android-fs`.
pub struct AndroidFsProvider<R: Runtime> {
    app: AppHandle<R>,
}

impl<R: Runtime> AndroidFsProvider<R> {
    pub fn new(app: AppHandle<R>) -> Self {
        Self { app }
    }
}

impl<R: Runtime> StorageProvider for AndroidFsProvider<R> {
    fn query_children(&self, handle: &StorageHandle) -> BridgeResult<Box<dyn ChildCursor>> {
        let api = self.app.android_fs();
        let dir = parse_uri(handle.as_str())?;

        // The plugin drains and closes the provider cursor before returning.
        let entries = api
            .read_dir(&dir)
            .map_err(|e| BridgeError::Provider(format!("Failed to read directory: {:?}", e)))?;

        let rows: Vec<BridgeResult<ChildEntry>> = entries
            .map(|entry| match entry {
                Entry::File { name, uri, .. } => ChildEntry {
                    handle: StorageHandle::new(uri_to_string(&uri)),
                    display_name: name,
                    is_directory: false,
                },
                Entry::Dir { name, uri, .. } => ChildEntry {
                    handle: StorageHandle::new(uri_to_string(&uri)),
                    display_name: name,
                    is_directory: true,
                },
            })
            .map(Ok)
            .collect();

        Ok(Box::new(rows.into_iter()))
    }

    fn open_descriptor(&self, handle: &StorageHandle, mode: AccessMode) -> BridgeResult<OwnedFd> {
        let api = self.app.android_fs();
        let file_uri = parse_uri(handle.as_str())?;

        let file = api
            .open_file(&file_uri, file_access_mode(mode))
            .map_err(|e| BridgeError::Provider(format!("Failed to open document: {:?}", e)))?;
        Ok(OwnedFd::from(file))
    }

    fn persist_grant(&self, handle: &StorageHandle) -> BridgeResult<()> {
        let api = self.app.android_fs_async();
        let file_uri = parse_uri(handle.as_str())?;

        // Use block_on to call async method from sync context
        tauri::async_runtime::block_on(async {
            api.file_picker()
                .persist_uri_permission(&file_uri)
                .await
                .map_err(|e| {
                    BridgeError::Provider(format!("Failed to persist permission: {:?}", e))
                })
        })
    }

    fn legacy_root(&self) -> Option<String> {
        None
    }

    fn root_virtual_path(&self, handle: &StorageHandle) -> String {
        content_uri(handle).unwrap_or_else(|| handle.as_str().to_string())
    }
}

/// Document tree picker (ACTION_OPEN_DOCUMENT_TREE).
pub struct AndroidTreePicker<R: Runtime> {
    app: AppHandle<R>,
}

impl<R: Runtime> AndroidTreePicker<R> {
    pub fn new(app: AppHandle<R>) -> Self {
        Self { app }
    }
}

impl<R: Runtime> RootPicker for AndroidTreePicker<R> {
    fn launch(&self, completion: GrantCompletion) {
        let app = self.app.clone();
        tauri::async_runtime::spawn(async move {
            let api = app.android_fs_async();
            match api.file_picker().pick_dir(None, false).await {
                Ok(Some(uri)) => {
                    let handle = StorageHandle::new(uri_to_string(&uri));
                    // Granting persists the permission with block_on; keep it off
                    // the async workers.
                    tauri::async_runtime::spawn_blocking(move || completion.grant(handle));
                }
                Ok(None) => completion.deny(),
                Err(e) => {
                    tracing::warn!("[SAF] Directory picker failed: {:?}", e);
                    completion.deny();
                }
            }
        });
    }
}
