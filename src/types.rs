//! Core data types for the storage bridge
//!
//! This module contains the fundamental data structures passed between the bridge and its callers:
//! - Virtual paths and opaque storage handles
//! - Access modes for descriptor opening
//! - Directory entries reported by the host provider
//! - Root resolution status

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

use crate::error::{BridgeError, BridgeResult};

/// An application-chosen path in the bridge's namespace.
///
/// Virtual paths are opaque tokens: no normalization, no `..` handling,
/// case-sensitive comparison.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VirtualPath(String);

impl VirtualPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Child path: `self + separator + name`, formed verbatim.
    pub fn child(&self, separator: &str, name: &str) -> Self {
        let mut path = String::with_capacity(self.0.len() + separator.len() + name.len());
        path.push_str(&self.0);
        path.push_str(separator);
        path.push_str(name);
        Self(path)
    }
}

impl fmt::Display for VirtualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for VirtualPath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VirtualPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for VirtualPath {
    fn from(path: String) -> Self {
        Self(path)
    }
}

/// Provider-issued reference to a document or directory.
///
/// The bridge never interprets the contents; only the provider that issued
/// a handle knows how to resolve it (a JSON-serialized `FileUri` on Android,
/// an absolute path for [`crate::fs_abstraction::LocalProvider`]).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorageHandle(String);

impl StorageHandle {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Access intent for [`crate::opener::open`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccessMode {
    Read,
    /// Write, truncating existing content.
    Write,
    Append,
    /// Read and write an existing file in place (`r+`). Never creates.
    ReadWrite,
    /// Read and write, creating the file or truncating it first (`w+`).
    ReadWriteTruncate,
}

impl AccessMode {
    /// Parse a caller mode string.
    ///
    /// Accepts fopen-style modes and word forms. The binary/text
    /// distinction is dropped: `"rb"` and `"r"` are the same mode.
    pub fn parse(mode: &str) -> BridgeResult<Self> {
        match mode {
            "r" | "rb" | "rt" | "read" => Ok(AccessMode::Read),
            "w" | "wb" | "wt" | "write" => Ok(AccessMode::Write),
            "a" | "ab" | "at" | "append" => Ok(AccessMode::Append),
            "r+" | "rb+" | "r+b" | "rw" => Ok(AccessMode::ReadWrite),
            "w+" | "wb+" | "w+b" => Ok(AccessMode::ReadWriteTruncate),
            other => Err(BridgeError::InvalidMode(other.to_string())),
        }
    }

    /// Mode string in the form content providers understand.
    pub fn provider_mode(self) -> &'static str {
        match self {
            AccessMode::Read => "r",
            AccessMode::Write => "wt",
            AccessMode::Append => "wa",
            AccessMode::ReadWrite => "rw",
            AccessMode::ReadWriteTruncate => "rwt",
        }
    }
}

/// One child of a directory, as reported by the host provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChildEntry {
    /// Handle the provider issued for this child.
    pub handle: StorageHandle,
    pub display_name: String,
    pub is_directory: bool,
}

impl ChildEntry {
    pub fn file(handle: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            handle: StorageHandle::new(handle),
            display_name: display_name.into(),
            is_directory: false,
        }
    }

    pub fn directory(handle: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            handle: StorageHandle::new(handle),
            display_name: display_name.into(),
            is_directory: true,
        }
    }

    /// Name reported to callers: directories carry the marker suffix.
    pub fn listed_name(&self, directory_marker: &str) -> String {
        if self.is_directory {
            format!("{}{}", self.display_name, directory_marker)
        } else {
            self.display_name.clone()
        }
    }
}

/// Result of polling root resolution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "path", rename_all = "camelCase")]
pub enum RootStatus {
    /// Picker still open; poll again.
    Pending,
    /// User declined or cancelled. Re-request to try again.
    Denied,
    Ready(VirtualPath),
}

impl RootStatus {
    /// Collapse into the two-sentinel form: `None` while pending,
    /// `Some("")` when denied.
    pub fn into_path_sentinel(self) -> Option<String> {
        match self {
            RootStatus::Pending => None,
            RootStatus::Denied => Some(String::new()),
            RootStatus::Ready(path) => Some(path.into_string()),
        }
    }
}
