//! Android-specific host glue.
//!
//! This module is only compiled on Android builds with the `tauri-host` feature.
//!
//! ## Architecture
//!
//! On Android 11+ apps cannot reach shared storage by path. Instead:
//! 1. The user picks a directory via the SAF document tree picker
//! 2. The app receives a `content://` tree URI
//! 3. The app persists the permission with `takePersistableUriPermission()`
//! 4. On later launches the host can reuse the grant without re-prompting
//!
//! `saf::AndroidFsProvider` serves enumeration and descriptor opening over
//! those URIs; `saf::AndroidTreePicker` drives step 1 and delivers the result
//! to the bridge. Devices below API 30 skip all of this and use
//! `fs_abstraction::LocalProvider` over external storage.

pub mod saf;

pub use saf::{AndroidFsProvider, AndroidTreePicker};
