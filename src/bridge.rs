//! Storage bridge facade.
//!
//! `StorageBridge` owns the handle registry and the root handshake, and holds
//! the host provider and picker. Its public methods never fail: every error
//! becomes a sentinel (pending root, empty listing, descriptor `0`).

use std::os::fd::RawFd;
use std::sync::Arc;

use crate::config::BridgeConfig;
use crate::enumerator;
use crate::fs_abstraction::{RootPicker, StorageProvider};
use crate::grant::{GrantCompletion, PendingGrant};
use crate::opener;
use crate::registry::HandleRegistry;
use crate::types::{RootStatus, StorageHandle, VirtualPath};

pub struct StorageBridge {
    registry: Arc<HandleRegistry>,
    provider: Arc<dyn StorageProvider>,
    picker: Arc<dyn RootPicker>,
    pending: PendingGrant,
    config: BridgeConfig,
}

impl StorageBridge {
    pub fn new(
        provider: Arc<dyn StorageProvider>,
        picker: Arc<dyn RootPicker>,
        config: BridgeConfig,
    ) -> Self {
        if config.allow_legacy && config.legacy_root.is_some() && provider.legacy_root().is_none() {
            tracing::warn!(
                "[Bridge] Ignoring configured legacy root: this storage provider is scoped"
            );
        }
        Self {
            registry: Arc::new(HandleRegistry::new()),
            provider,
            picker,
            pending: PendingGrant::new(),
            config,
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn registry(&self) -> &HandleRegistry {
        &self.registry
    }

    /// Unrestricted root, if legacy mode is allowed and the provider has one.
    /// A configured root replaces the detected one but never enables legacy
    /// mode on a scoped provider.
    fn legacy_root(&self) -> Option<String> {
        if !self.config.allow_legacy {
            return None;
        }
        let detected = self.provider.legacy_root()?;
        Some(self.config.legacy_root.clone().unwrap_or(detected))
    }

    /// Ask for the storage root.
    ///
    /// Without scoped storage the unrestricted root is returned at once.
    /// Otherwise the first call launches the picker and returns `Pending`;
    /// later calls return `Pending` until the picker answers, then hand out
    /// the answer once and reset.
    pub fn request_root(&self) -> RootStatus {
        if let Some(root) = self.legacy_root() {
            if !self.registry.contains(&root) {
                tracing::info!("[Bridge] Using unrestricted storage root {}", root);
                self.registry
                    .register(VirtualPath::new(root.as_str()), StorageHandle::new(root.as_str()));
            }
            return RootStatus::Ready(VirtualPath::new(root));
        }

        self.pending.poll_or_begin(|tx| {
            let completion = GrantCompletion::new(
                tx,
                self.registry.clone(),
                self.provider.clone(),
                self.config.persist_grants,
            );
            self.picker.launch(completion);
        })
    }

    /// [`request_root`](Self::request_root) in two-sentinel form:
    /// `None` while pending, `Some("")` after a denial.
    pub fn request_root_path(&self) -> Option<String> {
        self.request_root().into_path_sentinel()
    }

    /// Current root state without launching a picker or consuming an answer.
    /// `None` means no request is open.
    pub fn root_status(&self) -> Option<RootStatus> {
        if let Some(root) = self.legacy_root() {
            return Some(RootStatus::Ready(VirtualPath::new(root)));
        }
        self.pending.status()
    }

    /// Child names of a registered directory; empty on any failure.
    pub fn list_directory(&self, path: &str) -> Vec<String> {
        enumerator::list_children(
            &self.registry,
            self.provider.as_ref(),
            path,
            &self.config.path_separator,
            &self.config.directory_marker,
        )
    }

    /// Caller-owned descriptor for a registered file; `0` on any failure.
    pub fn open_as_descriptor(&self, path: &str, mode: &str) -> RawFd {
        opener::open(&self.registry, self.provider.as_ref(), path, mode)
    }
}
