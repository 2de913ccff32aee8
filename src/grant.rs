//! Root resolution handshake.
//!
//! The picker answers on a host callback thread; callers poll from their own
//! thread. `PendingGrant` is the only point where the two meet: a oneshot
//! channel created when the picker launches, drained by `try_recv` under a
//! mutex.
//!
//! State machine: `Idle -> Awaiting -> Resolved(outcome) -> Idle`. Taking a
//! resolved outcome resets to `Idle`, so the next request launches a fresh
//! picker.

use std::sync::{Arc, Mutex};

use tokio::sync::oneshot::{self, error::TryRecvError};

use crate::fs_abstraction::StorageProvider;
use crate::registry::HandleRegistry;
use crate::types::{RootStatus, StorageHandle, VirtualPath};

/// What the picker delivered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GrantOutcome {
    Granted(VirtualPath),
    Denied,
}

impl From<GrantOutcome> for RootStatus {
    fn from(outcome: GrantOutcome) -> Self {
        match outcome {
            GrantOutcome::Granted(path) => RootStatus::Ready(path),
            GrantOutcome::Denied => RootStatus::Denied,
        }
    }
}

enum GrantState {
    Idle,
    Awaiting(oneshot::Receiver<GrantOutcome>),
    Resolved(GrantOutcome),
}

pub struct PendingGrant {
    state: Mutex<GrantState>,
}

impl Default for PendingGrant {
    fn default() -> Self {
        Self::new()
    }
}

impl PendingGrant {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GrantState::Idle),
        }
    }

    /// Poll for the root, launching the picker through `launch` if no request is open.
    ///
    /// `launch` runs at most once per session. A resolved outcome is handed
    /// out once and the state returns to idle.
    pub fn poll_or_begin<F>(&self, launch: F) -> RootStatus
    where
        F: FnOnce(oneshot::Sender<GrantOutcome>),
    {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Self::drain(&mut state);

        let current = std::mem::replace(&mut *state, GrantState::Idle);
        match current {
            GrantState::Idle => {
                let (tx, rx) = oneshot::channel();
                *state = GrantState::Awaiting(rx);
                // Launch unlocked: a picker may answer, or poll, before returning.
                drop(state);
                tracing::info!("[Grant] Launching storage root picker");
                launch(tx);
                RootStatus::Pending
            }
            GrantState::Awaiting(rx) => {
                *state = GrantState::Awaiting(rx);
                RootStatus::Pending
            }
            GrantState::Resolved(outcome) => outcome.into(),
        }
    }

    /// Current status without consuming a resolved outcome.
    pub fn status(&self) -> Option<RootStatus> {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Self::drain(&mut state);
        match &*state {
            GrantState::Idle => None,
            GrantState::Awaiting(_) => Some(RootStatus::Pending),
            GrantState::Resolved(outcome) => Some(outcome.clone().into()),
        }
    }

    pub fn is_awaiting(&self) -> bool {
        matches!(self.status(), Some(RootStatus::Pending))
    }

    fn drain(state: &mut GrantState) {
        if let GrantState::Awaiting(rx) = state {
            match rx.try_recv() {
                Ok(outcome) => *state = GrantState::Resolved(outcome),
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Closed) => {
                    tracing::warn!(
                        "[Grant] Picker went away without answering; treating as denied"
                    );
                    *state = GrantState::Resolved(GrantOutcome::Denied);
                }
            }
        }
    }
}

/// Single-use answer slot handed to a [`crate::fs_abstraction::RootPicker`].
///
/// Both `grant` and `deny` consume the completion, so a picker answers at
/// most once. Dropping it unanswered counts as a denial.
pub struct GrantCompletion {
    tx: oneshot::Sender<GrantOutcome>,
    registry: Arc<HandleRegistry>,
    provider: Arc<dyn StorageProvider>,
    persist: bool,
}

impl GrantCompletion {
    pub(crate) fn new(
        tx: oneshot::Sender<GrantOutcome>,
        registry: Arc<HandleRegistry>,
        provider: Arc<dyn StorageProvider>,
        persist: bool,
    ) -> Self {
        Self {
            tx,
            registry,
            provider,
            persist,
        }
    }

    /// Deliver a granted root handle.
    ///
    /// The grant is persisted and the root registered before the outcome is
    /// sent, so a poll that sees the path can use it immediately.
    pub fn grant(self, handle: StorageHandle) {
        if self.persist {
            if let Err(e) = self.provider.persist_grant(&handle) {
                tracing::warn!("[Grant] Failed to persist permission for {}: {}", handle, e);
            }
        }

        let path = VirtualPath::new(self.provider.root_virtual_path(&handle));
        tracing::info!("[Grant] Storage root granted: {}", path);
        self.registry.register(path.clone(), handle);

        if self.tx.send(GrantOutcome::Granted(path)).is_err() {
            tracing::debug!("[Grant] Nobody is polling for the granted root any more");
        }
    }

    /// Deliver a denial or cancellation.
    pub fn deny(self) {
        tracing::info!("[Grant] Storage root request denied");
        let _ = self.tx.send(GrantOutcome::Denied);
    }
}
