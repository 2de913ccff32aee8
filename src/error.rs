//! Error taxonomy for bridge operations.
//!
//! None of these reach native callers: the facade turns every one of them
//! into a sentinel (empty listing, descriptor `0`). Root resolution has no
//! error variants; its states travel as [`crate::types::RootStatus`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("path not registered: {0}")]
    UnknownPath(String),

    /// Host storage backend rejected a query or open.
    #[error("storage provider failure: {0}")]
    Provider(String),

    #[error("unsupported access mode: {0:?}")]
    InvalidMode(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),
}

pub type BridgeResult<T> = Result<T, BridgeError>;
