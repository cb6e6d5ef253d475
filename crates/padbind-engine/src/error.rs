use std::path::PathBuf;

use thiserror::Error;

use crate::session::SessionId;
use crate::types::Source;

/// Rejected lock, observe or unlock request. No binding was changed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterceptError {
    #[error("Unknown source: {0}")]
    UnknownSource(String),
    #[error("Cannot lock {0}")]
    Conflict(Source),
    #[error("{0} is not locked by this session")]
    NotLocked(Source),
    #[error("{0} is not observed by this session")]
    NotObserved(Source),
    #[error("Sniffing disabled.")]
    SniffingDisabled,
    #[error("Session {0} is not connected")]
    UnknownSession(SessionId),
}

/// Error type for runtime operations.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("failed to load profile {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error(transparent)]
    Intercept(#[from] InterceptError),
    #[error("Selected menu item is no longer valid")]
    UnknownMenuItem { menu: String, item: String },
}

/// Convenient result alias for runtime operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;
