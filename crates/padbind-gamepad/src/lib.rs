//! Controller transport for padbind.
//!
//! A background thread owns the SDL2 context, turns controller input into
//! engine [`PadEvent`](padbind_engine::PadEvent)s laid out like a Steam
//! Controller, and executes rumble and gyro commands. When the backend
//! cannot start, the thread reports it and retries.

mod command;
mod events;
mod manager;
mod mapping;
#[cfg(feature = "sdl2-backend")]
mod runtime;
mod types;

use thiserror::Error;

pub use crate::events::{ControllerEvent, EventReceiver};
pub use crate::manager::{ControllerManager, RETRY_DELAY};
pub use crate::types::{ControllerId, ControllerInfo};

/// Error type for controller management operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to initialize the backend (SDL2 or subsystems).
    #[error("Backend init failed: {0}")]
    BackendInit(String),
    /// Operation is not supported on the current device/backend.
    #[error("Operation unsupported")]
    Unsupported,
    /// A generic backend error.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Convenient result alias for controller operations.
pub type Result<T> = std::result::Result<T, Error>;
