//! Action dispatch and runtime interception for game controllers.
//!
//! Device events are routed through a tree of stateful action nodes bound
//! per input source. Control sessions can lock or observe individual
//! sources, and those interceptions survive wholesale profile replacement.

pub mod action;
pub mod dispatch;
pub mod error;
pub mod intercept;
pub mod logging;
pub mod modifier;
pub mod output;
pub mod profile;
pub mod runtime;
pub mod scheduler;
pub mod session;
pub mod types;

#[cfg(test)]
mod testing;

pub use action::{Action, ActionRef, Context};
pub use dispatch::Dispatcher;
pub use error::{InterceptError, Result, RuntimeError};
pub use output::{HapticEffect, HapticPosition, MenuKind, MenuRequest, Output};
pub use profile::{is_file_menu, Menu, MenuItem, Profile, ProfileBuilder};
pub use runtime::{DeviceControl, LoadError, ProfileLoader, Runtime};
pub use scheduler::{Task, RELEASE_DELAY};
pub use session::{SessionHandle, SessionId};
pub use types::{Button, Buttons, PadEvent, Source, SourceKind, Sources};
