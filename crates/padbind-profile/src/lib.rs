//! Declarative YAML profiles for the padbind engine.
//!
//! Profiles are parsed into a versioned description and built into engine
//! action trees. The crate also owns the on-disk workspace layout, the
//! daemon configuration file and the profile watcher.

mod config;
mod loader;
mod parse;
mod v1;
mod watcher;
mod workspace;

use thiserror::Error;

pub use config::DaemonConfig;
pub use loader::YamlLoader;
pub use parse::{load_menu, load_profile, parse_profile, parse_profile_with, BuildOptions};
pub use watcher::{ProfileEvent, ProfileEventReceiver, ProfileWatcher, WatcherError};
pub use workspace::Workspace;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("yaml deserialize error: {0}")]
    YamlDeserializeError(#[from] serde_yaml::Error),
    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),
    #[error("v1 profile error: {0}")]
    V1ProfileError(#[from] v1::Error),
    #[error("profile not found: {0}")]
    ProfileNotFound(String),
    #[error("path error: {0}")]
    PathError(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("environment variable not set: {0}")]
    EnvVarNotSet(String),
    #[error("path is not a directory: {0}")]
    PathIsNotDirectory(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(#[from] serde_yaml::Error),
    #[error("watcher error: {0}")]
    WatcherError(#[from] WatcherError),
}
