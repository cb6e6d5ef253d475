use std::path::{Path, PathBuf};

use crate::{BuildOptions, DaemonConfig, ProfileEventReceiver, ProfileWatcher, WorkspaceError};

const HOME_ENV: &str = "PADBIND_HOME";
const DEFAULT_WORKSPACE_PATH: &str = ".config/padbind";
const PROFILE_FILE_NAME: &str = "profile.yaml";
const CONFIG_FILE_NAME: &str = "config.yaml";
const SOCKET_FILE_NAME: &str = "daemon.sock";
const MENUS_DIR_NAME: &str = "menus";

/// Directory holding the daemon configuration, the default profile and the
/// session socket.
#[derive(Debug, Clone)]
pub struct Workspace {
    path: PathBuf,
}

impl Workspace {
    pub fn new(path: Option<&Path>) -> Result<Self, WorkspaceError> {
        let path = match path {
            Some(path) => path.to_owned(),
            None => Self::default_path()?,
        };

        if !path.exists() {
            std::fs::create_dir_all(&path)?;
        } else if !path.is_dir() {
            return Err(WorkspaceError::PathIsNotDirectory(
                path.display().to_string(),
            ));
        }

        Ok(Self { path })
    }

    #[cfg(target_os = "macos")]
    pub fn start_profile_watcher(
        &self,
        profile_path: &Path,
        options: BuildOptions,
    ) -> Result<
        (ProfileWatcher<notify::FsEventWatcher>, ProfileEventReceiver),
        WorkspaceError,
    > {
        Ok(ProfileWatcher::<notify::FsEventWatcher>::new(profile_path, options)?)
    }

    #[cfg(not(target_os = "macos"))]
    pub fn start_profile_watcher(
        &self,
        profile_path: &Path,
        options: BuildOptions,
    ) -> Result<
        (ProfileWatcher<notify::PollWatcher>, ProfileEventReceiver),
        WorkspaceError,
    > {
        Ok(ProfileWatcher::<notify::PollWatcher>::new(profile_path, options)?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn profile_path(&self) -> PathBuf {
        self.path.join(PROFILE_FILE_NAME)
    }

    pub fn config_path(&self) -> PathBuf {
        self.path.join(CONFIG_FILE_NAME)
    }

    pub fn socket_path(&self) -> PathBuf {
        self.path.join(SOCKET_FILE_NAME)
    }

    /// Directory of stand-alone menu files.
    pub fn menus_path(&self) -> PathBuf {
        self.path.join(MENUS_DIR_NAME)
    }

    pub fn config(&self) -> Result<DaemonConfig, WorkspaceError> {
        DaemonConfig::load(&self.config_path())
    }

    /// `$PADBIND_HOME`, or `~/.config/padbind`.
    pub fn default_path() -> Result<PathBuf, WorkspaceError> {
        if let Some(path) = std::env::var_os(HOME_ENV).filter(|value| !value.is_empty()) {
            return Ok(PathBuf::from(path));
        }
        let path = std::env::var("HOME")
            .map(PathBuf::from)
            .map(|p| p.join(DEFAULT_WORKSPACE_PATH))
            .map_err(|_| WorkspaceError::EnvVarNotSet("HOME".to_string()))?;

        Ok(path)
    }
}
