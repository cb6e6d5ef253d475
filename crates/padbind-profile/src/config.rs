use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::{BuildOptions, WorkspaceError};

const DEFAULT_SHELL: &str = "/bin/sh";
const DEFAULT_OSD_TIMEOUT_SECS: f64 = 5.0;

/// Daemon settings read from `config.yaml`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct DaemonConfig {
    /// Allow sessions to observe sources.
    pub enable_sniffing: bool,
    /// Interpreter for `shell` actions, run as `<shell> -c <command>`.
    pub shell: String,
    /// Default OSD message timeout in seconds.
    pub osd_timeout: f64,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            enable_sniffing: false,
            shell: DEFAULT_SHELL.to_string(),
            osd_timeout: DEFAULT_OSD_TIMEOUT_SECS,
        }
    }
}

impl DaemonConfig {
    pub fn parse(input: &str) -> Result<Self, WorkspaceError> {
        if input.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(input)?)
    }

    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, WorkspaceError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::parse(&fs::read_to_string(path)?)
    }

    pub fn build_options(&self) -> BuildOptions {
        let osd_timeout = Duration::try_from_secs_f64(self.osd_timeout)
            .unwrap_or_else(|_| BuildOptions::default().osd_timeout);
        BuildOptions { osd_timeout }
    }
}
