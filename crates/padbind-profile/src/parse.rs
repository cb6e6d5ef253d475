use std::fs;
use std::path::Path;
use std::time::Duration;

use padbind_engine::action::DEFAULT_OSD_TIMEOUT;
use padbind_engine::{Menu, Profile};
use serde::Deserialize;

use crate::v1::{build_menu_file, MenuItemV1, ProfileV1};
use crate::ProfileError;

/// Defaults applied while building trees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildOptions {
    /// Used by `osd` nodes that do not set their own timeout.
    pub osd_timeout: Duration,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            osd_timeout: DEFAULT_OSD_TIMEOUT,
        }
    }
}

/// Parse yaml profile.
pub fn parse_profile(input: &str, path: &Path) -> Result<Profile, ProfileError> {
    parse_profile_with(input, path, &BuildOptions::default())
}

pub fn parse_profile_with(
    input: &str,
    path: &Path,
    options: &BuildOptions,
) -> Result<Profile, ProfileError> {
    let version = parse_version(input)?;
    match version {
        1 => {
            let profile: ProfileV1 = serde_yaml::from_str(input)?;
            let profile = profile.build(path, options)?;
            Ok(profile)
        }
        _ => Err(ProfileError::UnsupportedVersion(version)),
    }
}

/// Read and build the profile stored at `path`.
pub fn load_profile(path: &Path, options: &BuildOptions) -> Result<Profile, ProfileError> {
    if !path.exists() {
        return Err(ProfileError::ProfileNotFound(path.display().to_string()));
    }
    let content = fs::read_to_string(path)?;
    parse_profile_with(&content, path, options)
}

/// Read and build a stand-alone menu file, a YAML list of menu items. The
/// menu is named after its path.
pub fn load_menu(path: &Path, options: &BuildOptions) -> Result<Menu, ProfileError> {
    if !path.exists() {
        return Err(ProfileError::ProfileNotFound(path.display().to_string()));
    }
    let content = fs::read_to_string(path)?;
    let items: Vec<MenuItemV1> = serde_yaml::from_str(&content)?;
    Ok(build_menu_file(&path.display().to_string(), &items, options)?)
}

/// A profile with a version.
#[derive(Debug, Clone, Deserialize)]
struct VersionedProfile {
    version: u8,
}

/// Parse the version of yaml profile.
fn parse_version(input: &str) -> Result<u8, ProfileError> {
    let raw: VersionedProfile = serde_yaml::from_str(input)?;
    Ok(raw.version)
}
