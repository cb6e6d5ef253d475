//! Fakes for daemon tests.

use std::path::Path;
use std::sync::Arc;

use padbind_engine::{DeviceControl, LoadError, Menu, Profile, ProfileLoader, Runtime};
use padbind_profile::YamlLoader;

pub(crate) struct NoDevice;

impl DeviceControl for NoDevice {
    fn set_gyro_enabled(&self, _enabled: bool) {}
}

/// Loads real YAML profiles; a path containing `broken` always fails.
pub(crate) struct Loader(YamlLoader);

impl ProfileLoader for Loader {
    fn load(&self, path: &Path) -> Result<Profile, LoadError> {
        if path.to_string_lossy().contains("broken") {
            return Err("unexpected end of stream".into());
        }
        self.0.load(path)
    }

    fn load_menu(&self, path: &Path) -> Result<Menu, LoadError> {
        self.0.load_menu(path)
    }
}

pub(crate) fn runtime_with(profile: Profile) -> Arc<Runtime> {
    Arc::new(Runtime::new(
        profile,
        Arc::new(NoDevice),
        Box::new(Loader(YamlLoader::default())),
    ))
}

pub(crate) fn runtime() -> Arc<Runtime> {
    runtime_with(Profile::empty("/profiles/default.yaml"))
}
