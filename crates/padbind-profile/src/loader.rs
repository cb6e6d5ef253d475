use std::path::Path;

use padbind_engine::{LoadError, Menu, Profile, ProfileLoader};

use crate::{load_menu, load_profile, BuildOptions};

/// Builds profiles from YAML files for the engine runtime.
#[derive(Debug, Clone, Default)]
pub struct YamlLoader {
    options: BuildOptions,
}

impl YamlLoader {
    pub fn new(options: BuildOptions) -> Self {
        Self { options }
    }
}

impl ProfileLoader for YamlLoader {
    fn load(&self, path: &Path) -> Result<Profile, LoadError> {
        Ok(load_profile(path, &self.options)?)
    }

    fn load_menu(&self, path: &Path) -> Result<Menu, LoadError> {
        Ok(load_menu(path, &self.options)?)
    }
}
