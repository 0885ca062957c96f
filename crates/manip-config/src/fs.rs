// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! One JSON file per key under a directory.

use directories::ProjectDirs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::{ConfigError, ConfigStore};

/// Directory-backed store. Defaults to the platform config dir.
#[derive(Debug, Clone)]
pub struct FsConfigStore {
    root: PathBuf,
}

impl FsConfigStore {
    /// Store under the user config directory for `manip-graph`
    /// (`~/.config/manip-graph` on Linux).
    pub fn new() -> Result<Self, ConfigError> {
        ProjectDirs::from("dev", "flyingrobots", "manip-graph")
            .ok_or(ConfigError::NoConfigDir)
            .and_then(|dirs| Self::at(dirs.config_dir()))
    }

    /// Store under `root`; the directory is created when absent.
    pub fn at(root: impl AsRef<Path>) -> Result<Self, ConfigError> {
        std::fs::create_dir_all(root.as_ref())?;
        Ok(Self {
            root: root.as_ref().to_path_buf(),
        })
    }

    /// Directory holding the `.json` files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file(&self, key: &str) -> PathBuf {
        let mut name = key.to_owned();
        name.push_str(".json");
        self.root.join(name)
    }
}

impl ConfigStore for FsConfigStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        std::fs::read(self.file(key)).map_err(|err| match err.kind() {
            ErrorKind::NotFound => ConfigError::Missing(key.to_owned()),
            _ => err.into(),
        })
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        // The root may have been removed since construction.
        std::fs::create_dir_all(&self.root)?;
        std::fs::write(self.file(key), data).map_err(Into::into)
    }

    fn remove_raw(&self, key: &str) -> Result<bool, ConfigError> {
        match std::fs::remove_file(self.file(key)) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}
