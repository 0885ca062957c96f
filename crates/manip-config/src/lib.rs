// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Config persistence for planning sessions.
//!
//! Values are encoded as pretty JSON by [`ConfigService`] and handed to a
//! [`ConfigStore`] as opaque blobs. [`MemoryConfigStore`] keeps them in a map;
//! [`FsConfigStore`] writes `<key>.json` under a directory.
#![forbid(unsafe_code)]

mod fs;
mod memory;

pub use fs::FsConfigStore;
pub use memory::MemoryConfigStore;

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Blob storage addressed by config key.
pub trait ConfigStore {
    /// Fetch the blob for `key`, or [`ConfigError::Missing`].
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError>;
    /// Replace the blob for `key`.
    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError>;
    /// Drop the blob for `key`. Returns whether anything was stored.
    fn remove_raw(&self, key: &str) -> Result<bool, ConfigError>;
}

/// Failures raised while loading or storing config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Nothing stored under the key.
    #[error("no config stored under `{0}`")]
    Missing(String),
    /// Key is empty or would escape the store (path separators, `..`).
    #[error("invalid config key `{0}`")]
    InvalidKey(String),
    /// The platform config directory could not be determined.
    #[error("could not resolve the platform config directory")]
    NoConfigDir,
    /// Underlying read or write failed.
    #[error("config io: {0}")]
    Io(#[from] std::io::Error),
    /// Stored bytes are not valid JSON for the requested type.
    #[error("config encoding: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Rejects keys that cannot name a single flat entry.
pub(crate) fn check_key(key: &str) -> Result<(), ConfigError> {
    let bad = key.is_empty()
        || key == "."
        || key == ".."
        || key.chars().any(|c| matches!(c, '/' | '\\' | '\0'));
    if bad {
        return Err(ConfigError::InvalidKey(key.to_owned()));
    }
    Ok(())
}

/// Typed front-end over a [`ConfigStore`].
#[derive(Debug)]
pub struct ConfigService<S> {
    store: S,
}

impl<S> ConfigService<S> {
    /// Wraps `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The wrapped store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Unwraps the store.
    pub fn into_inner(self) -> S {
        self.store
    }
}

impl<S: ConfigStore> ConfigService<S> {
    /// Decodes the value under `key`. Missing keys and empty blobs yield
    /// `Ok(None)`.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        check_key(key)?;
        let bytes = match self.store.load_raw(key) {
            Err(ConfigError::Missing(_)) => return Ok(None),
            other => other?,
        };
        if bytes.is_empty() {
            return Ok(None);
        }
        serde_json::from_slice(&bytes).map(Some).map_err(Into::into)
    }

    /// [`ConfigService::load`], substituting `T::default()` for absent values.
    pub fn load_or_default<T>(&self, key: &str) -> Result<T, ConfigError>
    where
        T: DeserializeOwned + Default,
    {
        self.load(key).map(Option::unwrap_or_default)
    }

    /// Encodes `value` and stores it under `key`.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), ConfigError> {
        check_key(key)?;
        let encoded = serde_json::to_vec_pretty(value)?;
        self.store.save_raw(key, &encoded)
    }

    /// Forgets `key`. Returns whether a value was present.
    pub fn remove(&self, key: &str) -> Result<bool, ConfigError> {
        check_key(key)?;
        self.store.remove_raw(key)
    }
}
