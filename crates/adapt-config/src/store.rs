//! Namespaced key/value store with public/mutable side-tables.

use crate::ConfigError;
use crate::key::ConfigKey;
use log::debug;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

/// Options for [`ConfigStore::set`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// Overwrite an existing immutable value.
    pub force: bool,
}

impl SetOptions {
    pub fn forced() -> Self {
        Self { force: true }
    }
}

#[derive(Debug, Default)]
struct StoreState {
    values: HashMap<ConfigKey, Value>,
    public: HashSet<ConfigKey>,
    mutable: HashSet<ConfigKey>,
}

/// Shared config store.
///
/// Writes to a key that already holds a value are dropped unless the key is
/// in the mutable set or the write is forced. The public and mutable sets only
/// ever grow.
#[derive(Debug, Default)]
pub struct ConfigStore {
    state: RwLock<StoreState>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff a value has been set for `key`.
    pub fn has(&self, key: &str) -> bool {
        self.state.read().values.contains_key(key)
    }

    /// Stored value for `key`, if any.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.state.read().values.get(key).cloned()
    }

    /// Decode the stored value for `key` into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        serde_json::from_value(value)
            .map(Some)
            .map_err(|source| ConfigError::Decode {
                key: key.to_string(),
                source,
            })
    }

    /// Write `value` at `key`, returning whether the write took effect.
    pub fn set(&self, key: impl Into<ConfigKey>, value: Value, options: SetOptions) -> bool {
        let key = key.into();
        let mut state = self.state.write();
        if state.values.contains_key(&key) && !state.mutable.contains(&key) && !options.force {
            debug!("dropping write to immutable config key (key={key})");
            return false;
        }
        state.values.insert(key, value);
        true
    }

    /// Mark `key` as safe to expose to untrusted callers.
    pub fn mark_public(&self, key: impl Into<ConfigKey>) {
        self.state.write().public.insert(key.into());
    }

    /// Mark `key` as writable after resolution without forcing.
    pub fn mark_mutable(&self, key: impl Into<ConfigKey>) {
        self.state.write().mutable.insert(key.into());
    }

    pub fn is_public(&self, key: &str) -> bool {
        self.state.read().public.contains(key)
    }

    pub fn is_mutable(&self, key: &str) -> bool {
        self.state.read().mutable.contains(key)
    }

    /// Values for every public key, optionally restricted to mutable keys.
    ///
    /// Public keys without a stored value are omitted.
    pub fn public_values(&self, mutable_only: bool) -> Map<String, Value> {
        let state = self.state.read();
        state
            .public
            .iter()
            .filter(|key| !mutable_only || state.mutable.contains(*key))
            .filter_map(|key| {
                let value = state.values.get(key)?;
                Some((key.to_string(), value.clone()))
            })
            .collect()
    }

    /// Copy of every stored value, ordered by key.
    pub fn snapshot(&self) -> Map<String, Value> {
        let state = self.state.read();
        let mut entries: Vec<_> = state.values.iter().collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        entries
            .into_iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.state.read().values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
