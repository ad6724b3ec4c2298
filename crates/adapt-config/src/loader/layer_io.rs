//! IO helpers for the environment and user file layers.

use crate::ConfigError;
use crate::env::{EnvMapper, parse_env_value};
use crate::store::{ConfigStore, SetOptions};
use log::{info, warn};
use serde_json::Value;
use std::ffi::OsString;
use std::path::Path;

/// Load the user override file; `None` if the file does not exist.
pub async fn load_user_config(path: &Path) -> Result<Option<Value>, ConfigError> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            info!(
                "no user config found, running with defaults (path={})",
                path.display()
            );
            return Ok(None);
        }
        Err(err) => return Err(ConfigError::read(path, err)),
    };
    let value: Value = json5::from_str(&contents).map_err(|err| ConfigError::syntax(path, err))?;
    info!("using user config (path={})", path.display());
    Ok(Some(value))
}

/// Keep environment pairs that are valid UTF-8, skipping the rest.
pub(super) fn utf8_env_vars<I>(vars: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(name, value)| match (name.into_string(), value.into_string()) {
            (Ok(name), Ok(value)) => Some((name, value)),
            (Ok(name), Err(_)) => {
                warn!("skipping environment variable with non-UTF-8 value (name={name})");
                None
            }
            (Err(name), _) => {
                warn!(
                    "skipping environment variable with non-UTF-8 name (name={})",
                    name.to_string_lossy()
                );
                None
            }
        })
        .collect()
}

/// Copy environment values into the store, returning how many were written.
pub(super) fn store_env_settings(
    store: &ConfigStore,
    mapper: &EnvMapper,
    vars: &[(String, String)],
) -> usize {
    let mut written = 0;
    for (name, raw) in vars {
        match mapper.map(name) {
            Ok(key) => {
                if store.set(key, parse_env_value(raw), SetOptions::default()) {
                    written += 1;
                }
            }
            Err(err) => warn!("skipping environment variable: {err}"),
        }
    }
    written
}
