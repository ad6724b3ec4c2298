//! Expansion of directory tokens in resolved values.
//!
//! `$ROOT` expands to the application root; `$DATA` and `$TEMP` expand to the
//! core module's `dataDir` and `tempDir` values, so the core module must
//! resolve before any other.

use crate::key::ConfigKey;
use crate::store::ConfigStore;
use log::warn;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Core attribute backing the `$DATA` token.
pub const DATA_DIR_ATTRIBUTE: &str = "dataDir";
/// Core attribute backing the `$TEMP` token.
pub const TEMP_DIR_ATTRIBUTE: &str = "tempDir";

const ROOT_TOKEN: &str = "$ROOT";
const DATA_TOKEN: &str = "$DATA";
const TEMP_TOKEN: &str = "$TEMP";

/// Directory roots available for token expansion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryTokens {
    pub root: Option<PathBuf>,
    pub data: Option<PathBuf>,
    pub temp: Option<PathBuf>,
}

impl DirectoryTokens {
    /// Build tokens from the app root and whatever the core module resolved.
    pub fn from_store(root: Option<&Path>, store: &ConfigStore, core_module: Option<&str>) -> Self {
        let lookup = |attribute: &str| {
            let module = core_module?;
            let value = store.get(ConfigKey::new(module, attribute).as_str())?;
            value.as_str().map(PathBuf::from)
        };
        Self {
            root: root.map(Path::to_path_buf),
            data: lookup(DATA_DIR_ATTRIBUTE),
            temp: lookup(TEMP_DIR_ATTRIBUTE),
        }
    }

    /// Expand a leading directory token in `value`, if present.
    ///
    /// Values that are not strings, carry no token, or reference an unknown
    /// directory are returned unchanged.
    pub fn expand(&self, key: &ConfigKey, value: Value) -> Value {
        let text = match &value {
            Value::String(text) => text.clone(),
            _ => return value,
        };
        for (token, dir) in [
            (ROOT_TOKEN, &self.root),
            (DATA_TOKEN, &self.data),
            (TEMP_TOKEN, &self.temp),
        ] {
            let Some(rest) = text.strip_prefix(token) else {
                continue;
            };
            if !rest.is_empty() && !rest.starts_with(['/', '\\']) {
                continue;
            }
            let Some(dir) = dir else {
                warn!("cannot expand directory token (key={key}, token={token})");
                return value;
            };
            let rest = rest.trim_start_matches(['/', '\\']);
            let expanded = if rest.is_empty() {
                dir.clone()
            } else {
                dir.join(rest)
            };
            return Value::String(expanded.to_string_lossy().to_string());
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SetOptions;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn key() -> ConfigKey {
        ConfigKey::new("mymodule", "dir")
    }

    #[test]
    fn expands_root_token() {
        let tokens = DirectoryTokens {
            root: Some(PathBuf::from("/srv/app")),
            ..DirectoryTokens::default()
        };
        let expected = PathBuf::from("/srv/app").join("uploads");
        assert_eq!(
            tokens.expand(&key(), json!("$ROOT/uploads")),
            json!(expected.to_string_lossy())
        );
        assert_eq!(tokens.expand(&key(), json!("$ROOT")), json!("/srv/app"));
    }

    #[test]
    fn leaves_other_values_alone() {
        let tokens = DirectoryTokens {
            root: Some(PathBuf::from("/srv/app")),
            ..DirectoryTokens::default()
        };
        assert_eq!(tokens.expand(&key(), json!("/abs/path")), json!("/abs/path"));
        assert_eq!(tokens.expand(&key(), json!("$ROOTS/x")), json!("$ROOTS/x"));
        assert_eq!(tokens.expand(&key(), json!(5)), json!(5));
        assert_eq!(tokens.expand(&key(), json!("$DATA/x")), json!("$DATA/x"));
    }

    #[test]
    fn reads_data_and_temp_from_core_module() {
        let store = ConfigStore::new();
        store.set("core.dataDir", json!("/var/data"), SetOptions::default());
        store.set("core.tempDir", json!("/tmp/app"), SetOptions::default());
        let tokens = DirectoryTokens::from_store(None, &store, Some("core"));
        assert_eq!(tokens.data, Some(PathBuf::from("/var/data")));
        assert_eq!(tokens.temp, Some(PathBuf::from("/tmp/app")));
        assert_eq!(tokens.root, None);

        let none = DirectoryTokens::from_store(None, &store, None);
        assert_eq!(none, DirectoryTokens::default());
    }
}
