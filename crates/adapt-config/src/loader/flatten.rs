//! Flattening of the two-level user config structure into config keys.

use crate::ConfigError;
use crate::key::ConfigKey;
use serde_json::Value;
use std::path::Path;

/// Flatten `{ "<module>": { "<attribute>": value } }` into keyed values.
pub(super) fn flatten_user_config(
    path: &Path,
    value: Value,
) -> Result<Vec<(ConfigKey, Value)>, ConfigError> {
    let Value::Object(modules) = value else {
        return Err(ConfigError::syntax(path, "expected an object of module settings"));
    };
    let mut entries = Vec::new();
    for (module, settings) in modules {
        let Value::Object(settings) = settings else {
            return Err(ConfigError::syntax(
                path,
                format!("expected an object for module '{module}'"),
            ));
        };
        for (attribute, value) in settings {
            entries.push((ConfigKey::new(&module, &attribute), value));
        }
    }
    Ok(entries)
}
