//! Shape checks and normalization for module schema declarations.

use crate::ConfigError;
use crate::model::{ModuleSchema, PropertySpec};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Object holding module-specific markers on a property.
const MARKER_OBJECT: &str = "_adapt";
/// Property-level keys that are not part of standard JSON schema.
const MARKER_KEYS: &[&str] = &[MARKER_OBJECT, "isPublic", "isMutable", "isDirectory"];

/// Parse a module schema document into a [`ModuleSchema`].
pub(crate) fn parse_module_schema(module: &str, value: Value) -> Result<ModuleSchema, ConfigError> {
    let Value::Object(mut root) = value else {
        return Err(invalid_schema(module, "", "expected object"));
    };

    let mut required = match root.remove("required") {
        None => Vec::new(),
        Some(value) => string_array(module, "required", value)?,
    };

    let raw_properties = match root.remove("properties") {
        Some(Value::Object(map)) => map,
        Some(_) => return Err(invalid_schema(module, "properties", "expected object")),
        None => return Err(invalid_schema(module, "properties", "missing required field")),
    };

    let mut properties = BTreeMap::new();
    let mut normalized = Map::new();
    for (name, definition) in raw_properties {
        let path = join_path("properties", &name);
        let Value::Object(mut definition) = definition else {
            return Err(invalid_schema(module, &path, "expected object"));
        };
        if let Some(flag) = definition.remove("required") {
            match flag {
                Value::Bool(true) => required.push(name.clone()),
                Value::Bool(false) => {}
                // Array-valued `required` belongs to nested object schemas.
                other @ Value::Array(_) => {
                    definition.insert("required".to_string(), other);
                }
                _ => {
                    return Err(invalid_schema(
                        module,
                        &join_path(&path, "required"),
                        "expected bool or array",
                    ));
                }
            }
        }
        let spec = property_spec(module, &path, &definition)?;
        for key in MARKER_KEYS {
            definition.remove(*key);
        }
        normalized.insert(name.clone(), Value::Object(definition));
        properties.insert(name, spec);
    }

    let mut seen = std::collections::HashSet::new();
    required.retain(|name| seen.insert(name.clone()));

    let mut validation_schema = root;
    validation_schema
        .entry("type")
        .or_insert_with(|| Value::String("object".to_string()));
    validation_schema.insert("properties".to_string(), Value::Object(normalized));
    if !required.is_empty() {
        validation_schema.insert(
            "required".to_string(),
            Value::Array(required.iter().cloned().map(Value::String).collect()),
        );
    }

    Ok(ModuleSchema {
        module: module.to_string(),
        properties,
        required,
        validation_schema: Value::Object(validation_schema),
    })
}

/// Extract declared metadata from a single property definition.
fn property_spec(
    module: &str,
    path: &str,
    definition: &Map<String, Value>,
) -> Result<PropertySpec, ConfigError> {
    let markers = match definition.get(MARKER_OBJECT) {
        None => None,
        Some(Value::Object(map)) => Some(map),
        Some(_) => {
            return Err(invalid_schema(
                module,
                &join_path(path, MARKER_OBJECT),
                "expected object",
            ));
        }
    };
    let flag = |name: &str| -> Result<bool, ConfigError> {
        let direct = definition.get(name);
        let nested = markers.and_then(|map| map.get(name));
        let mut set = false;
        for (value, value_path) in [
            (direct, join_path(path, name)),
            (nested, join_path(&join_path(path, MARKER_OBJECT), name)),
        ] {
            match value {
                None => {}
                Some(Value::Bool(b)) => set |= *b,
                Some(_) => return Err(invalid_schema(module, &value_path, "expected bool")),
            }
        }
        Ok(set)
    };

    Ok(PropertySpec {
        default: definition.get("default").cloned(),
        is_public: flag("isPublic")?,
        is_mutable: flag("isMutable")?,
        is_directory: flag("isDirectory")?,
    })
}

/// Expect an array of strings.
fn string_array(module: &str, path: &str, value: Value) -> Result<Vec<String>, ConfigError> {
    let Value::Array(items) = value else {
        return Err(invalid_schema(module, path, "expected array"));
    };
    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| match item {
            Value::String(s) => Ok(s),
            _ => Err(invalid_schema(
                module,
                &format!("{path}[{idx}]"),
                "expected string",
            )),
        })
        .collect()
}

/// Join nested paths for better error messages.
fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Build a structured invalid-schema error.
fn invalid_schema(module: &str, path: &str, message: &str) -> ConfigError {
    let normalized_path = if path.is_empty() { "root" } else { path };
    ConfigError::InvalidSchema {
        module: module.to_string(),
        message: format!("{normalized_path}: {message}"),
    }
}
