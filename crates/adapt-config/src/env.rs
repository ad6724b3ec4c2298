//! Translation of environment variable names into config keys.
//!
//! Variables named `<PREFIX>_<MODULE_WITH_UNDERSCORES>__<ATTRIBUTE>` map to
//! `<prefix>-<module-with-hyphens>.<ATTRIBUTE>`; everything else passes
//! through verbatim as `env.<NAME>`.
//!
//! A prefixed name without a `__` separator (or with an empty attribute) is
//! rejected with [`ConfigError::MalformedEnvVar`] rather than producing a key
//! with a missing attribute segment.

use crate::ConfigError;
use crate::key::ConfigKey;
use serde_json::Value;

/// Default reserved application prefix.
pub const DEFAULT_ENV_PREFIX: &str = "ADAPT_AUTHORING";

const ATTRIBUTE_SEPARATOR: &str = "__";

/// Maps environment variable names to config keys for a given prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvMapper {
    prefix: String,
}

impl Default for EnvMapper {
    fn default() -> Self {
        Self::new(DEFAULT_ENV_PREFIX)
    }
}

impl EnvMapper {
    /// Create a mapper for `prefix` (without the trailing underscore).
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// True if `name` carries the reserved prefix followed by an underscore.
    pub fn is_reserved(&self, name: &str) -> bool {
        name.strip_prefix(self.prefix.as_str())
            .is_some_and(|rest| rest.starts_with('_'))
    }

    /// Map an environment variable name to its config key.
    pub fn map(&self, name: &str) -> Result<ConfigKey, ConfigError> {
        if !self.is_reserved(name) {
            return Ok(ConfigKey::env(name));
        }
        let Some((module, attribute)) = name.split_once(ATTRIBUTE_SEPARATOR) else {
            return Err(ConfigError::MalformedEnvVar(name.to_string()));
        };
        if attribute.is_empty() {
            return Err(ConfigError::MalformedEnvVar(name.to_string()));
        }
        let namespace = module.replace('_', "-").to_lowercase();
        Ok(ConfigKey::new(&namespace, attribute))
    }
}

/// Parse a raw environment value, keeping non-JSON text as a string.
pub fn parse_env_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
