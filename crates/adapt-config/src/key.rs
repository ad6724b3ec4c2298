//! Namespaced config keys.

use std::borrow::Borrow;
use std::fmt;

/// Namespace used for raw environment passthrough values.
pub const ENV_NAMESPACE: &str = "env";

/// Dotted `<namespace>.<attribute>` key addressing a single config value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfigKey(String);

impl ConfigKey {
    /// Join a namespace and attribute into a key.
    pub fn new(namespace: &str, attribute: &str) -> Self {
        Self(format!("{namespace}.{attribute}"))
    }

    /// Key for a raw environment value.
    pub fn env(name: &str) -> Self {
        Self::new(ENV_NAMESPACE, name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConfigKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ConfigKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for ConfigKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ConfigKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}
