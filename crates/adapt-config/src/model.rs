//! Module and schema declaration models.

use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A module participating in config resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
    /// Canonical module name, used as the config namespace.
    pub name: String,
    /// Root directory used to locate the module's schema file.
    pub root_dir: PathBuf,
}

impl ModuleDescriptor {
    pub fn new(name: impl Into<String>, root_dir: impl AsRef<Path>) -> Self {
        Self {
            name: name.into(),
            root_dir: root_dir.as_ref().to_path_buf(),
        }
    }
}

/// A single declared schema property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySpec {
    pub default: Option<Value>,
    /// Safe to expose to untrusted callers.
    pub is_public: bool,
    /// May be overwritten after resolution without forcing.
    pub is_mutable: bool,
    /// String value may start with a `$ROOT`/`$DATA`/`$TEMP` directory token.
    pub is_directory: bool,
}

/// A module's parsed schema declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleSchema {
    pub module: String,
    pub properties: BTreeMap<String, PropertySpec>,
    /// Required attribute names, in declaration order without duplicates.
    pub required: Vec<String>,
    /// Standard JSON schema with module-specific markers removed.
    pub validation_schema: Value,
}

impl ModuleSchema {
    pub fn property(&self, name: &str) -> Option<&PropertySpec> {
        self.properties.get(name)
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    /// Names of properties marked public.
    pub fn public_properties(&self) -> impl Iterator<Item = &str> {
        self.properties
            .iter()
            .filter(|(_, spec)| spec.is_public)
            .map(|(name, _)| name.as_str())
    }

    /// Names of properties marked mutable.
    pub fn mutable_properties(&self) -> impl Iterator<Item = &str> {
        self.properties
            .iter()
            .filter(|(_, spec)| spec.is_mutable)
            .map(|(name, _)| name.as_str())
    }
}
