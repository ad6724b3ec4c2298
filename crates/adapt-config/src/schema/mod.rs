//! Per-module schema discovery, validation, and resolution.

mod parse;
mod paths;
mod resolver;
mod validator;

pub use paths::{DATA_DIR_ATTRIBUTE, DirectoryTokens, TEMP_DIR_ATTRIBUTE};
pub use resolver::{ResolutionReport, ResolverOptions, SchemaResolver};
pub use validator::{CustomCheck, JsonSchemaValidator, SchemaValidator};

use crate::ConfigError;
use crate::model::{ModuleDescriptor, ModuleSchema};
use futures_util::future::try_join_all;
use log::debug;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Schema location relative to a module's root directory.
pub const DEFAULT_SCHEMA_FILE: &str = "conf/config.schema.json";

/// Locates and parses module schema files.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schema_file: PathBuf,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_SCHEMA_FILE)
    }
}

impl SchemaRegistry {
    /// Create a registry that looks for `schema_file` under each module root.
    pub fn new(schema_file: impl AsRef<Path>) -> Self {
        Self {
            schema_file: schema_file.as_ref().to_path_buf(),
        }
    }

    /// Path of the schema file for `module`.
    pub fn schema_path(&self, module: &ModuleDescriptor) -> PathBuf {
        module.root_dir.join(&self.schema_file)
    }

    /// Load the schema for `module`; `None` if the module has no schema file.
    pub async fn load_schema(
        &self,
        module: &ModuleDescriptor,
    ) -> Result<Option<ModuleSchema>, ConfigError> {
        let path = self.schema_path(module);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(
                    "no config schema for module (module={}, path={})",
                    module.name,
                    path.display()
                );
                return Ok(None);
            }
            Err(err) => return Err(ConfigError::read(path, err)),
        };
        let value: Value =
            serde_json::from_str(&contents).map_err(|err| ConfigError::syntax(&path, err))?;
        let schema = parse::parse_module_schema(&module.name, value)?;
        debug!(
            "loaded config schema (module={}, properties={}, required={})",
            module.name,
            schema.properties.len(),
            schema.required.len()
        );
        Ok(Some(schema))
    }

    /// Load every module's schema concurrently, preserving module order.
    pub async fn load_all(
        &self,
        modules: &[ModuleDescriptor],
    ) -> Result<Vec<Option<ModuleSchema>>, ConfigError> {
        try_join_all(modules.iter().map(|module| self.load_schema(module))).await
    }
}

/// Parse an in-memory schema document for `module`.
pub fn schema_from_value(module: &str, value: Value) -> Result<ModuleSchema, ConfigError> {
    parse::parse_module_schema(module, value)
}
