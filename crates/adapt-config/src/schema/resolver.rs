//! Schema resolution across the module set.
//!
//! For every module with a schema the resolver builds candidate data from the
//! store, records public/mutable classification, delegates to the validator,
//! and writes the validated values back with forced precedence. The core
//! module is resolved alone first; every other module then resolves as an
//! independent task. Validation failures are collected per module and raised
//! together once every module has been processed.

use super::SchemaRegistry;
use super::paths::DirectoryTokens;
use super::validator::SchemaValidator;
use crate::ConfigError;
use crate::error::{ModuleFailure, ResolutionFailure, ValidationFailure};
use crate::key::{ConfigKey, ENV_NAMESPACE};
use crate::model::{ModuleDescriptor, ModuleSchema};
use crate::store::{ConfigStore, SetOptions};
use log::{debug, error, info, warn};
use serde_json::Map;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Options controlling module ordering and directory expansion.
#[derive(Debug, Clone, Default)]
pub struct ResolverOptions {
    /// Module resolved before all others.
    pub core_module: Option<String>,
    /// Application root used for `$ROOT` expansion.
    pub root_dir: Option<PathBuf>,
}

/// Outcome of a successful resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionReport {
    /// Modules whose schema validated, in processing order.
    pub processed: Vec<String>,
    /// Modules without a schema file.
    pub skipped: Vec<String>,
}

/// Resolves every module's schema against the shared store.
#[derive(Clone)]
pub struct SchemaResolver {
    store: Arc<ConfigStore>,
    validator: Arc<dyn SchemaValidator>,
    registry: SchemaRegistry,
    options: ResolverOptions,
}

impl SchemaResolver {
    pub fn new(store: Arc<ConfigStore>, validator: Arc<dyn SchemaValidator>) -> Self {
        Self {
            store,
            validator,
            registry: SchemaRegistry::default(),
            options: ResolverOptions::default(),
        }
    }

    pub fn with_registry(mut self, registry: SchemaRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }

    /// Resolve `modules`, failing with an aggregate error if any module is invalid.
    pub async fn resolve(
        &self,
        modules: &[ModuleDescriptor],
    ) -> Result<ResolutionReport, ConfigError> {
        let ordered = order_modules(modules, self.options.core_module.as_deref())?;
        info!(
            "resolving module config (modules={}, core={})",
            ordered.len(),
            self.options.core_module.as_deref().unwrap_or("none")
        );
        let schemas = self.registry.load_all(&ordered).await?;

        let mut report = ResolutionReport::default();
        let mut outcomes: Vec<(usize, String, Result<(), ValidationFailure>)> = Vec::new();
        let mut pending = Vec::new();
        for (index, (module, schema)) in ordered.into_iter().zip(schemas).enumerate() {
            match schema {
                Some(schema) => pending.push((index, module, schema)),
                None => report.skipped.push(module.name),
            }
        }

        let core = self.options.core_module.as_deref();
        let mut rest = pending.into_iter().peekable();
        let is_core = |(_, module, _): &(usize, ModuleDescriptor, ModuleSchema)| {
            Some(module.name.as_str()) == core
        };
        if let Some((index, module, schema)) = rest.next_if(is_core) {
            // Only `$ROOT` is available while the core module itself resolves.
            let tokens =
                DirectoryTokens::from_store(self.options.root_dir.as_deref(), &self.store, None);
            let outcome = process_module(&self.store, self.validator.as_ref(), &schema, &tokens);
            outcomes.push((index, module.name, outcome));
        }

        let tokens = Arc::new(DirectoryTokens::from_store(
            self.options.root_dir.as_deref(),
            &self.store,
            core,
        ));
        let mut join_set = JoinSet::new();
        for (index, module, schema) in rest {
            let store = self.store.clone();
            let validator = self.validator.clone();
            let tokens = tokens.clone();
            join_set.spawn_blocking(move || {
                let outcome = process_module(&store, validator.as_ref(), &schema, &tokens);
                (index, module.name, outcome)
            });
        }

        let mut task_error = None;
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(err) => {
                    error!("module resolution task failed: {err}");
                    task_error.get_or_insert(err.to_string());
                }
            }
        }
        if let Some(err) = task_error {
            return Err(ConfigError::Task(err));
        }

        outcomes.sort_by_key(|(index, _, _)| *index);
        let mut failures = Vec::new();
        for (_, module, outcome) in outcomes {
            match outcome {
                Ok(()) => report.processed.push(module),
                Err(failure) => {
                    warn!(
                        "module config failed validation (module={}, violations={})",
                        module,
                        failure.violations.len()
                    );
                    failures.push(ModuleFailure { module, failure });
                }
            }
        }

        if !failures.is_empty() {
            let failure = ResolutionFailure { failures };
            error!("{failure}");
            return Err(failure.into());
        }
        info!(
            "module config resolved (processed={}, skipped={})",
            report.processed.len(),
            report.skipped.len()
        );
        Ok(report)
    }
}

/// Resolve a single module's schema against the store.
fn process_module(
    store: &ConfigStore,
    validator: &dyn SchemaValidator,
    schema: &ModuleSchema,
    tokens: &DirectoryTokens,
) -> Result<(), ValidationFailure> {
    let mut candidate = Map::new();
    for (name, spec) in &schema.properties {
        let key = ConfigKey::new(&schema.module, name);
        if spec.is_public {
            store.mark_public(key.clone());
        }
        if spec.is_mutable {
            store.mark_mutable(key.clone());
        }
        if let Some(value) = store.get(key.as_str()) {
            candidate.insert(name.clone(), value);
        }
    }

    let validated = validator.validate(schema, candidate)?;
    debug!(
        "applying validated config (module={}, attributes={})",
        schema.module,
        validated.len()
    );
    for (name, value) in validated {
        let key = ConfigKey::new(&schema.module, &name);
        let is_directory = schema.property(&name).is_some_and(|spec| spec.is_directory);
        let value = if is_directory {
            tokens.expand(&key, value)
        } else {
            value
        };
        store.set(key, value, SetOptions::forced());
    }
    Ok(())
}

/// Validate namespaces and move the core module to the front.
fn order_modules(
    modules: &[ModuleDescriptor],
    core: Option<&str>,
) -> Result<Vec<ModuleDescriptor>, ConfigError> {
    let mut seen = HashSet::new();
    let mut ordered = Vec::with_capacity(modules.len());
    for module in modules {
        if module.name.is_empty() {
            debug!(
                "skipping unnamed module (root={})",
                module.root_dir.display()
            );
            continue;
        }
        if module.name == ENV_NAMESPACE {
            return Err(ConfigError::ReservedNamespace(module.name.clone()));
        }
        if !seen.insert(module.name.as_str()) {
            return Err(ConfigError::DuplicateModule(module.name.clone()));
        }
        ordered.push(module.clone());
    }
    if let Some(core) = core {
        let Some(position) = ordered.iter().position(|m| m.name == core) else {
            return Err(ConfigError::UnknownCoreModule(core.to_string()));
        };
        let module = ordered.remove(position);
        ordered.insert(0, module);
    }
    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn modules(names: &[&str]) -> Vec<ModuleDescriptor> {
        names
            .iter()
            .map(|name| ModuleDescriptor::new(*name, format!("/modules/{name}")))
            .collect()
    }

    fn names(modules: &[ModuleDescriptor]) -> Vec<&str> {
        modules.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn core_module_moves_to_front() {
        let ordered = order_modules(&modules(&["a", "core", "b"]), Some("core")).expect("order");
        assert_eq!(names(&ordered), vec!["core", "a", "b"]);
    }

    #[test]
    fn order_is_kept_without_core() {
        let ordered = order_modules(&modules(&["b", "a"]), None).expect("order");
        assert_eq!(names(&ordered), vec!["b", "a"]);
    }

    #[test]
    fn unnamed_modules_are_skipped() {
        let ordered = order_modules(&modules(&["", "a"]), None).expect("order");
        assert_eq!(names(&ordered), vec!["a"]);
    }

    #[test]
    fn rejects_namespace_collisions() {
        let err = order_modules(&modules(&["a", "a"]), None).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateModule(ref n) if n == "a"));
        let err = order_modules(&modules(&["env"]), None).unwrap_err();
        assert!(matches!(err, ConfigError::ReservedNamespace(_)));
    }

    #[test]
    fn rejects_unknown_core_module() {
        let err = order_modules(&modules(&["a"]), Some("core")).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownCoreModule(ref n) if n == "core"));
    }
}
