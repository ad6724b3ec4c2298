//! Layered configuration loader.
//!
//! Populates a fresh store from the environment and the optional user override
//! file, then resolves every module's schema against it. Precedence (low ->
//! high): environment, user file, validated schema values.

mod flatten;
mod layer_io;
mod utils;


pub use layer_io::load_user_config;

use crate::ConfigError;
use crate::env::{DEFAULT_ENV_PREFIX, EnvMapper};
use crate::model::ModuleDescriptor;
use crate::public::PublicView;
use crate::schema::{
    DEFAULT_SCHEMA_FILE, JsonSchemaValidator, ResolutionReport, ResolverOptions, SchemaRegistry,
    SchemaResolver, SchemaValidator,
};
use crate::store::{ConfigStore, SetOptions};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Directory holding user config files under the application root.
const DEFAULT_CONFIG_DIR: &str = "conf";
/// Suffix of the per-environment user config file.
const USER_CONFIG_SUFFIX: &str = ".config.json5";
/// Environment variable naming the deployment environment.
pub const ENVIRONMENT_VAR: &str = "NODE_ENV";

/// Origin for a single config layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayerSource {
    /// Process environment variables (lowest precedence).
    Environment,
    /// Per-environment user override file.
    User,
}

/// Metadata about a config layer considered during load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLayer {
    pub source: ConfigLayerSource,
    /// Location on disk, for file layers.
    pub path: Option<PathBuf>,
    /// Number of values the layer wrote into the store.
    pub entries: usize,
}

/// Options controlling where layers are read from and which modules resolve.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Application root; user config lives under `<root>/conf`.
    pub root_dir: PathBuf,
    /// Deployment environment; defaults to `NODE_ENV` from `env_vars`.
    pub environment: Option<String>,
    /// Explicit user config path, overriding the per-environment default.
    pub user_config_path: Option<PathBuf>,
    /// Reserved environment variable prefix.
    pub env_prefix: String,
    /// Environment snapshot used for the environment layer.
    pub env_vars: Vec<(String, String)>,
    /// Module resolved before all others.
    pub core_module: Option<String>,
    /// Modules to resolve, in order.
    pub modules: Vec<ModuleDescriptor>,
    /// Schema path relative to each module root.
    pub schema_file: PathBuf,
}

impl LoadOptions {
    /// Create options rooted at `root_dir` using the process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn new(root_dir: impl AsRef<Path>) -> Self {
        Self {
            root_dir: root_dir.as_ref().to_path_buf(),
            environment: None,
            user_config_path: None,
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            env_vars: layer_io::utf8_env_vars(std::env::vars_os()),
            core_module: None,
            modules: Vec::new(),
            schema_file: PathBuf::from(DEFAULT_SCHEMA_FILE),
        }
    }

    /// Replace the environment snapshot.
    pub fn with_env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env_vars = vars
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn with_user_config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.user_config_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn with_core_module(mut self, name: impl Into<String>) -> Self {
        self.core_module = Some(name.into());
        self
    }

    pub fn with_module(mut self, module: ModuleDescriptor) -> Self {
        self.modules.push(module);
        self
    }

    pub fn with_modules(mut self, modules: impl IntoIterator<Item = ModuleDescriptor>) -> Self {
        self.modules.extend(modules);
        self
    }

    pub fn with_schema_file(mut self, path: impl AsRef<Path>) -> Self {
        self.schema_file = path.as_ref().to_path_buf();
        self
    }

    /// Deployment environment, explicit or taken from the environment snapshot.
    pub fn environment(&self) -> Option<&str> {
        self.environment.as_deref().or_else(|| {
            self.env_vars
                .iter()
                .find(|(key, _)| key == ENVIRONMENT_VAR)
                .map(|(_, value)| value.as_str())
        })
    }

    /// Location of the user override file, if one can be determined.
    pub fn user_config_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.user_config_path {
            return Some(path.clone());
        }
        let environment = self.environment()?;
        Some(
            self.root_dir
                .join(DEFAULT_CONFIG_DIR)
                .join(format!("{environment}{USER_CONFIG_SUFFIX}")),
        )
    }
}

/// Resolved store plus metadata about how it was built.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub store: Arc<ConfigStore>,
    pub layers: Vec<ConfigLayer>,
    pub report: ResolutionReport,
}

impl LoadedConfig {
    /// Read-only public projection of the resolved store.
    pub fn public_view(&self) -> PublicView {
        PublicView::new(self.store.clone())
    }
}

/// Builds and resolves the config store for a module set.
#[derive(Clone)]
pub struct ConfigLoader {
    options: LoadOptions,
    validator: Arc<dyn SchemaValidator>,
}

impl ConfigLoader {
    /// Create a loader using the default JSON schema validator.
    pub fn new(options: LoadOptions) -> Self {
        Self {
            options,
            validator: Arc::new(JsonSchemaValidator::new()),
        }
    }

    /// Replace the validator used for schema resolution.
    pub fn with_validator(mut self, validator: Arc<dyn SchemaValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Run every layer and resolve all module schemas.
    pub async fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let options = &self.options;
        let root_dir = utils::normalize_path(&options.root_dir).await?;
        info!(
            "loading config (root={}, environment={}, modules={})",
            root_dir.display(),
            options.environment().unwrap_or("unset"),
            options.modules.len()
        );
        let store = Arc::new(ConfigStore::new());
        let mut layers = Vec::new();

        let mapper = EnvMapper::new(options.env_prefix.clone());
        let entries = layer_io::store_env_settings(&store, &mapper, &options.env_vars);
        debug!(
            "loaded environment layer (prefix={}, entries={entries})",
            mapper.prefix()
        );
        layers.push(ConfigLayer {
            source: ConfigLayerSource::Environment,
            path: None,
            entries,
        });

        match options.user_config_path() {
            Some(path) => {
                if let Some(value) = load_user_config(&path).await? {
                    let mut entries = 0;
                    for (key, value) in flatten::flatten_user_config(&path, value)? {
                        store.set(key, value, SetOptions::forced());
                        entries += 1;
                    }
                    debug!(
                        "loaded user layer (path={}, entries={entries})",
                        path.display()
                    );
                    layers.push(ConfigLayer {
                        source: ConfigLayerSource::User,
                        path: Some(path),
                        entries,
                    });
                }
            }
            None => info!("no deployment environment set; skipping user config layer"),
        }

        let resolver = SchemaResolver::new(store.clone(), self.validator.clone())
            .with_registry(SchemaRegistry::new(&options.schema_file))
            .with_options(ResolverOptions {
                core_module: options.core_module.clone(),
                root_dir: Some(root_dir),
            });
        let report = resolver.resolve(&options.modules).await?;
        info!(
            "config loaded (layers={}, values={})",
            layers.len(),
            store.len()
        );
        Ok(LoadedConfig {
            store,
            layers,
            report,
        })
    }
}
