//! Layered configuration resolution for modular applications.
//!
//! Values are layered from environment variables, an optional per-environment
//! user file, and per-module schema declarations into a single namespaced
//! store. Every module's schema is validated independently and all failures
//! are reported together.

mod error;
mod key;
mod loader;
mod model;
mod store;

pub mod env;
pub mod public;
pub mod schema;

/// Public error types returned by loading, resolution, and validation APIs.
pub use error::{
    ConfigError, ModuleFailure, ResolutionFailure, ValidationFailure, Violation, ViolationKind,
};
/// Config keys and the reserved environment namespace.
pub use key::{ConfigKey, ENV_NAMESPACE};
/// Layered loader types and options.
pub use loader::{
    ConfigLayer, ConfigLayerSource, ConfigLoader, ENVIRONMENT_VAR, LoadOptions, LoadedConfig,
    load_user_config,
};
/// Module and schema declaration models.
pub use model::*;
pub use env::EnvMapper;
pub use public::PublicView;
pub use schema::{JsonSchemaValidator, SchemaRegistry, SchemaResolver, SchemaValidator};
pub use store::{ConfigStore, SetOptions};
