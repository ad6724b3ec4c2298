//! Error types for config loading, schema processing, and validation.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned while loading or resolving config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading a source failed for a reason other than the file being absent.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A user config or schema file exists but could not be parsed.
    #[error("failed to parse {}: {message}", path.display())]
    Syntax { path: PathBuf, message: String },
    /// A schema parsed but does not have the expected shape.
    #[error("invalid config schema for module '{module}': {message}")]
    InvalidSchema { module: String, message: String },
    /// Two modules claim the same namespace.
    #[error("duplicate module namespace: {0}")]
    DuplicateModule(String),
    /// A module attempted to claim a namespace reserved for raw environment values.
    #[error("module namespace is reserved: {0}")]
    ReservedNamespace(String),
    /// The designated core module is not part of the module list.
    #[error("core module '{0}' is not in the module list")]
    UnknownCoreModule(String),
    /// A prefixed environment variable has no `__` attribute separator.
    #[error("malformed environment variable '{0}': expected <PREFIX>_<MODULE>__<ATTRIBUTE>")]
    MalformedEnvVar(String),
    /// Converting a stored value into a typed value failed.
    #[error("failed to decode config value at {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    /// A module resolution task did not complete.
    #[error("module resolution task failed: {0}")]
    Task(String),
    /// One or more modules failed schema validation.
    #[error(transparent)]
    Resolution(#[from] ResolutionFailure),
}

impl ConfigError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn syntax(path: impl Into<PathBuf>, message: impl fmt::Display) -> Self {
        Self::Syntax {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// Category of a single attribute-level validation problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// A required attribute has no user, env, or default value.
    MissingRequired,
    /// The supplied value does not match the declared type.
    TypeMismatch,
    /// A schema constraint or custom check rejected the value.
    Rejected,
    /// The schema itself could not be compiled by the validator.
    InvalidSchema,
}

impl ViolationKind {
    /// Short lowercase label used in messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::MissingRequired => "missing",
            ViolationKind::TypeMismatch => "type",
            ViolationKind::Rejected => "rejected",
            ViolationKind::InvalidSchema => "schema",
        }
    }
}

/// A single attribute-level validation problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Attribute name within the module namespace (empty for schema-wide problems).
    pub attribute: String,
    pub kind: ViolationKind,
    pub message: String,
}

impl Violation {
    pub fn new(
        attribute: impl Into<String>,
        kind: ViolationKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            kind,
            message: message.into(),
        }
    }

    pub fn missing(attribute: impl Into<String>) -> Self {
        let attribute = attribute.into();
        let message = format!("missing required value '{attribute}'");
        Self::new(attribute, ViolationKind::MissingRequired, message)
    }
}

/// Validation outcome for one module's candidate data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationFailure {
    pub violations: Vec<Violation>,
}

impl ValidationFailure {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    pub fn single(violation: Violation) -> Self {
        Self {
            violations: vec![violation],
        }
    }

    /// True if any violation concerns `attribute`.
    pub fn mentions(&self, attribute: &str) -> bool {
        self.violations.iter().any(|v| v.attribute == attribute)
    }
}

/// Validation failure tagged with the module that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleFailure {
    pub module: String,
    pub failure: ValidationFailure,
}

/// Aggregate failure raised once every module has been processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionFailure {
    pub failures: Vec<ModuleFailure>,
}

impl ResolutionFailure {
    /// Modules that failed, in report order.
    pub fn modules(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.module.as_str()).collect()
    }

    /// Look up the failure reported for `module`.
    pub fn for_module(&self, module: &str) -> Option<&ValidationFailure> {
        self.failures
            .iter()
            .find(|f| f.module == module)
            .map(|f| &f.failure)
    }
}

impl fmt::Display for ResolutionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "config failed validation for {} module(s):",
            self.failures.len()
        )?;
        for failure in &self.failures {
            for violation in &failure.failure.violations {
                if violation.attribute.is_empty() {
                    write!(
                        f,
                        "\n - {} ({}): {}",
                        failure.module,
                        violation.kind.as_str(),
                        violation.message
                    )?;
                } else {
                    write!(
                        f,
                        "\n - {}.{} ({}): {}",
                        failure.module,
                        violation.attribute,
                        violation.kind.as_str(),
                        violation.message
                    )?;
                }
            }
        }
        Ok(())
    }
}

impl std::error::Error for ResolutionFailure {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn aggregate_message_lists_every_attribute() {
        let failure = ResolutionFailure {
            failures: vec![
                ModuleFailure {
                    module: "mymodule".to_string(),
                    failure: ValidationFailure::single(Violation::missing("apiKey")),
                },
                ModuleFailure {
                    module: "other".to_string(),
                    failure: ValidationFailure::new(vec![
                        Violation::new("port", ViolationKind::TypeMismatch, "expected number"),
                        Violation::new("", ViolationKind::InvalidSchema, "bad schema"),
                    ]),
                },
            ],
        };
        let msg = failure.to_string();
        assert_eq!(
            msg,
            "config failed validation for 2 module(s):\n \
             - mymodule.apiKey (missing): missing required value 'apiKey'\n \
             - other.port (type): expected number\n \
             - other (schema): bad schema"
        );
        assert_eq!(failure.modules(), vec!["mymodule", "other"]);
        assert!(failure.for_module("other").expect("other").mentions("port"));
    }
}
