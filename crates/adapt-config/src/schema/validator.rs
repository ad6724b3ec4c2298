//! Validator capability and the default JSON schema implementation.

use crate::error::{ValidationFailure, Violation, ViolationKind};
use crate::key::ConfigKey;
use crate::model::ModuleSchema;
use jsonschema::JSONSchema;
use jsonschema::error::ValidationErrorKind;
use log::debug;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Validates a module's candidate data against its schema.
///
/// Implementations apply declared defaults for absent properties, check the
/// types of present values, and report every violated attribute at once.
pub trait SchemaValidator: Send + Sync {
    fn validate(
        &self,
        schema: &ModuleSchema,
        data: Map<String, Value>,
    ) -> Result<Map<String, Value>, ValidationFailure>;
}

/// Custom check run against a resolved value; `Err` carries the rejection reason.
pub type CustomCheck = Arc<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

/// Default validator backed by the `jsonschema` crate.
#[derive(Clone, Default)]
pub struct JsonSchemaValidator {
    checks: HashMap<ConfigKey, CustomCheck>,
}

impl fmt::Debug for JsonSchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchemaValidator")
            .field("checks", &self.checks.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl JsonSchemaValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom check for the attribute at `key`.
    pub fn with_check<F>(mut self, key: impl Into<ConfigKey>, check: F) -> Self
    where
        F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.checks.insert(key.into(), Arc::new(check));
        self
    }

    fn schema_violations(schema: &ModuleSchema, data: &Map<String, Value>) -> Vec<Violation> {
        // Required properties are checked separately so they get a distinct kind.
        let mut definition = schema.validation_schema.clone();
        if let Value::Object(map) = &mut definition {
            map.remove("required");
        }
        let compiled = match JSONSchema::compile(&definition) {
            Ok(compiled) => compiled,
            Err(err) => {
                return vec![Violation::new(
                    "",
                    ViolationKind::InvalidSchema,
                    format!("schema failed to compile: {err}"),
                )];
            }
        };
        let instance = Value::Object(data.clone());
        let mut violations = Vec::new();
        if let Err(errors) = compiled.validate(&instance) {
            for err in errors {
                let pointer = err.instance_path.to_string();
                let attribute = pointer
                    .trim_start_matches('/')
                    .split('/')
                    .next()
                    .unwrap_or_default()
                    .to_string();
                let kind = match err.kind {
                    ValidationErrorKind::Type { .. } => ViolationKind::TypeMismatch,
                    _ => ViolationKind::Rejected,
                };
                violations.push(Violation::new(attribute, kind, err.to_string()));
            }
        }
        violations
    }
}

impl SchemaValidator for JsonSchemaValidator {
    fn validate(
        &self,
        schema: &ModuleSchema,
        mut data: Map<String, Value>,
    ) -> Result<Map<String, Value>, ValidationFailure> {
        for (name, spec) in &schema.properties {
            if data.contains_key(name) {
                continue;
            }
            if let Some(default) = &spec.default {
                data.insert(name.clone(), default.clone());
            }
        }

        let mut violations: Vec<Violation> = schema
            .required
            .iter()
            .filter(|name| !data.contains_key(*name))
            .map(|name| Violation::missing(name.as_str()))
            .collect();

        violations.extend(Self::schema_violations(schema, &data));

        for name in schema.properties.keys() {
            let key = ConfigKey::new(&schema.module, name);
            let Some(check) = self.checks.get(key.as_str()) else {
                continue;
            };
            let Some(value) = data.get(name) else {
                continue;
            };
            if let Err(reason) = check(value) {
                violations.push(Violation::new(
                    name.as_str(),
                    ViolationKind::Rejected,
                    reason,
                ));
            }
        }

        if violations.is_empty() {
            debug!(
                "module config validated (module={}, attributes={})",
                schema.module,
                data.len()
            );
            Ok(data)
        } else {
            violations.sort_by(|a, b| a.attribute.cmp(&b.attribute));
            Err(ValidationFailure::new(violations))
        }
    }
}
