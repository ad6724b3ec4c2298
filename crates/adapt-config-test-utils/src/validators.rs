use adapt_config::{
    JsonSchemaValidator, ModuleSchema, SchemaValidator, ValidationFailure, Violation,
    ViolationKind,
};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Accepts every candidate unchanged.
#[derive(Debug, Clone, Default)]
pub struct PassThroughValidator;

impl SchemaValidator for PassThroughValidator {
    fn validate(
        &self,
        _schema: &ModuleSchema,
        data: Map<String, Value>,
    ) -> Result<Map<String, Value>, ValidationFailure> {
        Ok(data)
    }
}

/// Rejects configured modules and delegates the rest to the JSON schema validator.
#[derive(Debug, Clone, Default)]
pub struct FailingValidator {
    failures: HashMap<String, ValidationFailure>,
    inner: JsonSchemaValidator,
}

impl FailingValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail `module` with a single rejection on `attribute`.
    pub fn failing(mut self, module: impl Into<String>, attribute: impl Into<String>) -> Self {
        let violation = Violation::new(attribute, ViolationKind::Rejected, "rejected by test");
        self.failures
            .insert(module.into(), ValidationFailure::single(violation));
        self
    }
}

impl SchemaValidator for FailingValidator {
    fn validate(
        &self,
        schema: &ModuleSchema,
        data: Map<String, Value>,
    ) -> Result<Map<String, Value>, ValidationFailure> {
        if let Some(failure) = self.failures.get(&schema.module) {
            return Err(failure.clone());
        }
        self.inner.validate(schema, data)
    }
}

/// Records each candidate it sees before delegating to an inner validator.
#[derive(Clone)]
pub struct RecordingValidator {
    calls: Arc<Mutex<Vec<(String, Map<String, Value>)>>>,
    inner: Arc<dyn SchemaValidator>,
}

impl Default for RecordingValidator {
    fn default() -> Self {
        Self::new(Arc::new(JsonSchemaValidator::new()))
    }
}

impl RecordingValidator {
    pub fn new(inner: Arc<dyn SchemaValidator>) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            inner,
        }
    }

    /// Module names in the order they were validated.
    pub fn modules(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .map(|(module, _)| module.clone())
            .collect()
    }

    /// Candidate data passed for `module`, if it was validated.
    pub fn candidate(&self, module: &str) -> Option<Map<String, Value>> {
        self.calls
            .lock()
            .iter()
            .find(|(name, _)| name == module)
            .map(|(_, data)| data.clone())
    }
}

impl SchemaValidator for RecordingValidator {
    fn validate(
        &self,
        schema: &ModuleSchema,
        data: Map<String, Value>,
    ) -> Result<Map<String, Value>, ValidationFailure> {
        self.calls.lock().push((schema.module.clone(), data.clone()));
        self.inner.validate(schema, data)
    }
}
