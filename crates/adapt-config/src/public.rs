//! Read-only projection of public config attributes.

use crate::store::ConfigStore;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Read-only view over the public attributes of a store.
///
/// This is the surface handed to collaborators that expose configuration
/// outside the process (such as an HTTP read endpoint).
#[derive(Debug, Clone)]
pub struct PublicView {
    store: Arc<ConfigStore>,
}

impl PublicView {
    pub fn new(store: Arc<ConfigStore>) -> Self {
        Self { store }
    }

    /// Every public attribute with its current value, keyed by config key.
    ///
    /// Public attributes that hold no value are left out.
    pub fn public_config(&self, mutable_only: bool) -> Map<String, Value> {
        self.store.public_values(mutable_only)
    }

    /// Public config rendered as a JSON document.
    pub fn to_json(&self, mutable_only: bool) -> Value {
        Value::Object(self.public_config(mutable_only))
    }
}
