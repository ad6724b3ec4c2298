//! Test helpers shared across adapt-config crates.

pub mod fixtures;
pub mod validators;

pub use fixtures::ModuleFixture;
pub use validators::{FailingValidator, PassThroughValidator, RecordingValidator};
