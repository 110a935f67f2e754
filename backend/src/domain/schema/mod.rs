//! Structural validation of inbound payloads.
//!
//! Schema documents ship with the binary and are compiled once when the
//! validator is built. A document that fails to compile is kept as a defect
//! rather than aborting start-up; every request validated against it is then
//! refused with [`Rejection::SchemaDefect`] and the compile failure is logged
//! at error level.

mod compile;

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;
use tracing::error;

use super::Rejection;

pub use compile::SchemaCompileError;
use compile::{Node, check, compile_document};

/// Result of validating one payload.
pub type ValidationOutcome = Result<(), Rejection>;

/// The schema documents the service validates against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaRef {
    Registration,
    Login,
    ThingSubmission,
    ViewData,
}

impl SchemaRef {
    /// Every schema the service knows about.
    pub const ALL: [Self; 4] = [
        Self::Registration,
        Self::Login,
        Self::ThingSubmission,
        Self::ViewData,
    ];

    /// Stable schema name used in logs.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Registration => "registration",
            Self::Login => "login",
            Self::ThingSubmission => "thing_submission",
            Self::ViewData => "view_data",
        }
    }

    /// Embedded schema document.
    pub const fn document(self) -> &'static str {
        match self {
            Self::Registration => include_str!("../../../schemas/registration.json"),
            Self::Login => include_str!("../../../schemas/login.json"),
            Self::ThingSubmission => include_str!("../../../schemas/thing_submission.json"),
            Self::ViewData => include_str!("../../../schemas/view_data.json"),
        }
    }
}

impl fmt::Display for SchemaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Compiled schemas keyed by [`SchemaRef`].
///
/// # Examples
/// ```
/// use cadinet::domain::{SchemaRef, SchemaValidator};
/// use serde_json::json;
///
/// let validator = SchemaValidator::builtin();
/// let payload = json!({ "camera": { "x": 0.0, "y": 0.0, "z": 1.0 },
///                       "vertices": [[0.0, 1.0]], "facets": [] });
/// assert!(validator.validate(&payload, SchemaRef::ViewData).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    compiled: HashMap<SchemaRef, Result<Node, SchemaCompileError>>,
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SchemaValidator {
    /// Compile the embedded schema documents.
    pub fn builtin() -> Self {
        Self::from_documents(SchemaRef::ALL.map(|schema| (schema, schema.document())))
    }

    /// Compile explicit documents. Schemas without a document are defects.
    pub fn from_documents<'a>(documents: impl IntoIterator<Item = (SchemaRef, &'a str)>) -> Self {
        let mut compiled: HashMap<SchemaRef, Result<Node, SchemaCompileError>> = SchemaRef::ALL
            .into_iter()
            .map(|schema| (schema, Err(SchemaCompileError::Missing)))
            .collect();
        for (schema, document) in documents {
            compiled.insert(schema, compile_document(document));
        }
        for (schema, outcome) in &compiled {
            if let Err(defect) = outcome {
                error!(schema = schema.name(), error = %defect, "validation schema failed to compile");
            }
        }
        Self { compiled }
    }

    /// Validate `payload` against `schema`.
    pub fn validate(&self, payload: &Value, schema: SchemaRef) -> ValidationOutcome {
        match self.compiled.get(&schema) {
            Some(Ok(node)) => check(node, payload, ""),
            Some(Err(defect)) => {
                error!(schema = schema.name(), error = %defect, "payload checked against defective schema");
                Err(Rejection::SchemaDefect {
                    schema: schema.name(),
                })
            }
            None => {
                error!(schema = schema.name(), "payload checked against unknown schema");
                Err(Rejection::SchemaDefect {
                    schema: schema.name(),
                })
            }
        }
    }

    /// Schemas that failed to compile, with the reason.
    pub fn defects(&self) -> Vec<(SchemaRef, SchemaCompileError)> {
        let mut defects: Vec<_> = self
            .compiled
            .iter()
            .filter_map(|(schema, outcome)| {
                outcome.as_ref().err().map(|defect| (*schema, defect.clone()))
            })
            .collect();
        defects.sort_by_key(|(schema, _)| schema.name());
        defects
    }
}
