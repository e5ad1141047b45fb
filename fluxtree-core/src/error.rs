//! Error types for the parser kernel.
//!
//! `FluxError` covers every *recoverable* fault a handler can report through
//! [`crate::Outcome::Error`]: a source fault, a missing/ill-typed piece of
//! structure, or a panic caught at a combinator boundary. Protocol violations
//! (calling a finished handler, a non-monotonic `is_finished`) are not
//! represented here — they are programmer errors and `panic!`.

use thiserror::Error;

/// Recoverable faults produced while driving or combining handlers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FluxError {
    /// The underlying [`crate::source::EventSource`] failed to produce the next event.
    #[error("source fault: {0}")]
    Source(String),

    /// A required attribute was absent from the matched context.
    #[error("missing attribute: {0}")]
    MissingAttribute(String),

    /// A required field was absent from the matched context.
    #[error("missing field: {0}")]
    MissingField(String),

    /// A value was present but of the wrong shape.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// What the parser expected to find.
        expected: String,
        /// A description of what was actually found.
        found: String,
    },

    /// A combinator closure (`map`, `.as(f)`, …) panicked; the panic payload
    /// was caught at the combinator boundary and converted here.
    #[error("combinator panicked: {0}")]
    Combinator(String),

    /// A context matcher failed to compute an extracted context value.
    #[error("context match failed: {0}")]
    ContextMatch(String),

    /// Catch-all for format-adapter errors (`fluxtree-formats` and beyond).
    #[error("{0}")]
    Custom(String),
}

impl FluxError {
    /// Convenience constructor for a `missing-attribute:<name>` fault.
    pub fn missing_attribute(name: impl Into<String>) -> Self {
        Self::MissingAttribute(name.into())
    }

    /// Convenience constructor for a missing JSON-style field.
    pub fn missing_field(name: impl Into<String>) -> Self {
        Self::MissingField(name.into())
    }

    /// Build a [`FluxError::Combinator`] from a caught panic payload.
    pub fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "combinator panicked with a non-string payload".to_string()
        };
        Self::Combinator(message)
    }
}
