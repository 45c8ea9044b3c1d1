//! Error types for stores, identity lookup, and the form.
//!
//! Defined in `evalform-core` so the form can classify collaborator failures
//! without knowing which backend produced them.

use thiserror::Error;

/// Errors that can occur when talking to a remote evaluation or answer store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store rejected the credentials (HTTP 401/403).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested collection does not exist.
    #[error("collection not found: {0}")]
    NotFound(String),

    /// The store returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),

    /// The store answered with a body that is not the expected JSON.
    #[error("failed to decode store response: {0}")]
    Decode(String),

    /// A record could not be serialized for storage.
    #[error("failed to encode record: {0}")]
    Encode(String),
}

/// Errors raised while resolving the current user.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Nothing is stored under the identity key.
    #[error("no user stored under '{key}'")]
    Missing { key: String },

    /// The stored value is not a JSON object.
    #[error("stored user is malformed: {reason}")]
    Malformed { reason: String },

    /// The stored user has no usable `name` field.
    #[error("stored user has no name")]
    MissingName,

    /// The local state backing the identity could not be read.
    #[error("failed to read local state: {0}")]
    Storage(String),
}

/// Errors surfaced by [`crate::form::EvaluationForm`].
#[derive(Debug, Error)]
pub enum FormError {
    /// No evaluation is loaded.
    #[error("no current evaluation")]
    NotLoaded,

    /// The question id is not part of the loaded evaluation.
    #[error("question {0} is not part of this evaluation")]
    UnknownQuestion(i64),

    /// A scale answer that is not an integer.
    #[error("'{value}' is not a number between 1 and 10")]
    InvalidScale { value: String },

    /// A multiple-choice answer outside the question's options.
    #[error("'{value}' is not an option of question {question_id}")]
    InvalidChoice { question_id: i64, value: String },

    /// One or more questions have no answer.
    #[error("Please complete all fields.")]
    Incomplete { missing: Vec<String> },

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error("answer store error: {0}")]
    Store(#[from] StoreError),
}

impl FormError {
    /// Returns `true` for failures the user fixes by editing the form.
    pub fn is_user_input(&self) -> bool {
        matches!(
            self,
            FormError::Incomplete { .. }
                | FormError::InvalidScale { .. }
                | FormError::InvalidChoice { .. }
                | FormError::UnknownQuestion(_)
        )
    }
}
