//! evalform-core — Evaluation model, collaborator traits, and the form controller.
//!
//! This crate defines the data model for evaluations and answer records, the
//! async traits through which remote stores and the current user's identity
//! are reached, and the [`form::EvaluationForm`] that ties them together.

pub mod control;
pub mod error;
pub mod form;
pub mod model;
pub mod traits;

pub use error::{FormError, IdentityError, StoreError};
pub use form::{EvaluationForm, FormState, SubmitReceipt};
