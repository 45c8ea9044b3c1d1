//! evalform-stores — Store and identity integrations.
//!
//! Implements the `evalform-core` collaborator traits against jsonbin.io,
//! a local state file, and in-memory stores for tests.

pub mod config;
pub mod identity;
pub mod jsonbin;
pub mod mock;

pub use config::{create_stores, load_config, EvalformConfig, Stores};
pub use identity::{LocalState, LocalStateIdentity, StaticIdentity};
pub use jsonbin::{JsonBinAnswerStore, JsonBinClient, JsonBinEvaluationStore};
