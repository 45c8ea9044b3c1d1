//! Collaborator traits for the form.
//!
//! Implemented by `evalform-stores` for the remote JSON stores and local
//! state, and injected into [`crate::form::EvaluationForm`] at construction.

use async_trait::async_trait;

use crate::error::{IdentityError, StoreError};
use crate::model::{AnswerCollection, AnswerRecord, Evaluation, UserProfile};

/// Source of the evaluation list.
#[async_trait]
pub trait EvaluationStore: Send + Sync {
    /// Fetch every evaluation.
    async fn fetch_evaluations(&self) -> Result<Vec<Evaluation>, StoreError>;
}

/// Storage for the full collection of submitted answer records.
#[async_trait]
pub trait AnswerStore: Send + Sync {
    /// Fetch the whole answer collection, records left as stored.
    async fn fetch_answers(&self) -> Result<AnswerCollection, StoreError>;

    /// Replace the whole answer collection.
    async fn save_answers(&self, answers: &[serde_json::Value]) -> Result<(), StoreError>;

    /// Append one record and return the new collection length.
    ///
    /// The default reads the collection, appends, and writes it back. Two
    /// concurrent appends can race and the last write wins. Stores that can
    /// append atomically should override this.
    async fn append_answer(&self, record: AnswerRecord) -> Result<usize, StoreError> {
        let record = record
            .to_value()
            .map_err(|e| StoreError::Encode(e.to_string()))?;
        let mut answers = self.fetch_answers().await?;
        answers.push(record);
        self.save_answers(&answers).await?;
        Ok(answers.len())
    }
}

/// Resolves the currently logged-in user.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_user(&self) -> Result<UserProfile, IdentityError>;
}
