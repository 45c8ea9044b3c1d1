//! In-memory stores for testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use evalform_core::error::StoreError;
use evalform_core::model::{AnswerCollection, AnswerRecord, Evaluation};
use evalform_core::traits::{AnswerStore, EvaluationStore};

/// An evaluation store serving a fixed list, or a fixed failure.
pub struct MemoryEvaluationStore {
    evaluations: Vec<Evaluation>,
    failure: Option<String>,
    call_count: AtomicU32,
}

impl MemoryEvaluationStore {
    pub fn new(evaluations: Vec<Evaluation>) -> Self {
        Self {
            evaluations,
            failure: None,
            call_count: AtomicU32::new(0),
        }
    }

    /// Create a store whose every fetch fails with a network error.
    pub fn failing(message: &str) -> Self {
        Self {
            evaluations: Vec::new(),
            failure: Some(message.to_string()),
            call_count: AtomicU32::new(0),
        }
    }

    /// Get the number of fetches made against this store.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl EvaluationStore for MemoryEvaluationStore {
    async fn fetch_evaluations(&self) -> Result<Vec<Evaluation>, StoreError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        match &self.failure {
            Some(message) => Err(StoreError::Network(message.clone())),
            None => Ok(self.evaluations.clone()),
        }
    }
}

/// An answer store backed by a mutex-guarded vector.
///
/// Appends happen under the lock, so concurrent submits never drop a record.
#[derive(Default)]
pub struct MemoryAnswerStore {
    answers: Mutex<AnswerCollection>,
    save_count: AtomicU32,
}

impl MemoryAnswerStore {
    pub fn new(answers: AnswerCollection) -> Self {
        Self {
            answers: Mutex::new(answers),
            save_count: AtomicU32::new(0),
        }
    }

    /// Snapshot of the stored collection.
    pub fn answers(&self) -> AnswerCollection {
        self.answers.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of writes (saves and appends) performed.
    pub fn save_count(&self) -> u32 {
        self.save_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl AnswerStore for MemoryAnswerStore {
    async fn fetch_answers(&self) -> Result<AnswerCollection, StoreError> {
        Ok(self.answers())
    }

    async fn save_answers(&self, answers: &[serde_json::Value]) -> Result<(), StoreError> {
        self.save_count.fetch_add(1, Ordering::Relaxed);
        *self.answers.lock().unwrap_or_else(|e| e.into_inner()) = answers.to_vec();
        Ok(())
    }

    async fn append_answer(&self, record: AnswerRecord) -> Result<usize, StoreError> {
        let record = record
            .to_value()
            .map_err(|e| StoreError::Encode(e.to_string()))?;
        self.save_count.fetch_add(1, Ordering::Relaxed);
        let mut answers = self.answers.lock().unwrap_or_else(|e| e.into_inner());
        answers.push(record);
        Ok(answers.len())
    }
}
