//! jsonbin.io v3 store implementation.
//!
//! Each collection lives in its own bin. Reads fetch the latest version of a
//! bin without metadata; writes replace the bin content wholesale.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::instrument;

use evalform_core::error::StoreError;
use evalform_core::model::{AnswerCollection, Evaluation};
use evalform_core::traits::{AnswerStore, EvaluationStore};

pub const DEFAULT_BASE_URL: &str = "https://api.jsonbin.io";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP client for the jsonbin.io v3 API.
#[derive(Clone)]
pub struct JsonBinClient {
    master_key: String,
    base_url: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl JsonBinClient {
    pub fn new(
        master_key: &str,
        base_url: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| StoreError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            master_key: master_key.to_string(),
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            timeout_secs,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Read the latest content of a bin.
    #[instrument(skip(self))]
    pub async fn read<T: DeserializeOwned>(&self, bin_id: &str) -> Result<T, StoreError> {
        let response = self
            .client
            .get(format!("{}/v3/b/{bin_id}/latest", self.base_url))
            .header("X-Master-Key", &self.master_key)
            .header("X-Bin-Meta", "false")
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        let response = check_status(response, bin_id).await?;
        let body = response.text().await.map_err(|e| self.send_error(e))?;
        serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))
    }

    /// Replace the content of a bin.
    #[instrument(skip(self, value))]
    pub async fn write<T: Serialize + ?Sized>(
        &self,
        bin_id: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        let response = self
            .client
            .put(format!("{}/v3/b/{bin_id}", self.base_url))
            .header("X-Master-Key", &self.master_key)
            .header("content-type", "application/json")
            .json(value)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        check_status(response, bin_id).await?;
        tracing::debug!("bin updated");
        Ok(())
    }

    fn send_error(&self, e: reqwest::Error) -> StoreError {
        if e.is_timeout() {
            StoreError::Timeout(self.timeout_secs)
        } else {
            StoreError::Network(e.to_string())
        }
    }
}

async fn check_status(
    response: reqwest::Response,
    bin_id: &str,
) -> Result<reqwest::Response, StoreError> {
    let status = response.status().as_u16();
    match status {
        401 | 403 => {
            let body = response.text().await.unwrap_or_default();
            Err(StoreError::AuthenticationFailed(body))
        }
        404 => Err(StoreError::NotFound(bin_id.to_string())),
        s if s >= 400 => {
            let body = response.text().await.unwrap_or_default();
            Err(StoreError::Api {
                status,
                message: body,
            })
        }
        _ => Ok(response),
    }
}

/// Evaluation list kept in a single bin as a JSON array.
pub struct JsonBinEvaluationStore {
    client: JsonBinClient,
    bin_id: String,
}

impl JsonBinEvaluationStore {
    pub fn new(client: JsonBinClient, bin_id: impl Into<String>) -> Self {
        Self {
            client,
            bin_id: bin_id.into(),
        }
    }
}

#[async_trait]
impl EvaluationStore for JsonBinEvaluationStore {
    async fn fetch_evaluations(&self) -> Result<Vec<Evaluation>, StoreError> {
        self.client.read(&self.bin_id).await
    }
}

/// Answer collection kept in a single bin as a JSON array.
///
/// Appends use the read-append-write default: jsonbin has no conditional
/// writes, so concurrent submitters can overwrite each other.
pub struct JsonBinAnswerStore {
    client: JsonBinClient,
    bin_id: String,
}

impl JsonBinAnswerStore {
    pub fn new(client: JsonBinClient, bin_id: impl Into<String>) -> Self {
        Self {
            client,
            bin_id: bin_id.into(),
        }
    }
}

#[async_trait]
impl AnswerStore for JsonBinAnswerStore {
    async fn fetch_answers(&self) -> Result<AnswerCollection, StoreError> {
        self.client.read(&self.bin_id).await
    }

    async fn save_answers(&self, answers: &[serde_json::Value]) -> Result<(), StoreError> {
        self.client.write(&self.bin_id, answers).await
    }
}
