//! Document-store client.
//!
//! The delivery engine only needs one capability from the store: create a
//! single document in a named database. That capability is the
//! [`DocumentStore`] trait; [`CloudantClient`] implements it over HTTP
//! (`POST {endpoint}/{database}` with the document as a JSON body).
//!
//! There is no retry here. A failed submission surfaces once and the host
//! pipeline decides whether to redeliver the batch.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

/// Request timeout applied to every store call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// A document ready for submission: its assigned identity plus the
/// normalized record fields flattened alongside it.
///
/// Serializes to the Cloudant wire shape, e.g.
/// `{"_id": "…", "msg": "a", "level": "info"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Document {
    #[must_use]
    pub fn new(id: String, fields: Map<String, Value>) -> Self {
        Document { id, fields }
    }
}

/// Store-side response to a document creation.
#[derive(Debug, Deserialize)]
struct DocumentResult {
    id: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// The document could not be encoded or the response could not be read.
    #[error("failed to encode store payload: {0}")]
    Payload(String),
    /// The store rejected the request, or it never arrived. `status` is
    /// `None` for transport-level failures.
    #[error("document store request failed (status {status:?}): {message}")]
    Destination {
        status: Option<StatusCode>,
        message: String,
    },
}

/// The one capability the delivery engine requires of a remote store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Creates `doc` in `database`, returning the stored document's id.
    async fn create_document(&self, database: &str, doc: &Document) -> Result<String, StoreError>;
}

/// HTTP implementation of [`DocumentStore`] against a Cloudant endpoint.
///
/// The handle is cheap to clone and is shared read-only by concurrent flush
/// calls; nothing in it is mutated after construction.
#[derive(Clone)]
pub struct CloudantClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

impl CloudantClient {
    /// Builds a client for `endpoint`, authenticating with `api_key` when
    /// one was resolved. An endpoint without a scheme gets `https://`.
    pub fn new(endpoint: &str, api_key: Option<String>) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()?;
        Ok(CloudantClient {
            client,
            endpoint: normalize_endpoint(endpoint),
            api_key,
        })
    }

    /// The endpoint after scheme defaulting, as used on the wire.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        }
    }

    /// Fetches a document back by id. Used to verify what was just written
    /// when debugging a deployment; not part of the delivery path.
    pub async fn get_document(&self, database: &str, doc_id: &str) -> Result<Value, StoreError> {
        let url = format!("{}/{database}/{doc_id}", self.endpoint);
        let resp = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| StoreError::Destination {
                status: None,
                message: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(StoreError::Destination {
                status: Some(status),
                message: resp.text().await.unwrap_or_default(),
            });
        }
        resp.json().await.map_err(|e| StoreError::Payload(e.to_string()))
    }
}

#[async_trait]
impl DocumentStore for CloudantClient {
    async fn create_document(&self, database: &str, doc: &Document) -> Result<String, StoreError> {
        let body = serde_json::to_vec(doc).map_err(|e| StoreError::Payload(e.to_string()))?;
        let url = format!("{}/{database}", self.endpoint);

        let resp = self
            .authorize(self.client.post(&url))
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| StoreError::Destination {
                status: None,
                message: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(StoreError::Destination {
                status: Some(status),
                message: resp.text().await.unwrap_or_default(),
            });
        }

        let result: DocumentResult = resp
            .json()
            .await
            .map_err(|e| StoreError::Payload(e.to_string()))?;
        debug!("created document {} in {database}", result.id);
        Ok(result.id)
    }
}

// Keeps the resolved credential out of debug output.
impl fmt::Debug for CloudantClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudantClient")
            .field("endpoint", &self.endpoint)
            .field("authenticated", &self.api_key.is_some())
            .finish()
    }
}

fn normalize_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim().trim_end_matches('/');
    if trimmed.starts_with("https://") || trimmed.starts_with("http://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}
