//! Batch delivery engine.
//!
//! Walks a normalized batch in order, assigns each document a fresh
//! identity and submits it to the store, one blocking write at a time.
//! The first submission error rejects the whole batch and stops further
//! processing; documents already created are not rolled back. The store
//! has no multi-document transaction, and redelivery of a rejected batch
//! belongs to the host pipeline.

use cloudant::{Document, DocumentStore};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::identity::new_document_id;

/// Outcome of one batch, as reported to the host's flush contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchResult {
    Accepted,
    Rejected,
}

/// Submits `records` to `database`, in order.
///
/// A record that is not a mapping is logged and skipped; it contributes
/// nothing to the store and does not abort the batch.
pub async fn deliver<S>(store: &S, database: &str, records: &[Value]) -> BatchResult
where
    S: DocumentStore + ?Sized,
{
    for record in records {
        let Some(fields) = record.as_object() else {
            warn!("skipping record that is not a mapping: {record}");
            continue;
        };

        let doc = Document::new(new_document_id(), fields.clone());
        if let Err(e) = store.create_document(database, &doc).await {
            error!("failed to send document to Cloudant: {e}");
            return BatchResult::Rejected;
        }
    }
    debug!("successfully sent all records to Cloudant");
    BatchResult::Accepted
}
