//! Fluent Bit output plugin core for IBM Cloudant.
//!
//! The host pipeline hands the plugin raw MessagePack batches; each record
//! is normalized into a JSON-safe document, assigned a fresh identity and
//! written to a Cloudant database, one document per record, with per-batch
//! success or failure reported back through the lifecycle contract.
//!
//! # Architecture
//!
//! ```text
//!   raw batch (MessagePack)
//!          │
//!          v
//!   ┌─────────────┐
//!   │   Decode    │  ([timestamp, record] entries → RawValue)
//!   └──────┬──────┘
//!          │
//!          v
//!   ┌─────────────┐
//!   │  Normalize  │  (string keys only, bytes → text, fail-closed per record)
//!   └──────┬──────┘
//!          │
//!          v
//!   ┌─────────────┐
//!   │   Deliver   │  (fresh id per document, fail-fast per batch)
//!   └──────┬──────┘
//!          │
//!          v
//!    Status {Ok, Error}
//! ```
//!
//! A record that fails normalization is dropped with a warning and the rest
//! of the batch continues; the first store error rejects the whole batch
//! without rolling back documents already created. The host pipeline owns
//! redelivery.

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

/// Configuration bundle validation.
pub mod config;

/// Batch delivery engine.
pub mod delivery;

/// Document identity generation.
pub mod identity;

/// Plugin log formatter and subscriber setup.
pub mod logger;

/// Record normalization into the canonical document shape.
pub mod normalize;

/// Plugin lifecycle: register, init, flush, exit.
pub mod plugin;

/// Wire decode boundary for the host's MessagePack batches.
pub mod record;

pub use plugin::{register, CloudantOutput, Registration, Status, PLUGIN_DESCRIPTION, PLUGIN_NAME};
