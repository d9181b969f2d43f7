//! Client library for IBM Cloudant used by the Fluent Bit output plugin.
//!
//! Two concerns live here:
//! - [`api_key`]: resolving the API credential from its configured source
//!   (a mounted token file or the `API_KEY` environment variable).
//! - [`client`]: the document-store capability. A [`client::DocumentStore`]
//!   trait for creating one document in a named database, and
//!   [`client::CloudantClient`], its HTTP implementation.
//!
//! The IAM token exchange performed by the managed Cloudant SDKs is not
//! reimplemented here; the resolved key is attached to requests as a bearer
//! credential and everything beyond that is the server's concern.

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![allow(clippy::missing_errors_doc)]

pub mod api_key;
pub mod client;

pub use api_key::{resolve_api_key, AuthMode, CredentialError};
pub use client::{ClientError, CloudantClient, Document, DocumentStore, StoreError};
