//! Plugin lifecycle.
//!
//! The host pipeline drives the plugin through a fixed contract:
//! `register` once at startup, `init` with the configuration bundle,
//! `flush` per raw batch, `exit` at shutdown. The C-ABI shim that bridges
//! this API into the host process is host-side glue and lives outside this
//! crate.
//!
//! All state lives in [`CloudantOutput`], constructed once at init and
//! shared read-only by every subsequent flush; overlapping flush calls are
//! safe.

use std::collections::HashMap;

use cloudant::{resolve_api_key, ClientError, CloudantClient, CredentialError};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{Config, ConfigError};
use crate::delivery::{self, BatchResult};
use crate::logger;
use crate::normalize;
use crate::record;

pub const PLUGIN_NAME: &str = "cloudant_output";
pub const PLUGIN_DESCRIPTION: &str =
    "Custom HTTP output plugin which writes logs to IBM Cloudant";

/// Result of a lifecycle call, as reported back to the host pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Error,
}

/// Plugin identity announced to the host at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    pub name: &'static str,
    pub description: &'static str,
}

/// Announces the plugin to the host and installs the log formatter.
/// Safe to call more than once.
#[must_use]
pub fn register() -> Registration {
    logger::init();
    info!("registering output plugin {PLUGIN_NAME}");
    Registration {
        name: PLUGIN_NAME,
        description: PLUGIN_DESCRIPTION,
    }
}

/// Why `init` refused to construct the plugin. Every variant maps to the
/// host-facing `Error` status; the host will not deliver records through
/// this instance.
#[derive(Debug, Error)]
pub enum InitError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error("failed to initialize Cloudant service: {0}")]
    Client(#[from] ClientError),
}

/// The initialized output plugin: validated configuration plus the
/// long-lived store client handle.
#[derive(Debug, Clone)]
pub struct CloudantOutput {
    client: CloudantClient,
    database: String,
}

impl CloudantOutput {
    /// Validates the configuration bundle, resolves the credential per the
    /// configured authentication mode and constructs the store client.
    pub fn init(options: &HashMap<String, String>) -> Result<Self, InitError> {
        let config = Config::from_options(options)?;
        let api_key = resolve_api_key(config.auth_mode, config.token_path.as_deref())?;
        let client = CloudantClient::new(&config.endpoint, api_key)?;

        info!("Cloudant service initialized successfully");
        info!("output plugin initialized with endpoint {}", client.endpoint());
        Ok(CloudantOutput {
            client,
            database: config.database,
        })
    }

    /// Processes one raw batch: decode, normalize each record, deliver.
    ///
    /// A record that fails normalization is dropped here with a warning and
    /// the batch continues. Returns [`Status::Ok`] iff the delivery engine
    /// accepted the whole batch.
    pub async fn flush(&self, data: &[u8]) -> Status {
        let mut records = Vec::new();
        for raw in record::decode_batch(data) {
            match normalize::normalize(&raw) {
                Ok(value) => records.push(value),
                Err(e) => warn!("failed to convert record: {e}"),
            }
        }

        match delivery::deliver(&self.client, &self.database, &records).await {
            BatchResult::Accepted => Status::Ok,
            BatchResult::Rejected => Status::Error,
        }
    }

    /// Shuts the plugin down. Nothing is buffered, so there is nothing to
    /// flush; the client handle goes away with the value.
    pub fn exit(&self) -> Status {
        info!("plugin exiting");
        Status::Ok
    }
}
