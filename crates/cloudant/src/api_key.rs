//! API key resolution.
//!
//! The plugin supports two authentication modes plus an explicit opt-out:
//!
//! - `IAMAPIKEY`: the key is read from a file mounted into the container
//!   (typically a Kubernetes secret).
//! - `ENV`: the key is read from the `API_KEY` environment variable, which
//!   is convenient when running outside a cluster.
//! - unset: no credential; requests are sent unauthenticated and a warning
//!   is logged once at resolution time.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

/// Environment variable consulted in [`AuthMode::Env`] mode.
pub const API_KEY_ENV_VAR: &str = "API_KEY";

/// How the Cloudant API key is acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Read the key from a mounted token file.
    IamApiKey,
    /// Read the key from the `API_KEY` environment variable.
    Env,
}

impl AuthMode {
    /// Parses the `Authentication_Mode` option. Matching is case-insensitive.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "IAMAPIKEY" => Some(Self::IamApiKey),
            "ENV" => Some(Self::Env),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("failed to read IAMAPIKEY from {path}: {source}")]
    TokenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{API_KEY_ENV_VAR} environment variable not set")]
    MissingEnvVar,
    #[error("IAMAPIKEY authentication requires a token mount path")]
    MissingTokenPath,
}

/// Resolves the API key for the given mode.
///
/// Returns `Ok(None)` when no mode is configured: the plugin proceeds
/// without authentication, which is only useful against local stores.
/// Token files are trimmed of surrounding whitespace, since mounted secrets
/// routinely carry a trailing newline.
pub fn resolve_api_key(
    mode: Option<AuthMode>,
    token_path: Option<&Path>,
) -> Result<Option<String>, CredentialError> {
    match mode {
        Some(AuthMode::IamApiKey) => {
            let path = token_path.ok_or(CredentialError::MissingTokenPath)?;
            let raw = fs::read_to_string(path).map_err(|source| CredentialError::TokenFile {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(Some(raw.trim().to_string()))
        }
        Some(AuthMode::Env) => match std::env::var(API_KEY_ENV_VAR) {
            Ok(key) if !key.is_empty() => Ok(Some(key)),
            _ => Err(CredentialError::MissingEnvVar),
        },
        None => {
            warn!("Authentication_Mode not set, proceeding without authentication");
            Ok(None)
        }
    }
}
