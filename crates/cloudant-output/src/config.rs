//! Plugin configuration.
//!
//! The host pipeline supplies configuration as a flat bundle of string
//! options. Validation happens once at init; a missing mandatory option or
//! an unrecognized authentication mode keeps the plugin from starting.
//!
//! Recognized options:
//!
//! | key                   | meaning                                          |
//! |-----------------------|--------------------------------------------------|
//! | `Endpoint`            | Cloudant URL; `https://` is assumed if no scheme |
//! | `Authentication_Mode` | `IAMAPIKEY` or `ENV`; unset = unauthenticated    |
//! | `CR_Token_Mount_Path` | token file, mandatory with `IAMAPIKEY`           |
//! | `Database`            | target database name                             |

use std::collections::HashMap;
use std::path::PathBuf;

use cloudant::AuthMode;
use thiserror::Error;

const ENDPOINT_KEY: &str = "Endpoint";
const AUTH_MODE_KEY: &str = "Authentication_Mode";
const TOKEN_PATH_KEY: &str = "CR_Token_Mount_Path";
const DATABASE_KEY: &str = "Database";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing mandatory config: {0}")]
    MissingField(&'static str),
    #[error("invalid Authentication_Mode {0:?}: must be IAMAPIKEY or ENV")]
    InvalidAuthMode(String),
}

/// Validated plugin configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub endpoint: String,
    pub auth_mode: Option<AuthMode>,
    pub token_path: Option<PathBuf>,
    pub database: String,
}

impl Config {
    /// Validates the host's configuration bundle.
    ///
    /// Option values are trimmed; an option that is present but empty
    /// counts as absent.
    pub fn from_options(options: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let endpoint = require(options, ENDPOINT_KEY)?;
        let database = require(options, DATABASE_KEY)?;

        let auth_mode = match lookup(options, AUTH_MODE_KEY) {
            None => None,
            Some(raw) => Some(
                AuthMode::parse(raw).ok_or_else(|| ConfigError::InvalidAuthMode(raw.to_string()))?,
            ),
        };

        let token_path = match auth_mode {
            Some(AuthMode::IamApiKey) => Some(PathBuf::from(require(options, TOKEN_PATH_KEY)?)),
            _ => lookup(options, TOKEN_PATH_KEY).map(PathBuf::from),
        };

        Ok(Config {
            endpoint: endpoint.to_string(),
            auth_mode,
            token_path,
            database: database.to_string(),
        })
    }
}

fn lookup<'a>(options: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    options
        .get(key)
        .map(String::as_str)
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn require<'a>(
    options: &'a HashMap<String, String>,
    key: &'static str,
) -> Result<&'a str, ConfigError> {
    lookup(options, key).ok_or(ConfigError::MissingField(key))
}
