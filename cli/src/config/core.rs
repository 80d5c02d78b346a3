//! The on-disk credential store.
//!
//! A single JSON object with the keys in [`CONFIG_KEYS`]. It is read at the
//! start of a command and rewritten with whatever token pair the service
//! handed back at the end.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnNull, serde_as};

use crate::config::error::ConfigError;

pub const CONFIG_KEYS: [&str; 4] = ["access", "refresh", "username", "password"];
pub const CONFIG_FILE_NAME: &str = ".pythx.json";

/// The address trial users log in with.
pub const ANONYMOUS_ADDRESS: &str = "0x0000000000000000000000000000000000000000";
pub const TRIAL_PASSWORD: &str = "trial";

#[serde_as]
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub access: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub refresh: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = |value: &str| if value.is_empty() { "" } else { "<redacted>" };
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &redacted(self.password.as_str()))
            .field("access", &redacted(self.access.as_str()))
            .field("refresh", &redacted(self.refresh.as_str()))
            .finish()
    }
}

impl Credentials {
    pub fn has_tokens(&self) -> bool {
        !self.access.is_empty() && !self.refresh.is_empty()
    }

    pub fn is_anonymous(&self) -> bool {
        self.username == ANONYMOUS_ADDRESS
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenRequirement {
    Required,
    Optional,
}

pub fn default_config_path() -> PathBuf {
    std::env::temp_dir().join(CONFIG_FILE_NAME)
}

pub fn load(path: &Path, tokens: TokenRequirement) -> Result<Credentials, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(path, &raw, tokens)
}

/// Validate and decode the contents of a credential file read from `path`.
pub fn parse(path: &Path, raw: &str, tokens: TokenRequirement) -> Result<Credentials, ConfigError> {
    let invalid = |source| ConfigError::InvalidJson {
        path: path.to_path_buf(),
        source,
    };

    let value: serde_json::Value = serde_json::from_str(raw).map_err(invalid)?;
    let complete = value
        .as_object()
        .is_some_and(|obj| CONFIG_KEYS.iter().all(|key| obj.contains_key(*key)));
    if !complete {
        return Err(ConfigError::MissingKeys {
            path: path.to_path_buf(),
        });
    }

    let credentials: Credentials = serde_json::from_value(value).map_err(invalid)?;
    if tokens == TokenRequirement::Required && !credentials.has_tokens() {
        return Err(ConfigError::MissingTokens {
            path: path.to_path_buf(),
        });
    }

    Ok(credentials)
}

pub fn save(path: &Path, credentials: &Credentials) -> Result<(), ConfigError> {
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };

    let json = serde_json::to_string(credentials).map_err(|source| ConfigError::InvalidJson {
        path: path.to_path_buf(),
        source,
    })?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
    }
    fs::write(path, json).map_err(io_err)?;
    tracing::debug!(path = %path.display(), "stored credentials");
    Ok(())
}

/// Delete the credential file. Returns `false` when there was nothing to delete.
pub fn remove(path: &Path) -> Result<bool, ConfigError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
