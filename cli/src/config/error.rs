use std::io;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::config::core::CONFIG_KEYS;

/// What can go wrong while reading or writing the credential file.
#[derive(Error, Debug, Diagnostic)]
pub enum ConfigError {
    #[error("Could not access config file at {}", .path.display())]
    #[diagnostic(code(mythx::config::io))]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Config file at {} is not valid JSON", .path.display())]
    #[diagnostic(
        code(mythx::config::json),
        help("Delete the file and run `mythx login` to recreate it")
    )]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(
        "Malformed config file at {} doesn't contain required keys {:?}",
        .path.display(),
        CONFIG_KEYS
    )]
    #[diagnostic(
        code(mythx::config::missing_keys),
        help("Delete the file and run `mythx login` to recreate it")
    )]
    MissingKeys { path: PathBuf },

    #[error(
        "Malformed config file at {} does not contain access and refresh token",
        .path.display()
    )]
    #[diagnostic(
        code(mythx::config::missing_tokens),
        help("Run `mythx login` to obtain a token pair")
    )]
    MissingTokens { path: PathBuf },
}
