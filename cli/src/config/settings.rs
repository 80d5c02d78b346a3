use std::path::PathBuf;

use crate::client::core::Environment;
use crate::config::core::default_config_path;
use crate::utils::logging::LogConfig;

/// Invocation-wide settings shared by every command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub environment: Environment,
    pub config_path: PathBuf,
    /// Used instead of prompting when no credential file exists yet.
    pub username: Option<String>,
    pub password: Option<String>,
    pub log: LogConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            environment: Environment::Production,
            config_path: default_config_path(),
            username: None,
            password: None,
            log: LogConfig::default(),
        }
    }
}
