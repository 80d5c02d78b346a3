//! In-memory stand-ins for the analysis service and the terminal.

use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::core::{AnalysisService, Authenticated};
use crate::client::error::ApiError;
use crate::client::models::{
    Analysis, AnalysisList, DetectedIssues, OpenApiMode, Sources, VersionInfo,
};
use crate::commands::session::Prompter;
use crate::config::core::{self as store, Credentials};
use crate::config::settings::Settings;

#[derive(Default)]
pub struct FakeService {
    pub analyses: Vec<Analysis>,
    pub issues: DetectedIssues,
    pub(crate) calls: Mutex<Vec<String>>,
}

impl FakeService {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    /// Every authenticated call hands back a new access token.
    fn rotated<T>(&self, credentials: &Credentials, data: T) -> Authenticated<T> {
        Authenticated {
            data,
            credentials: Credentials {
                access: format!("{}-rotated", credentials.access),
                ..credentials.clone()
            },
        }
    }
}

pub fn analysis(uuid: &str, status: &str) -> Analysis {
    serde_json::from_value(serde_json::json!({
        "uuid": uuid,
        "status": status,
        "submittedAt": "2019-01-10T01:29:38.410Z",
    }))
    .unwrap()
}

#[async_trait]
impl AnalysisService for FakeService {
    async fn login(&self, username: &str, password: &str) -> Result<Credentials, ApiError> {
        self.record("login");
        Ok(Credentials {
            username: username.to_owned(),
            password: password.to_owned(),
            access: "access".into(),
            refresh: "refresh".into(),
        })
    }

    async fn refresh(&self, credentials: &Credentials) -> Result<Credentials, ApiError> {
        self.record("refresh");
        Ok(Credentials {
            access: "access-refreshed".into(),
            refresh: "refresh-refreshed".into(),
            ..credentials.clone()
        })
    }

    async fn logout(&self, _credentials: &Credentials) -> Result<(), ApiError> {
        self.record("logout");
        Ok(())
    }

    async fn analyze(
        &self,
        credentials: &Credentials,
        bytecode: Option<&str>,
        sources: &Sources,
    ) -> Result<Authenticated<Analysis>, ApiError> {
        let names: Vec<&str> = sources.keys().map(String::as_str).collect();
        self.record(format!("analyze {} {}", bytecode.unwrap_or("-"), names.join(",")));
        Ok(self.rotated(
            credentials,
            analysis("ab9092f7-54d0-480f-9b63-1bb1508280e2", "Queued"),
        ))
    }

    async fn status(
        &self,
        credentials: &Credentials,
        uuid: &str,
    ) -> Result<Authenticated<Analysis>, ApiError> {
        self.record(format!("status {uuid}"));
        Ok(self.rotated(credentials, analysis(uuid, "Finished")))
    }

    async fn analysis_list(
        &self,
        credentials: &Credentials,
    ) -> Result<Authenticated<AnalysisList>, ApiError> {
        self.record("analysis_list");
        let list = AnalysisList {
            analyses: self.analyses.clone(),
            total: self.analyses.len() as u64,
        };
        Ok(self.rotated(credentials, list))
    }

    async fn report(
        &self,
        credentials: &Credentials,
        uuid: &str,
    ) -> Result<Authenticated<DetectedIssues>, ApiError> {
        self.record(format!("report {uuid}"));
        Ok(self.rotated(credentials, self.issues.clone()))
    }

    async fn openapi(&self, mode: OpenApiMode) -> Result<String, ApiError> {
        self.record("openapi");
        Ok(match mode {
            OpenApiMode::Html => "<html></html>".into(),
            OpenApiMode::Yaml => "openapi: 3.0.0".into(),
        })
    }

    async fn version(&self) -> Result<VersionInfo, ApiError> {
        self.record("version");
        Ok(VersionInfo {
            api: "v1.4.14".into(),
            maru: "0.4.6".into(),
            mythril: "0.20.4".into(),
            harvey: "0.0.21".into(),
            hash: "e1b4a4a8a6d8d7e2b3f6c1f8d9a1b2c3".into(),
        })
    }
}

/// Accepts every default.
pub struct DefaultsPrompter;

impl Prompter for DefaultsPrompter {
    fn ask(&self, _question: &str, default: &str) -> io::Result<String> {
        Ok(default.to_owned())
    }

    fn ask_secret(&self, _question: &str, default: &str) -> io::Result<String> {
        Ok(default.to_owned())
    }
}

pub struct NoPrompter;

impl Prompter for NoPrompter {
    fn ask(&self, question: &str, _default: &str) -> io::Result<String> {
        panic!("unexpected prompt: {question}");
    }

    fn ask_secret(&self, question: &str, _default: &str) -> io::Result<String> {
        panic!("unexpected prompt: {question}");
    }
}

/// A credential file path under the temp dir, removed on drop.
pub struct TempConfig {
    pub path: PathBuf,
}

impl TempConfig {
    pub fn new(name: &str) -> Self {
        let path =
            std::env::temp_dir().join(format!("mythx-cmd-{}-{name}.json", std::process::id()));
        let _ = std::fs::remove_file(&path);
        Self { path }
    }

    pub fn with_credentials(name: &str, credentials: &Credentials) -> Self {
        let config = Self::new(name);
        store::save(&config.path, credentials).unwrap();
        config
    }

    pub fn settings(&self) -> Settings {
        Settings {
            config_path: self.path.clone(),
            ..Settings::default()
        }
    }

    pub fn stored(&self) -> Credentials {
        store::load(&self.path, store::TokenRequirement::Optional).unwrap()
    }
}

impl Drop for TempConfig {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

pub fn registered() -> Credentials {
    Credentials {
        username: "0x1234567890123456789012345678901234567890".into(),
        password: "secret".into(),
        access: "access".into(),
        refresh: "refresh".into(),
    }
}
