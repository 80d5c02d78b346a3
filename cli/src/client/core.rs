use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::client::error::ApiError;
use crate::client::models::{
    Analysis, AnalysisData, AnalysisList, AnalysisSubmission, AuthResponse, DetectedIssues,
    LoginRequest, OpenApiMode, RefreshRequest, Sources, VersionInfo,
};
use crate::config::core::Credentials;

pub const CLIENT_TOOL_NAME: &str = "mythx-cli";

const PRODUCTION_URL: &str = "https://api.mythx.io/v1";
const STAGING_URL: &str = "https://staging.api.mythx.io/v1";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Production,
    Staging,
}

impl Environment {
    pub fn from_staging_flag(staging: bool) -> Self {
        if staging {
            Environment::Staging
        } else {
            Environment::Production
        }
    }

    pub fn base_url(self) -> &'static str {
        match self {
            Environment::Production => PRODUCTION_URL,
            Environment::Staging => STAGING_URL,
        }
    }
}

/// A response from an authenticated endpoint together with the credentials
/// that were valid when it was produced. The caller persists `credentials`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Authenticated<T> {
    pub data: T,
    pub credentials: Credentials,
}

/// Everything the CLI needs from the analysis service.
///
/// Credentials are passed in explicitly and never stored on the implementor.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> Result<Credentials, ApiError>;

    async fn refresh(&self, credentials: &Credentials) -> Result<Credentials, ApiError>;

    async fn logout(&self, credentials: &Credentials) -> Result<(), ApiError>;

    async fn analyze(
        &self,
        credentials: &Credentials,
        bytecode: Option<&str>,
        sources: &Sources,
    ) -> Result<Authenticated<Analysis>, ApiError>;

    async fn status(
        &self,
        credentials: &Credentials,
        uuid: &str,
    ) -> Result<Authenticated<Analysis>, ApiError>;

    async fn analysis_list(
        &self,
        credentials: &Credentials,
    ) -> Result<Authenticated<AnalysisList>, ApiError>;

    async fn report(
        &self,
        credentials: &Credentials,
        uuid: &str,
    ) -> Result<Authenticated<DetectedIssues>, ApiError>;

    async fn openapi(&self, mode: OpenApiMode) -> Result<String, ApiError>;

    async fn version(&self) -> Result<VersionInfo, ApiError>;
}

/// HTTP implementation of [`AnalysisService`] against the MythX v1 API.
pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

impl Client {
    pub fn new(environment: Environment) -> Result<Self, ApiError> {
        Self::with_base_url(environment.base_url())
    }

    /// A client rooted at an arbitrary API prefix, without a trailing slash.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("mythx-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send_raw(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!(url = %response.url(), %status, "api response");

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn send<T: DeserializeOwned + Send>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        Ok(self.send_raw(request).await?.json::<T>().await?)
    }

    /// Issue an authenticated call. A rejected access token is exchanged for a
    /// new pair once and the call reissued with it.
    async fn authenticated<T, F>(
        &self,
        credentials: &Credentials,
        build: F,
    ) -> Result<Authenticated<T>, ApiError>
    where
        T: DeserializeOwned + Send,
        F: Fn(&str) -> RequestBuilder + Send + Sync,
    {
        match self.send(build(&credentials.access)).await {
            Err(ApiError::Unauthorized) => {
                tracing::debug!("access token rejected, refreshing token pair");
                let refreshed = self.refresh(credentials).await?;
                let data = self.send(build(&refreshed.access)).await?;
                Ok(Authenticated {
                    data,
                    credentials: refreshed,
                })
            }
            other => other.map(|data| Authenticated {
                data,
                credentials: credentials.clone(),
            }),
        }
    }
}

#[async_trait]
impl AnalysisService for Client {
    async fn login(&self, username: &str, password: &str) -> Result<Credentials, ApiError> {
        let body = LoginRequest {
            eth_address: username,
            password,
        };
        let resp: AuthResponse = self
            .send(self.http.post(self.url("auth/login")).json(&body))
            .await?;

        Ok(Credentials {
            username: username.to_owned(),
            password: password.to_owned(),
            access: resp.jwt_tokens.access,
            refresh: resp.jwt_tokens.refresh,
        })
    }

    async fn refresh(&self, credentials: &Credentials) -> Result<Credentials, ApiError> {
        let body = RefreshRequest {
            access_token: &credentials.access,
            refresh_token: &credentials.refresh,
        };
        let resp: AuthResponse = self
            .send(self.http.post(self.url("auth/refresh")).json(&body))
            .await?;

        Ok(Credentials {
            access: resp.jwt_tokens.access,
            refresh: resp.jwt_tokens.refresh,
            ..credentials.clone()
        })
    }

    async fn logout(&self, credentials: &Credentials) -> Result<(), ApiError> {
        let request = self
            .http
            .post(self.url("auth/logout"))
            .bearer_auth(&credentials.access)
            .json(&serde_json::json!({}));
        self.send_raw(request).await?;
        Ok(())
    }

    async fn analyze(
        &self,
        credentials: &Credentials,
        bytecode: Option<&str>,
        sources: &Sources,
    ) -> Result<Authenticated<Analysis>, ApiError> {
        let body = AnalysisSubmission {
            client_tool_name: CLIENT_TOOL_NAME,
            data: AnalysisData {
                bytecode,
                sources: (!sources.is_empty()).then_some(sources),
            },
        };
        self.authenticated(credentials, |token| {
            self.http
                .post(self.url("analyses"))
                .bearer_auth(token)
                .json(&body)
        })
        .await
    }

    async fn status(
        &self,
        credentials: &Credentials,
        uuid: &str,
    ) -> Result<Authenticated<Analysis>, ApiError> {
        self.authenticated(credentials, |token| {
            self.http
                .get(self.url(&format!("analyses/{uuid}")))
                .bearer_auth(token)
        })
        .await
    }

    async fn analysis_list(
        &self,
        credentials: &Credentials,
    ) -> Result<Authenticated<AnalysisList>, ApiError> {
        self.authenticated(credentials, |token| {
            self.http.get(self.url("analyses")).bearer_auth(token)
        })
        .await
    }

    async fn report(
        &self,
        credentials: &Credentials,
        uuid: &str,
    ) -> Result<Authenticated<DetectedIssues>, ApiError> {
        self.authenticated(credentials, |token| {
            self.http
                .get(self.url(&format!("analyses/{uuid}/issues")))
                .bearer_auth(token)
        })
        .await
    }

    async fn openapi(&self, mode: OpenApiMode) -> Result<String, ApiError> {
        let path = match mode {
            OpenApiMode::Html => "openapi",
            OpenApiMode::Yaml => "openapi.yaml",
        };
        Ok(self.send_raw(self.http.get(self.url(path))).await?.text().await?)
    }

    async fn version(&self) -> Result<VersionInfo, ApiError> {
        self.send(self.http.get(self.url("version"))).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn stale() -> Credentials {
        Credentials {
            username: "0x1234567890123456789012345678901234567890".into(),
            password: "secret".into(),
            access: "stale".into(),
            refresh: "refresh".into(),
        }
    }

    fn tokens(access: &str, refresh: &str) -> ResponseTemplate {
        ResponseTemplate::new(200)
            .set_body_json(json!({ "jwtTokens": { "access": access, "refresh": refresh } }))
    }

    fn empty_list() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({ "analyses": [], "total": 0 }))
    }

    async fn mount_refresh(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .and(body_json(json!({ "accessToken": "stale", "refreshToken": "refresh" })))
            .respond_with(tokens("fresh", "fresh-refresh"))
            .expect(1)
            .mount(server)
            .await;
    }

    #[test]
    fn staging_flag_selects_endpoint() {
        assert_eq!(
            Environment::from_staging_flag(true).base_url(),
            "https://staging.api.mythx.io/v1"
        );
        assert_eq!(
            Environment::from_staging_flag(false).base_url(),
            "https://api.mythx.io/v1"
        );
    }

    #[test]
    fn urls_are_joined_under_the_version_prefix() {
        let client = Client::new(Environment::Staging).unwrap();
        assert_eq!(
            client.url("analyses/abc/issues"),
            "https://staging.api.mythx.io/v1/analyses/abc/issues"
        );
    }

    #[tokio::test]
    async fn login_posts_address_and_password() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(json!({ "ethAddress": "0xabc", "password": "trial" })))
            .respond_with(tokens("a", "r"))
            .expect(1)
            .mount(&server)
            .await;

        let client = Client::with_base_url(server.uri()).unwrap();
        let credentials = client.login("0xabc", "trial").await.unwrap();

        assert_eq!(credentials.username, "0xabc");
        assert_eq!(credentials.password, "trial");
        assert_eq!(credentials.access, "a");
        assert_eq!(credentials.refresh, "r");
    }

    #[tokio::test]
    async fn valid_token_is_sent_as_bearer_and_kept() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/analyses"))
            .and(header("authorization", "Bearer stale"))
            .respond_with(empty_list())
            .expect(1)
            .mount(&server)
            .await;

        let client = Client::with_base_url(server.uri()).unwrap();
        let listed = client.analysis_list(&stale()).await.unwrap();

        assert_eq!(listed.data, AnalysisList::default());
        assert_eq!(listed.credentials, stale());
    }

    #[tokio::test]
    async fn rejected_token_is_refreshed_once_and_the_call_reissued() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/analyses"))
            .and(header("authorization", "Bearer stale"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/analyses"))
            .and(header("authorization", "Bearer fresh"))
            .respond_with(empty_list())
            .expect(1)
            .mount(&server)
            .await;
        mount_refresh(&server).await;

        let client = Client::with_base_url(server.uri()).unwrap();
        let listed = client.analysis_list(&stale()).await.unwrap();

        assert_eq!(listed.credentials.access, "fresh");
        assert_eq!(listed.credentials.refresh, "fresh-refresh");
        assert_eq!(listed.credentials.username, stale().username);
        assert_eq!(listed.credentials.password, stale().password);
    }

    #[tokio::test]
    async fn second_rejection_is_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/analyses"))
            .respond_with(ResponseTemplate::new(401))
            .expect(2)
            .mount(&server)
            .await;
        mount_refresh(&server).await;

        let client = Client::with_base_url(server.uri()).unwrap();
        let err = client.analysis_list(&stale()).await.unwrap_err();

        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[tokio::test]
    async fn other_failures_carry_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/analyses/ab9092f7-54d0-480f-9b63-1bb1508280e2"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        let client = Client::with_base_url(server.uri()).unwrap();
        let err = client
            .status(&stale(), "ab9092f7-54d0-480f-9b63-1bb1508280e2")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApiError::Status { status: 500, ref body } if body == "boom"
        ));
    }
}
