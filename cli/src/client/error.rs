use miette::Diagnostic;
use thiserror::Error;

/// Failures talking to the analysis service. None of these are retried.
#[derive(Error, Debug, Diagnostic)]
pub enum ApiError {
    #[error("Request to the MythX API failed")]
    #[diagnostic(code(mythx::api::transport))]
    Transport(#[from] reqwest::Error),

    #[error("MythX API rejected the credentials")]
    #[diagnostic(
        code(mythx::api::unauthorized),
        help("Run `mythx login` to obtain a fresh token pair")
    )]
    Unauthorized,

    #[error("MythX API responded with HTTP {status}: {body}")]
    #[diagnostic(code(mythx::api::status))]
    Status { status: u16, body: String },
}
