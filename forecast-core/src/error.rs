//! Error taxonomy for every stage of the forecast pipeline.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Credential resolution failed on every configured provider.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("API key is required to run. Tried: {tried}")]
    Missing { tried: String },
}

/// Failures of the single forecast request.
#[derive(Debug, Error)]
pub enum FetchError {
    /// 401: the key is wrong or not activated yet.
    #[error("Authentication failed: invalid API key or key not activated yet")]
    Authentication,

    #[error("Location not found: {city}")]
    LocationNotFound { city: String },

    #[error("HTTP error {status}: {body}")]
    Http { status: StatusCode, body: String },

    /// DNS, connect, timeout or body read failures.
    #[error("Request failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Failed to decode forecast response: {0}")]
    Decode(#[source] serde_json::Error),
}

/// The response decoded but cannot be turned into a forecast series.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("Invalid data: response contains no forecast entries")]
    MissingForecast,

    #[error("Invalid data: timestamp {0} is out of range")]
    InvalidTimestamp(i64),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to draw {file}: {message}")]
    Drawing { file: &'static str, message: String },
}

/// Any fatal error that stops a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Credentials(#[from] CredentialError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Render(#[from] RenderError),
}
