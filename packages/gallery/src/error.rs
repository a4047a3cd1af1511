//! Error types for the gallery.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use nft_gallery_types::MetadataError;
use std::fmt;

/// Gallery error type.
#[derive(Debug)]
pub enum Error {
    /// Configuration error.
    Config(String),
    /// Caller supplied an unusable argument.
    InvalidInput(String),
    /// Gateway query failed (transport, contract error, bad status).
    Query(String),
    /// Gateway answered with a payload that does not match the expected shape.
    Parse(String),
    /// Hosted-checkout API failure.
    Catalog(String),
    /// Requested resource is not available.
    NotFound(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "config error: {msg}"),
            Error::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            Error::Query(msg) => write!(f, "query error: {msg}"),
            Error::Parse(msg) => write!(f, "parse error: {msg}"),
            Error::Catalog(msg) => write!(f, "catalog error: {msg}"),
            Error::NotFound(msg) => write!(f, "not found: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<MetadataError> for Error {
    fn from(err: MetadataError) -> Self {
        match err {
            MetadataError::InvalidInput(msg) => Error::InvalidInput(msg),
            MetadataError::Malformed(msg) => Error::Parse(msg),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::Query(_) | Error::Parse(_) | Error::Catalog(_) => StatusCode::BAD_GATEWAY,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
        };
        let body = serde_json::json!({
            "success": false,
            "error": self.to_string()
        });
        (status, Json(body)).into_response()
    }
}
