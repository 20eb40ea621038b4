//! Errors from the REST API and object storage layers.

use reqwest::StatusCode;

use crate::config::ConfigError;

/// Errors from the catalog REST API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-2xx status code.
    ///
    /// `message` is the server-provided error text where available.
    #[error("{message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Server error message, or the raw body, or the status reason.
        message: String,
    },

    /// A 2xx response whose body could not be used.
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// The request was rejected before sending.
    #[error("Invalid request: {0}")]
    Invalid(#[from] validator::ValidationErrors),

    /// The client could not be built from its configuration.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl ApiError {
    /// HTTP status of a rejected call, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Build a [`ApiError::Status`] from a failed response's status and body.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        ApiError::Status {
            status: status.as_u16(),
            message: user_message(status, body),
        }
    }
}

/// Errors from the presigned storage write.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The PUT request itself failed.
    #[error("Storage request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Storage answered with a non-2xx status.
    #[error("Storage upload failed {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body (storage error XML, usually).
        body: String,
    },

    /// A presign-supplied header could not be sent.
    #[error("Invalid upload header '{0}'")]
    InvalidHeader(String),
}

/// Pick the message shown to the user for a failed call.
///
/// A JSON `error` field wins, then `errors.message`, then `detail`, then
/// the trimmed body text, then the status reason.
pub fn user_message(status: StatusCode, body: &str) -> String {
    if let Some(msg) = server_message(body) {
        return msg;
    }
    let text = body.trim();
    if !text.is_empty() {
        return text.to_string();
    }
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["/error", "/errors/message", "/detail"]
        .iter()
        .find_map(|ptr| value.pointer(ptr).and_then(|v| v.as_str()))
        .map(str::to_string)
}
