/// Error normalization for catalog API calls
///
/// Every failed request is mapped exactly once, here, into an `ApiError`.
/// Callers only ever need `message()`; the variants exist so logs and
/// the retry policy can tell connectivity problems from server faults.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Shown for any HTTP 5xx, whatever the body says
pub const SERVER_ERROR_MESSAGE: &str = "Server error, please try again later!";

/// Shown when the server cannot be reached at all
pub const NETWORK_ERROR_MESSAGE: &str =
    "Failed to connect to the server, please check your internet connection";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Connection refused, DNS failure, timeout, ...
    #[error("{}", NETWORK_ERROR_MESSAGE)]
    Network,
    /// 500..=599
    #[error("{}", SERVER_ERROR_MESSAGE)]
    Server(u16),
    /// Any other non-success status, carrying the backend's own message
    #[error("{message}")]
    Application { status: u16, message: String },
    /// A success status with a body we could not understand
    #[error("Unexpected response from server: {0}")]
    Decode(String),
}

impl ApiError {
    /// The uniform `{ message }` shape shown to the user
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Whether a bounded retry may help
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Network | ApiError::Server(_))
    }

    /// Normalize an error status and its raw body
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        if status.is_server_error() {
            return ApiError::Server(status.as_u16());
        }

        ApiError::Application {
            status: status.as_u16(),
            message: application_message(status, body),
        }
    }

    /// Normalize a transport-level failure from reqwest
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_status(status, "");
        }

        if err.is_decode() {
            return ApiError::Decode(err.to_string());
        }

        ApiError::Network
    }
}

/// Error bodies the backend sends for 4xx responses
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Pull the most useful message out of an application error body.
/// Falls back to the raw body, then to the status reason.
fn application_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(message) = parsed.message.or(parsed.error) {
            if !message.trim().is_empty() {
                return message;
            }
        }
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() && !trimmed.starts_with('{') {
        return trimmed.to_string();
    }

    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()))
}
