use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error body returned by the backend alongside a non-2xx status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    /// The server message, ignoring blank strings.
    pub fn message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|message| !message.is_empty())
    }
}

#[derive(Debug, Error)]
#[error("backend responded with status {status}: {}", .body.message().unwrap_or("<no message>"))]
pub struct ApiException {
    pub status: u16,
    pub body: ApiErrorBody,
}

impl ApiException {
    pub fn new(status: u16, body: ApiErrorBody) -> Self {
        Self { status, body }
    }
}
