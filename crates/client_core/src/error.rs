//! Failure taxonomy for calls against the site backend.

use shared::error::ApiException;
use thiserror::Error;

pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request could not complete: {0}")]
    Transport(#[source] reqwest::Error),
    #[error(transparent)]
    Backend(#[from] ApiException),
    #[error("malformed response body: {0}")]
    MalformedResponse(String),
    #[error("invalid endpoint url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ClientError {
    /// Text to show the user: the backend's own message when it sent one,
    /// otherwise `fallback`.
    pub fn user_message<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self {
            ClientError::Backend(exception) => exception.body.message().unwrap_or(fallback),
            _ => fallback,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Backend(exception) => Some(exception.status),
            ClientError::Transport(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            ClientError::MalformedResponse(value.to_string())
        } else {
            ClientError::Transport(value)
        }
    }
}
