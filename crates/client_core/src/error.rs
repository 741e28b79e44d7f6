//! Error taxonomy shared by the transport, the session store and every orchestrator.

use reqwest::StatusCode;
use thiserror::Error;

pub const GENERIC_FAILURE_MESSAGE: &str = "Request failed. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Auth,
    Transport,
    Backend,
    Malformed,
    Storage,
}

#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Rejected locally before any request was sent.
    #[error("{0}")]
    Validation(String),
    #[error("backend returned {status}: {message}")]
    Backend { status: StatusCode, message: String },
    #[error("transport failure: {0}")]
    Transport(String),
    /// The call succeeded at the HTTP level but the body lacked what the caller needs.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("session storage failure: {0}")]
    Storage(String),
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ClientError::Validation(_) => ErrorCategory::Validation,
            ClientError::Backend { status, .. }
                if *status == StatusCode::UNAUTHORIZED || *status == StatusCode::FORBIDDEN =>
            {
                ErrorCategory::Auth
            }
            ClientError::Backend { .. } => ErrorCategory::Backend,
            ClientError::Transport(_) => ErrorCategory::Transport,
            ClientError::MalformedResponse(_) => ErrorCategory::Malformed,
            ClientError::Storage(_) => ErrorCategory::Storage,
        }
    }

    /// True when the backend rejected our credentials or token.
    ///
    /// Controllers surface these like any other failure; a stale session is not cleared.
    pub fn requires_reauth(&self) -> bool {
        self.category() == ErrorCategory::Auth
    }

    /// Text suitable for an inline error banner.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Validation(message) | ClientError::Backend { message, .. } => {
                message.clone()
            }
            ClientError::Transport(_) => {
                "Server unreachable; check your connection and try again.".to_string()
            }
            ClientError::MalformedResponse(message) => message.clone(),
            ClientError::Storage(_) => "Could not access the saved session.".to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(value: reqwest::Error) -> Self {
        match value.status() {
            Some(status) => ClientError::Backend {
                status,
                message: GENERIC_FAILURE_MESSAGE.to_string(),
            },
            None if value.is_decode() => ClientError::MalformedResponse(value.to_string()),
            None => ClientError::Transport(value.to_string()),
        }
    }
}
