//! # Client Error Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Transport      request never got an answer (DNS, refused, TLS)        │
//! │  Unauthorized   server answered 401: session missing or expired        │
//! │  Decode         answer was not the expected envelope                   │
//! │  InvalidUrl     base URL could not be parsed                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! An action that ran and failed (`success: false`) is NOT a `ClientError`;
//! it comes back as an `ActionResponse` for the caller to inspect.

use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Could not read server response: {0}")]
    Decode(String),

    #[error("Not signed in")]
    Unauthorized,

    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}
