//! Error types shared by the API client, the token store and the player.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-2xx response; `message` comes from the `{ "error": ... }` body when present
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Authentication required")]
    AuthRequired,

    #[error("Playback failed: {0}")]
    Playback(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    Invalid(String),
}

impl AppError {
    /// True for media loading/transport failures, false for network and validation failures
    pub fn is_playback(&self) -> bool {
        matches!(self, AppError::Playback(_))
    }

    /// Message suitable for a transient user-facing notification
    pub fn user_message(&self) -> String {
        match self {
            AppError::Server { message, .. } => message.clone(),
            AppError::Request(e) if e.is_timeout() => "Request timed out".to_string(),
            AppError::Request(e) if e.is_connect() => "Could not reach the server".to_string(),
            AppError::AuthRequired => "Please sign in first".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playback_errors_are_classified() {
        assert!(AppError::Playback("decoder".into()).is_playback());
        assert!(!AppError::AuthRequired.is_playback());
        assert!(!AppError::Invalid("title".into()).is_playback());
    }

    #[test]
    fn server_message_is_shown_verbatim() {
        let err = AppError::Server {
            status: 422,
            message: "Email is already in use!".to_string(),
        };
        assert_eq!(err.user_message(), "Email is already in use!");
        assert_eq!(err.to_string(), "Server error (422): Email is already in use!");
    }
}
