//! Error types shared by the MIME walker, the API client and the commands.

use thiserror::Error;

/// Errors that can occur while talking to the mail API or walking a message.
#[derive(Error, Debug)]
pub enum MailError {
    /// A body or attachment payload was not valid base64url.
    #[error("Failed to decode base64url payload: {0}")]
    Decode(#[from] base64::DecodeError),

    /// A decoded text body was not valid UTF-8.
    #[error("Decoded body is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// A MIME part arrived without its `mimeType`.
    #[error("MIME part {} has no mimeType", part_label(.part_id))]
    MissingMimeType { part_id: Option<String> },

    /// A response lacked a field the caller needs.
    #[error("Response is missing field '{0}'")]
    MissingField(&'static str),

    /// Transport-level HTTP failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// OAuth2 flow or client secret loading failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    /// An attachment filename that cannot be written safely.
    #[error("Invalid attachment filename '{0}'")]
    InvalidFilename(String),

    /// A message or attachment id that is not a single URL path segment.
    #[error("Invalid id '{0}'")]
    InvalidId(String),
}

fn part_label(part_id: &Option<String>) -> &str {
    part_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .unwrap_or("(root)")
}

/// Result type for mail operations.
pub type Result<T> = std::result::Result<T, MailError>;
