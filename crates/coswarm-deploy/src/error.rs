//! Error types for the deploy step

use thiserror::Error;

/// Errors that fail a run.
///
/// Both variants send the run down the failure-notification path; the
/// `Display` output is what the CI platform shows as the failure reason.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    /// A required input is missing or invalid
    #[error("{0}")]
    Configuration(String),

    /// The deploy API answered with a non-2xx status, or could not be reached
    #[error("{message}")]
    Deploy {
        message: String,
        response_body: Option<String>,
    },
}

impl RunError {
    /// Raw response body returned by the deploy API, if any.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            RunError::Configuration(_) => None,
            RunError::Deploy { response_body, .. } => response_body.as_deref(),
        }
    }
}

/// Errors raised while talking to the collaboration platform.
///
/// Never fatal: callers log them as warnings and carry on.
#[derive(Error, Debug)]
pub enum NotificationError {
    /// `GITHUB_REPOSITORY` was not available
    #[error("repository is unknown; GITHUB_REPOSITORY must look like 'owner/repo'")]
    MissingRepository,

    /// The platform answered with a non-2xx status
    #[error("GitHub API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// The request URL could not be built
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// The response could not be decoded
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for NotificationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            NotificationError::Decode(err.to_string())
        } else {
            NotificationError::Http(err.to_string())
        }
    }
}

/// Result type for collaboration-platform calls
pub type NotifyResult<T> = std::result::Result<T, NotificationError>;
