//! Error types for testbed-github.

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during GitHub API operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Authentication failed or token missing.
    #[error("GitHub authentication failed - pass --token or set GITHUB_TOKEN")]
    AuthenticationFailed,

    /// Token not found.
    #[error("no GitHub token found - pass --token, set GITHUB_TOKEN or run `gh auth login`")]
    NoToken,

    /// API rate limit exceeded.
    #[error("GitHub API rate limit exceeded - wait and try again")]
    RateLimited,

    /// Resource (repository, commit, file) not found or no access.
    #[error("not found or no access: {0}")]
    NotFound(String),

    /// API error with status code.
    #[error("GitHub API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    /// File contents could not be decoded.
    #[error("failed to decode contents of {path}: {reason}")]
    Decode { path: String, reason: String },

    /// Network error.
    #[error("network error")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("failed to parse GitHub response")]
    Parse(#[from] serde_json::Error),

    /// IO error (e.g., reading gh CLI token).
    #[error("io error")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// HTTP status code of the response that produced this error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::AuthenticationFailed => Some(401),
            Self::RateLimited => Some(403),
            Self::NotFound(_) => Some(404),
            Self::ApiError { status, .. } => Some(*status),
            _ => None,
        }
    }
}
