use shelf_core::ShelfError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("HTTP error: {0}")]
    Http(#[from] ureq::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Authentication failed")]
    Unauthorized,

    #[error("Rate limited")]
    RateLimited,

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

pub type Result<T> = std::result::Result<T, GitHubError>;

impl GitHubError {
    /// HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            GitHubError::Unauthorized => Some(401),
            GitHubError::RateLimited => Some(429),
            GitHubError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<GitHubError> for ShelfError {
    fn from(err: GitHubError) -> Self {
        match err {
            GitHubError::Http(e) => ShelfError::Http(e.to_string()),
            GitHubError::Parse(e) => ShelfError::Parse(e.to_string()),
            GitHubError::Io(e) => ShelfError::Io(e.to_string()),
            GitHubError::Unauthorized => ShelfError::Unauthorized,
            GitHubError::RateLimited => ShelfError::RateLimited,
            GitHubError::Api { status, message } => ShelfError::from_status(status, message),
        }
    }
}
