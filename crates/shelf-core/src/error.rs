use thiserror::Error;

/// Errors shared by every release host backend and the publishing workflows
#[derive(Error, Debug)]
pub enum ShelfError {
    #[error("Authentication required: log in with a GitHub token first (shelf login)")]
    AuthRequired,

    #[error("Authentication failed")]
    Unauthorized,

    #[error(
        "GitHub API rate limit exceeded. Log in with a personal access token (shelf login) to raise your quota"
    )]
    RateLimited,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl ShelfError {
    /// Normalize an HTTP status and message into the shared taxonomy.
    ///
    /// 422 is how GitHub reports an already existing release tag (and a
    /// contents write missing its `sha`), so it maps to `Conflict`.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 => ShelfError::Unauthorized,
            429 => ShelfError::RateLimited,
            404 => ShelfError::NotFound(message),
            422 => ShelfError::Conflict(message),
            _ => ShelfError::Api { status, message },
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ShelfError::Conflict(_))
    }

    /// True for an explicit rate limit and for a bare 403, which GitHub also
    /// returns to anonymous callers once their quota is spent.
    pub fn is_rate_limited(&self) -> bool {
        matches!(
            self,
            ShelfError::RateLimited | ShelfError::Api { status: 403, .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ShelfError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, ShelfError>;
