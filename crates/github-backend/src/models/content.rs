use serde::{Deserialize, Serialize};

/// File entry returned by the contents API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitHubContent {
    pub path: String,
    pub sha: String,
    pub html_url: Option<String>,
}

/// Body of `PUT /repos/{owner}/{repo}/contents/{path}`
#[derive(Debug, Clone, Serialize)]
pub struct PutGitHubContent {
    pub message: String,
    /// Base64 encoded file content
    pub content: String,
    /// Blob sha of the file being replaced; required for updates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

/// Response of a contents write
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PutGitHubContentResponse {
    pub content: GitHubContent,
}
