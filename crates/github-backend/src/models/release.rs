use serde::{Deserialize, Serialize};

/// GitHub release asset
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitHubAsset {
    pub id: u64,
    pub name: String,
    pub label: Option<String>,
    pub browser_download_url: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub download_count: u64,
    pub content_type: Option<String>,
}

/// GitHub release
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitHubRelease {
    pub id: u64,
    pub tag_name: String,
    pub name: Option<String>,
    pub body: Option<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub assets: Vec<GitHubAsset>,
    /// Hypermedia template, e.g. `https://uploads.github.com/.../assets{?name,label}`
    pub upload_url: String,
    pub html_url: String,
    pub published_at: Option<String>,
}

/// Body of `POST /repos/{owner}/{repo}/releases`
#[derive(Debug, Clone, Serialize)]
pub struct CreateGitHubRelease {
    pub tag_name: String,
    pub name: String,
    pub body: String,
    pub draft: bool,
    pub prerelease: bool,
}
