use serde::{Deserialize, Serialize};

/// GitHub user (minimal representation)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitHubUser {
    pub login: String,
    pub id: u64,
}

/// GitHub repository
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitHubRepo {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub owner: GitHubUser,
    pub html_url: String,
    pub updated_at: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    pub default_branch: Option<String>,
}

/// Body of `POST /user/repos`
#[derive(Debug, Clone, Serialize)]
pub struct CreateGitHubRepo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub private: bool,
    pub auto_init: bool,
}
