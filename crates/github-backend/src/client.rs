use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::time::Duration;
use ureq::Agent;

use crate::error::{GitHubError, Result};
use crate::models::*;

const USER_AGENT: &str = concat!("shelf/", env!("CARGO_PKG_VERSION"));

/// GitHub REST API client
///
/// The token is optional: catalog reads work anonymously, at a lower rate
/// limit. Writes need a token with `repo` scope.
pub struct GitHubClient {
    agent: Agent,
    base_url: String,
    token: Option<String>,
}

impl GitHubClient {
    /// Create a new GitHub client targeting api.github.com
    pub fn new(token: Option<&str>) -> Self {
        Self::with_base_url("https://api.github.com", token)
    }

    /// Create a new GitHub client with a custom base URL (for GitHub Enterprise or testing)
    pub fn with_base_url(base_url: &str, token: Option<&str>) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(30)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()).map(String::from),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Build a repo-scoped URL
    fn repo_url(&self, owner: &str, repo: &str, path: &str) -> String {
        format!(
            "{}/repos/{}/{}{}",
            self.base_url,
            urlencoding::encode(owner),
            urlencoding::encode(repo),
            path
        )
    }

    /// Attach the standard GitHub headers, plus auth when a token is set
    fn with_headers<B>(&self, request: ureq::RequestBuilder<B>) -> ureq::RequestBuilder<B> {
        let request = request
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header("User-Agent", USER_AGENT);

        match &self.token {
            Some(token) => request.header("Authorization", &format!("Bearer {}", token)),
            None => request,
        }
    }

    /// Check response status and return error if not successful
    fn check_response(
        &self,
        mut response: ureq::http::Response<ureq::Body>,
    ) -> Result<ureq::http::Response<ureq::Body>> {
        let status = response.status().as_u16();

        if (200..300).contains(&status) {
            return Ok(response);
        }

        // Detect rate limiting: 429, or 403 with x-ratelimit-remaining: 0
        if status == 429 {
            return Err(GitHubError::RateLimited);
        }
        if status == 403 {
            if let Some(remaining) = response.headers().get("x-ratelimit-remaining") {
                if remaining.to_str().unwrap_or("") == "0" {
                    return Err(GitHubError::RateLimited);
                }
            }
        }

        // Try to read error body
        let body = response
            .body_mut()
            .read_to_string()
            .unwrap_or_else(|_| String::new());

        // Try to parse as GitHub error response
        let message = if let Ok(error_response) = serde_json::from_str::<serde_json::Value>(&body) {
            error_response
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or(&body)
                .to_string()
        } else if body.is_empty() {
            format!("HTTP {}", status)
        } else {
            body
        };

        log::debug!("GitHub responded {}: {}", status, message);

        if status == 401 {
            Err(GitHubError::Unauthorized)
        } else {
            Err(GitHubError::Api { status, message })
        }
    }

    // ==================== Repository Operations ====================

    /// List public repositories of a user, most recently updated first
    pub fn list_user_repos(&self, username: &str) -> Result<Vec<GitHubRepo>> {
        let url = format!(
            "{}/users/{}/repos?sort=updated&per_page=100",
            self.base_url,
            urlencoding::encode(username)
        );

        let response = self
            .with_headers(self.agent.get(&url))
            .call()
            .map_err(GitHubError::Http)?;

        let mut response = self.check_response(response)?;
        let repos: Vec<GitHubRepo> = response.body_mut().read_json()?;
        Ok(repos)
    }

    /// Create a repository for the authenticated user
    pub fn create_repo(&self, repo: &CreateGitHubRepo) -> Result<GitHubRepo> {
        let url = format!("{}/user/repos", self.base_url);

        let response = self
            .with_headers(self.agent.post(&url))
            .header("Content-Type", "application/json")
            .send_json(repo)
            .map_err(GitHubError::Http)?;

        let mut response = self.check_response(response)?;
        let created: GitHubRepo = response.body_mut().read_json()?;
        Ok(created)
    }

    // ==================== Release Operations ====================

    /// Get the latest published release of a repository
    pub fn get_latest_release(&self, owner: &str, repo: &str) -> Result<GitHubRelease> {
        let url = self.repo_url(owner, repo, "/releases/latest");

        let response = self
            .with_headers(self.agent.get(&url))
            .call()
            .map_err(GitHubError::Http)?;

        let mut response = self.check_response(response)?;
        let release: GitHubRelease = response.body_mut().read_json()?;
        Ok(release)
    }

    /// Get the release for a tag
    pub fn get_release_by_tag(&self, owner: &str, repo: &str, tag: &str) -> Result<GitHubRelease> {
        let url = self.repo_url(
            owner,
            repo,
            &format!("/releases/tags/{}", urlencoding::encode(tag)),
        );

        let response = self
            .with_headers(self.agent.get(&url))
            .call()
            .map_err(GitHubError::Http)?;

        let mut response = self.check_response(response)?;
        let release: GitHubRelease = response.body_mut().read_json()?;
        Ok(release)
    }

    /// Create a release. GitHub answers 422 when the tag already has one.
    pub fn create_release(
        &self,
        owner: &str,
        repo: &str,
        release: &CreateGitHubRelease,
    ) -> Result<GitHubRelease> {
        let url = self.repo_url(owner, repo, "/releases");

        let response = self
            .with_headers(self.agent.post(&url))
            .header("Content-Type", "application/json")
            .send_json(release)
            .map_err(GitHubError::Http)?;

        let mut response = self.check_response(response)?;
        let created: GitHubRelease = response.body_mut().read_json()?;
        Ok(created)
    }

    /// Upload raw bytes to an already expanded asset upload URL
    pub fn upload_release_asset(
        &self,
        upload_url: &str,
        content_type: &str,
        data: &[u8],
    ) -> Result<GitHubAsset> {
        log::debug!("Uploading {} bytes to {}", data.len(), upload_url);

        let response = self
            .with_headers(self.agent.post(upload_url))
            .header("Content-Type", content_type)
            .send(data)
            .map_err(GitHubError::Http)?;

        let mut response = self.check_response(response)?;
        let asset: GitHubAsset = response.body_mut().read_json()?;
        Ok(asset)
    }

    // ==================== Contents Operations ====================

    /// Get file metadata at `path`
    pub fn get_content(&self, owner: &str, repo: &str, path: &str) -> Result<GitHubContent> {
        let url = self.repo_url(owner, repo, &format!("/contents/{}", encode_path(path)));

        let response = self
            .with_headers(self.agent.get(&url))
            .call()
            .map_err(GitHubError::Http)?;

        let mut response = self.check_response(response)?;
        let content: GitHubContent = response.body_mut().read_json()?;
        Ok(content)
    }

    /// Create or update the file at `path`
    pub fn put_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        content: &[u8],
        message: &str,
        sha: Option<&str>,
    ) -> Result<GitHubContent> {
        let url = self.repo_url(owner, repo, &format!("/contents/{}", encode_path(path)));

        let body = PutGitHubContent {
            message: message.to_string(),
            content: BASE64.encode(content),
            sha: sha.map(String::from),
        };

        let response = self
            .with_headers(self.agent.put(&url))
            .header("Content-Type", "application/json")
            .send_json(&body)
            .map_err(GitHubError::Http)?;

        let mut response = self.check_response(response)?;
        let written: PutGitHubContentResponse = response.body_mut().read_json()?;
        Ok(written.content)
    }
}

/// Percent-encode each segment of a repository path, keeping the slashes
fn encode_path(path: &str) -> String {
    path.trim_start_matches('/')
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
