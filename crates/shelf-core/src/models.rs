use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, ShelfError};

/// Fixed repository path the cover image is committed to
pub const COVER_PATH: &str = "cover.jpg";

/// Branch assumed when a repository does not report its default branch
pub const DEFAULT_BRANCH: &str = "main";

// ========== Credentials ==========

/// Login pair used for authenticated operations
///
/// A token always comes with a username. Without a token the username is
/// still useful as the default catalog owner for visitors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Credential {
    pub fn new(username: impl Into<String>, token: Option<String>) -> Result<Self> {
        let username = username.into();
        let token = token.filter(|t| !t.trim().is_empty());
        if username.trim().is_empty() && token.is_some() {
            return Err(ShelfError::InvalidInput(
                "a token requires a username".to_string(),
            ));
        }
        Ok(Self { username, token })
    }

    /// Visitor credential: a username to browse, no token
    pub fn anonymous(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: None,
        }
    }

    /// Return the token, or `AuthRequired` when logged out
    pub fn require_token(&self) -> Result<&str> {
        match self.token.as_deref() {
            Some(token) if !self.username.is_empty() => Ok(token),
            _ => Err(ShelfError::AuthRequired),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.require_token().is_ok()
    }

    /// Drop the token but keep the username
    pub fn logout(&mut self) {
        self.token = None;
    }
}

// ========== Repositories ==========

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub login: String,
}

/// Repository as consumed from the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub owner: Owner,
    pub updated_at: Option<DateTime<Utc>>,
    pub html_url: String,
    #[serde(default)]
    pub stargazers_count: u64,
    pub default_branch: Option<String>,
}

/// Request to create a repository for the authenticated user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRepository {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub private: bool,
    /// Create an initial commit so later file writes have a branch to land on
    pub auto_init: bool,
}

impl NewRepository {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            private: false,
            auto_init: true,
        }
    }
}

/// Result of writing a file into a repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileCommit {
    pub path: String,
    pub sha: String,
    pub html_url: Option<String>,
}

// ========== Releases ==========

/// Binary attached to a release
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: u64,
    pub name: String,
    pub browser_download_url: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub download_count: u64,
    pub content_type: Option<String>,
}

/// Tagged publication point in a repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    pub id: u64,
    pub tag_name: String,
    pub name: Option<String>,
    pub body: Option<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub assets: Vec<Asset>,
    /// RFC 6570 template, e.g. `.../assets{?name,label}`
    pub upload_url: String,
    pub html_url: String,
    pub published_at: Option<DateTime<Utc>>,
}

impl Release {
    pub fn find_asset(&self, name: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.name == name)
    }

    pub fn download_count(&self) -> u64 {
        self.assets.iter().map(|a| a.download_count).sum()
    }
}

/// Request to create a release
///
/// Always created published: a draft does not own its tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRelease {
    pub tag_name: String,
    pub name: String,
    pub body: String,
    pub prerelease: bool,
}

impl NewRelease {
    pub const DEFAULT_BODY: &'static str = "New build published with shelf";

    /// Release for `tag` named `Version <tag>`, with `notes` or the stock body
    pub fn for_tag(tag: impl Into<String>, notes: Option<String>) -> Self {
        let tag_name = tag.into();
        Self {
            name: format!("Version {}", tag_name),
            body: notes
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| Self::DEFAULT_BODY.to_string()),
            tag_name,
            prerelease: false,
        }
    }
}

/// Binary payload to attach to a release
#[derive(Debug, Clone, PartialEq)]
pub struct AssetUpload {
    pub file_name: String,
    pub content_type: String,
    pub label: Option<String>,
    pub data: Vec<u8>,
}

impl AssetUpload {
    pub fn new(file_name: impl Into<String>, data: Vec<u8>) -> Self {
        let file_name = file_name.into();
        Self {
            content_type: content_type_for(&file_name).to_string(),
            file_name,
            label: None,
            data,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// MIME type for a build or image file, by extension
pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("zip") => "application/zip",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Outcome of the asset step of a publish
///
/// A deferred asset is not an error: the release exists and the user can
/// attach the file by hand at `manual_url`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AssetOutcome {
    Attached(Asset),
    Deferred { reason: String, manual_url: String },
}

impl AssetOutcome {
    pub fn is_attached(&self) -> bool {
        matches!(self, AssetOutcome::Attached(_))
    }

    pub fn manual_url(&self) -> Option<&str> {
        match self {
            AssetOutcome::Deferred { manual_url, .. } => Some(manual_url),
            AssetOutcome::Attached(_) => None,
        }
    }
}

/// Everything a publish produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishReport {
    pub repository: String,
    pub release: Release,
    /// True when the tag already existed and its release was reused
    pub reused: bool,
    pub asset: AssetOutcome,
}

// ========== Catalog ==========

/// A repository together with its latest release, if any
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogEntry {
    pub repository: Repository,
    pub latest_release: Option<Release>,
}

impl CatalogEntry {
    /// Download link of the first asset of the latest release
    pub fn download_url(&self) -> Option<&str> {
        self.latest_release
            .as_ref()
            .and_then(|r| r.assets.first())
            .map(|a| a.browser_download_url.as_str())
    }

    pub fn latest_tag(&self) -> Option<&str> {
        self.latest_release.as_ref().map(|r| r.tag_name.as_str())
    }

    /// Raw URL of the committed cover image
    pub fn cover_url(&self) -> String {
        let branch = self
            .repository
            .default_branch
            .as_deref()
            .unwrap_or(DEFAULT_BRANCH);
        format!(
            "{}/raw/{}/{}",
            self.repository.html_url.trim_end_matches('/'),
            branch,
            COVER_PATH
        )
    }
}

/// One line of the statistics view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsRow {
    pub name: String,
    pub latest_tag: Option<String>,
    pub stars: u64,
    pub downloads: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(name: &str, branch: Option<&str>) -> Repository {
        Repository {
            id: 1,
            name: name.to_string(),
            full_name: format!("owner/{}", name),
            description: None,
            owner: Owner {
                login: "owner".to_string(),
            },
            updated_at: None,
            html_url: format!("https://github.com/owner/{}", name),
            stargazers_count: 0,
            default_branch: branch.map(String::from),
        }
    }

    #[test]
    fn test_credential_requires_username_for_token() {
        assert!(Credential::new("", Some("ghp_x".to_string())).is_err());
        assert!(Credential::new("alice", Some("ghp_x".to_string())).is_ok());
        assert!(Credential::new("", None).is_ok());
    }

    #[test]
    fn test_credential_blank_token_is_absent() {
        let cred = Credential::new("alice", Some("  ".to_string())).unwrap();
        assert_eq!(cred.token, None);
        assert!(matches!(
            cred.require_token(),
            Err(ShelfError::AuthRequired)
        ));
    }

    #[test]
    fn test_logout_keeps_username() {
        let mut cred = Credential::new("alice", Some("ghp_x".to_string())).unwrap();
        assert!(cred.is_authenticated());
        cred.logout();
        assert!(!cred.is_authenticated());
        assert_eq!(cred.username, "alice");
    }

    #[test]
    fn test_new_release_defaults() {
        let release = NewRelease::for_tag("v1.2.3", None);
        assert_eq!(release.name, "Version v1.2.3");
        assert_eq!(release.body, NewRelease::DEFAULT_BODY);
        assert!(!release.prerelease);

        let release = NewRelease::for_tag("v2.0.0", Some("Boss fight".to_string()));
        assert_eq!(release.body, "Boss fight");
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("game.zip"), "application/zip");
        assert_eq!(content_type_for("GAME.ZIP"), "application/zip");
        assert_eq!(content_type_for("cover.jpg"), "image/jpeg");
        assert_eq!(content_type_for("cover.png"), "image/png");
        assert_eq!(content_type_for("notes"), "application/octet-stream");
    }

    #[test]
    fn test_cover_url_uses_default_branch() {
        let entry = CatalogEntry {
            repository: repo("demo", Some("trunk")),
            latest_release: None,
        };
        assert_eq!(
            entry.cover_url(),
            "https://github.com/owner/demo/raw/trunk/cover.jpg"
        );

        let entry = CatalogEntry {
            repository: repo("demo", None),
            latest_release: None,
        };
        assert_eq!(
            entry.cover_url(),
            "https://github.com/owner/demo/raw/main/cover.jpg"
        );
        assert_eq!(entry.download_url(), None);
        assert_eq!(entry.latest_tag(), None);
    }

    #[test]
    fn test_asset_outcome_serializes_with_status_tag() {
        let outcome = AssetOutcome::Deferred {
            reason: "CORS".to_string(),
            manual_url: "https://github.com/o/r/releases/tag/v1".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "deferred");
        assert_eq!(json["manual_url"], "https://github.com/o/r/releases/tag/v1");
    }
}
