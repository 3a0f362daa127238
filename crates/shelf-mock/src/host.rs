//! Mock host implementing the ReleaseHost trait

use chrono::{DateTime, TimeZone, Utc};
use shelf_core::{
    Asset, AssetUpload, FileCommit, NewRelease, NewRepository, Owner, Release, ReleaseHost,
    Repository, Result, ShelfError,
};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, MutexGuard, PoisonError};

const WEB_BASE: &str = "https://github.com";
const UPLOAD_BASE: &str = "https://uploads.github.com";

/// An injected failure
#[derive(Debug, Clone)]
pub enum Failure {
    /// Non-success HTTP status with a message
    Status(u16, String),
    /// Quota exhausted
    RateLimited,
    /// Request never got a response (network, cross-origin rejection)
    Transport(String),
}

impl Failure {
    fn to_error(&self) -> ShelfError {
        match self {
            Failure::Status(status, message) => ShelfError::from_status(*status, message.clone()),
            Failure::RateLimited => ShelfError::RateLimited,
            Failure::Transport(message) => ShelfError::Http(message.clone()),
        }
    }
}

/// A recorded host call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListRepos(String),
    CreateRepository(String),
    LatestRelease(String),
    CreateRelease { repo: String, tag: String },
    ReleaseByTag { repo: String, tag: String },
    UploadAsset { release_id: u64, name: String },
    FileSha { repo: String, path: String },
    PutFile { repo: String, path: String, sha: Option<String> },
}

#[derive(Debug)]
struct StoredFile {
    sha: String,
    content: Vec<u8>,
}

#[derive(Debug)]
struct StoredRepo {
    repo: Repository,
    releases: Vec<Release>,
    files: HashMap<String, StoredFile>,
}

#[derive(Debug, Default)]
struct State {
    repos: Vec<StoredRepo>,
    next_id: u64,
    clock: i64,
    calls: Vec<Call>,
    listing_failure: Option<Failure>,
    lookup_failures: HashMap<String, Failure>,
    upload_failure: Option<Failure>,
    write_failure: Option<Failure>,
}

impl State {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn tick(&mut self) -> DateTime<Utc> {
        self.clock += 60;
        Utc.timestamp_opt(1_700_000_000 + self.clock, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }

    fn repo_mut(&mut self, owner: &str, name: &str) -> Result<&mut StoredRepo> {
        self.repos
            .iter_mut()
            .find(|r| r.repo.owner.login == owner && r.repo.name == name)
            .ok_or_else(|| ShelfError::NotFound(format!("repository {}/{}", owner, name)))
    }

    fn repo(&self, owner: &str, name: &str) -> Result<&StoredRepo> {
        self.repos
            .iter()
            .find(|r| r.repo.owner.login == owner && r.repo.name == name)
            .ok_or_else(|| ShelfError::NotFound(format!("repository {}/{}", owner, name)))
    }
}

/// In-memory stand-in for GitHub
pub struct MemoryHost {
    /// Login of the authenticated user; new repositories belong to it
    owner: String,
    state: Mutex<State>,
}

impl MemoryHost {
    pub fn new(owner: &str) -> Self {
        Self {
            owner: owner.to_string(),
            state: Mutex::new(State::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ========== Seeding ==========

    /// Add a repository owned by the authenticated user
    pub fn add_repo(&self, name: &str) -> Repository {
        let owner = self.owner.clone();
        self.add_repo_for(&owner, name)
    }

    /// Add a repository owned by `owner`
    pub fn add_repo_for(&self, owner: &str, name: &str) -> Repository {
        let mut state = self.state();
        let id = state.next_id();
        let updated_at = state.tick();
        let repo = Repository {
            id,
            name: name.to_string(),
            full_name: format!("{}/{}", owner, name),
            description: None,
            owner: Owner {
                login: owner.to_string(),
            },
            updated_at: Some(updated_at),
            html_url: format!("{}/{}/{}", WEB_BASE, owner, name),
            stargazers_count: 0,
            default_branch: Some("main".to_string()),
        };
        state.repos.push(StoredRepo {
            repo: repo.clone(),
            releases: Vec::new(),
            files: HashMap::new(),
        });
        repo
    }

    /// Add a draft release for `tag`, as left behind by the web editor
    pub fn add_draft_release(&self, repo: &str, tag: &str) -> Option<Release> {
        let owner = self.owner.clone();
        let mut state = self.state();
        let id = state.next_id();
        let now = state.tick();
        let stored = state.repo_mut(&owner, repo).ok()?;

        let mut draft = release_record(&owner, repo, id, tag, now);
        draft.draft = true;
        draft.published_at = None;
        draft.html_url = format!(
            "{}/{}/{}/releases/tag/untagged-{:x}",
            WEB_BASE, owner, repo, id
        );
        stored.releases.push(draft.clone());
        Some(draft)
    }

    /// Set the star count of a repository of the authenticated user
    pub fn set_stars(&self, repo: &str, stars: u64) {
        let owner = self.owner.clone();
        if let Ok(stored) = self.state().repo_mut(&owner, repo) {
            stored.repo.stargazers_count = stars;
        }
    }

    /// Set the download count of an asset
    pub fn set_download_count(&self, repo: &str, tag: &str, asset: &str, count: u64) {
        let owner = self.owner.clone();
        let mut state = self.state();
        if let Ok(stored) = state.repo_mut(&owner, repo) {
            if let Some(release) = stored.releases.iter_mut().find(|r| r.tag_name == tag) {
                if let Some(a) = release.assets.iter_mut().find(|a| a.name == asset) {
                    a.download_count = count;
                }
            }
        }
    }

    // ========== Failure injection ==========

    /// Make the repository listing fail
    pub fn fail_listing(&self, failure: Failure) {
        self.state().listing_failure = Some(failure);
    }

    /// Make the latest-release lookup of one repository fail
    pub fn fail_release_lookup(&self, repo: &str, failure: Failure) {
        self.state()
            .lookup_failures
            .insert(repo.to_string(), failure);
    }

    /// Make every asset upload fail
    pub fn fail_uploads(&self, failure: Failure) {
        self.state().upload_failure = Some(failure);
    }

    /// Let asset uploads through again
    pub fn allow_uploads(&self) {
        self.state().upload_failure = None;
    }

    /// Make every file write fail
    pub fn fail_file_writes(&self, failure: Failure) {
        self.state().write_failure = Some(failure);
    }

    /// Let file writes through again
    pub fn allow_file_writes(&self) {
        self.state().write_failure = None;
    }

    // ========== Inspection ==========

    /// All releases of a repository of the authenticated user, oldest first
    pub fn releases(&self, repo: &str) -> Vec<Release> {
        let owner = self.owner.clone();
        self.state()
            .repo(&owner, repo)
            .map(|r| r.releases.clone())
            .unwrap_or_default()
    }

    /// Content of a file in a repository of the authenticated user
    pub fn file(&self, repo: &str, path: &str) -> Option<Vec<u8>> {
        let owner = self.owner.clone();
        self.state()
            .repo(&owner, repo)
            .ok()
            .and_then(|r| r.files.get(path).map(|f| f.content.clone()))
    }

    /// Calls received so far, in order
    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    /// Number of calls matching a predicate
    pub fn count_calls(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.state().calls.iter().filter(|c| pred(c)).count()
    }
}

/// Split `.../releases/{id}/assets?name=...` into release id and asset name
fn parse_upload_url(url: &str) -> Option<(u64, String)> {
    let (path, query) = url.split_once('?')?;
    let mut segments = path.rsplit('/');
    if segments.next()? != "assets" {
        return None;
    }
    let release_id = segments.next()?.parse().ok()?;

    let name = query
        .split('&')
        .find_map(|pair| pair.strip_prefix("name="))?;
    let name = urlencoding::decode(name).ok()?.into_owned();
    Some((release_id, name))
}

fn release_record(owner: &str, repo: &str, id: u64, tag: &str, now: DateTime<Utc>) -> Release {
    Release {
        id,
        tag_name: tag.to_string(),
        name: None,
        body: None,
        draft: false,
        prerelease: false,
        assets: Vec::new(),
        upload_url: format!(
            "{}/repos/{}/{}/releases/{}/assets{{?name,label}}",
            UPLOAD_BASE, owner, repo, id
        ),
        html_url: format!("{}/{}/{}/releases/tag/{}", WEB_BASE, owner, repo, tag),
        published_at: Some(now),
    }
}

fn blob_sha(path: &str, content: &[u8], salt: u64) -> String {
    let mut hasher = DefaultHasher::new();
    path.hash(&mut hasher);
    content.hash(&mut hasher);
    salt.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

impl ReleaseHost for MemoryHost {
    fn list_user_repos(&self, username: &str) -> Result<Vec<Repository>> {
        let mut state = self.state();
        state.calls.push(Call::ListRepos(username.to_string()));

        if let Some(failure) = &state.listing_failure {
            return Err(failure.to_error());
        }

        let mut repos: Vec<Repository> = state
            .repos
            .iter()
            .filter(|r| r.repo.owner.login == username)
            .map(|r| r.repo.clone())
            .collect();
        repos.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(repos)
    }

    fn create_repository(&self, new_repo: &NewRepository) -> Result<Repository> {
        {
            let mut state = self.state();
            state
                .calls
                .push(Call::CreateRepository(new_repo.name.clone()));
            if state.repo(&self.owner, &new_repo.name).is_ok() {
                return Err(ShelfError::Conflict(
                    "name already exists on this account".to_string(),
                ));
            }
        }

        let mut repo = self.add_repo(&new_repo.name);
        let mut state = self.state();
        let stored = state.repo_mut(&self.owner, &new_repo.name)?;
        stored.repo.description = new_repo.description.clone();
        if new_repo.auto_init {
            let sha = blob_sha("README.md", new_repo.name.as_bytes(), repo.id);
            stored.files.insert(
                "README.md".to_string(),
                StoredFile {
                    sha,
                    content: format!("# {}\n", new_repo.name).into_bytes(),
                },
            );
        } else {
            stored.repo.default_branch = None;
        }
        repo = stored.repo.clone();
        log::debug!("mock: created repository {}", repo.full_name);
        Ok(repo)
    }

    fn latest_release(&self, owner: &str, repo: &str) -> Result<Option<Release>> {
        let mut state = self.state();
        state.calls.push(Call::LatestRelease(repo.to_string()));

        if let Some(failure) = state.lookup_failures.get(repo) {
            return Err(failure.to_error());
        }

        let stored = state.repo(owner, repo)?;
        Ok(stored
            .releases
            .iter()
            .rev()
            .find(|r| !r.draft && !r.prerelease)
            .cloned())
    }

    fn create_release(&self, owner: &str, repo: &str, release: &NewRelease) -> Result<Release> {
        let mut state = self.state();
        state.calls.push(Call::CreateRelease {
            repo: repo.to_string(),
            tag: release.tag_name.clone(),
        });

        let id = state.next_id();
        let now = state.tick();
        let stored = state.repo_mut(owner, repo)?;

        // No commit to tag yet
        if stored.repo.default_branch.is_none() {
            return Err(ShelfError::from_status(422, "Repository is empty."));
        }
        // Drafts do not own their tag
        if stored
            .releases
            .iter()
            .any(|r| !r.draft && r.tag_name == release.tag_name)
        {
            return Err(ShelfError::from_status(422, "Validation Failed"));
        }

        let mut created = release_record(owner, repo, id, &release.tag_name, now);
        created.name = Some(release.name.clone());
        created.body = Some(release.body.clone());
        created.prerelease = release.prerelease;
        stored.releases.push(created.clone());
        stored.repo.updated_at = Some(now);
        Ok(created)
    }

    fn release_by_tag(&self, owner: &str, repo: &str, tag: &str) -> Result<Release> {
        let mut state = self.state();
        state.calls.push(Call::ReleaseByTag {
            repo: repo.to_string(),
            tag: tag.to_string(),
        });

        state
            .repo(owner, repo)?
            .releases
            .iter()
            .find(|r| !r.draft && r.tag_name == tag)
            .cloned()
            .ok_or_else(|| ShelfError::NotFound(format!("release {} in {}/{}", tag, owner, repo)))
    }

    fn upload_asset(&self, upload_url: &str, asset: &AssetUpload) -> Result<Asset> {
        let (release_id, name) = parse_upload_url(upload_url)
            .ok_or_else(|| ShelfError::InvalidInput(format!("bad upload url: {}", upload_url)))?;

        let mut state = self.state();
        state.calls.push(Call::UploadAsset {
            release_id,
            name: name.clone(),
        });

        if let Some(failure) = &state.upload_failure {
            return Err(failure.to_error());
        }

        let id = state.next_id();
        let release = state
            .repos
            .iter_mut()
            .flat_map(|r| r.releases.iter_mut())
            .find(|r| r.id == release_id)
            .ok_or_else(|| ShelfError::NotFound(format!("release {}", release_id)))?;

        if release.find_asset(&name).is_some() {
            return Err(ShelfError::from_status(422, "already_exists"));
        }

        let uploaded = Asset {
            id,
            browser_download_url: format!(
                "{}/{}",
                release
                    .html_url
                    .replacen("/releases/tag/", "/releases/download/", 1),
                name
            ),
            name,
            size: asset.data.len() as u64,
            download_count: 0,
            content_type: Some(asset.content_type.clone()),
        };
        release.assets.push(uploaded.clone());
        Ok(uploaded)
    }

    fn file_sha(&self, owner: &str, repo: &str, path: &str) -> Result<Option<String>> {
        let mut state = self.state();
        state.calls.push(Call::FileSha {
            repo: repo.to_string(),
            path: path.to_string(),
        });

        Ok(state
            .repo(owner, repo)?
            .files
            .get(path)
            .map(|f| f.sha.clone()))
    }

    fn put_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        content: &[u8],
        _message: &str,
        sha: Option<&str>,
    ) -> Result<FileCommit> {
        let mut state = self.state();
        state.calls.push(Call::PutFile {
            repo: repo.to_string(),
            path: path.to_string(),
            sha: sha.map(String::from),
        });

        if let Some(failure) = &state.write_failure {
            return Err(failure.to_error());
        }

        let salt = state.next_id();
        let now = state.tick();
        let stored = state.repo_mut(owner, repo)?;

        if stored.repo.default_branch.is_none() {
            return Err(ShelfError::from_status(409, "Git Repository is empty."));
        }

        match (stored.files.get(path), sha) {
            (Some(_), None) => {
                return Err(ShelfError::from_status(
                    422,
                    "Invalid request. \"sha\" wasn't supplied.",
                ));
            }
            (Some(existing), Some(given)) if existing.sha != given => {
                return Err(ShelfError::from_status(
                    409,
                    format!("{} does not match {}", path, given),
                ));
            }
            (None, Some(_)) => {
                return Err(ShelfError::from_status(
                    422,
                    format!("{} does not exist, sha must be omitted", path),
                ));
            }
            _ => {}
        }

        let new_sha = blob_sha(path, content, salt);
        stored.files.insert(
            path.to_string(),
            StoredFile {
                sha: new_sha.clone(),
                content: content.to_vec(),
            },
        );
        stored.repo.updated_at = Some(now);

        let branch = stored.repo.default_branch.clone().unwrap_or_default();
        Ok(FileCommit {
            path: path.to_string(),
            sha: new_sha,
            html_url: Some(format!(
                "{}/blob/{}/{}",
                stored.repo.html_url, branch, path
            )),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_upload_url() {
        assert_eq!(
            parse_upload_url(
                "https://uploads.github.com/repos/a/demo/releases/12/assets?name=my%20game.zip&label=x"
            ),
            Some((12, "my game.zip".to_string()))
        );
        assert_eq!(parse_upload_url("https://uploads.github.com/nope"), None);
    }

    #[test]
    fn test_download_url_shape() {
        let host = MemoryHost::new("alice");
        host.add_repo("demo");
        let release = host
            .create_release("alice", "demo", &NewRelease::for_tag("v1.0.0", None))
            .unwrap();
        let url = format!(
            "{}/repos/alice/demo/releases/{}/assets?name=demo.zip",
            UPLOAD_BASE, release.id
        );
        let asset = host
            .upload_asset(&url, &AssetUpload::new("demo.zip", vec![1, 2, 3]))
            .unwrap();
        assert_eq!(
            asset.browser_download_url,
            "https://github.com/alice/demo/releases/download/v1.0.0/demo.zip"
        );
        assert_eq!(asset.size, 3);
    }

    #[test]
    fn test_put_without_sha_on_existing_file_is_rejected() {
        let host = MemoryHost::new("alice");
        host.create_repository(&NewRepository::new("demo")).unwrap();

        let err = host
            .put_file("alice", "demo", "README.md", b"new", "update", None)
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn test_put_into_uninitialized_repo_fails() {
        let host = MemoryHost::new("alice");
        let mut new_repo = NewRepository::new("bare");
        new_repo.auto_init = false;
        host.create_repository(&new_repo).unwrap();

        let err = host
            .put_file("alice", "bare", "cover.jpg", b"img", "cover", None)
            .unwrap_err();
        assert!(matches!(err, ShelfError::Api { status: 409, .. }));
    }

    #[test]
    fn test_drafts_do_not_own_their_tag() {
        let host = MemoryHost::new("alice");
        host.add_repo("demo");
        host.add_draft_release("demo", "v1.0.0").unwrap();

        assert!(host
            .release_by_tag("alice", "demo", "v1.0.0")
            .unwrap_err()
            .is_not_found());
        assert_eq!(host.latest_release("alice", "demo").unwrap(), None);

        let published = host
            .create_release("alice", "demo", &NewRelease::for_tag("v1.0.0", None))
            .unwrap();
        assert!(!published.draft);
        assert_eq!(
            host.release_by_tag("alice", "demo", "v1.0.0").unwrap().id,
            published.id
        );
    }
}
