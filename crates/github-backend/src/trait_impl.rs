//! Implementation of the shelf-core `ReleaseHost` trait for GitHubClient

use shelf_core::{
    Asset, AssetUpload, FileCommit, NewRelease, NewRepository, Release, ReleaseHost, Repository,
    Result, ShelfError,
};

use crate::client::GitHubClient;
use crate::convert::{create_release_from_core, create_repo_from_core};

/// Map a 404 to `None`, everything else to a shelf error
fn optional<T>(result: crate::error::Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.status() == Some(404) => Ok(None),
        Err(e) => Err(ShelfError::from(e)),
    }
}

impl ReleaseHost for GitHubClient {
    fn list_user_repos(&self, username: &str) -> Result<Vec<Repository>> {
        self.list_user_repos(username)
            .map(|repos| repos.into_iter().map(Into::into).collect())
            .map_err(ShelfError::from)
    }

    fn create_repository(&self, repo: &NewRepository) -> Result<Repository> {
        self.create_repo(&create_repo_from_core(repo))
            .map(Into::into)
            .map_err(ShelfError::from)
    }

    fn latest_release(&self, owner: &str, repo: &str) -> Result<Option<Release>> {
        optional(self.get_latest_release(owner, repo)).map(|r| r.map(Into::into))
    }

    fn create_release(&self, owner: &str, repo: &str, release: &NewRelease) -> Result<Release> {
        self.create_release(owner, repo, &create_release_from_core(release))
            .map(Into::into)
            .map_err(ShelfError::from)
    }

    fn release_by_tag(&self, owner: &str, repo: &str, tag: &str) -> Result<Release> {
        self.get_release_by_tag(owner, repo, tag)
            .map(Into::into)
            .map_err(|e| match e.status() {
                Some(404) => ShelfError::NotFound(format!("release {} in {}/{}", tag, owner, repo)),
                _ => e.into(),
            })
    }

    fn upload_asset(&self, upload_url: &str, asset: &AssetUpload) -> Result<Asset> {
        self.upload_release_asset(upload_url, &asset.content_type, &asset.data)
            .map(Into::into)
            .map_err(ShelfError::from)
    }

    fn file_sha(&self, owner: &str, repo: &str, path: &str) -> Result<Option<String>> {
        optional(self.get_content(owner, repo, path)).map(|c| c.map(|c| c.sha))
    }

    fn put_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        content: &[u8],
        message: &str,
        sha: Option<&str>,
    ) -> Result<FileCommit> {
        self.put_content(owner, repo, path, content, message, sha)
            .map(Into::into)
            .map_err(ShelfError::from)
    }
}
