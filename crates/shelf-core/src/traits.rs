use crate::error::Result;
use crate::models::*;

/// Common trait for release hosting backends
///
/// Workflows in this crate only talk to a host through this trait. The
/// GitHub backend implements it over REST, the mock crate in memory.
pub trait ReleaseHost: Send + Sync {
    // ========== Repository Operations ==========

    /// List repositories owned by a user, most recently updated first
    fn list_user_repos(&self, username: &str) -> Result<Vec<Repository>>;

    /// Create a repository for the authenticated user
    fn create_repository(&self, repo: &NewRepository) -> Result<Repository>;

    // ========== Release Operations ==========

    /// Latest published release, or `None` when the repository has none
    fn latest_release(&self, owner: &str, repo: &str) -> Result<Option<Release>>;

    /// Create a release. Fails with `Conflict` when the tag already exists.
    fn create_release(&self, owner: &str, repo: &str, release: &NewRelease) -> Result<Release>;

    /// Fetch the release for a tag
    fn release_by_tag(&self, owner: &str, repo: &str, tag: &str) -> Result<Release>;

    /// Upload a binary to an expanded upload URL
    fn upload_asset(&self, upload_url: &str, asset: &AssetUpload) -> Result<Asset>;

    // ========== File Operations ==========

    /// Blob sha of the file at `path`, or `None` if there is no such file
    fn file_sha(&self, owner: &str, repo: &str, path: &str) -> Result<Option<String>>;

    /// Create or update a file. `sha` must be the current blob sha when the
    /// file already exists.
    fn put_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        content: &[u8],
        message: &str,
        sha: Option<&str>,
    ) -> Result<FileCommit>;
}
