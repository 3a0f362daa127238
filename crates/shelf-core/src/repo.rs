//! Repository creation and file commits

use serde::Serialize;

use crate::error::{Result, ShelfError};
use crate::models::{Credential, FileCommit, NewRepository, Repository, COVER_PATH};
use crate::traits::ReleaseHost;

/// Cover image to commit alongside a new repository
#[derive(Debug, Clone)]
pub struct CoverImage {
    pub data: Vec<u8>,
}

/// A freshly created repository and, if one was given, its cover commit
///
/// A failed cover commit does not undo the repository; it is reported in
/// `cover_error` and can be retried with `commit_file`.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedRepo {
    pub repository: Repository,
    pub cover: Option<FileCommit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_error: Option<String>,
}

/// Write `content` at `path`, updating the file if it already exists.
///
/// The current blob sha is always read first; the host rejects an update
/// that does not carry it.
pub fn commit_file(
    host: &dyn ReleaseHost,
    owner: &str,
    repo: &str,
    path: &str,
    content: &[u8],
    message: &str,
) -> Result<FileCommit> {
    let sha = host.file_sha(owner, repo, path)?;
    if let Some(sha) = &sha {
        log::debug!("{} exists in {}/{} at {}, updating", path, owner, repo, sha);
    }
    host.put_file(owner, repo, path, content, message, sha.as_deref())
}

/// Create a repository for the logged-in user, optionally with a cover.
///
/// Covers need a branch to land on, so `auto_init` must stay on when one
/// is given.
pub fn create_game_repo(
    host: &dyn ReleaseHost,
    credential: &Credential,
    new_repo: &NewRepository,
    cover: Option<CoverImage>,
) -> Result<CreatedRepo> {
    credential.require_token()?;

    if new_repo.name.trim().is_empty() {
        return Err(ShelfError::InvalidInput(
            "repository name must not be empty".to_string(),
        ));
    }
    if cover.is_some() && !new_repo.auto_init {
        return Err(ShelfError::InvalidInput(
            "a cover image needs an initialized repository".to_string(),
        ));
    }

    let repository = host.create_repository(new_repo)?;
    log::info!("Created repository {}", repository.full_name);

    let mut created = CreatedRepo {
        repository,
        cover: None,
        cover_error: None,
    };

    if let Some(image) = cover {
        match commit_file(
            host,
            &created.repository.owner.login,
            &created.repository.name,
            COVER_PATH,
            &image.data,
            "Add cover image",
        ) {
            Ok(commit) => created.cover = Some(commit),
            Err(e) => {
                log::warn!(
                    "Cover commit to {} failed: {}",
                    created.repository.full_name,
                    e
                );
                created.cover_error = Some(e.to_string());
            }
        }
    }

    Ok(created)
}
