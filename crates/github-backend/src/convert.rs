//! Model conversions between GitHub types and shelf-core types

use chrono::{DateTime, Utc};
use shelf_core::{Asset, FileCommit, NewRelease, NewRepository, Owner, Release, Repository};

use crate::models::*;

impl From<GitHubRepo> for Repository {
    fn from(r: GitHubRepo) -> Self {
        Self {
            id: r.id,
            name: r.name,
            full_name: r.full_name,
            description: r.description.filter(|d| !d.is_empty()),
            owner: Owner {
                login: r.owner.login,
            },
            updated_at: r.updated_at.as_deref().and_then(parse_github_datetime),
            html_url: r.html_url,
            stargazers_count: r.stargazers_count,
            default_branch: r.default_branch,
        }
    }
}

impl From<GitHubAsset> for Asset {
    fn from(a: GitHubAsset) -> Self {
        Self {
            id: a.id,
            name: a.name,
            browser_download_url: a.browser_download_url,
            size: a.size,
            download_count: a.download_count,
            content_type: a.content_type,
        }
    }
}

impl From<GitHubRelease> for Release {
    fn from(r: GitHubRelease) -> Self {
        Self {
            id: r.id,
            tag_name: r.tag_name,
            name: r.name,
            body: r.body,
            draft: r.draft,
            prerelease: r.prerelease,
            assets: r.assets.into_iter().map(Into::into).collect(),
            upload_url: r.upload_url,
            html_url: r.html_url,
            published_at: r.published_at.as_deref().and_then(parse_github_datetime),
        }
    }
}

impl From<GitHubContent> for FileCommit {
    fn from(c: GitHubContent) -> Self {
        Self {
            path: c.path,
            sha: c.sha,
            html_url: c.html_url,
        }
    }
}

pub fn create_release_from_core(release: &NewRelease) -> CreateGitHubRelease {
    CreateGitHubRelease {
        tag_name: release.tag_name.clone(),
        name: release.name.clone(),
        body: release.body.clone(),
        draft: false,
        prerelease: release.prerelease,
    }
}

pub fn create_repo_from_core(repo: &NewRepository) -> CreateGitHubRepo {
    CreateGitHubRepo {
        name: repo.name.clone(),
        description: repo.description.clone(),
        private: repo.private,
        auto_init: repo.auto_init,
    }
}

fn parse_github_datetime(dt: &str) -> Option<DateTime<Utc>> {
    chrono::DateTime::parse_from_rfc3339(dt)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}
