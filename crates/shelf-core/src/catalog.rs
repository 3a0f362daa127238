//! Repository catalog: every repository of a user with its latest release

use std::thread;

use crate::error::{Result, ShelfError};
use crate::models::{CatalogEntry, Release, Repository, StatsRow};
use crate::traits::ReleaseHost;

/// Upper bound on release lookups in flight at once
pub const MAX_CONCURRENT_LOOKUPS: usize = 16;

/// Fetch the catalog of `username`.
///
/// The repository listing must succeed; a rate limit there becomes
/// `ShelfError::RateLimited`. Release lookups run concurrently and a failed
/// lookup only leaves its own entry without a release.
pub fn fetch_catalog(host: &dyn ReleaseHost, username: &str) -> Result<Vec<CatalogEntry>> {
    let repos = host.list_user_repos(username).map_err(|e| {
        if e.is_rate_limited() {
            ShelfError::RateLimited
        } else {
            e
        }
    })?;

    log::debug!(
        "Listing {} repositories of {}, looking up latest releases",
        repos.len(),
        username
    );

    let mut releases: Vec<Option<Release>> = Vec::with_capacity(repos.len());
    for chunk in repos.chunks(MAX_CONCURRENT_LOOKUPS) {
        let found = thread::scope(|scope| {
            let handles: Vec<_> = chunk
                .iter()
                .map(|repo| (repo, scope.spawn(move || lookup_latest(host, repo))))
                .collect();

            handles
                .into_iter()
                .map(|(repo, handle)| match handle.join() {
                    Ok(found) => found,
                    Err(_) => {
                        log::warn!("Release lookup of {} panicked", repo.full_name);
                        None
                    }
                })
                .collect::<Vec<_>>()
        });
        releases.extend(found);
    }

    Ok(repos
        .into_iter()
        .zip(releases)
        .map(|(repository, latest_release)| CatalogEntry {
            repository,
            latest_release,
        })
        .collect())
}

fn lookup_latest(host: &dyn ReleaseHost, repo: &Repository) -> Option<Release> {
    match host.latest_release(&repo.owner.login, &repo.name) {
        Ok(release) => release,
        Err(e) => {
            log::warn!(
                "Could not fetch latest release of {}: {}",
                repo.full_name,
                e
            );
            None
        }
    }
}

/// Entries that have something to download
pub fn published(entries: &[CatalogEntry]) -> Vec<&CatalogEntry> {
    entries
        .iter()
        .filter(|e| e.latest_release.is_some())
        .collect()
}

/// Statistics rows, most downloaded first
pub fn stats(entries: &[CatalogEntry]) -> Vec<StatsRow> {
    let mut rows: Vec<StatsRow> = entries
        .iter()
        .map(|e| StatsRow {
            name: e.repository.name.clone(),
            latest_tag: e.latest_tag().map(String::from),
            stars: e.repository.stargazers_count,
            downloads: e
                .latest_release
                .as_ref()
                .map(Release::download_count)
                .unwrap_or(0),
        })
        .collect();

    rows.sort_by(|a, b| b.downloads.cmp(&a.downloads).then(a.name.cmp(&b.name)));
    rows
}
