//! Publishing and catalog workflows against the in-memory host

use shelf_core::{
    attach_asset, commit_file, create_game_repo, ensure_release, fetch_catalog, publish_build,
    published, stats, Asset, AssetOutcome, AssetUpload, CoverImage, Credential, FileCommit,
    NewRelease, NewRepository, Release, ReleaseHost, Repository, Result, ShelfError,
    COVER_PATH,
};
use shelf_mock::{Call, Failure, MemoryHost};

/// Host whose latest-release lookup panics for one repository
struct PanickingLookup {
    inner: MemoryHost,
    repo: &'static str,
}

impl ReleaseHost for PanickingLookup {
    fn list_user_repos(&self, username: &str) -> Result<Vec<Repository>> {
        self.inner.list_user_repos(username)
    }

    fn create_repository(&self, repo: &NewRepository) -> Result<Repository> {
        self.inner.create_repository(repo)
    }

    fn latest_release(&self, owner: &str, repo: &str) -> Result<Option<Release>> {
        if repo == self.repo {
            panic!("lookup of {} blew up", repo);
        }
        self.inner.latest_release(owner, repo)
    }

    fn create_release(&self, owner: &str, repo: &str, release: &NewRelease) -> Result<Release> {
        self.inner.create_release(owner, repo, release)
    }

    fn release_by_tag(&self, owner: &str, repo: &str, tag: &str) -> Result<Release> {
        self.inner.release_by_tag(owner, repo, tag)
    }

    fn upload_asset(&self, upload_url: &str, asset: &AssetUpload) -> Result<Asset> {
        self.inner.upload_asset(upload_url, asset)
    }

    fn file_sha(&self, owner: &str, repo: &str, path: &str) -> Result<Option<String>> {
        self.inner.file_sha(owner, repo, path)
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
        self.inner.put_file(owner, repo, path, content, message, sha)
    }
}

fn admin() -> Credential {
    Credential::new("alice", Some("ghp_test".to_string())).unwrap()
}

fn build(name: &str) -> AssetUpload {
    AssetUpload::new(name, b"PK\x03\x04build".to_vec()).with_label("Game Build")
}

// ==================== Release Publisher ====================

#[test]
fn test_publish_same_tag_twice_reuses_release() {
    let host = MemoryHost::new("alice");
    host.add_repo("demo");
    let release = NewRelease::for_tag("v1.0.0", None);

    let first = publish_build(&host, &admin(), "demo", &release, build("demo.zip")).unwrap();
    let second = publish_build(&host, &admin(), "demo", &release, build("demo.zip")).unwrap();

    assert!(!first.reused);
    assert!(second.reused);
    assert_eq!(first.release.id, second.release.id);
    assert_eq!(host.releases("demo").len(), 1);
}

#[test]
fn test_republish_skips_upload_of_attached_asset() {
    let host = MemoryHost::new("alice");
    host.add_repo("demo");
    let release = NewRelease::for_tag("v1.0.0", None);

    publish_build(&host, &admin(), "demo", &release, build("demo.zip")).unwrap();
    let again = publish_build(&host, &admin(), "demo", &release, build("demo.zip")).unwrap();

    assert!(again.asset.is_attached());
    let uploads = host.count_calls(|c| matches!(c, Call::UploadAsset { .. }));
    assert_eq!(uploads, 1);
    assert_eq!(host.releases("demo")[0].assets.len(), 1);
}

#[test]
fn test_resume_after_failed_upload() {
    let host = MemoryHost::new("alice");
    host.add_repo("demo");
    let release = NewRelease::for_tag("v1.0.0", None);

    host.fail_uploads(Failure::Transport("connection reset".to_string()));
    let first = publish_build(&host, &admin(), "demo", &release, build("demo.zip")).unwrap();
    assert!(!first.asset.is_attached());

    host.allow_uploads();
    let second = publish_build(&host, &admin(), "demo", &release, build("demo.zip")).unwrap();
    assert!(second.reused);
    assert!(second.asset.is_attached());
    assert_eq!(first.release.id, second.release.id);
}

#[test]
fn test_ensure_release_conflict_fetches_existing() {
    let host = MemoryHost::new("alice");
    host.add_repo("demo");
    let release = NewRelease::for_tag("v2.0.0", Some("Notes".to_string()));

    let (created, reused) = ensure_release(&host, "alice", "demo", &release).unwrap();
    assert!(!reused);

    let (existing, reused) = ensure_release(&host, "alice", "demo", &release).unwrap();
    assert!(reused);
    assert_eq!(existing, created);
    assert!(host.calls().contains(&Call::ReleaseByTag {
        repo: "demo".to_string(),
        tag: "v2.0.0".to_string()
    }));
}

#[test]
fn test_ensure_release_other_errors_propagate() {
    let host = MemoryHost::new("alice");
    let err = ensure_release(&host, "alice", "missing", &NewRelease::for_tag("v1.0.0", None))
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_publish_ignores_draft_with_same_tag() {
    let host = MemoryHost::new("alice");
    host.add_repo("demo");
    let draft = host.add_draft_release("demo", "v1.0.0").unwrap();
    let release = NewRelease::for_tag("v1.0.0", None);

    let first = publish_build(&host, &admin(), "demo", &release, build("demo.zip")).unwrap();
    let second = publish_build(&host, &admin(), "demo", &release, build("demo.zip")).unwrap();

    assert!(!first.release.draft);
    assert_ne!(first.release.id, draft.id);
    assert!(second.reused);
    assert_eq!(first.release.id, second.release.id);

    let published: Vec<_> = host
        .releases("demo")
        .into_iter()
        .filter(|r| !r.draft && r.tag_name == "v1.0.0")
        .collect();
    assert_eq!(published.len(), 1);
}

#[test]
fn test_validation_failure_is_not_masked_by_lookup() {
    let host = MemoryHost::new("alice");
    let mut bare = NewRepository::new("bare");
    bare.auto_init = false;
    host.create_repository(&bare).unwrap();

    let err = publish_build(
        &host,
        &admin(),
        "bare",
        &NewRelease::for_tag("v1.0.0", None),
        build("bare.zip"),
    )
    .unwrap_err();

    assert!(err.is_conflict());
    assert!(err.to_string().contains("Repository is empty"));
}

#[test]
fn test_publish_requires_token() {
    let host = MemoryHost::new("alice");
    host.add_repo("demo");

    let err = publish_build(
        &host,
        &Credential::anonymous("alice"),
        "demo",
        &NewRelease::for_tag("v1.0.0", None),
        build("demo.zip"),
    )
    .unwrap_err();

    assert!(matches!(err, ShelfError::AuthRequired));
    assert!(host.calls().is_empty());
}

// ==================== Asset Uploader ====================

#[test]
fn test_transport_failure_is_soft() {
    let host = MemoryHost::new("alice");
    host.add_repo("demo");
    host.fail_uploads(Failure::Transport("CORS request rejected".to_string()));

    let report = publish_build(
        &host,
        &admin(),
        "demo",
        &NewRelease::for_tag("v1.0.0", None),
        build("demo.zip"),
    )
    .unwrap();

    assert_eq!(report.release.tag_name, "v1.0.0");
    match &report.asset {
        AssetOutcome::Deferred { reason, manual_url } => {
            assert!(reason.contains("CORS"));
            assert_eq!(manual_url, &report.release.html_url);
        }
        other => panic!("expected a deferred upload, got {:?}", other),
    }
    assert_eq!(host.releases("demo").len(), 1);
}

#[test]
fn test_status_failure_is_soft() {
    let host = MemoryHost::new("alice");
    host.add_repo("demo");
    let (release, _) =
        ensure_release(&host, "alice", "demo", &NewRelease::for_tag("v1.0.0", None)).unwrap();

    host.fail_uploads(Failure::Status(502, "Bad Gateway".to_string()));
    let outcome = attach_asset(&host, &release, &build("demo.zip"));

    assert_eq!(
        outcome.manual_url(),
        Some("https://github.com/alice/demo/releases/tag/v1.0.0")
    );
}

#[test]
fn test_upload_uses_expanded_url() {
    let host = MemoryHost::new("alice");
    host.add_repo("demo");
    let (release, _) =
        ensure_release(&host, "alice", "demo", &NewRelease::for_tag("v1.0.0", None)).unwrap();

    let outcome = attach_asset(&host, &release, &build("my game.zip"));
    match outcome {
        AssetOutcome::Attached(asset) => assert_eq!(asset.name, "my game.zip"),
        other => panic!("expected attached asset, got {:?}", other),
    }
    assert!(host.calls().contains(&Call::UploadAsset {
        release_id: release.id,
        name: "my game.zip".to_string()
    }));
}

// ==================== Catalog ====================

#[test]
fn test_catalog_without_releases() {
    let host = MemoryHost::new("alice");
    host.add_repo("prototype");
    host.add_repo("jam-entry");

    let entries = fetch_catalog(&host, "alice").unwrap();

    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.latest_release.is_none()));
    assert!(published(&entries).is_empty());
}

#[test]
fn test_catalog_listing_rate_limit_is_distinguished() {
    let host = MemoryHost::new("alice");
    host.add_repo("demo");
    host.fail_listing(Failure::Status(403, "API rate limit exceeded".to_string()));

    let err = fetch_catalog(&host, "alice").unwrap_err();

    assert!(matches!(err, ShelfError::RateLimited));
    assert!(err.to_string().contains("shelf login"));
}

#[test]
fn test_catalog_listing_other_errors_propagate() {
    let host = MemoryHost::new("alice");
    host.fail_listing(Failure::Status(500, "Server Error".to_string()));

    let err = fetch_catalog(&host, "alice").unwrap_err();
    assert!(matches!(err, ShelfError::Api { status: 500, .. }));
}

#[test]
fn test_catalog_lookup_rate_limit_degrades_one_entry() {
    let host = MemoryHost::new("alice");
    host.add_repo("demo");
    host.add_repo("racer");
    for repo in ["demo", "racer"] {
        publish_build(
            &host,
            &admin(),
            repo,
            &NewRelease::for_tag("v1.0.0", None),
            build(&format!("{}.zip", repo)),
        )
        .unwrap();
    }
    host.fail_release_lookup("racer", Failure::RateLimited);

    let entries = fetch_catalog(&host, "alice").unwrap();

    let demo = entries.iter().find(|e| e.repository.name == "demo").unwrap();
    let racer = entries.iter().find(|e| e.repository.name == "racer").unwrap();
    assert_eq!(demo.latest_tag(), Some("v1.0.0"));
    assert!(racer.latest_release.is_none());
}

#[test]
fn test_catalog_many_repos_keeps_listing_order() {
    let host = MemoryHost::new("alice");
    for i in 0..40 {
        host.add_repo(&format!("game-{:02}", i));
    }
    publish_build(
        &host,
        &admin(),
        "game-07",
        &NewRelease::for_tag("v0.1.0", None),
        build("game-07.zip"),
    )
    .unwrap();

    let listed = host.list_user_repos("alice").unwrap();
    let entries = fetch_catalog(&host, "alice").unwrap();

    let names: Vec<_> = entries.iter().map(|e| e.repository.name.clone()).collect();
    let expected: Vec<_> = listed.iter().map(|r| r.name.clone()).collect();
    assert_eq!(names, expected);
    assert_eq!(published(&entries).len(), 1);
    assert_eq!(
        published(&entries)[0].repository.name,
        "game-07".to_string()
    );
}

#[test]
fn test_catalog_survives_panicking_lookup() {
    let inner = MemoryHost::new("alice");
    inner.add_repo("demo");
    inner.add_repo("cursed");
    publish_build(
        &inner,
        &admin(),
        "demo",
        &NewRelease::for_tag("v1.0.0", None),
        build("demo.zip"),
    )
    .unwrap();
    let host = PanickingLookup {
        inner,
        repo: "cursed",
    };

    let entries = fetch_catalog(&host, "alice").unwrap();

    assert_eq!(entries.len(), 2);
    let demo = entries.iter().find(|e| e.repository.name == "demo").unwrap();
    let cursed = entries.iter().find(|e| e.repository.name == "cursed").unwrap();
    assert_eq!(demo.latest_tag(), Some("v1.0.0"));
    assert!(cursed.latest_release.is_none());
}

#[test]
fn test_stats_sorted_by_downloads() {
    let host = MemoryHost::new("alice");
    host.add_repo("demo");
    host.add_repo("racer");
    host.add_repo("sketch");
    host.set_stars("racer", 5);
    for repo in ["demo", "racer"] {
        publish_build(
            &host,
            &admin(),
            repo,
            &NewRelease::for_tag("v1.0.0", None),
            build(&format!("{}.zip", repo)),
        )
        .unwrap();
    }
    host.set_download_count("demo", "v1.0.0", "demo.zip", 3);
    host.set_download_count("racer", "v1.0.0", "racer.zip", 40);

    let rows = stats(&fetch_catalog(&host, "alice").unwrap());

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].name, "racer");
    assert_eq!(rows[0].downloads, 40);
    assert_eq!(rows[0].stars, 5);
    assert_eq!(rows[1].name, "demo");
    assert_eq!(rows[2].name, "sketch");
    assert_eq!(rows[2].latest_tag, None);
}

// ==================== Repository & File Creation ====================

#[test]
fn test_create_repo_with_cover() {
    let host = MemoryHost::new("alice");
    let mut new_repo = NewRepository::new("demo");
    new_repo.description = Some("A tiny platformer".to_string());

    let created = create_game_repo(
        &host,
        &admin(),
        &new_repo,
        Some(CoverImage {
            data: b"jpeg bytes".to_vec(),
        }),
    )
    .unwrap();

    assert_eq!(created.repository.full_name, "alice/demo");
    assert_eq!(created.cover.as_ref().unwrap().path, COVER_PATH);
    assert_eq!(host.file("demo", COVER_PATH), Some(b"jpeg bytes".to_vec()));
}

#[test]
fn test_failed_cover_keeps_created_repo() {
    let host = MemoryHost::new("alice");
    host.fail_file_writes(Failure::Status(409, "Git Repository is empty.".to_string()));

    let created = create_game_repo(
        &host,
        &admin(),
        &NewRepository::new("demo"),
        Some(CoverImage {
            data: b"jpeg bytes".to_vec(),
        }),
    )
    .unwrap();

    assert_eq!(created.repository.full_name, "alice/demo");
    assert!(created.cover.is_none());
    assert!(created
        .cover_error
        .as_deref()
        .unwrap()
        .contains("Git Repository is empty"));
    assert_eq!(host.file("demo", COVER_PATH), None);

    // The cover can be committed later without recreating the repository
    host.allow_file_writes();
    commit_file(&host, "alice", "demo", COVER_PATH, b"jpeg bytes", "Add cover image").unwrap();
    assert_eq!(host.file("demo", COVER_PATH), Some(b"jpeg bytes".to_vec()));
    assert_eq!(
        host.count_calls(|c| matches!(c, Call::CreateRepository(_))),
        1
    );
}

#[test]
fn test_create_repo_requires_token() {
    let host = MemoryHost::new("alice");
    let err = create_game_repo(
        &host,
        &Credential::anonymous("alice"),
        &NewRepository::new("demo"),
        None,
    )
    .unwrap_err();
    assert!(matches!(err, ShelfError::AuthRequired));
}

#[test]
fn test_cover_needs_initialized_repo() {
    let host = MemoryHost::new("alice");
    let mut new_repo = NewRepository::new("demo");
    new_repo.auto_init = false;

    let err = create_game_repo(
        &host,
        &admin(),
        &new_repo,
        Some(CoverImage { data: vec![1] }),
    )
    .unwrap_err();
    assert!(matches!(err, ShelfError::InvalidInput(_)));
    assert!(host.calls().is_empty());
}

#[test]
fn test_commit_existing_file_reads_sha_first() {
    let host = MemoryHost::new("alice");
    host.create_repository(&NewRepository::new("demo")).unwrap();

    let first = commit_file(&host, "alice", "demo", COVER_PATH, b"v1", "Add cover").unwrap();
    let second = commit_file(&host, "alice", "demo", COVER_PATH, b"v2", "Update cover").unwrap();

    assert_ne!(first.sha, second.sha);
    assert_eq!(host.file("demo", COVER_PATH), Some(b"v2".to_vec()));

    let puts: Vec<Call> = host
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::PutFile { .. }))
        .collect();
    assert_eq!(
        puts,
        vec![
            Call::PutFile {
                repo: "demo".to_string(),
                path: COVER_PATH.to_string(),
                sha: None
            },
            Call::PutFile {
                repo: "demo".to_string(),
                path: COVER_PATH.to_string(),
                sha: Some(first.sha.clone())
            },
        ]
    );
}

#[test]
fn test_write_without_sha_is_rejected_by_host() {
    let host = MemoryHost::new("alice");
    host.create_repository(&NewRepository::new("demo")).unwrap();
    commit_file(&host, "alice", "demo", COVER_PATH, b"v1", "Add cover").unwrap();

    let err = host
        .put_file("alice", "demo", COVER_PATH, b"v2", "Blind overwrite", None)
        .unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(host.file("demo", COVER_PATH), Some(b"v1".to_vec()));
}

// ==================== End to end ====================

#[test]
fn test_publish_then_browse() {
    let host = MemoryHost::new("alice");
    host.add_repo("demo");

    let report = publish_build(
        &host,
        &admin(),
        "demo",
        &NewRelease::for_tag("v1.0.0", None),
        build("demo.zip"),
    )
    .unwrap();

    assert_eq!(report.release.tag_name, "v1.0.0");
    match &report.asset {
        AssetOutcome::Attached(asset) => assert_eq!(asset.name, "demo.zip"),
        other => panic!("expected attached asset, got {:?}", other),
    }

    let entries = fetch_catalog(&host, "alice").unwrap();
    let demo = entries
        .iter()
        .find(|e| e.repository.name == "demo")
        .expect("demo listed");
    assert_eq!(demo.latest_tag(), Some("v1.0.0"));
    assert_eq!(
        demo.download_url(),
        Some("https://github.com/alice/demo/releases/download/v1.0.0/demo.zip")
    );
}
