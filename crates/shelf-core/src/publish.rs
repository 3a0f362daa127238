//! Release publishing: create-or-reuse a release, then attach a build

use crate::error::Result;
use crate::models::{AssetOutcome, AssetUpload, Credential, NewRelease, PublishReport, Release};
use crate::traits::ReleaseHost;

/// Make sure a release exists for `release.tag_name`.
///
/// Returns the release and whether it already existed. A conflict on
/// creation means the tag is taken, so the existing release is fetched.
pub fn ensure_release(
    host: &dyn ReleaseHost,
    owner: &str,
    repo: &str,
    release: &NewRelease,
) -> Result<(Release, bool)> {
    match host.create_release(owner, repo, release) {
        Ok(created) => {
            log::info!("Created release {} in {}/{}", created.tag_name, owner, repo);
            Ok((created, false))
        }
        Err(e) if e.is_conflict() => {
            log::info!(
                "Tag {} already exists in {}/{}, reusing its release",
                release.tag_name,
                owner,
                repo
            );
            match host.release_by_tag(owner, repo, &release.tag_name) {
                Ok(existing) => Ok((existing, true)),
                // 422 was some other validation failure
                Err(lookup) if lookup.is_not_found() => Err(e),
                Err(lookup) => Err(lookup),
            }
        }
        Err(e) => Err(e),
    }
}

/// Concrete upload URL from a release's templated `upload_url`
///
/// `https://uploads.github.com/repos/o/r/releases/1/assets{?name,label}`
/// becomes `.../assets?name=<file>&label=<label>`.
pub fn expand_upload_url(template: &str, file_name: &str, label: Option<&str>) -> String {
    let base = match template.find('{') {
        Some(pos) => &template[..pos],
        None => template,
    };
    let sep = if base.contains('?') { '&' } else { '?' };

    let mut url = format!("{}{}name={}", base, sep, urlencoding::encode(file_name));
    if let Some(label) = label {
        url.push_str("&label=");
        url.push_str(&urlencoding::encode(label));
    }
    url
}

/// Attach `asset` to `release`. Never fails: a failed upload is reported
/// as `Deferred` with the release page as the manual fallback.
pub fn attach_asset(host: &dyn ReleaseHost, release: &Release, asset: &AssetUpload) -> AssetOutcome {
    let url = expand_upload_url(&release.upload_url, &asset.file_name, asset.label.as_deref());

    match host.upload_asset(&url, asset) {
        Ok(uploaded) => {
            log::info!(
                "Uploaded {} ({} bytes) to release {}",
                uploaded.name,
                asset.data.len(),
                release.tag_name
            );
            AssetOutcome::Attached(uploaded)
        }
        Err(e) => {
            log::warn!(
                "Upload of {} to release {} failed: {}",
                asset.file_name,
                release.tag_name,
                e
            );
            AssetOutcome::Deferred {
                reason: e.to_string(),
                manual_url: release.html_url.clone(),
            }
        }
    }
}

/// Publish a build: ensure the release, then attach the asset.
///
/// The owner is the logged-in user. When a reused release already carries
/// an asset with the same file name, no upload is attempted.
pub fn publish_build(
    host: &dyn ReleaseHost,
    credential: &Credential,
    repo: &str,
    release: &NewRelease,
    asset: AssetUpload,
) -> Result<PublishReport> {
    credential.require_token()?;
    let owner = credential.username.as_str();

    let (release, reused) = ensure_release(host, owner, repo, release)?;

    let asset = match release.find_asset(&asset.file_name) {
        Some(existing) if reused => {
            log::info!(
                "{} is already attached to release {}, skipping upload",
                existing.name,
                release.tag_name
            );
            AssetOutcome::Attached(existing.clone())
        }
        _ => attach_asset(host, &release, &asset),
    };

    Ok(PublishReport {
        repository: format!("{}/{}", owner, repo),
        release,
        reused,
        asset,
    })
}
