use crate::cli::OutputFormat;
use crate::output::output_result;
use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use regex::Regex;
use shelf_core::{publish_build, AssetUpload, Credential, NewRelease, ReleaseHost};
use std::path::Path;

/// Publish options gathered from the command line
pub struct PublishArgs<'a> {
    pub repo: &'a str,
    pub tag: Option<&'a str>,
    pub notes: Option<String>,
    pub label: &'a str,
    pub prerelease: bool,
    pub open: bool,
    pub file: &'a Path,
}

/// Version tag embedded in a build file name
///
/// `game-v1.0.2.zip` and `game-1.0.2.zip` both give `v1.0.2`.
pub fn detect_tag(file_name: &str) -> Option<String> {
    let re = Regex::new(r"v?(\d+\.\d+\.\d+)").ok()?;
    re.captures(file_name)
        .and_then(|c| c.get(1))
        .map(|m| format!("v{}", m.as_str()))
}

fn is_zip(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("zip"))
}

pub fn handle_publish(
    host: &dyn ReleaseHost,
    credential: &Credential,
    args: PublishArgs<'_>,
    format: OutputFormat,
) -> Result<()> {
    // Fail before touching the file system when logged out
    credential.require_token()?;

    if !is_zip(args.file) {
        return Err(anyhow!(
            "Only .zip builds can be published: {}",
            args.file.display()
        ));
    }

    let file_name = args
        .file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("Invalid build file name: {}", args.file.display()))?;

    let tag = match args.tag {
        Some(tag) => tag.to_string(),
        None => detect_tag(file_name).ok_or_else(|| {
            anyhow!(
                "Could not detect a version in '{}'. Pass one with --tag",
                file_name
            )
        })?,
    };

    let data = std::fs::read(args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let mut release = NewRelease::for_tag(&tag, args.notes);
    release.prerelease = args.prerelease;

    let asset = AssetUpload::new(file_name, data).with_label(args.label);

    let report = publish_build(host, credential, args.repo, &release, asset)
        .with_context(|| format!("Failed to publish {} to {}", tag, args.repo))?;

    output_result(&report, format);

    if let Some(url) = report.asset.manual_url() {
        if args.open {
            if let Err(e) = open::that(url) {
                eprintln!("{}: could not open {}: {}", "Warning".yellow(), url, e);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_tag() {
        assert_eq!(detect_tag("game-v1.0.2.zip"), Some("v1.0.2".to_string()));
        assert_eq!(detect_tag("game-1.0.2.zip"), Some("v1.0.2".to_string()));
        assert_eq!(detect_tag("demo_v10.20.30-linux.zip"), Some("v10.20.30".to_string()));
        assert_eq!(detect_tag("demo.zip"), None);
        assert_eq!(detect_tag("demo-1.2.zip"), None);
    }

    #[test]
    fn test_is_zip() {
        assert!(is_zip(Path::new("builds/demo.zip")));
        assert!(is_zip(Path::new("DEMO.ZIP")));
        assert!(!is_zip(Path::new("demo.tar.gz")));
        assert!(!is_zip(Path::new("demo")));
    }
}
