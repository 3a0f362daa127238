use crate::cli::OutputFormat;
use colored::Colorize;
use serde::Serialize;
use shelf_core::{AssetOutcome, CreatedRepo, PublishReport, StatsRow, DEFAULT_BRANCH};

pub fn output_result<T: Serialize + Displayable>(result: &T, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(result) {
                println!("{}", json);
            }
        }
        OutputFormat::Text => {
            println!("{}", result.display());
        }
    }
}

pub fn output_list<T: Serialize + Displayable>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(&items) {
                println!("{}", json);
            }
        }
        OutputFormat::Text => {
            for item in items {
                println!("{}", item.display());
                println!();
            }
        }
    }
}

#[derive(Serialize)]
struct JsonMessage<'a> {
    success: bool,
    message: &'a str,
}

/// Print a plain confirmation
pub fn output_message(message: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let json = JsonMessage {
                success: true,
                message,
            };
            if let Ok(json) = serde_json::to_string_pretty(&json) {
                println!("{}", json);
            }
        }
        OutputFormat::Text => println!("{}", message),
    }
}

#[derive(Serialize)]
pub struct JsonError {
    pub error: bool,
    pub code: String,
    pub message: String,
}

/// Stable error code for JSON consumers
fn error_code(err: &anyhow::Error) -> &'static str {
    use shelf_core::ShelfError;

    match err.downcast_ref::<ShelfError>() {
        Some(ShelfError::AuthRequired) => "auth_required",
        Some(ShelfError::Unauthorized) => "unauthorized",
        Some(ShelfError::RateLimited) => "rate_limited",
        Some(ShelfError::NotFound(_)) => "not_found",
        Some(ShelfError::Conflict(_)) => "conflict",
        Some(ShelfError::InvalidInput(_)) => "invalid_input",
        Some(_) => "api_error",
        None => "error",
    }
}

pub fn output_error(err: &anyhow::Error, format: OutputFormat) {
    let message = match format {
        OutputFormat::Json => {
            let json_err = JsonError {
                error: true,
                code: error_code(err).to_string(),
                message: format!("{:#}", err),
            };
            serde_json::to_string_pretty(&json_err).unwrap_or_else(|_| {
                format!(r#"{{"error": true, "message": "{}"}}"#, err)
            })
        }
        OutputFormat::Text => format!("{}: {:#}", "Error".red().bold(), err),
    };
    eprintln!("{}", message);
}

pub trait Displayable {
    fn display(&self) -> String;
}

impl Displayable for PublishReport {
    fn display(&self) -> String {
        let verb = if self.reused { "Reused" } else { "Created" };
        let mut output = format!(
            "{} release {} in {}\n  {}: {}",
            verb,
            self.release.tag_name.cyan().bold(),
            self.repository.white().bold(),
            "Page".dimmed(),
            self.release.html_url
        );

        match &self.asset {
            AssetOutcome::Attached(asset) => {
                output.push_str(&format!(
                    "\n  {}: {} ({} bytes)\n  {}: {}",
                    "Asset".dimmed(),
                    asset.name.green(),
                    asset.size,
                    "Download".dimmed(),
                    asset.browser_download_url
                ));
            }
            AssetOutcome::Deferred { reason, manual_url } => {
                output.push_str(&format!(
                    "\n  {}: upload did not complete ({})\n  {}: {}",
                    "Warning".yellow().bold(),
                    reason,
                    "Attach the file by hand at".yellow(),
                    manual_url
                ));
            }
        }

        output
    }
}

impl Displayable for CreatedRepo {
    fn display(&self) -> String {
        let repo = &self.repository;
        let mut output = format!(
            "{} - {}",
            repo.full_name.cyan().bold(),
            repo.html_url.dimmed()
        );
        if let Some(desc) = &repo.description {
            output.push_str(&format!("\n  {}: {}", "Description".dimmed(), desc));
        }
        if let Some(cover) = &self.cover {
            output.push_str(&format!(
                "\n  {}: {} ({})",
                "Cover".dimmed(),
                cover.path,
                &cover.sha[..cover.sha.len().min(7)]
            ));
        }
        if let Some(reason) = &self.cover_error {
            output.push_str(&format!(
                "\n  {}: cover image was not committed ({})\n  {}: {}/upload/{}",
                "Warning".yellow().bold(),
                reason,
                "Add it by hand at".yellow(),
                repo.html_url,
                repo.default_branch.as_deref().unwrap_or(DEFAULT_BRANCH)
            ));
        }
        output
    }
}

impl Displayable for StatsRow {
    fn display(&self) -> String {
        format!(
            "{:<30} {:>10} {:>7} {:>10}",
            self.name,
            self.latest_tag.as_deref().unwrap_or("-"),
            self.stars,
            self.downloads
        )
    }
}

/// Stats as a table in text mode
pub fn output_stats(rows: &[StatsRow], format: OutputFormat) {
    match format {
        OutputFormat::Json => output_list(rows, format),
        OutputFormat::Text => {
            println!(
                "{}",
                format!(
                    "{:<30} {:>10} {:>7} {:>10}",
                    "GAME", "VERSION", "STARS", "DOWNLOADS"
                )
                .bold()
            );
            for row in rows {
                println!("{}", row.display());
            }
            let total: u64 = rows.iter().map(|r| r.downloads).sum();
            println!("{} {}", "Total downloads:".dimmed(), total);
        }
    }
}
