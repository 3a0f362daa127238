use crate::cli::OutputFormat;
use crate::output::{output_list, output_stats, Displayable};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use shelf_core::{fetch_catalog, stats, CatalogEntry, ReleaseHost};

/// One game as shown to visitors
#[derive(Debug, Serialize)]
pub struct GameCard {
    pub name: String,
    pub owner: String,
    pub description: Option<String>,
    pub latest_tag: Option<String>,
    pub download_url: Option<String>,
    pub cover_url: String,
    pub stars: u64,
    pub updated_at: Option<DateTime<Utc>>,
    pub html_url: String,
    pub release_notes: Option<String>,
}

impl From<&CatalogEntry> for GameCard {
    fn from(entry: &CatalogEntry) -> Self {
        let repo = &entry.repository;
        Self {
            name: repo.name.clone(),
            owner: repo.owner.login.clone(),
            description: repo.description.clone(),
            latest_tag: entry.latest_tag().map(String::from),
            download_url: entry.download_url().map(String::from),
            cover_url: entry.cover_url(),
            stars: repo.stargazers_count,
            updated_at: repo.updated_at,
            html_url: repo.html_url.clone(),
            release_notes: entry
                .latest_release
                .as_ref()
                .and_then(|r| r.body.clone())
                .filter(|b| !b.is_empty()),
        }
    }
}

impl Displayable for GameCard {
    fn display(&self) -> String {
        let version = match &self.latest_tag {
            Some(tag) => tag.green().to_string(),
            None => "no release".dimmed().to_string(),
        };
        let mut output = format!(
            "{} {}  {} {}",
            self.name.cyan().bold(),
            version,
            "★".yellow(),
            self.stars
        );

        output.push_str(&format!(
            "\n  {}",
            self.description
                .as_deref()
                .unwrap_or("No description provided.")
        ));

        match &self.download_url {
            Some(url) => output.push_str(&format!("\n  {}: {}", "Download".dimmed(), url)),
            None if self.latest_tag.is_some() => {
                output.push_str(&format!("\n  {}", "Coming soon (no build attached)".dimmed()))
            }
            None => {}
        }

        if let Some(notes) = &self.release_notes {
            output.push_str(&format!("\n  {}: {}", "Notes".dimmed(), notes));
        }
        if let Some(updated) = &self.updated_at {
            output.push_str(&format!(
                "\n  {}: {}",
                "Updated".dimmed(),
                updated.format("%Y-%m-%d %H:%M").to_string().dimmed()
            ));
        }
        output
    }
}

pub fn handle_catalog(
    host: &dyn ReleaseHost,
    user: &str,
    all: bool,
    format: OutputFormat,
) -> Result<()> {
    let entries =
        fetch_catalog(host, user).with_context(|| format!("Failed to load games of {}", user))?;

    let cards: Vec<GameCard> = entries
        .iter()
        .filter(|e| all || e.latest_release.is_some())
        .map(GameCard::from)
        .collect();

    if cards.is_empty() && format == OutputFormat::Text {
        println!("No games found for {}.", user);
        println!("Publish a build with 'shelf publish --repo <name> <file.zip>'.");
        return Ok(());
    }

    output_list(&cards, format);
    Ok(())
}

pub fn handle_stats(host: &dyn ReleaseHost, user: &str, format: OutputFormat) -> Result<()> {
    let entries =
        fetch_catalog(host, user).with_context(|| format!("Failed to load games of {}", user))?;
    output_stats(&stats(&entries), format);
    Ok(())
}
