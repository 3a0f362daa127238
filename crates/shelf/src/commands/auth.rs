use crate::cli::OutputFormat;
use crate::credentials::{mask_token, CredentialStore};
use crate::output::{output_message, output_result, Displayable};
use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use shelf_core::Credential;

/// Stored login as shown by `whoami`
#[derive(Serialize)]
pub struct Identity {
    pub username: Option<String>,
    pub token: Option<String>,
    pub authenticated: bool,
    pub path: String,
}

impl Displayable for Identity {
    fn display(&self) -> String {
        match &self.username {
            None => "Not logged in. Run 'shelf login <username> <token>'.".to_string(),
            Some(username) => {
                let mut output = format!("{} {}", "Logged in as".dimmed(), username.cyan().bold());
                match &self.token {
                    Some(token) => output.push_str(&format!("\n  {}: {}", "Token".dimmed(), token)),
                    None => output.push_str(&format!(
                        "\n  {}",
                        "No token stored (browsing only)".yellow()
                    )),
                }
                output.push_str(&format!("\n  {}: {}", "Stored in".dimmed(), self.path));
                output
            }
        }
    }
}

pub fn handle_login(
    store: &CredentialStore,
    username: &str,
    token: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let credential = Credential::new(username, token)?;
    store.save(&credential).context("Failed to store credentials")?;

    let message = if credential.is_authenticated() {
        format!("Logged in as {}", credential.username)
    } else {
        format!(
            "Saved username {} without a token; publishing needs one",
            credential.username
        )
    };
    output_message(&message, format);
    Ok(())
}

pub fn handle_logout(store: &CredentialStore, format: OutputFormat) -> Result<()> {
    let credential = store.logout().context("Failed to clear credentials")?;
    let message = if credential.username.is_empty() {
        "Logged out".to_string()
    } else {
        format!("Logged out ({} kept for browsing)", credential.username)
    };
    output_message(&message, format);
    Ok(())
}

pub fn handle_whoami(store: &CredentialStore, format: OutputFormat) -> Result<()> {
    let credential = store.load()?;
    let identity = Identity {
        username: Some(credential.username.clone()).filter(|u| !u.is_empty()),
        token: credential.token.as_deref().map(mask_token),
        authenticated: credential.is_authenticated(),
        path: store.path().display().to_string(),
    };
    output_result(&identity, format);
    Ok(())
}
