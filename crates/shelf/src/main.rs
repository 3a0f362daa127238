mod cli;
mod color;
mod commands;
mod config;
mod credentials;
mod output;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, ConfigCommands, OutputFormat};
use commands::publish::PublishArgs;
use config::Config;
use credentials::{mask_token, CredentialStore};
use github_backend::GitHubClient;
use output::output_error;
use shelf_core::{Credential, ReleaseHost};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    color::init(cli.color);

    if let Err(e) = run(&cli) {
        output_error(&e, cli.format);
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

fn run(cli: &Cli) -> Result<()> {
    let store = CredentialStore::open(cli.credentials.clone())?;

    // Commands that never talk to GitHub
    match &cli.command {
        Commands::Login { username, pat } => {
            let token = pat.clone().or_else(|| cli.token.clone());
            return commands::auth::handle_login(&store, username, token, cli.format);
        }
        Commands::Logout => return commands::auth::handle_logout(&store, cli.format),
        Commands::Whoami => return commands::auth::handle_whoami(&store, cli.format),
        Commands::Completions { shell } => {
            Cli::generate_completions(*shell);
            return Ok(());
        }
        Commands::Config { action } => return handle_config(cli, &store, action),
        _ => {}
    }

    let mut config = Config::load(cli.config.clone())?;
    config.merge_with_cli(cli.api_url.clone(), cli.token.clone());
    let credential = config.credential(store.load()?)?;

    let client = GitHubClient::with_base_url(config.api_url(), credential.token.as_deref());
    log::debug!(
        "Using {} as {}",
        client.base_url(),
        if client.has_token() {
            credential.username.as_str()
        } else {
            "anonymous"
        }
    );

    run_with_client(&client, &credential, &config, cli)
}

/// Run commands against a release host
fn run_with_client(
    host: &dyn ReleaseHost,
    credential: &Credential,
    config: &Config,
    cli: &Cli,
) -> Result<()> {
    match &cli.command {
        Commands::Catalog { user, all } => {
            let user = config.catalog_user(user.as_deref(), credential)?;
            commands::catalog::handle_catalog(host, &user, *all, cli.format)
        }
        Commands::Stats { user } => {
            let user = config.catalog_user(user.as_deref(), credential)?;
            commands::catalog::handle_stats(host, &user, cli.format)
        }
        Commands::Publish {
            repo,
            tag,
            notes,
            label,
            prerelease,
            open,
            file,
        } => commands::publish::handle_publish(
            host,
            credential,
            PublishArgs {
                repo,
                tag: tag.as_deref(),
                notes: notes.clone(),
                label,
                prerelease: *prerelease,
                open: *open,
                file,
            },
            cli.format,
        ),
        Commands::Repo { action } => {
            commands::repo::handle_repo(host, credential, action, cli.format)
        }
        // Handled in run() before a client is built
        Commands::Login { .. }
        | Commands::Logout
        | Commands::Whoami
        | Commands::Completions { .. }
        | Commands::Config { .. } => Ok(()),
    }
}

fn handle_config(cli: &Cli, store: &CredentialStore, action: &ConfigCommands) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let mut config = Config::load(cli.config.clone())?;
            config.merge_with_cli(cli.api_url.clone(), cli.token.clone());
            config.token = config.token.as_deref().map(mask_token);
            if config.api_url.is_none() {
                config.api_url = Some(config::DEFAULT_API_URL.to_string());
            }

            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
                OutputFormat::Text => print!("{}", toml::to_string_pretty(&config)?),
            }
            Ok(())
        }
        ConfigCommands::Path => {
            let paths = config::config_paths(cli.config.as_deref());
            match cli.format {
                OutputFormat::Json => {
                    let json = serde_json::json!({
                        "config": paths,
                        "credentials": store.path(),
                    });
                    println!("{}", serde_json::to_string_pretty(&json)?);
                }
                OutputFormat::Text => {
                    for path in &paths {
                        let marker = if path.exists() { " (found)" } else { "" };
                        println!("config: {}{}", path.display(), marker);
                    }
                    println!("credentials: {}", store.path().display());
                }
            }
            Ok(())
        }
    }
}
