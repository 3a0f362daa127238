use crate::cli::{OutputFormat, RepoCommands};
use crate::output::output_result;
use anyhow::{Context, Result};
use shelf_core::{create_game_repo, CoverImage, Credential, NewRepository, ReleaseHost};

pub fn handle_repo(
    host: &dyn ReleaseHost,
    credential: &Credential,
    action: &RepoCommands,
    format: OutputFormat,
) -> Result<()> {
    match action {
        RepoCommands::Create {
            name,
            description,
            private,
            no_init,
            cover,
        } => {
            credential.require_token()?;

            let cover = match cover {
                Some(path) => Some(CoverImage {
                    data: std::fs::read(path)
                        .with_context(|| format!("Failed to read cover {}", path.display()))?,
                }),
                None => None,
            };

            let new_repo = NewRepository {
                name: name.clone(),
                description: description.clone(),
                private: *private,
                auto_init: !no_init,
            };

            let created = create_game_repo(host, credential, &new_repo, cover)
                .with_context(|| format!("Failed to create repository '{}'", name))?;

            output_result(&created, format);
            Ok(())
        }
    }
}
