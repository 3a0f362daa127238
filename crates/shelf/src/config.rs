use anyhow::{anyhow, Result};
use directories::{BaseDirs, ProjectDirs};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use shelf_core::Credential;
use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Config {
    /// GitHub API base URL (GitHub Enterprise or a test server)
    pub api_url: Option<String>,
    /// Token override; takes precedence over stored credentials
    pub token: Option<String>,
    /// Username override; takes precedence over stored credentials
    pub username: Option<String>,
    /// User whose catalog is shown when none is given
    pub default_user: Option<String>,
}

impl Config {
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        let explicit_path = config_path.as_deref();
        if let Some(path) = explicit_path {
            if !path.exists() {
                return Err(anyhow!("Config file not found: {}", path.display()));
            }
        }

        for path in config_paths(explicit_path) {
            if path.exists() {
                log::debug!("Loading config from {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }

        figment = figment.merge(Env::prefixed("SHELF_").only(&[
            "api_url",
            "token",
            "username",
            "default_user",
        ]));

        figment
            .extract()
            .map_err(|e| anyhow!("Failed to load config: {}", e))
    }

    pub fn merge_with_cli(&mut self, cli_api_url: Option<String>, cli_token: Option<String>) {
        if let Some(url) = cli_api_url {
            self.api_url = Some(url);
        }
        if let Some(token) = cli_token {
            self.token = Some(token);
        }
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    /// Combine overrides with the stored credential
    pub fn credential(&self, stored: Credential) -> Result<Credential> {
        let username = self.username.clone().unwrap_or(stored.username);
        let token = self.token.clone().or(stored.token);
        Credential::new(username, token).map_err(|e| {
            anyhow!(
                "{}. Set a username via 'shelf login', SHELF_USERNAME or config file",
                e
            )
        })
    }

    /// Catalog owner: explicit argument, then `default_user`, then the login
    pub fn catalog_user(&self, explicit: Option<&str>, credential: &Credential) -> Result<String> {
        explicit
            .map(String::from)
            .or_else(|| self.default_user.clone())
            .or_else(|| {
                Some(credential.username.clone()).filter(|u| !u.is_empty())
            })
            .ok_or_else(|| {
                anyhow!(
                    "No GitHub user given. Pass one, set default_user in the config file, or run 'shelf login'"
                )
            })
    }
}

pub fn config_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(path) = explicit {
        paths.push(path.to_path_buf());
        return paths;
    }

    if let Some(path) = get_project_config_path() {
        push_unique(&mut paths, path);
    }
    if let Some(path) = get_xdg_config_path() {
        push_unique(&mut paths, path);
    }
    if let Some(path) = get_local_config_path() {
        push_unique(&mut paths, path);
    }

    paths
}

fn push_unique(paths: &mut Vec<PathBuf>, path: PathBuf) {
    if !paths.contains(&path) {
        paths.push(path);
    }
}

fn get_project_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "shelf").map(|d| d.config_dir().join("config.toml"))
}

fn get_xdg_config_path() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(dir).join("shelf").join("config.toml"));
    }

    BaseDirs::new().map(|dirs| {
        dirs.home_dir()
            .join(".config")
            .join("shelf")
            .join("config.toml")
    })
}

fn get_local_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|dir| dir.join("shelf.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_prefers_overrides() {
        let config = Config {
            token: Some("ghp_override".to_string()),
            ..Default::default()
        };
        let stored = Credential::new("alice", Some("ghp_stored".to_string())).unwrap();
        let cred = config.credential(stored).unwrap();
        assert_eq!(cred.username, "alice");
        assert_eq!(cred.token.as_deref(), Some("ghp_override"));
    }

    #[test]
    fn test_credential_token_without_username_fails() {
        let config = Config {
            token: Some("ghp_x".to_string()),
            ..Default::default()
        };
        assert!(config.credential(Credential::default()).is_err());
    }

    #[test]
    fn test_catalog_user_resolution() {
        let cred = Credential::anonymous("alice");
        let mut config = Config::default();
        assert_eq!(config.catalog_user(None, &cred).unwrap(), "alice");

        config.default_user = Some("studio".to_string());
        assert_eq!(config.catalog_user(None, &cred).unwrap(), "studio");
        assert_eq!(config.catalog_user(Some("bob"), &cred).unwrap(), "bob");

        let config = Config::default();
        assert!(config
            .catalog_user(None, &Credential::default())
            .is_err());
    }

    #[test]
    fn test_explicit_missing_config_is_error() {
        let err = Config::load(Some(PathBuf::from("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    #[serial_test::serial]
    fn test_env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "api_url = \"http://ghe.local/api/v3\"\ndefault_user = \"studio\"\n",
        )
        .unwrap();

        std::env::set_var("SHELF_DEFAULT_USER", "bob");
        let config = Config::load(Some(path));
        std::env::remove_var("SHELF_DEFAULT_USER");

        let config = config.unwrap();
        assert_eq!(config.api_url(), "http://ghe.local/api/v3");
        assert_eq!(config.default_user.as_deref(), Some("bob"));
    }

    #[test]
    fn test_api_url_default() {
        assert_eq!(Config::default().api_url(), DEFAULT_API_URL);
    }
}
