use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use shelf_core::Credential;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const CREDENTIALS_FILE_NAME: &str = "credentials.json";

/// Tokens shorter than this are hidden entirely
const MIN_MASKED_LEN: usize = 12;

/// Credential pair persisted between runs
///
/// The whole pair is written at once; there is a single writer (the
/// current process).
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Store at `path`, or at the platform config dir when `None`
    pub fn open(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => default_path()?,
        };
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored credential, or an empty one if nothing is stored
    pub fn load(&self) -> Result<Credential> {
        if !self.path.exists() {
            return Ok(Credential::default());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read credentials: {}", self.path.display()))?;

        serde_json::from_str(&content).context("Failed to parse credentials")
    }

    pub fn save(&self, credential: &Credential) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(credential)?;
        write_private(&self.path, content.as_bytes())
            .with_context(|| format!("Failed to write credentials: {}", self.path.display()))?;
        Ok(())
    }

    /// Drop the token, keep the username
    pub fn logout(&self) -> Result<Credential> {
        let mut credential = self.load()?;
        credential.logout();
        self.save(&credential)?;
        Ok(credential)
    }
}

/// Write `content`, readable by the owner only on unix
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    // mode() only applies to newly created files
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(content)
}

fn default_path() -> Result<PathBuf> {
    ProjectDirs::from("", "", "shelf")
        .map(|d| d.config_dir().join(CREDENTIALS_FILE_NAME))
        .ok_or_else(|| anyhow!("Could not determine a config directory; use --credentials"))
}

/// Token with everything but the last four characters hidden
pub fn mask_token(token: &str) -> String {
    if token.chars().count() < MIN_MASKED_LEN {
        return "****".to_string();
    }
    let visible: String = token
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("****{}", visible)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_and_logout() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::open(Some(dir.path().join("nested/creds.json"))).unwrap();

        assert_eq!(store.load().unwrap(), Credential::default());

        let cred = Credential::new("alice", Some("ghp_secret".to_string())).unwrap();
        store.save(&cred).unwrap();
        assert_eq!(store.load().unwrap(), cred);

        let after = store.logout().unwrap();
        assert_eq!(after.username, "alice");
        assert_eq!(after.token, None);
        assert_eq!(store.load().unwrap().token, None);
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("ghp_abcdef1234"), "****1234");
        assert_eq!(mask_token("ab"), "****");
        assert_eq!(mask_token("ghp_1234"), "****");
    }

    #[cfg(unix)]
    #[test]
    fn test_credentials_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creds.json");
        fs::write(&path, "{}").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        let store = CredentialStore::open(Some(path.clone())).unwrap();
        store
            .save(&Credential::new("alice", Some("ghp_secret".to_string())).unwrap())
            .unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
