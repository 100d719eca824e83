use crate::domain::{SessionToken, TokenStore, TokenStoreError};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

// Storage key for the current session token.
pub const TOKEN_KEY: &str = "auth_token";
// Key used by older admin builds; cleared alongside the current one.
pub const LEGACY_TOKEN_KEY: &str = "token";

// In-process token storage. Clones share the same slot.
#[derive(Clone, Default)]
pub struct MemoryTokenStore {
    token: Arc<Mutex<Option<SessionToken>>>,
}

impl MemoryTokenStore {
    pub fn with_token(token: SessionToken) -> Self {
        Self {
            token: Arc::new(Mutex::new(Some(token))),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<SessionToken>, TokenStoreError> {
        let guard = self.token.lock().map_err(|_| TokenStoreError::Poisoned)?;
        Ok(guard.clone())
    }

    fn save(&self, token: &SessionToken) -> Result<(), TokenStoreError> {
        let mut guard = self.token.lock().map_err(|_| TokenStoreError::Poisoned)?;
        *guard = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        let mut guard = self.token.lock().map_err(|_| TokenStoreError::Poisoned)?;
        *guard = None;
        Ok(())
    }
}

// Persistent key-value storage: one file per key under `dir`.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    dir: PathBuf,
}

impl FileTokenStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // Remove the current and the legacy token entries.
    pub fn clear_all(&self) -> Result<(), TokenStoreError> {
        remove_if_present(&self.key_path(TOKEN_KEY))?;
        remove_if_present(&self.key_path(LEGACY_TOKEN_KEY))?;
        tracing::debug!(dir = %self.dir.display(), "cleared all stored tokens.");
        Ok(())
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<SessionToken>, TokenStoreError> {
        match fs::read_to_string(self.key_path(TOKEN_KEY)) {
            Ok(raw) => {
                let value = raw.trim();
                if value.is_empty() {
                    return Ok(None);
                }
                Ok(Some(SessionToken::new(value)))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, token: &SessionToken) -> Result<(), TokenStoreError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.key_path(TOKEN_KEY);
        fs::write(&path, token.as_str())?;
        restrict_permissions(&path)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        remove_if_present(&self.key_path(TOKEN_KEY))
    }
}

fn remove_if_present(path: &Path) -> Result<(), TokenStoreError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_memory_store_is_cloned_then_clones_share_the_token() {
        let store = MemoryTokenStore::default();
        let other = store.clone();

        store.save(&SessionToken::new("abc")).unwrap();

        assert_eq!(other.load().unwrap(), Some(SessionToken::new("abc")));
        other.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn when_file_store_saves_then_token_is_loaded_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("church-client"));

        store.save(&SessionToken::new("abc")).unwrap();

        assert_eq!(store.load().unwrap(), Some(SessionToken::new("abc")));
    }

    #[test]
    fn when_no_token_file_exists_then_load_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path());

        assert_eq!(store.load().unwrap(), None);
        store.clear().expect("clearing a missing token should succeed");
    }

    #[test]
    fn when_token_file_is_blank_then_load_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(TOKEN_KEY), "  \n").unwrap();
        let store = FileTokenStore::new(dir.path());

        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn when_clear_all_runs_then_legacy_token_is_removed_too() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path());
        store.save(&SessionToken::new("current")).unwrap();
        fs::write(dir.path().join(LEGACY_TOKEN_KEY), "old").unwrap();

        store.clear_all().unwrap();

        assert!(!dir.path().join(TOKEN_KEY).exists());
        assert!(!dir.path().join(LEGACY_TOKEN_KEY).exists());
    }

    #[cfg(unix)]
    #[test]
    fn when_token_is_saved_then_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path());

        store.save(&SessionToken::new("abc")).unwrap();

        let mode = fs::metadata(dir.path().join(TOKEN_KEY))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
