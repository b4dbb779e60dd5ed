//! Directory-backed store: one `<key>.json` file per key

use std::ffi::OsString;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use super::{Storage, StorageError};

/// File extension used for stored values
const VALUE_EXT: &str = "json";

#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        // Watchers report canonical paths
        let dir = dir.canonicalize().unwrap_or(dir);
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        if !is_valid_key(key) {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.{}", key, VALUE_EXT)))
    }

    /// Key stored in `path`, if it is a value file of this store
    pub fn key_for(&self, path: &Path) -> Option<String> {
        if path.parent()? != self.dir.as_path() {
            return None;
        }
        if path.extension()?.to_str()? != VALUE_EXT {
            return None;
        }
        let key = path.file_stem()?.to_str()?;
        is_valid_key(key).then(|| key.to_string())
    }
}

/// Keys become file names, so no separators or leading dots
fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.path_for(key).ok()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::debug!("Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        write_atomic(&path, value.as_bytes()).map_err(|source| StorageError::Io {
            key: key.to_string(),
            source,
        })
    }
}

/// `path` with `suffix` appended to its file name (`a.json` -> `a.json.lock`)
fn sidecar(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

/// Replace `path` with `bytes` under an exclusive lock, via temp file + rename,
/// so a reader in another process sees either the old or the new content.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    // Lock file is separate from the target so it survives the rename
    let lock_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(sidecar(path, ".lock"))?;
    lock_file.lock_exclusive()?;

    let temp_path = sidecar(path, ".tmp");
    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)?;
    temp_file.write_all(bytes)?;
    temp_file.sync_all()?;

    std::fs::rename(&temp_path, path)?;

    // Lock is released when lock_file is dropped
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::open(dir.path().join("store")).unwrap();

        assert!(storage.get("nb.rewards.wallet.v1").is_none());
        storage.set("nb.rewards.wallet.v1", "{\"v\":1}").unwrap();
        assert_eq!(
            storage.get("nb.rewards.wallet.v1").as_deref(),
            Some("{\"v\":1}")
        );

        storage.set("nb.rewards.wallet.v1", "{\"v\":2}").unwrap();
        assert_eq!(
            storage.get("nb.rewards.wallet.v1").as_deref(),
            Some("{\"v\":2}")
        );
        assert!(!storage.dir().join("nb.rewards.wallet.v1.json.tmp").exists());
    }

    #[test]
    fn test_write_atomic_replaces_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        assert!(dir.path().join("config.toml.lock").exists());
        assert!(!dir.path().join("config.toml.tmp").exists());
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();
        assert!(matches!(
            storage.set("../escape", "x"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(storage.get("a/b").is_none());
        assert!(storage.set(".hidden", "x").is_err());
    }

    #[test]
    fn test_key_for_maps_value_files_only() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();

        let path = storage.path_for("mpl.stats.v1").unwrap();
        assert_eq!(storage.key_for(&path).as_deref(), Some("mpl.stats.v1"));

        let lock = storage.dir().join("mpl.stats.v1.json.lock");
        assert!(storage.key_for(&lock).is_none());
        let tmp = storage.dir().join("mpl.stats.v1.json.tmp");
        assert!(storage.key_for(&tmp).is_none());
        assert!(storage.key_for(Path::new("/elsewhere/mpl.stats.v1.json")).is_none());
    }
}
