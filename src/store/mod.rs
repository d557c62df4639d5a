use std::{
    fs::{self, File},
    io::Write,
    path::Path,
    sync::Arc,
};

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;

use crate::error::StoreError;

pub mod media;
pub mod sent;
pub mod tracker;

pub use media::MediaStore;
pub use sent::SentTable;
pub use tracker::PostingTracker;

pub type Shared<T> = Arc<RwLock<T>>;

pub fn shared<T>(value: T) -> Shared<T> {
    Arc::new(RwLock::new(value))
}

/// Reads a JSON file. A missing file is `Ok(None)`.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&contents)?))
}

/// Like [`load_json`], but any failure is logged and replaced by `T::default()`.
pub fn load_json_or_default<T: DeserializeOwned + Default>(path: &Path, what: &str) -> T {
    match load_json(path) {
        Ok(Some(value)) => value,
        Ok(None) => {
            tracing::info!(path = %path.display(), "no {what} file yet, starting empty");
            T::default()
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "failed to load {what}, starting empty");
            T::default()
        }
    }
}

/// Pretty-prints `value` to `<path>.tmp`, fsyncs, then renames over `path`.
pub fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = Path::new(&tmp);

    let json = serde_json::to_string_pretty(value)?;

    let mut file = File::create(tmp)?;
    file.write_all(json.as_bytes())?;
    file.sync_all()?;
    drop(file);

    fs::rename(tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/list.json");

        save_json(&path, &vec!["a", "b"]).unwrap();
        let loaded: Option<Vec<String>> = load_json(&path).unwrap();

        assert_eq!(loaded.unwrap(), vec!["a", "b"]);
        assert!(!dir.path().join("nested/list.json.tmp").exists());
    }

    #[test]
    fn missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let loaded: Option<Vec<String>> = load_json(&dir.path().join("nope.json")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn corrupt_file_degrades_to_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "[\"half").unwrap();

        assert!(load_json::<Vec<String>>(&path).is_err());
        let loaded: Vec<String> = load_json_or_default(&path, "test");
        assert!(loaded.is_empty());
    }
}
