//! Persistent key-value namespace backed by JSON files.
//!
//! Each key is stored as `<key>.json` in the data directory. Reads never
//! fail the caller: a missing or unparseable value degrades to `None`.

use std::fs;
use std::io;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Handle to a key-value namespace rooted at a data directory.
///
/// Cheap to clone; every view context holds its own handle over the same
/// directory, mirroring how each open view reads the same persisted state.
#[derive(Debug, Clone)]
pub struct LocalStore {
    data_dir: PathBuf,
}

impl LocalStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", key))
    }

    /// Read and parse a value. Missing key or corrupt JSON is `None`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.key_path(key);
        let content = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(value) => Some(value),
            Err(err) => {
                log::debug!("discarding corrupt value for key {:?}: {}", key, err);
                None
            }
        }
    }

    /// Serialize and persist a value, creating the namespace directory on
    /// first write.
    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> io::Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        let content = serde_json::to_string_pretty(value)?;
        fs::write(self.key_path(key), content)
    }

    /// Delete a key. Removing an absent key is not an error.
    pub fn remove(&self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.key_path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }
}
