use super::KvStore;
use crate::error::StoreError;
use anyhow::Context;
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

/// Key/value store keeping one pretty-printed JSON file per key inside a
/// single directory. Keys are restricted to `[A-Za-z0-9_-]` by the
/// repository layer, so they map to filenames directly.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Default data directory, `~/.daybook`
    pub fn default_dir() -> anyhow::Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".daybook"))
    }

    /// Open the store at the default data directory
    pub fn open_default() -> anyhow::Result<Self> {
        let dir = Self::default_dir()?;
        Self::open(&dir).with_context(|| format!("Failed to open store at {}", dir.display()))
    }

    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&text)?))
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(&value)?;

        // Write to a temp file in the same directory, then rename over the
        // target so readers never observe a half-written record.
        let mut temp = NamedTempFile::new_in(&self.dir)?;
        temp.write_all(text.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(self.path_for(key))
            .map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}
