use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::{Error, KeyValueStore};

/// A [`KeyValueStore`] persisted as a single JSON object on disk.
///
/// The file is read once on open. Every mutation rewrites it through a
/// temporary file in the same directory followed by a rename, so a crash
/// leaves either the old or the new contents.
#[derive(Debug)]
pub struct LocalDiskStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl LocalDiskStore {
    /// Open the store at `path`, creating it on first write if missing.
    ///
    /// The containing directory must exist and be writable.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let dir = Self::containing_dir(&path);

        let attr = fs::metadata(&dir).map_err(|error| Error::InvalidPath {
            path: path.clone(),
            message: error.to_string(),
        })?;
        if !attr.is_dir() {
            return Err(Error::InvalidPath {
                path,
                message: "Containing path must be a directory".to_string(),
            });
        }
        if attr.permissions().readonly() {
            return Err(Error::InvalidPath {
                path,
                message: "Containing directory must be writable".to_string(),
            });
        }

        let entries = if path.exists() {
            log::debug!("Reading {}...", path.display());
            let contents = fs::read_to_string(&path)?;
            if contents.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&contents)?
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn containing_dir(path: &Path) -> PathBuf {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    fn persist(&self) -> Result<(), Error> {
        log::debug!("Writing {}...", self.path.display());

        let mut file = NamedTempFile::new_in(Self::containing_dir(&self.path))?;
        serde_json::to_writer_pretty(&mut file, &self.entries)?;
        file.write_all(b"\n")?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|error| Error::Io(error.error))?;
        Ok(())
    }

    /// Persist the change just made to `key`, putting `previous` back if the
    /// write fails. Memory never holds what the file does not.
    fn persist_or_revert(&mut self, key: &str, previous: Option<String>) -> Result<(), Error> {
        let result = self.persist();
        if result.is_err() {
            match previous {
                Some(value) => self.entries.insert(key.to_string(), value),
                None => self.entries.remove(key),
            };
        }
        result
    }
}

impl KeyValueStore for LocalDiskStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Error> {
        let previous = self.entries.insert(key.to_string(), value.to_string());
        if previous.as_deref() == Some(value) {
            return Ok(());
        }
        self.persist_or_revert(key, previous)
    }

    fn remove(&mut self, key: &str) -> Result<(), Error> {
        match self.entries.remove(key) {
            Some(previous) => self.persist_or_revert(key, Some(previous)),
            None => Ok(()),
        }
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}
