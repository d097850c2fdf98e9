//! Photo file storage behind the media workflow.
//!
//! Files live flat under one root directory and are addressed by a key, the
//! generated file name. The public reference stored on a media row is the
//! key under [`PHOTO_URL_PREFIX`].

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Public URL prefix of stored photos; `/media` is served from the media root.
pub const PHOTO_URL_PREFIX: &str = "/media/gallery/";

pub fn photo_url(key: &str) -> String {
    format!("{}{}", PHOTO_URL_PREFIX, key)
}

/// Extracts the storage key from a stored photo reference.
pub fn key_from_photo_url(file_path: &str) -> Option<&str> {
    file_path
        .strip_prefix(PHOTO_URL_PREFIX)
        .filter(|key| is_valid_key(key))
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key != "."
        && !key.contains("..")
        && !key.contains('/')
        && !key.contains('\\')
}

fn invalid_key(key: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, format!("invalid media key '{}'", key))
}

pub trait MediaFileStore: Send + Sync {
    fn root_exists(&self) -> bool;
    fn create_root(&self) -> io::Result<()>;
    /// Writes a new file. Fails if a file with this key already exists.
    fn write_file(&self, key: &str, bytes: &[u8]) -> io::Result<PathBuf>;
    /// Returns false when there was nothing to delete.
    fn delete_file(&self, key: &str) -> io::Result<bool>;
    fn file_exists(&self, key: &str) -> bool;
    fn list_files(&self) -> io::Result<Vec<String>>;
}

/// File store rooted at a directory on the local disk.
#[derive(Debug, Clone)]
pub struct LocalMediaStore {
    root: PathBuf,
}

impl LocalMediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalMediaStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> io::Result<PathBuf> {
        if is_valid_key(key) {
            Ok(self.root.join(key))
        } else {
            Err(invalid_key(key))
        }
    }
}

impl MediaFileStore for LocalMediaStore {
    fn root_exists(&self) -> bool {
        self.root.is_dir()
    }

    fn create_root(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root)
    }

    fn write_file(&self, key: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let path = self.path_for(key)?;
        let mut file = OpenOptions::new().write(true).create_new(true).open(&path)?;
        if let Err(e) = file.write_all(bytes).and_then(|_| file.sync_all()) {
            drop(file);
            let _ = fs::remove_file(&path);
            return Err(e);
        }
        Ok(path)
    }

    fn delete_file(&self, key: &str) -> io::Result<bool> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn file_exists(&self, key: &str) -> bool {
        self.path_for(key).map(|p| p.is_file()).unwrap_or(false)
    }

    fn list_files(&self) -> io::Result<Vec<String>> {
        if !self.root_exists() {
            return Ok(Vec::new());
        }
        let mut keys = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = entry.map_err(io::Error::from)?;
            if entry.file_type().is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    keys.push(name.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// A photo file that could not be removed after its record was gone, or
/// after a failed insert. Left for reconciliation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("could not remove media file '{path}': {reason}")]
pub struct StorageCleanupFailed {
    pub path: String,
    pub reason: String,
}

/// What happened to the backing file when a media item was deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileCleanup {
    /// Videos have no local file.
    NotRequired,
    Removed,
    AlreadyMissing,
    Failed(StorageCleanupFailed),
}
