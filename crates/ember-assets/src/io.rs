//! Byte sources for asset loading.

use std::path::{Path, PathBuf};

use ember_core::alloc::HashMap;

use crate::error::{AssetError, AssetResult};

/// Reads asset files relative to a base directory.
#[derive(Debug, Clone)]
pub struct FileReader {
    base_path: PathBuf,
}

impl Default for FileReader {
    fn default() -> Self {
        Self::new(".")
    }
}

impl FileReader {
    /// Create a new file reader with a base path.
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve a path relative to the base path.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }

    pub fn read_bytes(&self, path: &Path) -> AssetResult<Vec<u8>> {
        let full_path = self.resolve_path(path);
        std::fs::read(&full_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AssetError::NotFound {
                    path: full_path.display().to_string(),
                }
            } else {
                AssetError::IoError {
                    path: full_path.clone(),
                    source: e,
                }
            }
        })
    }

    pub fn exists(&self, path: &Path) -> bool {
        self.resolve_path(path).exists()
    }
}

/// In-memory buffers for assets loaded with [`LoadStyle::Memory`](crate::LoadStyle::Memory).
#[derive(Debug, Default)]
pub struct MemoryReader {
    buffers: HashMap<String, Vec<u8>>,
}

impl MemoryReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl AsRef<str>, bytes: Vec<u8>) {
        self.buffers.insert(key.as_ref().to_string(), bytes);
    }

    pub fn insert_static(&mut self, key: impl AsRef<str>, bytes: &'static [u8]) {
        self.insert(key, bytes.to_vec());
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<u8>> {
        self.buffers.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.buffers.contains_key(key)
    }

    /// Returns the buffer for `key`. Missing and zero-length buffers are
    /// both errors.
    pub fn read_bytes(&self, key: &str) -> AssetResult<&[u8]> {
        match self.buffers.get(key) {
            None => Err(AssetError::NotFound {
                path: key.to_string(),
            }),
            Some(bytes) if bytes.is_empty() => Err(AssetError::EmptyBuffer {
                id: key.to_string(),
            }),
            Some(bytes) => Ok(bytes),
        }
    }
}
