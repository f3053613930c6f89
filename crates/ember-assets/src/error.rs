//! Asset cache failures.
//!
//! Most cache operations recover locally and report through logs; these
//! errors surface from loaders and from the fallible handler lookup.

use std::fmt;
use std::path::PathBuf;

use crate::policy::LoadStyle;

#[derive(Debug)]
pub enum AssetError {
    /// Neither a file nor a memory buffer exists under this name.
    NotFound { path: String },

    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// `get_handler` was asked for a type nobody registered.
    NoHandler { type_name: &'static str },

    /// A second handler for the same asset type.
    DuplicateHandler { type_name: &'static str },

    UnknownAsset { id: String },

    /// The bytes were read but did not decode into the asset type.
    LoaderError { path: String, message: String },

    /// A memory load found a zero-length buffer.
    EmptyBuffer { id: String },

    /// The loader has no strategy for `style`.
    Unsupported { id: String, style: LoadStyle },
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::NotFound { path } => write!(f, "'{}' does not exist", path),
            AssetError::IoError { path, source } => {
                write!(f, "reading '{}' failed: {}", path.display(), source)
            }
            AssetError::NoHandler { type_name } => {
                write!(f, "no {} handler is registered", type_name)
            }
            AssetError::DuplicateHandler { type_name } => {
                write!(f, "a {} handler is already registered", type_name)
            }
            AssetError::UnknownAsset { id } => write!(f, "no record for '{}'", id),
            AssetError::LoaderError { path, message } => {
                write!(f, "could not decode '{}': {}", path, message)
            }
            AssetError::EmptyBuffer { id } => write!(f, "memory buffer for '{}' is empty", id),
            AssetError::Unsupported { id, style } => {
                write!(f, "'{}' cannot be loaded from {:?}", id, style)
            }
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssetError::IoError { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for AssetError {
    fn from(source: std::io::Error) -> Self {
        AssetError::IoError {
            path: PathBuf::new(),
            source,
        }
    }
}

pub type AssetResult<T> = Result<T, AssetError>;
