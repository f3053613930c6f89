//! Logging setup built on `tracing-subscriber`.
//!
//! Every crate logs through the `tracing` macros; this module only decides
//! where the output goes. `RUST_LOG` overrides the default directives.

use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Default filter directives used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info,ember=debug";

#[derive(Debug)]
pub enum LoggingError {
    /// A global subscriber was installed before this call.
    AlreadyInitialized,
    /// The log file could not be created.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl fmt::Display for LoggingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggingError::AlreadyInitialized => write!(f, "logging is already initialized"),
            LoggingError::Io { path, source } => {
                write!(f, "cannot open log file '{}': {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for LoggingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoggingError::Io { source, .. } => Some(source),
            LoggingError::AlreadyInitialized => None,
        }
    }
}

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Installs a stdout subscriber with [`DEFAULT_FILTER`].
pub fn init() -> Result<(), LoggingError> {
    init_with_filter(DEFAULT_FILTER)
}

pub fn init_with_filter(filter: &str) -> Result<(), LoggingError> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(filter))
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)
}

/// Installs a subscriber that appends plain-text records to `path`.
pub fn init_to_file(path: impl AsRef<Path>, filter: &str) -> Result<(), LoggingError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| LoggingError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(filter))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)?;

    tracing::info!("logging to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_reports_already_initialized() {
        // The first call may race with other tests, the second never succeeds.
        let _ = init_with_filter("warn");
        assert!(matches!(
            init_with_filter("warn"),
            Err(LoggingError::AlreadyInitialized)
        ));
    }

    #[test]
    fn file_logger_reports_bad_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing").join("game.log");
        let err = init_to_file(&missing, "info").unwrap_err();
        assert!(matches!(err, LoggingError::Io { .. }));
        assert!(err.to_string().contains("game.log"));
    }
}
