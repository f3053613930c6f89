use std::fmt;

use ember_assets::AssetError;
use ember_core::logging::LoggingError;
use ember_entity::EntityError;

/// Errors surfaced by the application shell.
#[derive(Debug)]
pub enum GameError {
    Asset(AssetError),
    Entity(EntityError),
    Logging(LoggingError),
    /// The platform could not open its window or device.
    Platform { message: String },
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::Asset(e) => write!(f, "Asset error: {}", e),
            GameError::Entity(e) => write!(f, "Entity error: {}", e),
            GameError::Logging(e) => write!(f, "Logging error: {}", e),
            GameError::Platform { message } => write!(f, "Platform error: {}", message),
        }
    }
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GameError::Asset(e) => Some(e),
            GameError::Entity(e) => Some(e),
            GameError::Logging(e) => Some(e),
            GameError::Platform { .. } => None,
        }
    }
}

impl From<AssetError> for GameError {
    fn from(e: AssetError) -> Self {
        GameError::Asset(e)
    }
}

impl From<EntityError> for GameError {
    fn from(e: EntityError) -> Self {
        GameError::Entity(e)
    }
}

impl From<LoggingError> for GameError {
    fn from(e: LoggingError) -> Self {
        GameError::Logging(e)
    }
}

pub type GameResult<T> = Result<T, GameError>;
