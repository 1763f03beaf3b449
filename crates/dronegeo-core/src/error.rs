//! Error taxonomy shared by every dronegeo component.

use std::path::PathBuf;

use thiserror::Error;

use crate::geotag::TagKey;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GeoError>;

/// Error types for geotag extraction, projection and persistence.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    /// The photo carries no EXIF container at all.
    #[error("No metadata in {0}")]
    MissingMetadata(String),

    /// A GPS sub-table exists but a required key is absent or mistyped.
    #[error("Malformed GPS block: missing or invalid {key}")]
    MalformedGpsBlock { key: TagKey },

    /// Folder or file does not exist.
    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    /// The computation is undefined for the given input (e.g. at a pole).
    #[error("Domain error: {0}")]
    Domain(String),

    /// Camera geometry or image dimensions are unusable.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// The photo was readable but has no GPS fix to project from.
    #[error("No GPS fix in {0}")]
    MissingGpsFix(String),

    /// Writing or reading a record set failed.
    #[error("Failed to persist {}: {reason}", .path.display())]
    Persistence { path: PathBuf, reason: String },

    /// I/O error while reading a photo or listing a folder.
    #[error("I/O error at {}: {reason}", .path.display())]
    Io { path: PathBuf, reason: String },

    /// The EXIF container is present but unreadable.
    #[error("EXIF error: {0}")]
    Exif(String),

    /// Image dimensions could not be determined.
    #[error("Image error: {0}")]
    Image(String),

    /// Configuration could not be parsed or is inconsistent.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl GeoError {
    pub(crate) fn io(path: impl Into<PathBuf>, err: impl ToString) -> Self {
        GeoError::Io {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    pub(crate) fn persistence(path: impl Into<PathBuf>, err: impl ToString) -> Self {
        GeoError::Persistence {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    /// True for the "nothing to read" outcomes that batch callers treat as empty results.
    pub fn is_missing_data(&self) -> bool {
        matches!(
            self,
            GeoError::MissingMetadata(_) | GeoError::MissingGpsFix(_)
        )
    }
}
