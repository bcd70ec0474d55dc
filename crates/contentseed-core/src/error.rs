//! Error types shared by the content collaborators.

use std::path::PathBuf;

use thiserror::Error;

use crate::content::ContentId;
use crate::path::ContentPath;

/// Malformed content path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// Path does not start with `/`.
    #[error("Content path must be absolute: {path}")]
    NotAbsolute { path: String },

    /// A segment is empty or otherwise unusable.
    #[error("Invalid content path {path}: {reason}")]
    InvalidSegment { path: String, reason: &'static str },
}

/// Errors raised by a [`ContentStore`](crate::ContentStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// No content with the given id.
    #[error("Content not found: {id}")]
    NotFound { id: ContentId },

    /// A preassigned id is already taken.
    #[error("Content id already in use: {id}")]
    IdInUse { id: ContentId },

    /// A node already occupies the target path.
    #[error("Content already exists: {path}")]
    AlreadyExists { path: ContentPath },

    /// The parent of the target path does not exist.
    #[error("Parent not found for {path}")]
    ParentNotFound { path: ContentPath },

    /// The context's principals lack the required permission.
    #[error("Access denied: {permission} on {path}")]
    AccessDenied {
        path: ContentPath,
        permission: &'static str,
    },

    /// Invalid path in a request.
    #[error(transparent)]
    InvalidPath(#[from] PathError),

    /// Storage backend failure.
    #[error("Storage error: {message}")]
    Backend { message: String },
}

impl StoreError {
    /// Create a backend error from any message.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Fatal errors from an [`Importer`](crate::Importer).
///
/// Per-node problems are not errors here; they are collected in the
/// [`ImportResult`](crate::ImportResult).
#[derive(Debug, Error)]
pub enum ImportError {
    /// The bundled source does not exist.
    #[error("Import source not found: {path}")]
    SourceNotFound { path: PathBuf },

    /// The bundled source is not a directory.
    #[error("Import source is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// I/O failure reading the source.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Store failure outside of per-node creation (e.g. resolving the target).
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ImportError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::SourceNotFound { path },
            _ => Self::Io { path, source },
        }
    }
}

/// Failure to build a [`SeedContext`](crate::SeedContext).
#[derive(Debug, Error)]
pub enum ContextError {
    /// The request carried no principals.
    #[error("Execution context requires at least one principal")]
    NoPrincipals,

    /// The factory refused to elevate to the requested principals.
    #[error("Elevation to {principal} refused")]
    ElevationRefused { principal: String },
}

/// Invalid or unreadable configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Could not read the configuration file.
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema.
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A value failed validation.
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_error_io() {
        let err = ImportError::io(
            "/bundle/import",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(matches!(err, ImportError::SourceNotFound { .. }));
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::AlreadyExists {
            path: ContentPath::parse("/large-tree").unwrap(),
        };
        assert_eq!(err.to_string(), "Content already exists: /large-tree");
    }
}
