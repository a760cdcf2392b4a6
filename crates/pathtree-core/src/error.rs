//! Error and warning types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading records.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Input file not found.
    #[error("Input not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record (or the whole document) was not valid JSON.
    #[error("Invalid record on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// The document parsed, but was neither an array nor a record stream.
    #[error("Expected a JSON array of records, found {found}")]
    NotAnArray { found: &'static str },
}

impl LoadError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }
}

/// Kind of build warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Relative path was deeper than the configured maximum.
    DepthExceeded,
    /// A sibling with the same id already existed.
    DuplicateId,
}

/// Non-fatal condition encountered while building a tree.
///
/// The plain `build` entry points drop these; they are only surfaced
/// through a [`TreeReport`](crate::TreeReport).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildWarning {
    /// Path of the record that was dropped.
    pub path: String,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl BuildWarning {
    /// Create a new build warning.
    pub fn new(path: impl Into<String>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Create a depth exceeded warning.
    pub fn depth_exceeded(path: impl Into<String>, segments: usize, max_depth: usize) -> Self {
        let path = path.into();
        let message = format!("{segments} segments below root exceeds max depth {max_depth}: {path}");
        Self::new(path, message, WarningKind::DepthExceeded)
    }

    /// Create a duplicate id warning.
    pub fn duplicate_id(path: impl Into<String>, id: &str) -> Self {
        let path = path.into();
        let message = format!("Sibling with id {id:?} already exists: {path}");
        Self::new(path, message, WarningKind::DuplicateId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_io() {
        let err = LoadError::io(
            "/test/records.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(matches!(err, LoadError::NotFound { .. }));

        let err = LoadError::io(
            "/test/records.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_build_warning_creation() {
        let warning = BuildWarning::depth_exceeded("r/a/b/c", 3, 2);
        assert_eq!(warning.kind, WarningKind::DepthExceeded);
        assert_eq!(warning.path, "r/a/b/c");
        assert!(warning.message.contains("max depth 2"));

        let warning = BuildWarning::duplicate_id("r/a", "r/a");
        assert_eq!(warning.kind, WarningKind::DuplicateId);
        assert_eq!(
            warning,
            BuildWarning::new(
                "r/a",
                "Sibling with id \"r/a\" already exists: r/a",
                WarningKind::DuplicateId,
            )
        );
    }
}
