//! Loader error types.
//!
//! Any error aborts the whole load. The one tolerated condition, a missing
//! directory, never becomes an error.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use rkt_config_schema::{RecordKind, SchemaError};

use super::normalize::CompositeKey;
use super::reader::ConfigDir;

/// Stable classification of a [`LoadError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// JSON parse failure, unknown version or kind, or a schema-rule violation
    MalformedRecord,
    /// Record kind disagrees with the directory it was found in
    MisplacedRecord,
    /// Two files in one layer normalise to the same composite key
    LayerConflict,
    /// Directory or file could not be read
    LayerLoadError,
    /// Credentials inconsistent with the record's type
    CredentialShape,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MalformedRecord => "MalformedRecord",
            ErrorKind::MisplacedRecord => "MisplacedRecord",
            ErrorKind::LayerConflict => "LayerConflict",
            ErrorKind::LayerLoadError => "LayerLoadError",
            ErrorKind::CredentialShape => "CredentialShape",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Configuration load errors
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("malformed record {}: {reason}", path.display())]
    MalformedRecord { path: PathBuf, reason: String },

    #[error("misplaced record {}: {actual} records do not belong in {expected}", path.display())]
    MisplacedRecord {
        path: PathBuf,
        expected: ConfigDir,
        actual: RecordKind,
    },

    #[error("conflicting {key}: declared by both {} and {}", first.display(), second.display())]
    LayerConflict {
        key: CompositeKey,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("failed to load {}: {source}", path.display())]
    LayerLoadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid credentials in {}: {reason}", path.display())]
    CredentialShape { path: PathBuf, reason: String },
}

impl LoadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LoadError::MalformedRecord { .. } => ErrorKind::MalformedRecord,
            LoadError::MisplacedRecord { .. } => ErrorKind::MisplacedRecord,
            LoadError::LayerConflict { .. } => ErrorKind::LayerConflict,
            LoadError::LayerLoadError { .. } => ErrorKind::LayerLoadError,
            LoadError::CredentialShape { .. } => ErrorKind::CredentialShape,
        }
    }

    /// The file or directory the error is about. For a conflict, the
    /// second file.
    pub fn path(&self) -> &Path {
        match self {
            LoadError::MalformedRecord { path, .. }
            | LoadError::MisplacedRecord { path, .. }
            | LoadError::LayerLoadError { path, .. }
            | LoadError::CredentialShape { path, .. } => path,
            LoadError::LayerConflict { second, .. } => second,
        }
    }

    pub(crate) fn from_schema(path: &Path, err: SchemaError) -> Self {
        if err.is_credential_shape() {
            LoadError::CredentialShape {
                path: path.to_path_buf(),
                reason: err.to_string(),
            }
        } else {
            LoadError::MalformedRecord {
                path: path.to_path_buf(),
                reason: err.to_string(),
            }
        }
    }

    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        LoadError::LayerLoadError {
            path: path.to_path_buf(),
            source,
        }
    }
}
