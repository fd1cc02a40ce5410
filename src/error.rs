//! Error taxonomy for locale store operations.
//!
//! Every failure carries a machine-readable [`ErrorKind`] and a human-readable
//! message. None of them are fatal to the serving process.

use serde::Serialize;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Machine-readable classification of a [`LocaleError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ValidationError,
    AuthorizationError,
    NotFound,
    ParseError,
    Conflict,
    StorageError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "validation_error",
            ErrorKind::AuthorizationError => "authorization_error",
            ErrorKind::NotFound => "not_found",
            ErrorKind::ParseError => "parse_error",
            ErrorKind::Conflict => "conflict",
            ErrorKind::StorageError => "storage_error",
        }
    }
}

#[derive(Debug, Error)]
pub enum LocaleError {
    #[error("invalid folder: '{0}'")]
    InvalidFolder(String),

    #[error("invalid language code: '{0}' (expected two letters a-z)")]
    InvalidLanguageCode(String),

    #[error("invalid filename: '{0}' is empty after removing disallowed characters")]
    InvalidFilename(String),

    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error("access denied: path resolves outside the locales directory")]
    PathOutsideBase,

    #[error("locale file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("language '{0}' already exists")]
    LanguageAlreadyExists(String),

    #[error("failed to {action} {}: {source}", .path.display())]
    Storage {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LocaleError {
    /// Wrap an I/O failure with the action being attempted and the path involved.
    pub fn storage(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        LocaleError::Storage {
            action,
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            LocaleError::InvalidFolder(_)
            | LocaleError::InvalidLanguageCode(_)
            | LocaleError::InvalidFilename(_)
            | LocaleError::InvalidBody(_) => ErrorKind::ValidationError,
            LocaleError::PathOutsideBase => ErrorKind::AuthorizationError,
            LocaleError::FileNotFound(_) => ErrorKind::NotFound,
            LocaleError::Parse { .. } => ErrorKind::ParseError,
            LocaleError::LanguageAlreadyExists(_) => ErrorKind::Conflict,
            LocaleError::Storage { .. } => ErrorKind::StorageError,
        }
    }
}

pub type LocaleResult<T> = std::result::Result<T, LocaleError>;
