use std::path::{Path, PathBuf};

use crate::types::PhoneDbError;
use thiserror::Error;

/// Failures of the inspection commands (`verify`, `stats`).
#[derive(Debug, Error)]
pub enum AdminError {
    /// Nothing exists at the path; inspection never creates files.
    #[error("no phonebook at {0}")]
    MissingDatabase(PathBuf),
    /// The path exists but names a directory or other non-file.
    #[error("{0} is not a regular file")]
    NotAFile(PathBuf),
    /// Error raised by the record store itself.
    #[error(transparent)]
    Core(#[from] PhoneDbError),
    /// Filesystem error while probing the path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result alias for inspection commands.
pub type Result<T> = std::result::Result<T, AdminError>;

impl AdminError {
    pub(crate) fn missing_database(path: impl AsRef<Path>) -> Self {
        AdminError::MissingDatabase(path.as_ref().to_path_buf())
    }
}
