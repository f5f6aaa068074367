//! Errors raised while starting or running a dev session.

use std::path::PathBuf;

use kfcss_compiler::BuildError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DevError {
    /// The entry stylesheet does not exist. Fatal at session start.
    #[error("Entry file not found: {0}")]
    EntryNotFound(PathBuf),

    #[error("Invalid configuration in {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("Failed to watch {path}: {message}")]
    Watch { path: PathBuf, message: String },

    #[error(transparent)]
    Build(#[from] BuildError),
}

impl DevError {
    pub fn config(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        DevError::Config {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn watch(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        DevError::Watch {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
