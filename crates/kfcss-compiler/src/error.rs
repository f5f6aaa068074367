/// Error types for the kfcss build pipeline

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BuildError>;

#[derive(Error, Debug)]
pub enum BuildError {
    /// The preprocessor rejected the source. The message is its diagnostic, verbatim.
    #[error("Sass compilation failed for {entry}: {message}")]
    Compile { entry: PathBuf, message: String },

    #[error("Failed to launch preprocessor '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BuildError {
    pub fn compile(entry: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        BuildError::Compile {
            entry: entry.into(),
            message: message.into(),
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BuildError::Write {
            path: path.into(),
            source,
        }
    }

    /// Short name of the pipeline stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            BuildError::Compile { .. } | BuildError::Launch { .. } => "compile",
            BuildError::Write { .. } | BuildError::Io(_) => "write",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_message_is_verbatim() {
        let err = BuildError::compile("src/main.scss", "Error: expected \";\".");
        assert_eq!(
            err.to_string(),
            "Sass compilation failed for src/main.scss: Error: expected \";\"."
        );
        assert_eq!(err.stage(), "compile");
    }

    #[test]
    fn test_write_stage() {
        let err = BuildError::write("dist/kf.css", std::io::Error::other("disk full"));
        assert_eq!(err.stage(), "write");
        assert!(err.to_string().contains("dist/kf.css"));
    }
}
