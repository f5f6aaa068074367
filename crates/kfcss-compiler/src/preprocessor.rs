/// Adapter around the external Sass preprocessor
///
/// The preprocessor is treated as a pure function from an entry file to CSS
/// text. Nothing here writes files.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{BuildError, Result};

/// Environment variable that overrides the preprocessor executable.
pub const SASS_ENV: &str = "KFCSS_SASS";

/// Something that turns a stylesheet source tree into plain CSS.
pub trait Preprocessor: Send + Sync {
    /// Compile `entry`, resolving imports against `load_paths`.
    ///
    /// Output must use the expanded style so rules can be scanned lexically.
    fn compile(&self, entry: &Path, load_paths: &[PathBuf]) -> Result<String>;
}

/// Compile `entry` with its own directory as the import search path.
pub fn compile_entry(preprocessor: &dyn Preprocessor, entry: &Path) -> Result<String> {
    let dir = match entry.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    preprocessor.compile(entry, &[dir])
}

/// Runs the `sass` command line compiler.
#[derive(Debug, Clone)]
pub struct SassCli {
    program: String,
}

impl SassCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Use `$KFCSS_SASS` if set, otherwise `sass` from `PATH`.
    pub fn from_env() -> Self {
        Self::new(std::env::var(SASS_ENV).unwrap_or_else(|_| "sass".to_string()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn args(entry: &Path, load_paths: &[PathBuf]) -> Vec<String> {
        let mut args = vec![
            "--style=expanded".to_string(),
            "--no-source-map".to_string(),
        ];
        for path in load_paths {
            args.push(format!("--load-path={}", path.display()));
        }
        args.push(entry.display().to_string());
        args
    }
}

impl Default for SassCli {
    fn default() -> Self {
        Self::from_env()
    }
}

impl Preprocessor for SassCli {
    fn compile(&self, entry: &Path, load_paths: &[PathBuf]) -> Result<String> {
        let output = Command::new(&self.program)
            .args(Self::args(entry, load_paths))
            .output()
            .map_err(|source| BuildError::Launch {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BuildError::compile(entry, stderr.trim()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
