/// kfcss build pipeline
///
/// Compiles a Sass entry point to CSS, appends breakpoint-scoped variants of
/// every single-class rule, and writes both stylesheets to disk.

pub mod driver;
pub mod error;
pub mod preprocessor;

pub use driver::{
    build, mirror_css, mirror_file, ArtifactPaths, BuildOptions, BuildOutput, Builder,
    MirrorSummary, BASE_FILE, MIRRORED_FILE,
};
pub use error::{BuildError, Result};
pub use preprocessor::{compile_entry, Preprocessor, SassCli, SASS_ENV};
