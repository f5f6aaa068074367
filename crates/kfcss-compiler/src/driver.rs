/// Build driver that sequences compile -> mirror -> write

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use kfcss_mirror::{scan_breakpoints, default_breakpoints, Breakpoint, IgnoreSet, VariantMirror};
use tempfile::NamedTempFile;

use crate::error::{BuildError, Result};
use crate::preprocessor::{compile_entry, Preprocessor, SassCli};

/// File name of the plain compiled stylesheet.
pub const BASE_FILE: &str = "kf.css";
/// File name of the stylesheet with responsive variants appended.
pub const MIRRORED_FILE: &str = "kf-responsive.css";

/// Log at `info`, or at `debug` for quiet builds.
macro_rules! progress {
    ($quiet:expr, $($arg:tt)+) => {
        if $quiet {
            tracing::debug!($($arg)+)
        } else {
            tracing::info!($($arg)+)
        }
    };
}

/// Locations of the two artifacts a build writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub base: PathBuf,
    pub mirrored: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir(output_dir: impl AsRef<Path>) -> Self {
        let dir = output_dir.as_ref();
        Self {
            base: dir.join(BASE_FILE),
            mirrored: dir.join(MIRRORED_FILE),
        }
    }
}

/// Options for a single build
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Entry stylesheet (e.g. `src/main.scss`)
    pub entry: PathBuf,
    /// Directory receiving both artifacts; created if absent
    pub output_dir: PathBuf,
    /// Demote progress logging to `debug`
    pub quiet: bool,
}

impl BuildOptions {
    pub fn new(entry: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            entry: entry.into(),
            output_dir: output_dir.into(),
            quiet: false,
        }
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }
}

/// What the mirror did with a stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorSummary {
    /// Breakpoints used for generation, in order.
    pub breakpoints: Vec<Breakpoint>,
    /// False when the stylesheet declared none and the defaults were used.
    pub declared: bool,
    /// Rules emitted per breakpoint.
    pub counts: Vec<usize>,
}

/// Build output structure
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub paths: ArtifactPaths,
    /// Full content of the mirrored artifact
    pub css: String,
    pub summary: MirrorSummary,
    pub duration: Duration,
}

/// Runs the compile -> mirror -> write pipeline.
///
/// Not safe to run concurrently against the same output directory; callers
/// must serialize builds that share artifacts.
pub struct Builder {
    preprocessor: Arc<dyn Preprocessor>,
    mirror: VariantMirror,
}

impl Builder {
    pub fn new(preprocessor: Arc<dyn Preprocessor>) -> Self {
        Self {
            preprocessor,
            mirror: VariantMirror::new(),
        }
    }

    /// Replace the set of classes excluded from mirroring.
    pub fn ignore(mut self, ignore: IgnoreSet) -> Self {
        self.mirror = self.mirror.with_ignore(ignore);
        self
    }

    pub fn mirror(&self) -> &VariantMirror {
        &self.mirror
    }

    /// Run one build, overwriting both artifacts.
    pub fn build(&self, options: &BuildOptions) -> Result<BuildOutput> {
        let start = Instant::now();
        progress!(options.quiet, "Building from {}...", options.entry.display());

        let css = compile_entry(self.preprocessor.as_ref(), &options.entry).inspect_err(|e| {
            tracing::error!("Sass compilation error: {}", e);
        })?;

        let paths = ArtifactPaths::in_dir(&options.output_dir);
        std::fs::create_dir_all(&options.output_dir)
            .map_err(|e| BuildError::write(&options.output_dir, e))?;
        write_atomic(&paths.base, &css)?;

        let (mirrored, summary) = mirror_css(&self.mirror, &css);
        write_atomic(&paths.mirrored, &mirrored)?;

        let duration = start.elapsed();
        progress!(options.quiet, "Build complete in {}ms.", duration.as_millis());
        progress!(options.quiet, "  - Base: {}", paths.base.display());
        progress!(options.quiet, "  - Responsive: {}", paths.mirrored.display());

        Ok(BuildOutput {
            paths,
            css: mirrored,
            summary,
            duration,
        })
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new(Arc::new(SassCli::from_env()))
    }
}

/// Build with the default `sass` executable and ignore set.
pub fn build(entry: impl Into<PathBuf>, output_dir: impl Into<PathBuf>, quiet: bool) -> Result<BuildOutput> {
    Builder::default().build(&BuildOptions::new(entry, output_dir).quiet(quiet))
}

/// Extract breakpoints from `css` and append its responsive variants.
pub fn mirror_css(mirror: &VariantMirror, css: &str) -> (String, MirrorSummary) {
    let mut breakpoints = scan_breakpoints(css);
    let declared = !breakpoints.is_empty();
    if !declared {
        breakpoints = default_breakpoints();
    }

    let output = mirror.generate(css, &breakpoints);
    let mut mirrored = String::with_capacity(css.len() + output.generated.len());
    mirrored.push_str(css);
    mirrored.push_str(&output.generated);

    (
        mirrored,
        MirrorSummary {
            breakpoints,
            declared,
            counts: output.counts,
        },
    )
}

/// Mirror an already compiled stylesheet from `input` into `output`.
pub fn mirror_file(mirror: &VariantMirror, input: &Path, output: &Path) -> Result<MirrorSummary> {
    let css = std::fs::read_to_string(input)?;
    let (mirrored, summary) = mirror_css(mirror, &css);
    if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| BuildError::write(dir, e))?;
    }
    write_atomic(output, &mirrored)?;
    Ok(summary)
}

/// Replace `path` with `contents` via a sibling temp file and rename.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir).map_err(|e| BuildError::write(path, e))?;
    file.write_all(contents.as_bytes())
        .map_err(|e| BuildError::write(path, e))?;
    file.persist(path)
        .map_err(|e| BuildError::write(path, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_options_builder() {
        let opts = BuildOptions::new("src/main.scss", "dist").quiet(true);

        assert_eq!(opts.entry, PathBuf::from("src/main.scss"));
        assert_eq!(opts.output_dir, PathBuf::from("dist"));
        assert!(opts.quiet);
    }

    #[test]
    fn test_artifact_paths() {
        let paths = ArtifactPaths::in_dir("out");
        assert_eq!(paths.base, PathBuf::from("out/kf.css"));
        assert_eq!(paths.mirrored, PathBuf::from("out/kf-responsive.css"));
    }

    #[test]
    fn test_mirror_css_reports_defaults() {
        let (mirrored, summary) = mirror_css(&VariantMirror::new(), ".a { x: 1; }");
        assert!(!summary.declared);
        assert_eq!(summary.breakpoints, default_breakpoints());
        assert_eq!(summary.counts, vec![1, 1, 1]);
        assert!(mirrored.starts_with(".a { x: 1; }"));
    }

    #[test]
    fn test_mirror_css_reports_declared() {
        let (_, summary) = mirror_css(&VariantMirror::new(), ":root { --breakpoint-t: 500px; }");
        assert!(summary.declared);
        assert_eq!(summary.breakpoints, vec![Breakpoint::new("t", "500px")]);
        assert_eq!(summary.counts, vec![0]);
    }

    #[test]
    fn test_write_atomic_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.css");
        write_atomic(&path, "first").unwrap();
        write_atomic(&path, "second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
