//! Base directory detection and path resolution.
//!
//! Detection only asks questions through [`FsProbe`], so it can be driven by
//! an in-memory table in tests.

use std::path::{Path, PathBuf};

use kfcss_compiler::ArtifactPaths;
use serde::Deserialize;

use crate::config::PluginOptions;

/// Package name the library is published and vendored under.
pub const PACKAGE_NAME: &str = "kf-css";
/// Where the library lives inside a SvelteKit project.
pub const SVELTEKIT_DIR: &str = "src/lib/kf-css";
/// Source extension watched when none is configured.
pub const DEFAULT_EXTENSION: &str = "scss";

/// Read-only filesystem queries used during detection.
pub trait FsProbe {
    fn exists(&self, path: &Path) -> bool;
    fn read_to_string(&self, path: &Path) -> Option<String>;
}

/// [`FsProbe`] backed by the real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl FsProbe for RealFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_to_string(&self, path: &Path) -> Option<String> {
        std::fs::read_to_string(path).ok()
    }
}

#[derive(Deserialize)]
struct PackageManifest {
    name: Option<String>,
}

/// Find the library directory relative to `root`, trying conventional
/// locations in order:
///
/// 1. `src/lib/kf-css` in a SvelteKit project (`svelte.config.js` present)
/// 2. `.` when `package.json` names this package (developing the library)
/// 3. `kf-css` vendored at the root
/// 4. `node_modules/kf-css`
pub fn detect_base_dir(root: &Path, probe: &dyn FsProbe) -> Option<PathBuf> {
    if probe.exists(&root.join("svelte.config.js")) && probe.exists(&root.join(SVELTEKIT_DIR)) {
        return Some(PathBuf::from(SVELTEKIT_DIR));
    }

    let is_own_package = probe
        .read_to_string(&root.join("package.json"))
        .and_then(|text| serde_json::from_str::<PackageManifest>(&text).ok())
        .and_then(|manifest| manifest.name)
        .is_some_and(|name| name == PACKAGE_NAME);
    if is_own_package {
        return Some(PathBuf::from("."));
    }

    if probe.exists(&root.join(PACKAGE_NAME)) {
        return Some(PathBuf::from(PACKAGE_NAME));
    }

    let installed = Path::new("node_modules").join(PACKAGE_NAME);
    if probe.exists(&root.join(&installed)) {
        return Some(installed);
    }

    None
}

/// Cut a watch pattern back to the directory before its first glob.
fn watch_dir(pattern: &Path) -> PathBuf {
    let text = pattern.to_string_lossy();
    match text.find('*') {
        Some(at) => PathBuf::from(text[..at].trim_end_matches(['/', '\\'])),
        None => pattern.to_path_buf(),
    }
}

/// Absolute locations used by a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub root: PathBuf,
    pub entry: PathBuf,
    pub out_dir: PathBuf,
    pub watch_root: PathBuf,
    pub extension: String,
}

impl ResolvedPaths {
    pub fn resolve(root: &Path, options: &PluginOptions, probe: &dyn FsProbe) -> Self {
        let base = options
            .base_dir
            .clone()
            .or_else(|| detect_base_dir(root, probe))
            .unwrap_or_else(|| PathBuf::from(PACKAGE_NAME));
        tracing::debug!("Using base directory {}", base.display());

        let entry = options
            .entry
            .clone()
            .unwrap_or_else(|| base.join("src").join("main.scss"));
        let out_dir = options.out_dir.clone().unwrap_or_else(|| base.join("dist"));
        let watch = options
            .watch
            .as_deref()
            .map(watch_dir)
            .unwrap_or_else(|| base.join("src"));

        Self {
            root: root.to_path_buf(),
            entry: root.join(entry),
            out_dir: root.join(out_dir),
            watch_root: root.join(watch),
            extension: options
                .extension
                .clone()
                .unwrap_or_else(|| DEFAULT_EXTENSION.to_string()),
        }
    }

    pub fn artifacts(&self) -> ArtifactPaths {
        ArtifactPaths::in_dir(&self.out_dir)
    }
}
