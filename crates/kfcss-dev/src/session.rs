//! Per-session watch state.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use kfcss_compiler::BuildOptions;

use crate::paths::ResolvedPaths;

/// Where the dev loop is in its build cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Building,
    /// A build just failed; the loop logs and returns to `Idle`.
    Failed,
}

/// Identifies a completed build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildToken {
    /// Count of successful builds in this session, starting at 1.
    pub generation: u64,
    /// Completion time in milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
}

/// Decides whether a reported change should trigger a rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchFilter {
    roots: Vec<PathBuf>,
    extension: String,
    case_insensitive: bool,
}

impl WatchFilter {
    /// Accept `extension` files under any of `roots`. Case sensitivity
    /// follows the platform.
    pub fn new(roots: Vec<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            roots,
            extension: extension.into(),
            case_insensitive: cfg!(windows),
        }
    }

    pub fn case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.case_insensitive = case_insensitive;
        self
    }

    pub fn matches(&self, path: &Path) -> bool {
        let path = self.normalize(path);
        let under_root = self
            .roots
            .iter()
            .any(|root| path.starts_with(self.normalize(root)));

        under_root
            && path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| self.fold(ext) == self.fold(&self.extension))
    }

    fn normalize(&self, path: &Path) -> PathBuf {
        if self.case_insensitive {
            PathBuf::from(path.to_string_lossy().replace('\\', "/").to_lowercase())
        } else {
            path.to_path_buf()
        }
    }

    fn fold(&self, text: &str) -> String {
        if self.case_insensitive {
            text.to_lowercase()
        } else {
            text.to_string()
        }
    }
}

/// State held for the lifetime of one development session.
#[derive(Debug, Clone)]
pub struct WatchSession {
    paths: ResolvedPaths,
    real_watch_root: PathBuf,
    filter: WatchFilter,
    state: LoopState,
    last_build: Option<BuildToken>,
    failed_builds: u64,
}

impl WatchSession {
    /// `real_watch_root` is the watch root with symlinks resolved; pass the
    /// logical root again when it could not be resolved.
    pub fn new(paths: ResolvedPaths, real_watch_root: PathBuf) -> Self {
        let mut roots = vec![paths.watch_root.clone()];
        if real_watch_root != paths.watch_root {
            roots.push(real_watch_root.clone());
        }
        let filter = WatchFilter::new(roots, paths.extension.clone());

        Self {
            paths,
            real_watch_root,
            filter,
            state: LoopState::Idle,
            last_build: None,
            failed_builds: 0,
        }
    }

    pub fn paths(&self) -> &ResolvedPaths {
        &self.paths
    }

    pub fn real_watch_root(&self) -> &Path {
        &self.real_watch_root
    }

    pub fn filter(&self) -> &WatchFilter {
        &self.filter
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn last_build(&self) -> Option<BuildToken> {
        self.last_build
    }

    pub fn failed_builds(&self) -> u64 {
        self.failed_builds
    }

    pub fn build_options(&self, quiet: bool) -> BuildOptions {
        BuildOptions::new(&self.paths.entry, &self.paths.out_dir).quiet(quiet)
    }

    pub(crate) fn begin_build(&mut self) {
        self.state = LoopState::Building;
    }

    pub(crate) fn finish_build(&mut self) -> BuildToken {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        let token = BuildToken {
            generation: self.last_build.map_or(1, |t| t.generation + 1),
            timestamp_ms,
        };
        self.last_build = Some(token);
        self.state = LoopState::Idle;
        token
    }

    pub(crate) fn fail_build(&mut self) {
        self.state = LoopState::Failed;
        self.failed_builds += 1;
    }

    pub(crate) fn reset(&mut self) {
        self.state = LoopState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> WatchFilter {
        WatchFilter::new(
            vec![PathBuf::from("/app/kf-css/src"), PathBuf::from("/store/kf-css/src")],
            "scss",
        )
        .case_insensitive(false)
    }

    #[test]
    fn test_accepts_sources_under_either_root() {
        let f = filter();
        assert!(f.matches(Path::new("/app/kf-css/src/main.scss")));
        assert!(f.matches(Path::new("/app/kf-css/src/utils/_spacing.scss")));
        assert!(f.matches(Path::new("/store/kf-css/src/main.scss")));
    }

    #[test]
    fn test_rejects_other_extensions() {
        let f = filter();
        assert!(!f.matches(Path::new("/app/kf-css/src/notes.md")));
        assert!(!f.matches(Path::new("/app/kf-css/src/main.css")));
        assert!(!f.matches(Path::new("/app/kf-css/src/Makefile")));
    }

    #[test]
    fn test_rejects_paths_outside_roots() {
        let f = filter();
        assert!(!f.matches(Path::new("/app/src/app.scss")));
        assert!(!f.matches(Path::new("/app/kf-css/src-old/main.scss")));
        assert!(!f.matches(Path::new("/app/kf-css/dist/kf.scss")));
    }

    #[test]
    fn test_case_insensitive_matching() {
        let f = WatchFilter::new(vec![PathBuf::from("C:\\App\\kf-css\\src")], "scss").case_insensitive(true);
        assert!(f.matches(Path::new("c:/app/KF-CSS/src/Main.SCSS")));

        let strict = f.clone().case_insensitive(false);
        assert!(!strict.matches(Path::new("c:/app/KF-CSS/src/Main.SCSS")));
    }

    fn resolved() -> ResolvedPaths {
        ResolvedPaths {
            root: "/app".into(),
            entry: "/app/kf-css/src/main.scss".into(),
            out_dir: "/app/kf-css/dist".into(),
            watch_root: "/app/kf-css/src".into(),
            extension: "scss".into(),
        }
    }

    #[test]
    fn test_session_includes_real_root_in_filter() {
        let session = WatchSession::new(resolved(), "/store/kf-css/src".into());
        assert!(session.filter().matches(Path::new("/store/kf-css/src/a.scss")));
        assert!(session.filter().matches(Path::new("/app/kf-css/src/a.scss")));
    }

    #[test]
    fn test_build_tokens_increase() {
        let mut session = WatchSession::new(resolved(), "/app/kf-css/src".into());
        assert_eq!(session.last_build(), None);

        session.begin_build();
        assert_eq!(session.state(), LoopState::Building);
        let first = session.finish_build();
        let second = session.finish_build();
        assert_eq!(first.generation, 1);
        assert_eq!(second.generation, 2);
        assert!(second.timestamp_ms >= first.timestamp_ms);
        assert_eq!(session.state(), LoopState::Idle);
    }

    #[test]
    fn test_failed_build_counts() {
        let mut session = WatchSession::new(resolved(), "/app/kf-css/src".into());
        session.begin_build();
        session.fail_build();
        assert_eq!(session.state(), LoopState::Failed);
        session.reset();
        assert_eq!(session.state(), LoopState::Idle);
        assert_eq!(session.failed_builds(), 1);
        assert_eq!(session.last_build(), None);
    }
}
