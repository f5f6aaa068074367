//! Session start-up: path resolution, the initial build, and watch
//! registration with the host.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use kfcss_compiler::{BuildError, BuildOptions, BuildOutput, Builder, Preprocessor};

use crate::config::PluginOptions;
use crate::devloop::DevLoop;
use crate::error::DevError;
use crate::host::HostSession;
use crate::paths::{FsProbe, ResolvedPaths};
use crate::session::WatchSession;

/// Name the plugin registers under.
pub const PLUGIN_NAME: &str = "kf-css-automator";
/// Import id that resolves to the mirrored stylesheet.
pub const VIRTUAL_ID: &str = "virtual:kf-css";

pub struct KfCssPlugin {
    paths: ResolvedPaths,
    builder: Arc<Builder>,
}

impl KfCssPlugin {
    /// Resolve paths for a project rooted at `root`.
    pub fn new(
        root: &Path,
        options: &PluginOptions,
        probe: &dyn FsProbe,
        preprocessor: Arc<dyn Preprocessor>,
    ) -> Self {
        let builder = Builder::new(preprocessor).ignore(options.ignore_set());
        Self {
            paths: ResolvedPaths::resolve(root, options, probe),
            builder: Arc::new(builder),
        }
    }

    pub fn name(&self) -> &'static str {
        PLUGIN_NAME
    }

    pub fn paths(&self) -> &ResolvedPaths {
        &self.paths
    }

    pub fn builder(&self) -> &Arc<Builder> {
        &self.builder
    }

    /// Map the virtual import to the mirrored artifact.
    pub fn resolve_id(&self, id: &str) -> Option<PathBuf> {
        (id == VIRTUAL_ID).then(|| self.paths.artifacts().mirrored)
    }

    /// Run one build outside the async runtime.
    pub async fn build(&self, quiet: bool) -> Result<BuildOutput, DevError> {
        let builder = Arc::clone(&self.builder);
        let options = BuildOptions::new(&self.paths.entry, &self.paths.out_dir).quiet(quiet);
        let output = tokio::task::spawn_blocking(move || builder.build(&options))
            .await
            .map_err(|e| BuildError::Io(std::io::Error::other(e)))??;
        Ok(output)
    }

    /// Start a session against `host`.
    ///
    /// Fails only when the entry file is missing or the host refuses a
    /// subscription. A failing initial build is logged and the session
    /// starts anyway.
    pub async fn start<H: HostSession>(&self, host: Arc<H>) -> Result<DevLoop<H>, DevError> {
        if !self.paths.entry.is_file() {
            tracing::error!("[kf-css] Entry file not found: {}", self.paths.entry.display());
            return Err(DevError::EntryNotFound(self.paths.entry.clone()));
        }

        if let Err(e) = self.build(false).await {
            tracing::error!("[kf-css] Initial build failed: {}", e);
        }

        let watch_root = &self.paths.watch_root;
        let real_watch_root = std::fs::canonicalize(watch_root).unwrap_or_else(|_| watch_root.clone());

        host.watch(watch_root)
            .map_err(|e| DevError::watch(watch_root, e))?;
        tracing::info!("[kf-css] Watching: {}", watch_root.display());

        if real_watch_root != *watch_root {
            host.watch(&real_watch_root)
                .map_err(|e| DevError::watch(&real_watch_root, e))?;
            tracing::info!("[kf-css] Resolved watch path: {}", real_watch_root.display());
        }

        let session = WatchSession::new(self.paths.clone(), real_watch_root);
        Ok(DevLoop::new(session, host, Arc::clone(&self.builder)))
    }
}
