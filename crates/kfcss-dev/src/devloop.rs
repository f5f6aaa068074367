//! The watch -> rebuild -> propagate loop.
//!
//! Change events arrive on a channel and are consumed by a single task, so
//! at most one build per session is ever in flight. Events that arrive while
//! a build runs are drained afterwards and coalesced into at most one more
//! build.
//!
//! Build failures are logged and never end the loop; the artifacts on disk
//! stay whatever the last successful build produced.

use std::path::Path;
use std::sync::Arc;

use kfcss_compiler::{BuildOutput, Builder};
use tokio::sync::mpsc::error::TryRecvError;

use crate::host::{ChangeEvent, ChangeReceiver, HmrPayload, HostSession};
use crate::session::{BuildToken, WatchSession};

/// A running development session bound to one host.
pub struct DevLoop<H: HostSession> {
    session: WatchSession,
    host: Arc<H>,
    builder: Arc<Builder>,
}

impl<H: HostSession> DevLoop<H> {
    pub fn new(session: WatchSession, host: Arc<H>, builder: Arc<Builder>) -> Self {
        Self {
            session,
            host,
            builder,
        }
    }

    pub fn session(&self) -> &WatchSession {
        &self.session
    }

    /// Consume change events until every sender is dropped, then hand back
    /// the final session state.
    pub async fn run(mut self, mut events: ChangeReceiver) -> WatchSession {
        while let Some(event) = events.recv().await {
            if !self.is_relevant(&event) {
                continue;
            }

            let name = event
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            tracing::info!("[kf-css] Change detected: {}", name);

            loop {
                self.rebuild().await;

                if !self.drain_pending(&mut events) {
                    break;
                }
                tracing::debug!("[kf-css] Changes arrived during build, rebuilding once more");
            }
        }

        tracing::info!("[kf-css] Change stream closed, dev loop stopped");
        self.session
    }

    fn is_relevant(&self, event: &ChangeEvent) -> bool {
        let relevant = self.session.filter().matches(&event.path);
        if !relevant {
            tracing::trace!("[kf-css] Ignoring change: {}", event.path.display());
        }
        relevant
    }

    /// Empty the queue without waiting. Returns whether any queued event
    /// qualified for a rebuild.
    fn drain_pending(&self, events: &mut ChangeReceiver) -> bool {
        let mut pending = false;
        loop {
            match events.try_recv() {
                Ok(event) => pending |= self.is_relevant(&event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return pending,
            }
        }
    }

    /// Run one quiet build off the async runtime and propagate the result.
    async fn rebuild(&mut self) {
        self.session.begin_build();

        let builder = Arc::clone(&self.builder);
        let options = self.session.build_options(true);
        let result = tokio::task::spawn_blocking(move || builder.build(&options)).await;

        match result {
            Ok(Ok(output)) => {
                let token = self.session.finish_build();
                self.propagate(&output, token);
            }
            Ok(Err(e)) => {
                self.session.fail_build();
                tracing::error!(stage = e.stage(), "[kf-css] Rebuild failed: {}", e);
                self.session.reset();
            }
            Err(e) => {
                self.session.fail_build();
                tracing::error!("[kf-css] Rebuild task failed: {}", e);
                self.session.reset();
            }
        }
    }

    /// Invalidate the generated stylesheet in the host's module graph, or
    /// ask for a full reload when the host has not loaded it.
    fn propagate(&self, output: &BuildOutput, token: BuildToken) {
        let target = output.paths.mirrored.as_path();
        let real = std::fs::canonicalize(target).ok();
        tracing::debug!("[kf-css] HMR target: {}", target.display());

        let module = self.host.module_by_id(target).or_else(|| {
            real.as_deref()
                .filter(|real| *real != target)
                .and_then(|real: &Path| {
                    tracing::debug!("[kf-css] HMR target (real): {}", real.display());
                    self.host.module_by_id(real)
                })
        });

        match module {
            Some(module) => {
                tracing::info!("[kf-css] Invalidating module in graph...");
                self.host.invalidate_module(&module);
                self.host
                    .send(HmrPayload::module_update(&module.url, token.timestamp_ms));
                tracing::info!("[kf-css] HMR update triggered.");
            }
            None => {
                tracing::info!("[kf-css] Module not found in graph. Forcing full reload.");
                self.host.send(HmrPayload::full_reload());
            }
        }
    }
}
