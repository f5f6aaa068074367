//! A minimal host for running the dev loop outside a dev server.
//!
//! Changes come from a `notify` watcher. There is no module graph, so every
//! successful rebuild ends in a full-reload payload, which is logged.

use std::path::Path;
use std::sync::{Mutex, PoisonError};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::error::DevError;
use crate::host::{ChangeSender, HmrPayload, HostSession, ModuleNode};

pub struct StandaloneHost {
    watcher: Mutex<RecommendedWatcher>,
}

impl StandaloneHost {
    /// Create a host that forwards create/modify events to `changes`.
    pub fn new(changes: ChangeSender) -> Result<Self, DevError> {
        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    for path in event.paths {
                        changes.file_changed(path);
                    }
                }
            }
            Err(e) => tracing::warn!("watch error: {}", e),
        })
        .map_err(|e| DevError::watch(".", e))?;

        Ok(Self {
            watcher: Mutex::new(watcher),
        })
    }
}

impl HostSession for StandaloneHost {
    fn watch(&self, path: &Path) -> std::io::Result<()> {
        self.watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .watch(path, RecursiveMode::Recursive)
            .map_err(std::io::Error::other)
    }

    fn module_by_id(&self, _id: &Path) -> Option<ModuleNode> {
        None
    }

    fn invalidate_module(&self, _module: &ModuleNode) {}

    fn send(&self, payload: HmrPayload) {
        match serde_json::to_string(&payload) {
            Ok(json) => tracing::info!("[kf-css] Reload payload: {}", json),
            Err(e) => tracing::warn!("[kf-css] Could not encode reload payload: {}", e),
        }
    }
}
