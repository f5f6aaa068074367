//! The boundary to the host development server.
//!
//! The host owns file watching, the live module graph, and the reload
//! transport. The dev loop only reaches it through [`HostSession`], and the
//! host only reaches the dev loop by pushing [`ChangeEvent`]s into a
//! [`ChangeSender`].

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// A module in the host's live module graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleNode {
    /// Resolved file path the module was loaded from.
    pub id: PathBuf,
    /// URL the client knows the module by.
    pub url: String,
}

/// Message pushed to connected clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum HmrPayload {
    /// Hot-swap the listed modules.
    Update { updates: Vec<ModuleUpdate> },
    /// Reload the whole page.
    FullReload { path: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleUpdate {
    #[serde(rename = "type")]
    pub kind: UpdateKind,
    pub path: String,
    pub accepted_path: String,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpdateKind {
    JsUpdate,
}

impl HmrPayload {
    /// A scoped update for one module, accepted by the module itself.
    pub fn module_update(url: &str, timestamp: u64) -> Self {
        HmrPayload::Update {
            updates: vec![ModuleUpdate {
                kind: UpdateKind::JsUpdate,
                path: url.to_string(),
                accepted_path: url.to_string(),
                timestamp,
            }],
        }
    }

    pub fn full_reload() -> Self {
        HmrPayload::FullReload {
            path: "*".to_string(),
        }
    }
}

/// Operations the dev loop needs from the host session.
///
/// Implementations are expected to be internally synchronized.
pub trait HostSession: Send + Sync + 'static {
    /// Subscribe to change notifications under `path`.
    fn watch(&self, path: &Path) -> std::io::Result<()>;

    /// Look up a module by its resolved file path.
    fn module_by_id(&self, id: &Path) -> Option<ModuleNode>;

    fn invalidate_module(&self, module: &ModuleNode);

    fn send(&self, payload: HmrPayload);
}

/// A file change reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
}

/// Handle the host uses to report changes. Cheap to clone; usable from any
/// thread without blocking.
#[derive(Debug, Clone)]
pub struct ChangeSender {
    tx: UnboundedSender<ChangeEvent>,
}

impl ChangeSender {
    /// Report a change. Returns `false` once the dev loop has stopped.
    pub fn file_changed(&self, path: impl Into<PathBuf>) -> bool {
        self.tx.send(ChangeEvent { path: path.into() }).is_ok()
    }
}

pub type ChangeReceiver = UnboundedReceiver<ChangeEvent>;

/// Create the channel that carries change events into a dev loop.
pub fn change_channel() -> (ChangeSender, ChangeReceiver) {
    let (tx, rx) = unbounded_channel();
    (ChangeSender { tx }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_payload_shape() {
        let json = serde_json::to_value(HmrPayload::module_update("/kf-css/dist/kf-responsive.css", 42)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "update",
                "updates": [{
                    "type": "js-update",
                    "path": "/kf-css/dist/kf-responsive.css",
                    "acceptedPath": "/kf-css/dist/kf-responsive.css",
                    "timestamp": 42
                }]
            })
        );
    }

    #[test]
    fn test_full_reload_payload_shape() {
        let json = serde_json::to_value(HmrPayload::full_reload()).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "full-reload", "path": "*" }));
    }

    #[tokio::test]
    async fn test_change_channel() {
        let (tx, mut rx) = change_channel();
        assert!(tx.file_changed("a.scss"));
        assert_eq!(rx.recv().await, Some(ChangeEvent { path: "a.scss".into() }));
        drop(rx);
        assert!(!tx.file_changed("b.scss"));
    }
}
