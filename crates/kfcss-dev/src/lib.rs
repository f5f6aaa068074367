//! Development session support for kfcss.
//!
//! Watches the Sass sources of a project, rebuilds the responsive
//! stylesheet when they change, and tells the host dev server to hot-swap
//! the generated module (or reload the page when it is not loaded).

mod config;
mod devloop;
mod error;
mod host;
mod paths;
mod plugin;
mod session;
mod standalone;

pub use config::{PluginOptions, CONFIG_FILE};
pub use devloop::DevLoop;
pub use error::DevError;
pub use host::{
    change_channel, ChangeEvent, ChangeReceiver, ChangeSender, HmrPayload, HostSession,
    ModuleNode, ModuleUpdate, UpdateKind,
};
pub use paths::{detect_base_dir, FsProbe, RealFs, ResolvedPaths, DEFAULT_EXTENSION, PACKAGE_NAME, SVELTEKIT_DIR};
pub use plugin::{KfCssPlugin, PLUGIN_NAME, VIRTUAL_ID};
pub use session::{BuildToken, LoopState, WatchFilter, WatchSession};
pub use standalone::StandaloneHost;

/// Result type for dev session operations.
pub type Result<T> = std::result::Result<T, DevError>;
