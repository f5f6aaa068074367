//! Plugin configuration.
//!
//! Every field is optional. Unset paths are derived from the detected base
//! directory (see [`crate::paths`]). Options can come from a `kfcss.toml`
//! file, from command line flags, or both; flags win.

use std::path::{Path, PathBuf};

use kfcss_mirror::IgnoreSet;
use serde::Deserialize;

use crate::error::DevError;

/// Conventional config file name, looked up in the project root.
pub const CONFIG_FILE: &str = "kfcss.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PluginOptions {
    /// Library directory; skips autodetection when set.
    pub base_dir: Option<PathBuf>,
    /// Entry stylesheet. Defaults to `<base>/src/main.scss`.
    pub entry: Option<PathBuf>,
    /// Artifact directory. Defaults to `<base>/dist`.
    pub out_dir: Option<PathBuf>,
    /// Watch root. Defaults to `<base>/src`. A glob such as
    /// `src/**/*.scss` is cut back to the directory before the first `*`.
    pub watch: Option<PathBuf>,
    /// Source stylesheet extension. Defaults to `scss`.
    pub extension: Option<String>,
    /// Classes excluded from mirroring. Defaults to `container`, `block`.
    pub ignore: Option<Vec<String>>,
}

impl PluginOptions {
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self, DevError> {
        toml::from_str(text).map_err(|e| DevError::config(origin, e.message()))
    }

    pub fn load(path: &Path) -> Result<Self, DevError> {
        let text = std::fs::read_to_string(path).map_err(|e| DevError::config(path, e))?;
        Self::from_toml_str(&text, path)
    }

    /// Load `kfcss.toml` from `root` if present, otherwise defaults.
    pub fn discover(root: &Path) -> Result<Self, DevError> {
        let path = root.join(CONFIG_FILE);
        if path.is_file() {
            tracing::debug!("Loading configuration from {}", path.display());
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Overlay `overrides` on top of `self`. Set fields in `overrides` win.
    pub fn merge(self, overrides: PluginOptions) -> Self {
        Self {
            base_dir: overrides.base_dir.or(self.base_dir),
            entry: overrides.entry.or(self.entry),
            out_dir: overrides.out_dir.or(self.out_dir),
            watch: overrides.watch.or(self.watch),
            extension: overrides.extension.or(self.extension),
            ignore: overrides.ignore.or(self.ignore),
        }
    }

    pub fn ignore_set(&self) -> IgnoreSet {
        match &self.ignore {
            Some(classes) => classes.iter().cloned().collect(),
            None => IgnoreSet::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toml() {
        let text = r#"
base_dir = "styles/kf"
extension = "sass"
ignore = ["container", "row"]
"#;
        let opts = PluginOptions::from_toml_str(text, Path::new("kfcss.toml")).unwrap();
        assert_eq!(opts.base_dir, Some(PathBuf::from("styles/kf")));
        assert_eq!(opts.extension.as_deref(), Some("sass"));
        assert!(opts.ignore_set().contains("row"));
        assert!(!opts.ignore_set().contains("block"));
        assert_eq!(opts.entry, None);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = PluginOptions::from_toml_str("outdir = \"x\"", Path::new("kfcss.toml")).unwrap_err();
        assert!(matches!(err, DevError::Config { .. }));
    }

    #[test]
    fn test_merge_prefers_overrides() {
        let file = PluginOptions {
            base_dir: Some("a".into()),
            out_dir: Some("dist".into()),
            ..Default::default()
        };
        let flags = PluginOptions {
            base_dir: Some("b".into()),
            ..Default::default()
        };
        let merged = file.merge(flags);
        assert_eq!(merged.base_dir, Some(PathBuf::from("b")));
        assert_eq!(merged.out_dir, Some(PathBuf::from("dist")));
    }

    #[test]
    fn test_default_ignore_set() {
        let set = PluginOptions::default().ignore_set();
        assert!(set.contains("container"));
        assert!(set.contains("block"));
    }

    #[test]
    fn test_discover_without_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(PluginOptions::discover(dir.path()).unwrap(), PluginOptions::default());
    }
}
