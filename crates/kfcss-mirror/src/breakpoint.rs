//! Breakpoint discovery from compiled CSS.
//!
//! Breakpoints are declared as custom properties following the
//! `--breakpoint-<prefix>: <min-width>;` convention. The scan is purely
//! lexical: a matching declaration anywhere in the text counts, whether or
//! not it sits inside the intended `:root` block.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static BREAKPOINT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"--breakpoint-([a-zA-Z0-9_-]+):\s*([^;]+);")
        .unwrap_or_else(|e| panic!("BUG: invalid breakpoint pattern: {}", e))
});

/// A named minimum-viewport-width threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakpoint {
    /// Class prefix applied to mirrored selectors (`m` in `.m\:p-4`).
    pub prefix: String,
    /// Raw CSS length used in the media condition. Never validated.
    pub min_width: String,
}

impl Breakpoint {
    pub fn new(prefix: impl Into<String>, min_width: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            min_width: min_width.into(),
        }
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.prefix, self.min_width)
    }
}

/// The built-in breakpoints used when the stylesheet declares none.
pub fn default_breakpoints() -> Vec<Breakpoint> {
    vec![
        Breakpoint::new("m", "768px"),
        Breakpoint::new("l", "992px"),
        Breakpoint::new("xl", "1400px"),
    ]
}

/// Scan `css` for breakpoint declarations, in order of appearance.
///
/// Duplicate prefixes are all retained. Returns an empty list when nothing
/// matches; see [`extract_breakpoints`] for the defaulting variant.
pub fn scan_breakpoints(css: &str) -> Vec<Breakpoint> {
    BREAKPOINT_PATTERN
        .captures_iter(css)
        .map(|caps| Breakpoint::new(caps[1].trim(), caps[2].trim()))
        .collect()
}

/// Scan `css` for breakpoint declarations, falling back to
/// [`default_breakpoints`] when there are none.
pub fn extract_breakpoints(css: &str) -> Vec<Breakpoint> {
    let found = scan_breakpoints(css);
    if found.is_empty() {
        default_breakpoints()
    } else {
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefixes(bps: &[Breakpoint]) -> Vec<&str> {
        bps.iter().map(|b| b.prefix.as_str()).collect()
    }

    #[test]
    fn test_defaults_when_no_declarations() {
        let bps = extract_breakpoints(".p-4 { padding: 1rem; }");
        assert_eq!(prefixes(&bps), vec!["m", "l", "xl"]);
        assert_eq!(bps[2].min_width, "1400px");
    }

    #[test]
    fn test_defaults_for_empty_input() {
        assert_eq!(extract_breakpoints(""), default_breakpoints());
    }

    #[test]
    fn test_declarations_in_order() {
        let css = ":root {\n  --breakpoint-sm: 480px;\n  --breakpoint-md:  900px ;\n}";
        let bps = extract_breakpoints(css);
        assert_eq!(
            bps,
            vec![Breakpoint::new("sm", "480px"), Breakpoint::new("md", "900px")]
        );
    }

    #[test]
    fn test_duplicates_are_kept() {
        let css = ":root{--breakpoint-m:600px;--breakpoint-m:700px;}";
        let bps = extract_breakpoints(css);
        assert_eq!(prefixes(&bps), vec!["m", "m"]);
        assert_eq!(bps[0].min_width, "600px");
        assert_eq!(bps[1].min_width, "700px");
    }

    #[test]
    fn test_declaration_outside_root_still_found() {
        let css = ".theme { --breakpoint-wide: 1800px; }";
        assert_eq!(scan_breakpoints(css), vec![Breakpoint::new("wide", "1800px")]);
    }

    #[test]
    fn test_unrelated_custom_properties_ignored() {
        let css = ":root { --spacing-4: 1rem; --breakpoints: 3; }";
        assert!(scan_breakpoints(css).is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(Breakpoint::new("m", "768px").to_string(), "m (768px)");
    }
}
