//! Extraction of single-class style rules.
//!
//! Only rules whose whole selector is one dot-prefixed class, optionally
//! followed by a single `:pseudo` token, are extracted. Everything else
//! (compound or descendant selectors, selector lists, at-rules, keyframe
//! steps, bodies containing nested braces) is invisible here.

use std::sync::LazyLock;

use regex::Regex;

static RULE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.([a-zA-Z0-9_-]+)(?::([a-zA-Z0-9_-]+))?\s*\{([^{}]+)\}")
        .unwrap_or_else(|e| panic!("BUG: invalid rule pattern: {}", e))
});

/// One occurrence of an eligible rule, borrowing from the scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleRule<'a> {
    /// Bare class token, without the leading dot.
    pub class: &'a str,
    /// Pseudo-class token, without the leading colon.
    pub pseudo: Option<&'a str>,
    /// Raw declaration list between the braces.
    pub body: &'a str,
}

impl<'a> StyleRule<'a> {
    /// The original selector text, e.g. `.btn:hover`.
    pub fn selector(&self) -> String {
        match self.pseudo {
            Some(pseudo) => format!(".{}:{}", self.class, pseudo),
            None => format!(".{}", self.class),
        }
    }
}

/// Source of eligible rules.
///
/// The mirror only ever talks to this trait, so the lexical scanner can be
/// replaced by a structural parser without touching generation.
pub trait RuleSource: Send + Sync {
    fn extract_rules<'a>(&self, css: &'a str) -> Vec<StyleRule<'a>>;
}

/// Regex-based rule scanner.
#[derive(Debug, Default, Clone, Copy)]
pub struct LexicalRules;

impl RuleSource for LexicalRules {
    fn extract_rules<'a>(&self, css: &'a str) -> Vec<StyleRule<'a>> {
        extract_rules(css)
    }
}

/// Extract every eligible rule occurrence from `css`, in order.
///
/// Repeated selectors are returned once per occurrence.
pub fn extract_rules(css: &str) -> Vec<StyleRule<'_>> {
    RULE_PATTERN
        .captures_iter(css)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            if !starts_rule(css, whole.start()) {
                return None;
            }
            Some(StyleRule {
                class: caps.get(1)?.as_str(),
                pseudo: caps.get(2).map(|m| m.as_str()),
                body: caps.get(3)?.as_str(),
            })
        })
        .collect()
}

/// Whether a selector beginning at `offset` is the start of a rule rather
/// than the tail of a compound, descendant or listed selector.
fn starts_rule(css: &str, offset: usize) -> bool {
    match css[..offset].trim_end().chars().last() {
        None => true,
        // `/` only closes a comment here; selectors never contain it.
        Some(c) => matches!(c, '{' | '}' | ';' | '/'),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selectors(css: &str) -> Vec<String> {
        extract_rules(css).iter().map(StyleRule::selector).collect()
    }

    #[test]
    fn test_expanded_output() {
        let css = ".p-4 {\n  padding: 1rem;\n}\n\n.m-2 {\n  margin: 0.5rem;\n}\n";
        let rules = extract_rules(css);
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].class, "p-4");
        assert_eq!(rules[0].body.trim(), "padding: 1rem;");
        assert_eq!(rules[1].class, "m-2");
    }

    #[test]
    fn test_compact_output() {
        let css = ":root{--breakpoint-m:768px;} .p-4{padding:1rem;}.m-2{margin:0}";
        assert_eq!(selectors(css), vec![".p-4", ".m-2"]);
    }

    #[test]
    fn test_pseudo_class() {
        let rules = extract_rules(".btn:hover { color: red; }");
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].class, "btn");
        assert_eq!(rules[0].pseudo, Some("hover"));
        assert_eq!(rules[0].selector(), ".btn:hover");
    }

    #[test]
    fn test_ineligible_selectors() {
        let css = "\
div .a { x: 1; }
.b .c { x: 1; }
.d.e { x: 1; }
.f, .g { x: 1; }
.h > .i { x: 1; }
a.j { x: 1; }
.k::before { x: 1; }
.l:not(.m) { x: 1; }
.n:hover:focus { x: 1; }
";
        assert!(selectors(css).is_empty());
    }

    #[test]
    fn test_nested_body_excluded() {
        let css = ".outer { @supports (display: grid) { display: grid; } }\n.ok { a: b; }";
        assert_eq!(selectors(css), vec![".ok"]);
    }

    #[test]
    fn test_rules_inside_at_rule_are_found() {
        let css = "@media print {\n  .hide { display: none; }\n}\n";
        assert_eq!(selectors(css), vec![".hide"]);
    }

    #[test]
    fn test_keyframes_invisible() {
        let css = "@keyframes spin {\n  0% { rotate: 0; }\n  100% { rotate: 360deg; }\n}";
        assert!(extract_rules(css).is_empty());
    }

    #[test]
    fn test_after_comment() {
        let css = "/* spacing */ .p-1 { padding: 0.25rem; }";
        assert_eq!(selectors(css), vec![".p-1"]);
    }

    #[test]
    fn test_decimal_values_not_selectors() {
        let css = ".w { width: .5rem; }\n.h { height: 1.5rem; }";
        assert_eq!(selectors(css), vec![".w", ".h"]);
    }

    #[test]
    fn test_repeated_selector_kept_per_occurrence() {
        let css = ".a { x: 1; }\n.a { y: 2; }";
        let rules = extract_rules(css);
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[1].body.trim(), "y: 2;");
    }

    #[test]
    fn test_lexical_rules_source() {
        let source = LexicalRules;
        assert_eq!(source.extract_rules(".x { a: b; }").len(), 1);
    }
}
