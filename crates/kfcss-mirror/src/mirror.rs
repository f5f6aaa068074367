//! Responsive variant generation.
//!
//! For each breakpoint the mirror appends one `@media (min-width: ..)` block
//! holding a prefixed copy of every eligible rule in the base stylesheet.
//! The base text is never modified, only extended.

use std::collections::BTreeSet;
use std::fmt::Write;

use crate::breakpoint::Breakpoint;
use crate::rules::{LexicalRules, RuleSource};

/// Header that separates the base stylesheet from the generated blocks.
pub const GENERATED_HEADER: &str = "\n\n/* Generated Responsive Utilities */\n";

/// Class tokens that are never mirrored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreSet {
    classes: BTreeSet<String>,
}

impl IgnoreSet {
    /// An ignore set that excludes nothing.
    pub fn empty() -> Self {
        Self {
            classes: BTreeSet::new(),
        }
    }

    pub fn contains(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn insert(&mut self, class: impl Into<String>) {
        self.classes.insert(class.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }
}

impl Default for IgnoreSet {
    /// Layout primitives that must keep a single, unprefixed meaning.
    fn default() -> Self {
        ["container", "block"].into_iter().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for IgnoreSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            classes: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Result of a generation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorOutput {
    /// The generated section, starting with [`GENERATED_HEADER`].
    pub generated: String,
    /// Number of rules emitted for each breakpoint, in breakpoint order.
    pub counts: Vec<usize>,
}

/// Generates breakpoint-prefixed copies of eligible rules.
pub struct VariantMirror {
    ignore: IgnoreSet,
    rules: Box<dyn RuleSource>,
}

impl VariantMirror {
    /// Create a mirror with the default ignore set and the lexical scanner.
    pub fn new() -> Self {
        Self {
            ignore: IgnoreSet::default(),
            rules: Box::new(LexicalRules),
        }
    }

    pub fn with_ignore(mut self, ignore: IgnoreSet) -> Self {
        self.ignore = ignore;
        self
    }

    pub fn with_rule_source(mut self, rules: impl RuleSource + 'static) -> Self {
        self.rules = Box::new(rules);
        self
    }

    pub fn ignore(&self) -> &IgnoreSet {
        &self.ignore
    }

    /// Build the generated section for `css` without the base text.
    pub fn generate(&self, css: &str, breakpoints: &[Breakpoint]) -> MirrorOutput {
        let rules = self.rules.extract_rules(css);
        let mut generated = String::from(GENERATED_HEADER);
        let mut counts = Vec::with_capacity(breakpoints.len());

        for bp in breakpoints {
            let _ = write!(
                generated,
                "\n/* --- Breakpoint: {} ({}) --- */\n@media (min-width: {}) {{\n",
                bp.prefix, bp.min_width, bp.min_width
            );

            let prefix = escape_ident(&bp.prefix);
            let mut count = 0;
            for rule in rules.iter().filter(|r| !self.ignore.contains(r.class)) {
                let _ = write!(generated, "  .{}\\:{}", prefix, rule.class);
                if let Some(pseudo) = rule.pseudo {
                    let _ = write!(generated, ":{}", pseudo);
                }
                let _ = writeln!(generated, " {{ {} }}", rule.body.trim());
                count += 1;
            }

            generated.push_str("}\n");
            counts.push(count);
        }

        MirrorOutput { generated, counts }
    }

    /// The full mirrored stylesheet: `css` followed by the generated section.
    pub fn mirror(&self, css: &str, breakpoints: &[Breakpoint]) -> String {
        let output = self.generate(css, breakpoints);
        let mut mirrored = String::with_capacity(css.len() + output.generated.len());
        mirrored.push_str(css);
        mirrored.push_str(&output.generated);
        mirrored
    }
}

impl Default for VariantMirror {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a mirrored stylesheet back into its base text.
///
/// Returns `None` when `mirrored` carries no generated section.
pub fn strip_generated(mirrored: &str) -> Option<&str> {
    mirrored.rfind(GENERATED_HEADER).map(|at| &mirrored[..at])
}

/// Escape a token so it can start a class selector.
///
/// Identifiers may not begin with a digit, so a leading digit becomes a
/// hex escape (`2xl` -> `\32 xl`).
fn escape_ident(token: &str) -> String {
    match token.chars().next() {
        Some(first) if first.is_ascii_digit() => {
            format!("\\{:x} {}", first as u32, &token[1..])
        }
        _ => token.to_string(),
    }
}
