//! Lexical health checks over a compiled stylesheet.
//!
//! These are reporting aids for library authors: duplicated selectors and
//! custom properties that are empty, missing, or never referenced.

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use regex::Regex;

static COMMENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)/\*.*?\*/")
        .unwrap_or_else(|e| panic!("BUG: invalid comment pattern: {}", e))
});

static DEFINED_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"--([a-zA-Z0-9_-]+):\s*([^;}]*)[;}]")
        .unwrap_or_else(|e| panic!("BUG: invalid definition pattern: {}", e))
});

static USED_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"var\(\s*--([a-zA-Z0-9_-]+)\s*[,)]")
        .unwrap_or_else(|e| panic!("BUG: invalid usage pattern: {}", e))
});

/// A selector that appears as a rule prelude more than once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateSelector {
    pub selector: String,
    pub count: usize,
}

/// Find selectors used in more than one rule prelude.
///
/// Selector lists are split on `,` and whitespace is normalised. At-rule
/// preludes and keyframe steps are skipped. Results keep the order in which
/// each selector first appeared.
pub fn duplicate_selectors(css: &str) -> Vec<DuplicateSelector> {
    let css = COMMENT_PATTERN.replace_all(css, "");
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    let mut prelude_start = 0;
    for (i, c) in css.char_indices() {
        match c {
            '{' => {
                let prelude = css[prelude_start..i].trim();
                prelude_start = i + 1;
                if prelude.starts_with('@') {
                    continue;
                }
                for selector in prelude.split(',') {
                    let selector = selector.split_whitespace().collect::<Vec<_>>().join(" ");
                    if selector.is_empty() || selector.contains('%') {
                        continue;
                    }
                    let count = counts.entry(selector.clone()).or_insert(0);
                    if *count == 0 {
                        order.push(selector);
                    }
                    *count += 1;
                }
            }
            '}' | ';' => prelude_start = i + 1,
            _ => {}
        }
    }

    order
        .into_iter()
        .filter_map(|selector| {
            let count = counts[&selector];
            (count > 1).then_some(DuplicateSelector { selector, count })
        })
        .collect()
}

/// Definitions and references of custom properties, by name without `--`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableReport {
    pub defined: BTreeSet<String>,
    pub used: BTreeSet<String>,
    /// Defined with an empty value, in order of appearance.
    pub empty: Vec<String>,
}

impl VariableReport {
    /// Referenced through `var()` but never defined.
    pub fn missing(&self) -> Vec<&str> {
        self.used.difference(&self.defined).map(String::as_str).collect()
    }

    /// Defined but never referenced through `var()`.
    pub fn unused(&self) -> Vec<&str> {
        self.defined.difference(&self.used).map(String::as_str).collect()
    }
}

pub fn variable_report(css: &str) -> VariableReport {
    let mut report = VariableReport::default();

    for caps in DEFINED_PATTERN.captures_iter(css) {
        let name = caps[1].to_string();
        if caps[2].trim().is_empty() {
            report.empty.push(name.clone());
        }
        report.defined.insert(name);
    }

    for caps in USED_PATTERN.captures_iter(css) {
        report.used.insert(caps[1].to_string());
    }

    report
}
