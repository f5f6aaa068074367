//! Responsive variant generation for compiled utility stylesheets.
//!
//! This crate is the pure, I/O-free core of kfcss. It discovers
//! `--breakpoint-*` declarations in compiled CSS and appends, per
//! breakpoint, a media block with prefixed copies of every single-class
//! rule. Scanning is lexical, not a CSS grammar.

pub mod audit;
pub mod breakpoint;
pub mod mirror;
pub mod rules;

pub use audit::{duplicate_selectors, variable_report, DuplicateSelector, VariableReport};
pub use breakpoint::{default_breakpoints, extract_breakpoints, scan_breakpoints, Breakpoint};
pub use mirror::{strip_generated, IgnoreSet, MirrorOutput, VariantMirror, GENERATED_HEADER};
pub use rules::{extract_rules, LexicalRules, RuleSource, StyleRule};
