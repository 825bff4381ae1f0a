//! Path rewriting for generated static-site HTML.
//!
//! A [`RuleSet`] is an ordered list of [`Rule`]s applied to a document's text,
//! each rule feeding its output to the next. Two preset sets cover the
//! deployment layout: [`RuleSet::general`] for every page in the tree and
//! [`RuleSet::index`] for the entry document hoisted out of its language
//! subdirectory.

pub mod presets;
pub mod rule;
pub mod ruleset;
pub mod template;

pub use presets::{DEFAULT_LANGUAGE, DEFAULT_RESERVED_PREFIXES};
pub use rule::{RewriteError, Rule};
pub use ruleset::RuleSet;
pub use template::{referenced_groups, validate_template, GroupRef};
