//! Replacement template inspection.
//!
//! The regex crate expands `$name`, `${name}` and `$1`-style references in a
//! replacement string, and silently substitutes an empty string when the
//! referenced group does not exist. Templates are checked up front so that a
//! typo fails loudly instead of quietly deleting text from every page.

use regex::Regex;

use crate::rule::RewriteError;

/// A capture group referenced from a replacement template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupRef<'a> {
    /// Positional reference: `$1`, `${2}`
    Index(usize),
    /// Named reference: `$name`, `${name}`
    Name(&'a str),
}

impl GroupRef<'_> {
    fn parse(name: &str) -> GroupRef<'_> {
        match name.parse::<usize>() {
            Ok(index) => GroupRef::Index(index),
            Err(_) => GroupRef::Name(name),
        }
    }
}

impl std::fmt::Display for GroupRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupRef::Index(index) => write!(f, "${index}"),
            GroupRef::Name(name) => write!(f, "${{{name}}}"),
        }
    }
}

/// List every group reference in a replacement template, in order.
///
/// Follows the expansion rules of `regex::Captures::expand`: `$$` is a
/// literal dollar, an unbraced name is the longest run of `[_0-9A-Za-z]`,
/// and a `$` that starts no valid reference is kept literally.
pub fn referenced_groups(template: &str) -> Vec<GroupRef<'_>> {
    let mut refs = Vec::new();
    let mut i = 0;

    while let Some(offset) = template[i..].find('$') {
        let rest = &template[i + offset + 1..];

        if rest.starts_with('$') {
            i += offset + 2;
            continue;
        }

        if let Some(inner) = rest.strip_prefix('{') {
            if let Some(end) = inner.find('}') {
                refs.push(GroupRef::parse(&inner[..end]));
                i += offset + 1 + 1 + end + 1;
                continue;
            }
            i += offset + 1;
            continue;
        }

        let len = rest
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
            .count();
        if len > 0 {
            refs.push(GroupRef::parse(&rest[..len]));
        }
        i += offset + 1 + len;
    }

    refs
}

/// Check that every group a template references exists in `regex`.
pub fn validate_template(regex: &Regex, template: &str) -> Result<(), RewriteError> {
    for group in referenced_groups(template) {
        let exists = match group {
            GroupRef::Index(index) => index < regex.captures_len(),
            GroupRef::Name(name) => regex.capture_names().flatten().any(|n| n == name),
        };

        if !exists {
            return Err(RewriteError::UnknownGroup {
                group: group.to_string(),
                pattern: regex.as_str().to_string(),
                template: template.to_string(),
            });
        }
    }

    Ok(())
}
