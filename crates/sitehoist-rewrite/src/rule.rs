//! Substitution rules.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::template::validate_template;

/// Every `href` attribute value in a document.
static HREF_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href="([^"]*)""#).expect("Invalid href attribute regex"));

/// A single find-and-replace step. Every variant replaces all occurrences.
#[derive(Debug, Clone)]
pub enum Rule {
    /// Plain substring replacement.
    Literal { from: String, to: String },

    /// Regex substitution; `template` may reference capture groups.
    Pattern { regex: Regex, template: String },

    /// Prefix `prefix/` onto every `href` value that does not start with
    /// one of the reserved prefixes.
    HrefPrefix {
        prefix: String,
        reserved: Vec<String>,
    },
}

impl Rule {
    /// Replace every occurrence of `from` with `to`.
    pub fn literal(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::Literal {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Compile a regex substitution.
    ///
    /// Fails if the pattern does not compile or the template references a
    /// capture group the pattern does not define.
    pub fn pattern(pattern: &str, template: impl Into<String>) -> Result<Self, RewriteError> {
        let regex = Regex::new(pattern).map_err(|e| RewriteError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        let template = template.into();

        validate_template(&regex, &template)?;

        Ok(Self::Pattern { regex, template })
    }

    /// Prefix unreserved `href` targets with a directory.
    ///
    /// The prefix itself is always treated as reserved, so applying the rule
    /// twice gives the same result as applying it once.
    pub fn href_prefix<I, S>(prefix: &str, reserved: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let prefix = prefix.trim_end_matches('/').to_string();
        let mut reserved: Vec<String> = reserved.into_iter().map(Into::into).collect();

        let rewritten = format!("{prefix}/");
        if !reserved.iter().any(|r| rewritten.starts_with(r.as_str())) {
            reserved.push(prefix.clone());
        }

        Self::HrefPrefix { prefix, reserved }
    }

    /// Apply the rule to the whole content. Zero matches returns the input.
    pub fn apply(&self, content: &str) -> String {
        match self {
            Self::Literal { from, to } => {
                if from.is_empty() {
                    content.to_string()
                } else {
                    content.replace(from.as_str(), to)
                }
            }
            Self::Pattern { regex, template } => {
                regex.replace_all(content, template.as_str()).into_owned()
            }
            Self::HrefPrefix { prefix, reserved } => HREF_ATTR
                .replace_all(content, |caps: &Captures<'_>| {
                    let target = &caps[1];
                    // Literal starts-with test, not a URL parse: "" and
                    // anything beginning with a reserved string stay as-is.
                    if target.is_empty() || reserved.iter().any(|r| target.starts_with(r.as_str()))
                    {
                        caps[0].to_string()
                    } else {
                        format!(r#"href="{prefix}/{target}""#)
                    }
                })
                .into_owned(),
        }
    }

    /// Short human-readable description for log output.
    pub fn describe(&self) -> String {
        match self {
            Self::Literal { from, to } => format!("replace {from:?} with {to:?}"),
            Self::Pattern { regex, template } => format!("/{}/ -> {template:?}", regex.as_str()),
            Self::HrefPrefix { prefix, reserved } => {
                format!("prefix href with {prefix:?} unless {reserved:?}")
            }
        }
    }
}

/// Errors raised while building rules.
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    #[error("Invalid pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Template {template:?} references {group}, which pattern {pattern:?} does not define")]
    UnknownGroup {
        group: String,
        pattern: String,
        template: String,
    },
}
