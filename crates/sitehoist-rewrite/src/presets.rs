//! Rule sets for the deployment layout.
//!
//! The generator writes each language into its own subdirectory (`en/`,
//! `pt/`) with asset links relative to that subdirectory. Deployment copies
//! the tree verbatim and then promotes `en/index.html` to the root, which
//! leaves that one document one level too high for its links.

use crate::rule::{RewriteError, Rule};
use crate::ruleset::RuleSet;

/// Language subdirectory the entry document is hoisted out of.
pub const DEFAULT_LANGUAGE: &str = "en";

/// `href` prefixes the index rules never rewrite.
pub const DEFAULT_RESERVED_PREFIXES: &[&str] = &[
    "css/", "js/", "img/", "https://", "http://", "javadoc", "pt", "en",
];

const CSS_MARKER: &str = r#"build:css /css/([^ ]+)(.*href=")(.*)/css/"#;
const CSS_MARKER_TEMPLATE: &str = "build:css ${3}/css/${1}${2}${3}/css/";

const JS_MARKER: &str = r#"build:js /js/([^ ]+)(.*href=")(.*)/js/"#;
const JS_MARKER_TEMPLATE: &str = "build:js ${3}/js/${1}${2}${3}/js/";

impl RuleSet {
    /// Rules for every HTML page in the deployment tree.
    ///
    /// Relocates the hash token of `build:css` / `build:js` markers under the
    /// directory the marker's own `href` resolves to. The anchor path must
    /// already be final when these run: reordering them after anything that
    /// rewrites hrefs misaligns the markers without any error.
    pub fn general() -> Result<Self, RewriteError> {
        Ok(Self::new("general")
            .with_rule(Rule::pattern(CSS_MARKER, CSS_MARKER_TEMPLATE)?)
            .with_rule(Rule::pattern(JS_MARKER, JS_MARKER_TEMPLATE)?))
    }

    /// Rules for the entry document hoisted from `<language>/` to the root.
    ///
    /// Strips `../` first, then points every unreserved link back into the
    /// language directory.
    pub fn index<S: AsRef<str>>(language: &str, reserved: &[S]) -> Self {
        Self::new("index")
            .with_rule(Rule::literal("../", ""))
            .with_rule(Rule::href_prefix(
                language,
                reserved.iter().map(|r| r.as_ref().to_string()),
            ))
    }

    /// [`RuleSet::index`] with the default language and reserved prefixes.
    pub fn default_index() -> Self {
        Self::index(DEFAULT_LANGUAGE, DEFAULT_RESERVED_PREFIXES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn relocates_css_marker_token() {
        let rules = RuleSet::general().unwrap();

        let out = rules.apply(r#"build:css /css/a1b2 ... href="../assets/css/""#);

        assert_eq!(out, r#"build:css ../assets/css/a1b2 ... href="../assets/css/""#);
    }

    #[test]
    fn relocates_js_marker_token() {
        let rules = RuleSet::general().unwrap();

        let out = rules.apply(r#"<!-- build:js /js/site.js --><a href="../js/x.js">"#);

        assert_eq!(out, r#"<!-- build:js ../js/site.js --><a href="../js/x.js">"#);
    }

    #[test]
    fn marker_on_separate_line_is_untouched() {
        let rules = RuleSet::general().unwrap();
        let input = "<!-- build:css /css/site.css -->\n<link href=\"../css/a.css\">";

        assert_eq!(rules.apply(input), input);
    }

    #[test]
    fn token_embedding_anchor_text_backtracks_to_shortest_token() {
        let rules = RuleSet::general().unwrap();

        let out = rules.apply(r#"build:css /css/xhref="p/css/ rest"#);

        assert_eq!(out, r#"build:css p/css/xhref="p/css/ rest"#);
    }

    #[test]
    fn rewrites_index_link_into_language_dir() {
        let rules = RuleSet::default_index();

        assert_eq!(
            rules.apply(r#"<a href="guide.html">"#),
            r#"<a href="en/guide.html">"#
        );
    }

    #[test]
    fn leaves_reserved_links() {
        let rules = RuleSet::default_index();
        let input = r#"<a href="javadoc/index.html"></a><a href="https://example.com"></a>"#;

        assert_eq!(rules.apply(input), input);
    }

    #[test]
    fn strips_parent_references_before_prefixing() {
        let rules = RuleSet::default_index();

        let out = rules.apply(r#"<link href="../css/site.css"><a href="../download.html">"#);

        assert_eq!(out, r#"<link href="css/site.css"><a href="en/download.html">"#);
    }

    #[test]
    fn other_language_sections_stay_put() {
        let rules = RuleSet::default_index();
        let input = r#"<a href="pt/index.html">Português</a>"#;

        assert_eq!(rules.apply(input), input);
    }

    #[test]
    fn custom_language_and_reserved_list() {
        let rules = RuleSet::index("pt", &["assets/"]);

        assert_eq!(
            rules.apply(r#"<a href="assets/x.png"></a><a href="sobre.html"></a>"#),
            r#"<a href="assets/x.png"></a><a href="pt/sobre.html"></a>"#
        );
    }
}
