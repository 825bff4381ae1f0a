//! CSS, JavaScript and HTML post-processing.

use std::fs;
use std::path::{Path, PathBuf};

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};

use crate::fs_tasks::{files_under, has_extension, html_files};
use crate::pipeline::{io_error, PipelineError};

/// Options for stylesheet processing.
#[derive(Debug, Clone)]
pub struct CssOptions {
    /// Browserslist queries; vendor prefixes are added for these targets
    pub browsers: Vec<String>,
    /// Strip whitespace from the output
    pub minify: bool,
}

impl Default for CssOptions {
    fn default() -> Self {
        Self {
            browsers: vec!["defaults".to_string()],
            minify: true,
        }
    }
}

fn targets_for(queries: &[String]) -> Result<Targets, String> {
    if queries.is_empty() {
        return Ok(Targets::default());
    }

    let browsers = Browsers::from_browserslist(queries.iter().map(String::as_str))
        .map_err(|e| format!("Invalid browserslist query: {}", e))?;

    Ok(Targets {
        browsers,
        ..Targets::default()
    })
}

/// Prefix and optionally minify a stylesheet using lightningcss.
pub fn process_css(css: &str, options: &CssOptions) -> Result<String, String> {
    let targets = targets_for(&options.browsers)?;

    let mut stylesheet = StyleSheet::parse(css, ParserOptions::default())
        .map_err(|e| format!("CSS parse error: {}", e))?;

    stylesheet
        .minify(MinifyOptions {
            targets,
            ..Default::default()
        })
        .map_err(|e| format!("CSS minify error: {}", e))?;

    let printed = stylesheet
        .to_css(PrinterOptions {
            minify: options.minify,
            targets,
            ..Default::default()
        })
        .map_err(|e| format!("CSS print error: {}", e))?;

    Ok(printed.code)
}

/// Process every `.css` file directly inside `dir`. Subdirectories are not
/// visited; a missing directory processes nothing.
pub fn process_css_dir(dir: &Path, options: &CssOptions) -> Result<usize, PipelineError> {
    if !dir.is_dir() {
        tracing::debug!("No stylesheet directory at {}", dir.display());
        return Ok(0);
    }

    let stylesheets = files_under(dir, |p| {
        p.parent() == Some(dir) && has_extension(p, &["css"])
    })?;

    for path in &stylesheets {
        let css = fs::read_to_string(path).map_err(io_error(path))?;
        let processed = process_css(&css, options).map_err(|message| PipelineError::Css {
            path: path.clone(),
            message,
        })?;
        fs::write(path, processed).map_err(io_error(path))?;
    }

    tracing::info!("Processed {} stylesheets", stylesheets.len());

    Ok(stylesheets.len())
}

/// Minify an HTML document with minify-html. Comments are dropped; inline
/// `<style>` and `<script>` contents are minified too.
pub fn minify_html(html: &str) -> Result<String, String> {
    let cfg = minify_html::Cfg {
        minify_css: true,
        minify_js: true,
        keep_comments: false,
        ..minify_html::Cfg::default()
    };

    let minified = minify_html::minify(html.as_bytes(), &cfg);
    String::from_utf8(minified).map_err(|_| "minification produced invalid UTF-8".to_string())
}

const SCRIPT_OPEN: &str = "<script>";
const SCRIPT_CLOSE: &str = "</script>";

/// Minify a standalone script.
///
/// The source is run through the same minifier as inline `<script>` blocks,
/// so it must not contain a closing script tag.
pub fn minify_js(js: &str) -> Result<String, String> {
    if js.to_ascii_lowercase().contains("</script") {
        return Err("script contains a closing </script> tag".to_string());
    }

    let minified = minify_html(&format!("{SCRIPT_OPEN}{js}{SCRIPT_CLOSE}"))?;

    minified
        .strip_prefix(SCRIPT_OPEN)
        .and_then(|body| body.strip_suffix(SCRIPT_CLOSE))
        .map(|body| body.trim().to_string())
        .ok_or_else(|| format!("unexpected minifier output: {}", minified))
}

/// A script minified from the generator output into the deployment directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptBundle {
    /// Source path, relative to the generator output directory
    pub src: PathBuf,
    /// Target path, relative to the deployment directory
    pub dest: PathBuf,
}

impl ScriptBundle {
    pub fn new(src: impl Into<PathBuf>, dest: impl Into<PathBuf>) -> Self {
        Self {
            src: src.into(),
            dest: dest.into(),
        }
    }
}

/// Minify each bundle's source into its target. A missing source aborts.
pub fn minify_scripts(
    source: &Path,
    dest: &Path,
    bundles: &[ScriptBundle],
) -> Result<usize, PipelineError> {
    for bundle in bundles {
        let from = source.join(&bundle.src);
        if !from.is_file() {
            return Err(PipelineError::MissingInput(from));
        }

        let js = fs::read_to_string(&from).map_err(io_error(&from))?;
        let minified = minify_js(&js).map_err(|message| PipelineError::Script {
            path: from.clone(),
            message,
        })?;

        let to = dest.join(&bundle.dest);
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
        fs::write(&to, &minified).map_err(io_error(&to))?;

        tracing::debug!(
            "Minified {} to {} ({} -> {} bytes)",
            from.display(),
            to.display(),
            js.len(),
            minified.len()
        );
    }

    if !bundles.is_empty() {
        tracing::info!("Minified {} scripts", bundles.len());
    }

    Ok(bundles.len())
}

/// Minify every `.html` file under `root` in place.
pub fn minify_html_tree(root: &Path) -> Result<usize, PipelineError> {
    let pages = html_files(root)?;

    for path in &pages {
        let html = fs::read_to_string(path).map_err(io_error(path))?;
        let minified = minify_html(&html).map_err(|message| PipelineError::Html {
            path: path.clone(),
            message,
        })?;
        fs::write(path, minified).map_err(io_error(path))?;
    }

    tracing::info!("Minified {} pages", pages.len());

    Ok(pages.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn minifies_css() {
        let css = r#"
.button {
    background-color: blue;
    padding: 10px;
}
        "#;

        let minified = process_css(css, &CssOptions::default()).unwrap();

        assert!(!minified.contains('\n'));
        assert!(minified.contains(".button"));
    }

    #[test]
    fn keeps_formatting_without_minify() {
        let options = CssOptions {
            minify: false,
            ..Default::default()
        };

        let out = process_css(".a { color: red; }\n.b { color: blue; }", &options).unwrap();

        assert!(out.contains('\n'));
    }

    #[test]
    fn adds_vendor_prefixes_for_old_targets() {
        let options = CssOptions {
            browsers: vec!["safari 13".to_string()],
            minify: true,
        };

        let out = process_css(".a { user-select: none; }", &options).unwrap();

        assert!(out.contains("-webkit-user-select"));
    }

    #[test]
    fn rejects_bad_browserslist_query() {
        let options = CssOptions {
            browsers: vec!["not a real browser 99".to_string()],
            minify: true,
        };

        assert!(process_css(".a{}", &options).is_err());
    }

    #[test]
    fn processes_only_top_level_css() {
        let temp = tempdir().unwrap();
        let css = temp.path().join("css");
        fs::create_dir_all(css.join("vendor")).unwrap();
        fs::write(css.join("site.css"), ".a {\n  color: red;\n}\n").unwrap();
        fs::write(css.join("vendor/lib.css"), ".b {\n  color: red;\n}\n").unwrap();

        let count = process_css_dir(&css, &CssOptions::default()).unwrap();

        assert_eq!(count, 1);
        assert!(!fs::read_to_string(css.join("site.css")).unwrap().contains('\n'));
        assert!(fs::read_to_string(css.join("vendor/lib.css")).unwrap().contains('\n'));
    }

    #[test]
    fn missing_css_dir_is_fine() {
        let temp = tempdir().unwrap();

        assert_eq!(
            process_css_dir(&temp.path().join("css"), &CssOptions::default()).unwrap(),
            0
        );
    }

    #[test]
    fn css_parse_error_names_file() {
        let temp = tempdir().unwrap();
        let css = temp.path().join("css");
        fs::create_dir_all(&css).unwrap();
        fs::write(css.join("broken.css"), "..a { color: red; }").unwrap();

        let result = process_css_dir(&css, &CssOptions::default());

        match result {
            Err(PipelineError::Css { path, .. }) => assert!(path.ends_with("broken.css")),
            other => panic!("expected CSS error, got {other:?}"),
        }
    }

    #[test]
    fn minifies_html_and_drops_comments() {
        let html = "<html>\n  <body>\n    <!-- note -->\n    <p>Hi</p>\n  </body>\n</html>";

        let out = minify_html(html).unwrap();

        assert!(out.len() < html.len());
        assert!(out.contains("<p>Hi"));
        assert!(!out.contains("note"));
    }

    #[test]
    fn minifies_inline_scripts() {
        let html = "<p>x</p><script>\n  // counter\n  var visitCount = 1 + 2;\n</script>";

        let out = minify_html(html).unwrap();

        assert!(!out.contains("// counter"));
        assert!(out.contains("visitCount"));
    }

    const HEADERS_JS: &str = r#"
// Collapsible section headers
function toggleHeader(header) {
    var expanded = header.getAttribute("aria-expanded") === "true";
    header.setAttribute("aria-expanded", expanded ? "false" : "true");
    return !expanded;
}

function bindHeaders(root) {
    var headers = root.querySelectorAll(".section-header");
    for (var i = 0; i < headers.length; i++) {
        headers[i].addEventListener("click", function (event) {
            toggleHeader(event.currentTarget);
        });
    }
}
"#;

    #[test]
    fn minified_script_is_smaller_and_keeps_globals() {
        let out = minify_js(HEADERS_JS).unwrap();

        assert!(out.len() < HEADERS_JS.len());
        assert!(!out.contains("Collapsible"));
        assert!(!out.starts_with("<script>"));
        assert!(out.contains("toggleHeader"));
        assert!(out.contains("bindHeaders"));
        assert!(out.contains("aria-expanded"));
    }

    #[test]
    fn rejects_script_with_closing_tag() {
        assert!(minify_js(r#"document.write("</SCRIPT>");"#).is_err());
    }

    #[test]
    fn minifies_configured_scripts() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("output");
        let dest = temp.path().join("deploy");
        fs::create_dir_all(src.join("js")).unwrap();
        fs::write(src.join("js/headers.js"), HEADERS_JS).unwrap();

        let count = minify_scripts(
            &src,
            &dest,
            &[ScriptBundle::new("js/headers.js", "js/headers.min.js")],
        )
        .unwrap();

        assert_eq!(count, 1);
        let minified = fs::read_to_string(dest.join("js/headers.min.js")).unwrap();
        assert!(minified.len() < HEADERS_JS.len());
        assert!(minified.contains("toggleHeader"));
    }

    #[test]
    fn missing_script_source_is_fatal() {
        let temp = tempdir().unwrap();

        let result = minify_scripts(
            temp.path(),
            temp.path(),
            &[ScriptBundle::new("js/headers.js", "js/headers.min.js")],
        );

        match result {
            Err(PipelineError::MissingInput(path)) => assert!(path.ends_with("js/headers.js")),
            other => panic!("expected missing input, got {other:?}"),
        }
    }
}
