//! Entry markup preparation.
//!
//! Bundles are authored with paths relative to their own directory. Once the
//! markup is embedded in the host those paths would resolve against the host
//! document, so the rewriter adds a `<base>` pointing at the bundle directory
//! and links every declared stylesheet by an href under the mount path the
//! bundles are served from.

use std::sync::LazyLock;

use regex::Regex;

use funzone_core::BundleDescriptor;

static BASE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<base[\s/>]").expect("valid base regex"));

static HEAD_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<head(\s[^>]*)?>").expect("valid head regex"));

static HEAD_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</head\s*>").expect("valid head close regex"));

/// Pure transformation from raw entry markup to embeddable markup.
///
/// Hrefs are built under a mount path, the host path that bundle paths are
/// served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupRewriter {
    mount: String,
}

impl Default for MarkupRewriter {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkupRewriter {
    /// Create a rewriter for bundles served from the host root.
    #[must_use]
    pub fn new() -> Self {
        Self::mounted_at("/")
    }

    /// Create a rewriter for bundles served under `mount`.
    #[must_use]
    pub fn mounted_at(mount: impl Into<String>) -> Self {
        let mut mount = mount.into();
        if !mount.starts_with('/') {
            mount.insert(0, '/');
        }
        if !mount.ends_with('/') {
            mount.push('/');
        }
        Self { mount }
    }

    /// The mount path, always starting and ending with `/`.
    #[must_use]
    pub fn mount(&self) -> &str {
        &self.mount
    }

    /// Prepare `raw` for embedding.
    ///
    /// A `<base>` for the bundle directory is inserted unless one already
    /// exists. One stylesheet link per declared style is inserted, in
    /// declaration order, just before `</head>`. Everything else in the
    /// document is left untouched.
    #[must_use]
    pub fn rewrite(&self, raw: &str, descriptor: &BundleDescriptor) -> String {
        let mut html = raw.to_owned();

        if !BASE_TAG.is_match(&html) {
            let base = self.base_tag(descriptor.entry_dir());
            html = match HEAD_OPEN.find(&html) {
                Some(m) => splice(&html, m.end(), &base),
                None => format!("<head>{base}</head>\n{html}"),
            };
        }

        let styles = descriptor.style_paths();
        if !styles.is_empty() {
            let links = styles
                .iter()
                .map(|path| self.stylesheet_link(path))
                .collect::<Vec<_>>()
                .join("\n");
            html = if let Some(m) = HEAD_CLOSE.find(&html) {
                splice(&html, m.start(), &format!("{links}\n"))
            } else if let Some(m) = HEAD_OPEN.find(&html) {
                splice(&html, m.end(), &links)
            } else {
                format!("<head>{links}</head>\n{html}")
            };
        }

        html
    }

    fn base_tag(&self, entry_dir: &str) -> String {
        let href = if entry_dir.is_empty() {
            self.mount.clone()
        } else {
            format!("{}{entry_dir}/", self.mount)
        };
        format!("<base href=\"{}\">", escape_attr(&href))
    }

    fn stylesheet_link(&self, path: &str) -> String {
        format!(
            "<link rel=\"stylesheet\" href=\"{}\">",
            escape_attr(&mounted_href(&self.mount, path))
        )
    }
}

/// Resolve a declared path against `mount`.
///
/// Relative paths and paths with a leading `/` both land under the mount;
/// URLs are unchanged.
#[must_use]
pub fn mounted_href(mount: &str, path: &str) -> String {
    if path.contains("://") {
        return path.to_owned();
    }
    let mount = mount.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{mount}/{path}")
}

fn splice(html: &str, at: usize, insert: &str) -> String {
    let (before, after) = html.split_at(at);
    format!("{before}{insert}{after}")
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kanban() -> BundleDescriptor {
        BundleDescriptor::new("kanban", "Kanban Board", "Kanban/index1.html")
            .unwrap()
            .with_style("Kanban/style1.css")
            .with_script("Kanban/javascript1.js")
    }

    const DOC: &str = "<!DOCTYPE html>\n<html>\n<head>\n<title>Board</title>\n</head>\n<body><div id=\"board\"></div></body>\n</html>";

    #[test]
    fn test_inserts_base_after_head_open() {
        let out = MarkupRewriter::new().rewrite(DOC, &kanban());
        assert!(out.contains("<head><base href=\"/Kanban/\">\n<title>"));
    }

    #[test]
    fn test_rewriting_output_adds_no_second_base() {
        let rewriter = MarkupRewriter::new();
        let once = rewriter.rewrite(DOC, &kanban());
        let twice = rewriter.rewrite(&once, &kanban());
        assert_eq!(twice.matches("<base").count(), 1);
    }

    #[test]
    fn test_existing_base_is_kept() {
        let raw = "<html><head><base href=\"/custom/\"></head><body></body></html>";
        let out = MarkupRewriter::new().rewrite(raw, &kanban());
        assert_eq!(out.matches("<base").count(), 1);
        assert!(out.contains("/custom/"));
    }

    #[test]
    fn test_stylesheets_before_head_close_in_order() {
        let descriptor = kanban().with_style("Kanban/theme.css");
        let out = MarkupRewriter::new().rewrite(DOC, &descriptor);

        assert_eq!(out.matches("rel=\"stylesheet\"").count(), 2);
        let first = out.find("/Kanban/style1.css").unwrap();
        let second = out.find("/Kanban/theme.css").unwrap();
        let close = out.find("</head>").unwrap();
        assert!(first < second);
        assert!(second < close);
    }

    #[test]
    fn test_no_styles_adds_no_links() {
        let descriptor = BundleDescriptor::new("bare", "Bare", "bare/index.html").unwrap();
        let out = MarkupRewriter::new().rewrite(DOC, &descriptor);
        assert!(!out.contains("<link"));
    }

    #[test]
    fn test_body_is_untouched() {
        let out = MarkupRewriter::new().rewrite(DOC, &kanban());
        assert!(out.contains("<body><div id=\"board\"></div></body>"));
        assert!(out.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn test_fragment_without_head_gets_synthesized_head() {
        let out = MarkupRewriter::new().rewrite("<div>plain</div>", &kanban());
        assert!(out.starts_with("<head><base href=\"/Kanban/\">"));
        assert!(out.contains("<link rel=\"stylesheet\" href=\"/Kanban/style1.css\">\n</head>"));
        assert!(out.ends_with("<div>plain</div>"));
    }

    #[test]
    fn test_header_element_is_not_head() {
        let raw = "<header>top</header><p>x</p>";
        let out = MarkupRewriter::new().rewrite(raw, &kanban());
        assert!(out.starts_with("<head>"));
        assert!(out.contains("<header>top</header>"));
    }

    #[test]
    fn test_uppercase_head() {
        let raw = "<HTML><HEAD lang=\"en\"><TITLE>x</TITLE></HEAD><BODY></BODY></HTML>";
        let out = MarkupRewriter::new().rewrite(raw, &kanban());
        assert!(out.contains("<HEAD lang=\"en\"><base href=\"/Kanban/\">"));
        assert!(out.contains("style1.css\">\n</HEAD>"));
    }

    #[test]
    fn test_root_entry_uses_root_base() {
        let descriptor = BundleDescriptor::new("solo", "Solo", "index.html").unwrap();
        let out = MarkupRewriter::new().rewrite(DOC, &descriptor);
        assert!(out.contains("<base href=\"/\">"));
    }

    #[test]
    fn test_deterministic() {
        let rewriter = MarkupRewriter::new();
        assert_eq!(rewriter.rewrite(DOC, &kanban()), rewriter.rewrite(DOC, &kanban()));
    }

    #[test]
    fn test_head_without_close_gets_links_after_open() {
        let raw = "<head><title>x</title><body><p>x</p></body>";
        let descriptor = kanban().with_style("Kanban/theme.css");
        let out = MarkupRewriter::new().rewrite(raw, &descriptor);

        assert!(out.starts_with(
            "<head><link rel=\"stylesheet\" href=\"/Kanban/style1.css\">\n\
             <link rel=\"stylesheet\" href=\"/Kanban/theme.css\">\
             <base href=\"/Kanban/\"><title>x</title>"
        ));
        assert_eq!(out.matches("<head").count(), 1);
        assert!(out.ends_with("<body><p>x</p></body>"));
    }

    #[test]
    fn test_mounted_rewriter_prefixes_base_and_links() {
        let descriptor = BundleDescriptor::new("bingo", "Bingo", "assets/funzone/Bingo/bingo.html")
            .unwrap()
            .with_style("assets/funzone/Bingo/style.css");
        let out = MarkupRewriter::mounted_at("/app/").rewrite(DOC, &descriptor);

        assert!(out.contains("<base href=\"/app/assets/funzone/Bingo/\">"));
        assert!(out.contains("href=\"/app/assets/funzone/Bingo/style.css\""));
        assert!(!out.contains("\"/assets/"));
    }

    #[test]
    fn test_mount_is_normalized() {
        assert_eq!(MarkupRewriter::mounted_at("app").mount(), "/app/");
        assert_eq!(MarkupRewriter::mounted_at("/").mount(), "/");
        assert_eq!(MarkupRewriter::default().mount(), "/");
    }

    #[test]
    fn test_mounted_href() {
        assert_eq!(mounted_href("/", "Kanban/style1.css"), "/Kanban/style1.css");
        assert_eq!(mounted_href("/", "/abs.css"), "/abs.css");
        assert_eq!(mounted_href("/app/", "Kanban/style1.css"), "/app/Kanban/style1.css");
        assert_eq!(mounted_href("/app/", "/abs.css"), "/app/abs.css");
        assert_eq!(mounted_href("/app/", "https://cdn/x.css"), "https://cdn/x.css");
    }
}
