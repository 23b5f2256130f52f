//! Page metadata extraction and resolution.
//!
//! Each page can carry a title and a description. Where they come from
//! depends on the source format:
//!
//! - **Markdown**: first `# heading` and first paragraph
//!   (see [`markdown::page_info`](crate::markdown::page_info))
//! - **HTML**: `<title>` (or the first `<h1>`) and `<meta name="description">`
//! - **Template**: nothing; templates compute their own output
//!
//! Each field is resolved independently with [`resolve`]; the first non-empty
//! source wins. Books fall back to the site title when their index page has
//! none, and to an empty description.

use crate::config::SiteConfig;
use crate::markdown;
use crate::paths::SourceKind;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap());
static H1_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h1[^>]*>(.*?)</h1>").unwrap());
static META_DESCRIPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<meta\s+[^>]*name\s*=\s*["']description["'][^>]*content\s*=\s*["']([^"']*)["']"#)
        .unwrap()
});
static BODY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<body[^>]*>(.*)</body>").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Title and description of a single page. Either may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageInfo {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Resolve a metadata field from multiple sources.
///
/// Takes a list of optional values in priority order and returns the first
/// non-None, non-empty value.
pub fn resolve(sources: &[Option<&str>]) -> Option<String> {
    sources
        .iter()
        .filter_map(|opt| {
            opt.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
        .next()
}

/// Extract title and description from an HTML document or fragment.
pub fn html_page_info(source: &str) -> PageInfo {
    let capture = |re: &Regex| {
        re.captures(source)
            .and_then(|c| c.get(1))
            .map(|m| strip_tags(m.as_str()))
    };
    let title = capture(&TITLE_RE);
    let h1 = capture(&H1_RE);
    let description = capture(&META_DESCRIPTION_RE);

    PageInfo {
        title: resolve(&[title.as_deref(), h1.as_deref()]),
        description: resolve(&[description.as_deref()]),
    }
}

/// The part of an HTML source that goes inside the page layout: the contents
/// of `<body>` for a full document, the whole source for a fragment.
pub fn html_body(source: &str) -> &str {
    BODY_RE
        .captures(source)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(source)
}

fn strip_tags(html: &str) -> String {
    let text = TAG_RE.replace_all(html, "");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Page info of an already-read source, by format.
pub fn page_info_for(kind: Option<SourceKind>, source: &str) -> PageInfo {
    match kind {
        Some(SourceKind::Markdown) => markdown::page_info(source),
        Some(SourceKind::Html) => html_page_info(source),
        Some(SourceKind::Template) | None => PageInfo::default(),
    }
}

/// Title and description of a book, read from its index document.
///
/// Templated index pages are not parsed and contribute nothing.
pub fn book_info(index_path: &Path, config: &SiteConfig) -> std::io::Result<(String, String)> {
    let info = match SourceKind::from_path(index_path) {
        Some(SourceKind::Template) => PageInfo::default(),
        kind => page_info_for(kind, &std::fs::read_to_string(index_path)?),
    };
    let title = resolve(&[info.title.as_deref(), Some(config.title.as_str())]).unwrap_or_default();
    let description = info.description.unwrap_or_default();
    Ok((title, description))
}
