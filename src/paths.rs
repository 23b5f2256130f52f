//! Source path resolution and published-path rewriting.
//!
//! Documents come in three source formats, tried in this fixed order when
//! looking for a directory's index page:
//!
//! | Kind | Extension | Published as |
//! |------|-----------|--------------|
//! | Markdown | `.md` | `.html` |
//! | Template | `.tera` | `.html` |
//! | Html | `.html` | unchanged |
//!
//! The "index stem" is the file stem that maps onto `index.html`. It is
//! `index` for the site and for books that use `index.md`, but a book whose
//! menu entry points at `readme.md` uses `readme`. Every function here takes
//! the stem as a parameter; there is no process-wide current stem.

use std::path::{Path, PathBuf};

/// Stem of the site index and of the canonical published index page.
pub const DEFAULT_INDEX_STEM: &str = "index";

/// Recognized document source formats, in index resolution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Markdown,
    Template,
    Html,
}

impl SourceKind {
    pub const INDEX_ORDER: [SourceKind; 3] =
        [SourceKind::Markdown, SourceKind::Template, SourceKind::Html];

    pub fn extension(self) -> &'static str {
        match self {
            SourceKind::Markdown => "md",
            SourceKind::Template => "tera",
            SourceKind::Html => "html",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::INDEX_ORDER
            .into_iter()
            .find(|kind| kind.extension() == ext)
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Whether files of this kind are rendered into a new `.html` file.
    pub fn is_document_source(self) -> bool {
        matches!(self, SourceKind::Markdown | SourceKind::Template)
    }
}

/// Find the index document of `dir` for the given stem.
///
/// Tries `<stem>.md`, `<stem>.tera`, `<stem>.html` in that order and returns
/// the first one that exists as a file.
pub fn resolve_index(dir: &Path, index_stem: &str) -> Option<PathBuf> {
    SourceKind::INDEX_ORDER
        .into_iter()
        .map(|kind| dir.join(format!("{index_stem}.{}", kind.extension())))
        .find(|candidate| candidate.is_file())
}

/// Rewrite a source-relative document path to its published HTML path.
///
/// `guide/intro.md` → `guide/intro.html`; `<index_stem>.md` → `index.html`.
/// Non-document paths (images, `.html`, anything else) pass through, which
/// makes the function idempotent.
pub fn to_published_path(path: &str, index_stem: &str) -> String {
    let (dir, base) = match path.rfind('/') {
        Some(pos) => (&path[..=pos], &path[pos + 1..]),
        None => ("", path),
    };
    let Some((stem, ext)) = split_extension(base) else {
        return path.to_string();
    };
    match SourceKind::from_extension(ext) {
        Some(kind) if kind.is_document_source() => {
            let name = if stem == index_stem {
                DEFAULT_INDEX_STEM
            } else {
                stem
            };
            format!("{dir}{name}.html")
        }
        _ => path.to_string(),
    }
}

/// Split `name.ext` into `("name", "ext")`. Dotfiles have no extension.
fn split_extension(base: &str) -> Option<(&str, &str)> {
    match base.rfind('.') {
        Some(0) | None => None,
        Some(pos) => Some((&base[..pos], &base[pos + 1..])),
    }
}

/// A link target split into its parts.
///
/// `chapter.md?plain#setup` → path `chapter.md`, query `plain`, fragment `setup`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRef<'a> {
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub fragment: Option<&'a str>,
    has_host: bool,
}

impl<'a> LinkRef<'a> {
    pub fn parse(href: &'a str) -> Self {
        let (rest, fragment) = match href.split_once('#') {
            Some((rest, frag)) => (rest, Some(frag)),
            None => (href, None),
        };
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (rest, None),
        };
        Self {
            path,
            query,
            fragment,
            has_host: has_network_host(href),
        }
    }

    /// True when the link leaves the site (`https://…`, `//cdn…`, `mailto:…`).
    pub fn is_external(&self) -> bool {
        self.has_host
    }

    /// `#fragment`, or an empty string when the link has none.
    pub fn fragment_suffix(&self) -> String {
        self.fragment.map(|f| format!("#{f}")).unwrap_or_default()
    }
}

/// Whether `href` points at another host rather than a path in the site.
pub fn is_external(href: &str) -> bool {
    has_network_host(href)
}

fn has_network_host(href: &str) -> bool {
    if let Some(rest) = href.strip_prefix("//") {
        return !rest.is_empty();
    }
    let Some((scheme, rest)) = href.split_once(':') else {
        return false;
    };
    let valid_scheme = scheme
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !valid_scheme || scheme.contains('/') {
        return false;
    }
    match rest.strip_prefix("//") {
        Some(authority) => !authority.is_empty(),
        None => scheme.eq_ignore_ascii_case("mailto"),
    }
}
