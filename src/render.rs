//! Page rendering.
//!
//! The emission queue hands each [`PageRequest`] to a [`PageRenderer`]. The
//! production [`HtmlRenderer`] turns a source file into a finished page:
//!
//! | Source | Body | Title / description |
//! |--------|------|---------------------|
//! | `.md` | `pulldown-cmark` HTML | first `# heading` / first paragraph |
//! | `.tera` | Tera output against the page context | from the rendered HTML |
//! | `.html` | contents of `<body>` (or the whole fragment) | `<title>` or `<h1>` / meta description |
//! | anything else | copied unchanged | — |
//!
//! Rendered bodies are wrapped in one Maud layout: a site header with the
//! navigation menus, a sidebar with the book's summary, and a prev/next pager.
//!
//! ## Links
//!
//! All generated links are site-absolute. Navigation refs are written relative
//! to the site root (`/guide/index.md`, `./guide/index.html`, `faq.md`) and are
//! passed through [`to_published_path`] here, so the home page links to HTML
//! even though it is rendered before books are discovered. Summary refs are
//! relative to the book and prefixed with the book's `base_url`.
//!
//! ## Templates
//!
//! `.tera` sources see four variables: `config` (the site configuration),
//! `navigation` (menus, possibly absent), `book` (absent on site pages) and
//! `page` (`src_path`, `dist_path`, `prev`, `next`).

use crate::config;
use crate::markdown;
use crate::metadata::{self, PageInfo};
use crate::paths::{self, DEFAULT_INDEX_STEM, LinkRef, SourceKind, to_published_path};
use crate::types::{BookInfo, Entry, MenuItem, Navigation, PageRequest};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tera::Tera;
use thiserror::Error;

const CSS_STATIC: &str = include_str!("../static/style.css");

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Template error: {0}")]
    Template(#[from] tera::Error),
}

/// Turns one queued request into one output file.
///
/// Must be `Sync`: the queue renders a flush's requests in parallel.
pub trait PageRenderer: Sync {
    fn render(&self, request: &PageRequest) -> Result<(), RenderError>;
}

/// Renders Markdown, Tera and HTML sources into the site layout.
///
/// Pages are built in place, so an `.html` source is overwritten by its own
/// page. The renderer remembers every file it wrote during the run and never
/// reads one of them back as a source.
#[derive(Debug, Default)]
pub struct HtmlRenderer {
    written: Mutex<HashSet<PathBuf>>,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn written(&self) -> MutexGuard<'_, HashSet<PathBuf>> {
        self.written.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PageRenderer for HtmlRenderer {
    fn render(&self, request: &PageRequest) -> Result<(), RenderError> {
        let output = request.output_path();
        if self.written().contains(&request.src_path) {
            log::debug!(
                "{} is already a rendered page, keeping it",
                request.src_path.display()
            );
            return Ok(());
        }
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)?;
        }

        let kind = SourceKind::from_path(&request.src_path);
        let Some(kind) = kind else {
            if request.src_path != output {
                fs::copy(&request.src_path, &output)?;
            }
            return Ok(());
        };

        let source = fs::read_to_string(&request.src_path)?;
        let (body, info) = match kind {
            SourceKind::Markdown => (
                markdown::to_html(&source, &request.context.site.config.markdown),
                markdown::page_info(&source),
            ),
            SourceKind::Template => {
                let rendered = render_template(&source, request)?;
                let info = metadata::html_page_info(&rendered);
                (metadata::html_body(&rendered).to_string(), info)
            }
            SourceKind::Html => (
                metadata::html_body(&source).to_string(),
                metadata::html_page_info(&source),
            ),
        };

        let page = render_page(request, &body, &info);
        fs::write(&output, page.into_string())?;
        self.written().insert(output.clone());
        log::debug!(
            "rendered {} → {}",
            request.src_path.display(),
            output.display()
        );
        Ok(())
    }
}

fn render_template(source: &str, request: &PageRequest) -> Result<String, RenderError> {
    let ctx = &request.context;
    let mut tera = Tera::default();
    tera.add_raw_template("page", source)?;

    let mut context = tera::Context::new();
    context.insert("config", &ctx.site.config);
    context.insert("navigation", &ctx.site.navigation);
    context.insert("book", &ctx.book.as_deref());
    context.insert("page", &ctx.page);

    Ok(tera.render("page", &context)?)
}

// ============================================================================
// Layout
// ============================================================================

fn render_page(request: &PageRequest, body: &str, info: &PageInfo) -> Markup {
    let ctx = &request.context;
    let config = &ctx.site.config;
    let book = ctx.book.as_deref();

    let title = metadata::resolve(&[
        info.title.as_deref(),
        book.map(|b| b.title.as_str()),
        Some(config.title.as_str()),
    ])
    .unwrap_or_default();
    let description = metadata::resolve(&[
        info.description.as_deref(),
        book.map(|b| b.description.as_str()),
        Some(config.description.as_str()),
    ]);
    let css = format!("{}\n{}", config::generate_color_css(&config.colors), CSS_STATIC);

    let breadcrumb = html! {
        a href="/" { (config.title) }
        @if let Some(book) = book {
            " › "
            a href={ (book.base_url) (book.index) } { (book.title) }
        }
    };
    let nav = match &ctx.site.navigation {
        Some(navigation) => render_navigation(navigation),
        None => html! {},
    };

    let content = html! {
        (site_header(breadcrumb, nav))
        div.layout {
            @if let Some(book) = book {
                aside.book-nav {
                    (render_summary(book, &ctx.page.dist_path))
                }
            }
            main {
                article.page-content {
                    (PreEscaped(body))
                }
                (render_pager(ctx.page.prev.as_deref(), ctx.page.next.as_deref()))
            }
        }
    };

    base_document(&title, description.as_deref(), &css, content)
}

/// Renders the base HTML document structure
fn base_document(title: &str, description: Option<&str>, css: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                @if let Some(description) = description {
                    meta name="description" content=(description);
                }
                style { (PreEscaped(css)) }
            }
            body {
                (content)
            }
        }
    }
}

fn site_header(breadcrumb: Markup, nav: Markup) -> Markup {
    html! {
        header.site-header {
            nav.breadcrumb {
                (breadcrumb)
            }
            nav.site-nav {
                (nav)
            }
        }
    }
}

/// Renders every menu of the site navigation.
pub fn render_navigation(navigation: &Navigation) -> Markup {
    html! {
        @for menu in &navigation.menus {
            div.menu {
                @if let Some(title) = &menu.title {
                    span.menu-title { (title) }
                }
                ul {
                    @for item in &menu.items {
                        (render_menu_item(item))
                    }
                }
            }
        }
    }
}

fn render_menu_item(item: &MenuItem) -> Markup {
    html! {
        li {
            @match &item.href {
                Some(href) => { a href=(site_href(href)) { (item.title) } }
                None => { span.nav-group { (item.title) } }
            }
            @if !item.items.is_empty() {
                ul {
                    @for child in &item.items {
                        (render_menu_item(child))
                    }
                }
            }
        }
    }
}

/// Renders a book's summary as nested lists, marking the current page.
pub fn render_summary(book: &BookInfo, current: &str) -> Markup {
    html! {
        a.book-title href={ (book.base_url) (book.index) } { (book.title) }
        @if let Some(entries) = &book.summary {
            (render_entries(entries, &book.base_url, current))
        }
    }
}

fn render_entries(entries: &[Entry], base_url: &str, current: &str) -> Markup {
    html! {
        ul {
            @for entry in entries {
                @let is_current = entry
                    .href
                    .as_deref()
                    .is_some_and(|href| LinkRef::parse(href).path == current);
                li class=[is_current.then_some("current")] {
                    @match &entry.href {
                        Some(href) => { a href=(book_href(href, base_url)) { (entry.title) } }
                        None => { span.section { (entry.title) } }
                    }
                    @if !entry.articles.is_empty() {
                        (render_entries(&entry.articles, base_url, current))
                    }
                }
            }
        }
    }
}

fn render_pager(prev: Option<&str>, next: Option<&str>) -> Markup {
    html! {
        @if prev.is_some() || next.is_some() {
            nav.pager {
                @if let Some(prev) = prev {
                    a.prev href=(prev) rel="prev" { "← Previous" }
                }
                @if let Some(next) = next {
                    a.next href=(next) rel="next" { "Next →" }
                }
            }
        }
    }
}

/// Site-absolute href for a navigation ref.
pub fn site_href(href: &str) -> String {
    let link = LinkRef::parse(href);
    if link.is_external() || link.path.is_empty() {
        return href.to_string();
    }
    let relative = link.path.trim_start_matches("./").trim_start_matches('/');
    format!(
        "/{}{}",
        to_published_path(relative, DEFAULT_INDEX_STEM),
        link.fragment_suffix()
    )
}

/// Site-absolute href for a summary ref of the book at `base_url`.
fn book_href(href: &str, base_url: &str) -> String {
    if paths::is_external(href) || href.starts_with('#') {
        href.to_string()
    } else {
        format!("{base_url}{href}")
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::types::{Menu, SiteContext};
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// Renderer that records requests instead of writing files.
    /// Uses Mutex so it is Sync and works with rayon's par_iter.
    #[derive(Default)]
    pub struct RecordingRenderer {
        pub rendered: Mutex<Vec<RecordedRender>>,
        /// Fail every request whose `dist_path` equals this.
        pub fail_on: Option<String>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordedRender {
        pub src_path: PathBuf,
        pub output_path: PathBuf,
        pub dist_path: String,
        pub book: Option<String>,
        pub prev: Option<String>,
        pub next: Option<String>,
    }

    impl RecordingRenderer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_on(dist_path: &str) -> Self {
            Self {
                fail_on: Some(dist_path.to_string()),
                ..Self::default()
            }
        }

        /// Recorded renders sorted by output path; flush order is parallel.
        pub fn get_renders(&self) -> Vec<RecordedRender> {
            let mut renders = self.rendered.lock().unwrap().clone();
            renders.sort_by(|a, b| a.output_path.cmp(&b.output_path));
            renders
        }

        pub fn output_paths(&self) -> Vec<PathBuf> {
            self.get_renders().into_iter().map(|r| r.output_path).collect()
        }
    }

    impl PageRenderer for RecordingRenderer {
        fn render(&self, request: &PageRequest) -> Result<(), RenderError> {
            let page = &request.context.page;
            self.rendered.lock().unwrap().push(RecordedRender {
                src_path: request.src_path.clone(),
                output_path: request.output_path(),
                dist_path: request.dist_path.clone(),
                book: request.context.book.as_ref().map(|b| b.title.clone()),
                prev: page.prev.clone(),
                next: page.next.clone(),
            });
            if self.fail_on.as_deref() == Some(request.dist_path.as_str()) {
                return Err(RenderError::Io(std::io::Error::other(format!(
                    "cannot render {}",
                    request.dist_path
                ))));
            }
            Ok(())
        }
    }

    fn site(navigation: Option<Navigation>) -> Arc<SiteContext> {
        Arc::new(SiteContext {
            config: SiteConfig {
                title: "Acme Docs".to_string(),
                ..SiteConfig::default()
            },
            navigation,
        })
    }

    fn guide_book() -> Arc<BookInfo> {
        Arc::new(BookInfo {
            title: "User Guide".to_string(),
            description: "How to use it.".to_string(),
            summary: Some(vec![
                Entry::link("Chapter 1", "chapter1.html"),
                Entry::section(
                    "Advanced",
                    vec![
                        Entry::link("Chapter 2", "chapter2.html#setup"),
                        Entry::link("Missing", "missing.md"),
                    ],
                ),
                Entry::link("Elsewhere", "https://example.com/x"),
            ]),
            base_url: "/guide/".to_string(),
            index: "index.html".to_string(),
        })
    }

    fn request(dir: &Path, src: &str, dist: &str, book: Option<Arc<BookInfo>>) -> PageRequest {
        PageRequest::new(dir.join(src), dir, dist.to_string(), site(None), book)
    }

    // =========================================================================
    // HtmlRenderer
    // =========================================================================

    #[test]
    fn renders_markdown_into_layout() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("chapter1.md"), "# Chapter One\n\nFirst steps.\n").unwrap();

        HtmlRenderer::new()
            .render(&request(tmp.path(), "chapter1.md", "chapter1.html", Some(guide_book())))
            .unwrap();

        let html = fs::read_to_string(tmp.path().join("chapter1.html")).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Chapter One</title>"));
        assert!(html.contains(r#"<meta name="description" content="First steps.">"#));
        assert!(html.contains("<h1>Chapter One</h1>"));
        assert!(html.contains("--color-link"));
    }

    #[test]
    fn renders_into_nested_directories() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("page.md"), "text").unwrap();

        HtmlRenderer::new()
            .render(&request(tmp.path(), "page.md", "deep/er/page.html", None))
            .unwrap();
        assert!(tmp.path().join("deep/er/page.html").exists());
    }

    #[test]
    fn untitled_page_falls_back_to_book_then_site() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.md"), "no heading").unwrap();

        HtmlRenderer::new()
            .render(&request(tmp.path(), "a.md", "a.html", Some(guide_book())))
            .unwrap();
        let html = fs::read_to_string(tmp.path().join("a.html")).unwrap();
        assert!(html.contains("<title>User Guide</title>"));

        HtmlRenderer::new()
            .render(&request(tmp.path(), "a.md", "b.html", None))
            .unwrap();
        let html = fs::read_to_string(tmp.path().join("b.html")).unwrap();
        assert!(html.contains("<title>Acme Docs</title>"));
    }

    #[test]
    fn renders_html_source_in_place() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("index.html"),
            "<html><head><title>API</title></head><body><p>Endpoints</p></body></html>",
        )
        .unwrap();

        HtmlRenderer::new()
            .render(&request(tmp.path(), "index.html", "index.html", None))
            .unwrap();
        let html = fs::read_to_string(tmp.path().join("index.html")).unwrap();
        assert!(html.contains("<title>API</title>"));
        assert!(html.contains(r#"<article class="page-content"><p>Endpoints</p></article>"#));
    }

    #[test]
    fn html_page_rendered_once_per_run() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("index.html"),
            "<html><body><p>Home</p></body></html>",
        )
        .unwrap();
        let renderer = HtmlRenderer::new();

        renderer
            .render(&request(tmp.path(), "index.html", "index.html", None))
            .unwrap();
        renderer
            .render(&request(tmp.path(), "index.html", "index.html", Some(guide_book())))
            .unwrap();

        let html = fs::read_to_string(tmp.path().join("index.html")).unwrap();
        assert_eq!(html.matches(r#"<header class="site-header">"#).count(), 1);
        assert_eq!(html.matches("<!DOCTYPE html>").count(), 1);
        assert!(html.contains(r#"<article class="page-content"><p>Home</p></article>"#));
    }

    #[test]
    fn renders_tera_template_with_context() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("index.tera"),
            "<h1>{{ book.title }}</h1><p>{{ config.title }} / {{ page.dist_path }}</p>",
        )
        .unwrap();

        HtmlRenderer::new()
            .render(&request(tmp.path(), "index.tera", "index.html", Some(guide_book())))
            .unwrap();
        let html = fs::read_to_string(tmp.path().join("index.html")).unwrap();
        assert!(html.contains("<title>User Guide</title>"));
        assert!(html.contains("<p>Acme Docs / index.html</p>"));
    }

    #[test]
    fn broken_template_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("index.tera"), "{% if %}").unwrap();

        let err = HtmlRenderer::new()
            .render(&request(tmp.path(), "index.tera", "index.html", None))
            .unwrap_err();
        assert!(matches!(err, RenderError::Template(_)));
    }

    #[test]
    fn copies_other_files() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("logo.svg"), "<svg/>").unwrap();

        HtmlRenderer::new()
            .render(&request(tmp.path(), "logo.svg", "img/logo.svg", None))
            .unwrap();
        assert_eq!(
            fs::read_to_string(tmp.path().join("img/logo.svg")).unwrap(),
            "<svg/>"
        );
    }

    #[test]
    fn missing_source_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let err = HtmlRenderer::new()
            .render(&request(tmp.path(), "gone.md", "gone.html", None))
            .unwrap_err();
        assert!(matches!(err, RenderError::Io(_)));
    }

    // =========================================================================
    // Layout pieces
    // =========================================================================

    #[test]
    fn summary_marks_current_and_prefixes_base_url() {
        let html = render_summary(&guide_book(), "chapter2.html").into_string();
        assert!(html.contains(r#"href="/guide/chapter1.html""#));
        assert!(html.contains(r#"<li class="current"><a href="/guide/chapter2.html#setup">"#));
        assert!(html.contains(r#"href="/guide/missing.md""#));
        assert!(html.contains(r#"href="https://example.com/x""#));
        assert!(html.contains(r#"<span class="section">Advanced</span>"#));
    }

    #[test]
    fn navigation_links_are_published_and_absolute() {
        let navigation = Navigation {
            title: None,
            menus: vec![Menu {
                title: Some("Docs".to_string()),
                items: vec![
                    MenuItem {
                        title: "Guide".to_string(),
                        href: Some("/guide/index.md".to_string()),
                        items: vec![],
                    },
                    MenuItem {
                        title: "Blog".to_string(),
                        href: Some("https://blog.example.com".to_string()),
                        items: vec![],
                    },
                    MenuItem {
                        title: "More".to_string(),
                        href: None,
                        items: vec![],
                    },
                ],
            }],
        };
        let html = render_navigation(&navigation).into_string();
        assert!(html.contains(r#"<span class="menu-title">Docs</span>"#));
        assert!(html.contains(r#"href="/guide/index.html""#));
        assert!(html.contains(r#"href="https://blog.example.com""#));
        assert!(html.contains(r#"<span class="nav-group">More</span>"#));
    }

    #[test]
    fn site_href_normalizes_every_local_form() {
        assert_eq!(site_href("/guide/index.md"), "/guide/index.html");
        assert_eq!(site_href("./guide/index.html"), "/guide/index.html");
        assert_eq!(site_href("faq.md#top"), "/faq.html#top");
        assert_eq!(site_href("#top"), "#top");
        assert_eq!(site_href("mailto:team@example.com"), "mailto:team@example.com");
    }

    #[test]
    fn pager_only_when_neighbours_exist() {
        assert_eq!(render_pager(None, None).into_string(), "");
        let html = render_pager(Some("/guide/index.html"), None).into_string();
        assert!(html.contains(r#"rel="prev""#));
        assert!(!html.contains(r#"rel="next""#));
    }

    #[test]
    fn html_escape_in_titles() {
        let book = BookInfo {
            title: "<script>alert('x')</script>".to_string(),
            base_url: "/b/".to_string(),
            index: "index.html".to_string(),
            ..BookInfo::default()
        };
        let html = render_summary(&book, "").into_string();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
