//! End-to-end build of `fixtures/site/`: stage into a fresh output directory,
//! generate with the real renderer, and inspect the written HTML.
//!
//! Run with: cargo test --test build_site

use simple_book::hooks::NoopHooks;
use simple_book::render::HtmlRenderer;
use simple_book::site::{self, BuildEvent, SiteError};
use simple_book::{config, stage};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use tempfile::TempDir;

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site")
}

/// Stage the fixture site into `<tmp>/out` and build it there.
fn build() -> (TempDir, PathBuf, Vec<BuildEvent>) {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("out");
    let config = config::load_config(&fixtures()).unwrap();
    stage::stage_sources(&fixtures(), &out).unwrap();

    let (tx, rx) = mpsc::channel();
    site::generate_site(&out, &config, &NoopHooks, &HtmlRenderer::new(), Some(tx)).unwrap();
    let events = rx.iter().collect();
    (tmp, out, events)
}

fn read(out: &Path, rel: &str) -> String {
    fs::read_to_string(out.join(rel)).unwrap_or_else(|e| panic!("reading {rel}: {e}"))
}

#[test]
fn writes_site_and_book_pages() {
    let (_tmp, out, _) = build();

    for page in [
        "index.html",
        "guide/index.html",
        "guide/chapter1.html",
        "guide/chapter2.html",
        "guide/advanced/index.html",
        "guide/advanced/tuning.html",
        "api/readme.html",
    ] {
        assert!(out.join(page).is_file(), "missing {page}");
    }
    assert!(!out.join("guide/missing.html").exists());
    assert!(!out.join("_drafts/index.html").exists());
}

#[test]
fn control_files_consumed_in_output_only() {
    let (_tmp, out, _) = build();

    assert!(!out.join("nav.md").exists());
    assert!(!out.join("guide/summary.md").exists());
    assert!(!out.join("config.toml").exists());
    // The source tree is untouched
    assert!(fixtures().join("nav.md").exists());
    assert!(fixtures().join("guide/summary.md").exists());
}

#[test]
fn summary_refs_rewritten_in_sidebar() {
    let (_tmp, out, _) = build();
    let chapter = read(&out, "guide/chapter1.html");

    assert!(chapter.contains(r#"href="/guide/chapter2.html#section""#));
    assert!(chapter.contains(r#"href="/guide/advanced/tuning.html""#));
    // Unresolved and external entries keep their refs
    assert!(chapter.contains(r#"href="/guide/missing.md""#));
    assert!(chapter.contains(r#"href="https://example.com/docs/index.md""#));
    assert!(chapter.contains(r#"<li class="current"><a href="/guide/chapter1.html">"#));
}

#[test]
fn home_page_links_to_published_books() {
    let (_tmp, out, _) = build();
    let home = read(&out, "index.html");

    assert!(home.contains("<title>Acme Docs</title>"));
    assert!(home.contains(r#"href="/guide/index.html""#));
    assert!(home.contains(r#"href="/api/readme.html""#));
    assert!(home.contains(r#"href="https://github.com/acme/widgets""#));
    assert!(home.contains(r#"<span class="menu-title">Community</span>"#));
    // Site pages have no book sidebar
    assert!(!home.contains(r#"<aside class="book-nav">"#));
}

#[test]
fn book_pages_have_breadcrumb_and_pager() {
    let (_tmp, out, _) = build();
    let chapter = read(&out, "guide/chapter1.html");

    assert!(chapter.contains("<title>Chapter 1</title>"));
    assert!(chapter.contains(r#"<a href="/guide/index.html">User Guide</a>"#));
    assert!(chapter.contains(r#"href="/guide/index.html" rel="prev""#));
    assert!(chapter.contains(r#"href="/guide/chapter2.html" rel="next""#));
}

#[test]
fn html_book_index_wrapped_in_layout() {
    let (_tmp, out, _) = build();
    let api = read(&out, "api/readme.html");

    assert!(api.contains("<title>API Reference</title>"));
    assert!(api.contains("<code>GET /widgets</code>"));
    assert!(api.contains(r#"<aside class="book-nav">"#));
    assert_eq!(api.matches("<!DOCTYPE html>").count(), 1);
}

#[test]
fn markdown_extensions_from_config() {
    let (_tmp, out, _) = build();
    let chapter = read(&out, "guide/chapter2.html");

    assert!(chapter.contains("<table>"));
}

#[test]
fn reports_each_book_then_the_site() {
    let (_tmp, out, events) = build();

    assert_eq!(
        events,
        vec![
            BuildEvent::BookGenerated {
                title: "User Guide".to_string(),
                index_path: out.join("guide/index.html"),
                pages: 5,
            },
            BuildEvent::BookGenerated {
                title: "API Reference".to_string(),
                index_path: out.join("api/readme.html"),
                pages: 1,
            },
            BuildEvent::SiteGenerated {
                title: "Acme Docs".to_string(),
                index_path: out.join("index.html"),
                pages: 7,
            },
        ]
    );
}

#[test]
fn missing_index_fails_without_output() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("src");
    let out = tmp.path().join("out");
    fs::create_dir_all(src.join("guide")).unwrap();
    fs::write(src.join("nav.md"), "* [Guide](/guide/index.md)\n").unwrap();
    fs::write(src.join("guide/index.md"), "# Guide\n").unwrap();

    stage::stage_sources(&src, &out).unwrap();
    let err = site::generate_site(
        &out,
        &config::SiteConfig::default(),
        &NoopHooks,
        &HtmlRenderer::new(),
        None,
    )
    .unwrap_err();

    assert!(matches!(err, SiteError::NoIndexPage(_)));
    assert!(!out.join("index.html").exists());
    assert!(!out.join("guide/index.html").exists());
    // Nothing was consumed either
    assert!(out.join("nav.md").exists());
}

#[test]
fn home_entry_pointing_at_html_site_index_wraps_once() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("src");
    let out = tmp.path().join("out");
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("index.html"), "<html><body><p>Home</p></body></html>").unwrap();
    fs::write(src.join("nav.md"), "* [Home](/index.html)\n").unwrap();

    stage::stage_sources(&src, &out).unwrap();
    site::generate_site(
        &out,
        &config::SiteConfig::default(),
        &NoopHooks,
        &HtmlRenderer::new(),
        None,
    )
    .unwrap();

    let home = read(&out, "index.html");
    assert_eq!(home.matches(r#"<header class="site-header">"#).count(), 1);
    assert_eq!(home.matches("<!DOCTYPE html>").count(), 1);
    assert!(home.contains("<p>Home</p>"));
}
