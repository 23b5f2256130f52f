//! Shared test utilities for the simple-book test suite.
//!
//! Provides fixture setup and lookup helpers for build results.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let renderer = RecordingRenderer::new();
//! let report = generate_site(tmp.path(), &config, &NoopHooks, &renderer, None).unwrap();
//!
//! let guide = find_book(&report, "User Guide");
//! let chapter = find_render(&renderer, "guide/chapter1.html");
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::render::tests::{RecordedRender, RecordingRenderer};
use crate::site::{BookReport, SiteReport};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// The build consumes `nav.md` and `summary.md`, so every test needs its own
/// copy.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Lookups (panic with a clear message on miss)
// =========================================================================

/// Find a generated book by title. Panics if not found.
pub fn find_book<'a>(report: &'a SiteReport, title: &str) -> &'a BookReport {
    report
        .books
        .iter()
        .find(|b| b.title == title)
        .unwrap_or_else(|| {
            let titles: Vec<&str> = report.books.iter().map(|b| b.title.as_str()).collect();
            panic!("book '{title}' not found. Available: {titles:?}")
        })
}

/// Find a recorded render by output path suffix (`guide/chapter1.html`).
/// Panics if not found.
pub fn find_render(renderer: &RecordingRenderer, output_suffix: &str) -> RecordedRender {
    let renders = renderer.get_renders();
    renders
        .iter()
        .find(|r| r.output_path.ends_with(output_suffix))
        .cloned()
        .unwrap_or_else(|| {
            let outputs: Vec<String> = renders
                .iter()
                .map(|r| r.output_path.display().to_string())
                .collect();
            panic!("no render for '{output_suffix}'. Rendered: {outputs:?}")
        })
}
