//! CLI output formatting.
//!
//! Output is one line per finished unit of work, in the order the build
//! completes them:
//!
//! ```text
//! Generated book "User Guide" → guide/index.html (4 pages)
//! Skipped notes: no index page
//! Generated site "Acme Docs" → index.html
//! ```
//!
//! Paths are shown relative to the output directory when possible.
//!
//! # Architecture
//!
//! Each event has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::site::BuildEvent;
use std::error::Error;
use std::path::Path;

fn display_path(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn pages_label(n: usize) -> String {
    match n {
        1 => "1 page".to_string(),
        n => format!("{n} pages"),
    }
}

/// Format one build event as display lines.
pub fn format_build_event(event: &BuildEvent, output_root: &Path) -> Vec<String> {
    match event {
        BuildEvent::BookGenerated {
            title,
            index_path,
            pages,
        } => vec![format!(
            "Generated book \"{}\" \u{2192} {} ({})",
            title,
            display_path(index_path, output_root),
            pages_label(*pages)
        )],
        BuildEvent::BookSkipped { dir } => vec![format!(
            "Skipped {}: no index page",
            display_path(dir, output_root)
        )],
        BuildEvent::SiteGenerated {
            title, index_path, ..
        } => vec![format!(
            "Generated site \"{}\" \u{2192} {}",
            title,
            display_path(index_path, output_root)
        )],
    }
}

pub fn print_build_event(event: &BuildEvent, output_root: &Path) {
    for line in format_build_event(event, output_root) {
        println!("{}", line);
    }
}

/// Format an error and its chain of causes as a single line.
///
/// ```text
/// Error: build failed at stage 'book pages queued': failed to render guide/a.md: IO error: denied
/// ```
pub fn format_error(err: &dyn Error) -> String {
    let mut line = format!("Error: {err}");
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        // thiserror messages usually embed their source already
        if !line.contains(&text) {
            line.push_str(": ");
            line.push_str(&text);
        }
        source = cause.source();
    }
    line
}
