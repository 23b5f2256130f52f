//! Book discovery from the site's top menu.
//!
//! A top-menu item is a book when its `ref` points into a directory that
//! exists under the site root:
//!
//! ```text
//! * [Guide](/guide/index.md)     → book dir  <root>/guide, index file index.md
//! * [API](/api/readme.md)        → book dir  <root>/api,   index file readme.md
//! * [Blog](https://blog.acme)    → external, never a book
//! * [Old](/gone/index.md)        → no such directory, skipped
//! * [Drafts](/_drafts/index.md)  → excluded (leading `_`)
//! ```
//!
//! Each accepted item has its `ref` rewritten in place to the published path
//! (`./guide/index.html`), so the navigation rendered for books links to HTML.
//! Whether the index file itself exists is checked later, when the book is
//! resolved; a directory without one is skipped there.

use crate::paths::{self, DEFAULT_INDEX_STEM};
use crate::types::Menu;
use std::path::{Path, PathBuf};

/// Where a book lives and which file its menu entry points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookLocation {
    pub dir: PathBuf,
    /// File name of the index document as written in the menu (`readme.md`).
    pub index_file: String,
}

impl BookLocation {
    /// The index file name without extension: the book's index stem.
    pub fn index_stem(&self) -> &str {
        match self.index_file.rfind('.') {
            Some(pos) if pos > 0 => &self.index_file[..pos],
            _ => &self.index_file,
        }
    }
}

/// Find the books linked from `menu`, in menu order.
///
/// Items that are not books are left untouched. `None` (no navigation, or a
/// navigation without lists) yields no books.
pub fn discover_books(menu: Option<&mut Menu>, site_root: &Path) -> Vec<BookLocation> {
    let Some(menu) = menu else {
        return Vec::new();
    };

    let mut books = Vec::new();
    for item in &mut menu.items {
        let Some(href) = item.href.as_deref() else {
            continue;
        };
        if href.is_empty() || paths::is_external(href) {
            continue;
        }

        let normalized = normalize_ref(href);
        let relative = normalized.trim_start_matches("./");
        let target = site_root.join(relative);
        let (Some(dir), Some(index_file)) = (target.parent(), target.file_name()) else {
            continue;
        };

        // A lookup failure means "not a book", never an error.
        let Ok(meta) = std::fs::metadata(dir) else {
            log::debug!("skipping menu item {:?}: {} not found", item.title, dir.display());
            continue;
        };
        if !meta.is_dir() || is_excluded(relative) {
            continue;
        }

        books.push(BookLocation {
            dir: dir.to_path_buf(),
            index_file: index_file.to_string_lossy().into_owned(),
        });
        item.href = Some(paths::to_published_path(&normalized, DEFAULT_INDEX_STEM));
    }

    log::debug!("discovered {} book(s)", books.len());
    books
}

/// `/guide/index.md` → `./guide/index.md`; relative refs are unchanged.
fn normalize_ref(href: &str) -> String {
    match href.strip_prefix('/') {
        Some(rest) => format!("./{rest}"),
        None => href.to_string(),
    }
}

/// Private (`_drafts/…`) and stylesheet (`style/…`) directories are never books.
fn is_excluded(relative: &str) -> bool {
    let first = relative.split('/').next().unwrap_or_default();
    first.starts_with('_') || first == "style"
}
