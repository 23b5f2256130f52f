//! Shared types used across the pipeline.
//!
//! Navigation and summary trees are produced by the parsers, rewritten by the
//! orchestrator, and serialized into template contexts, so field names follow
//! what templates see (`ref`, `articles`, `items`).

use crate::config::SiteConfig;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Site navigation parsed from `nav.md`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Navigation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub menus: Vec<Menu>,
}

impl Navigation {
    /// The canonical top-level menu: the first one in the document.
    pub fn top_menu(&self) -> Option<&Menu> {
        self.menus.first()
    }

    pub fn top_menu_mut(&mut self) -> Option<&mut Menu> {
        self.menus.first_mut()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Menu {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MenuItem {
    pub title: String,
    /// External URL, site-absolute path (`/guide/index.md`), or relative path.
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<MenuItem>,
}

/// One node of a book's summary tree.
///
/// Section headings have no `ref`; chapters and articles do.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Entry {
    pub title: String,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub articles: Vec<Entry>,
}

impl Entry {
    pub fn link(title: &str, href: &str) -> Self {
        Self {
            title: title.to_string(),
            href: Some(href.to_string()),
            articles: Vec::new(),
        }
    }

    pub fn section(title: &str, articles: Vec<Entry>) -> Self {
        Self {
            title: title.to_string(),
            href: None,
            articles,
        }
    }
}

/// A book as seen by templates and hooks.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BookInfo {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Vec<Entry>>,
    /// Site-absolute URL of the book directory, always ending in `/`.
    pub base_url: String,
    /// Published file name of the book's own index page.
    pub index: String,
}

/// Site-wide rendering context, shared by every page of one phase.
#[derive(Debug, Clone, Serialize)]
pub struct SiteContext {
    pub config: SiteConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigation: Option<Navigation>,
}

/// Per-page part of the rendering context.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PageMeta {
    pub src_path: PathBuf,
    pub dist_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// Everything a renderer needs to turn one source into one page.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub site: Arc<SiteContext>,
    pub book: Option<Arc<BookInfo>>,
    pub page: PageMeta,
}

/// One queued page: render `src_path` into `out_dir/dist_path`.
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub src_path: PathBuf,
    pub out_dir: PathBuf,
    pub dist_path: String,
    pub context: PageContext,
}

impl PageRequest {
    pub fn new(
        src_path: PathBuf,
        out_dir: &Path,
        dist_path: String,
        site: Arc<SiteContext>,
        book: Option<Arc<BookInfo>>,
    ) -> Self {
        let page = PageMeta {
            src_path: src_path.clone(),
            dist_path: dist_path.clone(),
            prev: None,
            next: None,
        };
        Self {
            src_path,
            out_dir: out_dir.to_path_buf(),
            dist_path,
            context: PageContext { site, book, page },
        }
    }

    /// Absolute path of the file this request writes.
    pub fn output_path(&self) -> PathBuf {
        self.out_dir.join(&self.dist_path)
    }
}

/// A summary entry resolved to an on-disk source and its published path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPage {
    pub src_path: PathBuf,
    pub dist_path: String,
}
