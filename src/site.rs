//! Site and book generation.
//!
//! [`generate_site`] drives one build over a directory that already holds the
//! sources (the staged output directory). It runs strictly in order:
//!
//! ```text
//! init, markdown hooks
//! site index → nav.md → queue index.html → flush
//! discover books from the top menu
//! for each book, in menu order:
//!     index → summary.md → book:before hook → queue index + summary pages → flush → book hook
//! finish hook
//! ```
//!
//! Every book is fully written, and its `book` hook has returned, before the
//! next book's index is even looked up. The index stem (`readme` for a book
//! linked as `/api/readme.md`) is passed to the path functions explicitly, so
//! nothing about one book leaks into the next.
//!
//! Missing pieces are skipped silently: a book directory without an index, a
//! summary entry whose file does not exist. Only a missing site index is
//! fatal. Any other failure (hook, I/O, render) stops the build and is
//! reported with the [`Stage`] the build had reached.

use crate::config::SiteConfig;
use crate::discover::{self, BookLocation};
use crate::hooks::{HookError, HookEvent, Hooks};
use crate::metadata;
use crate::navigation;
use crate::paths::{self, DEFAULT_INDEX_STEM, LinkRef};
use crate::queue::{EmissionQueue, QueueError};
use crate::render::PageRenderer;
use crate::summary;
use crate::types::{BookInfo, Entry, Navigation, PageRequest, ResolvedPage, SiteContext};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::Sender;
use thiserror::Error;

/// How far a build got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    SiteIndexResolved,
    SiteNavResolved,
    SitePagesQueued,
    SiteFlushed,
    BooksDiscovered,
    BookStarted,
    BookSummaryResolved,
    BookPagesQueued,
    BookFlushed,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Init => "init",
            Stage::SiteIndexResolved => "site index resolved",
            Stage::SiteNavResolved => "site navigation resolved",
            Stage::SitePagesQueued => "site pages queued",
            Stage::SiteFlushed => "site pages written",
            Stage::BooksDiscovered => "books discovered",
            Stage::BookStarted => "book started",
            Stage::BookSummaryResolved => "book summary resolved",
            Stage::BookPagesQueued => "book pages queued",
            Stage::BookFlushed => "book pages written",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum StageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Hook(#[from] HookError),
    #[error(transparent)]
    Queue(#[from] QueueError),
}

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("no index page found in {}", .0.display())]
    NoIndexPage(PathBuf),
    #[error("build failed at stage '{stage}': {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: StageError,
    },
}

trait AtStage<T> {
    fn at(self, stage: Stage) -> Result<T, SiteError>;
}

impl<T, E: Into<StageError>> AtStage<T> for Result<T, E> {
    fn at(self, stage: Stage) -> Result<T, SiteError> {
        self.map_err(|e| SiteError::Stage {
            stage,
            source: e.into(),
        })
    }
}

/// Progress events for the CLI printer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
    BookGenerated {
        title: String,
        index_path: PathBuf,
        pages: usize,
    },
    /// A menu entry pointed at a directory without an index page.
    BookSkipped { dir: PathBuf },
    SiteGenerated {
        title: String,
        index_path: PathBuf,
        pages: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookReport {
    pub title: String,
    pub dir: PathBuf,
    pub pages: usize,
}

/// What a successful build produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteReport {
    /// Pages written in the site phase.
    pub pages: usize,
    pub books: Vec<BookReport>,
}

impl SiteReport {
    pub fn total_pages(&self) -> usize {
        self.pages + self.books.iter().map(|b| b.pages).sum::<usize>()
    }
}

fn advance(stage: &mut Stage, next: Stage) {
    log::trace!("stage: {next}");
    *stage = next;
}

fn emit(events: Option<&Sender<BuildEvent>>, event: BuildEvent) {
    if let Some(tx) = events {
        // The printer may already be gone; progress output is best effort.
        tx.send(event).ok();
    }
}

/// Generate the site rooted at `root`, in place.
///
/// `config` is copied: the `markdown` hook mutates the copy, which is what
/// every page is rendered with.
pub fn generate_site<H, R>(
    root: &Path,
    config: &SiteConfig,
    hooks: &H,
    renderer: &R,
    events: Option<Sender<BuildEvent>>,
) -> Result<SiteReport, SiteError>
where
    H: Hooks + ?Sized,
    R: PageRenderer,
{
    let events = events.as_ref();
    let mut config = config.clone();
    let mut stage = Stage::Init;

    hooks.notify(HookEvent::Init).at(stage)?;
    hooks
        .notify(HookEvent::Markdown(&mut config.markdown))
        .at(stage)?;

    let index = paths::resolve_index(root, DEFAULT_INDEX_STEM)
        .ok_or_else(|| SiteError::NoIndexPage(root.to_path_buf()))?;
    advance(&mut stage, Stage::SiteIndexResolved);
    log::debug!("site index: {}", index.display());

    let mut navigation = navigation::read_navigation(root).at(stage)?;
    advance(&mut stage, Stage::SiteNavResolved);

    let mut queue = EmissionQueue::new(renderer);
    let site = Arc::new(SiteContext {
        config: config.clone(),
        navigation: navigation.clone(),
    });
    queue.enqueue(PageRequest::new(
        index,
        root,
        format!("{DEFAULT_INDEX_STEM}.html"),
        site,
        None,
    ));
    advance(&mut stage, Stage::SitePagesQueued);

    let site_pages = queue.flush().at(stage)?.rendered;
    advance(&mut stage, Stage::SiteFlushed);

    let books = discover::discover_books(
        navigation.as_mut().and_then(Navigation::top_menu_mut),
        root,
    );
    advance(&mut stage, Stage::BooksDiscovered);

    // Books see the navigation with their own refs rewritten to HTML.
    let site = Arc::new(SiteContext { config, navigation });
    let mut report = SiteReport {
        pages: site_pages,
        books: Vec::new(),
    };
    for location in &books {
        match generate_book(location, root, &site, hooks, &mut queue, &mut stage)? {
            Some(book) => {
                emit(
                    events,
                    BuildEvent::BookGenerated {
                        title: book.title.clone(),
                        index_path: location.dir.join(format!("{}.html", location.index_stem())),
                        pages: book.pages,
                    },
                );
                hooks.notify(HookEvent::Book).at(stage)?;
                report.books.push(book);
            }
            None => emit(
                events,
                BuildEvent::BookSkipped {
                    dir: location.dir.clone(),
                },
            ),
        }
    }

    emit(
        events,
        BuildEvent::SiteGenerated {
            title: site.config.title.clone(),
            index_path: root.join(format!("{DEFAULT_INDEX_STEM}.html")),
            pages: report.total_pages(),
        },
    );
    hooks.notify(HookEvent::Finish).at(stage)?;
    advance(&mut stage, Stage::Done);
    log::debug!("build {stage}: {} page(s)", report.total_pages());

    Ok(report)
}

/// Resolve, queue and flush one book. `Ok(None)` when it has no index page.
fn generate_book<H, R>(
    location: &BookLocation,
    root: &Path,
    site: &Arc<SiteContext>,
    hooks: &H,
    queue: &mut EmissionQueue<'_, R>,
    stage: &mut Stage,
) -> Result<Option<BookReport>, SiteError>
where
    H: Hooks + ?Sized,
    R: PageRenderer,
{
    let stem = location.index_stem();
    let Some(index) = paths::resolve_index(&location.dir, stem) else {
        log::debug!(
            "skipping {}: no {stem} page",
            location.dir.display()
        );
        return Ok(None);
    };
    advance(stage, Stage::BookStarted);

    let summary = summary::read_summary(&location.dir).at(*stage)?;
    advance(stage, Stage::BookSummaryResolved);

    let (title, description) = metadata::book_info(&index, &site.config).at(*stage)?;
    hooks
        .notify(HookEvent::BookBefore {
            title: &title,
            description: &description,
            summary: summary.as_deref(),
        })
        .at(*stage)?;

    let index_dist = format!("{stem}.html");
    let (entries, pages) = match summary {
        Some(entries) => {
            let walk = walk_summary(&entries, &location.dir, stem);
            (Some(walk.entries), walk.pages)
        }
        None => (None, Vec::new()),
    };

    let book = Arc::new(BookInfo {
        title: title.clone(),
        description,
        summary: entries,
        base_url: base_url(&location.dir, root),
        index: index_dist.clone(),
    });

    let mut requests = vec![PageRequest::new(
        index,
        &location.dir,
        index_dist,
        Arc::clone(site),
        Some(Arc::clone(&book)),
    )];
    for page in pages {
        if requests.iter().any(|r| r.dist_path == page.dist_path) {
            continue;
        }
        requests.push(PageRequest::new(
            page.src_path,
            &location.dir,
            page.dist_path,
            Arc::clone(site),
            Some(Arc::clone(&book)),
        ));
    }
    link_neighbours(&mut requests, &book.base_url);
    for request in requests {
        queue.enqueue(request);
    }
    advance(stage, Stage::BookPagesQueued);

    let rendered = queue.flush().at(*stage)?.rendered;
    advance(stage, Stage::BookFlushed);

    Ok(Some(BookReport {
        title,
        dir: location.dir.clone(),
        pages: rendered,
    }))
}

/// Reading order for the pager: index first, then summary order.
fn link_neighbours(requests: &mut [PageRequest], base_url: &str) {
    let hrefs: Vec<String> = requests
        .iter()
        .map(|r| format!("{base_url}{}", r.dist_path))
        .collect();
    for (i, request) in requests.iter_mut().enumerate() {
        let page = &mut request.context.page;
        page.prev = i.checked_sub(1).map(|p| hrefs[p].clone());
        page.next = hrefs.get(i + 1).cloned();
    }
}

/// Site-absolute URL of a book directory: `<root>/guide` → `/guide/`.
fn base_url(dir: &Path, root: &Path) -> String {
    let relative = dir.strip_prefix(root).unwrap_or(dir);
    let segments: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            std::path::Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", segments.join("/"))
    }
}

/// A summary tree with its local refs rewritten, and the pages they name.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryWalk {
    pub entries: Vec<Entry>,
    /// Depth-first, document order.
    pub pages: Vec<ResolvedPage>,
}

/// Resolve every summary entry against `book_dir`.
///
/// An entry whose ref names an existing file gets `ref = published path +
/// fragment` and contributes a page. External refs, fragment-only refs and
/// refs to missing files are kept verbatim. Children are walked whatever
/// happened to their parent. A published path maps onto itself, so walking
/// the result again leaves every ref as it is.
pub fn walk_summary(entries: &[Entry], book_dir: &Path, index_stem: &str) -> SummaryWalk {
    let mut pages = Vec::new();
    let entries = walk_entries(entries, book_dir, index_stem, &mut pages);
    SummaryWalk { entries, pages }
}

fn walk_entries(
    entries: &[Entry],
    book_dir: &Path,
    index_stem: &str,
    pages: &mut Vec<ResolvedPage>,
) -> Vec<Entry> {
    entries
        .iter()
        .map(|entry| {
            let href = entry.href.as_deref().map(|href| {
                resolve_entry_ref(href, book_dir, index_stem, pages)
                    .unwrap_or_else(|| href.to_string())
            });
            Entry {
                title: entry.title.clone(),
                href,
                articles: walk_entries(&entry.articles, book_dir, index_stem, pages),
            }
        })
        .collect()
}

fn resolve_entry_ref(
    href: &str,
    book_dir: &Path,
    index_stem: &str,
    pages: &mut Vec<ResolvedPage>,
) -> Option<String> {
    let link = LinkRef::parse(href);
    if link.is_external() || link.path.is_empty() {
        return None;
    }
    let src_path = book_dir.join(link.path);
    if !src_path.is_file() {
        return None;
    }
    let dist_path = paths::to_published_path(link.path, index_stem);
    let rewritten = format!("{dist_path}{}", link.fragment_suffix());
    pages.push(ResolvedPage {
        src_path,
        dist_path,
    });
    Some(rewritten)
}
