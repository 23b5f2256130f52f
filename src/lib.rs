//! # Simple Book
//!
//! A static site generator for documentation made of one site and any number
//! of books. Your filesystem is the data source: the site is a directory with
//! an index page and a `nav.md`; every top-menu entry that points into a
//! directory is a book with its own index page and `summary.md`.
//!
//! ```text
//! docs/
//! ├── config.toml          # optional, see `simple-book gen-config`
//! ├── index.md             # site home → index.html
//! ├── nav.md               # site menus; the first list is the top menu
//! ├── guide/               # book, linked from nav.md as /guide/index.md
//! │   ├── index.md         # → guide/index.html
//! │   ├── summary.md       # table of contents
//! │   ├── chapter1.md      # → guide/chapter1.html
//! │   └── chapter2.md
//! └── api/                 # book, linked as /api/readme.html
//!     └── readme.html
//! ```
//!
//! # Pipeline
//!
//! ```text
//! 1. Stage      docs/  →  _site/              (copy sources, skip hidden files)
//! 2. Site       index + nav.md  →  index.html
//! 3. Books      for each book in menu order:
//!                 index + summary.md  →  <book>/*.html
//! ```
//!
//! `nav.md` and `summary.md` are control files: they are consumed during the
//! build and do not appear in the output. Each phase ends with a flush that
//! writes all of its pages before the next phase starts.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`site`] | Orchestrator: phases, book resolution, summary walk, lifecycle hooks |
//! | [`paths`] | Index resolution and source → published path rewriting |
//! | [`navigation`] | `nav.md` → menus |
//! | [`summary`] | `summary.md` → entry tree |
//! | [`discover`] | Top menu → book directories |
//! | [`queue`] | Page emission queue with flush barrier |
//! | [`render`] | `PageRenderer` seam and the Maud/Tera/pulldown-cmark renderer |
//! | [`hooks`] | Lifecycle hook seam (`init`, `markdown`, `book:before`, `book`, `finish`) |
//! | [`markdown`] | Outline, metadata and HTML views of Markdown documents |
//! | [`metadata`] | Page and book title/description resolution |
//! | [`config`] | `config.toml` loading, validation, merging, and CSS generation |
//! | [`stage`] | Copying the source tree into the output directory |
//! | [`types`] | Shared trees and page requests |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## The Index Stem Is a Parameter
//!
//! A book linked as `/api/readme.md` publishes `readme.md` as its index, and
//! summary links to `readme.md` become `index.html`. Which stem plays that role
//! differs per book, so every path function takes it as an argument. Nothing
//! is stored between books.
//!
//! ## Pure Summary Walk
//!
//! [`site::walk_summary`] returns a rewritten copy of the summary tree plus the
//! list of pages it names. The orchestrator turns those pages into requests.
//! The walk can be tested without a queue or a renderer.
//!
//! ## Seams for Rendering and Hooks
//!
//! The orchestrator only sees the [`render::PageRenderer`] and [`hooks::Hooks`]
//! traits. Tests substitute recording implementations and check ordering
//! without touching HTML.

pub mod config;
pub mod discover;
pub mod hooks;
pub mod markdown;
pub mod metadata;
pub mod navigation;
pub mod output;
pub mod paths;
pub mod queue;
pub mod render;
pub mod site;
pub mod stage;
pub mod summary;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
