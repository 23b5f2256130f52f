//! Book table of contents from `summary.md`.
//!
//! The format follows GitBook:
//!
//! ```markdown
//! # Summary                          ← document title, ignored
//!
//! * [Introduction](intro.md)
//!
//! ## Basics                          ← section entry (no ref)
//!
//! * [Installing](install.md)
//!   * [On Linux](install/linux.md#packages)
//! * [Configuring](config.md)
//! ```
//!
//! Lists before the first section are top-level entries; lists after a
//! section heading become that section's articles. Like `nav.md`, the file is
//! deleted once parsed.

use crate::markdown::{self, ListNode, OutlineBlock};
use crate::types::Entry;
use std::io;
use std::path::Path;

pub const SUMMARY_FILENAME: &str = "summary.md";

/// Read and consume `summary.md` from a book directory.
pub fn read_summary(dir: &Path) -> io::Result<Option<Vec<Entry>>> {
    let blocks = markdown::take_outline(&dir.join(SUMMARY_FILENAME))?;
    Ok(blocks.map(build_summary))
}

/// Build the entry forest from an outlined `summary.md`.
pub fn build_summary(blocks: Vec<OutlineBlock>) -> Vec<Entry> {
    let mut entries: Vec<Entry> = Vec::new();
    let mut in_section = false;

    for block in blocks {
        match block {
            OutlineBlock::Heading { level: 1, .. } => {}
            OutlineBlock::Heading { text, .. } => {
                entries.push(Entry::section(&text, Vec::new()));
                in_section = true;
            }
            OutlineBlock::List(nodes) => {
                let converted = nodes.into_iter().map(entry);
                match entries.last_mut() {
                    Some(section) if in_section => section.articles.extend(converted),
                    _ => entries.extend(converted),
                }
            }
        }
    }

    entries
}

fn entry(node: ListNode) -> Entry {
    Entry {
        title: node.text,
        href: node.href,
        articles: node.children.into_iter().map(entry).collect(),
    }
}
