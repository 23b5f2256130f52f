//! Site navigation from `nav.md`.
//!
//! ```markdown
//! # Acme Docs                        ← navigation title (optional)
//!
//! * [Guide](/guide/index.md)         ← first list = top menu, scanned for books
//! * [API](/api/readme.md)
//! * [GitHub](https://github.com/acme)
//!
//! ## Community                       ← titles the list below it
//!
//! * [Forum](https://forum.acme.dev)
//! ```
//!
//! Every top-level list becomes a [`Menu`]; nested lists become nested items.
//! `nav.md` is control data: it is deleted once parsed.

use crate::markdown::{self, ListNode, OutlineBlock};
use crate::types::{Menu, MenuItem, Navigation};
use std::io;
use std::path::Path;

pub const NAV_FILENAME: &str = "nav.md";

/// Read and consume `nav.md` from `dir`. `Ok(None)` when there is none.
pub fn read_navigation(dir: &Path) -> io::Result<Option<Navigation>> {
    let blocks = markdown::take_outline(&dir.join(NAV_FILENAME))?;
    Ok(blocks.map(build_navigation))
}

/// Build a [`Navigation`] from an outlined `nav.md`.
pub fn build_navigation(blocks: Vec<OutlineBlock>) -> Navigation {
    let mut navigation = Navigation::default();
    let mut pending_title: Option<String> = None;

    for block in blocks {
        match block {
            OutlineBlock::Heading { level, text } => {
                if level == 1 && navigation.title.is_none() && navigation.menus.is_empty() {
                    navigation.title = Some(text);
                } else {
                    pending_title = Some(text);
                }
            }
            OutlineBlock::List(nodes) => navigation.menus.push(Menu {
                title: pending_title.take(),
                items: nodes.into_iter().map(menu_item).collect(),
            }),
        }
    }

    navigation
}

fn menu_item(node: ListNode) -> MenuItem {
    MenuItem {
        title: node.text,
        href: node.href,
        items: node.children.into_iter().map(menu_item).collect(),
    }
}
