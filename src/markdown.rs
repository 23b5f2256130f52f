//! Markdown parsing helpers built on `pulldown-cmark`.
//!
//! Three views of a Markdown document are used by the pipeline:
//!
//! - [`outline`]: headings and link lists, the raw material for `nav.md`
//!   and `summary.md` trees
//! - [`page_info`]: title (first `# heading`) and description (first
//!   paragraph) of a content page
//! - [`to_html`]: the rendered page body

use crate::config::MarkdownConfig;
use crate::metadata::PageInfo;
use pulldown_cmark::{Event, Parser, Tag, TagEnd, html as md_html};
use std::fs;
use std::io;
use std::path::Path;

/// A top-level block of an outline document.
#[derive(Debug, Clone, PartialEq)]
pub enum OutlineBlock {
    Heading { level: u8, text: String },
    List(Vec<ListNode>),
}

/// A list item: its text, its first link target, and any nested list items.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListNode {
    pub text: String,
    pub href: Option<String>,
    pub children: Vec<ListNode>,
}

/// Reduce a Markdown document to its headings and (nested) lists.
///
/// Paragraphs, code blocks and other content outside lists are ignored.
/// An item's `href` is the first link that appears in the item's own text,
/// before any nested list.
pub fn outline(source: &str) -> Vec<OutlineBlock> {
    let mut blocks = Vec::new();
    let mut lists: Vec<Vec<ListNode>> = Vec::new();
    let mut items: Vec<ListNode> = Vec::new();
    let mut heading: Option<(u8, String)> = None;

    for event in Parser::new(source) {
        match event {
            Event::Start(Tag::Heading { level, .. }) if lists.is_empty() => {
                heading = Some((level as u8, String::new()));
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, text)) = heading.take() {
                    blocks.push(OutlineBlock::Heading {
                        level,
                        text: text.trim().to_string(),
                    });
                }
            }
            Event::Start(Tag::List(_)) => lists.push(Vec::new()),
            Event::End(TagEnd::List(_)) => {
                let Some(done) = lists.pop() else { continue };
                match items.last_mut() {
                    Some(parent) if !lists.is_empty() => parent.children.extend(done),
                    _ => blocks.push(OutlineBlock::List(done)),
                }
            }
            Event::Start(Tag::Item) => items.push(ListNode::default()),
            Event::End(TagEnd::Item) => {
                if let Some(mut item) = items.pop() {
                    item.text = item.text.trim().to_string();
                    if let Some(list) = lists.last_mut() {
                        list.push(item);
                    }
                }
            }
            Event::Start(Tag::Link { dest_url, .. }) => {
                if let Some(item) = items.last_mut()
                    && item.href.is_none()
                    && item.children.is_empty()
                    && !dest_url.is_empty()
                {
                    item.href = Some(dest_url.to_string());
                }
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, buf)) = heading.as_mut() {
                    buf.push_str(&text);
                } else if let Some(item) = items.last_mut()
                    && item.children.is_empty()
                {
                    item.text.push_str(&text);
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some((_, buf)) = heading.as_mut() {
                    buf.push(' ');
                } else if let Some(item) = items.last_mut() {
                    item.text.push(' ');
                }
            }
            _ => {}
        }
    }

    blocks
}

/// Read a control document (`nav.md`, `summary.md`), outline it, and remove
/// it so it is never published.
///
/// Returns `Ok(None)` when the file does not exist. The file is removed only
/// after it has been read and outlined; a read error leaves it in place.
pub fn take_outline(path: &Path) -> io::Result<Option<Vec<OutlineBlock>>> {
    if !path.is_file() {
        return Ok(None);
    }
    let source = fs::read_to_string(path)?;
    let blocks = outline(&source);
    fs::remove_file(path)?;
    log::debug!("consumed {}", path.display());
    Ok(Some(blocks))
}

/// Extract the title (first level-1 heading) and description (first
/// top-level paragraph) of a Markdown page.
pub fn page_info(source: &str) -> PageInfo {
    let mut info = PageInfo::default();
    let mut depth = 0usize;
    let mut h1: Option<String> = None;
    let mut para: Option<String> = None;

    for event in Parser::new(source) {
        match event {
            Event::Start(Tag::Heading { level, .. })
                if level as u8 == 1 && info.title.is_none() =>
            {
                h1 = Some(String::new());
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(text) = h1.take() {
                    info.title = Some(text.trim().to_string()).filter(|t| !t.is_empty());
                }
            }
            Event::Start(Tag::Paragraph) if depth == 0 && info.description.is_none() => {
                para = Some(String::new());
            }
            Event::End(TagEnd::Paragraph) => {
                if let Some(text) = para.take() {
                    info.description = Some(text.trim().to_string()).filter(|t| !t.is_empty());
                }
            }
            Event::Start(Tag::List(_) | Tag::BlockQuote(_) | Tag::FootnoteDefinition(_)) => {
                depth += 1;
            }
            Event::End(TagEnd::List(_) | TagEnd::BlockQuote(_) | TagEnd::FootnoteDefinition) => {
                depth = depth.saturating_sub(1);
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some(buf) = h1.as_mut().or(para.as_mut()) {
                    buf.push_str(&text);
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some(buf) = h1.as_mut().or(para.as_mut()) {
                    buf.push(' ');
                }
            }
            _ => {}
        }
    }

    info
}

/// Render Markdown to an HTML fragment with the configured extensions.
pub fn to_html(source: &str, config: &MarkdownConfig) -> String {
    let parser = Parser::new_ext(source, config.options());
    let mut body = String::new();
    md_html::push_html(&mut body, parser);
    body
}
