//! Lifecycle hooks around a build.
//!
//! The orchestrator calls [`Hooks::notify`] at fixed points:
//!
//! | Event | When | Payload |
//! |-------|------|---------|
//! | `init` | before anything is read | none |
//! | `markdown` | right after `init` | mutable [`MarkdownConfig`] |
//! | `book:before` | book metadata resolved, nothing queued yet | title, description, summary |
//! | `book` | after the book's pages are flushed | none |
//! | `finish` | after the last book | none |
//!
//! Each call completes before the build proceeds. An `Err` aborts the build.

use crate::config::MarkdownConfig;
use crate::types::Entry;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HookError {
    #[error("hook '{hook}' failed: {message}")]
    Failed { hook: &'static str, message: String },
}

/// A lifecycle event with its payload.
#[derive(Debug)]
pub enum HookEvent<'a> {
    Init,
    Markdown(&'a mut MarkdownConfig),
    BookBefore {
        title: &'a str,
        description: &'a str,
        summary: Option<&'a [Entry]>,
    },
    Book,
    Finish,
}

impl HookEvent<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            HookEvent::Init => "init",
            HookEvent::Markdown(_) => "markdown",
            HookEvent::BookBefore { .. } => "book:before",
            HookEvent::Book => "book",
            HookEvent::Finish => "finish",
        }
    }
}

/// Receiver of lifecycle events.
pub trait Hooks {
    fn notify(&self, event: HookEvent<'_>) -> Result<(), HookError>;
}

/// Ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl Hooks for NoopHooks {
    fn notify(&self, _event: HookEvent<'_>) -> Result<(), HookError> {
        Ok(())
    }
}

/// Logs every event at debug level. Used by the CLI.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogHooks;

impl Hooks for LogHooks {
    fn notify(&self, event: HookEvent<'_>) -> Result<(), HookError> {
        match &event {
            HookEvent::BookBefore { title, summary, .. } => log::debug!(
                "hook {}: \"{title}\" ({} summary entries)",
                event.name(),
                summary.map_or(0, |s| s.len())
            ),
            _ => log::debug!("hook {}", event.name()),
        }
        Ok(())
    }
}
