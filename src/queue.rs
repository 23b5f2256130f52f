//! Page emission queue.
//!
//! Requests accumulate with [`EmissionQueue::enqueue`] and are rendered by
//! [`EmissionQueue::flush`], which is a barrier: it returns only after every
//! queued render has finished. Within one flush, pages are rendered in
//! parallel on the rayon pool; the order in which files appear on disk is
//! therefore unspecified, but nothing after a flush starts before all of them
//! are written.
//!
//! A destination is rendered at most once per flush. Enqueueing a second
//! request for the same output path is ignored, so a summary that links the
//! same chapter twice produces one page.

use crate::render::{PageRenderer, RenderError};
use crate::types::PageRequest;
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("failed to render {path}: {source}")]
    Render {
        path: PathBuf,
        #[source]
        source: RenderError,
    },
}

/// Outcome of a successful flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub rendered: usize,
}

pub struct EmissionQueue<'a, R: PageRenderer> {
    renderer: &'a R,
    pending: Vec<PageRequest>,
    destinations: HashSet<PathBuf>,
}

impl<'a, R: PageRenderer> EmissionQueue<'a, R> {
    pub fn new(renderer: &'a R) -> Self {
        Self {
            renderer,
            pending: Vec::new(),
            destinations: HashSet::new(),
        }
    }

    /// Queue a request. Returns `false` when its destination is already queued.
    pub fn enqueue(&mut self, request: PageRequest) -> bool {
        if !self.destinations.insert(request.output_path()) {
            log::debug!("already queued: {}", request.output_path().display());
            return false;
        }
        self.pending.push(request);
        true
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Render everything queued and empty the queue.
    ///
    /// Every request is attempted even when some fail; the first failure in
    /// enqueue order is returned once all renders have completed.
    pub fn flush(&mut self) -> Result<FlushReport, QueueError> {
        let batch = std::mem::take(&mut self.pending);
        self.destinations.clear();

        let renderer = self.renderer;
        let results: Vec<Result<(), RenderError>> = batch
            .par_iter()
            .map(|request| renderer.render(request))
            .collect();

        let rendered = results.iter().filter(|r| r.is_ok()).count();
        log::debug!("flushed {rendered}/{} page(s)", batch.len());

        for (request, result) in batch.iter().zip(results) {
            if let Err(source) = result {
                return Err(QueueError::Render {
                    path: request.src_path.clone(),
                    source,
                });
            }
        }
        Ok(FlushReport { rendered })
    }
}
