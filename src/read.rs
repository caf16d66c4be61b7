//! Batched reads on a bounded worker pool.
//!
//! Each [`ReadRequest`] names one file and one channel and borrows its own,
//! disjoint region of the caller's output buffers, so requests run in
//! parallel without any shared mutable state. Every request opens its own
//! file handle and drops it before the worker moves on.

use std::path::PathBuf;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::api::channel_file::FileOpener;
use crate::cancel::CancellationToken;
use crate::error::Tob1Error;
use crate::extract::{Extraction, Segment, extract};

/// A single unit of work.
#[derive(Debug)]
pub struct ReadRequest<'a> {
    pub path: PathBuf,
    pub segment: Segment,
    pub data: &'a mut [u8],
    pub status: &'a mut [u8],
}

/// What happened to one request.
#[derive(Debug)]
pub enum ReadOutcome {
    Filled { elements: usize },
    /// The file was shorter (or longer) than its nominal period; nothing written.
    Incomplete { expected: usize, actual: usize },
    /// The file could not be opened, the channel was missing or the range was invalid.
    Failed(Tob1Error),
    /// Cancellation was observed before anything was written.
    Cancelled,
}

impl ReadOutcome {
    pub fn filled_elements(&self) -> usize {
        match self {
            ReadOutcome::Filled { elements } => *elements,
            _ => 0,
        }
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, ReadOutcome::Filled { .. })
    }
}

pub struct ReadOrchestrator<O: FileOpener> {
    opener: O,
    pool: rayon::ThreadPool,
}

impl<O: FileOpener> ReadOrchestrator<O> {
    /// Create an orchestrator with `worker_count` threads, or one per available
    /// core when `None`.
    pub fn new(opener: O, worker_count: Option<usize>) -> Result<Self, Tob1Error> {
        let num_threads = worker_count.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        });

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|index| format!("tob1-reader-{}", index))
            .build()
            .map_err(|e| Tob1Error::WorkerPool(format!("Failed to create thread pool: {e}")))?;

        Ok(Self { opener, pool })
    }

    /// Run every request and report one outcome per request, in request order.
    ///
    /// Failures are isolated to their request. Once `cancel` fires, requests
    /// that have not started report [`ReadOutcome::Cancelled`]; requests that
    /// already completed keep their output.
    pub fn read_batch(&self, requests: Vec<ReadRequest<'_>>, cancel: &CancellationToken) -> Vec<ReadOutcome> {
        debug!(requests = requests.len(), "starting read batch");
        self.pool.install(|| {
            requests
                .into_par_iter()
                .map(|request| self.read_one(request, cancel))
                .collect()
        })
    }

    fn read_one(&self, request: ReadRequest<'_>, cancel: &CancellationToken) -> ReadOutcome {
        if cancel.is_cancelled() {
            return ReadOutcome::Cancelled;
        }
        let ReadRequest { path, segment, data, status } = request;

        let file = match self.opener.open(&path) {
            Ok(file) => file,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "failed to open file");
                return ReadOutcome::Failed(e);
            }
        };

        match extract(&file, &segment, data, status, cancel) {
            Ok(Extraction::Filled { elements }) => ReadOutcome::Filled { elements },
            Ok(Extraction::Incomplete { expected, actual }) => {
                debug!(file = %path.display(), expected, actual, "incomplete file");
                ReadOutcome::Incomplete { expected, actual }
            }
            Err(Tob1Error::Cancelled) => ReadOutcome::Cancelled,
            Err(e) => {
                warn!(
                    file = %path.display(),
                    channel = %segment.original_name,
                    error = %e,
                    "read request failed"
                );
                ReadOutcome::Failed(e)
            }
        }
    }
}
