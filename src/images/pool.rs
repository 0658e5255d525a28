//! Bounded validation pool
//!
//! A fixed number of workers share one candidate list and claim the next
//! unvalidated index from an atomic cursor. Accepted URLs land in a shared
//! vector in completion order. The pool returns once every candidate has
//! been tried; dropping the returned future abandons in-flight probes.

use std::sync::atomic::{AtomicUsize, Ordering};

use futures::future::join_all;
use tokio::sync::Mutex;
use tracing::debug;

use super::probe::{validate_candidate, ImageProbe};

pub struct ValidationPool<'a> {
    probe: &'a dyn ImageProbe,
    concurrency: usize,
    min_bytes: u64,
}

impl<'a> ValidationPool<'a> {
    pub fn new(probe: &'a dyn ImageProbe, concurrency: usize, min_bytes: u64) -> Self {
        Self {
            probe,
            concurrency,
            min_bytes,
        }
    }

    /// Number of workers for `candidates` items: never more than the pool
    /// size, never more than there is work, at least one.
    pub fn worker_count(&self, candidates: usize) -> usize {
        self.concurrency.max(1).min(candidates)
    }

    /// Validate every candidate and return the accepted ones.
    pub async fn run(&self, candidates: &[String]) -> Vec<String> {
        let workers = self.worker_count(candidates.len());
        if workers == 0 {
            return Vec::new();
        }

        let cursor = AtomicUsize::new(0);
        let accepted = Mutex::new(Vec::with_capacity(candidates.len()));

        let worker = |id: usize| {
            let cursor = &cursor;
            let accepted = &accepted;
            async move {
                let mut tried = 0usize;
                loop {
                    let idx = cursor.fetch_add(1, Ordering::Relaxed);
                    let Some(url) = candidates.get(idx) else {
                        break;
                    };
                    tried += 1;
                    if validate_candidate(self.probe, url, self.min_bytes).await {
                        accepted.lock().await.push(url.clone());
                    }
                }
                debug!(worker = id, tried, "validation worker drained");
            }
        };

        join_all((0..workers).map(worker)).await;

        let accepted = accepted.into_inner();
        debug!(
            candidates = candidates.len(),
            accepted = accepted.len(),
            workers,
            "image validation finished"
        );
        accepted
    }
}
