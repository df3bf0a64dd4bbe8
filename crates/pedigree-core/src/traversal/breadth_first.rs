//! Breadth-first retrieval with a fixed pool of workers.
//!
//! Workers block on a shared `crossbeam-channel` queue of family ids. Each
//! dequeued family is fetched along with its people (sequentially within the
//! worker) and its unvisited parent families are enqueued. The parallelism
//! comes from different workers handling different families.
//!
//! Drain detection uses a count of outstanding families: incremented before
//! an id is sent, decremented after it has been processed. A parent's ids are
//! counted before the parent itself completes, so the count reaches zero only
//! when the queue is empty and no worker is busy. The worker that brings it
//! to zero signals the coordinator, which then closes the shutdown channel;
//! every worker sees the disconnect at its next dequeue and exits.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use crossbeam_channel::{select, Receiver, Sender};
use tracing::{debug, warn};

use super::{parent_families, VisitedFamilies};
use crate::fetch::Fetcher;
use crate::record::FamilyId;

/// Walks the ancestors of `start` with `workers` threads; returns the number
/// of families expanded.
pub(super) fn run(start: Option<FamilyId>, fetcher: &Fetcher<'_>, workers: usize) -> usize {
    let Some(start) = start else {
        return 0;
    };

    let (queue_tx, queue_rx) = crossbeam_channel::unbounded::<FamilyId>();
    let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(0);
    let (drained_tx, drained_rx) = crossbeam_channel::bounded::<()>(1);

    let ctx = RunContext {
        fetcher,
        visited: VisitedFamilies::new(),
        queue: queue_tx,
        outstanding: AtomicUsize::new(0),
        processed: AtomicUsize::new(0),
        drained: drained_tx,
    };
    ctx.discover(start);

    thread::scope(|s| {
        let mut handles = Vec::with_capacity(workers);
        for index in 0..workers {
            let ctx = &ctx;
            let queue = queue_rx.clone();
            let shutdown = shutdown_rx.clone();
            let spawned = thread::Builder::new()
                .name(format!("pedigree-bfs-{index}"))
                .spawn_scoped(s, move || ctx.work(&queue, &shutdown));
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(err) => warn!(worker = index, error = %err, "could not spawn worker"),
            }
        }

        if handles.is_empty() {
            warn!("no worker could be spawned, draining on the calling thread");
            while let Ok(id) = queue_rx.try_recv() {
                ctx.process_one(id);
            }
        } else {
            // The sender lives in `ctx`, so this only returns on a signal.
            let _ = drained_rx.recv();
        }

        drop(shutdown_tx);
        for handle in handles {
            if handle.join().is_err() {
                warn!("breadth-first worker panicked");
            }
        }
    });

    ctx.processed.into_inner()
}

/// State shared by the workers of one run.
struct RunContext<'f, 'a> {
    fetcher: &'f Fetcher<'a>,
    visited: VisitedFamilies,
    queue: Sender<FamilyId>,
    /// Families enqueued or in progress.
    outstanding: AtomicUsize,
    processed: AtomicUsize,
    drained: Sender<()>,
}

impl RunContext<'_, '_> {
    fn work(&self, queue: &Receiver<FamilyId>, shutdown: &Receiver<()>) {
        loop {
            select! {
                recv(queue) -> msg => match msg {
                    Ok(id) => self.process_one(id),
                    Err(_) => break,
                },
                recv(shutdown) -> _ => break,
            }
        }
        debug!(worker = ?thread::current().name(), "worker stopped");
    }

    /// Processes one dequeued id and settles its outstanding count, even if
    /// processing panics.
    fn process_one(&self, id: FamilyId) {
        if panic::catch_unwind(AssertUnwindSafe(|| self.process(id))).is_err() {
            warn!(family_id = %id, "processing panicked, branch pruned");
        }
        self.complete();
    }

    fn process(&self, id: FamilyId) {
        let Some(family) = self.fetcher.fetch_family(Some(id)) else {
            debug!(family_id = %id, "family not available, branch pruned");
            return;
        };
        self.processed.fetch_add(1, Ordering::Relaxed);

        for person_id in family.person_ids() {
            self.fetcher.fetch_person(Some(person_id));
        }

        for parent in parent_families(self.fetcher.store(), &family) {
            self.discover(parent);
        }
        debug!(family_id = %id, "family processed");
    }

    /// Enqueues `id` unless it was already discovered.
    fn discover(&self, id: FamilyId) {
        if !self.visited.mark(id) {
            return;
        }
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        if let Err(err) = self.queue.send(id) {
            warn!(family_id = %id, error = %err, "work queue closed, family dropped");
            self.complete();
        }
    }

    fn complete(&self) {
        if self.outstanding.fetch_sub(1, Ordering::SeqCst) == 1 {
            let _ = self.drained.try_send(());
        }
    }
}
