//! Single-worker, tick-driven path request queue.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};

use crate::search::SearchScratch;
use crate::{LocationGraph, LocationId, PathCache, PathKey, PathResult, PathSearch};

/// FIFO of pending path queries resolved one at a time on a background worker.
///
/// All bookkeeping (queue, in-flight marker, cache) lives on the owning thread. The
/// worker only sees the shared graph and the two channels, and results are written
/// into the cache from [`pump_once`](Self::pump_once), so the cache is always current
/// by the time [`is_processing_paths`](Self::is_processing_paths) reports `false`.
pub struct PathRequestPipeline {
    search: PathSearch,
    cache: PathCache,
    queue: VecDeque<PathKey>,
    /// Keys that are queued or in flight; used to drop duplicate requests.
    pending: HashSet<PathKey>,
    in_flight: Option<PathKey>,
    jobs: Option<Sender<PathKey>>,
    results: Receiver<(PathKey, PathResult)>,
    worker: Option<JoinHandle<()>>,
}

impl PathRequestPipeline {
    pub fn new(graph: Arc<LocationGraph>) -> Self {
        let search = PathSearch::new(graph);
        let (job_tx, job_rx) = unbounded::<PathKey>();
        let (result_tx, result_rx) = unbounded::<(PathKey, PathResult)>();

        let worker_search = search.clone();
        let worker = thread::Builder::new()
            .name("path-worker".to_string())
            .spawn(move || run_worker(worker_search, job_rx, result_tx));

        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(err) => {
                tracing::warn!(error = %err, "Failed to spawn path worker; resolving paths inline");
                None
            }
        };

        Self {
            search,
            cache: PathCache::new(),
            queue: VecDeque::new(),
            pending: HashSet::new(),
            in_flight: None,
            jobs: worker.as_ref().map(|_| job_tx),
            results: result_rx,
            worker,
        }
    }

    pub fn graph(&self) -> &Arc<LocationGraph> {
        self.search.graph()
    }

    pub fn cache(&self) -> &PathCache {
        &self.cache
    }

    pub fn is_cached(&self, key: &PathKey) -> bool {
        self.cache.contains_key(key)
    }

    pub fn get_cached(&self, key: &PathKey) -> Option<&PathResult> {
        self.cache.get(key)
    }

    /// Queue `(origin, destination)` unless it is cached, queued, or already running.
    ///
    /// Returns whether a new request was queued.
    pub fn enqueue_if_uncached(&mut self, origin: LocationId, destination: LocationId) -> bool {
        let key = PathKey::new(origin, destination);
        if self.cache.contains_key(&key) || self.pending.contains(&key) {
            return false;
        }

        self.pending.insert(key);
        self.queue.push_back(key);
        tracing::trace!(%origin, %destination, queued = self.queue.len(), "Path request queued");
        true
    }

    /// `true` while requests are queued or a computation is in flight.
    pub fn is_processing_paths(&self) -> bool {
        !self.queue.is_empty() || self.in_flight.is_some()
    }

    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    /// One scheduling step: collect a finished computation, then start the next one if idle.
    pub fn pump_once(&mut self) {
        if self.in_flight.is_some() {
            match self.results.try_recv() {
                Ok((key, result)) => self.complete(key, result),
                Err(TryRecvError::Empty) => return,
                Err(TryRecvError::Disconnected) => self.recover_lost_worker(),
            }
        }

        self.start_next();
    }

    /// Pump until the queue is empty and nothing is in flight, blocking on the worker.
    ///
    /// Intended for headless drivers and tests; the interactive loop uses
    /// [`pump_once`](Self::pump_once).
    pub fn drain_blocking(&mut self) {
        while self.is_processing_paths() {
            if self.in_flight.is_some() {
                match self.results.recv() {
                    Ok((key, result)) => self.complete(key, result),
                    Err(_) => self.recover_lost_worker(),
                }
            }
            self.start_next();
        }
    }

    fn start_next(&mut self) {
        if self.in_flight.is_some() {
            return;
        }
        let Some(key) = self.queue.pop_front() else {
            return;
        };

        let sent = match &self.jobs {
            Some(jobs) => jobs.send(key).is_ok(),
            None => false,
        };

        if sent {
            self.in_flight = Some(key);
        } else {
            // No worker: resolve on this thread so requests are never stranded.
            let result = self.search.find_path(key.origin, key.destination);
            self.complete(key, result);
        }
    }

    fn complete(&mut self, key: PathKey, result: PathResult) {
        tracing::debug!(
            origin = %key.origin,
            destination = %key.destination,
            jumps = result.total_jumps,
            reachable = !result.is_unreachable(),
            "Path resolved"
        );
        self.cache.put(key, result);
        self.pending.remove(&key);
        if self.in_flight == Some(key) {
            self.in_flight = None;
        }
    }

    fn recover_lost_worker(&mut self) {
        tracing::error!("Path worker disconnected; resolving remaining paths inline");
        self.jobs = None;
        if let Some(key) = self.in_flight.take() {
            let result = self.search.find_path(key.origin, key.destination);
            self.complete(key, result);
        }
    }
}

impl Drop for PathRequestPipeline {
    fn drop(&mut self) {
        // Closing the job channel ends the worker loop.
        self.jobs = None;
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("Path worker panicked");
            }
        }
    }
}

fn run_worker(
    search: PathSearch,
    jobs: Receiver<PathKey>,
    results: Sender<(PathKey, PathResult)>,
) {
    let mut scratch = SearchScratch::default();
    for key in jobs {
        let result = search.find_path_with(key.origin, key.destination, &mut scratch);
        if results.send((key, result)).is_err() {
            break;
        }
    }
}
