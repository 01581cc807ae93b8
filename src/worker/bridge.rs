//! Request/reply bridge between the caller and the rollup worker.
//!
//! Each request gets an id and an `active` flag. Issuing a new request (or
//! calling [`RollupBridge::cancel`]) clears the flag of everything still in
//! flight, and replies for inactive requests are dropped. The displayed
//! panel data therefore always belongs to the latest request.

use super::rollup::{Job, RollupReply, RollupRequest, RollupWorker};
use crate::aggregation::PanelData;
use crate::config::WorkerConfig;
use crate::error::{OpossumError, WorkerErrorKind};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Caller-side view of one request.
#[derive(Debug, Clone)]
pub struct RollupHandle {
    id: u64,
    active: Arc<AtomicBool>,
}

impl RollupHandle {
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Mark the request inactive; its result will be discarded.
    pub fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
    }
}

struct PendingRollup {
    handle: RollupHandle,
    fallback: RollupRequest,
}

/// Routes panel computations to the worker with synchronous fallback.
#[derive(Default)]
pub struct RollupBridge {
    worker: Option<RollupWorker>,
    offload_threshold: usize,
    next_id: u64,
    pending: HashMap<u64, PendingRollup>,
    panel_data: Option<Vec<PanelData>>,
    applied_id: Option<u64>,
}

impl std::fmt::Debug for RollupBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RollupBridge")
            .field("worker", &self.worker)
            .field("offload_threshold", &self.offload_threshold)
            .field("pending", &self.pending.len())
            .field("applied_id", &self.applied_id)
            .finish()
    }
}

impl RollupBridge {
    /// Bridge configured from `config`; computes synchronously if the
    /// worker is disabled or cannot be started.
    #[must_use]
    pub fn new(config: &WorkerConfig) -> Self {
        if !config.enabled {
            return Self::synchronous();
        }
        match RollupWorker::spawn(config.threads) {
            Ok(worker) => Self::with_worker(worker, config.offload_threshold),
            Err(err) => {
                tracing::warn!(error = %err, "Rollup worker unavailable, computing synchronously");
                Self::synchronous()
            }
        }
    }

    /// Bridge without a worker.
    #[must_use]
    pub fn synchronous() -> Self {
        Self::default()
    }

    /// Bridge around an existing worker. Requests smaller than
    /// `offload_threshold` are still computed on the calling thread.
    #[must_use]
    pub fn with_worker(worker: RollupWorker, offload_threshold: usize) -> Self {
        Self {
            worker: Some(worker),
            offload_threshold,
            ..Self::default()
        }
    }

    /// Latest applied panel data.
    #[must_use]
    pub fn panel_data(&self) -> Option<&[PanelData]> {
        self.panel_data.as_deref()
    }

    /// Id of the request whose result is displayed.
    #[must_use]
    pub const fn applied_id(&self) -> Option<u64> {
        self.applied_id
    }

    /// Whether any reply is still outstanding.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Issue a request, superseding all earlier ones.
    pub fn request(&mut self, request: RollupRequest) -> RollupHandle {
        self.cancel();

        let handle = RollupHandle {
            id: self.next_id,
            active: Arc::new(AtomicBool::new(true)),
        };
        self.next_id += 1;

        if let Some(worker) = &self.worker
            && request.size() >= self.offload_threshold
        {
            let job = Job {
                id: handle.id,
                request: request.clone(),
            };
            match worker.post(job) {
                Ok(()) => {
                    self.pending.insert(
                        handle.id,
                        PendingRollup {
                            handle: handle.clone(),
                            fallback: request,
                        },
                    );
                    return handle;
                }
                Err(err) => {
                    tracing::warn!(id = handle.id, error = %err, "Posting to rollup worker failed, computing synchronously");
                }
            }
        }

        let output = request.compute();
        self.apply(&handle, output);
        handle
    }

    /// Deactivate every request still in flight.
    pub fn cancel(&mut self) {
        for pending in self.pending.values() {
            pending.handle.deactivate();
        }
    }

    /// Process replies that already arrived. Returns `true` if the
    /// displayed panel data changed.
    pub fn poll(&mut self) -> bool {
        let before = self.applied_id;
        loop {
            let Some(next) = self.worker.as_ref().and_then(RollupWorker::try_recv) else {
                break;
            };
            match next {
                Ok(reply) => self.handle_reply(reply),
                Err(err) => {
                    self.fall_back_all(&err);
                    break;
                }
            }
        }
        self.applied_id != before
    }

    /// Block until the request behind `handle` is resolved.
    pub fn wait_for(&mut self, handle: &RollupHandle) {
        while self.pending.contains_key(&handle.id) {
            if !self.recv_one() {
                break;
            }
        }
    }

    /// Block until every outstanding reply has been processed.
    pub fn wait(&mut self) {
        while self.has_pending() {
            if !self.recv_one() {
                break;
            }
        }
    }

    fn recv_one(&mut self) -> bool {
        let Some(worker) = &self.worker else {
            let err = OpossumError::worker("rollup bridge", WorkerErrorKind::Disconnected);
            self.fall_back_all(&err);
            return false;
        };
        match worker.recv() {
            Ok(reply) => {
                self.handle_reply(reply);
                true
            }
            Err(err) => {
                self.fall_back_all(&err);
                false
            }
        }
    }

    fn handle_reply(&mut self, reply: RollupReply) {
        let Some(pending) = self.pending.remove(&reply.id) else {
            tracing::debug!(id = reply.id, "Reply for unknown rollup request");
            return;
        };
        if !pending.handle.is_active() {
            tracing::debug!(id = reply.id, "Discarding reply of inactive rollup request");
            return;
        }
        let output = match reply.output {
            Some(output) => output,
            None => {
                let err = OpossumError::worker(
                    format!("rollup request {}", reply.id),
                    WorkerErrorKind::EmptyReply,
                );
                tracing::warn!(error = %err, "Rollup worker failed, computing synchronously");
                pending.fallback.compute()
            }
        };
        self.apply(&pending.handle, output);
    }

    fn fall_back_all(&mut self, err: &OpossumError) {
        let mut pending: Vec<PendingRollup> = self.pending.drain().map(|(_, p)| p).collect();
        pending.sort_by_key(|p| p.handle.id);
        for rollup in pending {
            if !rollup.handle.is_active() {
                continue;
            }
            tracing::warn!(id = rollup.handle.id, error = %err, "Rollup worker failed, computing synchronously");
            let output = rollup.fallback.compute();
            self.apply(&rollup.handle, output);
        }
    }

    fn apply(&mut self, handle: &RollupHandle, output: Vec<PanelData>) {
        if !handle.is_active() {
            tracing::debug!(id = handle.id, "Discarding result of inactive rollup request");
            return;
        }
        self.panel_data = Some(output);
        self.applied_id = Some(handle.id);
    }
}
