//! Background threads computing panel data.

use crate::aggregation::{PanelData, PanelDataInput, get_panel_data};
use crate::error::{OpossumError, Result, WorkerErrorKind};
use crate::model::{AttributionData, AttributionId, ResourceId};
use crate::store::ResourceState;
use std::collections::{HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, mpsc};
use std::thread::{self, JoinHandle};

/// Owned inputs of one panel computation.
///
/// Datasets are shared snapshots; the store mutates through copy-on-write,
/// so a request never observes later edits.
#[derive(Debug, Clone)]
pub struct RollupRequest {
    pub selected_resource_id: ResourceId,
    pub manual_data: Arc<AttributionData>,
    pub external_data: Arc<AttributionData>,
    pub resolved_external_attributions: Arc<HashSet<AttributionId>>,
    pub files_with_children: Arc<HashSet<ResourceId>>,
    pub external_attributions_to_hashes: Arc<HashMap<AttributionId, String>>,
}

impl RollupRequest {
    /// Snapshot the inputs for `selected_resource_id`.
    #[must_use]
    pub fn from_state(state: &ResourceState, selected_resource_id: impl Into<ResourceId>) -> Self {
        Self {
            selected_resource_id: selected_resource_id.into(),
            manual_data: state.manual_data_arc(),
            external_data: state.external_data_arc(),
            resolved_external_attributions: state.resolved_external_attributions_arc(),
            files_with_children: Arc::new(state.files_with_children.clone()),
            external_attributions_to_hashes: state.external_attributions_to_hashes_arc(),
        }
    }

    #[must_use]
    pub fn input(&self) -> PanelDataInput<'_> {
        PanelDataInput {
            selected_resource_id: &self.selected_resource_id,
            manual_data: &self.manual_data,
            external_data: &self.external_data,
            resolved_external_attribution_ids: &self.resolved_external_attributions,
            files_with_children: &self.files_with_children,
            external_attributions_to_hashes: &self.external_attributions_to_hashes,
        }
    }

    /// Compute the panels on the calling thread.
    #[must_use]
    pub fn compute(&self) -> Vec<PanelData> {
        get_panel_data(&self.input())
    }

    /// Number of attributed resources across both datasets.
    #[must_use]
    pub fn size(&self) -> usize {
        self.manual_data.resources_to_attributions().len()
            + self.external_data.resources_to_attributions().len()
    }
}

/// Computation run by the worker; `None` means "no output".
pub type ComputeFn = dyn Fn(&RollupRequest) -> Option<Vec<PanelData>> + Send + Sync;

pub(crate) struct Job {
    pub id: u64,
    pub request: RollupRequest,
}

/// Reply to one posted request.
#[derive(Debug)]
pub struct RollupReply {
    pub id: u64,
    pub output: Option<Vec<PanelData>>,
}

/// Pool of threads answering [`RollupRequest`]s over channels.
pub struct RollupWorker {
    jobs: Option<mpsc::Sender<Job>>,
    replies: mpsc::Receiver<RollupReply>,
    handles: Vec<JoinHandle<()>>,
}

impl std::fmt::Debug for RollupWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RollupWorker")
            .field("running", &self.is_running())
            .field("threads", &self.handles.len())
            .finish()
    }
}

impl RollupWorker {
    /// Spawn `threads` workers computing [`get_panel_data`].
    pub fn spawn(threads: usize) -> Result<Self> {
        Self::with_compute(threads, Arc::new(|request: &RollupRequest| Some(request.compute())))
    }

    /// Spawn workers running a custom computation.
    pub fn with_compute(threads: usize, compute: Arc<ComputeFn>) -> Result<Self> {
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (reply_tx, reply_rx) = mpsc::channel();
        let job_rx = Arc::new(Mutex::new(job_rx));

        let mut handles = Vec::with_capacity(threads.max(1));
        for index in 0..threads.max(1) {
            let job_rx = Arc::clone(&job_rx);
            let reply_tx = reply_tx.clone();
            let compute = Arc::clone(&compute);
            let handle = thread::Builder::new()
                .name(format!("rollup-worker-{index}"))
                .spawn(move || run_worker(&job_rx, &reply_tx, compute.as_ref()))
                .map_err(|err| {
                    OpossumError::worker("spawning rollup worker", WorkerErrorKind::Spawn(err.to_string()))
                })?;
            handles.push(handle);
        }

        Ok(Self {
            jobs: Some(job_tx),
            replies: reply_rx,
            handles,
        })
    }

    pub(crate) fn post(&self, job: Job) -> Result<()> {
        let sender = self.jobs.as_ref().ok_or_else(disconnected)?;
        sender.send(job).map_err(|_| disconnected())
    }

    /// Next reply, without blocking.
    pub(crate) fn try_recv(&self) -> Option<Result<RollupReply>> {
        match self.replies.try_recv() {
            Ok(reply) => Some(Ok(reply)),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => Some(Err(disconnected())),
        }
    }

    /// Next reply, blocking.
    pub(crate) fn recv(&self) -> Result<RollupReply> {
        self.replies.recv().map_err(|_| disconnected())
    }

    /// Whether requests can still be posted.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.jobs.is_some()
    }

    /// Stop accepting requests and wait for the threads to finish.
    pub fn shutdown(&mut self) {
        self.jobs = None;
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                tracing::warn!("Rollup worker thread panicked");
            }
        }
    }
}

impl Drop for RollupWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn disconnected() -> OpossumError {
    OpossumError::worker("rollup worker", WorkerErrorKind::Disconnected)
}

fn run_worker(
    jobs: &Mutex<mpsc::Receiver<Job>>,
    replies: &mpsc::Sender<RollupReply>,
    compute: &ComputeFn,
) {
    loop {
        let job = match jobs.lock() {
            Ok(receiver) => receiver.recv(),
            Err(_) => break,
        };
        let Ok(Job { id, request }) = job else {
            break;
        };
        let output = panic::catch_unwind(AssertUnwindSafe(|| compute(&request))).unwrap_or_else(|_| {
            tracing::error!(id, resource_id = %request.selected_resource_id, "Rollup computation panicked");
            None
        });
        if replies.send(RollupReply { id, output }).is_err() {
            break;
        }
    }
}
