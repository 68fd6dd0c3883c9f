use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam::channel::{Receiver, Sender};
use parking_lot::Mutex;

use stc_density::{AdaptiveMaps, EngineConfig, TimeDomain, WarpTuning, compute_adaptive_maps};

/// Strictly increasing per [`Orchestrator`], starting at `1`.
pub type RequestId = u64;

/// The actual computation run on the worker threads.
pub type ComputeFn = Arc<dyn Fn(&ComputationRequest) -> AdaptiveMaps + Send + Sync>;

// ---

/// Errors reported to subscribers through [`ComputeEvent::Failed`].
///
/// These are recoverable: the orchestrator keeps accepting requests afterwards.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ComputeError {
    #[error("adaptive map computation panicked: {0}")]
    WorkerPanicked(String),

    #[error("no worker is running to accept the request")]
    WorkerDisconnected,
}

#[derive(thiserror::Error, Debug)]
pub enum OrchestratorError {
    #[error("failed to spawn worker thread '{name}': {err}")]
    SpawnThread {
        name: String,
        err: std::io::Error,
    },
}

// ---

#[derive(Clone, Debug)]
pub struct ComputationRequest {
    pub request_id: RequestId,
    pub series: Arc<[f64]>,
    pub domain: TimeDomain,
    pub config: EngineConfig,
}

/// The maps of one request, tagged with the request that produced them.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputationResult {
    pub request_id: RequestId,
    pub domain: TimeDomain,
    pub config: EngineConfig,

    #[serde(flatten)]
    pub maps: AdaptiveMaps,
}

/// What subscribers of an [`Orchestrator`] receive.
///
/// Only ever sent for the most recently submitted request; stale outcomes are dropped silently.
#[derive(Clone, Debug)]
pub enum ComputeEvent {
    Completed(Arc<ComputationResult>),
    Failed {
        request_id: RequestId,
        error: ComputeError,
    },
}

impl ComputeEvent {
    #[inline]
    pub fn request_id(&self) -> RequestId {
        match self {
            Self::Completed(result) => result.request_id,
            Self::Failed { request_id, .. } => *request_id,
        }
    }
}

// ---

#[derive(Clone, Debug)]
pub struct OrchestratorOptions {
    pub tuning: WarpTuning,

    /// Worker threads are named `{thread_name}#{index}`.
    pub thread_name: String,

    /// At least one worker is always spawned.
    pub num_workers: usize,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            tuning: WarpTuning::default(),
            thread_name: "stc_engine::orchestrator".to_owned(),
            num_workers: 1,
        }
    }
}

// ---

#[derive(Default)]
struct Published {
    latest: Option<Arc<ComputationResult>>,

    /// The last request that was either published or reported as failed.
    last_resolved: RequestId,

    subscribers: Vec<Sender<ComputeEvent>>,
}

#[derive(Default)]
struct Shared {
    last_submitted: AtomicU64,
    published: Mutex<Published>,
}

impl Shared {
    #[inline]
    fn last_submitted(&self) -> RequestId {
        self.last_submitted.load(Ordering::SeqCst)
    }

    /// Publish the outcome of `request_id`, unless a newer request was submitted in the meantime.
    fn publish(&self, request_id: RequestId, outcome: Result<ComputationResult, ComputeError>) {
        let mut published = self.published.lock();

        let last_submitted = self.last_submitted();
        if request_id > last_submitted {
            stc_log::debug_panic!(
                "Request #{request_id} was never submitted (latest is #{last_submitted})"
            );
            return;
        }
        if request_id != last_submitted {
            stc_log::debug!(
                "Dropping stale result of request #{request_id} (latest is #{last_submitted})"
            );
            return;
        }

        published.last_resolved = request_id;

        let event = match outcome {
            Ok(result) => {
                let result = Arc::new(result);
                published.latest = Some(Arc::clone(&result));
                ComputeEvent::Completed(result)
            }
            Err(error) => ComputeEvent::Failed { request_id, error },
        };

        published
            .subscribers
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}

// ---

/// Returned by [`Orchestrator::submit`].
#[derive(Clone)]
pub struct RequestHandle {
    request_id: RequestId,
    shared: Arc<Shared>,
}

impl std::fmt::Debug for RequestHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestHandle")
            .field("request_id", &self.request_id)
            .finish()
    }
}

impl RequestHandle {
    #[inline]
    pub fn id(&self) -> RequestId {
        self.request_id
    }

    /// A newer request has been submitted; whatever this one produces will be dropped.
    #[inline]
    pub fn is_superseded(&self) -> bool {
        self.shared.last_submitted() != self.request_id
    }
}

// ---

/// Runs adaptive map computations on worker threads and publishes only the newest one.
///
/// Results are applied in submission order, not completion order: when a computation finishes,
/// its result is published only if no other request was submitted after it.
/// There is no preemption; superseded work that already started runs to completion
/// and is then discarded. Superseded work still waiting in the queue is skipped.
///
/// Dropping the orchestrator waits for in-flight computations to finish.
pub struct Orchestrator {
    shared: Arc<Shared>,
    jobs_tx: Option<Sender<ComputationRequest>>,
    workers: Vec<std::thread::JoinHandle<()>>,
}

impl Orchestrator {
    /// Spawn the workers running [`compute_adaptive_maps`].
    pub fn new(options: OrchestratorOptions) -> Result<Self, OrchestratorError> {
        let tuning = options.tuning;
        let compute: ComputeFn = Arc::new(move |request: &ComputationRequest| {
            compute_adaptive_maps(&request.series, request.domain, request.config, tuning)
        });
        Self::with_compute_fn(options, compute)
    }

    /// Like [`Self::new`], but with a custom computation.
    pub fn with_compute_fn(
        options: OrchestratorOptions,
        compute: ComputeFn,
    ) -> Result<Self, OrchestratorError> {
        let shared = Arc::new(Shared::default());
        let (jobs_tx, jobs_rx) = crossbeam::channel::unbounded();

        let mut workers = Vec::with_capacity(options.num_workers.max(1));
        for index in 0..options.num_workers.max(1) {
            let name = format!("{}#{index}", options.thread_name);
            let spawned = std::thread::Builder::new().name(name.clone()).spawn({
                let jobs_rx = jobs_rx.clone();
                let shared = Arc::clone(&shared);
                let compute = Arc::clone(&compute);
                move || worker_thread(&jobs_rx, &shared, &compute)
            });

            match spawned {
                Ok(handle) => workers.push(handle),
                Err(err) => {
                    drop(jobs_tx);
                    for handle in workers {
                        handle.join().ok();
                    }
                    return Err(OrchestratorError::SpawnThread { name, err });
                }
            }
        }

        Ok(Self {
            shared,
            jobs_tx: Some(jobs_tx),
            workers,
        })
    }

    /// Queue a computation and return immediately.
    ///
    /// The outcome arrives as a [`ComputeEvent`] on every [`Self::subscribe`] channel,
    /// unless another request is submitted before it finishes.
    pub fn submit(
        &self,
        series: impl Into<Arc<[f64]>>,
        domain: TimeDomain,
        config: EngineConfig,
    ) -> RequestHandle {
        let request_id = self.shared.last_submitted.fetch_add(1, Ordering::SeqCst) + 1;
        let series = series.into();

        stc_log::debug!(
            "Submitting request #{request_id}: {} timestamps over {domain}, {config}",
            series.len()
        );

        let request = ComputationRequest {
            request_id,
            series,
            domain,
            config,
        };

        let sent = self
            .jobs_tx
            .as_ref()
            .is_some_and(|tx| tx.send(request).is_ok());
        if !sent {
            stc_log::error!("Request #{request_id} could not be queued: all workers are gone");
            self.shared
                .publish(request_id, Err(ComputeError::WorkerDisconnected));
        }

        RequestHandle {
            request_id,
            shared: Arc::clone(&self.shared),
        }
    }

    /// Receive every future [`ComputeEvent`].
    pub fn subscribe(&self) -> Receiver<ComputeEvent> {
        let (tx, rx) = crossbeam::channel::unbounded();
        self.shared.published.lock().subscribers.push(tx);
        rx
    }

    /// The last published result, if any.
    pub fn latest(&self) -> Option<Arc<ComputationResult>> {
        self.shared.published.lock().latest.clone()
    }

    /// The id of the most recently submitted request, `0` if none.
    #[inline]
    pub fn last_submitted_id(&self) -> RequestId {
        self.shared.last_submitted()
    }

    /// Is the most recently submitted request still waiting for its outcome?
    pub fn is_computing(&self) -> bool {
        let published = self.shared.published.lock();
        published.last_resolved < self.shared.last_submitted()
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        // Closing the channel is what stops the workers.
        self.jobs_tx = None;
        for handle in self.workers.drain(..) {
            handle.join().ok();
        }
    }
}

fn worker_thread(jobs: &Receiver<ComputationRequest>, shared: &Shared, compute: &ComputeFn) {
    while let Ok(request) = jobs.recv() {
        let request_id = request.request_id;

        if request_id != shared.last_submitted() {
            stc_log::debug!("Skipping superseded request #{request_id}");
            continue;
        }

        let outcome = {
            stc_tracing::profile_scope!("compute_request");
            std::panic::catch_unwind(AssertUnwindSafe(|| compute(&request)))
        };

        let outcome = match outcome {
            Ok(maps) => Ok(ComputationResult {
                request_id,
                domain: request.domain,
                config: request.config,
                maps,
            }),
            Err(payload) => {
                let err = ComputeError::WorkerPanicked(panic_message(&*payload));
                stc_log::error!("Request #{request_id} failed: {}", stc_error::format_ref(&err));
                Err(err)
            }
        };

        shared.publish(request_id, outcome);
    }

    stc_log::trace!("Orchestrator worker shutting down: request channel closed");
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_owned()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}
