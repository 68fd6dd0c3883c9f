//! Scheduling of the adaptive time maps.
//!
//! The numerics live in `stc_density` and are pure; this crate decides *when* and *where*
//! they run:
//!
//! * [`Orchestrator`] runs computations on worker threads and only ever publishes the
//!   result of the most recently submitted request.
//! * [`Debouncer`] and [`AdaptiveController`] turn bursts of input changes into one submission.
//! * [`GlobalMapsCache`] memoizes the dataset-wide maps per resolution.
//! * [`AdaptiveState`] is what views read: latest maps, warp factor and burst settings.

mod cache;
mod controller;
mod debounce;
mod orchestrator;
mod state;

pub use self::cache::{
    CacheError, DatasetSnapshot, GlobalAdaptiveMaps, GlobalMapsCache, InMemorySource,
    TimestampSource,
};
pub use self::controller::{AdaptiveController, FilterSignature, SpatialBounds};
pub use self::debounce::{DEFAULT_DEBOUNCE, Debouncer};
pub use self::orchestrator::{
    ComputationRequest, ComputationResult, ComputeError, ComputeEvent, ComputeFn, Orchestrator,
    OrchestratorError, OrchestratorOptions, RequestHandle, RequestId,
};
pub use self::state::{AdaptiveState, DEFAULT_BURST_THRESHOLD};
