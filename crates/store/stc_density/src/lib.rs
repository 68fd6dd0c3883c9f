//! Adaptive temporal density and time warping.
//!
//! Given a set of event timestamps and the time domain they are viewed over, this crate computes:
//!
//! * a smoothed, normalized density histogram ([`build_histogram`], [`smooth_histogram`]),
//! * a per-bin burstiness signal from inter-arrival gaps ([`compute_burstiness`]),
//! * a warp map that gives dense stretches of time more room on screen ([`build_warp_map`]),
//!
//! and the piecewise-linear [`AdaptiveScale`] that axis and grid renderers use to place time.
//!
//! [`compute_adaptive_maps`] runs the whole pipeline.
//! Everything here is synchronous and pure; scheduling, superseding and caching
//! computations is done by `stc_engine`.

mod bursts;
mod burstiness;
mod config;
mod domain;
mod histogram;
mod pipeline;
mod scale;
mod smoothing;
mod warp;

pub use self::bursts::{
    BurstMetric, BurstWindow, DEFAULT_MAX_BURST_WINDOWS, burst_windows, percentile,
};
pub use self::burstiness::{compute_burstiness, compute_burstiness_sorted};
pub use self::config::{
    BIN_COUNT_RANGE, DEFAULT_AMPLIFICATION, DEFAULT_BIN_COUNT, DEFAULT_KERNEL_WIDTH,
    EngineConfig, KERNEL_WIDTH_RANGE, WarpTuning,
};
pub use self::domain::{MIN_DOMAIN_SPAN, TimeDomain, to_epoch_seconds};
pub use self::histogram::{build_histogram, normalize_density};
pub use self::pipeline::{AdaptiveMaps, compute_adaptive_maps, compute_adaptive_maps_presorted};
pub use self::scale::{AdaptiveScale, TimeScaleMode};
pub use self::smoothing::smooth_histogram;
pub use self::warp::{blend_warp, build_warp_map, linear_warp_map, sample_warp};
