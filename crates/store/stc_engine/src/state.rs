use std::sync::Arc;

use stc_density::{
    AdaptiveScale, BurstMetric, BurstWindow, TimeDomain, TimeScaleMode, burst_windows, percentile,
};

use crate::{ComputationResult, ComputeEvent};

/// The default fraction of bins that are *not* considered bursts.
pub const DEFAULT_BURST_THRESHOLD: f64 = 0.7;

/// What the views need to know about the adaptive maps: the latest result and how to use it.
#[derive(Clone, Debug)]
pub struct AdaptiveState {
    /// `0` = linear time, `1` = fully adaptive.
    warp_factor: f64,

    burst_metric: BurstMetric,

    /// Percentile (in `[0, 1]`) of the selected map above which a bin counts as a burst.
    burst_threshold: f64,

    /// The map value at [`Self::burst_threshold`], derived.
    burst_cutoff: f64,

    /// Domain of the last submitted computation.
    map_domain: TimeDomain,

    result: Option<Arc<ComputationResult>>,
    is_computing: bool,
}

impl Default for AdaptiveState {
    fn default() -> Self {
        Self {
            warp_factor: 0.0,
            burst_metric: BurstMetric::default(),
            burst_threshold: DEFAULT_BURST_THRESHOLD,
            burst_cutoff: 1.0,
            map_domain: TimeDomain::default(),
            result: None,
            is_computing: false,
        }
    }
}

impl AdaptiveState {
    #[inline]
    pub fn warp_factor(&self) -> f64 {
        self.warp_factor
    }

    /// Clamped to `[0, 1]`; NaN is ignored.
    pub fn set_warp_factor(&mut self, warp_factor: f64) {
        if !warp_factor.is_nan() {
            self.warp_factor = warp_factor.clamp(0.0, 1.0);
        }
    }

    #[inline]
    pub fn burst_metric(&self) -> BurstMetric {
        self.burst_metric
    }

    pub fn set_burst_metric(&mut self, metric: BurstMetric) {
        self.burst_metric = metric;
        self.update_cutoff();
    }

    #[inline]
    pub fn burst_threshold(&self) -> f64 {
        self.burst_threshold
    }

    pub fn set_burst_threshold(&mut self, threshold: f64) {
        self.burst_threshold = threshold;
        self.update_cutoff();
    }

    #[inline]
    pub fn burst_cutoff(&self) -> f64 {
        self.burst_cutoff
    }

    #[inline]
    pub fn map_domain(&self) -> TimeDomain {
        self.map_domain
    }

    #[inline]
    pub fn result(&self) -> Option<&Arc<ComputationResult>> {
        self.result.as_ref()
    }

    #[inline]
    pub fn is_computing(&self) -> bool {
        self.is_computing
    }

    /// A computation over `domain` was submitted.
    pub fn begin_compute(&mut self, domain: TimeDomain) {
        self.is_computing = true;
        self.map_domain = domain;
    }

    /// Store a freshly published result and re-derive the burst cutoff from it.
    pub fn apply_result(&mut self, result: Arc<ComputationResult>) {
        self.result = Some(result);
        self.is_computing = false;
        self.update_cutoff();
    }

    pub fn apply_event(&mut self, event: &ComputeEvent) {
        match event {
            ComputeEvent::Completed(result) => self.apply_result(Arc::clone(result)),
            ComputeEvent::Failed { request_id, error } => {
                stc_log::warn!(
                    "Keeping previous adaptive maps, request #{request_id} failed: {}",
                    stc_error::format_ref(error)
                );
                self.is_computing = false;
            }
        }
    }

    /// The map the burst metric reads from, if there is a result yet.
    pub fn burst_map(&self) -> Option<&[f64]> {
        self.result
            .as_ref()
            .map(|result| self.burst_metric.select(&result.maps))
    }

    /// The strongest bursts of the selected map, at most `limit`.
    ///
    /// Placed over the domain the maps were computed for.
    pub fn burst_windows(&self, limit: usize) -> Vec<BurstWindow> {
        let Some(result) = self.result.as_ref() else {
            return Vec::new();
        };
        let map = self.burst_metric.select(&result.maps);
        burst_windows(map, result.domain, self.burst_cutoff, limit)
    }

    /// The time scale for `range`, following the warp map when `mode` is adaptive.
    ///
    /// The warp map is only valid for the domain it was computed for, so while a computation
    /// for another domain is in flight the scale keeps using the published one.
    /// Without any result the scale is linear over [`Self::map_domain`].
    pub fn scale(&self, mode: TimeScaleMode, range: (f64, f64)) -> AdaptiveScale {
        match self.result.as_ref() {
            Some(result) => {
                AdaptiveScale::new(mode, Some(&result.maps.warp_map), result.domain, range)
            }
            None => AdaptiveScale::new(mode, None, self.map_domain, range),
        }
    }

    fn update_cutoff(&mut self) {
        let threshold = self.burst_threshold;
        if let Some(cutoff) = self.burst_map().map(|map| percentile(map, threshold)) {
            self.burst_cutoff = cutoff;
        }
    }
}
