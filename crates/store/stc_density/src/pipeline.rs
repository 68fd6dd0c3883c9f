use crate::{
    EngineConfig, TimeDomain, WarpTuning, build_histogram, build_warp_map, compute_burstiness,
    compute_burstiness_sorted, linear_warp_map, normalize_density, smooth_histogram,
};

/// The three per-bin maps, all of length `bin_count`, in ascending bin order.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptiveMaps {
    /// Smoothed histogram normalized so the densest bin is `1.0` (all zero without data).
    pub density_map: Vec<f64>,

    /// Inter-arrival burstiness in `[0, 1]`.
    pub burstiness_map: Vec<f64>,

    /// Warped start of each bin, in domain units. Non-decreasing.
    pub warp_map: Vec<f64>,
}

impl AdaptiveMaps {
    /// The maps for a series without any timestamps: no density, no burstiness, linear warp.
    pub fn empty(domain: TimeDomain, bin_count: usize) -> Self {
        Self {
            density_map: vec![0.0; bin_count],
            burstiness_map: vec![0.0; bin_count],
            warp_map: linear_warp_map(domain, bin_count),
        }
    }

    #[inline]
    pub fn bin_count(&self) -> usize {
        self.density_map.len()
    }
}

/// Run the whole pipeline: histogram, smoothing, warp and burstiness.
///
/// Pure and deterministic; identical inputs give bit-identical maps.
pub fn compute_adaptive_maps(
    timestamps: &[f64],
    domain: TimeDomain,
    config: EngineConfig,
    tuning: WarpTuning,
) -> AdaptiveMaps {
    compute_impl(timestamps, domain, config, tuning, |bin_count| {
        compute_burstiness(timestamps, domain, bin_count)
    })
}

/// Like [`compute_adaptive_maps`], but skips sorting because `sorted_timestamps` are ascending.
pub fn compute_adaptive_maps_presorted(
    sorted_timestamps: &[f64],
    domain: TimeDomain,
    config: EngineConfig,
    tuning: WarpTuning,
) -> AdaptiveMaps {
    stc_log::debug_assert!(
        sorted_timestamps.is_sorted_by(|a, b| a <= b || a.is_nan() || b.is_nan()),
        "timestamps are not sorted"
    );

    compute_impl(sorted_timestamps, domain, config, tuning, |bin_count| {
        compute_burstiness_sorted(sorted_timestamps, domain, bin_count)
    })
}

fn compute_impl(
    timestamps: &[f64],
    domain: TimeDomain,
    config: EngineConfig,
    tuning: WarpTuning,
    burstiness: impl FnOnce(usize) -> Vec<f64>,
) -> AdaptiveMaps {
    stc_tracing::profile_function!();

    let EngineConfig {
        bin_count,
        kernel_width,
    } = config.sanitized();

    if timestamps.is_empty() {
        return AdaptiveMaps::empty(domain, bin_count);
    }

    let counts = build_histogram(timestamps, domain, bin_count);
    let smoothed = smooth_histogram(&counts, kernel_width);
    let warp_map = build_warp_map(&smoothed, domain, tuning);
    let density_map = normalize_density(&smoothed);
    let burstiness_map = burstiness(bin_count);
    stc_log::debug_assert_eq!(burstiness_map.len(), bin_count);

    AdaptiveMaps {
        density_map,
        burstiness_map,
        warp_map,
    }
}
