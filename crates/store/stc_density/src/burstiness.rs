//! Per-bin burstiness of inter-arrival gaps.
//!
//! For the gaps `g` whose later timestamp falls into a bin we compute
//! `B = (σ - μ) / (σ + μ)`, which is `-1` for perfectly regular arrivals,
//! around `0` for Poisson-like arrivals, and approaches `+1` for clustered bursts.
//! The stored value is `B` rescaled to `[0, 1]`.

use itertools::Itertools as _;

use crate::TimeDomain;

/// Running gap statistics for one bin.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct GapStats {
    count: u32,
    sum: f64,
    sum_sq: f64,
}

impl GapStats {
    #[inline]
    fn add(&mut self, gap: f64) {
        self.count += 1;
        self.sum += gap;
        self.sum_sq += gap * gap;
    }

    /// Rescaled burstiness in `[0, 1]`. Bins with fewer than two gaps are `0`.
    fn burstiness(&self) -> f64 {
        if self.count <= 1 {
            return 0.0;
        }

        let n = f64::from(self.count);
        let mean = self.sum / n;
        let variance = (self.sum_sq / n - mean * mean).max(0.0);
        let sigma = variance.sqrt();

        let denom = sigma + mean;
        let b = if denom > 0.0 {
            (sigma - mean) / denom
        } else {
            0.0
        };

        ((b + 1.0) / 2.0).clamp(0.0, 1.0)
    }
}

/// Burstiness of `timestamps` in each of `bin_count` bins over `domain`.
///
/// `timestamps` need not be sorted; they are sorted into a scratch buffer first.
/// Use [`compute_burstiness_sorted`] if they already are.
pub fn compute_burstiness(timestamps: &[f64], domain: TimeDomain, bin_count: usize) -> Vec<f64> {
    stc_tracing::profile_function!();

    let sorted = {
        stc_tracing::profile_scope!("sort");
        timestamps
            .iter()
            .copied()
            .filter(|t| !t.is_nan())
            .sorted_unstable_by(f64::total_cmp)
            .collect_vec()
    };

    compute_burstiness_sorted(&sorted, domain, bin_count)
}

/// Burstiness of already ascending-sorted `timestamps`.
///
/// Each gap between consecutive timestamps is attributed to the bin of the later timestamp.
/// Negative or non-finite gaps are skipped, so a slightly unsorted input degrades gracefully.
pub fn compute_burstiness_sorted(
    sorted_timestamps: &[f64],
    domain: TimeDomain,
    bin_count: usize,
) -> Vec<f64> {
    stc_tracing::profile_function!();

    let mut stats = vec![GapStats::default(); bin_count];

    for (&prev, &next) in sorted_timestamps.iter().tuple_windows() {
        let gap = next - prev;
        if !(gap >= 0.0 && gap.is_finite()) {
            continue;
        }
        if let Some(idx) = domain.bin_index(next, bin_count) {
            stats[idx].add(gap);
        }
    }

    stats.iter().map(GapStats::burstiness).collect()
}
