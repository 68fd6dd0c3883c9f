use crate::TimeDomain;

/// Count how many timestamps fall into each of `bin_count` equal bins over `domain`.
///
/// Timestamps outside the domain (and NaNs) are ignored.
/// The result does not depend on the order of `timestamps`.
pub fn build_histogram(timestamps: &[f64], domain: TimeDomain, bin_count: usize) -> Vec<u32> {
    stc_tracing::profile_function!();

    let mut counts = vec![0_u32; bin_count];
    for &t in timestamps {
        if let Some(idx) = domain.bin_index(t, bin_count) {
            counts[idx] = counts[idx].saturating_add(1);
        }
    }
    counts
}

/// Like [`build_histogram`], but timestamps outside the domain are clamped into the edge bins.
///
/// This is what the direct (unsmoothed) adaptive scale uses, so that
/// points just outside the visible range still pull on the edges.
pub(crate) fn build_clamped_histogram(
    timestamps: &[f64],
    domain: TimeDomain,
    bin_count: usize,
) -> Vec<u32> {
    stc_tracing::profile_function!();

    let mut counts = vec![0_u32; bin_count];
    if bin_count == 0 {
        return counts;
    }

    for &t in timestamps {
        let norm = domain.normalized_position(t);
        if norm.is_nan() {
            continue;
        }
        let idx = (norm * bin_count as f64).floor().clamp(0.0, (bin_count - 1) as f64) as usize;
        counts[idx] = counts[idx].saturating_add(1);
    }
    counts
}

/// The largest value, or `0.0` for an empty slice.
#[inline]
pub(crate) fn max_value(values: &[f64]) -> f64 {
    values.iter().copied().fold(0.0, f64::max)
}

/// Divide by the maximum so the largest bin is exactly `1.0`.
///
/// An all-zero input stays all-zero.
pub fn normalize_density(smoothed: &[f64]) -> Vec<f64> {
    let max = max_value(smoothed);
    if max > 0.0 {
        smoothed.iter().map(|&d| d / max).collect()
    } else {
        vec![0.0; smoothed.len()]
    }
}
