//! The warp map: a density-weighted reparameterization of the time axis.
//!
//! Every bin gets a weight `1 + (density / max_density) * amplification`.
//! Walking the bins in order and accumulating those weights gives a CDF; the warp
//! value of a bin is where that CDF puts the *start* of the bin, expressed in domain units.
//! Dense stretches of time therefore get more of the output axis than sparse ones.

use crate::histogram::max_value;
use crate::{TimeDomain, WarpTuning};

/// Build the warp map from a smoothed (not necessarily normalized) density histogram.
///
/// An all-zero histogram weights every bin equally, giving a linear warp.
pub fn build_warp_map(smoothed: &[f64], domain: TimeDomain, tuning: WarpTuning) -> Vec<f64> {
    stc_tracing::profile_function!();

    let tuning = tuning.sanitized();

    let max_density = match max_value(smoothed) {
        max if max > 0.0 => max,
        _ => 1.0,
    };

    let weights = smoothed
        .iter()
        .map(|&d| 1.0 + (d / max_density) * tuning.amplification);
    let total_weight: f64 = weights.clone().sum();

    let span = domain.span();
    let mut accumulated = 0.0;
    weights
        .map(|w| {
            let warped = domain.start() + (accumulated / total_weight) * span;
            accumulated += w;
            warped
        })
        .collect()
}

/// The warp map used when there is no data at all: bin `i` maps to `start + i / (n - 1) * span`.
///
/// Unlike the all-zero-density case of [`build_warp_map`], the last value is exactly
/// the end of the domain.
pub fn linear_warp_map(domain: TimeDomain, bin_count: usize) -> Vec<f64> {
    if bin_count <= 1 {
        return vec![domain.start(); bin_count];
    }

    let last = (bin_count - 1) as f64;
    let span = domain.span();
    (0..bin_count)
        .map(|i| domain.start() + (i as f64 / last) * span)
        .collect()
}

/// Sample the warp map at a normalized time `t01 ∈ [0, 1]`, interpolating between bins.
///
/// The index is `t01 * (len - 1)`; anything outside of `[0, 1]` clamps to the first/last value.
/// Returns `None` for an empty map.
pub fn sample_warp(warp_map: &[f64], t01: f64) -> Option<f64> {
    let (&first, &last) = (warp_map.first()?, warp_map.last()?);
    let len = warp_map.len();

    let idx = t01 * (len - 1) as f64;
    if !(idx >= 0.0) {
        return Some(first); // also catches NaN
    }

    let low = idx.floor() as usize;
    if low >= len - 1 {
        return Some(last);
    }

    let frac = idx - low as f64;
    Some(warp_map[low] * (1.0 - frac) + warp_map[low + 1] * frac)
}

/// Mix a linear position with its warped counterpart.
///
/// `warp_factor = 0` is fully linear, `1` is fully adaptive. Values outside `[0, 1]` are clamped.
#[inline]
pub fn blend_warp(linear: f64, adaptive: f64, warp_factor: f64) -> f64 {
    let f = if warp_factor.is_nan() {
        0.0
    } else {
        warp_factor.clamp(0.0, 1.0)
    };
    linear * (1.0 - f) + adaptive * f
}
