//! Mapping from time to a display coordinate, optionally following a warp map.
//!
//! The scale is piecewise linear between control points, like a polylinear d3 scale:
//! inside the domain it interpolates, outside it extends the first/last segment.

use crate::histogram::build_clamped_histogram;
use crate::{TimeDomain, WarpTuning, build_warp_map};

/// Whether the time axis follows the warp map or not.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize,
)]
#[serde(rename_all = "camelCase")]
pub enum TimeScaleMode {
    #[default]
    Linear,
    Adaptive,
}

/// A monotonic, piecewise-linear `time -> output` mapping.
///
/// `apply(domain.start()) == range.0` and `apply(domain.end()) == range.1` always hold.
#[derive(Clone, Debug, PartialEq)]
pub struct AdaptiveScale {
    domain: TimeDomain,
    range: (f64, f64),

    /// Strictly increasing times of the control points.
    times: Vec<f64>,

    /// Non-decreasing position of each control point in the range, as a fraction in `[0, 1]`.
    fractions: Vec<f64>,
}

impl AdaptiveScale {
    /// A plain linear scale from `domain` to `range`.
    pub fn linear(domain: TimeDomain, range: (f64, f64)) -> Self {
        Self {
            domain,
            range,
            times: vec![domain.start(), domain.lerp(1.0)],
            fractions: vec![0.0, 1.0],
        }
    }

    /// Pick between [`Self::linear`] and [`Self::from_warp_map`].
    ///
    /// Without a (non-empty) warp map the scale is always linear.
    pub fn new(
        mode: TimeScaleMode,
        warp_map: Option<&[f64]>,
        domain: TimeDomain,
        range: (f64, f64),
    ) -> Self {
        match (mode, warp_map) {
            (TimeScaleMode::Adaptive, Some(warp_map)) if !warp_map.is_empty() => {
                Self::from_warp_map(warp_map, domain, range)
            }
            _ => Self::linear(domain, range),
        }
    }

    /// Build a scale whose control points follow `warp_map`.
    ///
    /// Normally warp value `i` is the warped start of bin `i`, so control point `i` sits at the
    /// start of that bin and a final control point maps the domain end to the range end.
    /// A warp map that already reaches the domain end (the linear fallback for empty data)
    /// is read as evenly spaced samples over the whole domain instead.
    pub fn from_warp_map(warp_map: &[f64], domain: TimeDomain, range: (f64, f64)) -> Self {
        stc_tracing::profile_function!();

        let n = warp_map.len();
        if n == 0 {
            return Self::linear(domain, range);
        }

        let span = domain.span();
        let fraction_of = |w: f64| ((w - domain.start()) / span).clamp(0.0, 1.0);

        let reaches_end = n >= 2 && warp_map[n - 1] >= domain.end();

        let (times, mut fractions): (Vec<f64>, Vec<f64>) = if reaches_end {
            let last = (n - 1) as f64;
            warp_map
                .iter()
                .enumerate()
                .map(|(i, &w)| (domain.lerp(i as f64 / last), fraction_of(w)))
                .unzip()
        } else {
            warp_map
                .iter()
                .enumerate()
                .map(|(i, &w)| (domain.lerp(i as f64 / n as f64), fraction_of(w)))
                .chain(std::iter::once((domain.lerp(1.0), 1.0)))
                .unzip()
        };

        // Pin the ends and guard monotonicity against float noise in the input.
        fractions[0] = 0.0;
        if let Some(last) = fractions.last_mut() {
            *last = 1.0;
        }
        for i in 1..fractions.len() {
            fractions[i] = fractions[i].max(fractions[i - 1]);
        }

        Self {
            domain,
            range,
            times,
            fractions,
        }
    }

    /// The adaptive scale straight from raw timestamps, without smoothing or caching.
    ///
    /// Timestamps outside of `domain` are clamped into the edge bins.
    /// Without timestamps this is a linear scale.
    pub fn from_timestamps(
        timestamps: &[f64],
        domain: TimeDomain,
        range: (f64, f64),
        bin_count: usize,
        tuning: WarpTuning,
    ) -> Self {
        stc_tracing::profile_function!();

        if timestamps.is_empty() || bin_count == 0 {
            return Self::linear(domain, range);
        }

        let counts: Vec<f64> = build_clamped_histogram(timestamps, domain, bin_count)
            .into_iter()
            .map(f64::from)
            .collect();
        let warp_map = build_warp_map(&counts, domain, tuning);

        Self::from_warp_map(&warp_map, domain, range)
    }

    #[inline]
    pub fn domain(&self) -> TimeDomain {
        self.domain
    }

    #[inline]
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Is this a two-point (linear) scale?
    #[inline]
    pub fn is_linear(&self) -> bool {
        self.times.len() == 2
    }

    /// `(time, output)` pairs the scale interpolates between.
    pub fn control_points(&self) -> impl ExactSizeIterator<Item = (f64, f64)> + '_ {
        self.times
            .iter()
            .zip(&self.fractions)
            .map(|(&t, &f)| (t, self.output_from_fraction(f)))
    }

    /// Map a time to its output coordinate.
    pub fn apply(&self, t: f64) -> f64 {
        let segment = segment_index(&self.times, t);
        let (t0, t1) = (self.times[segment], self.times[segment + 1]);
        let (f0, f1) = (self.fractions[segment], self.fractions[segment + 1]);

        let fraction = f0 + (t - t0) / (t1 - t0) * (f1 - f0);
        self.output_from_fraction(fraction)
    }

    /// Map many times at once.
    pub fn apply_many(&self, times: &[f64]) -> Vec<f64> {
        stc_tracing::profile_function!();
        times.iter().map(|&t| self.apply(t)).collect()
    }

    /// Map an output coordinate back to a time, e.g. for brushing.
    ///
    /// Where the scale is flat the earliest matching time is returned.
    pub fn invert(&self, output: f64) -> f64 {
        let (r0, r1) = self.range;
        if r1 == r0 {
            return self.domain.start();
        }

        let fraction = (output - r0) / (r1 - r0);

        // Only segments that actually advance can be inverted.
        let first = self.fractions.partition_point(|&f| f < fraction);
        let segment = first
            .saturating_sub(1)
            .min(self.fractions.len() - 2);

        let (t0, t1) = (self.times[segment], self.times[segment + 1]);
        let (f0, f1) = (self.fractions[segment], self.fractions[segment + 1]);

        if f1 == f0 {
            t0
        } else {
            t0 + (fraction - f0) / (f1 - f0) * (t1 - t0)
        }
    }

    #[inline]
    fn output_from_fraction(&self, fraction: f64) -> f64 {
        let (r0, r1) = self.range;
        r0 + fraction * (r1 - r0)
    }
}

/// Index `i` of the segment `[times[i], times[i + 1]]` to use for `t`, extending the end segments.
#[inline]
fn segment_index(times: &[f64], t: f64) -> usize {
    let upper = times.partition_point(|&x| x <= t);
    upper.saturating_sub(1).min(times.len() - 2)
}
