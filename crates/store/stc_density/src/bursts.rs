use itertools::Itertools as _;

use crate::{AdaptiveMaps, TimeDomain};

/// How many windows [`burst_windows`] returns by default.
pub const DEFAULT_MAX_BURST_WINDOWS: usize = 10;

/// Which per-bin signal drives burst highlighting.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize,
)]
#[serde(rename_all = "camelCase")]
pub enum BurstMetric {
    /// Many events per unit of time.
    #[default]
    Density,

    /// Irregular inter-arrival gaps, independent of how many events there are.
    Burstiness,
}

impl BurstMetric {
    /// The map this metric reads from.
    #[inline]
    pub fn select(self, maps: &AdaptiveMaps) -> &[f64] {
        match self {
            Self::Density => &maps.density_map,
            Self::Burstiness => &maps.burstiness_map,
        }
    }
}

/// The value at fraction `p` of the ascending-sorted values (nearest-rank, rounding down).
///
/// `p` is clamped to `[0, 1]`. An empty input gives `1.0`, i.e. nothing counts as a burst.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 1.0;
    }

    let sorted = values.iter().copied().sorted_unstable_by(f64::total_cmp).collect_vec();
    let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
    let index = ((p * (sorted.len() - 1) as f64).floor() as usize).min(sorted.len() - 1);
    sorted[index]
}

/// A contiguous run of bins at or above the burst cutoff.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BurstWindow {
    /// First bin of the run.
    pub first_bin: usize,

    /// One past the last bin of the run.
    pub end_bin: usize,

    /// Start of the window, in domain units.
    pub start: f64,

    /// End of the window, in domain units.
    pub end: f64,

    /// Largest map value inside the window.
    pub peak: f64,
}

impl BurstWindow {
    /// Stable identifier, e.g. for UI keys.
    pub fn id(&self) -> String {
        format!("{}-{}", self.first_bin, self.end_bin)
    }

    #[inline]
    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t <= self.end
    }
}

/// Find runs of bins whose value is `>= cutoff`, strongest first, at most `limit` of them.
///
/// Bin `i` is placed at `start + i * span / (len - 1)`, so a run's window goes from its
/// first bin to the first bin after it; a run that reaches the last bin ends at the domain end.
pub fn burst_windows(
    map: &[f64],
    domain: TimeDomain,
    cutoff: f64,
    limit: usize,
) -> Vec<BurstWindow> {
    stc_tracing::profile_function!();

    if map.is_empty() {
        return Vec::new();
    }

    let step = domain.span() / (map.len().saturating_sub(1).max(1)) as f64;
    let position = |i: usize| domain.start() + i as f64 * step;

    let mut windows = Vec::new();
    let mut current: Option<(usize, f64)> = None;

    for (i, &value) in map.iter().enumerate() {
        if value >= cutoff {
            let (_, peak) = current.get_or_insert((i, value));
            *peak = peak.max(value);
        } else if let Some((first_bin, peak)) = current.take() {
            windows.push(BurstWindow {
                first_bin,
                end_bin: i,
                start: position(first_bin),
                end: position(i),
                peak,
            });
        }
    }

    if let Some((first_bin, peak)) = current {
        windows.push(BurstWindow {
            first_bin,
            end_bin: map.len(),
            start: position(first_bin),
            end: domain.end().max(position(first_bin)),
            peak,
        });
    }

    windows.sort_by(|a, b| b.peak.total_cmp(&a.peak));
    windows.truncate(limit);
    windows
}
