/// The span we fall back to when a domain is empty or not finite.
pub const MIN_DOMAIN_SPAN: f64 = 1.0;

/// Raw epoch values at or above this magnitude are assumed to be milliseconds.
const EPOCH_MS_THRESHOLD: f64 = 1e11;

/// The time interval that bins, warp maps and scales are defined over.
///
/// The bounds are always ordered (`start <= end`), whatever order they were given in.
/// A degenerate domain (`start == end`) is allowed: all binning math then uses
/// [`MIN_DOMAIN_SPAN`] instead of a zero span.
#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct TimeDomain {
    start: f64,
    end: f64,
}

impl TimeDomain {
    /// Orders the bounds. Non-finite bounds are replaced so the domain stays usable.
    pub fn new(a: f64, b: f64) -> Self {
        let (a, b) = match (a.is_finite(), b.is_finite()) {
            (true, true) => (a, b),
            (true, false) => (a, a),
            (false, true) => (b, b),
            (false, false) => (0.0, 0.0),
        };

        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// The smallest domain containing every finite timestamp, or `None` if there are none.
    pub fn from_timestamps(timestamps: &[f64]) -> Option<Self> {
        let (min, max) = timestamps
            .iter()
            .copied()
            .filter(|t| t.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), t| {
                (min.min(t), max.max(t))
            });
        (min <= max).then(|| Self::new(min, max))
    }

    #[inline]
    pub fn start(&self) -> f64 {
        self.start
    }

    #[inline]
    pub fn end(&self) -> f64 {
        self.end
    }

    /// `end - start`, or [`MIN_DOMAIN_SPAN`] if that is zero.
    #[inline]
    pub fn span(&self) -> f64 {
        let span = self.end - self.start;
        if span > 0.0 && span.is_finite() {
            span
        } else {
            MIN_DOMAIN_SPAN
        }
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }

    /// Where `t` lies in the domain: `0.0` at `start`, `1.0` at `start + span`.
    ///
    /// Not clamped.
    #[inline]
    pub fn normalized_position(&self, t: f64) -> f64 {
        (t - self.start) / self.span()
    }

    /// Inverse of [`Self::normalized_position`].
    #[inline]
    pub fn lerp(&self, t01: f64) -> f64 {
        self.start + t01 * self.span()
    }

    /// The bin `t` falls into when the domain is cut into `bin_count` equal bins.
    ///
    /// Timestamps outside of the domain give `None`.
    /// A timestamp exactly at the end of the domain lands in the last bin.
    #[inline]
    pub fn bin_index(&self, t: f64, bin_count: usize) -> Option<usize> {
        if bin_count == 0 {
            return None;
        }

        let norm = self.normalized_position(t);
        if !(0.0..=1.0).contains(&norm) {
            return None; // also rejects NaN
        }

        let idx = (norm * bin_count as f64).floor() as usize;
        Some(idx.min(bin_count - 1))
    }
}

impl Default for TimeDomain {
    /// The normalized `[0, 100]` domain the cube uses for its vertical axis.
    fn default() -> Self {
        Self::new(0.0, 100.0)
    }
}

impl From<[f64; 2]> for TimeDomain {
    #[inline]
    fn from([a, b]: [f64; 2]) -> Self {
        Self::new(a, b)
    }
}

impl From<(f64, f64)> for TimeDomain {
    #[inline]
    fn from((a, b): (f64, f64)) -> Self {
        Self::new(a, b)
    }
}

impl From<TimeDomain> for [f64; 2] {
    #[inline]
    fn from(domain: TimeDomain) -> Self {
        [domain.start, domain.end]
    }
}

impl std::fmt::Display for TimeDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Raw epoch values may come in seconds or milliseconds; this always gives seconds.
#[inline]
pub fn to_epoch_seconds(value: f64) -> f64 {
    if value.abs() >= EPOCH_MS_THRESHOLD {
        value / 1000.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_ordered() {
        let domain = TimeDomain::new(100.0, 0.0);
        assert_eq!(domain.start(), 0.0);
        assert_eq!(domain.end(), 100.0);
        assert_eq!(domain.span(), 100.0);
    }

    #[test]
    fn degenerate_domain_uses_min_span() {
        let domain = TimeDomain::new(42.0, 42.0);
        assert!(domain.is_degenerate());
        assert_eq!(domain.span(), MIN_DOMAIN_SPAN);
        assert_eq!(domain.bin_index(42.0, 10), Some(0));
    }

    #[test]
    fn non_finite_bounds_are_replaced() {
        let domain = TimeDomain::new(f64::NAN, 5.0);
        assert_eq!((domain.start(), domain.end()), (5.0, 5.0));

        let domain = TimeDomain::new(f64::NEG_INFINITY, f64::INFINITY);
        assert_eq!((domain.start(), domain.end()), (0.0, 0.0));
        assert_eq!(domain.span(), MIN_DOMAIN_SPAN);
    }

    #[test]
    fn bin_index_edges() {
        let domain = TimeDomain::new(0.0, 100.0);
        assert_eq!(domain.bin_index(0.0, 4), Some(0));
        assert_eq!(domain.bin_index(24.999, 4), Some(0));
        assert_eq!(domain.bin_index(25.0, 4), Some(1));
        assert_eq!(domain.bin_index(100.0, 4), Some(3));
        assert_eq!(domain.bin_index(100.1, 4), None);
        assert_eq!(domain.bin_index(-0.1, 4), None);
        assert_eq!(domain.bin_index(f64::NAN, 4), None);
        assert_eq!(domain.bin_index(50.0, 0), None);
    }

    #[test]
    fn from_timestamps_ignores_non_finite() {
        let domain = TimeDomain::from_timestamps(&[5.0, f64::NAN, -3.0, 9.0]).unwrap();
        assert_eq!(domain, TimeDomain::new(-3.0, 9.0));
        assert_eq!(TimeDomain::from_timestamps(&[]), None);
        assert_eq!(TimeDomain::from_timestamps(&[f64::NAN]), None);
    }

    #[test]
    fn serializes_as_pair() {
        let json = serde_json::to_string(&TimeDomain::new(1.0, 2.5)).unwrap();
        assert_eq!(json, "[1.0,2.5]");
        let back: TimeDomain = serde_json::from_str("[9.0,3.0]").unwrap();
        assert_eq!(back, TimeDomain::new(3.0, 9.0));
    }

    #[test]
    fn epoch_units() {
        assert_eq!(to_epoch_seconds(1_700_000_000.0), 1_700_000_000.0);
        assert_eq!(to_epoch_seconds(1_700_000_000_000.0), 1_700_000_000.0);
    }
}
