use std::ops::RangeInclusive;

/// Bin counts accepted at the outer boundary (HTTP, settings).
pub const BIN_COUNT_RANGE: RangeInclusive<usize> = 64..=4096;

/// Kernel half-widths accepted at the outer boundary (HTTP, settings).
pub const KERNEL_WIDTH_RANGE: RangeInclusive<usize> = 0..=25;

pub const DEFAULT_BIN_COUNT: usize = 1024;

pub const DEFAULT_KERNEL_WIDTH: usize = 2;

/// How much more space the densest bin gets compared to an empty one, minus one.
///
/// With `5.0` the densest bin is weighted 6× an empty bin.
pub const DEFAULT_AMPLIFICATION: f64 = 5.0;

/// Resolution of a density/warp computation.
///
/// Two computations with the same config over the same timestamps give identical maps,
/// which is what makes the config usable as a cache key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Number of equal-width bins the domain is cut into.
    pub bin_count: usize,

    /// Half-width of the moving-average kernel. `0` and `1` mean no smoothing.
    pub kernel_width: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bin_count: DEFAULT_BIN_COUNT,
            kernel_width: DEFAULT_KERNEL_WIDTH,
        }
    }
}

impl EngineConfig {
    #[inline]
    pub fn new(bin_count: usize, kernel_width: usize) -> Self {
        Self {
            bin_count,
            kernel_width,
        }
    }

    /// Clamp user-provided values into [`BIN_COUNT_RANGE`] and [`KERNEL_WIDTH_RANGE`].
    pub fn clamped(bin_count: usize, kernel_width: usize) -> Self {
        Self {
            bin_count: bin_count.clamp(*BIN_COUNT_RANGE.start(), *BIN_COUNT_RANGE.end()),
            kernel_width: kernel_width
                .clamp(*KERNEL_WIDTH_RANGE.start(), *KERNEL_WIDTH_RANGE.end()),
        }
    }

    /// Like [`Self::clamped`], but from loosely-typed numbers (e.g. query parameters).
    ///
    /// Non-finite values fall back to the defaults, finite ones are floored and then clamped.
    pub fn clamped_from_f64(bin_count: f64, kernel_width: f64) -> Self {
        fn floor_or(value: f64, default: usize) -> usize {
            if value.is_finite() {
                // Saturating cast: negatives become 0, huge values become usize::MAX.
                value.floor() as usize
            } else {
                default
            }
        }

        let defaults = Self::default();
        Self::clamped(
            floor_or(bin_count, defaults.bin_count),
            floor_or(kernel_width, defaults.kernel_width),
        )
    }

    /// The engine never trusts its inputs fully: at least one bin.
    #[inline]
    pub fn sanitized(self) -> Self {
        Self {
            bin_count: self.bin_count.max(1),
            kernel_width: self.kernel_width,
        }
    }
}

impl std::fmt::Display for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bins={} kernel={}", self.bin_count, self.kernel_width)
    }
}

/// Tunables of the warp weighting.
#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct WarpTuning {
    /// A bin with normalized density `d` is weighted `1 + d * amplification`.
    pub amplification: f64,
}

impl Default for WarpTuning {
    fn default() -> Self {
        Self {
            amplification: DEFAULT_AMPLIFICATION,
        }
    }
}

impl WarpTuning {
    /// Negative or non-finite amplification would break monotonicity, so it becomes `0`.
    #[inline]
    pub fn sanitized(self) -> Self {
        let amplification = if self.amplification.is_finite() {
            self.amplification.max(0.0)
        } else {
            0.0
        };
        Self { amplification }
    }
}
