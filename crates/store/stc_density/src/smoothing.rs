/// Moving average with a half-width of `kernel_width` bins.
///
/// Near the edges the window is truncated (not padded or wrapped), so edge bins are
/// averaged over fewer neighbors instead of being pulled towards zero.
/// A `kernel_width` of `0` or `1` leaves the histogram as-is.
pub fn smooth_histogram(counts: &[u32], kernel_width: usize) -> Vec<f64> {
    stc_tracing::profile_function!();

    if kernel_width <= 1 {
        return counts.iter().map(|&c| f64::from(c)).collect();
    }

    let n = counts.len();
    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(kernel_width);
            let hi = (i + kernel_width).min(n - 1);
            let window = &counts[lo..=hi];
            let sum: f64 = window.iter().map(|&c| f64::from(c)).sum();
            sum / window.len() as f64
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_kernels_are_noop() {
        let counts = [3, 0, 7, 1];
        let expected = vec![3.0, 0.0, 7.0, 1.0];
        assert_eq!(smooth_histogram(&counts, 0), expected);
        assert_eq!(smooth_histogram(&counts, 1), expected);
    }

    #[test]
    fn edges_use_truncated_window() {
        // kernel 2 over 5 bins:
        // bin 0 averages [0..=2], bin 2 averages [0..=4], bin 4 averages [2..=4]
        let smoothed = smooth_histogram(&[6, 0, 0, 0, 3], 2);
        assert_eq!(smoothed[0], 2.0);
        assert_eq!(smoothed[2], 9.0 / 5.0);
        assert_eq!(smoothed[4], 1.0);
    }

    #[test]
    fn preserves_length_and_empty() {
        assert!(smooth_histogram(&[], 5).is_empty());
        assert_eq!(smooth_histogram(&[1; 10], 25), vec![1.0; 10]);
    }
}
