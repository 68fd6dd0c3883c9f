//! End-to-end properties of the density/burstiness/warp pipeline.

use rand::rngs::SmallRng;
use rand::{Rng as _, SeedableRng as _};
use similar_asserts::assert_eq;
use stc_density::{
    AdaptiveMaps, EngineConfig, TimeDomain, WarpTuning, build_histogram, compute_adaptive_maps,
    compute_adaptive_maps_presorted, smooth_histogram,
};

fn compute(timestamps: &[f64], domain: TimeDomain, config: EngineConfig) -> AdaptiveMaps {
    compute_adaptive_maps(timestamps, domain, config, WarpTuning::default())
}

#[track_caller]
fn assert_invariants(maps: &AdaptiveMaps, domain: TimeDomain, bin_count: usize) {
    assert_eq!(maps.density_map.len(), bin_count);
    assert_eq!(maps.burstiness_map.len(), bin_count);
    assert_eq!(maps.warp_map.len(), bin_count);

    let max_density = maps.density_map.iter().copied().fold(0.0, f64::max);
    assert!(max_density == 0.0 || max_density == 1.0, "max density {max_density}");
    assert!(maps.density_map.iter().all(|&d| (0.0..=1.0).contains(&d)));

    assert!(maps.burstiness_map.iter().all(|&b| (0.0..=1.0).contains(&b)));

    assert_eq!(maps.warp_map[0], domain.start());
    assert!(maps.warp_map.windows(2).all(|w| w[0] <= w[1]), "warp map not monotonic");
    assert!(maps.warp_map.iter().all(|&w| w <= domain.end()));
}

#[test]
fn concentrated_events_histogram() {
    let domain = TimeDomain::new(0.0, 100.0);
    let timestamps = [10.0, 10.0, 10.0, 90.0];

    assert_eq!(build_histogram(&timestamps, domain, 4), vec![3, 0, 0, 1]);

    let maps = compute(&timestamps, domain, EngineConfig::new(4, 0));
    assert_eq!(maps.density_map, vec![1.0, 0.0, 0.0, 1.0 / 3.0]);
    assert_invariants(&maps, domain, 4);
}

#[test]
fn empty_series_gives_linear_warp() {
    let domain = TimeDomain::new(0.0, 100.0);
    let maps = compute(&[], domain, EngineConfig::new(8, 3));

    assert_eq!(maps.density_map, vec![0.0; 8]);
    assert_eq!(maps.burstiness_map, vec![0.0; 8]);

    let expected: Vec<f64> = (0..8).map(|i| (i as f64 / 7.0) * 100.0).collect();
    assert_eq!(maps.warp_map, expected);
    assert_eq!(maps.warp_map[7], 100.0);
    assert!((maps.warp_map[1] - 14.2857).abs() < 1e-3);
    assert_invariants(&maps, domain, 8);
}

#[test]
fn zero_kernel_leaves_histogram_unchanged() {
    let mut rng = SmallRng::seed_from_u64(3);
    let counts: Vec<u32> = (0..64).map(|_| rng.random_range(0..50)).collect();
    let as_f64: Vec<f64> = counts.iter().map(|&c| f64::from(c)).collect();
    assert_eq!(smooth_histogram(&counts, 0), as_f64);
}

#[test]
fn duplicate_timestamps_are_not_bursty() {
    let domain = TimeDomain::new(0.0, 100.0);
    let maps = compute(&[42.0, 42.0], domain, EngineConfig::new(4, 0));
    assert_eq!(maps.burstiness_map, vec![0.0; 4]);
    assert!(maps.burstiness_map.iter().all(|b| !b.is_nan()));
}

#[test]
fn out_of_domain_timestamps_are_ignored() {
    let domain = TimeDomain::new(0.0, 100.0);
    let maps = compute(&[-10.0, 150.0, f64::NAN], domain, EngineConfig::new(4, 0));
    assert_eq!(maps.density_map, vec![0.0; 4]);
    // Data exists but none of it is in view: every bin is weighted equally.
    assert_eq!(maps.warp_map, vec![0.0, 25.0, 50.0, 75.0]);
    assert_invariants(&maps, domain, 4);
}

#[test]
fn degenerate_domain_does_not_divide_by_zero() {
    let domain = TimeDomain::new(5.0, 5.0);
    let maps = compute(&[5.0, 5.0, 5.0], domain, EngineConfig::new(16, 2));
    assert_eq!(maps.bin_count(), 16);
    assert!(maps.density_map.iter().all(|d| d.is_finite()));
    assert!(maps.burstiness_map.iter().all(|b| b.is_finite()));
    assert_eq!(maps.warp_map[0], 5.0);
    assert!(maps.warp_map.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn zero_bins_is_clamped_to_one() {
    let domain = TimeDomain::new(0.0, 10.0);
    let maps = compute(&[1.0, 2.0], domain, EngineConfig::new(0, 0));
    assert_eq!(maps.bin_count(), 1);
    assert_eq!(maps.warp_map, vec![0.0]);
}

#[test]
fn dense_period_gets_more_warped_space() {
    let domain = TimeDomain::new(0.0, 1000.0);
    let mut timestamps: Vec<f64> = (0..500).map(|i| 100.0 + i as f64 * 0.2).collect(); // [100, 200)
    timestamps.extend((0..10).map(|i| 500.0 + i as f64 * 50.0));

    let maps = compute(&timestamps, domain, EngineConfig::new(100, 2));
    assert_invariants(&maps, domain, 100);

    // Bins 10..20 cover the dense period: linearly 10% of the axis, warped much more.
    let warped_share = (maps.warp_map[20] - maps.warp_map[10]) / domain.span();
    assert!(warped_share > 0.3, "warped share {warped_share}");
}

#[test]
fn pipeline_is_deterministic_and_order_independent() {
    let domain = TimeDomain::new(0.0, 1.0);
    let mut rng = SmallRng::seed_from_u64(1234);
    let mut timestamps: Vec<f64> = (0..5_000).map(|_| rng.random::<f64>().powi(3)).collect();
    let config = EngineConfig::new(256, 4);

    let first = compute(&timestamps, domain, config);
    let second = compute(&timestamps, domain, config);
    assert_eq!(first, second);

    timestamps.sort_by(f64::total_cmp);
    let presorted =
        compute_adaptive_maps_presorted(&timestamps, domain, config, WarpTuning::default());
    assert_eq!(first, presorted);

    timestamps.reverse();
    assert_eq!(first, compute(&timestamps, domain, config));
}

#[test]
fn invariants_hold_for_random_inputs() {
    let mut rng = SmallRng::seed_from_u64(0xdead_beef);

    for _ in 0..50 {
        // Integral bounds keep `end - start` exact.
        let start = f64::from(rng.random_range(-1_000_000..1_000_000));
        let span = f64::from(rng.random_range(1..100_000));
        let domain = TimeDomain::new(start, start + span);

        let n = rng.random_range(0..2_000);
        let timestamps: Vec<f64> = (0..n)
            .map(|_| start + rng.random_range(-0.1..1.1) * span)
            .collect();

        let config = EngineConfig::new(rng.random_range(1..600), rng.random_range(0..26));
        let maps = compute(&timestamps, domain, config);
        assert_invariants(&maps, domain, config.bin_count);
    }
}
