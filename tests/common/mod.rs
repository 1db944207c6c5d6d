//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use hybrid_dc_sim::config::ScenarioConfig;
use hybrid_dc_sim::sim::mix::CapacityMix;
use hybrid_dc_sim::sim::series::{ResourceSeries, default_start};

/// Absolute tolerance for accumulated floating-point energy sums.
pub const EPS: f64 = 1e-9;

/// Series sharing the default start from plain vectors.
pub fn series(solar_cf: Vec<f64>, wind_cf: Vec<f64>, load_kw: Vec<f64>) -> ResourceSeries {
    ResourceSeries::from_values(default_start(), solar_cf, wind_cf, load_kw)
        .unwrap_or_else(|e| panic!("fixture series should align: {e}"))
}

/// One day of 100 kW load with full sun from hour 6 through hour 18 and no wind.
pub fn sunny_day() -> ResourceSeries {
    let solar = (0..24)
        .map(|h| if (6..=18).contains(&h) { 1.0 } else { 0.0 })
        .collect();
    series(solar, vec![0.0; 24], vec![100.0; 24])
}

/// A mix with default costs and unconstrained storage power.
pub fn mix(solar_kw: f64, wind_kw: f64, storage_kwh: f64, rte: f64, gas_kw: f64) -> CapacityMix {
    CapacityMix::builder()
        .solar_kw(solar_kw)
        .wind_kw(wind_kw)
        .storage(storage_kwh, None, rte)
        .gas_kw(gas_kw)
        .build()
        .unwrap_or_else(|e| panic!("fixture mix should be valid: {e}"))
}

/// One synthetic week from the baseline preset.
pub fn synthetic_week(seed: u64) -> ResourceSeries {
    let mut cfg = ScenarioConfig::baseline();
    cfg.simulation.hours = 24 * 7;
    cfg.simulation.seed = seed;
    cfg.synthetic_series()
        .unwrap_or_else(|e| panic!("synthetic series should build: {e}"))
}

pub fn assert_close(actual: f64, expected: f64, what: &str) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "{what}: expected {expected}, got {actual}"
    );
}
