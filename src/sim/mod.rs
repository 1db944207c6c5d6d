/// Bounded hour counter for dispatch runs.
pub mod clock;
pub mod engine;
/// Financing, fuel cost and reference-plant helpers.
pub mod finance;
pub mod metrics;
pub mod mix;
/// Hourly series and the resource series provider.
pub mod series;
pub mod storage;
/// Parallel capacity sweeps.
pub mod sweep;
pub mod types;
