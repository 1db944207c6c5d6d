//! Error taxonomy shared by the series provider, mix validation, dispatch and sweeps.
//!
//! Unmet load and curtailment are normal dispatch outcomes and never appear here.

use thiserror::Error;

/// Input series that cannot be placed on a common hourly index.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlignmentError {
    #[error("series \"{name}\" has no samples")]
    Empty { name: String },

    #[error("series \"{name}\" is not strictly increasing at sample {index}")]
    Unordered { name: String, index: usize },

    #[error("series \"{name}\" sample {index} is not on a whole hour")]
    OffHour { name: String, index: usize },

    #[error(
        "series \"{name}\" spans {len} hours from {start}, expected {expected_len} hours from {expected_start}"
    )]
    Mismatch {
        name: String,
        start: String,
        len: usize,
        expected_start: String,
        expected_len: usize,
    },

    #[error("series have no overlapping hours")]
    NoOverlap,

    #[error("series \"{name}\" has unit {found}, expected {expected}")]
    Unit {
        name: String,
        found: &'static str,
        expected: &'static str,
    },
}

/// A gap in an input series larger than the configured tolerance.
#[derive(Debug, Clone, PartialEq, Error)]
#[error(
    "series \"{name}\" is missing {gap_hours} consecutive hour(s) starting at hour {first_missing_hour} (tolerance {tolerance_hours})"
)]
pub struct MissingDataError {
    pub name: String,
    pub first_missing_hour: usize,
    pub gap_hours: usize,
    pub tolerance_hours: usize,
}

/// Failure of the resource series provider.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error(transparent)]
    Alignment(#[from] AlignmentError),
    #[error(transparent)]
    MissingData(#[from] MissingDataError),
}

/// A capacity mix that violates its construction constraints.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid configuration: {field} {message}")]
pub struct InvalidConfigurationError {
    /// Name of the offending field (e.g. `"storage_power_kw"`).
    pub field: &'static str,
    pub message: String,
}

impl InvalidConfigurationError {
    pub(crate) fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Structural failure that prevents a dispatch run from starting.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("series length mismatch: solar={solar}, wind={wind}, load={load}")]
    LengthMismatch {
        solar: usize,
        wind: usize,
        load: usize,
    },

    #[error("series are empty")]
    EmptySeries,

    #[error("{series} value {value} at hour {hour} is outside its valid range")]
    InvalidInput {
        series: &'static str,
        hour: usize,
        value: f64,
    },

    #[error("initial state of charge {soc_kwh} kWh is outside [0, {capacity_kwh}] kWh")]
    InitialCharge { soc_kwh: f64, capacity_kwh: f64 },
}

/// No candidate of a sweep satisfied the reliability constraint.
///
/// Reported alongside the sweep's partial results rather than aborting it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error(
    "none of {evaluated} evaluated candidate(s) met loss-of-load probability <= {max_lolp} (best {best_lolp:?})"
)]
pub struct InfeasibleError {
    pub evaluated: usize,
    pub max_lolp: f64,
    pub best_lolp: Option<f64>,
}

/// Why a single sweep candidate could not be evaluated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    #[error(transparent)]
    Configuration(#[from] InvalidConfigurationError),
    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

/// A series file that could not be read or parsed.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("cannot read \"{path}\": {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("\"{path}\": {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("\"{path}\" line {line}: {message}")]
    Parse {
        path: String,
        line: u64,
        message: String,
    },
}

/// Failure to assemble the resource series for a scenario.
#[derive(Debug, Error)]
pub enum InputError {
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Series(#[from] SeriesError),

    #[error(transparent)]
    Alignment(#[from] AlignmentError),
}
