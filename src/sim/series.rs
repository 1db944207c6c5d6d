//! Hourly resource and load series, and the provider that aligns raw samples onto them.

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AlignmentError, MissingDataError, SeriesError};

/// Hours in one simulated day.
pub const HOURS_PER_DAY: usize = 24;

/// Hours in a non-leap year, the reference period for annualized costs.
pub const HOURS_PER_YEAR: usize = 8760;

/// Unit of the samples held by an [`HourlySeries`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    /// Fraction of nameplate capacity available, in `[0, 1]`.
    CapacityFactor,
    /// Average power over the hour; numerically equal to kWh per hour.
    Kilowatts,
}

impl Unit {
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::CapacityFactor => "capacity_factor",
            Unit::Kilowatts => "kW",
        }
    }
}

/// Midnight on 2022-01-01, the start used for synthetic profiles.
pub fn default_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2022, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// An ordered sequence of hourly samples starting at `start`.
///
/// # Examples
///
/// ```
/// use hybrid_dc_sim::sim::series::{HourlySeries, Unit, default_start};
///
/// let load = HourlySeries::new(default_start(), Unit::Kilowatts, vec![100.0; 48]);
/// assert_eq!(load.len(), 48);
/// assert_eq!(load.daily_totals(), vec![2400.0, 2400.0]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlySeries {
    /// Timestamp of the first sample (hour-aligned).
    pub start: NaiveDateTime,
    pub unit: Unit,
    pub values: Vec<f64>,
}

impl HourlySeries {
    pub fn new(start: NaiveDateTime, unit: Unit, values: Vec<f64>) -> Self {
        Self {
            start,
            unit,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Timestamp of hour `t`.
    pub fn hour_timestamp(&self, t: usize) -> NaiveDateTime {
        self.start + Duration::hours(t as i64)
    }

    /// Sum of each consecutive 24-hour block; a trailing partial day is included.
    pub fn daily_totals(&self) -> Vec<f64> {
        self.values.chunks(HOURS_PER_DAY).map(|day| day.iter().sum()).collect()
    }

    /// Sum of each complete 24-hour block; a trailing partial day is dropped.
    pub fn full_day_totals(&self) -> Vec<f64> {
        self.values.chunks_exact(HOURS_PER_DAY).map(|day| day.iter().sum()).collect()
    }

    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Largest sample, or 0.0 for an empty series.
    pub fn peak(&self) -> f64 {
        self.values.iter().copied().fold(0.0_f64, f64::max)
    }

    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            0.0
        } else {
            self.total() / self.values.len() as f64
        }
    }
}

/// Solar capacity factor, wind capacity factor and load on one common hourly index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSeries {
    pub solar_cf: HourlySeries,
    pub wind_cf: HourlySeries,
    /// Data-center load (kW).
    pub load: HourlySeries,
}

impl ResourceSeries {
    /// Bundles three series after checking units, start and length agree.
    ///
    /// # Errors
    ///
    /// Returns an `AlignmentError` if any series is empty, has the wrong unit,
    /// or does not share the load series' start and length.
    pub fn new(
        solar_cf: HourlySeries,
        wind_cf: HourlySeries,
        load: HourlySeries,
    ) -> Result<Self, AlignmentError> {
        check_unit("solar", &solar_cf, Unit::CapacityFactor)?;
        check_unit("wind", &wind_cf, Unit::CapacityFactor)?;
        check_unit("load", &load, Unit::Kilowatts)?;
        if load.is_empty() {
            return Err(AlignmentError::Empty {
                name: "load".into(),
            });
        }
        for (name, s) in [("solar", &solar_cf), ("wind", &wind_cf)] {
            if s.start != load.start || s.len() != load.len() {
                return Err(AlignmentError::Mismatch {
                    name: name.into(),
                    start: s.start.to_string(),
                    len: s.len(),
                    expected_start: load.start.to_string(),
                    expected_len: load.len(),
                });
            }
        }
        Ok(Self {
            solar_cf,
            wind_cf,
            load,
        })
    }

    /// Builds aligned series from plain vectors sharing `start`.
    ///
    /// # Errors
    ///
    /// Returns an `AlignmentError` if the vector lengths differ or are empty.
    pub fn from_values(
        start: NaiveDateTime,
        solar_cf: Vec<f64>,
        wind_cf: Vec<f64>,
        load_kw: Vec<f64>,
    ) -> Result<Self, AlignmentError> {
        Self::new(
            HourlySeries::new(start, Unit::CapacityFactor, solar_cf),
            HourlySeries::new(start, Unit::CapacityFactor, wind_cf),
            HourlySeries::new(start, Unit::Kilowatts, load_kw),
        )
    }

    /// Number of simulated hours `H`.
    pub fn hours(&self) -> usize {
        self.load.len()
    }

    pub fn start(&self) -> NaiveDateTime {
        self.load.start
    }
}

fn check_unit(name: &str, s: &HourlySeries, expected: Unit) -> Result<(), AlignmentError> {
    if s.unit == expected {
        Ok(())
    } else {
        Err(AlignmentError::Unit {
            name: name.into(),
            found: s.unit.as_str(),
            expected: expected.as_str(),
        })
    }
}

/// One raw reading; `None` marks a missing value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp: NaiveDateTime,
    pub value: Option<f64>,
}

/// Raw, possibly gappy samples of a single quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSeries {
    pub name: String,
    pub unit: Unit,
    pub samples: Vec<Sample>,
}

impl RawSeries {
    pub fn new(name: impl Into<String>, unit: Unit, samples: Vec<Sample>) -> Self {
        Self {
            name: name.into(),
            unit,
            samples,
        }
    }
}

/// How the provider treats gaps and misaligned series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResamplePolicy {
    /// No resampling: series must already share start and length, with no gaps.
    Strict,
    /// Trim to the common overlap and fill interior gaps of up to
    /// `max_gap_hours` consecutive hours by linear interpolation.
    LinearInterpolation { max_gap_hours: usize },
}

/// Normalizes raw samples into aligned [`HourlySeries`].
#[derive(Debug, Clone, Copy)]
pub struct SeriesProvider {
    policy: ResamplePolicy,
}

/// A raw series placed on an hourly grid starting at its first sample.
struct Grid<'a> {
    name: &'a str,
    unit: Unit,
    start: NaiveDateTime,
    slots: Vec<Option<f64>>,
}

impl SeriesProvider {
    pub fn new(policy: ResamplePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ResamplePolicy {
        self.policy
    }

    /// Aligns every raw series onto one hourly index.
    ///
    /// # Errors
    ///
    /// Returns `SeriesError::Alignment` for unordered, off-hour or
    /// non-overlapping input (and, under [`ResamplePolicy::Strict`], for any
    /// start or length disagreement), and `SeriesError::MissingData` for gaps
    /// beyond the policy's tolerance.
    pub fn align(&self, raw: &[RawSeries]) -> Result<Vec<HourlySeries>, SeriesError> {
        debug!(policy = ?self.policy, n_series = raw.len(), "Aligning series");
        let grids = raw.iter().map(to_grid).collect::<Result<Vec<_>, _>>()?;
        let Some(first) = grids.first() else {
            return Ok(Vec::new());
        };

        match self.policy {
            ResamplePolicy::Strict => {
                for g in &grids[1..] {
                    if g.start != first.start || g.slots.len() != first.slots.len() {
                        return Err(AlignmentError::Mismatch {
                            name: g.name.to_string(),
                            start: g.start.to_string(),
                            len: g.slots.len(),
                            expected_start: first.start.to_string(),
                            expected_len: first.slots.len(),
                        }
                        .into());
                    }
                }
                grids.iter().map(|g| fill(g, &g.slots, g.start, 0)).collect()
            }
            ResamplePolicy::LinearInterpolation { max_gap_hours } => {
                let start = grids.iter().map(|g| g.start).max().unwrap_or(first.start);
                let end = grids
                    .iter()
                    .map(|g| g.start + Duration::hours(g.slots.len() as i64 - 1))
                    .min()
                    .unwrap_or(first.start);
                if start > end {
                    return Err(AlignmentError::NoOverlap.into());
                }
                let len = (end - start).num_hours() as usize + 1;
                grids
                    .iter()
                    .map(|g| {
                        let offset = (start - g.start).num_hours() as usize;
                        fill(g, &g.slots[offset..offset + len], start, max_gap_hours)
                    })
                    .collect()
            }
        }
    }

    /// Aligns raw solar CF, wind CF and load into a [`ResourceSeries`].
    ///
    /// # Errors
    ///
    /// See [`SeriesProvider::align`]; unit mismatches are alignment errors.
    pub fn resource_series(
        &self,
        solar: &RawSeries,
        wind: &RawSeries,
        load: &RawSeries,
    ) -> Result<ResourceSeries, SeriesError> {
        let mut aligned = self
            .align(&[solar.clone(), wind.clone(), load.clone()])?
            .into_iter();
        match (aligned.next(), aligned.next(), aligned.next()) {
            (Some(s), Some(w), Some(l)) => Ok(ResourceSeries::new(s, w, l)?),
            _ => Err(AlignmentError::NoOverlap.into()),
        }
    }
}

fn to_grid(raw: &RawSeries) -> Result<Grid<'_>, AlignmentError> {
    let first = raw.samples.first().ok_or_else(|| AlignmentError::Empty {
        name: raw.name.clone(),
    })?;
    let start = first.timestamp;

    let mut slots: Vec<Option<f64>> = Vec::new();
    let mut prev: Option<NaiveDateTime> = None;
    for (index, s) in raw.samples.iter().enumerate() {
        let ts = s.timestamp;
        if ts.minute() != 0 || ts.second() != 0 || ts.nanosecond() != 0 {
            return Err(AlignmentError::OffHour {
                name: raw.name.clone(),
                index,
            });
        }
        if prev.is_some_and(|p| ts <= p) {
            return Err(AlignmentError::Unordered {
                name: raw.name.clone(),
                index,
            });
        }
        prev = Some(ts);

        let hour = (ts - start).num_hours() as usize;
        slots.resize(hour + 1, None);
        slots[hour] = s.value.filter(|v| v.is_finite());
    }

    Ok(Grid {
        name: &raw.name,
        unit: raw.unit,
        start,
        slots,
    })
}

/// Fills gaps of at most `tolerance` hours by linear interpolation.
fn fill(
    grid: &Grid<'_>,
    slots: &[Option<f64>],
    start: NaiveDateTime,
    tolerance: usize,
) -> Result<HourlySeries, SeriesError> {
    let mut values = Vec::with_capacity(slots.len());
    let mut i = 0;
    while i < slots.len() {
        if let Some(v) = slots[i] {
            values.push(v);
            i += 1;
            continue;
        }

        let gap_start = i;
        while i < slots.len() && slots[i].is_none() {
            i += 1;
        }
        let gap_hours = i - gap_start;
        let missing = || MissingDataError {
            name: grid.name.to_string(),
            first_missing_hour: gap_start,
            gap_hours,
            tolerance_hours: tolerance,
        };

        // Edge gaps have no bracketing sample to interpolate from.
        let (Some(before), Some(Some(after))) = (values.last().copied(), slots.get(i).copied())
        else {
            return Err(missing().into());
        };
        if gap_hours > tolerance {
            return Err(missing().into());
        }

        let step = (after - before) / (gap_hours + 1) as f64;
        for k in 1..=gap_hours {
            values.push(before + step * k as f64);
        }
    }

    Ok(HourlySeries::new(start, grid.unit, values))
}
