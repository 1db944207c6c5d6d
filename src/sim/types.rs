//! Per-hour dispatch records and the trace that collects them.

use std::fmt;

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

/// Complete record of one simulated hour. All energies in kWh.
///
/// Load balance: `solar_kwh + wind_kwh + storage_discharge_kwh + gas_kwh +
/// unmet_kwh == load_kwh`. Renewable balance: `solar_available_kwh +
/// wind_available_kwh == solar_kwh + wind_kwh + storage_charge_kwh + curtailed_kwh`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HourRecord {
    /// Hour index within the run.
    pub hour: usize,
    /// Load required this hour.
    pub load_kwh: f64,
    /// Solar energy available (capacity × capacity factor).
    pub solar_available_kwh: f64,
    /// Wind energy available (capacity × capacity factor).
    pub wind_available_kwh: f64,
    /// Solar energy delivered to the load.
    pub solar_kwh: f64,
    /// Wind energy delivered to the load.
    pub wind_kwh: f64,
    /// Renewable energy drawn into storage (before round-trip loss).
    pub storage_charge_kwh: f64,
    /// Stored energy delivered to the load.
    pub storage_discharge_kwh: f64,
    /// Gas-fired energy delivered to the load.
    pub gas_kwh: f64,
    /// Load left unserved this hour.
    pub unmet_kwh: f64,
    /// Renewable energy neither delivered nor stored.
    pub curtailed_kwh: f64,
    /// Stored energy after this hour.
    pub soc_kwh: f64,
}

impl HourRecord {
    pub fn renewable_available_kwh(&self) -> f64 {
        self.solar_available_kwh + self.wind_available_kwh
    }

    /// Load actually served from any source.
    pub fn served_kwh(&self) -> f64 {
        self.load_kwh - self.unmet_kwh
    }
}

impl fmt::Display for HourRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "h={:>5} | load={:>9.1}  solar={:>9.1}  wind={:>9.1}  \
             bat(+{:.1}/-{:.1}, soc={:.1})  gas={:>9.1} | unmet={:.1}  curtailed={:.1}",
            self.hour,
            self.load_kwh,
            self.solar_kwh,
            self.wind_kwh,
            self.storage_charge_kwh,
            self.storage_discharge_kwh,
            self.soc_kwh,
            self.gas_kwh,
            self.unmet_kwh,
            self.curtailed_kwh,
        )
    }
}

/// Read-only output of one dispatch run: one record per hour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchTrace {
    start: NaiveDateTime,
    records: Vec<HourRecord>,
}

impl DispatchTrace {
    pub(crate) fn new(start: NaiveDateTime, records: Vec<HourRecord>) -> Self {
        Self { start, records }
    }

    /// Timestamp of hour 0.
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn records(&self) -> &[HourRecord] {
        &self.records
    }

    /// Number of hours `H`.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HourRecord> {
        self.records.iter()
    }

    pub fn timestamp(&self, hour: usize) -> NaiveDateTime {
        self.start + Duration::hours(hour as i64)
    }
}

impl<'a> IntoIterator for &'a DispatchTrace {
    type Item = &'a HourRecord;
    type IntoIter = std::slice::Iter<'a, HourRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
