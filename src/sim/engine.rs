//! Hourly dispatch engine: renewables first, then storage, then gas.

use tracing::debug;

use super::clock::HourClock;
use super::mix::CapacityMix;
use super::series::ResourceSeries;
use super::storage::StorageState;
use super::types::{DispatchTrace, HourRecord};
use crate::error::SimulationError;

/// Simulation engine for one resource series and one capacity mix.
///
/// Owns the run's [`StorageState`]; the series and mix are borrowed
/// read-only, so many engines can share them across threads.
#[derive(Debug)]
pub struct DispatchEngine<'a> {
    series: &'a ResourceSeries,
    mix: &'a CapacityMix,
    storage: StorageState,
}

impl<'a> DispatchEngine<'a> {
    /// Creates an engine whose storage starts empty.
    ///
    /// # Errors
    ///
    /// Returns a `SimulationError` if the series are empty or disagree in
    /// length, if any load is negative or non-finite, or if any capacity
    /// factor lies outside `[0, 1]`.
    pub fn new(series: &'a ResourceSeries, mix: &'a CapacityMix) -> Result<Self, SimulationError> {
        Self::seeded(series, mix, 0.0)
    }

    /// Creates an engine whose storage starts holding `initial_soc_kwh`.
    ///
    /// # Errors
    ///
    /// As [`DispatchEngine::new`], plus `SimulationError::InitialCharge` if
    /// the seed is outside `[0, storage energy capacity]`.
    pub fn seeded(
        series: &'a ResourceSeries,
        mix: &'a CapacityMix,
        initial_soc_kwh: f64,
    ) -> Result<Self, SimulationError> {
        check_inputs(series)?;
        let capacity_kwh = mix.storage_energy_kwh();
        if !initial_soc_kwh.is_finite() || initial_soc_kwh < 0.0 || initial_soc_kwh > capacity_kwh {
            return Err(SimulationError::InitialCharge {
                soc_kwh: initial_soc_kwh,
                capacity_kwh,
            });
        }

        Ok(Self {
            series,
            mix,
            storage: StorageState::new(
                capacity_kwh,
                mix.storage_power_kw(),
                mix.round_trip_efficiency(),
                initial_soc_kwh,
            ),
        })
    }

    /// Dispatches hour `t` and advances the storage state.
    ///
    /// # Panics
    ///
    /// Panics if `t` is not a valid hour of the series.
    pub fn step(&mut self, t: usize) -> HourRecord {
        let load_kwh = self.series.load.values[t];
        let solar_available_kwh = self.mix.solar_kw() * self.series.solar_cf.values[t];
        let wind_available_kwh = self.mix.wind_kw() * self.series.wind_cf.values[t];
        let renewable_kwh = solar_available_kwh + wind_available_kwh;

        let mut storage_charge_kwh = 0.0;
        let mut storage_discharge_kwh = 0.0;
        let mut curtailed_kwh = 0.0;
        let mut gas_kwh = 0.0;
        let mut unmet_kwh = 0.0;

        let renewable_to_load = if renewable_kwh >= load_kwh {
            let surplus = renewable_kwh - load_kwh;
            storage_charge_kwh = self.storage.charge(surplus);
            curtailed_kwh = (surplus - storage_charge_kwh).max(0.0);
            load_kwh
        } else {
            let deficit = load_kwh - renewable_kwh;
            storage_discharge_kwh = self.storage.discharge(deficit);
            let residual = deficit - storage_discharge_kwh;
            gas_kwh = residual.min(self.mix.gas_kw());
            unmet_kwh = residual - gas_kwh;
            renewable_kwh
        };

        let (solar_kwh, wind_kwh) =
            prorate(renewable_to_load, solar_available_kwh, wind_available_kwh);

        HourRecord {
            hour: t,
            load_kwh,
            solar_available_kwh,
            wind_available_kwh,
            solar_kwh,
            wind_kwh,
            storage_charge_kwh,
            storage_discharge_kwh,
            gas_kwh,
            unmet_kwh,
            curtailed_kwh,
            soc_kwh: self.storage.soc_kwh,
        }
    }

    /// Dispatches every hour in order and returns the complete trace.
    pub fn run(mut self) -> DispatchTrace {
        let clock = HourClock::new(self.series.start(), self.series.hours());
        let mut records = Vec::with_capacity(clock.len());
        let mut last = None;
        for hour in clock {
            records.push(self.step(hour.index));
            last = Some(hour.timestamp);
        }

        debug!(
            hours = records.len(),
            last_hour = ?last,
            final_soc_kwh = self.storage.soc_kwh,
            "Dispatch run complete"
        );
        DispatchTrace::new(self.series.start(), records)
    }

    /// Current storage state (for inspection between steps).
    pub fn storage(&self) -> &StorageState {
        &self.storage
    }
}

/// Runs a full dispatch with storage starting empty.
///
/// # Errors
///
/// See [`DispatchEngine::new`].
pub fn simulate(
    series: &ResourceSeries,
    mix: &CapacityMix,
) -> Result<DispatchTrace, SimulationError> {
    Ok(DispatchEngine::new(series, mix)?.run())
}

/// Splits renewable energy delivered to load by each source's share of availability.
fn prorate(to_load: f64, solar_available: f64, wind_available: f64) -> (f64, f64) {
    let total = solar_available + wind_available;
    if total <= 0.0 || to_load <= 0.0 {
        return (0.0, 0.0);
    }
    let solar = to_load * (solar_available / total);
    (solar, to_load - solar)
}

fn check_inputs(series: &ResourceSeries) -> Result<(), SimulationError> {
    let (solar, wind, load) = (
        series.solar_cf.len(),
        series.wind_cf.len(),
        series.load.len(),
    );
    if solar != load || wind != load {
        return Err(SimulationError::LengthMismatch { solar, wind, load });
    }
    if load == 0 {
        return Err(SimulationError::EmptySeries);
    }

    let invalid = |series: &'static str, hour: usize, value: f64| SimulationError::InvalidInput {
        series,
        hour,
        value,
    };
    for (hour, &v) in series.load.values.iter().enumerate() {
        if !v.is_finite() || v < 0.0 {
            return Err(invalid("load", hour, v));
        }
    }
    for (name, s) in [("solar_cf", &series.solar_cf), ("wind_cf", &series.wind_cf)] {
        for (hour, &v) in s.values.iter().enumerate() {
            if !(0.0..=1.0).contains(&v) {
                return Err(invalid(name, hour, v));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::series::default_start;

    fn series(solar: Vec<f64>, wind: Vec<f64>, load: Vec<f64>) -> ResourceSeries {
        ResourceSeries::from_values(default_start(), solar, wind, load)
            .unwrap_or_else(|e| panic!("{e}"))
    }

    fn mix(solar: f64, wind: f64, storage: f64, gas: f64) -> CapacityMix {
        CapacityMix::builder()
            .solar_kw(solar)
            .wind_kw(wind)
            .gas_kw(gas)
            .storage(storage, None, 1.0)
            .build()
            .unwrap_or_else(|e| panic!("{e}"))
    }

    #[test]
    fn exact_match_takes_no_storage_action() {
        let s = series(vec![1.0], vec![0.0], vec![100.0]);
        let m = mix(100.0, 0.0, 50.0, 0.0);
        let mut engine = DispatchEngine::new(&s, &m).unwrap_or_else(|e| panic!("{e}"));
        let r = engine.step(0);
        assert_eq!(r.storage_charge_kwh, 0.0);
        assert_eq!(r.curtailed_kwh, 0.0);
        assert_eq!(r.solar_kwh, 100.0);
        assert_eq!(r.soc_kwh, 0.0);
    }

    #[test]
    fn renewables_are_prorated_by_availability() {
        // solar 60, wind 90, load 100 → solar 40, wind 60
        let s = series(vec![0.6], vec![0.9], vec![100.0]);
        let m = mix(100.0, 100.0, 0.0, 0.0);
        let trace = simulate(&s, &m).unwrap_or_else(|e| panic!("{e}"));
        let r = trace.records()[0];
        assert!((r.solar_kwh - 40.0).abs() < 1e-9);
        assert!((r.wind_kwh - 60.0).abs() < 1e-9);
        assert!((r.curtailed_kwh - 50.0).abs() < 1e-9);
    }

    #[test]
    fn deficit_goes_storage_then_gas_then_unmet() {
        let s = series(vec![1.0, 0.0], vec![0.0, 0.0], vec![50.0, 100.0]);
        let m = mix(80.0, 0.0, 30.0, 40.0);
        let trace = simulate(&s, &m).unwrap_or_else(|e| panic!("{e}"));
        let r0 = trace.records()[0];
        assert_eq!(r0.storage_charge_kwh, 30.0);
        assert_eq!(r0.soc_kwh, 30.0);
        let r1 = trace.records()[1];
        assert_eq!(r1.storage_discharge_kwh, 30.0);
        assert_eq!(r1.gas_kwh, 40.0);
        assert_eq!(r1.unmet_kwh, 30.0);
        assert_eq!(r1.soc_kwh, 0.0);
    }

    #[test]
    fn seeded_storage_discharges_first_hour() {
        let s = series(vec![0.0], vec![0.0], vec![10.0]);
        let m = mix(0.0, 0.0, 20.0, 0.0);
        let trace = DispatchEngine::seeded(&s, &m, 15.0)
            .map(DispatchEngine::run)
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(trace.records()[0].storage_discharge_kwh, 10.0);
        assert_eq!(trace.records()[0].soc_kwh, 5.0);
    }

    #[test]
    fn seed_above_capacity_is_rejected() {
        let s = series(vec![0.0], vec![0.0], vec![10.0]);
        let m = mix(0.0, 0.0, 20.0, 0.0);
        assert!(matches!(
            DispatchEngine::seeded(&s, &m, 25.0),
            Err(SimulationError::InitialCharge { .. })
        ));
    }

    #[test]
    fn negative_load_is_structural_error() {
        let s = series(vec![0.0; 3], vec![0.0; 3], vec![1.0, -1.0, 1.0]);
        let m = mix(0.0, 0.0, 0.0, 0.0);
        assert_eq!(
            simulate(&s, &m).err(),
            Some(SimulationError::InvalidInput {
                series: "load",
                hour: 1,
                value: -1.0
            })
        );
    }

    #[test]
    fn capacity_factor_out_of_range_is_structural_error() {
        let s = series(vec![0.0, 1.5], vec![0.0; 2], vec![1.0; 2]);
        let m = mix(0.0, 0.0, 0.0, 0.0);
        assert!(matches!(
            simulate(&s, &m),
            Err(SimulationError::InvalidInput {
                series: "solar_cf",
                hour: 1,
                ..
            })
        ));
    }

    #[test]
    fn hand_built_mismatched_series_is_structural_error() {
        let mut s = series(vec![0.0; 4], vec![0.0; 4], vec![1.0; 4]);
        s.wind_cf.values.pop();
        let m = mix(0.0, 0.0, 0.0, 0.0);
        assert_eq!(
            simulate(&s, &m).err(),
            Some(SimulationError::LengthMismatch {
                solar: 4,
                wind: 3,
                load: 4
            })
        );
    }

    #[test]
    fn empty_series_is_structural_error() {
        let mut s = series(vec![0.0], vec![0.0], vec![1.0]);
        s.solar_cf.values.clear();
        s.wind_cf.values.clear();
        s.load.values.clear();
        let m = mix(0.0, 0.0, 0.0, 0.0);
        assert_eq!(simulate(&s, &m).err(), Some(SimulationError::EmptySeries));
    }

    #[test]
    fn unmet_load_is_not_carried_forward() {
        let s = series(vec![0.0; 3], vec![0.0; 3], vec![10.0; 3]);
        let m = mix(0.0, 0.0, 0.0, 4.0);
        let trace = simulate(&s, &m).unwrap_or_else(|e| panic!("{e}"));
        for r in &trace {
            assert_eq!(r.gas_kwh, 4.0);
            assert_eq!(r.unmet_kwh, 6.0);
        }
    }
}
