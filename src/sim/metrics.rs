//! Post-hoc reduction of a dispatch trace into reliability, cost and emissions metrics.

use std::fmt;

use serde::Serialize;

use super::finance::capital_recovery_factor;
use super::mix::CapacityMix;
use super::series::HOURS_PER_YEAR;
use super::types::DispatchTrace;

/// Up-front capital cost per technology ($).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CapexBreakdown {
    pub solar: f64,
    pub wind: f64,
    pub storage: f64,
    pub gas: f64,
}

impl CapexBreakdown {
    pub fn for_mix(mix: &CapacityMix) -> Self {
        let c = mix.costs();
        Self {
            solar: mix.solar_kw() * c.solar_capex_per_kw,
            wind: mix.wind_kw() * c.wind_capex_per_kw,
            storage: mix.storage_energy_kwh() * c.storage_capex_per_kwh
                + mix.storage_power_kw().unwrap_or(0.0) * c.storage_capex_per_kw,
            gas: mix.gas_kw() * c.gas_capex_per_kw,
        }
    }

    pub fn total(&self) -> f64 {
        self.solar + self.wind + self.storage + self.gas
    }
}

/// Aggregate metrics derived from one complete dispatch trace.
///
/// Computed post-hoc from the trace so reported numbers always agree with
/// the hourly records. Energies in kWh, costs in $.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMetrics {
    /// Number of simulated hours `H`.
    pub hours: usize,
    /// Hours with any unmet load.
    pub loss_of_load_hours: usize,
    /// `loss_of_load_hours / H`.
    pub loss_of_load_probability: f64,
    pub unmet_energy_kwh: f64,
    pub total_load_kwh: f64,
    pub served_load_kwh: f64,
    pub solar_kwh: f64,
    pub wind_kwh: f64,
    pub storage_charge_kwh: f64,
    pub storage_discharge_kwh: f64,
    pub gas_kwh: f64,
    /// Hours in which gas generation ran.
    pub gas_run_hours: usize,
    /// (solar + wind delivered to load) / total load.
    pub renewable_penetration: f64,
    /// Gas delivered / total load.
    pub gas_fraction: f64,
    pub curtailed_kwh: f64,
    /// Curtailed / renewable energy available.
    pub curtailment_fraction: f64,
    /// Storage discharge / storage energy capacity.
    pub storage_equivalent_cycles: f64,
    /// Solar energy delivered per unit of installed solar capacity and hour.
    pub solar_utilization: f64,
    /// Wind energy delivered per unit of installed wind capacity and hour.
    pub wind_utilization: f64,
    pub capex: CapexBreakdown,
    /// Total capex divided by peak load ($/kW).
    pub capex_per_kw_load: f64,
    /// Capital cost recovered per year at the mix's discount rate and lifetime.
    pub annualized_capital_cost: f64,
    /// Simulated period in years (`H / 8760`).
    pub simulated_years: f64,
    /// Gas fuel and O&M cost over the simulated period.
    pub fuel_cost: f64,
    /// (annualized capital × years + fuel cost) / served load ($/kWh).
    ///
    /// Capital is charged for the simulated period only (`years = H / 8760`),
    /// so runs shorter or longer than a year are not priced as a full year of
    /// capital against a partial year of energy. For `H = 8760` this is
    /// annualized capital plus fuel over served load. `f64::INFINITY` when
    /// nothing is served.
    pub levelized_cost_per_kwh: f64,
    pub gas_emissions_kg: f64,
    /// Gas emissions per kWh of served load (kg/kWh).
    pub emissions_intensity_kg_per_kwh: f64,
}

impl SummaryMetrics {
    /// Reduces `trace` produced for `mix` into summary metrics.
    ///
    /// # Arguments
    ///
    /// * `trace` - Complete dispatch trace
    /// * `mix` - The capacity mix the trace was simulated with
    pub fn from_trace(trace: &DispatchTrace, mix: &CapacityMix) -> Self {
        let hours = trace.len();
        let mut lol_hours = 0_usize;
        let mut gas_hours = 0_usize;
        let mut unmet = 0.0_f64;
        let mut load = 0.0_f64;
        let mut peak_load = 0.0_f64;
        let mut solar = 0.0_f64;
        let mut wind = 0.0_f64;
        let mut charge = 0.0_f64;
        let mut discharge = 0.0_f64;
        let mut gas = 0.0_f64;
        let mut curtailed = 0.0_f64;
        let mut available = 0.0_f64;

        for r in trace {
            if r.unmet_kwh > 0.0 {
                lol_hours += 1;
            }
            if r.gas_kwh > 0.0 {
                gas_hours += 1;
            }
            unmet += r.unmet_kwh;
            load += r.load_kwh;
            peak_load = peak_load.max(r.load_kwh);
            solar += r.solar_kwh;
            wind += r.wind_kwh;
            charge += r.storage_charge_kwh;
            discharge += r.storage_discharge_kwh;
            gas += r.gas_kwh;
            curtailed += r.curtailed_kwh;
            available += r.renewable_available_kwh();
        }

        let served = load - unmet;
        let h = hours as f64;
        let costs = mix.costs();

        let capex = CapexBreakdown::for_mix(mix);
        let annualized_capital_cost =
            capex.total() * capital_recovery_factor(costs.discount_rate, costs.lifetime_years);
        let simulated_years = h / HOURS_PER_YEAR as f64;
        let fuel_cost = gas * costs.gas_cost_per_kwh;
        let total_cost = annualized_capital_cost * simulated_years + fuel_cost;
        let gas_emissions_kg = gas * costs.gas_emissions_kg_per_kwh;

        Self {
            hours,
            loss_of_load_hours: lol_hours,
            loss_of_load_probability: ratio(lol_hours as f64, h),
            unmet_energy_kwh: unmet,
            total_load_kwh: load,
            served_load_kwh: served,
            solar_kwh: solar,
            wind_kwh: wind,
            storage_charge_kwh: charge,
            storage_discharge_kwh: discharge,
            gas_kwh: gas,
            gas_run_hours: gas_hours,
            renewable_penetration: ratio(solar + wind, load),
            gas_fraction: ratio(gas, load),
            curtailed_kwh: curtailed,
            curtailment_fraction: ratio(curtailed, available),
            storage_equivalent_cycles: ratio(discharge, mix.storage_energy_kwh()),
            solar_utilization: ratio(solar, mix.solar_kw() * h),
            wind_utilization: ratio(wind, mix.wind_kw() * h),
            capex_per_kw_load: ratio(capex.total(), peak_load),
            capex,
            annualized_capital_cost,
            simulated_years,
            fuel_cost,
            levelized_cost_per_kwh: if served > 0.0 {
                total_cost / served
            } else {
                f64::INFINITY
            },
            gas_emissions_kg,
            emissions_intensity_kg_per_kwh: ratio(gas_emissions_kg, served),
        }
    }

    /// Whether the loss-of-load probability is within `max_lolp`.
    pub fn meets(&self, max_lolp: f64) -> bool {
        self.loss_of_load_probability <= max_lolp
    }
}

/// `num / den`, or 0.0 when the denominator is not positive.
fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 { num / den } else { 0.0 }
}

impl fmt::Display for SummaryMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Summary ---")?;
        writeln!(f, "Hours simulated:       {}", self.hours)?;
        writeln!(
            f,
            "Loss of load:          {} h (LOLP {:.4})",
            self.loss_of_load_hours, self.loss_of_load_probability
        )?;
        writeln!(f, "Unmet energy:          {:.1} kWh", self.unmet_energy_kwh)?;
        writeln!(
            f,
            "Renewable penetration: {:.1}%",
            self.renewable_penetration * 100.0
        )?;
        writeln!(
            f,
            "Gas:                   {:.1} kWh ({:.1}% of load, {} run hours)",
            self.gas_kwh,
            self.gas_fraction * 100.0,
            self.gas_run_hours
        )?;
        writeln!(
            f,
            "Storage:               {:.1} kWh in, {:.1} kWh out ({:.1} equiv. cycles)",
            self.storage_charge_kwh, self.storage_discharge_kwh, self.storage_equivalent_cycles
        )?;
        writeln!(
            f,
            "Curtailment:           {:.1} kWh ({:.1}%)",
            self.curtailed_kwh,
            self.curtailment_fraction * 100.0
        )?;
        writeln!(
            f,
            "Capex:                 ${:.0} (${:.0}/kW of peak load)",
            self.capex.total(),
            self.capex_per_kw_load
        )?;
        writeln!(f, "Levelized cost:        {:.4} $/kWh", self.levelized_cost_per_kwh)?;
        write!(
            f,
            "Emissions:             {:.1} t CO2 ({:.4} kg/kWh)",
            self.gas_emissions_kg / 1000.0,
            self.emissions_intensity_kg_per_kwh
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::mix::CostAssumptions;
    use crate::sim::series::default_start;
    use crate::sim::types::HourRecord;

    fn record(load: f64, solar: f64, gas: f64, unmet: f64, curtailed: f64) -> HourRecord {
        HourRecord {
            hour: 0,
            load_kwh: load,
            solar_available_kwh: solar + curtailed,
            wind_available_kwh: 0.0,
            solar_kwh: solar,
            wind_kwh: 0.0,
            storage_charge_kwh: 0.0,
            storage_discharge_kwh: 0.0,
            gas_kwh: gas,
            unmet_kwh: unmet,
            curtailed_kwh: curtailed,
            soc_kwh: 0.0,
        }
    }

    fn mix(solar: f64, gas: f64, costs: CostAssumptions) -> CapacityMix {
        CapacityMix::builder()
            .solar_kw(solar)
            .gas_kw(gas)
            .costs(costs)
            .build()
            .unwrap_or_else(|e| panic!("{e}"))
    }

    #[test]
    fn reliability_counts() {
        let trace = DispatchTrace::new(
            default_start(),
            vec![
                record(10.0, 10.0, 0.0, 0.0, 0.0),
                record(10.0, 0.0, 4.0, 6.0, 0.0),
                record(10.0, 0.0, 10.0, 0.0, 0.0),
                record(10.0, 2.0, 0.0, 8.0, 0.0),
            ],
        );
        let m = SummaryMetrics::from_trace(&trace, &mix(10.0, 10.0, CostAssumptions::default()));
        assert_eq!(m.loss_of_load_hours, 2);
        assert_eq!(m.loss_of_load_probability, 0.5);
        assert_eq!(m.unmet_energy_kwh, 14.0);
        assert_eq!(m.gas_run_hours, 2);
        assert_eq!(m.served_load_kwh, 26.0);
        assert!((m.renewable_penetration - 0.3).abs() < 1e-12);
    }

    #[test]
    fn curtailment_fraction_of_available() {
        let trace = DispatchTrace::new(
            default_start(),
            vec![record(10.0, 10.0, 0.0, 0.0, 30.0), record(10.0, 0.0, 10.0, 0.0, 0.0)],
        );
        let m = SummaryMetrics::from_trace(&trace, &mix(40.0, 10.0, CostAssumptions::default()));
        assert_eq!(m.curtailed_kwh, 30.0);
        assert!((m.curtailment_fraction - 0.75).abs() < 1e-12);
    }

    #[test]
    fn no_renewables_means_zero_curtailment_fraction() {
        let trace = DispatchTrace::new(default_start(), vec![record(10.0, 0.0, 10.0, 0.0, 0.0)]);
        let m = SummaryMetrics::from_trace(&trace, &mix(0.0, 10.0, CostAssumptions::default()));
        assert_eq!(m.curtailment_fraction, 0.0);
        assert_eq!(m.solar_utilization, 0.0);
    }

    #[test]
    fn levelized_cost_over_full_year() {
        // zero discount rate, 10 year life → capex / 10 per year
        let costs = CostAssumptions {
            solar_capex_per_kw: 1000.0,
            gas_capex_per_kw: 0.0,
            gas_cost_per_kwh: 0.1,
            gas_emissions_kg_per_kwh: 0.5,
            discount_rate: 0.0,
            lifetime_years: 10,
            ..CostAssumptions::default()
        };
        let records = vec![record(1.0, 0.5, 0.5, 0.0, 0.0); HOURS_PER_YEAR];
        let trace = DispatchTrace::new(default_start(), records);
        let m = SummaryMetrics::from_trace(&trace, &mix(1.0, 1.0, costs));

        assert_eq!(m.capex.total(), 1000.0);
        assert!((m.annualized_capital_cost - 100.0).abs() < 1e-9);
        assert!((m.simulated_years - 1.0).abs() < 1e-12);
        // fuel: 4380 kWh × 0.1 = 438; total 538 over 8760 kWh
        assert!((m.fuel_cost - 438.0).abs() < 1e-6);
        assert!((m.levelized_cost_per_kwh - 538.0 / 8760.0).abs() < 1e-9);
        assert!((m.gas_emissions_kg - 2190.0).abs() < 1e-6);
        assert!((m.emissions_intensity_kg_per_kwh - 0.25).abs() < 1e-9);
        assert!((m.capex_per_kw_load - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn levelized_cost_charges_capital_for_simulated_period_only() {
        let costs = CostAssumptions {
            solar_capex_per_kw: 1000.0,
            gas_capex_per_kw: 0.0,
            discount_rate: 0.0,
            lifetime_years: 10,
            ..CostAssumptions::default()
        };
        let half_year = HOURS_PER_YEAR / 2;
        let trace = DispatchTrace::new(default_start(), vec![record(1.0, 1.0, 0.0, 0.0, 0.0); half_year]);
        let m = SummaryMetrics::from_trace(&trace, &mix(1.0, 0.0, costs));

        // 100 $/yr of capital over half a year, 4380 kWh served
        assert!((m.simulated_years - 0.5).abs() < 1e-12);
        assert!((m.levelized_cost_per_kwh - 50.0 / 4380.0).abs() < 1e-12);
    }

    #[test]
    fn nothing_served_is_infinitely_expensive() {
        let trace = DispatchTrace::new(default_start(), vec![record(10.0, 0.0, 0.0, 10.0, 0.0)]);
        let m = SummaryMetrics::from_trace(&trace, &mix(0.0, 0.0, CostAssumptions::default()));
        assert!(m.levelized_cost_per_kwh.is_infinite());
        assert!(!m.meets(0.5));
    }

    #[test]
    fn display_does_not_panic() {
        let trace = DispatchTrace::new(default_start(), vec![record(10.0, 10.0, 0.0, 0.0, 0.0)]);
        let m = SummaryMetrics::from_trace(&trace, &mix(10.0, 0.0, CostAssumptions::default()));
        let s = format!("{m}");
        assert!(s.contains("Levelized cost:"));
    }
}
