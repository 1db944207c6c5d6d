//! Candidate capacity mix: installed capacities, storage parameters and cost coefficients.

use serde::Serialize;

use crate::error::InvalidConfigurationError;

/// Cost and emissions coefficients used to price a dispatch trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostAssumptions {
    /// Solar capital cost ($/kW).
    pub solar_capex_per_kw: f64,
    /// Wind capital cost ($/kW).
    pub wind_capex_per_kw: f64,
    /// Gas turbine capital cost ($/kW).
    pub gas_capex_per_kw: f64,
    /// Storage capital cost per unit of energy capacity ($/kWh).
    pub storage_capex_per_kwh: f64,
    /// Storage capital cost per unit of power capacity ($/kW).
    pub storage_capex_per_kw: f64,
    /// Marginal cost of delivered gas energy, fuel plus O&M ($/kWh).
    pub gas_cost_per_kwh: f64,
    /// CO2 emitted per kWh of gas-fired electricity (kg/kWh).
    pub gas_emissions_kg_per_kwh: f64,
    /// Discount rate used to annualize capital (e.g. a WACC of 0.07).
    pub discount_rate: f64,
    /// Economic lifetime over which capital is recovered (years).
    pub lifetime_years: u32,
}

impl Default for CostAssumptions {
    fn default() -> Self {
        Self {
            solar_capex_per_kw: 350.0,
            wind_capex_per_kw: 1300.0,
            gas_capex_per_kw: 800.0,
            storage_capex_per_kwh: 250.0,
            storage_capex_per_kw: 0.0,
            gas_cost_per_kwh: 0.137,
            gas_emissions_kg_per_kwh: 0.52,
            discount_rate: 0.07,
            lifetime_years: 20,
        }
    }
}

impl CostAssumptions {
    fn validate(&self) -> Result<(), InvalidConfigurationError> {
        for (field, value) in [
            ("solar_capex_per_kw", self.solar_capex_per_kw),
            ("wind_capex_per_kw", self.wind_capex_per_kw),
            ("gas_capex_per_kw", self.gas_capex_per_kw),
            ("storage_capex_per_kwh", self.storage_capex_per_kwh),
            ("storage_capex_per_kw", self.storage_capex_per_kw),
            ("gas_cost_per_kwh", self.gas_cost_per_kwh),
            ("gas_emissions_kg_per_kwh", self.gas_emissions_kg_per_kwh),
        ] {
            non_negative(field, value)?;
        }
        if !self.discount_rate.is_finite() || self.discount_rate <= -1.0 {
            return Err(InvalidConfigurationError::new(
                "discount_rate",
                format!("must be finite and > -1, got {}", self.discount_rate),
            ));
        }
        if self.lifetime_years == 0 {
            return Err(InvalidConfigurationError::new("lifetime_years", "must be > 0"));
        }
        Ok(())
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), InvalidConfigurationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(InvalidConfigurationError::new(
            field,
            format!("must be finite and >= 0, got {value}"),
        ))
    }
}

/// One candidate system configuration.
///
/// Immutable once built; sweeps derive new instances with
/// [`CapacityMix::with_capacities`].
///
/// # Examples
///
/// ```
/// use hybrid_dc_sim::sim::mix::CapacityMix;
///
/// let mix = CapacityMix::builder()
///     .solar_kw(150.0)
///     .storage(400.0, Some(100.0), 0.9)
///     .gas_kw(100.0)
///     .build()
///     .expect("valid mix");
/// assert_eq!(mix.storage_power_kw(), Some(100.0));
///
/// let bad = CapacityMix::builder().storage(0.0, Some(50.0), 0.9).build();
/// assert!(bad.is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CapacityMix {
    solar_kw: f64,
    wind_kw: f64,
    gas_kw: f64,
    storage_energy_kwh: f64,
    storage_power_kw: Option<f64>,
    round_trip_efficiency: f64,
    costs: CostAssumptions,
}

impl CapacityMix {
    pub fn builder() -> MixBuilder {
        MixBuilder::default()
    }

    /// Installed solar capacity (kW).
    pub fn solar_kw(&self) -> f64 {
        self.solar_kw
    }

    /// Installed wind capacity (kW).
    pub fn wind_kw(&self) -> f64 {
        self.wind_kw
    }

    /// Installed gas capacity (kW).
    pub fn gas_kw(&self) -> f64 {
        self.gas_kw
    }

    /// Storage energy capacity (kWh); zero means no storage.
    pub fn storage_energy_kwh(&self) -> f64 {
        self.storage_energy_kwh
    }

    /// Storage charge/discharge power limit (kW); `None` means unconstrained.
    pub fn storage_power_kw(&self) -> Option<f64> {
        self.storage_power_kw
    }

    pub fn round_trip_efficiency(&self) -> f64 {
        self.round_trip_efficiency
    }

    pub fn costs(&self) -> &CostAssumptions {
        &self.costs
    }

    pub fn has_storage(&self) -> bool {
        self.storage_energy_kwh > 0.0
    }

    /// Returns a new mix with the given capacities and this mix's efficiency and costs.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidConfigurationError` under the same rules as [`MixBuilder::build`].
    pub fn with_capacities(
        &self,
        solar_kw: f64,
        wind_kw: f64,
        storage_energy_kwh: f64,
        storage_power_kw: Option<f64>,
        gas_kw: f64,
    ) -> Result<Self, InvalidConfigurationError> {
        MixBuilder {
            solar_kw,
            wind_kw,
            gas_kw,
            storage_energy_kwh,
            storage_power_kw,
            round_trip_efficiency: self.round_trip_efficiency,
            costs: self.costs,
        }
        .build()
    }
}

/// Builder collecting mix parameters before validation.
#[derive(Debug, Clone)]
pub struct MixBuilder {
    solar_kw: f64,
    wind_kw: f64,
    gas_kw: f64,
    storage_energy_kwh: f64,
    storage_power_kw: Option<f64>,
    round_trip_efficiency: f64,
    costs: CostAssumptions,
}

impl Default for MixBuilder {
    fn default() -> Self {
        Self {
            solar_kw: 0.0,
            wind_kw: 0.0,
            gas_kw: 0.0,
            storage_energy_kwh: 0.0,
            storage_power_kw: None,
            round_trip_efficiency: 1.0,
            costs: CostAssumptions::default(),
        }
    }
}

impl MixBuilder {
    pub fn solar_kw(mut self, kw: f64) -> Self {
        self.solar_kw = kw;
        self
    }

    pub fn wind_kw(mut self, kw: f64) -> Self {
        self.wind_kw = kw;
        self
    }

    pub fn gas_kw(mut self, kw: f64) -> Self {
        self.gas_kw = kw;
        self
    }

    /// Sets storage energy capacity, optional power limit and round-trip efficiency.
    pub fn storage(mut self, energy_kwh: f64, power_kw: Option<f64>, round_trip_efficiency: f64) -> Self {
        self.storage_energy_kwh = energy_kwh;
        self.storage_power_kw = power_kw;
        self.round_trip_efficiency = round_trip_efficiency;
        self
    }

    pub fn costs(mut self, costs: CostAssumptions) -> Self {
        self.costs = costs;
        self
    }

    /// Validates and freezes the mix.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidConfigurationError` if any capacity or cost is
    /// negative or non-finite, if a storage power rating is given without
    /// storage energy capacity, if round-trip efficiency is outside `(0, 1]`,
    /// or if the financing terms are unusable.
    pub fn build(self) -> Result<CapacityMix, InvalidConfigurationError> {
        non_negative("solar_kw", self.solar_kw)?;
        non_negative("wind_kw", self.wind_kw)?;
        non_negative("gas_kw", self.gas_kw)?;
        non_negative("storage_energy_kwh", self.storage_energy_kwh)?;
        if let Some(p) = self.storage_power_kw {
            non_negative("storage_power_kw", p)?;
            if p > 0.0 && self.storage_energy_kwh <= 0.0 {
                return Err(InvalidConfigurationError::new(
                    "storage_power_kw",
                    "is set but storage_energy_kwh is zero",
                ));
            }
        }
        let rte = self.round_trip_efficiency;
        if !(rte > 0.0 && rte <= 1.0) {
            return Err(InvalidConfigurationError::new(
                "round_trip_efficiency",
                format!("must be in (0, 1], got {rte}"),
            ));
        }
        self.costs.validate()?;

        Ok(CapacityMix {
            solar_kw: self.solar_kw,
            wind_kw: self.wind_kw,
            gas_kw: self.gas_kw,
            storage_energy_kwh: self.storage_energy_kwh,
            storage_power_kw: self.storage_power_kw,
            round_trip_efficiency: rte,
            costs: self.costs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_builder_is_valid_empty_mix() {
        let mix = CapacityMix::builder().build();
        assert!(mix.is_ok());
        assert!(!mix.map(|m| m.has_storage()).unwrap_or(true));
    }

    #[test]
    fn negative_capacity_rejected() {
        let err = CapacityMix::builder().wind_kw(-1.0).build();
        assert_eq!(err.map_err(|e| e.field), Err("wind_kw"));
    }

    #[test]
    fn nan_capacity_rejected() {
        let err = CapacityMix::builder().solar_kw(f64::NAN).build();
        assert_eq!(err.map_err(|e| e.field), Err("solar_kw"));
    }

    #[test]
    fn power_without_energy_rejected() {
        let err = CapacityMix::builder().storage(0.0, Some(10.0), 0.9).build();
        assert_eq!(err.map_err(|e| e.field), Err("storage_power_kw"));
    }

    #[test]
    fn efficiency_bounds() {
        for rte in [0.0, -0.1, 1.01, f64::NAN] {
            let err = CapacityMix::builder().storage(10.0, None, rte).build();
            assert_eq!(err.map_err(|e| e.field), Err("round_trip_efficiency"), "rte={rte}");
        }
        assert!(CapacityMix::builder().storage(10.0, None, 1.0).build().is_ok());
    }

    #[test]
    fn negative_cost_rejected() {
        let costs = CostAssumptions {
            gas_cost_per_kwh: -0.1,
            ..CostAssumptions::default()
        };
        let err = CapacityMix::builder().costs(costs).build();
        assert_eq!(err.map_err(|e| e.field), Err("gas_cost_per_kwh"));
    }

    #[test]
    fn zero_lifetime_rejected() {
        let costs = CostAssumptions {
            lifetime_years: 0,
            ..CostAssumptions::default()
        };
        assert!(CapacityMix::builder().costs(costs).build().is_err());
    }

    #[test]
    fn with_capacities_keeps_costs_and_efficiency() {
        let base = CapacityMix::builder()
            .storage(10.0, None, 0.85)
            .build()
            .unwrap_or_else(|e| panic!("{e}"));
        let derived = base
            .with_capacities(5.0, 6.0, 20.0, Some(4.0), 7.0)
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(derived.round_trip_efficiency(), 0.85);
        assert_eq!(derived.costs(), base.costs());
        assert_eq!(derived.wind_kw(), 6.0);
        assert_eq!(base.wind_kw(), 0.0);
    }
}
