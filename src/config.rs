//! TOML-based scenario configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::error::{InputError, InvalidConfigurationError};
use crate::io::import::read_series_csv;
use crate::profiles::{DataCenterLoad, Profile, SolarProfile, WindProfile};
use crate::sim::finance::{
    CcgtAssumptions, CcgtReference, FinanceParams, gas_cost_per_kwh, gas_emissions_per_kwh,
    solar_area_km2,
};
use crate::sim::mix::{CapacityMix, CostAssumptions};
use crate::sim::series::{
    HOURS_PER_YEAR, ResamplePolicy, ResourceSeries, SeriesProvider, Unit, default_start,
};
use crate::sim::sweep::{Axis, ReliabilityConstraint, SearchStrategy, Sweep};

/// Seed offsets so the three synthetic profiles draw independent noise.
const SOLAR_SEED_OFFSET: u64 = 11;
const WIND_SEED_OFFSET: u64 = 23;

/// Top-level scenario configuration parsed from TOML.
///
/// All sections have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Synthetic load parameters (ignored when CSV inputs are given).
    #[serde(default)]
    pub load: LoadConfig,
    #[serde(default)]
    pub solar: SolarConfig,
    #[serde(default)]
    pub wind: WindConfig,
    /// Optional measured series.
    #[serde(default)]
    pub inputs: InputsConfig,
    /// The capacity mix simulated by a single run.
    #[serde(default)]
    pub mix: MixConfig,
    #[serde(default)]
    pub costs: CostsConfig,
    #[serde(default)]
    pub finance: FinanceParams,
    /// Combined-cycle reference plant.
    #[serde(default)]
    pub ccgt: CcgtAssumptions,
    #[serde(default)]
    pub sweep: SweepConfig,
}

/// Simulation horizon and global parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Number of hours to synthesize (must be > 0).
    pub hours: usize,
    /// First simulated hour, e.g. `"2022-01-01T00:00:00"`.
    pub start: NaiveDateTime,
    /// Master random seed.
    pub seed: u64,
    /// Storage charge at hour 0 as a fraction of energy capacity.
    pub initial_soc_fraction: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            hours: HOURS_PER_YEAR,
            start: default_start(),
            seed: 42,
            initial_soc_fraction: 0.0,
        }
    }
}

/// Synthetic data-center load.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadConfig {
    /// Average demand (kW).
    pub base_kw: f64,
    /// Relative standard deviation of hourly noise.
    pub noise_std: f64,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            base_kw: 10_000.0,
            noise_std: 0.02,
        }
    }
}

/// Synthetic solar resource and panel land-use parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolarConfig {
    pub peak_cf: f64,
    /// First generating hour of day (inclusive).
    pub sunrise_hour: usize,
    /// End of the generating window (exclusive, <= 24).
    pub sunset_hour: usize,
    pub seasonal_amplitude: f64,
    pub noise_std: f64,
    /// Panel conversion efficiency (for land area).
    pub panel_efficiency: f64,
    /// Panel-to-ground area ratio (for land area).
    pub panel_density: f64,
}

impl Default for SolarConfig {
    fn default() -> Self {
        Self {
            peak_cf: 0.85,
            sunrise_hour: 6,
            sunset_hour: 19,
            seasonal_amplitude: 0.3,
            noise_std: 0.1,
            panel_efficiency: 0.22,
            panel_density: 0.45,
        }
    }
}

/// Synthetic wind resource.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindConfig {
    pub mean_cf: f64,
    /// AR(1) persistence (0.0-1.0).
    pub alpha: f64,
    pub noise_std: f64,
}

impl Default for WindConfig {
    fn default() -> Self {
        Self {
            mean_cf: 0.35,
            alpha: 0.9,
            noise_std: 0.05,
        }
    }
}

/// Measured `timestamp,value` CSV series. All three paths or none.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputsConfig {
    pub solar_csv: Option<PathBuf>,
    pub wind_csv: Option<PathBuf>,
    pub load_csv: Option<PathBuf>,
    /// Longest interior gap filled by interpolation; strict alignment when absent.
    pub max_gap_hours: Option<usize>,
}

impl InputsConfig {
    fn any(&self) -> bool {
        self.solar_csv.is_some() || self.wind_csv.is_some() || self.load_csv.is_some()
    }
}

/// Installed capacities for a single run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MixConfig {
    pub solar_kw: f64,
    pub wind_kw: f64,
    pub storage_kwh: f64,
    /// Storage power rating; unconstrained when absent.
    pub storage_power_kw: Option<f64>,
    pub gas_kw: f64,
    pub round_trip_efficiency: f64,
}

impl Default for MixConfig {
    fn default() -> Self {
        Self {
            solar_kw: 20_000.0,
            wind_kw: 10_000.0,
            storage_kwh: 40_000.0,
            storage_power_kw: None,
            gas_kw: 12_000.0,
            round_trip_efficiency: 0.85,
        }
    }
}

/// Capital costs, gas fuel and emissions assumptions.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CostsConfig {
    pub solar_capex_per_kw: f64,
    pub wind_capex_per_kw: f64,
    pub gas_capex_per_kw: f64,
    pub storage_capex_per_kwh: f64,
    pub storage_capex_per_kw: f64,
    /// Natural gas price ($/MMBtu).
    pub gas_price_per_mmbtu: f64,
    /// Turbine electrical efficiency (0.0-1.0].
    pub gas_efficiency: f64,
    /// Gas O&M ($/kWh delivered).
    pub gas_opex_per_kwh: f64,
    pub gas_kg_co2_per_mmbtu: f64,
    pub lifetime_years: u32,
    /// Overrides the WACC derived from `[finance]`.
    pub discount_rate: Option<f64>,
}

impl Default for CostsConfig {
    fn default() -> Self {
        Self {
            solar_capex_per_kw: 1000.0,
            wind_capex_per_kw: 1300.0,
            gas_capex_per_kw: 800.0,
            storage_capex_per_kwh: 250.0,
            storage_capex_per_kw: 0.0,
            gas_price_per_mmbtu: 3.5,
            gas_efficiency: 0.40,
            gas_opex_per_kwh: 0.01,
            gas_kg_co2_per_mmbtu: 53.06,
            lifetime_years: 20,
            discount_rate: None,
        }
    }
}

/// Capacity sweep parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepConfig {
    /// `"grid"` or `"solar_fraction"`.
    pub strategy: String,
    /// Reliability constraint (0.0-1.0).
    pub max_lolp: f64,
    /// Stop once a feasible mix at or below this $/kWh is found.
    pub stop_below_cost: Option<f64>,
    /// Minimum fractional cost reduction for a solar + wind mix to be chosen
    /// over the cheapest single-renewable mix (0.0-1.0).
    pub hybrid_threshold: f64,
    pub solar_kw: Axis,
    pub wind_kw: Axis,
    pub storage_kwh: Axis,
    pub gas_kw: Axis,
    pub storage_duration_hours: Option<f64>,
    /// Solar shares of renewable capacity for `"solar_fraction"`.
    pub fractions: Vec<f64>,
    /// Worst-day rank the renewables must still cover (0 = worst day).
    pub cutoff_day: usize,
    pub solar_storage_hours: f64,
    pub wind_storage_hours: f64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            strategy: "grid".to_string(),
            max_lolp: 0.0,
            stop_below_cost: None,
            hybrid_threshold: 0.0,
            solar_kw: Axis {
                min: 0.0,
                max: 40_000.0,
                steps: 5,
            },
            wind_kw: Axis {
                min: 0.0,
                max: 20_000.0,
                steps: 5,
            },
            storage_kwh: Axis {
                min: 0.0,
                max: 80_000.0,
                steps: 5,
            },
            gas_kw: Axis {
                min: 0.0,
                max: 12_000.0,
                steps: 3,
            },
            storage_duration_hours: Some(4.0),
            fractions: vec![0.0, 0.25, 0.5, 0.75, 1.0],
            cutoff_day: 10,
            solar_storage_hours: 12.0,
            wind_storage_hours: 24.0,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.hours"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl From<InvalidConfigurationError> for ConfigError {
    fn from(e: InvalidConfigurationError) -> Self {
        Self::new(format!("mix.{}", e.field), e.message)
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario: solar, wind, four hours of storage and gas sized above peak load.
    pub fn baseline() -> Self {
        Self::default()
    }

    /// Returns the solar-plus-gas preset: no wind, no storage.
    pub fn solar_gas() -> Self {
        Self {
            mix: MixConfig {
                solar_kw: 30_000.0,
                wind_kw: 0.0,
                storage_kwh: 0.0,
                ..MixConfig::default()
            },
            sweep: SweepConfig {
                wind_kw: Axis::fixed(0.0),
                storage_kwh: Axis::fixed(0.0),
                solar_kw: Axis {
                    min: 0.0,
                    max: 60_000.0,
                    steps: 7,
                },
                ..SweepConfig::default()
            },
            ..Self::default()
        }
    }

    /// Returns the wind-plus-storage preset: large storage, small gas backup,
    /// swept by solar fraction at a 1% reliability target.
    pub fn wind_storage() -> Self {
        Self {
            wind: WindConfig {
                mean_cf: 0.42,
                ..WindConfig::default()
            },
            mix: MixConfig {
                solar_kw: 5_000.0,
                wind_kw: 30_000.0,
                storage_kwh: 120_000.0,
                storage_power_kw: Some(15_000.0),
                gas_kw: 5_000.0,
                ..MixConfig::default()
            },
            sweep: SweepConfig {
                strategy: "solar_fraction".to_string(),
                max_lolp: 0.01,
                ..SweepConfig::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "solar_gas", "wind_storage"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "solar_gas" => Ok(Self::solar_gas()),
            "wind_storage" => Ok(Self::wind_storage()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        let mut cfg = Self::from_toml_str(&content)?;
        cfg.resolve_input_paths(path.parent().unwrap_or(Path::new(".")));
        Ok(cfg)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Makes relative CSV paths relative to the scenario file's directory.
    fn resolve_input_paths(&mut self, base: &Path) {
        let inputs = &mut self.inputs;
        for p in [&mut inputs.solar_csv, &mut inputs.wind_csv, &mut inputs.load_csv]
            .into_iter()
            .flatten()
        {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        }
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let unit_range = |errors: &mut Vec<ConfigError>, field: &str, v: f64| {
            if !(0.0..=1.0).contains(&v) {
                errors.push(ConfigError::new(field, "must be in [0.0, 1.0]"));
            }
        };

        let s = &self.simulation;
        if s.hours == 0 && !self.inputs.any() {
            errors.push(ConfigError::new("simulation.hours", "must be > 0"));
        }
        unit_range(&mut errors, "simulation.initial_soc_fraction", s.initial_soc_fraction);

        if !self.load.base_kw.is_finite() || self.load.base_kw < 0.0 {
            errors.push(ConfigError::new("load.base_kw", "must be >= 0"));
        }
        if self.load.noise_std < 0.0 {
            errors.push(ConfigError::new("load.noise_std", "must be >= 0"));
        }

        let sol = &self.solar;
        if sol.sunrise_hour >= sol.sunset_hour {
            errors.push(ConfigError::new(
                "solar.sunrise_hour",
                "must be < solar.sunset_hour",
            ));
        }
        if sol.sunset_hour > 24 {
            errors.push(ConfigError::new("solar.sunset_hour", "must be <= 24"));
        }
        unit_range(&mut errors, "solar.peak_cf", sol.peak_cf);
        unit_range(&mut errors, "solar.seasonal_amplitude", sol.seasonal_amplitude);
        if sol.panel_efficiency <= 0.0 || sol.panel_density <= 0.0 {
            errors.push(ConfigError::new(
                "solar.panel_efficiency",
                "panel efficiency and density must be > 0",
            ));
        }

        unit_range(&mut errors, "wind.mean_cf", self.wind.mean_cf);
        unit_range(&mut errors, "wind.alpha", self.wind.alpha);

        let inp = &self.inputs;
        if inp.any() && !(inp.solar_csv.is_some() && inp.wind_csv.is_some() && inp.load_csv.is_some())
        {
            errors.push(ConfigError::new(
                "inputs",
                "solar_csv, wind_csv and load_csv must be given together",
            ));
        }

        let c = &self.costs;
        if !(c.gas_efficiency > 0.0 && c.gas_efficiency <= 1.0) {
            errors.push(ConfigError::new("costs.gas_efficiency", "must be in (0.0, 1.0]"));
        }
        if c.gas_price_per_mmbtu < 0.0 {
            errors.push(ConfigError::new("costs.gas_price_per_mmbtu", "must be >= 0"));
        }
        for (field, v) in [
            ("ccgt.efficiency", self.ccgt.efficiency),
            ("ccgt.capacity_factor", self.ccgt.capacity_factor),
        ] {
            if !(v > 0.0 && v <= 1.0) {
                errors.push(ConfigError::new(field, "must be in (0.0, 1.0]"));
            }
        }
        // Remaining cost and capacity checks are owned by the mix builder.
        if let Err(e) = self.capacity_mix() {
            errors.push(e.into());
        }

        let sw = &self.sweep;
        match sw.strategy.as_str() {
            "grid" => {}
            "solar_fraction" => {
                if sw.fractions.is_empty() {
                    errors.push(ConfigError::new("sweep.fractions", "must not be empty"));
                }
                if sw.fractions.iter().any(|f| !(0.0..=1.0).contains(f)) {
                    errors.push(ConfigError::new(
                        "sweep.fractions",
                        "every fraction must be in [0.0, 1.0]",
                    ));
                }
            }
            other => errors.push(ConfigError::new(
                "sweep.strategy",
                format!("must be \"grid\" or \"solar_fraction\", got \"{other}\""),
            )),
        }
        unit_range(&mut errors, "sweep.max_lolp", sw.max_lolp);
        unit_range(&mut errors, "sweep.hybrid_threshold", sw.hybrid_threshold);
        if sw.storage_duration_hours.is_some_and(|d| d <= 0.0) {
            errors.push(ConfigError::new("sweep.storage_duration_hours", "must be > 0"));
        }

        errors
    }

    /// Derives the cost coefficients of a mix from `[costs]` and `[finance]`.
    pub fn cost_assumptions(&self) -> CostAssumptions {
        let c = &self.costs;
        CostAssumptions {
            solar_capex_per_kw: c.solar_capex_per_kw,
            wind_capex_per_kw: c.wind_capex_per_kw,
            gas_capex_per_kw: c.gas_capex_per_kw,
            storage_capex_per_kwh: c.storage_capex_per_kwh,
            storage_capex_per_kw: c.storage_capex_per_kw,
            gas_cost_per_kwh: gas_cost_per_kwh(
                c.gas_price_per_mmbtu,
                c.gas_efficiency,
                c.gas_opex_per_kwh,
            ),
            gas_emissions_kg_per_kwh: gas_emissions_per_kwh(c.gas_kg_co2_per_mmbtu, c.gas_efficiency),
            discount_rate: self.discount_rate(),
            lifetime_years: c.lifetime_years,
        }
    }

    /// The explicit discount rate, or the WACC of `[finance]`.
    pub fn discount_rate(&self) -> f64 {
        self.costs.discount_rate.unwrap_or_else(|| self.finance.wacc())
    }

    /// Builds the validated mix of `[mix]`.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidConfigurationError` for out-of-range capacities or costs.
    pub fn capacity_mix(&self) -> Result<CapacityMix, InvalidConfigurationError> {
        let m = &self.mix;
        CapacityMix::builder()
            .solar_kw(m.solar_kw)
            .wind_kw(m.wind_kw)
            .gas_kw(m.gas_kw)
            .storage(m.storage_kwh, m.storage_power_kw, m.round_trip_efficiency)
            .costs(self.cost_assumptions())
            .build()
    }

    /// Initial storage charge for `mix` (kWh).
    pub fn initial_soc_kwh(&self, mix: &CapacityMix) -> f64 {
        self.simulation.initial_soc_fraction * mix.storage_energy_kwh()
    }

    /// Loads the CSV inputs, or synthesizes profiles when none are configured.
    ///
    /// # Errors
    ///
    /// Returns an `InputError` if a file cannot be read or the series cannot
    /// be aligned under the configured gap tolerance.
    pub fn resource_series(&self) -> Result<ResourceSeries, InputError> {
        let inp = &self.inputs;
        let (Some(solar), Some(wind), Some(load)) = (&inp.solar_csv, &inp.wind_csv, &inp.load_csv)
        else {
            return Ok(self.synthetic_series()?);
        };

        let solar = read_series_csv(solar, "solar", Unit::CapacityFactor)?;
        let wind = read_series_csv(wind, "wind", Unit::CapacityFactor)?;
        let load = read_series_csv(load, "load", Unit::Kilowatts)?;
        let policy = inp
            .max_gap_hours
            .map_or(ResamplePolicy::Strict, |max_gap_hours| {
                ResamplePolicy::LinearInterpolation { max_gap_hours }
            });
        Ok(SeriesProvider::new(policy).resource_series(&solar, &wind, &load)?)
    }

    /// Generates seeded synthetic profiles for the configured horizon.
    ///
    /// # Errors
    ///
    /// Returns an `AlignmentError` when `simulation.hours` is zero.
    pub fn synthetic_series(&self) -> Result<ResourceSeries, crate::error::AlignmentError> {
        let s = &self.simulation;
        let sol = &self.solar;
        let mut solar = SolarProfile::new(
            sol.peak_cf,
            sol.sunrise_hour,
            sol.sunset_hour,
            sol.seasonal_amplitude,
            sol.noise_std,
            s.seed.wrapping_add(SOLAR_SEED_OFFSET),
        );
        let w = &self.wind;
        let mut wind = WindProfile::new(
            w.mean_cf,
            w.alpha,
            w.noise_std,
            s.seed.wrapping_add(WIND_SEED_OFFSET),
        );
        let mut load = DataCenterLoad::new(self.load.base_kw, self.load.noise_std, s.seed);

        ResourceSeries::new(
            solar.series(s.start, s.hours),
            wind.series(s.start, s.hours),
            load.series(s.start, s.hours),
        )
    }

    /// Builds the configured sweep.
    pub fn sweep(&self) -> Sweep {
        let sw = &self.sweep;
        let strategy = match sw.strategy.as_str() {
            "solar_fraction" => SearchStrategy::SolarFraction {
                fractions: sw.fractions.clone(),
                cutoff_day: sw.cutoff_day,
                solar_storage_hours: sw.solar_storage_hours,
                wind_storage_hours: sw.wind_storage_hours,
            },
            _ => SearchStrategy::Grid {
                solar_kw: sw.solar_kw,
                wind_kw: sw.wind_kw,
                storage_kwh: sw.storage_kwh,
                gas_kw: sw.gas_kw,
                storage_duration_hours: sw.storage_duration_hours,
            },
        };
        let sweep = Sweep::new(
            strategy,
            ReliabilityConstraint {
                max_lolp: sw.max_lolp,
            },
        )
        .hybrid_threshold(sw.hybrid_threshold);
        match sw.stop_below_cost {
            Some(cost) => sweep.stop_below_cost(cost),
            None => sweep,
        }
    }

    /// Prices the same load served entirely by the `[ccgt]` reference plant.
    pub fn ccgt_reference(&self, series: &ResourceSeries) -> CcgtReference {
        let years = series.hours() as f64 / HOURS_PER_YEAR as f64;
        let annual_demand_kwh = if years > 0.0 {
            series.load.total() / years
        } else {
            0.0
        };
        CcgtReference::price(
            annual_demand_kwh,
            &self.ccgt,
            self.costs.gas_price_per_mmbtu,
            self.discount_rate(),
            self.costs.lifetime_years,
        )
    }

    /// Ground area needed for `solar_kw` of panels (km²).
    pub fn solar_area_km2(&self, solar_kw: f64) -> f64 {
        solar_area_km2(solar_kw, self.solar.panel_efficiency, self.solar.panel_density)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_preset_valid() {
        let cfg = ScenarioConfig::baseline();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "baseline should be valid: {errors:?}");
    }

    #[test]
    fn from_preset_unknown() {
        let err = ScenarioConfig::from_preset("nonexistent");
        assert!(err.as_ref().is_err_and(|e| e.message.contains("unknown preset")));
    }

    #[test]
    fn all_presets_are_valid() {
        for name in ScenarioConfig::PRESETS {
            let cfg = ScenarioConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[simulation]
hours = 48
start = "2023-06-01T00:00:00"
seed = 99
initial_soc_fraction = 0.5

[load]
base_kw = 500.0

[mix]
solar_kw = 1000.0
wind_kw = 0.0
storage_kwh = 2000.0
storage_power_kw = 500.0
gas_kw = 500.0
round_trip_efficiency = 0.9

[costs]
gas_price_per_mmbtu = 4.0
discount_rate = 0.08

[sweep]
strategy = "solar_fraction"
fractions = [0.5, 1.0]
max_lolp = 0.05
solar_kw = { min = 0.0, max = 100.0, steps = 3 }
"#;
        let cfg = ScenarioConfig::from_toml_str(toml).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(cfg.simulation.hours, 48);
        assert_eq!(cfg.simulation.start.to_string(), "2023-06-01 00:00:00");
        assert_eq!(cfg.mix.storage_power_kw, Some(500.0));
        assert_eq!(cfg.discount_rate(), 0.08);
        assert_eq!(cfg.sweep.solar_kw.steps, 3);
        assert!(cfg.validate().is_empty());

        let mix = cfg.capacity_mix().unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(cfg.initial_soc_kwh(&mix), 1000.0);
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[simulation]
hours = 24
bogus_field = true
"#;
        assert!(ScenarioConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let cfg = ScenarioConfig::from_toml_str("[simulation]\nseed = 99\n")
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(cfg.simulation.seed, 99);
        assert_eq!(cfg.simulation.hours, HOURS_PER_YEAR);
        assert_eq!(cfg.mix.solar_kw, 20_000.0);
    }

    #[test]
    fn validation_catches_bad_soc_fraction() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.initial_soc_fraction = 1.5;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "simulation.initial_soc_fraction"));
    }

    #[test]
    fn validation_reports_mix_errors_with_path() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.mix.round_trip_efficiency = 1.2;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field.starts_with("mix.")));
    }

    #[test]
    fn validation_catches_partial_inputs() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.inputs.solar_csv = Some(PathBuf::from("solar.csv"));
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "inputs"));
    }

    #[test]
    fn validation_catches_bad_strategy() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.sweep.strategy = "annealing".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "sweep.strategy"));
    }

    #[test]
    fn validation_catches_degenerate_ccgt_plant() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.ccgt.capacity_factor = 0.0;
        cfg.ccgt.efficiency = 1.5;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "ccgt.capacity_factor"));
        assert!(errors.iter().any(|e| e.field == "ccgt.efficiency"));

        cfg.ccgt = CcgtAssumptions::default();
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn validation_catches_bad_hybrid_threshold() {
        let mut cfg = ScenarioConfig::wind_storage();
        cfg.sweep.hybrid_threshold = -0.1;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "sweep.hybrid_threshold"));
    }

    #[test]
    fn gas_cost_derived_from_fuel_price() {
        let cfg = ScenarioConfig::baseline();
        let costs = cfg.cost_assumptions();
        let expected = 3.5 / 293.07 / 0.40 + 0.01;
        assert!((costs.gas_cost_per_kwh - expected).abs() < 1e-12);
        assert!((costs.discount_rate - FinanceParams::default().wacc()).abs() < 1e-12);
    }

    #[test]
    fn synthetic_series_is_seeded() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.hours = 72;
        let a = cfg.synthetic_series().unwrap_or_else(|e| panic!("{e}"));
        let b = cfg.resource_series().unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(a, b);
        assert_eq!(a.hours(), 72);

        cfg.simulation.seed = 7;
        let c = cfg.synthetic_series().unwrap_or_else(|e| panic!("{e}"));
        assert_ne!(a.load.values, c.load.values);
    }

    #[test]
    fn presets_select_sweep_strategy() {
        assert!(matches!(
            ScenarioConfig::baseline().sweep().strategy(),
            SearchStrategy::Grid { .. }
        ));
        assert!(matches!(
            ScenarioConfig::wind_storage().sweep().strategy(),
            SearchStrategy::SolarFraction { .. }
        ));
    }
}
