//! Financing and fuel-cost helpers used to price dispatch results.

use serde::{Deserialize, Serialize};

/// kWh of thermal energy in one MMBtu.
pub const KWH_PER_MMBTU: f64 = 293.07;

/// Capital structure used to derive a weighted average cost of capital.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FinanceParams {
    /// Long-dated risk-free rate (e.g. 20-year treasury yield).
    pub risk_free_rate: f64,
    pub equity_premium: f64,
    pub debt_premium: f64,
    /// Share of the project financed by debt (0..1).
    pub debt_ratio: f64,
    pub tax_rate: f64,
}

impl Default for FinanceParams {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.045,
            equity_premium: 0.05,
            debt_premium: 0.02,
            debt_ratio: 0.6,
            tax_rate: 0.21,
        }
    }
}

impl FinanceParams {
    /// After-tax weighted average cost of capital.
    ///
    /// ```
    /// use hybrid_dc_sim::sim::finance::FinanceParams;
    ///
    /// let p = FinanceParams { risk_free_rate: 0.04, ..FinanceParams::default() };
    /// // 0.09 * 0.4 + 0.06 * 0.6 * 0.79
    /// assert!((p.wacc() - 0.06444).abs() < 1e-9);
    /// ```
    pub fn wacc(&self) -> f64 {
        let equity_return = self.risk_free_rate + self.equity_premium;
        let debt_return = self.risk_free_rate + self.debt_premium;
        let equity_ratio = 1.0 - self.debt_ratio;
        equity_return * equity_ratio + debt_return * self.debt_ratio * (1.0 - self.tax_rate)
    }
}

/// Fraction of an up-front capital cost paid each year to recover it over `years`.
///
/// Falls back to straight-line recovery (`1 / years`) at a zero rate.
pub fn capital_recovery_factor(rate: f64, years: u32) -> f64 {
    if years == 0 {
        return 1.0;
    }
    let n = f64::from(years);
    if rate.abs() < 1e-12 {
        return 1.0 / n;
    }
    let growth = (1.0 + rate).powf(n);
    rate * growth / (growth - 1.0)
}

/// Marginal cost of one kWh of gas-fired electricity ($/kWh).
pub fn gas_cost_per_kwh(price_per_mmbtu: f64, efficiency: f64, opex_per_kwh: f64) -> f64 {
    price_per_mmbtu / KWH_PER_MMBTU / efficiency + opex_per_kwh
}

/// CO2 emitted per kWh of gas-fired electricity (kg/kWh).
pub fn gas_emissions_per_kwh(kg_co2_per_mmbtu: f64, efficiency: f64) -> f64 {
    kg_co2_per_mmbtu / KWH_PER_MMBTU / efficiency
}

/// Panel ground area (km²) needed for `capacity_kw` of solar.
///
/// `panel_density` is the panel-to-ground area ratio.
pub fn solar_area_km2(capacity_kw: f64, panel_efficiency: f64, panel_density: f64) -> f64 {
    // Rated at 1 kW/m² standard irradiance.
    let area_m2 = capacity_kw / (panel_efficiency * panel_density);
    area_m2 / 1_000_000.0
}

/// Combined-cycle gas plant used as a single-technology cost reference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CcgtAssumptions {
    pub efficiency: f64,
    pub capex_per_kw: f64,
    pub opex_per_kwh: f64,
    /// Capacity factor the plant is sized for.
    pub capacity_factor: f64,
}

impl Default for CcgtAssumptions {
    fn default() -> Self {
        Self {
            efficiency: 0.55,
            capex_per_kw: 1200.0,
            opex_per_kwh: 0.01,
            capacity_factor: 0.9,
        }
    }
}

/// Cost of serving a load entirely from a CCGT plant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CcgtReference {
    pub capacity_kw: f64,
    pub capex: f64,
    pub annual_capital_cost: f64,
    pub annual_fuel_cost: f64,
    pub annual_opex: f64,
    /// Levelized cost ($/kWh).
    pub levelized_cost_per_kwh: f64,
}

impl CcgtReference {
    /// Prices `annual_demand_kwh` served by a CCGT plant.
    pub fn price(
        annual_demand_kwh: f64,
        plant: &CcgtAssumptions,
        gas_price_per_mmbtu: f64,
        discount_rate: f64,
        lifetime_years: u32,
    ) -> Self {
        let capacity_kw = annual_demand_kwh / (8760.0 * plant.capacity_factor);
        let capex = capacity_kw * plant.capex_per_kw;
        let annual_capital_cost = capex * capital_recovery_factor(discount_rate, lifetime_years);
        let annual_fuel_cost =
            annual_demand_kwh * gas_cost_per_kwh(gas_price_per_mmbtu, plant.efficiency, 0.0);
        let annual_opex = annual_demand_kwh * plant.opex_per_kwh;
        let total = annual_capital_cost + annual_fuel_cost + annual_opex;
        let levelized_cost_per_kwh = if annual_demand_kwh > 0.0 {
            total / annual_demand_kwh
        } else {
            0.0
        };

        Self {
            capacity_kw,
            capex,
            annual_capital_cost,
            annual_fuel_cost,
            annual_opex,
            levelized_cost_per_kwh,
        }
    }
}
