//! Per-run storage state of charge.

/// State of charge of the storage asset during one dispatch run.
///
/// The whole round-trip loss is taken on the charging leg: energy accepted
/// from the bus is multiplied by the round-trip efficiency before it is
/// stored, and stored energy is delivered one-for-one on discharge.
#[derive(Debug, Clone)]
pub struct StorageState {
    /// Stored energy (kWh), always within `[0, capacity_kwh]`.
    pub soc_kwh: f64,

    /// Energy capacity (kWh).
    pub capacity_kwh: f64,

    /// Hourly charge/discharge limit (kW); infinite when unconstrained.
    pub max_power_kw: f64,

    /// Round-trip efficiency (0..1.0].
    pub round_trip_efficiency: f64,
}

impl StorageState {
    /// Creates a storage state holding `soc_kwh`.
    ///
    /// # Arguments
    ///
    /// * `capacity_kwh` - Energy capacity (zero disables storage)
    /// * `max_power_kw` - Per-hour power limit, `None` for unconstrained
    /// * `round_trip_efficiency` - Fraction of accepted energy retained
    /// * `soc_kwh` - Initial stored energy
    pub fn new(
        capacity_kwh: f64,
        max_power_kw: Option<f64>,
        round_trip_efficiency: f64,
        soc_kwh: f64,
    ) -> Self {
        Self {
            soc_kwh: soc_kwh.clamp(0.0, capacity_kwh.max(0.0)),
            capacity_kwh: capacity_kwh.max(0.0),
            max_power_kw: max_power_kw.unwrap_or(f64::INFINITY),
            round_trip_efficiency,
        }
    }

    /// Empty headroom (kWh).
    pub fn headroom_kwh(&self) -> f64 {
        self.capacity_kwh - self.soc_kwh
    }

    /// Offers `surplus_kwh` of renewable energy; returns the amount accepted from the bus.
    pub fn charge(&mut self, surplus_kwh: f64) -> f64 {
        if self.capacity_kwh <= 0.0 || surplus_kwh <= 0.0 {
            return 0.0;
        }
        let accept_limit = self.headroom_kwh() / self.round_trip_efficiency;
        let accepted = surplus_kwh.min(self.max_power_kw).min(accept_limit).max(0.0);

        self.soc_kwh = (self.soc_kwh + accepted * self.round_trip_efficiency).min(self.capacity_kwh);
        accepted
    }

    /// Requests `deficit_kwh`; returns the energy delivered to the load.
    pub fn discharge(&mut self, deficit_kwh: f64) -> f64 {
        if self.capacity_kwh <= 0.0 || deficit_kwh <= 0.0 {
            return 0.0;
        }
        let delivered = deficit_kwh.min(self.soc_kwh).min(self.max_power_kw).max(0.0);

        self.soc_kwh = (self.soc_kwh - delivered).max(0.0);
        delivered
    }
}
