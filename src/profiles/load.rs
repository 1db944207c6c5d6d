use rand::{SeedableRng, rngs::StdRng};

use super::types::{Profile, gaussian_noise};
use crate::sim::series::Unit;

/// A flat data-center load with small random variation.
///
/// # Examples
///
/// ```
/// use hybrid_dc_sim::profiles::{DataCenterLoad, Profile};
///
/// let mut load = DataCenterLoad::new(1000.0, 0.0, 42);
/// assert_eq!(load.value(0), 1000.0);
/// ```
#[derive(Debug, Clone)]
pub struct DataCenterLoad {
    /// Average demand in kW (one hour of it is that many kWh).
    pub base_kw: f64,

    /// Relative standard deviation of the hourly noise.
    pub noise_std: f64,

    rng: StdRng,
}

impl DataCenterLoad {
    pub fn new(base_kw: f64, noise_std: f64, seed: u64) -> Self {
        Self {
            base_kw: base_kw.max(0.0),
            noise_std: noise_std.max(0.0),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Profile for DataCenterLoad {
    /// Demand for one hour, never negative.
    fn value(&mut self, _t: usize) -> f64 {
        let noise = gaussian_noise(&mut self.rng, self.noise_std);
        (self.base_kw * (1.0 + noise)).max(0.0)
    }

    fn unit(&self) -> Unit {
        Unit::Kilowatts
    }

    fn name(&self) -> &'static str {
        "load"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::series::default_start;

    #[test]
    fn load_is_non_negative() {
        let s = DataCenterLoad::new(100.0, 2.0, 42).series(default_start(), 500);
        assert!(s.values.iter().all(|&v| v >= 0.0));
        assert_eq!(s.unit, Unit::Kilowatts);
    }

    #[test]
    fn different_seeds_differ() {
        let a = DataCenterLoad::new(100.0, 0.05, 1).series(default_start(), 24);
        let b = DataCenterLoad::new(100.0, 0.05, 2).series(default_start(), 24);
        assert_ne!(a.values, b.values);
    }
}
