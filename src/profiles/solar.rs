use rand::{SeedableRng, rngs::StdRng};

use super::types::{HOURS_PER_DAY, Profile, daylight_frac, gaussian_noise};
use crate::sim::series::Unit;

/// Synthetic solar capacity-factor profile.
///
/// A half-cosine shape between sunrise and sunset, scaled by a peak capacity
/// factor, optionally modulated by season (lowest at the start of the year)
/// and perturbed by multiplicative Gaussian noise. Output is clamped to
/// `[0, 1]`.
#[derive(Debug, Clone)]
pub struct SolarProfile {
    /// Capacity factor at solar noon on an average day.
    pub peak_cf: f64,

    /// Hour of day when generation starts (inclusive).
    pub sunrise_hour: usize,

    /// Hour of day when generation ends (exclusive).
    pub sunset_hour: usize,

    /// Relative swing between summer and winter (0 disables seasons).
    pub seasonal_amplitude: f64,

    /// Standard deviation of the multiplicative noise.
    pub noise_std: f64,

    rng: StdRng,
}

impl SolarProfile {
    /// Creates a solar profile.
    ///
    /// # Arguments
    ///
    /// * `peak_cf` - Noon capacity factor (clamped to `[0, 1]`)
    /// * `sunrise_hour` - First generating hour of each day
    /// * `sunset_hour` - First dark hour after the generating window
    /// * `seasonal_amplitude` - e.g. 0.3 for ±30% between solstices
    /// * `noise_std` - e.g. 0.1 for ±10% hour-to-hour variation
    /// * `seed` - Random seed for reproducible noise
    pub fn new(
        peak_cf: f64,
        sunrise_hour: usize,
        sunset_hour: usize,
        seasonal_amplitude: f64,
        noise_std: f64,
        seed: u64,
    ) -> Self {
        Self {
            peak_cf: peak_cf.clamp(0.0, 1.0),
            sunrise_hour,
            sunset_hour,
            seasonal_amplitude: seasonal_amplitude.clamp(0.0, 1.0),
            noise_std: noise_std.max(0.0),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn seasonal_factor(&self, day: usize) -> f64 {
        let phase = 2.0 * std::f64::consts::PI * (day % 365) as f64 / 365.0;
        1.0 - self.seasonal_amplitude * phase.cos()
    }
}

impl Profile for SolarProfile {
    fn value(&mut self, t: usize) -> f64 {
        let frac = daylight_frac(t % HOURS_PER_DAY, self.sunrise_hour, self.sunset_hour);
        if frac <= 0.0 {
            return 0.0;
        }
        let noise = gaussian_noise(&mut self.rng, self.noise_std);
        let cf = self.peak_cf * frac * self.seasonal_factor(t / HOURS_PER_DAY) * (1.0 + noise);
        cf.clamp(0.0, 1.0)
    }

    fn unit(&self) -> Unit {
        Unit::CapacityFactor
    }

    fn name(&self) -> &'static str {
        "solar"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::series::default_start;

    #[test]
    fn test_no_generation_at_night() {
        let mut pv = SolarProfile::new(0.9, 6, 18, 0.0, 0.0, 42);
        assert_eq!(pv.value(0), 0.0);
        assert_eq!(pv.value(5), 0.0);
        assert_eq!(pv.value(18), 0.0);
        assert_eq!(pv.value(23), 0.0);
    }

    #[test]
    fn test_peak_near_noon() {
        let mut pv = SolarProfile::new(0.9, 6, 18, 0.0, 0.0, 42);
        let noon = pv.value(12);
        assert!(noon > 0.85 && noon <= 0.9);
    }

    #[test]
    fn test_deterministic_with_same_seed() {
        let start = default_start();
        let a = SolarProfile::new(0.8, 6, 18, 0.3, 0.1, 42).series(start, 72);
        let b = SolarProfile::new(0.8, 6, 18, 0.3, 0.1, 42).series(start, 72);
        assert_eq!(a, b);
    }

    #[test]
    fn test_capacity_factor_bounds() {
        let s = SolarProfile::new(1.0, 5, 20, 0.5, 0.5, 3).series(default_start(), 24 * 30);
        assert!(s.values.iter().all(|v| (0.0..=1.0).contains(v)));
        assert_eq!(s.unit, Unit::CapacityFactor);
    }

    #[test]
    fn test_summer_outproduces_winter() {
        let mut pv = SolarProfile::new(0.8, 6, 18, 0.3, 0.0, 1);
        let winter = pv.value(12);
        let summer = pv.value(182 * 24 + 12);
        assert!(summer > winter);
    }
}
