//! Common types and helpers for synthetic hourly profiles.

use chrono::NaiveDateTime;
use rand::{Rng, rngs::StdRng};

pub use crate::sim::series::HOURS_PER_DAY;
use crate::sim::series::{HourlySeries, Unit};

/// A deterministic generator of one hourly quantity.
///
/// Implementors are stateful (RNG and any autoregressive state), so a profile
/// must be asked for hours in increasing order to be reproducible.
pub trait Profile {
    /// Value for hour `t` counted from the start of the series.
    fn value(&mut self, t: usize) -> f64;

    /// Unit of the produced values.
    fn unit(&self) -> Unit;

    /// Human-readable profile name.
    fn name(&self) -> &'static str;

    /// Materializes `hours` values starting at `start`.
    fn series(&mut self, start: NaiveDateTime, hours: usize) -> HourlySeries {
        let values = (0..hours).map(|t| self.value(t)).collect();
        HourlySeries::new(start, self.unit(), values)
    }
}

/// Gaussian noise via the Box-Muller transform.
///
/// # Arguments
///
/// * `rng` - Random number generator
/// * `std_dev` - Standard deviation of the noise
///
/// # Returns
///
/// A sample from N(0, `std_dev`²), or 0.0 when `std_dev` is not positive.
pub fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f64 = rng.random::<f64>().clamp(1e-12, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    z0 * std_dev
}

/// Half-cosine daylight shape: 0 outside `[sunrise, sunset)`, 1 at solar noon.
pub fn daylight_frac(hour_of_day: usize, sunrise: usize, sunset: usize) -> f64 {
    if hour_of_day < sunrise || hour_of_day >= sunset || sunrise >= sunset {
        return 0.0;
    }
    let span = (sunset - sunrise) as f64;
    // Sample the middle of the hour so dawn and dusk are symmetric.
    let x = (hour_of_day - sunrise) as f64 + 0.5;
    (std::f64::consts::PI * x / span).sin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn noise_is_zero_without_spread() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(gaussian_noise(&mut rng, 0.0), 0.0);
        assert_eq!(gaussian_noise(&mut rng, -1.0), 0.0);
    }

    #[test]
    fn noise_has_roughly_zero_mean() {
        let mut rng = StdRng::seed_from_u64(7);
        let n = 10_000;
        let mean: f64 = (0..n).map(|_| gaussian_noise(&mut rng, 1.0)).sum::<f64>() / n as f64;
        assert!(mean.abs() < 0.05);
    }

    #[test]
    fn daylight_is_symmetric_and_bounded() {
        assert_eq!(daylight_frac(5, 6, 18), 0.0);
        assert_eq!(daylight_frac(18, 6, 18), 0.0);
        assert!((daylight_frac(6, 6, 18) - daylight_frac(17, 6, 18)).abs() < 1e-12);
        for h in 0..24 {
            let f = daylight_frac(h, 6, 18);
            assert!((0.0..=1.0).contains(&f));
        }
        assert!(daylight_frac(11, 6, 18) > 0.95);
    }
}
