use rand::{SeedableRng, rngs::StdRng};

use super::types::{Profile, gaussian_noise};
use crate::sim::series::Unit;

/// Synthetic wind capacity-factor profile with persistent weather (AR(1)).
///
/// The capacity factor evolves as:
/// ```text
/// cf(t) = alpha * cf(t-1) + (1 - alpha) * mean_cf + epsilon(t)
/// ```
/// where `epsilon` is Gaussian noise, clamped to `[0, 1]`. Higher `alpha`
/// gives longer calm and windy spells.
#[derive(Debug, Clone)]
pub struct WindProfile {
    /// Long-run mean capacity factor.
    pub mean_cf: f64,

    /// AR(1) persistence (0.0 = uncorrelated, 1.0 = frozen).
    pub alpha: f64,

    /// Standard deviation of the hourly innovation.
    pub noise_std: f64,

    state: f64,
    rng: StdRng,
}

impl WindProfile {
    /// Creates a wind profile starting at its mean.
    pub fn new(mean_cf: f64, alpha: f64, noise_std: f64, seed: u64) -> Self {
        let mean_cf = mean_cf.clamp(0.0, 1.0);
        Self {
            mean_cf,
            alpha: alpha.clamp(0.0, 1.0),
            noise_std: noise_std.max(0.0),
            state: mean_cf,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Profile for WindProfile {
    fn value(&mut self, _t: usize) -> f64 {
        let epsilon = gaussian_noise(&mut self.rng, self.noise_std);
        self.state = self.alpha * self.state + (1.0 - self.alpha) * self.mean_cf + epsilon;
        self.state = self.state.clamp(0.0, 1.0);
        self.state
    }

    fn unit(&self) -> Unit {
        Unit::CapacityFactor
    }

    fn name(&self) -> &'static str {
        "wind"
    }
}
