//! Parallel evaluation of many capacity mixes under a reliability constraint.

use std::cmp::Ordering as CmpOrdering;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::engine::simulate;
use super::metrics::SummaryMetrics;
use super::mix::CapacityMix;
use super::series::{HOURS_PER_DAY, HourlySeries, ResourceSeries};
use crate::error::{EvaluationError, InfeasibleError};

/// An inclusive, evenly spaced range of values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Axis {
    pub min: f64,
    pub max: f64,
    pub steps: usize,
}

impl Axis {
    /// A single-valued axis.
    pub fn fixed(value: f64) -> Self {
        Self {
            min: value,
            max: value,
            steps: 1,
        }
    }

    /// Evenly spaced values from `min` to `max` inclusive; one step yields `min`.
    ///
    /// ```
    /// use hybrid_dc_sim::sim::sweep::Axis;
    ///
    /// let a = Axis { min: 0.0, max: 100.0, steps: 5 };
    /// assert_eq!(a.values(), vec![0.0, 25.0, 50.0, 75.0, 100.0]);
    /// ```
    pub fn values(&self) -> Vec<f64> {
        match self.steps {
            0 => Vec::new(),
            1 => vec![self.min],
            n => {
                let step = (self.max - self.min) / (n - 1) as f64;
                (0..n).map(|i| self.min + step * i as f64).collect()
            }
        }
    }
}

/// Capacities proposed for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Candidate {
    /// Position in the strategy's enumeration order.
    pub index: usize,
    pub solar_kw: f64,
    pub wind_kw: f64,
    pub storage_kwh: f64,
    pub storage_power_kw: Option<f64>,
    pub gas_kw: f64,
}

/// How candidate mixes are generated.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchStrategy {
    /// Cartesian product of capacity axes.
    Grid {
        solar_kw: Axis,
        wind_kw: Axis,
        storage_kwh: Axis,
        gas_kw: Axis,
        /// Storage power = energy / duration; unconstrained when `None`.
        storage_duration_hours: Option<f64>,
    },
    /// For each solar share of renewable capacity, size the renewables so the
    /// `cutoff_day`-th worst day still covers the mean daily load; storage is
    /// sized in hours of peak load and gas backs up the whole peak.
    SolarFraction {
        fractions: Vec<f64>,
        cutoff_day: usize,
        solar_storage_hours: f64,
        wind_storage_hours: f64,
    },
}

impl SearchStrategy {
    /// Enumerates candidates for `series` in a deterministic order.
    pub fn candidates(&self, series: &ResourceSeries) -> Vec<Candidate> {
        match self {
            SearchStrategy::Grid {
                solar_kw,
                wind_kw,
                storage_kwh,
                gas_kw,
                storage_duration_hours,
            } => {
                let mut out = Vec::new();
                for &s in &solar_kw.values() {
                    for &w in &wind_kw.values() {
                        for &e in &storage_kwh.values() {
                            for &g in &gas_kw.values() {
                                let power = storage_duration_hours
                                    .filter(|_| e > 0.0)
                                    .map(|d| e / d);
                                out.push(Candidate {
                                    index: out.len(),
                                    solar_kw: s,
                                    wind_kw: w,
                                    storage_kwh: e,
                                    storage_power_kw: power,
                                    gas_kw: g,
                                });
                            }
                        }
                    }
                }
                out
            }
            SearchStrategy::SolarFraction {
                fractions,
                cutoff_day,
                solar_storage_hours,
                wind_storage_hours,
            } => {
                let solar_daily = sizing_days(&series.solar_cf);
                let wind_daily = sizing_days(&series.wind_cf);
                let daily_load = series.load.mean() * 24.0;
                let peak = series.load.peak();

                fractions
                    .iter()
                    .enumerate()
                    .map(|(index, &gamma)| {
                        let mut blended: Vec<f64> = solar_daily
                            .iter()
                            .zip(&wind_daily)
                            .map(|(s, w)| gamma * s + (1.0 - gamma) * w)
                            .collect();
                        blended.sort_by(f64::total_cmp);
                        let day = (*cutoff_day).min(blended.len().saturating_sub(1));
                        let yield_per_kw = blended.get(day).copied().unwrap_or(0.0);
                        // Non-finite capacity surfaces as a configuration failure.
                        let required_kw = if yield_per_kw > 0.0 {
                            daily_load / yield_per_kw
                        } else {
                            f64::INFINITY
                        };
                        let hours =
                            gamma * solar_storage_hours + (1.0 - gamma) * wind_storage_hours;
                        Candidate {
                            index,
                            solar_kw: required_kw * gamma,
                            wind_kw: required_kw * (1.0 - gamma),
                            storage_kwh: peak * hours,
                            storage_power_kw: None,
                            gas_kw: peak,
                        }
                    })
                    .collect()
            }
        }
    }
}

/// Daily capacity-factor totals used for worst-day sizing.
///
/// Only complete days are ranked. A series shorter than one day is
/// extrapolated to 24 hours.
fn sizing_days(series: &HourlySeries) -> Vec<f64> {
    let days = series.full_day_totals();
    if days.is_empty() && !series.is_empty() {
        vec![series.total() * HOURS_PER_DAY as f64 / series.len() as f64]
    } else {
        days
    }
}

/// Maximum acceptable loss-of-load probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReliabilityConstraint {
    pub max_lolp: f64,
}

/// One successfully evaluated candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub index: usize,
    pub mix: CapacityMix,
    pub metrics: SummaryMetrics,
}

/// Which generation technologies a mix relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SystemType {
    Hybrid,
    SolarGas,
    WindGas,
    GasOnly,
}

impl SystemType {
    pub fn of(mix: &CapacityMix) -> Self {
        match (mix.solar_kw() > 0.0, mix.wind_kw() > 0.0) {
            (true, true) => SystemType::Hybrid,
            (true, false) => SystemType::SolarGas,
            (false, true) => SystemType::WindGas,
            (false, false) => SystemType::GasOnly,
        }
    }

    pub fn is_single_renewable(self) -> bool {
        matches!(self, SystemType::SolarGas | SystemType::WindGas)
    }
}

impl fmt::Display for SystemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SystemType::Hybrid => "Hybrid",
            SystemType::SolarGas => "Solar + Gas",
            SystemType::WindGas => "Wind + Gas",
            SystemType::GasOnly => "Gas only",
        })
    }
}

/// The recommended system after weighing the cheapest feasible mix against
/// the cheapest feasible single-renewable mix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemChoice {
    pub system: SystemType,
    pub evaluation: Evaluation,
    /// Fractional cost reduction of the cheapest mix over the cheapest
    /// single-renewable mix. `None` when no single-renewable mix is feasible.
    pub improvement: Option<f64>,
}

/// Keeps the cheapest mix unless it beats the best single-renewable mix by
/// less than `threshold`, in which case the single-renewable mix wins.
///
/// `ranked` must be sorted cheapest first.
fn choose_system(ranked: &[Evaluation], threshold: f64) -> Option<SystemChoice> {
    let best = ranked.first()?;
    let Some(single) = ranked
        .iter()
        .find(|e| SystemType::of(&e.mix).is_single_renewable())
    else {
        return Some(SystemChoice {
            system: SystemType::of(&best.mix),
            evaluation: best.clone(),
            improvement: None,
        });
    };

    let best_cost = best.metrics.levelized_cost_per_kwh;
    let single_cost = single.metrics.levelized_cost_per_kwh;
    let improvement = if single_cost > 0.0 {
        (1.0 - best_cost / single_cost).max(0.0)
    } else {
        0.0
    };
    let chosen = if improvement >= threshold { best } else { single };
    Some(SystemChoice {
        system: SystemType::of(&chosen.mix),
        evaluation: chosen.clone(),
        improvement: Some(improvement),
    })
}

/// A candidate whose mix was invalid or whose run could not start.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateFailure {
    pub candidate: Candidate,
    pub error: EvaluationError,
}

/// Results of a sweep.
#[derive(Debug, Clone, Default)]
pub struct SweepOutcome {
    /// Every completed evaluation, in candidate order.
    pub evaluations: Vec<Evaluation>,
    /// Evaluations meeting the constraint, cheapest first.
    pub ranked: Vec<Evaluation>,
    /// Lowest-LOLP (then cheapest) evaluation when nothing is feasible.
    pub best_effort: Option<Evaluation>,
    /// Set when no evaluated candidate met the constraint.
    pub infeasible: Option<InfeasibleError>,
    pub failures: Vec<CandidateFailure>,
    /// Candidates not evaluated because the sweep stopped early.
    pub skipped: usize,
    /// Recommended system; `None` when nothing is feasible.
    pub choice: Option<SystemChoice>,
}

impl SweepOutcome {
    /// The cheapest feasible mix, or the best-effort mix if none is feasible.
    pub fn best(&self) -> Option<&Evaluation> {
        self.ranked.first().or(self.best_effort.as_ref())
    }

    pub fn is_feasible(&self) -> bool {
        !self.ranked.is_empty()
    }

    /// Evaluations not dominated in (levelized cost, loss-of-load probability),
    /// cheapest first.
    pub fn pareto_front(&self) -> Vec<&Evaluation> {
        let mut front: Vec<&Evaluation> = self
            .evaluations
            .iter()
            .filter(|e| !self.evaluations.iter().any(|o| dominates(o, e)))
            .collect();
        front.sort_by(|a, b| by_cost(a, b));
        front
    }
}

fn dominates(a: &Evaluation, b: &Evaluation) -> bool {
    let (ac, al) = (a.metrics.levelized_cost_per_kwh, a.metrics.loss_of_load_probability);
    let (bc, bl) = (b.metrics.levelized_cost_per_kwh, b.metrics.loss_of_load_probability);
    ac <= bc && al <= bl && (ac < bc || al < bl)
}

fn by_cost(a: &Evaluation, b: &Evaluation) -> CmpOrdering {
    a.metrics
        .levelized_cost_per_kwh
        .total_cmp(&b.metrics.levelized_cost_per_kwh)
        .then(a.index.cmp(&b.index))
}

fn by_reliability(a: &Evaluation, b: &Evaluation) -> CmpOrdering {
    a.metrics
        .loss_of_load_probability
        .total_cmp(&b.metrics.loss_of_load_probability)
        .then_with(|| by_cost(a, b))
}

/// Simulates `mix` and reduces the trace in one call.
///
/// # Errors
///
/// Returns a `SimulationError` (wrapped) on structural input problems.
pub fn evaluate_mix(
    series: &ResourceSeries,
    mix: &CapacityMix,
) -> Result<SummaryMetrics, EvaluationError> {
    let trace = simulate(series, mix)?;
    Ok(SummaryMetrics::from_trace(&trace, mix))
}

enum Outcome {
    Done(Evaluation),
    Failed(CandidateFailure),
    Skipped,
}

/// A configured sweep over a search space.
#[derive(Debug, Clone)]
pub struct Sweep {
    strategy: SearchStrategy,
    constraint: ReliabilityConstraint,
    stop_below_cost: Option<f64>,
    hybrid_threshold: f64,
}

impl Sweep {
    pub fn new(strategy: SearchStrategy, constraint: ReliabilityConstraint) -> Self {
        Self {
            strategy,
            constraint,
            stop_below_cost: None,
            hybrid_threshold: 0.0,
        }
    }

    /// Minimum fractional saving a mix must show over the cheapest
    /// single-renewable mix to be recommended instead of it.
    pub fn hybrid_threshold(mut self, fraction: f64) -> Self {
        self.hybrid_threshold = fraction;
        self
    }

    /// Stops scheduling new candidates once a feasible mix at or below
    /// `cost_per_kwh` has been found.
    pub fn stop_below_cost(mut self, cost_per_kwh: f64) -> Self {
        self.stop_below_cost = Some(cost_per_kwh);
        self
    }

    pub fn strategy(&self) -> &SearchStrategy {
        &self.strategy
    }

    pub fn constraint(&self) -> ReliabilityConstraint {
        self.constraint
    }

    /// Evaluates every candidate in parallel.
    ///
    /// Candidate mixes inherit efficiency and costs from `base`. A failing
    /// candidate is recorded in [`SweepOutcome::failures`] and never affects
    /// the others.
    pub fn run(&self, series: &ResourceSeries, base: &CapacityMix) -> SweepOutcome {
        let candidates = self.strategy.candidates(series);
        let max_lolp = self.constraint.max_lolp;
        info!(
            n_candidates = candidates.len(),
            max_lolp,
            stop_below_cost = ?self.stop_below_cost,
            "Starting sweep"
        );

        let stop = AtomicBool::new(false);
        let outcomes: Vec<Outcome> = candidates
            .par_iter()
            .map(|c| {
                if stop.load(Ordering::Relaxed) {
                    return Outcome::Skipped;
                }
                match self.evaluate(series, base, c) {
                    Ok(e) => {
                        let cheap_enough = self
                            .stop_below_cost
                            .is_some_and(|t| e.metrics.levelized_cost_per_kwh <= t);
                        if cheap_enough && e.metrics.meets(max_lolp) {
                            stop.store(true, Ordering::Relaxed);
                        }
                        Outcome::Done(e)
                    }
                    Err(error) => {
                        debug!(index = c.index, %error, "Candidate failed");
                        Outcome::Failed(CandidateFailure {
                            candidate: *c,
                            error,
                        })
                    }
                }
            })
            .collect();

        let mut out = SweepOutcome::default();
        for o in outcomes {
            match o {
                Outcome::Done(e) => out.evaluations.push(e),
                Outcome::Failed(f) => out.failures.push(f),
                Outcome::Skipped => out.skipped += 1,
            }
        }

        out.ranked = out
            .evaluations
            .iter()
            .filter(|e| e.metrics.meets(max_lolp))
            .cloned()
            .collect();
        out.ranked.sort_by(by_cost);

        if out.ranked.is_empty() {
            out.best_effort = out.evaluations.iter().min_by(|a, b| by_reliability(a, b)).cloned();
            let error = InfeasibleError {
                evaluated: out.evaluations.len(),
                max_lolp,
                best_lolp: out
                    .best_effort
                    .as_ref()
                    .map(|e| e.metrics.loss_of_load_probability),
            };
            warn!(%error, "Sweep found no feasible mix");
            out.infeasible = Some(error);
        }

        out.choice = choose_system(&out.ranked, self.hybrid_threshold);
        if let Some(c) = &out.choice {
            info!(
                system = %c.system,
                index = c.evaluation.index,
                improvement = ?c.improvement,
                threshold = self.hybrid_threshold,
                "System selected"
            );
        }

        info!(
            evaluated = out.evaluations.len(),
            feasible = out.ranked.len(),
            failed = out.failures.len(),
            skipped = out.skipped,
            best_cost = ?out.best().map(|e| e.metrics.levelized_cost_per_kwh),
            "Sweep complete"
        );
        out
    }

    fn evaluate(
        &self,
        series: &ResourceSeries,
        base: &CapacityMix,
        c: &Candidate,
    ) -> Result<Evaluation, EvaluationError> {
        let mix = base.with_capacities(
            c.solar_kw,
            c.wind_kw,
            c.storage_kwh,
            c.storage_power_kw,
            c.gas_kw,
        )?;
        let metrics = evaluate_mix(series, &mix)?;
        Ok(Evaluation {
            index: c.index,
            mix,
            metrics,
        })
    }
}
