//! Console reports for single runs and sweeps.

use crate::sim::finance::CcgtReference;
use crate::sim::metrics::SummaryMetrics;
use crate::sim::mix::CapacityMix;
use crate::sim::sweep::SweepOutcome;

/// Rows shown in the sweep ranking table.
const TOP_N: usize = 10;

pub fn print_mix(mix: &CapacityMix) {
    println!("\n--- Capacity Mix ---");
    println!("Solar:   {:>12.1} kW", mix.solar_kw());
    println!("Wind:    {:>12.1} kW", mix.wind_kw());
    match mix.storage_power_kw() {
        Some(p) => println!("Storage: {:>12.1} kWh / {p:.1} kW", mix.storage_energy_kwh()),
        None => println!("Storage: {:>12.1} kWh", mix.storage_energy_kwh()),
    }
    println!("Gas:     {:>12.1} kW", mix.gas_kw());
}

pub fn print_summary(metrics: &SummaryMetrics, solar_area_km2: f64) {
    println!();
    println!("{metrics}");
    println!("Solar land area:       {solar_area_km2:.3} km²");
}

pub fn print_ccgt_reference(reference: &CcgtReference, mix_cost_per_kwh: f64) {
    println!("\n--- CCGT Reference ---");
    println!("Plant size:            {:.1} kW", reference.capacity_kw);
    println!("Capex:                 ${:.0}", reference.capex);
    println!(
        "Levelized cost:        ${:.4}/kWh (mix: ${mix_cost_per_kwh:.4}/kWh)",
        reference.levelized_cost_per_kwh
    );
}

pub fn print_sweep(outcome: &SweepOutcome, max_lolp: f64) {
    println!("\n--- Sweep (LOLP <= {max_lolp}) ---");
    println!(
        "Evaluated: {}  Feasible: {}  Failed: {}  Skipped: {}",
        outcome.evaluations.len(),
        outcome.ranked.len(),
        outcome.failures.len(),
        outcome.skipped
    );

    if let Some(err) = &outcome.infeasible {
        println!("No feasible mix: {err}");
    }
    for f in &outcome.failures {
        println!("Candidate {} failed: {}", f.candidate.index, f.error);
    }

    let rows: Vec<_> = if outcome.is_feasible() {
        outcome.ranked.iter().take(TOP_N).collect()
    } else {
        outcome.best_effort.iter().collect()
    };
    if rows.is_empty() {
        return;
    }

    println!(
        "{:>4} {:>12} {:>12} {:>12} {:>12} {:>8} {:>10}",
        "#", "solar_kw", "wind_kw", "storage_kwh", "gas_kw", "lolp", "$/kWh"
    );
    for (rank, e) in rows.iter().enumerate() {
        println!(
            "{:>4} {:>12.1} {:>12.1} {:>12.1} {:>12.1} {:>8.4} {:>10.4}",
            rank + 1,
            e.mix.solar_kw(),
            e.mix.wind_kw(),
            e.mix.storage_energy_kwh(),
            e.mix.gas_kw(),
            e.metrics.loss_of_load_probability,
            e.metrics.levelized_cost_per_kwh
        );
    }

    let front = outcome.pareto_front();
    println!("Pareto front (cost vs. LOLP): {} mix(es)", front.len());

    if let Some(choice) = &outcome.choice {
        let mix = &choice.evaluation.mix;
        println!(
            "Selected system: {} (solar {:.1} kW, wind {:.1} kW, ${:.4}/kWh)",
            choice.system,
            mix.solar_kw(),
            mix.wind_kw(),
            choice.evaluation.metrics.levelized_cost_per_kwh
        );
        if let Some(improvement) = choice.improvement {
            println!(
                "Hybrid saving over best single renewable: {:.1}%",
                improvement * 100.0
            );
        }
    }
}
