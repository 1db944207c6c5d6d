//! Hybrid data-center supply simulator entry point: CLI wiring and config-driven runs.

use std::process;

use tracing::info;

use hybrid_dc_sim::cli::{parse_args, print_usage};
use hybrid_dc_sim::config::ScenarioConfig;
use hybrid_dc_sim::io::export::{export_summary_json, export_sweep_csv, export_trace_csv};
use hybrid_dc_sim::reporting::{print_ccgt_reference, print_mix, print_summary, print_sweep};
use hybrid_dc_sim::sim::engine::DispatchEngine;
use hybrid_dc_sim::sim::metrics::SummaryMetrics;
use hybrid_dc_sim::telemetry::init_tracing;

/// Prints `msg` and exits with status 1.
fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("error: {msg}");
    process::exit(1);
}

fn main() {
    init_tracing();

    let cli = match parse_args() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("error: {e}");
            print_usage();
            process::exit(1);
        }
    };
    if cli.help {
        print_usage();
        return;
    }

    // --scenario takes priority, then --preset, then baseline default
    let loaded = match (&cli.scenario, &cli.preset) {
        (Some(path), _) => ScenarioConfig::from_toml_file(path),
        (None, Some(name)) => ScenarioConfig::from_preset(name),
        (None, None) => Ok(ScenarioConfig::baseline()),
    };
    let mut scenario = loaded.unwrap_or_else(|e| fail(e));

    if let Some(seed) = cli.seed {
        scenario.simulation.seed = seed;
    }

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let series = scenario.resource_series().unwrap_or_else(|e| fail(e));
    let mix = scenario.capacity_mix().unwrap_or_else(|e| fail(e));
    info!(
        hours = series.hours(),
        start = %series.start(),
        peak_load_kw = series.load.peak(),
        "Resource series ready"
    );

    let trace = DispatchEngine::seeded(&series, &mix, scenario.initial_soc_kwh(&mix))
        .map(DispatchEngine::run)
        .unwrap_or_else(|e| fail(e));
    let metrics = SummaryMetrics::from_trace(&trace, &mix);

    print_mix(&mix);
    print_summary(&metrics, scenario.solar_area_km2(mix.solar_kw()));
    print_ccgt_reference(
        &scenario.ccgt_reference(&series),
        metrics.levelized_cost_per_kwh,
    );

    if let Some(path) = &cli.trace_out {
        if let Err(e) = export_trace_csv(&trace, path) {
            fail(format!("failed to write trace CSV: {e}"));
        }
        eprintln!("Trace written to {}", path.display());
    }
    if let Some(path) = &cli.summary_json {
        if let Err(e) = export_summary_json(&mix, &metrics, path) {
            fail(format!("failed to write summary JSON: {e}"));
        }
        eprintln!("Summary written to {}", path.display());
    }

    if cli.sweep {
        let sweep = scenario.sweep();
        let max_lolp = sweep.constraint().max_lolp;
        let outcome = sweep.run(&series, &mix);
        print_sweep(&outcome, max_lolp);

        if let Some(path) = &cli.sweep_out {
            if let Err(e) = export_sweep_csv(&outcome, max_lolp, path) {
                fail(format!("failed to write sweep CSV: {e}"));
            }
            eprintln!("Sweep written to {}", path.display());
        }
    }
}
