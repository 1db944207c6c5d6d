//! Drives the built binary against the bundled scenarios.

use std::fs;
use std::process::{Command, Output};

#[derive(Debug)]
struct Report {
    lolp: f64,
    penetration_pct: f64,
    cost_per_kwh: f64,
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_hybrid-dc-sim"))
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("hybrid-dc-sim process should run: {e}"))
}

fn run_and_parse(args: &[&str]) -> Report {
    let output = run(args);
    assert!(
        output.status.success(),
        "run failed for {args:?}: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    Report {
        lolp: parse_metric(&stdout, "Loss of load:", "LOLP", ")"),
        penetration_pct: parse_metric(&stdout, "Renewable penetration:", ":", "%"),
        cost_per_kwh: parse_metric(&stdout, "Levelized cost:", ":", "$/kWh"),
    }
}

/// Extracts the number between `after` and `before` on the first line starting with `label`.
fn parse_metric(stdout: &str, label: &str, after: &str, before: &str) -> f64 {
    let line = stdout
        .lines()
        .find(|line| line.trim_start().starts_with(label))
        .unwrap_or_else(|| panic!("missing line `{label}` in output: {stdout}"));
    let raw = line
        .split_once(after)
        .and_then(|(_, right)| right.split_once(before))
        .map(|(value, _)| value.trim())
        .unwrap_or_else(|| panic!("invalid format for line `{line}`"));
    raw.parse()
        .unwrap_or_else(|e| panic!("`{raw}` in `{line}` is not a number: {e}"))
}

#[test]
fn scenario_files_run_and_produce_distinct_results() {
    let baseline = run_and_parse(&["--scenario", "scenarios/baseline.toml"]);
    let solar_gas = run_and_parse(&["--scenario", "scenarios/solar_gas.toml"]);
    let wind_storage = run_and_parse(&["--scenario", "scenarios/wind_storage.toml"]);

    for r in [&baseline, &solar_gas, &wind_storage] {
        assert!((0.0..=1.0).contains(&r.lolp), "{r:?}");
        assert!(r.cost_per_kwh.is_finite() && r.cost_per_kwh > 0.0, "{r:?}");
    }
    // Full gas backup in both
    assert_eq!(baseline.lolp, 0.0);
    assert_eq!(solar_gas.lolp, 0.0);
    assert!(
        (baseline.penetration_pct - solar_gas.penetration_pct).abs() > 1.0,
        "expected penetration to differ: baseline={baseline:?}, solar_gas={solar_gas:?}"
    );
    assert!(
        wind_storage.penetration_pct > solar_gas.penetration_pct,
        "wind_storage={wind_storage:?}, solar_gas={solar_gas:?}"
    );
}

#[test]
fn presets_run_via_cli() {
    for preset in ["baseline", "solar_gas", "wind_storage"] {
        let r = run_and_parse(&["--preset", preset, "--seed", "7"]);
        assert!(r.lolp.is_finite(), "{preset}: {r:?}");
    }
}

#[test]
fn exports_trace_summary_and_sweep() {
    let dir = std::env::temp_dir().join(format!("hybrid-dc-sim-cli-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap_or_else(|e| panic!("{e}"));
    let trace = dir.join("trace.csv");
    let summary = dir.join("summary.json");
    let sweep = dir.join("sweep.csv");

    let output = run(&[
        "--scenario",
        "scenarios/solar_gas.toml",
        "--trace-out",
        trace.to_str().unwrap_or_default(),
        "--summary-json",
        summary.to_str().unwrap_or_default(),
        "--sweep-out",
        sweep.to_str().unwrap_or_default(),
    ]);
    assert!(
        output.status.success(),
        "stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let trace_csv = fs::read_to_string(&trace).unwrap_or_default();
    assert_eq!(trace_csv.lines().count(), 8761);
    assert!(trace_csv.starts_with("hour,timestamp,load_kwh"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&summary).unwrap_or_default())
            .unwrap_or_else(|e| panic!("summary should be JSON: {e}"));
    assert_eq!(json["metrics"]["hours"], 8760);

    // 7 solar sizes x 2 gas sizes
    let sweep_csv = fs::read_to_string(&sweep).unwrap_or_default();
    assert_eq!(sweep_csv.lines().count(), 15);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--- Sweep"));
    // gas alone covers peak load, so some mix is always feasible
    assert!(stdout.contains("Selected system:"), "stdout={stdout}");

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn invalid_arguments_fail() {
    let output = run(&["--preset", "nonexistent"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown preset"));

    let output = run(&["--seed", "abc"]);
    assert!(!output.status.success());
}

#[test]
fn help_exits_cleanly() {
    let output = run(&["--help"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage:"));
}
