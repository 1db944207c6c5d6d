//! Command-line argument parsing.

use std::env;
use std::path::PathBuf;

/// Parsed command-line options.
#[derive(Debug, Default, PartialEq)]
pub struct CliOptions {
    pub scenario: Option<PathBuf>,
    pub preset: Option<String>,
    pub seed: Option<u64>,
    pub trace_out: Option<PathBuf>,
    pub summary_json: Option<PathBuf>,
    /// Run the scenario's capacity sweep after the single run.
    pub sweep: bool,
    pub sweep_out: Option<PathBuf>,
    pub help: bool,
}

/// Parses the process arguments.
///
/// # Errors
///
/// Returns a message describing the first invalid argument.
pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(&args)
}

/// Parses `args` (without the program name).
///
/// # Errors
///
/// Returns a message for unknown flags, missing or malformed values,
/// repeated flags, or `--scenario` combined with `--preset`.
pub fn parse_args_from(args: &[String]) -> Result<CliOptions, String> {
    let mut opts = CliOptions::default();
    let mut i = 0usize;

    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                opts.help = true;
                return Ok(opts);
            }
            "--scenario" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --scenario (expected a TOML file path)")?;
                set_once(&mut opts.scenario, PathBuf::from(path), "--scenario")?;
            }
            "--preset" => {
                i += 1;
                let name = args.next_or_err(i, "missing value for --preset (expected a preset name)")?;
                set_once(&mut opts.preset, name.to_string(), "--preset")?;
            }
            "--seed" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --seed (expected a u64)")?;
                let seed = raw
                    .parse::<u64>()
                    .map_err(|_| format!("--seed value \"{raw}\" is not a valid u64"))?;
                set_once(&mut opts.seed, seed, "--seed")?;
            }
            "--trace-out" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --trace-out (expected a file path)")?;
                set_once(&mut opts.trace_out, PathBuf::from(path), "--trace-out")?;
            }
            "--summary-json" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --summary-json (expected a file path)")?;
                set_once(&mut opts.summary_json, PathBuf::from(path), "--summary-json")?;
            }
            "--sweep" => opts.sweep = true,
            "--sweep-out" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --sweep-out (expected a file path)")?;
                set_once(&mut opts.sweep_out, PathBuf::from(path), "--sweep-out")?;
                opts.sweep = true;
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if opts.scenario.is_some() && opts.preset.is_some() {
        return Err(
            "arguments `--scenario` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }

    Ok(opts)
}

fn set_once<T>(slot: &mut Option<T>, value: T, flag: &str) -> Result<(), String> {
    if slot.replace(value).is_some() {
        return Err(format!("{flag} provided more than once"));
    }
    Ok(())
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("hybrid-dc-sim: hourly dispatch of solar, wind, storage and gas for a data-center load");
    eprintln!();
    eprintln!("Usage: hybrid-dc-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load scenario from TOML config file");
    eprintln!("  --preset <name>          Use a built-in preset (baseline, solar_gas, wind_storage)");
    eprintln!("  --seed <u64>             Override random seed");
    eprintln!("  --trace-out <path>       Export the hourly dispatch trace to CSV");
    eprintln!("  --summary-json <path>    Export the summary metrics to JSON");
    eprintln!("  --sweep                  Run the scenario's capacity sweep");
    eprintln!("  --sweep-out <path>       Export sweep results to CSV (implies --sweep)");
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
}
