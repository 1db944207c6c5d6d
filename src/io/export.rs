//! CSV and JSON export of dispatch traces, sweep rankings and summaries.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use crate::sim::metrics::SummaryMetrics;
use crate::sim::mix::CapacityMix;
use crate::sim::sweep::{Evaluation, SweepOutcome};
use crate::sim::types::DispatchTrace;

/// Column header for dispatch trace export.
pub const TRACE_HEADER: &str = "hour,timestamp,load_kwh,solar_available_kwh,wind_available_kwh,\
                                solar_kwh,wind_kwh,storage_charge_kwh,storage_discharge_kwh,\
                                gas_kwh,unmet_kwh,curtailed_kwh,soc_kwh";

/// Column header for sweep export.
pub const SWEEP_HEADER: &str = "rank,index,feasible,solar_kw,wind_kw,storage_kwh,storage_power_kw,\
                                gas_kw,lolp,unmet_kwh,renewable_penetration,curtailment_fraction,\
                                levelized_cost_per_kwh,emissions_kg";

/// Exports a dispatch trace to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_trace_csv(trace: &DispatchTrace, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_trace_csv(trace, io::BufWriter::new(file))
}

/// Writes one row per simulated hour to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_trace_csv(trace: &DispatchTrace, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(TRACE_HEADER.split(',').map(str::trim))?;

    for r in trace {
        wtr.write_record(&[
            r.hour.to_string(),
            trace.timestamp(r.hour).format("%Y-%m-%d %H:%M").to_string(),
            format!("{:.4}", r.load_kwh),
            format!("{:.4}", r.solar_available_kwh),
            format!("{:.4}", r.wind_available_kwh),
            format!("{:.4}", r.solar_kwh),
            format!("{:.4}", r.wind_kwh),
            format!("{:.4}", r.storage_charge_kwh),
            format!("{:.4}", r.storage_discharge_kwh),
            format!("{:.4}", r.gas_kwh),
            format!("{:.4}", r.unmet_kwh),
            format!("{:.4}", r.curtailed_kwh),
            format!("{:.4}", r.soc_kwh),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports every evaluated candidate of a sweep to a CSV file.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_sweep_csv(outcome: &SweepOutcome, max_lolp: f64, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_sweep_csv(outcome, max_lolp, io::BufWriter::new(file))
}

/// Writes ranked feasible mixes first (rank 1 is cheapest), then the
/// infeasible ones in candidate order with an empty rank.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_sweep_csv(outcome: &SweepOutcome, max_lolp: f64, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(SWEEP_HEADER.split(',').map(str::trim))?;

    let infeasible = outcome
        .evaluations
        .iter()
        .filter(|e| !e.metrics.meets(max_lolp));
    let rows = outcome
        .ranked
        .iter()
        .enumerate()
        .map(|(i, e)| (Some(i + 1), e))
        .chain(infeasible.map(|e| (None, e)));

    for (rank, e) in rows {
        wtr.write_record(sweep_row(rank, e, max_lolp))?;
    }

    wtr.flush()?;
    Ok(())
}

fn sweep_row(rank: Option<usize>, e: &Evaluation, max_lolp: f64) -> Vec<String> {
    let m = &e.metrics;
    vec![
        rank.map(|r| r.to_string()).unwrap_or_default(),
        e.index.to_string(),
        m.meets(max_lolp).to_string(),
        format!("{:.3}", e.mix.solar_kw()),
        format!("{:.3}", e.mix.wind_kw()),
        format!("{:.3}", e.mix.storage_energy_kwh()),
        e.mix
            .storage_power_kw()
            .map(|p| format!("{p:.3}"))
            .unwrap_or_default(),
        format!("{:.3}", e.mix.gas_kw()),
        format!("{:.6}", m.loss_of_load_probability),
        format!("{:.4}", m.unmet_energy_kwh),
        format!("{:.6}", m.renewable_penetration),
        format!("{:.6}", m.curtailment_fraction),
        format!("{:.6}", m.levelized_cost_per_kwh),
        format!("{:.3}", m.gas_emissions_kg),
    ]
}

#[derive(Serialize)]
struct SummaryDocument<'a> {
    mix: &'a CapacityMix,
    metrics: &'a SummaryMetrics,
}

/// Writes the mix and its summary metrics as pretty-printed JSON.
///
/// An unserved run has an infinite levelized cost, which JSON renders as `null`.
///
/// # Errors
///
/// Returns an `io::Error` if serialization or writing fails.
pub fn write_summary_json(
    mix: &CapacityMix,
    metrics: &SummaryMetrics,
    mut writer: impl Write,
) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut writer, &SummaryDocument { mix, metrics })?;
    writeln!(writer)
}

/// Exports the summary JSON to a file.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_summary_json(mix: &CapacityMix, metrics: &SummaryMetrics, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_summary_json(mix, metrics, io::BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::engine::simulate;
    use crate::sim::series::{ResourceSeries, default_start};
    use crate::sim::sweep::{Axis, ReliabilityConstraint, SearchStrategy, Sweep};

    fn fixture() -> (ResourceSeries, CapacityMix) {
        let solar: Vec<f64> = (0..24).map(|h| if (6..=18).contains(&h) { 1.0 } else { 0.0 }).collect();
        let series = ResourceSeries::from_values(default_start(), solar, vec![0.2; 24], vec![100.0; 24])
            .unwrap_or_else(|e| panic!("{e}"));
        let mix = CapacityMix::builder()
            .solar_kw(100.0)
            .wind_kw(50.0)
            .storage(200.0, Some(50.0), 0.9)
            .gas_kw(60.0)
            .build()
            .unwrap_or_else(|e| panic!("{e}"));
        (series, mix)
    }

    fn to_string(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap_or_default()
    }

    #[test]
    fn trace_header_and_row_count() {
        let (series, mix) = fixture();
        let trace = simulate(&series, &mix).unwrap_or_else(|e| panic!("{e}"));
        let mut buf = Vec::new();
        write_trace_csv(&trace, &mut buf).ok();
        let output = to_string(buf);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 25);
        assert!(lines[0].starts_with("hour,timestamp,load_kwh"));
        assert!(lines[1].starts_with("0,2022-01-01 00:00,100.0000"));
    }

    #[test]
    fn trace_is_parseable_with_numeric_columns() {
        let (series, mix) = fixture();
        let trace = simulate(&series, &mix).unwrap_or_else(|e| panic!("{e}"));
        let mut buf = Vec::new();
        write_trace_csv(&trace, &mut buf).ok();

        let mut rdr = csv::ReaderBuilder::new().from_reader(buf.as_slice());
        assert_eq!(rdr.headers().map(csv::StringRecord::len).ok(), Some(13));
        for record in rdr.records() {
            let rec = record.unwrap_or_else(|e| panic!("{e}"));
            for i in 2..13 {
                assert!(rec[i].parse::<f64>().is_ok(), "column {i} should parse as f64");
            }
        }
    }

    #[test]
    fn sweep_rows_ranked_then_infeasible() {
        let (series, mix) = fixture();
        let strategy = SearchStrategy::Grid {
            solar_kw: Axis::fixed(100.0),
            wind_kw: Axis::fixed(0.0),
            storage_kwh: Axis::fixed(0.0),
            gas_kw: Axis { min: 0.0, max: 200.0, steps: 3 },
            storage_duration_hours: None,
        };
        let constraint = ReliabilityConstraint { max_lolp: 0.0 };
        let outcome = Sweep::new(strategy, constraint).run(&series, &mix);

        let mut buf = Vec::new();
        write_sweep_csv(&outcome, 0.0, &mut buf).ok();
        let output = to_string(buf);
        let rows: Vec<&str> = output.lines().skip(1).collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].starts_with("1,"));
        assert!(rows[1].starts_with("2,"));
        assert!(rows[2].starts_with(",0,false"));
    }

    #[test]
    fn summary_json_has_mix_and_metrics() {
        let (series, mix) = fixture();
        let trace = simulate(&series, &mix).unwrap_or_else(|e| panic!("{e}"));
        let metrics = SummaryMetrics::from_trace(&trace, &mix);
        let mut buf = Vec::new();
        write_summary_json(&mix, &metrics, &mut buf).ok();
        let value: serde_json::Value =
            serde_json::from_slice(&buf).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(value["mix"]["solar_kw"], 100.0);
        assert_eq!(value["metrics"]["hours"], 24);
    }
}
