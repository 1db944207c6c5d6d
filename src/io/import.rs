//! CSV import of irregular hourly series.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime};

use crate::error::ImportError;
use crate::sim::series::{RawSeries, Sample, Unit};

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Reads a two-column `timestamp,value` CSV file into a [`RawSeries`].
///
/// The first row is a header. An empty value marks a missing sample; the
/// series provider later interpolates or rejects it.
///
/// # Errors
///
/// Returns an `ImportError` if the file cannot be opened or a row cannot
/// be parsed.
pub fn read_series_csv(path: &Path, name: &str, unit: Unit) -> Result<RawSeries, ImportError> {
    let label = path.display().to_string();
    let file = File::open(path).map_err(|source| ImportError::Io {
        path: label.clone(),
        source,
    })?;
    read_series(file, name, unit, &label)
}

/// Reads a `timestamp,value` CSV from any reader.
///
/// `label` names the source in error messages.
///
/// # Errors
///
/// Returns an `ImportError` on malformed CSV, timestamps or values.
pub fn read_series(
    reader: impl Read,
    name: &str,
    unit: Unit,
    label: &str,
) -> Result<RawSeries, ImportError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(reader);

    let csv_err = |source| ImportError::Csv {
        path: label.to_string(),
        source,
    };

    let mut samples = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(csv_err)?;
        let line = record.position().map_or(0, csv::Position::line);
        let parse_err = |message: String| ImportError::Parse {
            path: label.to_string(),
            line,
            message,
        };

        if record.len() < 2 {
            return Err(parse_err(format!("expected 2 columns, found {}", record.len())));
        }
        let timestamp = parse_timestamp(&record[0])
            .ok_or_else(|| parse_err(format!("unrecognized timestamp \"{}\"", &record[0])))?;
        let value = match &record[1] {
            "" => None,
            raw => Some(
                raw.parse::<f64>()
                    .map_err(|e| parse_err(format!("value \"{raw}\": {e}")))?,
            ),
        };
        samples.push(Sample { timestamp, value });
    }

    Ok(RawSeries::new(name, unit, samples))
}

/// Parses the timestamp layouts commonly found in hourly exports.
///
/// Offsets in RFC 3339 input are normalized to UTC.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}
