//! File import and export.

/// Trace, sweep and summary writers.
pub mod export;
/// `timestamp,value` series reader.
pub mod import;
