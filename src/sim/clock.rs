//! Hour-by-hour traversal of a dispatch run.

use std::ops::Range;

use chrono::{Duration, NaiveDateTime};

use super::series::HOURS_PER_DAY;

/// One simulated hour: its position in the run and its wall-clock start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hour {
    pub index: usize,
    pub timestamp: NaiveDateTime,
}

impl Hour {
    /// Zero-based day of the run this hour falls in.
    pub fn day(&self) -> usize {
        self.index / HOURS_PER_DAY
    }
}

/// Yields every hour of a run exactly once, in order.
///
/// ```
/// use hybrid_dc_sim::sim::clock::HourClock;
/// use hybrid_dc_sim::sim::series::default_start;
///
/// let clock = HourClock::new(default_start(), 26);
/// let last = clock.last().map(|h| (h.index, h.day()));
/// assert_eq!(last, Some((25, 1)));
/// ```
#[derive(Debug, Clone)]
pub struct HourClock {
    start: NaiveDateTime,
    hours: Range<usize>,
}

impl HourClock {
    pub fn new(start: NaiveDateTime, hours: usize) -> Self {
        Self {
            start,
            hours: 0..hours,
        }
    }
}

impl Iterator for HourClock {
    type Item = Hour;

    fn next(&mut self) -> Option<Hour> {
        let index = self.hours.next()?;
        Some(Hour {
            index,
            timestamp: self.start + Duration::hours(index as i64),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.hours.size_hint()
    }
}

impl ExactSizeIterator for HourClock {}
