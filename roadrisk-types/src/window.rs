//! Outputs of windowed analytic queries.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::event::{MAX_SEVERITY, MIN_SEVERITY};

/// Event count for a single calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: u64,
}

/// Daily counts over a trailing window, oldest day first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub series: Vec<DailyCount>,
    /// Number of events that landed in a bucket
    pub total: u64,
}

impl TimeSeries {
    /// Zero-filled series covering `days` days ending at `end` (inclusive).
    ///
    /// Returns `None` for `days == 0` or when the first day would fall before
    /// the earliest representable date.
    pub fn empty_window(end: NaiveDate, days: u32) -> Option<Self> {
        let back = days.checked_sub(1)?;
        let start = end.checked_sub_days(Days::new(u64::from(back)))?;
        let series = start
            .iter_days()
            .take(days as usize)
            .map(|date| DailyCount { date, count: 0 })
            .collect();
        Some(Self { series, total: 0 })
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.series.first().map(|d| d.date)
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.series.last().map(|d| d.date)
    }

    /// Count one event on `date`. Returns `false` if the date is outside the window.
    pub fn record(&mut self, date: NaiveDate) -> bool {
        let Some(start) = self.start() else {
            return false;
        };
        let offset = (date - start).num_days();
        if offset < 0 {
            return false;
        }
        match self.series.get_mut(offset as usize) {
            Some(bucket) => {
                bucket.count += 1;
                self.total += 1;
                true
            }
            None => false,
        }
    }
}

/// Severity histogram and summary statistics for a query window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeveritySummary {
    /// Severity value to event count, always keyed `1..=5`
    pub histogram: BTreeMap<u8, u64>,
    pub total: u64,
    /// Mean severity, `0.0` when `total == 0`
    pub avg_severity: f64,
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
}

impl Default for SeveritySummary {
    fn default() -> Self {
        Self {
            histogram: (MIN_SEVERITY..=MAX_SEVERITY).map(|s| (s, 0)).collect(),
            total: 0,
            avg_severity: 0.0,
            min_date: None,
            max_date: None,
        }
    }
}

impl SeveritySummary {
    pub fn count(&self, severity: u8) -> u64 {
        self.histogram.get(&severity).copied().unwrap_or(0)
    }
}
