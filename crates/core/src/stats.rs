//! Per-request time-in-queue statistics (spec §6 "Output (stats)").
//!
//! The original aggregator keeps a hand-rolled sorted linked list per op
//! kind so it can report median without a second pass. A `Vec<u16>` sorted
//! once at report time is simpler and just as fast at the sizes a single
//! simulation run produces; see `SPEC_FULL.md` for why this supplemental
//! internal structure was chosen over the original's.

use std::fmt;

use crate::request::OpKind;

/// Min/max/mean/median summary of one op kind's recorded time-in-queue
/// samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    /// Smallest recorded time-in-queue.
    pub min: u16,
    /// Largest recorded time-in-queue.
    pub max: u16,
    /// Arithmetic mean, to three decimal places in the report.
    pub average: f64,
    /// Median, to one decimal place in the report.
    pub median: f64,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Min:{}", self.min)?;
        writeln!(f, "Max:{}", self.max)?;
        writeln!(f, "Average:{:.3}", self.average)?;
        write!(f, "Median:{:.1}", self.median)
    }
}

fn summarize(mut samples: Vec<u16>) -> Option<Summary> {
    if samples.is_empty() {
        return None;
    }
    samples.sort_unstable();
    let min = samples[0];
    let max = samples[samples.len() - 1];
    let sum: u64 = samples.iter().map(|&s| u64::from(s)).sum();
    #[allow(clippy::cast_precision_loss)]
    let average = sum as f64 / samples.len() as f64;
    let mid = samples.len() / 2;
    let median = if samples.len() % 2 == 0 {
        f64::from(samples[mid - 1] + samples[mid]) / 2.0
    } else {
        f64::from(samples[mid])
    };
    Some(Summary {
        min,
        max,
        average,
        median,
    })
}

/// Collects time-in-queue samples per op kind as requests complete, and
/// produces the final report on demand.
#[derive(Debug, Clone, Default)]
pub struct StatsCollector {
    ifetch: Vec<u16>,
    read: Vec<u16>,
    write: Vec<u16>,
}

impl StatsCollector {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one completed request's time-in-queue under its op kind.
    pub fn record(&mut self, kind: OpKind, time_in_queue: u16) {
        match kind {
            OpKind::Ifetch => self.ifetch.push(time_in_queue),
            OpKind::Read => self.read.push(time_in_queue),
            OpKind::Write => self.write.push(time_in_queue),
        }
    }

    /// Builds the final report, or `None` for a kind/total with no samples.
    #[must_use]
    pub fn report(&self) -> StatsReport {
        let all: Vec<u16> = self
            .ifetch
            .iter()
            .chain(&self.read)
            .chain(&self.write)
            .copied()
            .collect();
        StatsReport {
            ifetch: summarize(self.ifetch.clone()),
            read: summarize(self.read.clone()),
            write: summarize(self.write.clone()),
            total: summarize(all),
        }
    }
}

/// The final stats report: one summary per op kind plus an overall total.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsReport {
    /// IFETCH time-in-queue summary, or `None` if no IFETCH completed.
    pub ifetch: Option<Summary>,
    /// READ time-in-queue summary, or `None` if no READ completed.
    pub read: Option<Summary>,
    /// WRITE time-in-queue summary, or `None` if no WRITE completed.
    pub write: Option<Summary>,
    /// Summary across every completed request, or `None` if none completed.
    pub total: Option<Summary>,
}

impl fmt::Display for StatsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, section) in [
            ("IFETCHES", self.ifetch),
            ("READS", self.read),
            ("WRITES", self.write),
            ("TOTAL", self.total),
        ] {
            writeln!(f, "--{label}:")?;
            if let Some(summary) = section {
                writeln!(f, "{summary}")?;
            } else {
                writeln!(f, "(no samples)")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_of_even_sample_count_averages_middle_pair() {
        let summary = summarize(vec![10, 20, 30, 40]).unwrap();
        assert_eq!(summary.median, 25.0);
        assert_eq!(summary.min, 10);
        assert_eq!(summary.max, 40);
        assert!((summary.average - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn median_of_odd_sample_count_is_middle_value() {
        let summary = summarize(vec![5, 1, 9]).unwrap();
        assert_eq!(summary.median, 5.0);
    }

    #[test]
    fn empty_samples_produce_no_summary() {
        assert!(summarize(Vec::new()).is_none());
    }

    #[test]
    fn collector_buckets_by_kind_and_reports_total() {
        let mut stats = StatsCollector::new();
        stats.record(OpKind::Read, 10);
        stats.record(OpKind::Write, 20);
        stats.record(OpKind::Ifetch, 30);
        let report = stats.report();
        assert!(report.read.is_some());
        assert!(report.write.is_some());
        assert!(report.ifetch.is_some());
        assert_eq!(report.total.unwrap().min, 10);
        assert_eq!(report.total.unwrap().max, 30);
    }

    #[test]
    fn report_display_matches_section_format() {
        let mut stats = StatsCollector::new();
        stats.record(OpKind::Read, 10);
        let output = stats.report().to_string();
        assert!(output.contains("--READS:\nMin:10"));
        assert!(output.contains("--IFETCHES:\n(no samples)"));
    }
}
