//! Summary statistics over a dataset
//!
//! Computes mean, minimum and maximum for the three numeric series in a
//! single pass over the samples.

use crate::types::{Dataset, LoadTestError, Result, Sample};
use serde::Serialize;

/// Mean, minimum and maximum of one numeric series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// Running accumulator for one series
#[derive(Debug, Clone, Copy)]
struct Accumulator {
    sum: f64,
    min: f64,
    max: f64,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    fn push(&mut self, value: f64) {
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    fn finish(self, count: usize) -> SeriesStats {
        SeriesStats {
            mean: self.sum / count as f64,
            min: self.min,
            max: self.max,
        }
    }
}

/// Which numeric series a statistic belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Series {
    AvgResponseTime,
    P95ResponseTime,
    RequestsPerSecond,
}

impl Series {
    /// All series, in report order
    pub const ALL: [Series; 3] = [
        Series::AvgResponseTime,
        Series::P95ResponseTime,
        Series::RequestsPerSecond,
    ];

    /// Section label used in the statistics report
    pub fn label(self) -> &'static str {
        match self {
            Series::AvgResponseTime => "Average Response Time (s)",
            Series::P95ResponseTime => "P95 Response Time (s)",
            Series::RequestsPerSecond => "Requests per Second",
        }
    }

    pub fn value(self, sample: &Sample) -> f64 {
        match self {
            Series::AvgResponseTime => sample.avg_response_time,
            Series::P95ResponseTime => sample.p95_response_time,
            Series::RequestsPerSecond => sample.requests_per_second,
        }
    }
}

/// Read-only statistics snapshot of a dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub total_samples: usize,
    pub avg_response_time: SeriesStats,
    pub p95_response_time: SeriesStats,
    pub requests_per_second: SeriesStats,
}

impl Statistics {
    /// Compute statistics for a dataset, failing with `EmptyDataset` if it has no samples
    pub fn from_dataset(dataset: &Dataset) -> Result<Self> {
        summarize(dataset.samples()).ok_or(LoadTestError::EmptyDataset)
    }

    pub fn get(&self, series: Series) -> &SeriesStats {
        match series {
            Series::AvgResponseTime => &self.avg_response_time,
            Series::P95ResponseTime => &self.p95_response_time,
            Series::RequestsPerSecond => &self.requests_per_second,
        }
    }

    /// The three series with their stats, in report order
    pub fn series(&self) -> impl Iterator<Item = (Series, &SeriesStats)> + '_ {
        Series::ALL.into_iter().map(move |s| (s, self.get(s)))
    }
}

/// Aggregate samples; returns `None` when there is nothing to aggregate
pub fn summarize(samples: &[Sample]) -> Option<Statistics> {
    if samples.is_empty() {
        return None;
    }

    let mut avg = Accumulator::new();
    let mut p95 = Accumulator::new();
    let mut rps = Accumulator::new();

    for sample in samples {
        avg.push(sample.avg_response_time);
        p95.push(sample.p95_response_time);
        rps.push(sample.requests_per_second);
    }

    let count = samples.len();
    log::debug!("Aggregated {} samples", count);

    Some(Statistics {
        total_samples: count,
        avg_response_time: avg.finish(count),
        p95_response_time: p95.finish(count),
        requests_per_second: rps.finish(count),
    })
}
