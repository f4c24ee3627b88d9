//! Logical layout of the three report sheets
//!
//! Describes what goes where without touching the spreadsheet writer, so the
//! row order and chart wiring can be checked in isolation.

use crate::config::{CellAnchor, ChartsConfig};
use loadtest_data::{Series, Statistics};

pub const DATA_SHEET: &str = "Data";
pub const STATISTICS_SHEET: &str = "Statistics";
pub const CHARTS_SHEET: &str = "Charts";

/// Header row of the Data sheet; columns follow `Sample` field order
pub const DATA_HEADERS: [&str; 4] = [
    "Timestamp",
    "Avg Response Time (s)",
    "P95 Response Time (s)",
    "Requests/Second",
];

pub const STATISTICS_HEADERS: [&str; 2] = ["Metric", "Value"];

/// Decimal places shown on the Statistics sheet
pub const STATISTICS_DECIMALS: i32 = 4;

/// Data sheet column of each numeric series
pub fn data_column(series: Series) -> u16 {
    match series {
        Series::AvgResponseTime => 1,
        Series::P95ResponseTime => 2,
        Series::RequestsPerSecond => 3,
    }
}

/// One row of the Statistics sheet below the header
#[derive(Debug, Clone, PartialEq)]
pub enum StatRow {
    /// A labelled value, already rounded for display
    Metric { name: &'static str, value: f64 },
    /// A section heading with an empty value cell
    SectionLabel(&'static str),
    /// Blank separator row
    Blank,
}

/// Round for display on the Statistics sheet only
pub fn round_for_display(value: f64) -> f64 {
    let factor = 10f64.powi(STATISTICS_DECIMALS);
    (value * factor).round() / factor
}

/// Rows of the Statistics sheet, in display order
pub fn statistics_rows(stats: &Statistics) -> Vec<StatRow> {
    let mut rows = vec![StatRow::Metric {
        name: "Total Samples",
        value: stats.total_samples as f64,
    }];

    for (series, s) in stats.series() {
        rows.push(StatRow::Blank);
        rows.push(StatRow::SectionLabel(series.label()));
        for (name, value) in [("  Mean", s.mean), ("  Min", s.min), ("  Max", s.max)] {
            rows.push(StatRow::Metric {
                name,
                value: round_for_display(value),
            });
        }
    }

    rows
}

/// A line chart drawn from Data sheet columns
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: &'static str,
    pub x_axis: &'static str,
    pub y_axis: &'static str,
    /// Series plotted, each read from its Data sheet column
    pub series: Vec<Series>,
    pub style: u8,
    pub anchor: CellAnchor,
}

impl ChartSpec {
    /// Data sheet columns holding this chart's values (header row gives the series name)
    pub fn value_columns(&self) -> Vec<u16> {
        self.series.iter().map(|s| data_column(*s)).collect()
    }
}

/// The two charts of the Charts sheet
pub fn chart_specs(config: &ChartsConfig) -> Vec<ChartSpec> {
    vec![
        ChartSpec {
            title: "Response Times Over Time",
            x_axis: "Sample",
            y_axis: "Response Time (seconds)",
            series: vec![Series::AvgResponseTime, Series::P95ResponseTime],
            style: config.response_time_style,
            anchor: config.response_time_anchor,
        },
        ChartSpec {
            title: "Requests per Second Over Time",
            x_axis: "Sample",
            y_axis: "Requests/Second",
            series: vec![Series::RequestsPerSecond],
            style: config.throughput_style,
            anchor: config.throughput_anchor,
        },
    ]
}
