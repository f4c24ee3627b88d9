//! Core types for the load test data library
//!
//! This module defines the samples read from a load test CSV export, the
//! non-empty dataset that wraps them, and the error taxonomy shared by the
//! reader, the aggregator and the report writer.

use serde::Serialize;
use std::path::PathBuf;

/// Result type for load test operations
pub type Result<T> = std::result::Result<T, LoadTestError>;

/// Column holding the opaque sample label
pub const TIMESTAMP_COLUMN: &str = "timestamp";
/// Column holding the mean response time of the interval, in seconds
pub const AVG_RESPONSE_TIME_COLUMN: &str = "avg_response_time";
/// Column holding the 95th-percentile response time of the interval, in seconds
pub const P95_RESPONSE_TIME_COLUMN: &str = "p95_response_time";
/// Column holding the throughput of the interval
pub const REQUESTS_PER_SECOND_COLUMN: &str = "requests_per_second";

/// Columns every input file must provide (looked up by name, in any order)
pub const REQUIRED_COLUMNS: [&str; 4] = [
    TIMESTAMP_COLUMN,
    AVG_RESPONSE_TIME_COLUMN,
    P95_RESPONSE_TIME_COLUMN,
    REQUESTS_PER_SECOND_COLUMN,
];

/// The required columns as a CSV header line
pub fn expected_header() -> String {
    REQUIRED_COLUMNS.join(",")
}

/// One measurement interval of a load test run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    /// Label of the interval, kept verbatim (never parsed as a date)
    pub timestamp: String,
    /// Mean response time in seconds
    pub avg_response_time: f64,
    /// 95th-percentile response time in seconds
    pub p95_response_time: f64,
    /// Throughput in requests per second
    pub requests_per_second: f64,
}

impl Sample {
    pub fn new(
        timestamp: impl Into<String>,
        avg_response_time: f64,
        p95_response_time: f64,
        requests_per_second: f64,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            avg_response_time,
            p95_response_time,
            requests_per_second,
        }
    }
}

/// Ordered, non-empty sequence of samples in input file order
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    samples: Vec<Sample>,
}

impl Dataset {
    /// Wrap samples into a dataset, rejecting an empty sequence
    pub fn new(samples: Vec<Sample>) -> Result<Self> {
        if samples.is_empty() {
            return Err(LoadTestError::EmptyDataset);
        }
        Ok(Self { samples })
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false for a constructed dataset
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }
}

/// Errors that can occur while reading, aggregating or reporting
#[derive(Debug, thiserror::Error)]
pub enum LoadTestError {
    #[error("File '{}' not found or unreadable: {source}", path.display())]
    InputNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Missing expected column '{column}' in CSV file. Expected columns: {expected}")]
    MissingColumn { column: String, expected: String },

    #[error("Invalid numeric value '{value}' in column '{column}' (line {line})")]
    InvalidNumericValue {
        column: String,
        line: u64,
        value: String,
    },

    #[error("No data found in CSV file")]
    EmptyDataset,

    #[error(
        "Cannot write to '{}'. File may be open in another program: {source}",
        path.display()
    )]
    OutputWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Usage(String),

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to build workbook: {0}")]
    Workbook(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
