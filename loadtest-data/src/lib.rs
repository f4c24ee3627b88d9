//! Load Test Data Library
//!
//! Reads load test CSV exports and aggregates them into summary statistics.
//!
//! # Architecture
//!
//! The library covers the first two stages of the report pipeline:
//! - Parses a CSV file into an ordered, non-empty [`Dataset`] of [`Sample`]s
//! - Computes mean/min/max for the three numeric series
//!
//! The library does NOT render spreadsheets or charts. That is done by the
//! application layer (loadtest-report).
//!
//! # Example Usage
//!
//! ```no_run
//! use loadtest_data::{read_dataset, Statistics};
//! use std::path::Path;
//!
//! let dataset = read_dataset(Path::new("results.csv")).unwrap();
//! let stats = Statistics::from_dataset(&dataset).unwrap();
//!
//! println!("{} samples, mean RPS {:.2}", stats.total_samples, stats.requests_per_second.mean);
//! ```

// Public modules
pub mod reader;
pub mod stats;
pub mod types;

// Re-export main types for convenience
pub use reader::{read_dataset, SampleReader};
pub use stats::{summarize, Series, SeriesStats, Statistics};
pub use types::{expected_header, Dataset, LoadTestError, Result, Sample, REQUIRED_COLUMNS};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
