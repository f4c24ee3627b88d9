//! CSV sample reader
//!
//! Reads a load test CSV export into a [`Dataset`]. Columns are resolved by
//! header name, so extra columns and any column order are accepted.

use crate::types::{
    expected_header, Dataset, LoadTestError, Result, Sample, AVG_RESPONSE_TIME_COLUMN,
    P95_RESPONSE_TIME_COLUMN, REQUESTS_PER_SECOND_COLUMN, TIMESTAMP_COLUMN,
};
use csv::{ReaderBuilder, StringRecord};
use std::path::Path;

/// Header positions of the four required columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnIndices {
    timestamp: usize,
    avg_response_time: usize,
    p95_response_time: usize,
    requests_per_second: usize,
}

impl ColumnIndices {
    /// Missing columns are reported in `REQUIRED_COLUMNS` order
    fn resolve(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| LoadTestError::MissingColumn {
                    column: name.to_string(),
                    expected: expected_header(),
                })
        };

        Ok(Self {
            timestamp: find(TIMESTAMP_COLUMN)?,
            avg_response_time: find(AVG_RESPONSE_TIME_COLUMN)?,
            p95_response_time: find(P95_RESPONSE_TIME_COLUMN)?,
            requests_per_second: find(REQUESTS_PER_SECOND_COLUMN)?,
        })
    }
}

/// CSV reader for comma-delimited load test samples
#[derive(Debug, Clone, Default)]
pub struct SampleReader;

impl SampleReader {
    pub fn new() -> Self {
        Self
    }

    /// Read a CSV file into a dataset
    ///
    /// The whole file is loaded before parsing, so the file handle is
    /// released before any row is interpreted.
    pub fn read_file(&self, path: &Path) -> Result<Dataset> {
        log::info!("Reading samples from: {:?}", path);

        let bytes = std::fs::read(path).map_err(|source| LoadTestError::InputNotFound {
            path: path.to_path_buf(),
            source,
        })?;

        let content = decode_text(bytes);
        let dataset = self.parse_content(&content)?;

        log::info!("Read {} samples from {:?}", dataset.len(), path);
        Ok(dataset)
    }

    /// Parse CSV content into a dataset, preserving row order
    pub fn parse_content(&self, content: &str) -> Result<Dataset> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = reader.headers()?.clone();
        let columns = ColumnIndices::resolve(&headers)?;
        log::debug!("Resolved columns: {:?}", columns);

        let mut samples = Vec::new();
        for result in reader.records() {
            let record = result?;
            samples.push(parse_record(&record, columns)?);
        }

        log::debug!("Parsed {} data rows", samples.len());
        Dataset::new(samples)
    }
}

/// Read a CSV file into a dataset
pub fn read_dataset(path: &Path) -> Result<Dataset> {
    SampleReader::new().read_file(path)
}

fn parse_record(record: &StringRecord, columns: ColumnIndices) -> Result<Sample> {
    let line = record.position().map(|p| p.line()).unwrap_or(0);

    // Measurements are finite and non-negative
    let number = |index: usize, column: &str| -> Result<f64> {
        let raw = record.get(index).unwrap_or("");
        match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
            _ => Err(LoadTestError::InvalidNumericValue {
                column: column.to_string(),
                line,
                value: raw.to_string(),
            }),
        }
    };

    Ok(Sample {
        timestamp: record.get(columns.timestamp).unwrap_or("").to_string(),
        avg_response_time: number(columns.avg_response_time, AVG_RESPONSE_TIME_COLUMN)?,
        p95_response_time: number(columns.p95_response_time, P95_RESPONSE_TIME_COLUMN)?,
        requests_per_second: number(columns.requests_per_second, REQUESTS_PER_SECOND_COLUMN)?,
    })
}

/// Decode as UTF-8, falling back to Latin-1 for legacy exports
fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            log::warn!("CSV file is not UTF-8, trying Latin-1 encoding");
            err.into_bytes().iter().map(|&b| b as char).collect()
        }
    }
}
