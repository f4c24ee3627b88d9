//! Report generation
//!
//! Builds the three-sheet XLSX report (Data, Statistics, Charts).

pub mod layout;
pub mod workbook;

pub use workbook::ReportBuilder;
