//! Load Test Report CLI Application
//!
//! Command-line front end for the load test report pipeline.
//! It uses the loadtest-data library and adds:
//! - Argument handling and output path normalisation
//! - Presentation configuration (config.toml)
//! - XLSX report generation (Data, Statistics, Charts)
//! - Console summary (text or JSON)

use anyhow::Result;
use clap::Parser;
use loadtest_data::{expected_header, read_dataset, LoadTestError, Statistics};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

mod config;
mod report;

use config::ReportConfig;
use report::ReportBuilder;

/// Load Test Report - Turn load test CSV samples into an XLSX report with charts
#[derive(Parser, Debug)]
#[command(name = "loadtest-report")]
#[command(about = "Generate an XLSX report with statistics and charts from load test CSV results", long_about = None)]
#[command(version)]
#[command(after_help = "Expected CSV format:\ntimestamp,avg_response_time,p95_response_time,requests_per_second")]
struct Args {
    /// CSV file with load test samples
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Destination XLSX file (".xlsx" is appended when missing)
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Path to configuration file (config.toml) for report presentation
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the summary statistics as JSON
    #[arg(long)]
    json: bool,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments before touching anything else
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => return Err(usage_error(&e).into()),
    };

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Load Test Report CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using data library v{}", loadtest_data::VERSION);

    run(&args)
}

/// Read, aggregate, render and persist; every failure aborts before the write
fn run(args: &Args) -> Result<()> {
    let output = normalize_output_path(&args.output);

    let config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => ReportConfig::default(),
    };

    println!("Reading data from: {}", args.input.display());
    let dataset = read_dataset(&args.input)?;

    println!("Processing {} samples...", dataset.len());
    let stats = Statistics::from_dataset(&dataset)?;

    println!("Generating Excel file: {}", output.display());
    let report = ReportBuilder::new(&config)?.build(&dataset, &stats, &args.input)?;
    let samples = report.sample_count();
    report.persist(&output)?;

    println!("Successfully created Excel file: {}", output.display());
    println!("  - Data sheet with {} samples", samples);
    println!("  - Statistics sheet with summary metrics");
    println!("  - Charts sheet with visualizations");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print_summary(&stats);
    }

    Ok(())
}

fn print_summary(stats: &Statistics) {
    println!("\nSummary Statistics:");
    println!("  Average Response Time: {:.4}s", stats.avg_response_time.mean);
    println!("  P95 Response Time: {:.4}s", stats.p95_response_time.mean);
    println!("  Average RPS: {:.2}", stats.requests_per_second.mean);
}

/// Usage text for a rejected command line, including the expected CSV header
fn usage_error(err: &clap::Error) -> LoadTestError {
    LoadTestError::Usage(format!(
        "{}\n\nExpected CSV format:\n{}",
        err.render().to_string().trim_end(),
        expected_header()
    ))
}

/// Append ".xlsx" unless the file name already ends with it (any case)
fn normalize_output_path(path: &Path) -> PathBuf {
    let has_xlsx = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"));

    if has_xlsx {
        return path.to_path_buf();
    }

    let mut name = OsString::from(path.as_os_str());
    name.push(".xlsx");
    PathBuf::from(name)
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
