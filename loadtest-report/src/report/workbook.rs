//! XLSX rendering of the report layout
//!
//! The workbook is assembled completely in memory. Only [`Report::persist`]
//! touches the destination, and it replaces the file in a single rename.

use super::layout::{
    chart_specs, statistics_rows, ChartSpec, StatRow, CHARTS_SHEET, DATA_HEADERS, DATA_SHEET,
    STATISTICS_HEADERS, STATISTICS_SHEET,
};
use crate::config::ReportConfig;
use loadtest_data::{Dataset, LoadTestError, Result, Statistics};
use rust_xlsxwriter::{
    Chart, ChartType, Color, DocProperties, Format, FormatAlign, Workbook, Worksheet, XlsxError,
};
use std::fs;
use std::io::Write;
use std::path::Path;

fn workbook_error(err: XlsxError) -> LoadTestError {
    LoadTestError::Workbook(err.to_string())
}

/// Builds the three report sheets from a dataset and its statistics
pub struct ReportBuilder<'a> {
    config: &'a ReportConfig,
    header_format: Format,
}

impl<'a> ReportBuilder<'a> {
    /// Create a builder; fails if the configured header colours are invalid
    pub fn new(config: &'a ReportConfig) -> Result<Self> {
        let header_format = Format::new()
            .set_bold()
            .set_font_color(Color::RGB(config.header.font_rgb()?))
            .set_background_color(Color::RGB(config.header.fill_rgb()?))
            .set_align(FormatAlign::Center);

        Ok(Self {
            config,
            header_format,
        })
    }

    /// Assemble the complete workbook; nothing is written to disk here
    pub fn build(&self, dataset: &Dataset, stats: &Statistics, source: &Path) -> Result<Report> {
        let mut workbook = Workbook::new();

        let subject = format!("Generated from {}", source.display());
        let properties = DocProperties::new()
            .set_title("Load Test Results")
            .set_subject(&subject);
        workbook.set_properties(&properties);

        workbook.push_worksheet(self.data_sheet(dataset).map_err(workbook_error)?);
        workbook.push_worksheet(self.statistics_sheet(stats).map_err(workbook_error)?);
        workbook.push_worksheet(self.charts_sheet(dataset.len()).map_err(workbook_error)?);

        log::debug!("Workbook assembled with {} data rows", dataset.len());
        Ok(Report {
            workbook,
            samples: dataset.len(),
        })
    }

    fn data_sheet(&self, dataset: &Dataset) -> std::result::Result<Worksheet, XlsxError> {
        let mut sheet = Worksheet::new();
        sheet.set_name(DATA_SHEET)?;

        for (col, header) in DATA_HEADERS.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *header, &self.header_format)?;
        }

        for (idx, sample) in dataset.iter().enumerate() {
            let row = (idx + 1) as u32;
            sheet.write_string(row, 0, &sample.timestamp)?;
            sheet.write_number(row, 1, sample.avg_response_time)?;
            sheet.write_number(row, 2, sample.p95_response_time)?;
            sheet.write_number(row, 3, sample.requests_per_second)?;
        }

        for col in 0..DATA_HEADERS.len() {
            sheet.set_column_width(col as u16, self.config.data_sheet.column_width)?;
        }

        Ok(sheet)
    }

    fn statistics_sheet(&self, stats: &Statistics) -> std::result::Result<Worksheet, XlsxError> {
        let mut sheet = Worksheet::new();
        sheet.set_name(STATISTICS_SHEET)?;

        for (col, header) in STATISTICS_HEADERS.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *header, &self.header_format)?;
        }

        for (idx, stat_row) in statistics_rows(stats).into_iter().enumerate() {
            let row = (idx + 1) as u32;
            match stat_row {
                StatRow::Metric { name, value } => {
                    sheet.write_string(row, 0, name)?;
                    sheet.write_number(row, 1, value)?;
                }
                StatRow::SectionLabel(name) => {
                    sheet.write_string(row, 0, name)?;
                }
                StatRow::Blank => {}
            }
        }

        let widths = &self.config.statistics_sheet;
        sheet.set_column_width(0, widths.metric_column_width)?;
        sheet.set_column_width(1, widths.value_column_width)?;

        Ok(sheet)
    }

    fn charts_sheet(&self, samples: usize) -> std::result::Result<Worksheet, XlsxError> {
        let mut sheet = Worksheet::new();
        sheet.set_name(CHARTS_SHEET)?;

        for spec in chart_specs(&self.config.charts) {
            let chart = self.line_chart(&spec, samples as u32);
            sheet.insert_chart(spec.anchor.row, spec.anchor.col, &chart)?;
        }

        Ok(sheet)
    }

    /// Line chart over Data rows 2..=samples+1, categories from the Timestamp column
    fn line_chart(&self, spec: &ChartSpec, last_row: u32) -> Chart {
        let mut chart = Chart::new(ChartType::Line);

        for col in spec.value_columns() {
            chart
                .add_series()
                .set_name((DATA_SHEET, 0, col))
                .set_categories((DATA_SHEET, 1, 0, last_row, 0))
                .set_values((DATA_SHEET, 1, col, last_row, col));
        }

        chart.title().set_name(spec.title);
        chart.x_axis().set_name(spec.x_axis);
        chart.y_axis().set_name(spec.y_axis);
        chart.set_style(spec.style);
        chart.set_width(self.config.charts.width);
        chart.set_height(self.config.charts.height);

        chart
    }
}

/// A fully assembled report, written at most once
pub struct Report {
    workbook: Workbook,
    samples: usize,
}

impl Report {
    pub fn sample_count(&self) -> usize {
        self.samples
    }

    /// Serialize the workbook and move it onto `path`
    ///
    /// The bytes go to a temporary file next to the destination first, so a
    /// failed write never leaves a truncated report behind.
    pub fn persist(mut self, path: &Path) -> Result<()> {
        let bytes = self.workbook.save_to_buffer().map_err(workbook_error)?;

        let write_failure = |source: std::io::Error| LoadTestError::OutputWriteFailure {
            path: path.to_path_buf(),
            source,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut staged = tempfile::Builder::new()
            .prefix(".loadtest-report")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(write_failure)?;
        staged.write_all(&bytes).map_err(write_failure)?;
        staged.as_file().sync_all().map_err(write_failure)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(staged.path(), fs::Permissions::from_mode(0o644))
                .map_err(write_failure)?;
        }

        staged.persist(path).map_err(|e| write_failure(e.error))?;

        log::info!("Report written to {:?} ({} bytes)", path, bytes.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook, Data, Reader, Xlsx};
    use loadtest_data::Sample;
    use std::path::PathBuf;

    fn example_dataset() -> Dataset {
        Dataset::new(vec![
            Sample::new("t1", 0.10, 0.20, 50.0),
            Sample::new("t2", 0.30, 0.40, 70.0),
        ])
        .unwrap()
    }

    fn write_report(dataset: &Dataset, dir: &Path) -> PathBuf {
        let config = ReportConfig::default();
        let stats = Statistics::from_dataset(dataset).unwrap();
        let report = ReportBuilder::new(&config)
            .unwrap()
            .build(dataset, &stats, Path::new("results.csv"))
            .unwrap();

        let path = dir.join("report.xlsx");
        report.persist(&path).unwrap();
        path
    }

    fn number(cell: Option<&Data>) -> f64 {
        match cell {
            Some(Data::Float(f)) => *f,
            Some(Data::Int(i)) => *i as f64,
            other => panic!("expected a number, got {:?}", other),
        }
    }

    fn text(cell: Option<&Data>) -> String {
        match cell {
            Some(Data::String(s)) => s.clone(),
            other => panic!("expected a string, got {:?}", other),
        }
    }

    #[test]
    fn test_sheets_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_report(&example_dataset(), dir.path());

        let workbook: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["Data", "Statistics", "Charts"]);
    }

    #[test]
    fn test_data_sheet_round_trip() {
        let samples = vec![
            Sample::new("12:00:01", 0.123456789, 0.987654321, 1234.5678),
            Sample::new("11:59:59", 1e-7, 2.5, 0.0),
            Sample::new("12:00:03", 0.1, 0.3, 99.99),
        ];
        let dataset = Dataset::new(samples.clone()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = write_report(&dataset, dir.path());

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        let range = workbook.worksheet_range("Data").unwrap();
        assert_eq!(range.height(), samples.len() + 1);

        for (col, header) in DATA_HEADERS.iter().enumerate() {
            assert_eq!(text(range.get_value((0, col as u32))), *header);
        }

        let read_back: Vec<Sample> = (1..range.height() as u32)
            .map(|row| Sample {
                timestamp: text(range.get_value((row, 0))),
                avg_response_time: number(range.get_value((row, 1))),
                p95_response_time: number(range.get_value((row, 2))),
                requests_per_second: number(range.get_value((row, 3))),
            })
            .collect();
        assert_eq!(read_back, samples);
    }

    #[test]
    fn test_statistics_sheet_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_report(&example_dataset(), dir.path());

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        let range = workbook.worksheet_range("Statistics").unwrap();

        assert_eq!(text(range.get_value((0, 0))), "Metric");
        assert_eq!(text(range.get_value((0, 1))), "Value");
        assert_eq!(text(range.get_value((1, 0))), "Total Samples");
        assert_eq!(number(range.get_value((1, 1))), 2.0);

        // Section label rows carry no value
        assert_eq!(text(range.get_value((3, 0))), "Average Response Time (s)");
        assert!(matches!(range.get_value((3, 1)), None | Some(Data::Empty)));

        assert_eq!(text(range.get_value((4, 0))), "  Mean");
        assert_eq!(number(range.get_value((4, 1))), 0.2);
        assert_eq!(number(range.get_value((9, 1))), 0.3);
        assert_eq!(text(range.get_value((13, 0))), "Requests per Second");
        assert_eq!(number(range.get_value((14, 1))), 60.0);
        assert_eq!(number(range.get_value((16, 1))), 70.0);
    }

    #[test]
    fn test_persist_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReportConfig::default();
        let dataset = example_dataset();
        let stats = Statistics::from_dataset(&dataset).unwrap();
        let report = ReportBuilder::new(&config)
            .unwrap()
            .build(&dataset, &stats, Path::new("results.csv"))
            .unwrap();

        let path = dir.path().join("no-such-dir").join("report.xlsx");
        let result = report.persist(&path);

        assert!(matches!(result, Err(LoadTestError::OutputWriteFailure { .. })));
        assert!(!path.exists());
    }

    #[test]
    fn test_persist_replaces_existing_file_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.xlsx");
        fs::write(&path, b"stale").unwrap();

        write_report(&example_dataset(), dir.path());

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert!(fs::read(&path).unwrap().starts_with(b"PK"));
    }

    #[test]
    fn test_report_sample_count() {
        let config = ReportConfig::default();
        let dataset = example_dataset();
        let stats = Statistics::from_dataset(&dataset).unwrap();
        let report = ReportBuilder::new(&config)
            .unwrap()
            .build(&dataset, &stats, Path::new("results.csv"))
            .unwrap();
        assert_eq!(report.sample_count(), 2);
    }

    fn archive_entry(archive: &mut zip::ZipArchive<fs::File>, name: &str) -> String {
        let mut entry = archive.by_name(name).unwrap();
        let mut xml = String::new();
        std::io::Read::read_to_string(&mut entry, &mut xml).unwrap();
        xml
    }

    #[test]
    fn test_charts_saved_in_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_report(&example_dataset(), dir.path());

        let mut archive = zip::ZipArchive::new(fs::File::open(&path).unwrap()).unwrap();
        let mut charts: Vec<String> = archive
            .file_names()
            .filter(|name| name.starts_with("xl/charts/chart") && name.ends_with(".xml"))
            .map(String::from)
            .collect();
        charts.sort();
        assert_eq!(charts, vec!["xl/charts/chart1.xml", "xl/charts/chart2.xml"]);

        let response_times = archive_entry(&mut archive, "xl/charts/chart1.xml");
        assert!(response_times.contains("Data!$A$2:$A$3"));
        assert!(response_times.contains("Data!$B$1"));
        assert!(response_times.contains("Data!$B$2:$B$3"));
        assert!(response_times.contains("Data!$C$1"));
        assert!(response_times.contains("Data!$C$2:$C$3"));
        assert!(response_times.contains("Response Times Over Time"));
        assert!(response_times.contains("Response Time (seconds)"));

        let throughput = archive_entry(&mut archive, "xl/charts/chart2.xml");
        assert!(throughput.contains("Data!$A$2:$A$3"));
        assert!(throughput.contains("Data!$D$1"));
        assert!(throughput.contains("Data!$D$2:$D$3"));
        assert!(!throughput.contains("Data!$B$"));
        assert!(throughput.contains("Requests per Second Over Time"));
    }
}
