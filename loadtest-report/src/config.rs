//! Report presentation configuration
//!
//! Everything here is cosmetic: widths, colours, chart sizes and placement.
//! Sheet names, header texts, chart titles and the statistics rounding are
//! fixed by the report layout and cannot be overridden.

use loadtest_data::{LoadTestError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default row height in pixels, used to estimate how many rows a chart covers
const ROW_HEIGHT_PX: u32 = 20;
/// Default column width in pixels, used to estimate how many columns a chart covers
const COLUMN_WIDTH_PX: u32 = 64;

/// Main report configuration (optionally loaded from a TOML file)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportConfig {
    pub data_sheet: DataSheetConfig,
    pub statistics_sheet: StatisticsSheetConfig,
    pub header: HeaderStyleConfig,
    pub charts: ChartsConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DataSheetConfig {
    pub column_width: f64,
}

impl Default for DataSheetConfig {
    fn default() -> Self {
        Self { column_width: 20.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StatisticsSheetConfig {
    pub metric_column_width: f64,
    pub value_column_width: f64,
}

impl Default for StatisticsSheetConfig {
    fn default() -> Self {
        Self {
            metric_column_width: 30.0,
            value_column_width: 15.0,
        }
    }
}

/// Header cell colours as `RRGGBB` hex strings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HeaderStyleConfig {
    pub fill_color: String,
    pub font_color: String,
}

impl Default for HeaderStyleConfig {
    fn default() -> Self {
        Self {
            fill_color: "366092".to_string(),
            font_color: "FFFFFF".to_string(),
        }
    }
}

impl HeaderStyleConfig {
    pub fn fill_rgb(&self) -> Result<u32> {
        parse_hex_color(&self.fill_color)
    }

    pub fn font_rgb(&self) -> Result<u32> {
        parse_hex_color(&self.font_color)
    }
}

/// Zero-based top-left cell of a chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct CellAnchor {
    pub row: u32,
    pub col: u16,
}

impl CellAnchor {
    pub const fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ChartsConfig {
    /// Chart width in pixels
    pub width: u32,
    /// Chart height in pixels
    pub height: u32,
    /// Built-in Excel chart style (1-48) of the response time chart
    pub response_time_style: u8,
    /// Built-in Excel chart style (1-48) of the throughput chart
    pub throughput_style: u8,
    pub response_time_anchor: CellAnchor,
    pub throughput_anchor: CellAnchor,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        // 20cm x 10cm, placed at A1 and A25
        Self {
            width: 756,
            height: 378,
            response_time_style: 10,
            throughput_style: 12,
            response_time_anchor: CellAnchor::new(0, 0),
            throughput_anchor: CellAnchor::new(24, 0),
        }
    }
}

impl ChartsConfig {
    /// Rows and columns a chart placed at `anchor` covers, as half-open ranges
    fn footprint(&self, anchor: CellAnchor) -> (std::ops::Range<u32>, std::ops::Range<u32>) {
        let rows = self.height.div_ceil(ROW_HEIGHT_PX);
        let cols = self.width.div_ceil(COLUMN_WIDTH_PX);
        let col = u32::from(anchor.col);
        (anchor.row..anchor.row + rows, col..col + cols)
    }

    /// Whether the two charts would cover a common cell
    pub fn charts_overlap(&self) -> bool {
        let (rows_a, cols_a) = self.footprint(self.response_time_anchor);
        let (rows_b, cols_b) = self.footprint(self.throughput_anchor);
        let intersects = |a: &std::ops::Range<u32>, b: &std::ops::Range<u32>| {
            a.start < b.end && b.start < a.end
        };
        intersects(&rows_a, &rows_b) && intersects(&cols_a, &cols_b)
    }
}

impl ReportConfig {
    /// Check values the TOML types cannot express
    pub fn validate(&self) -> Result<()> {
        self.header.fill_rgb()?;
        self.header.font_rgb()?;

        for style in [self.charts.response_time_style, self.charts.throughput_style] {
            if !(1..=48).contains(&style) {
                return Err(LoadTestError::Config(format!(
                    "chart style {} is outside 1-48",
                    style
                )));
            }
        }

        if self.charts.width == 0 || self.charts.height == 0 {
            return Err(LoadTestError::Config(
                "chart width and height must be positive".to_string(),
            ));
        }

        if self.charts.charts_overlap() {
            return Err(LoadTestError::Config(format!(
                "charts at {:?} and {:?} overlap",
                self.charts.response_time_anchor, self.charts.throughput_anchor
            )));
        }

        let widths = [
            self.data_sheet.column_width,
            self.statistics_sheet.metric_column_width,
            self.statistics_sheet.value_column_width,
        ];
        if widths.iter().any(|w| !w.is_finite() || *w <= 0.0) {
            return Err(LoadTestError::Config(
                "column widths must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Load and validate configuration from a TOML file
pub fn load_config(path: &Path) -> Result<ReportConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        LoadTestError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;

    let config = parse_config(&content)
        .map_err(|e| LoadTestError::Config(format!("{:?}: {}", path, e)))?;

    log::debug!("Loaded report configuration: {:?}", config);
    Ok(config)
}

/// Parse and validate configuration from TOML text
pub fn parse_config(content: &str) -> Result<ReportConfig> {
    let config: ReportConfig = toml::from_str(content)
        .map_err(|e| LoadTestError::Config(format!("Failed to parse config: {}", e)))?;
    config.validate()?;
    Ok(config)
}

fn parse_hex_color(value: &str) -> Result<u32> {
    let hex = value.trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(LoadTestError::Config(format!(
            "colour '{}' is not a RRGGBB hex value",
            value
        )));
    }
    u32::from_str_radix(hex, 16)
        .map_err(|e| LoadTestError::Config(format!("colour '{}': {}", value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ReportConfig::default();
        config.validate().unwrap();
        assert_eq!(config.header.fill_rgb().unwrap(), 0x366092);
        assert_eq!(config.header.font_rgb().unwrap(), 0xFFFFFF);
        assert!(!config.charts.charts_overlap());
    }

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, ReportConfig::default());
    }

    #[test]
    fn test_config_deserialization() {
        let toml_content = r##"
            [data_sheet]
            column_width = 25.0

            [header]
            fill_color = "#1F4E78"

            [charts]
            height = 300
            throughput_anchor = { row = 0, col = 14 }
        "##;

        let config = parse_config(toml_content).unwrap();
        assert_eq!(config.data_sheet.column_width, 25.0);
        assert_eq!(config.header.fill_rgb().unwrap(), 0x1F4E78);
        assert_eq!(config.header.font_color, "FFFFFF");
        assert_eq!(config.charts.height, 300);
        assert_eq!(config.charts.throughput_anchor, CellAnchor::new(0, 14));
        assert_eq!(config.charts.response_time_style, 10);
    }

    #[test]
    fn test_overlapping_anchors_rejected() {
        let toml_content = r#"
            [charts]
            throughput_anchor = { row = 10, col = 2 }
        "#;
        assert!(matches!(
            parse_config(toml_content),
            Err(LoadTestError::Config(_))
        ));
    }

    #[test]
    fn test_bad_colour_rejected() {
        let toml_content = r#"
            [header]
            font_color = "white"
        "#;
        assert!(matches!(
            parse_config(toml_content),
            Err(LoadTestError::Config(_))
        ));
    }

    #[test]
    fn test_bad_style_rejected() {
        let mut config = ReportConfig::default();
        config.charts.throughput_style = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(&dir.path().join("missing.toml"));
        assert!(matches!(result, Err(LoadTestError::Config(_))));
    }
}
