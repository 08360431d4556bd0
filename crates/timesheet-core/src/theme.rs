//! Per-call styling for generated reports.
//!
//! A theme is a plain value handed to the writer for each report; nothing
//! in the workspace keeps a process-wide default font or colour.

use serde::{Deserialize, Deserializer};

/// Fonts, fills and number formats of a report
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportTheme {
    /// Font applied to every styled cell
    pub font_name: String,
    #[serde(deserialize_with = "hex_color")]
    pub header_fill: u32,
    #[serde(deserialize_with = "hex_color")]
    pub title_fill: u32,
    #[serde(deserialize_with = "hex_color")]
    pub period_fill: u32,
    #[serde(deserialize_with = "hex_color")]
    pub summary_fill: u32,
    #[serde(deserialize_with = "hex_color")]
    pub hyperlink_color: u32,
    /// Number format for hours and money
    pub decimal_format: String,
    /// Number format for estimates
    pub integer_format: String,
}

impl Default for ReportTheme {
    fn default() -> Self {
        Self {
            font_name: "Ubuntu".into(),
            header_fill: 0xBDBDBD,
            title_fill: 0xCFE2F3,
            period_fill: 0xE0E0E0,
            summary_fill: 0xE8F0FE,
            hyperlink_color: 0x0563C1,
            decimal_format: "0.00".into(),
            integer_format: "0".into(),
        }
    }
}

/// Parse `#RRGGBB` / `RRGGBB` into a 24-bit colour
pub fn parse_hex_color(value: &str) -> Option<u32> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

fn hex_color<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_hex_color(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid colour '{raw}', expected #RRGGBB")))
}
