// =============================================================================
// Export: CSV / JSON rendering of bars with optional indicator columns
// =============================================================================
//
// Each bar becomes one row. When an `IndicatorResult` is supplied its final
// values are repeated on every row (the basket is a single snapshot, not a
// per-bar series). Timestamps are milliseconds since the Unix epoch; CSV
// renders them as ISO-8601 UTC with millisecond precision, JSON keeps the raw
// integer.

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::indicators::IndicatorResult;
use crate::types::PriceBar;

const BASE_HEADERS: [&str; 3] = ["Timestamp", "Price", "Volume"];

const INDICATOR_HEADERS: [&str; 9] = [
    "SMA",
    "EMA",
    "RSI",
    "MACD",
    "Signal",
    "Histogram",
    "Upper Band",
    "Lower Band",
    "Volume SMA",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown export format '{other}' (expected csv or json)")),
        }
    }
}

/// Indicator columns attached to an exported row. JSON keys are camelCase
/// (`upperBand`, `volumeSMA`) to match the dashboard export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportIndicators {
    pub sma: f64,
    pub ema: f64,
    pub rsi: f64,
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
    pub upper_band: f64,
    pub lower_band: f64,
    #[serde(rename = "volumeSMA")]
    pub volume_sma: f64,
}

impl From<&IndicatorResult> for ExportIndicators {
    fn from(r: &IndicatorResult) -> Self {
        Self {
            sma: r.sma,
            ema: r.ema,
            rsi: r.rsi,
            macd: r.macd,
            signal: r.signal,
            histogram: r.histogram,
            upper_band: r.upper_band,
            lower_band: r.lower_band,
            volume_sma: r.volume_sma,
        }
    }
}

impl ExportIndicators {
    fn values(&self) -> [f64; 9] {
        [
            self.sma,
            self.ema,
            self.rsi,
            self.macd,
            self.signal,
            self.histogram,
            self.upper_band,
            self.lower_band,
            self.volume_sma,
        ]
    }
}

/// One exported record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    pub timestamp: i64,
    pub price: f64,
    pub volume: f64,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub indicators: Option<ExportIndicators>,
}

/// Build the row set shared by both formats.
pub fn rows(bars: &[PriceBar], indicators: Option<&IndicatorResult>) -> Vec<ExportRow> {
    let indicators = indicators.map(ExportIndicators::from);
    bars.iter()
        .map(|bar| ExportRow {
            timestamp: bar.timestamp,
            price: bar.price,
            volume: bar.volume,
            indicators,
        })
        .collect()
}

/// ISO-8601 UTC rendering of a millisecond timestamp.
///
/// Out-of-range values fall back to the raw integer.
pub fn iso_timestamp(millis: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(millis) {
        Some(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
        None => {
            debug!(millis, "Export: timestamp outside chrono range, writing raw value");
            millis.to_string()
        }
    }
}

/// Render bars as CSV. The header row always comes first; indicator columns
/// are present only when `indicators` is `Some`.
pub fn to_csv(bars: &[PriceBar], indicators: Option<&IndicatorResult>) -> String {
    let mut headers: Vec<&str> = BASE_HEADERS.to_vec();
    if indicators.is_some() {
        headers.extend(INDICATOR_HEADERS);
    }

    let mut lines = Vec::with_capacity(bars.len() + 1);
    lines.push(headers.join(","));

    for row in rows(bars, indicators) {
        let mut fields = vec![
            iso_timestamp(row.timestamp),
            row.price.to_string(),
            row.volume.to_string(),
        ];
        if let Some(ind) = row.indicators {
            fields.extend(ind.values().iter().map(f64::to_string));
        }
        lines.push(fields.join(","));
    }

    lines.join("\n")
}

/// Render bars as a pretty-printed JSON array.
pub fn to_json(bars: &[PriceBar], indicators: Option<&IndicatorResult>) -> Result<String> {
    serde_json::to_string_pretty(&rows(bars, indicators)).context("failed to serialise export rows")
}

/// Render in the requested format.
pub fn render(
    bars: &[PriceBar],
    indicators: Option<&IndicatorResult>,
    format: ExportFormat,
) -> Result<String> {
    match format {
        ExportFormat::Csv => Ok(to_csv(bars, indicators)),
        ExportFormat::Json => to_json(bars, indicators),
    }
}
