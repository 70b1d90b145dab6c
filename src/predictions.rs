//! Prediction comparison tables.
//!
//! Each feed is an externally produced JSON array of flat objects. The keys of
//! the first object become the table columns, rows are truncated to the feed's
//! limit, and rows are tagged by comparing `Actual` against `Predicted`.

use std::fmt::Write as FmtWrite;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::PredictionConfig;
use crate::error::DashError;
use crate::schema::{prediction, region};

pub const EMPTY_PLACEHOLDER: &str = "<p>No predictions available.</p>";
pub const ERROR_PLACEHOLDER: &str = "<p>Error loading predictions.</p>";

/// The three prediction feeds shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FeedKind {
    /// Test-set predictions, headers relabelled.
    Primary,
    /// Predictions over the 2016-2017 survey rows.
    Historical,
    /// Forecasts with no actual destination.
    Future,
}

impl FeedKind {
    pub const ALL: [FeedKind; 3] = [FeedKind::Primary, FeedKind::Historical, FeedKind::Future];

    pub fn region(self) -> &'static str {
        match self {
            Self::Primary => region::PRIMARY_PREDICTIONS,
            Self::Historical => region::HISTORICAL_PREDICTIONS,
            Self::Future => region::FUTURE_PREDICTIONS,
        }
    }

    pub fn tags_rows(self) -> bool {
        !matches!(self, Self::Future)
    }

    pub fn row_limit(self, config: &PredictionConfig) -> usize {
        match self {
            Self::Primary => config.primary_rows,
            Self::Historical => config.historical_rows,
            Self::Future => config.future_rows,
        }
    }

    pub fn path(self, config: &PredictionConfig) -> &Path {
        match self {
            Self::Primary => &config.primary,
            Self::Historical => &config.historical,
            Self::Future => &config.future,
        }
    }

    /// Column header for a feed key.
    pub fn header_label(self, key: &str) -> String {
        if self != Self::Primary {
            return key.to_string();
        }
        match key {
            prediction::ACTUAL => prediction::ACTUAL_LABEL.to_string(),
            prediction::PREDICTED => prediction::PREDICTED_LABEL.to_string(),
            other => other.to_string(),
        }
    }
}

impl FromStr for FeedKind {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "primary" => Ok(Self::Primary),
            "historical" => Ok(Self::Historical),
            "future" => Ok(Self::Future),
            other => Err(DashError::General(format!("Unknown prediction feed: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RowStatus {
    Match,
    Mismatch,
    Untagged,
}

impl RowStatus {
    fn of(row: &Map<String, Value>) -> Self {
        let present = |key: &str| row.get(key).filter(|v| !v.is_null());
        match (present(prediction::ACTUAL), present(prediction::PREDICTED)) {
            (Some(a), Some(p)) if a == p => Self::Match,
            (Some(_), Some(_)) => Self::Mismatch,
            _ => Self::Untagged,
        }
    }

    fn background(self) -> &'static str {
        match self {
            Self::Match => "#d4f8e8",
            Self::Mismatch => "#ffe0e6",
            Self::Untagged => "#f8f9fa",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRow {
    pub cells: Vec<String>,
    pub status: RowStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionTable {
    pub kind: FeedKind,
    pub headers: Vec<String>,
    pub rows: Vec<PredictionRow>,
}

/// Parse a feed body: a JSON array of objects, key order preserved.
pub fn parse_feed(text: &str) -> Result<Vec<Map<String, Value>>, DashError> {
    Ok(serde_json::from_str(text)?)
}

/// Truncate and tag parsed feed records.
pub fn build_table(kind: FeedKind, records: &[Map<String, Value>], limit: usize) -> PredictionTable {
    let rows = &records[..records.len().min(limit)];
    let keys: Vec<&String> = rows.first().map(|r| r.keys().collect()).unwrap_or_default();

    PredictionTable {
        kind,
        headers: keys.iter().map(|k| kind.header_label(k)).collect(),
        rows: rows
            .iter()
            .map(|row| PredictionRow {
                cells: keys
                    .iter()
                    .map(|k| row.get(k.as_str()).map(display_value).unwrap_or_default())
                    .collect(),
                status: if kind.tags_rows() {
                    RowStatus::of(row)
                } else {
                    RowStatus::Untagged
                },
            })
            .collect(),
    }
}

/// Read, parse and shape one feed.
pub fn load_table(kind: FeedKind, path: &Path, limit: usize) -> Result<PredictionTable, DashError> {
    let text = std::fs::read_to_string(path)?;
    let records = parse_feed(&text)?;
    debug!(
        "Feed {:?}: {} records from {}",
        kind,
        records.len(),
        path.display()
    );
    Ok(build_table(kind, &records, limit))
}

/// Region markup for one feed. Failures are isolated: they log and render the
/// error placeholder instead of propagating.
pub fn render_feed(kind: FeedKind, config: &PredictionConfig) -> String {
    let path = kind.path(config);
    match load_table(kind, path, kind.row_limit(config)) {
        Ok(table) => table.to_html(),
        Err(e) => {
            warn!("Could not load {:?} predictions from {}: {}", kind, path.display(), e);
            ERROR_PLACEHOLDER.to_string()
        }
    }
}

impl PredictionTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn to_html(&self) -> String {
        if self.is_empty() {
            return EMPTY_PLACEHOLDER.to_string();
        }

        let mut html = String::from(r#"<table style="width:100%;border-collapse:collapse;">"#);
        html.push_str("<thead><tr>");
        for h in &self.headers {
            write!(
                html,
                r#"<th style="border:1px solid #ccc;padding:4px 8px;background:#22223b;color:#fff;">{}</th>"#,
                escape_html(h)
            )
            .ok();
        }
        html.push_str("</tr></thead><tbody>");
        for row in &self.rows {
            write!(
                html,
                r#"<tr class="{}" style="background:{}; color:#222;">"#,
                row_class(row.status),
                row.status.background()
            )
            .ok();
            for cell in &row.cells {
                write!(
                    html,
                    r#"<td style="border:1px solid #ccc;padding:4px 8px;">{}</td>"#,
                    escape_html(cell)
                )
                .ok();
            }
            html.push_str("</tr>");
        }
        html.push_str("</tbody></table>");
        html
    }
}

fn row_class(status: RowStatus) -> &'static str {
    match status {
        RowStatus::Match => "prediction-match",
        RowStatus::Mismatch => "prediction-mismatch",
        RowStatus::Untagged => "prediction-row",
    }
}

fn display_value(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub(crate) fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn feed(n: usize, with_actual: bool) -> Vec<Map<String, Value>> {
        (0..n)
            .map(|i| {
                let mut row = Map::new();
                row.insert("Companion".into(), Value::from("ALONE"));
                row.insert("Year".into(), Value::from(2017));
                row.insert("Continent".into(), Value::from("Asia"));
                if with_actual {
                    row.insert("Actual".into(), Value::from("Japan"));
                }
                let predicted = if i % 2 == 0 { "Japan" } else { "Korea" };
                row.insert("Predicted".into(), Value::from(predicted));
                row
            })
            .collect()
    }

    #[test]
    fn primary_relabels_and_truncates() {
        let table = build_table(FeedKind::Primary, &feed(25, true), 20);
        assert_eq!(table.rows.len(), 20);
        assert_eq!(
            table.headers,
            vec![
                "Companion",
                "Year",
                "Continent",
                "Actual Destination",
                "Predicted Destination"
            ]
        );
        assert_eq!(table.rows[0].status, RowStatus::Match);
        assert_eq!(table.rows[1].status, RowStatus::Mismatch);
        assert_eq!(table.rows[0].cells, vec!["ALONE", "2017", "Asia", "Japan", "Japan"]);
    }

    #[test]
    fn historical_keeps_raw_headers() {
        let table = build_table(FeedKind::Historical, &feed(40, true), 30);
        assert_eq!(table.rows.len(), 30);
        assert_eq!(table.headers[3], "Actual");
        assert_eq!(table.rows[1].status, RowStatus::Mismatch);
    }

    #[test]
    fn future_is_never_tagged() {
        let table = build_table(FeedKind::Future, &feed(3, true), 30);
        assert!(table.rows.iter().all(|r| r.status == RowStatus::Untagged));
    }

    #[test]
    fn missing_actual_is_untagged() {
        let table = build_table(FeedKind::Primary, &feed(2, false), 20);
        assert!(table.rows.iter().all(|r| r.status == RowStatus::Untagged));
    }

    #[test]
    fn empty_feed_placeholder() {
        let table = build_table(FeedKind::Primary, &[], 20);
        assert!(table.headers.is_empty());
        assert_eq!(table.to_html(), EMPTY_PLACEHOLDER);
    }

    #[test]
    fn parse_rejects_non_arrays() {
        assert!(parse_feed(r#"{"Actual": "Japan"}"#).is_err());
        assert!(parse_feed("[1, 2]").is_err());
        assert_eq!(parse_feed("[]").unwrap().len(), 0);
    }

    #[test]
    fn parse_preserves_key_order() {
        let rows = parse_feed(r#"[{"Year": 2026, "Companion": "ALONE", "Predicted": "Other"}]"#).unwrap();
        let keys: Vec<&str> = rows[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Year", "Companion", "Predicted"]);
    }

    #[test]
    fn html_escapes_cells_and_colors_rows() {
        let rows = parse_feed(r#"[{"Actual": "<b>", "Predicted": "<b>"}]"#).unwrap();
        let html = build_table(FeedKind::Historical, &rows, 30).to_html();
        assert!(html.contains("&lt;b&gt;"));
        assert!(!html.contains("<b>"));
        assert!(html.contains("#d4f8e8"));
    }

    #[test]
    fn feed_names() {
        assert_eq!("Historical".parse::<FeedKind>().unwrap(), FeedKind::Historical);
        assert!("weekly".parse::<FeedKind>().is_err());
    }

    #[test]
    fn missing_file_renders_error_placeholder() {
        let config = PredictionConfig {
            primary: "/nonexistent/dashboard_predictions.json".into(),
            ..PredictionConfig::default()
        };
        assert_eq!(render_feed(FeedKind::Primary, &config), ERROR_PLACEHOLDER);
    }
}
