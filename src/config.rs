use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::DashError;
use crate::schema::continents;

/// Dashboard configuration, loaded from TOML. Every field has a default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Survey CSV, relative to the base directory unless absolute.
    pub data_path: PathBuf,
    pub predictions: PredictionConfig,
    pub charts: ChartSettings,
}

/// Prediction feed locations and row limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    pub primary: PathBuf,
    pub historical: PathBuf,
    pub future: PathBuf,
    pub primary_rows: usize,
    pub historical_rows: usize,
    pub future_rows: usize,
}

/// Knobs consumed by the aggregators and chart builders.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    /// Companion colors by rank, cycled when there are more groups.
    pub palette: Vec<String>,
    /// Country label -> name expected by the world map.
    pub map_names: HashMap<String, String>,
    pub trend_top_n: usize,
    /// Radar axis max as a multiple of the largest continent total.
    pub radar_headroom: f64,
    pub continents: Vec<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("travelling-companion-cleaned.csv"),
            predictions: PredictionConfig::default(),
            charts: ChartSettings::default(),
        }
    }
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            primary: PathBuf::from("dashboard_predictions.json"),
            historical: PathBuf::from("dashboard_predictions_2016_2017.json"),
            future: PathBuf::from("dashboard_predictions_2026_2027.json"),
            primary_rows: 20,
            historical_rows: 30,
            future_rows: 30,
        }
    }
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            palette: [
                "#5470c6", "#91cc75", "#fac858", "#ee6666", "#73c0de", "#3ba272", "#fc8452",
                "#9a60b4", "#ea7ccc",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
            map_names: HashMap::from([(
                "USA".to_string(),
                "United States of America".to_string(),
            )]),
            trend_top_n: 5,
            radar_headroom: 1.1,
            continents: continents::PANELS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl ChartSettings {
    /// Palette color for a rank; falls back to gray for an empty palette.
    pub fn color_for_rank(&self, rank: usize) -> &str {
        if self.palette.is_empty() {
            return "#999999";
        }
        &self.palette[rank % self.palette.len()]
    }

    pub fn map_name<'a>(&'a self, country: &'a str) -> &'a str {
        self.map_names
            .get(country)
            .map(String::as_str)
            .unwrap_or(country)
    }
}

impl DashboardConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, DashError> {
        Ok(toml::from_str(s)?)
    }

    /// Load a TOML config file. Relative paths inside it resolve against the
    /// file's directory.
    pub fn from_file(path: &Path) -> Result<Self, DashError> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(config.resolved_against(base))
    }

    /// Rebase every relative path onto `base`.
    pub fn resolved_against(mut self, base: &Path) -> Self {
        let rebase = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        rebase(&mut self.data_path);
        rebase(&mut self.predictions.primary);
        rebase(&mut self.predictions.historical);
        rebase(&mut self.predictions.future);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.predictions.primary_rows, 20);
        assert_eq!(config.predictions.historical_rows, 30);
        assert_eq!(config.predictions.future_rows, 30);
        assert_eq!(config.charts.trend_top_n, 5);
        assert_eq!(config.charts.palette.len(), 9);
        assert_eq!(
            config.charts.continents,
            vec!["Asia", "Europe", "Oceania", "North America"]
        );
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = DashboardConfig::from_toml_str(
            r#"
            data_path = "survey.csv"

            [charts]
            trend_top_n = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.data_path, PathBuf::from("survey.csv"));
        assert_eq!(config.charts.trend_top_n, 3);
        assert_eq!(config.charts.radar_headroom, 1.1);
        assert_eq!(config.predictions.future_rows, 30);
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(matches!(
            DashboardConfig::from_toml_str("trend_top_n = = 3"),
            Err(DashError::Config(_))
        ));
    }

    #[test]
    fn palette_cycles() {
        let charts = ChartSettings::default();
        assert_eq!(charts.color_for_rank(0), "#5470c6");
        assert_eq!(charts.color_for_rank(9), "#5470c6");
        assert_eq!(charts.color_for_rank(10), "#91cc75");
    }

    #[test]
    fn map_names() {
        let charts = ChartSettings::default();
        assert_eq!(charts.map_name("USA"), "United States of America");
        assert_eq!(charts.map_name("Japan"), "Japan");
    }

    #[test]
    fn resolves_relative_paths() {
        let config = DashboardConfig::default().resolved_against(Path::new("/srv/dash"));
        assert_eq!(
            config.data_path,
            PathBuf::from("/srv/dash/travelling-companion-cleaned.csv")
        );
        assert_eq!(
            config.predictions.future,
            PathBuf::from("/srv/dash/dashboard_predictions_2026_2027.json")
        );
    }
}
