#[cfg(feature = "python")]
use pyo3::prelude::*;
#[cfg(feature = "python")]
use pyo3_polars::PyDataFrame;
use tracing::info;

use crate::config::DashboardConfig;
use crate::dataset::{Dataset, SelectOption};
use crate::error::DashError;
use crate::filter::{CompanionFilter, CountryFilter, FilterSpec, YearFilter};
use crate::pipeline::{self, DashboardFrame, Trigger};
use crate::predictions::{self, FeedKind};
use crate::visualization::{self, DashboardPage};

/// The dashboard: configuration, the loaded survey table, the current
/// selector state and the frame rendered for it.
#[cfg_attr(feature = "python", pyclass(name = "Dashboard"))]
pub struct Dashboard {
    config: DashboardConfig,
    dataset: Option<Dataset>,
    filter: FilterSpec,
    frame: Option<DashboardFrame>,
}

impl Dashboard {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            dataset: None,
            filter: FilterSpec::default(),
            frame: None,
        }
    }

    /// A dashboard over an already-built dataset, rendered for the default filter.
    pub fn with_dataset(config: DashboardConfig, dataset: Dataset) -> Self {
        let mut dashboard = Self::new(config);
        dashboard.install(dataset);
        dashboard
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    // ── Data loading ────────────────────────────────────────────────────────

    /// Load the survey CSV named by the config and render the first frame.
    ///
    /// All-or-nothing: on failure no dataset is kept and nothing renders.
    pub fn load(&mut self) -> Result<usize, DashError> {
        self.dataset = None;
        self.frame = None;
        let dataset = Dataset::from_csv(&self.config.data_path)?;
        let n = dataset.len();
        self.install(dataset);
        Ok(n)
    }

    fn install(&mut self, dataset: Dataset) {
        self.frame = Some(pipeline::render(&dataset, &self.filter, &self.config.charts));
        self.dataset = Some(dataset);
    }

    pub fn dataset(&self) -> Result<&Dataset, DashError> {
        self.dataset
            .as_ref()
            .ok_or_else(|| DashError::NotLoaded("survey dataset".into()))
    }

    // ── Selectors ───────────────────────────────────────────────────────────

    pub fn year_options(&self) -> Result<Vec<SelectOption>, DashError> {
        Ok(self.dataset()?.year_options())
    }

    pub fn companion_options(&self) -> Result<Vec<SelectOption>, DashError> {
        Ok(self.dataset()?.companion_options())
    }

    pub fn country_options(&self) -> Result<Vec<SelectOption>, DashError> {
        Ok(self.dataset()?.country_options())
    }

    pub fn filter(&self) -> &FilterSpec {
        &self.filter
    }

    pub fn select_year(&mut self, year: &str) -> Result<&DashboardFrame, DashError> {
        let spec = FilterSpec {
            year: year.parse::<YearFilter>()?,
            ..self.filter.clone()
        };
        self.apply(Trigger::Year, spec)
    }

    pub fn select_companion(&mut self, companion: &str) -> Result<&DashboardFrame, DashError> {
        let spec = FilterSpec {
            companion: CompanionFilter::from(companion),
            ..self.filter.clone()
        };
        self.apply(Trigger::Companion, spec)
    }

    pub fn select_country(&mut self, country: &str) -> Result<&DashboardFrame, DashError> {
        let spec = FilterSpec {
            country: CountryFilter::from(country),
            ..self.filter.clone()
        };
        self.apply(Trigger::Country, spec)
    }

    /// Replace the whole filter, re-running only what the change requires.
    pub fn set_filter(&mut self, spec: FilterSpec) -> Result<&DashboardFrame, DashError> {
        match pipeline::trigger_between(&self.filter, &spec) {
            Some(trigger) => self.apply(trigger, spec),
            None => self.current_frame(),
        }
    }

    fn apply(&mut self, trigger: Trigger, spec: FilterSpec) -> Result<&DashboardFrame, DashError> {
        let dataset = self
            .dataset
            .as_ref()
            .ok_or_else(|| DashError::NotLoaded("survey dataset".into()))?;
        match self.frame.as_mut() {
            Some(frame) => frame.refresh(trigger, dataset, &spec, &self.config.charts),
            None => self.frame = Some(pipeline::render(dataset, &spec, &self.config.charts)),
        }
        self.filter = spec;
        self.current_frame()
    }

    pub fn current_frame(&self) -> Result<&DashboardFrame, DashError> {
        self.frame
            .as_ref()
            .ok_or_else(|| DashError::NotLoaded("survey dataset".into()))
    }

    // ── Output ──────────────────────────────────────────────────────────────

    /// Markup for every prediction region; each feed fails on its own.
    pub fn prediction_tables(&self) -> Vec<(FeedKind, String)> {
        FeedKind::ALL
            .iter()
            .map(|&kind| (kind, predictions::render_feed(kind, &self.config.predictions)))
            .collect()
    }

    /// The full page. Without a dataset the chart regions stay empty.
    pub fn to_html(&self) -> String {
        let dataset = self.dataset.as_ref();
        let options = |f: fn(&Dataset) -> Vec<SelectOption>| dataset.map(f).unwrap_or_default();

        let page = DashboardPage {
            frame: self.frame.as_ref(),
            catalog: dataset.map(|d| pipeline::catalog(d, &self.config.charts)),
            year_options: options(Dataset::year_options),
            companion_options: options(Dataset::companion_options),
            country_options: options(Dataset::country_options),
            continent_panels: self.config.charts.continents.clone(),
            tables: self.prediction_tables(),
        };
        let html = visualization::generate_dashboard_html(&page);
        info!("Generated dashboard page ({} bytes)", html.len());
        html
    }
}

// ── Python bindings ─────────────────────────────────────────────────────────

#[cfg(feature = "python")]
fn options_to_pairs(options: Vec<SelectOption>) -> Vec<(String, String)> {
    options.into_iter().map(|o| (o.value, o.label)).collect()
}

#[cfg(feature = "python")]
#[pymethods]
impl Dashboard {
    /// Create a dashboard rooted at `base_path`.
    ///
    /// `config_file` is a TOML file; relative paths in it resolve against its
    /// own directory. Without it, the default file names under `base_path`
    /// are used.
    #[new]
    #[pyo3(signature = (base_path, config_file=None))]
    fn py_new(base_path: String, config_file: Option<String>) -> PyResult<Self> {
        let config = match config_file {
            Some(path) => DashboardConfig::from_file(std::path::Path::new(&path))?,
            None => DashboardConfig::default().resolved_against(std::path::Path::new(&base_path)),
        };
        Ok(Self::new(config))
    }

    /// Load the survey CSV. Returns the number of records.
    #[pyo3(name = "load")]
    fn py_load(&mut self) -> PyResult<usize> {
        Ok(self.load()?)
    }

    #[pyo3(name = "year_options")]
    fn py_year_options(&self) -> PyResult<Vec<(String, String)>> {
        Ok(options_to_pairs(self.year_options()?))
    }

    #[pyo3(name = "companion_options")]
    fn py_companion_options(&self) -> PyResult<Vec<(String, String)>> {
        Ok(options_to_pairs(self.companion_options()?))
    }

    #[pyo3(name = "country_options")]
    fn py_country_options(&self) -> PyResult<Vec<(String, String)>> {
        Ok(options_to_pairs(self.country_options()?))
    }

    /// Set all three selectors at once (`"both"`, `"All"`, `""` = no constraint).
    #[pyo3(name = "set_filter", signature = (year="both", companion="All", country=""))]
    fn py_set_filter(&mut self, year: &str, companion: &str, country: &str) -> PyResult<()> {
        let spec = FilterSpec::from_selectors(year, companion, country)?;
        self.set_filter(spec)?;
        Ok(())
    }

    /// Current frame as a JSON string.
    fn render_json(&self) -> PyResult<String> {
        let frame = self.current_frame()?;
        Ok(serde_json::to_string(frame).map_err(DashError::from)?)
    }

    /// The normalized records as a Polars DataFrame.
    fn records_df(&self) -> PyResult<PyDataFrame> {
        Ok(PyDataFrame(self.dataset()?.to_frame()?))
    }

    /// Table markup for one feed: `"primary"`, `"historical"` or `"future"`.
    fn prediction_table_html(&self, feed: &str) -> PyResult<String> {
        let kind: FeedKind = feed.parse()?;
        Ok(predictions::render_feed(kind, &self.config.predictions))
    }

    /// Self-contained dashboard page.
    /// Use with `IPython.display.HTML(dashboard.to_html())` in Jupyter.
    #[pyo3(name = "to_html")]
    fn py_to_html(&self) -> String {
        self.to_html()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::SurveyRecord;
    use std::path::PathBuf;

    fn dashboard() -> Dashboard {
        let records = vec![
            SurveyRecord {
                year: 2016,
                companion: "ALONE".into(),
                country: "Japan".into(),
                continent: "Asia".into(),
                value: Some(3.0),
            },
            SurveyRecord {
                year: 2017,
                companion: "WITH SPOUSE".into(),
                country: "France".into(),
                continent: "Europe".into(),
                value: Some(5.0),
            },
        ];
        Dashboard::with_dataset(DashboardConfig::default(), Dataset::from_records(records))
    }

    #[test]
    fn not_loaded_until_load() {
        let d = Dashboard::new(DashboardConfig::default());
        assert!(matches!(d.dataset(), Err(DashError::NotLoaded(_))));
        assert!(matches!(d.current_frame(), Err(DashError::NotLoaded(_))));
    }

    #[test]
    fn selectors_update_filter_and_frame() {
        let mut d = dashboard();
        let frame = d.select_year("2017").unwrap();
        assert_eq!(frame.map.points.len(), 1);
        assert_eq!(frame.map.points[0].label, "France");

        let frame = d.select_country("Japan").unwrap();
        assert_eq!(frame.trend.series[0].data, vec![3.0, 0.0]);
        assert_eq!(d.filter().year, YearFilter::Year(2017));
        assert_eq!(d.filter().country, CountryFilter::Label("Japan".into()));
    }

    #[test]
    fn bad_year_leaves_state_alone() {
        let mut d = dashboard();
        assert!(d.select_year("someday").is_err());
        assert_eq!(d.filter(), &FilterSpec::default());
    }

    #[test]
    fn failed_load_clears_everything() {
        let mut d = dashboard();
        d.config.data_path = PathBuf::from("/nonexistent/survey.csv");
        assert!(d.load().is_err());
        assert!(d.dataset().is_err());
        assert!(d.current_frame().is_err());
    }
}
