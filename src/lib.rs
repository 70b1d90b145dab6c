//! Aggregation engine for the travelling-companion survey dashboard.
//!
//! Loads the survey CSV once, then turns a `FilterSpec` into chart-ready data
//! for the map, companion donut, destination trend, continent radar and
//! per-continent bar panels. Prediction feeds render as comparison tables.

pub mod aggregation;
pub mod config;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod model;
pub mod pipeline;
pub mod predictions;
pub mod record;
pub mod schema;
pub mod visualization;


pub use config::{ChartSettings, DashboardConfig, PredictionConfig};
pub use dataset::{Dataset, SelectOption};
pub use error::DashError;
pub use filter::{CompanionFilter, CountryFilter, FilterSpec, YearFilter};
pub use model::Dashboard;
pub use pipeline::{catalog, render, DashboardFrame, Trigger, ViewCatalog};
pub use predictions::FeedKind;
pub use record::{normalize, RawRecord, SurveyRecord};

#[cfg(feature = "python")]
use pyo3::prelude::*;
#[cfg(feature = "python")]
use pyo3::types::PyModule;

/// Export schema constants as Python submodules
#[cfg(feature = "python")]
fn add_schema_exports(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Survey CSV columns
    let survey = PyModule::new(m.py(), "survey")?;
    survey.add("YEAR", schema::survey::YEAR)?;
    survey.add("COMPANION", schema::survey::COMPANION)?;
    survey.add("COUNTRY", schema::survey::COUNTRY)?;
    survey.add("CONTINENT", schema::survey::CONTINENT)?;
    survey.add("PERCENTAGE", schema::survey::PERCENTAGE)?;
    m.add_submodule(&survey)?;

    // Normalized record columns
    let record = PyModule::new(m.py(), "record")?;
    record.add("YEAR", schema::record::YEAR)?;
    record.add("COMPANION", schema::record::COMPANION)?;
    record.add("COUNTRY", schema::record::COUNTRY)?;
    record.add("CONTINENT", schema::record::CONTINENT)?;
    record.add("VALUE", schema::record::VALUE)?;
    m.add_submodule(&record)?;

    // Selector sentinels
    let selector = PyModule::new(m.py(), "selector")?;
    selector.add("BOTH_YEARS", schema::selector::BOTH_YEARS)?;
    selector.add("ALL_COMPANIONS", schema::selector::ALL_COMPANIONS)?;
    selector.add("ALL_COUNTRIES", schema::selector::ALL_COUNTRIES)?;
    m.add_submodule(&selector)?;

    // Prediction feed keys
    let prediction = PyModule::new(m.py(), "prediction")?;
    prediction.add("COMPANION", schema::prediction::COMPANION)?;
    prediction.add("YEAR", schema::prediction::YEAR)?;
    prediction.add("CONTINENT", schema::prediction::CONTINENT)?;
    prediction.add("ACTUAL", schema::prediction::ACTUAL)?;
    prediction.add("PREDICTED", schema::prediction::PREDICTED)?;
    m.add_submodule(&prediction)?;

    Ok(())
}

#[cfg(feature = "python")]
#[pymodule]
fn travel_dash(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Dashboard>()?;
    add_schema_exports(m)?;
    Ok(())
}
