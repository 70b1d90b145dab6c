use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("Data not loaded: {0}")]
    NotLoaded(String),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("InvalidData: {0}")]
    InvalidData(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("{0}")]
    General(String),
}

#[cfg(feature = "python")]
impl From<DashError> for pyo3::PyErr {
    fn from(err: DashError) -> pyo3::PyErr {
        pyo3::exceptions::PyRuntimeError::new_err(err.to_string())
    }
}

#[cfg(feature = "python")]
impl From<pyo3::PyErr> for DashError {
    fn from(err: pyo3::PyErr) -> Self {
        DashError::General(err.to_string())
    }
}
