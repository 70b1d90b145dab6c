use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use polars::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::DashError;
use crate::record::{normalize, RawRecord, SurveyRecord};
use crate::schema::{record, selector, survey};

/// One entry of a selector: the submitted value and the visible text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    fn same(value: &str) -> Self {
        Self {
            value: value.to_string(),
            label: value.to_string(),
        }
    }
}

/// The immutable table of canonical survey records.
///
/// Set once at load time and shared by reference; cloning is cheap.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Arc<[SurveyRecord]>,
}

impl Dataset {
    pub fn from_records(records: Vec<SurveyRecord>) -> Self {
        Self {
            records: records.into(),
        }
    }

    /// Load the survey CSV. Any reader error or unusable row aborts the load.
    pub fn from_csv(path: &Path) -> Result<Self, DashError> {
        let raw = read_survey_csv(path)?;
        let dataset = Self::from_frame(&raw)?;
        info!(
            "Loaded {} survey records from {}",
            dataset.len(),
            path.display()
        );
        Ok(dataset)
    }

    /// Build from an already-typed frame with the survey columns.
    pub fn from_frame(df: &DataFrame) -> Result<Self, DashError> {
        let rows = raw_records(df)?;
        let mut records = Vec::with_capacity(rows.len());
        let mut skipped = 0usize;
        for raw in &rows {
            if raw.is_blank() {
                skipped += 1;
                continue;
            }
            records.push(normalize(raw)?);
        }
        if skipped > 0 {
            debug!("Skipped {} blank rows", skipped);
        }
        Ok(Self::from_records(records))
    }

    pub fn records(&self) -> &[SurveyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // ── Selector options ────────────────────────────────────────────────────

    /// `both`, then every distinct survey year ascending.
    pub fn year_options(&self) -> Vec<SelectOption> {
        let distinct: BTreeSet<i32> = self.records.iter().map(|r| r.year).collect();
        std::iter::once(SelectOption {
            value: selector::BOTH_YEARS.to_string(),
            label: selector::BOTH_YEARS_LABEL.to_string(),
        })
        .chain(distinct.into_iter().map(|y| SelectOption::same(&y.to_string())))
        .collect()
    }

    /// `All`, then every distinct companion in ascending order.
    pub fn companion_options(&self) -> Vec<SelectOption> {
        let distinct: BTreeSet<&str> = self.records.iter().map(|r| r.companion.as_str()).collect();
        std::iter::once(SelectOption::same(selector::ALL_COMPANIONS))
            .chain(distinct.into_iter().map(SelectOption::same))
            .collect()
    }

    /// `All Countries` (empty value), then every distinct country ascending.
    pub fn country_options(&self) -> Vec<SelectOption> {
        let distinct: BTreeSet<&str> = self.records.iter().map(|r| r.country.as_str()).collect();
        std::iter::once(SelectOption {
            value: selector::ALL_COUNTRIES.to_string(),
            label: selector::ALL_COUNTRIES_LABEL.to_string(),
        })
        .chain(distinct.into_iter().map(SelectOption::same))
        .collect()
    }

    // ── Export ──────────────────────────────────────────────────────────────

    /// The normalized records as a Polars DataFrame.
    pub fn to_frame(&self) -> Result<DataFrame, DashError> {
        let years: Vec<i32> = self.records.iter().map(|r| r.year).collect();
        let companions: Vec<&str> = self.records.iter().map(|r| r.companion.as_str()).collect();
        let countries: Vec<&str> = self.records.iter().map(|r| r.country.as_str()).collect();
        let continents: Vec<&str> = self.records.iter().map(|r| r.continent.as_str()).collect();
        let values: Vec<Option<f64>> = self.records.iter().map(|r| r.value).collect();

        let columns: Vec<Column> = vec![
            Column::new(record::YEAR.into(), years),
            Column::new(record::COMPANION.into(), companions),
            Column::new(record::COUNTRY.into(), countries),
            Column::new(record::CONTINENT.into(), continents),
            Column::new(record::VALUE.into(), values),
        ];
        Ok(DataFrame::new(columns)?)
    }
}

// ── CSV reading ─────────────────────────────────────────────────────────────

/// Read the survey CSV with every column as a string, trim the headers, then
/// cast `Year` and `Percentage`. Cells that do not parse become null.
///
/// Empty cells read as `""`; only fields missing from a short row are null.
pub fn read_survey_csv(path: &Path) -> Result<DataFrame, DashError> {
    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0)) // all columns as String
        .map_parse_options(|opts| opts.with_missing_is_null(false))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    // Trim whitespace from column names
    let trimmed: Vec<String> = df
        .get_column_names_str()
        .iter()
        .map(|c| c.trim().to_string())
        .collect();
    df.set_column_names(trimmed.as_slice())?;

    require_columns(&df, &survey::ALL)?;

    let df = df
        .lazy()
        .with_columns([
            // integers only: `2016.9` becomes null rather than 2016
            col(survey::YEAR)
                .str()
                .strip_chars(lit(" \t\r\n"))
                .cast(DataType::Int64),
            col(survey::PERCENTAGE)
                .str()
                .strip_chars(lit(" \t\r\n"))
                .cast(DataType::Float64),
        ])
        .collect()?;

    Ok(df)
}

fn require_columns(df: &DataFrame, required: &[&str]) -> Result<(), DashError> {
    for &col_name in required {
        if df.column(col_name).is_err() {
            return Err(DashError::MissingColumn(col_name.to_string()));
        }
    }
    Ok(())
}

/// Pull typed rows out of a frame carrying the survey columns.
fn raw_records(df: &DataFrame) -> Result<Vec<RawRecord>, DashError> {
    require_columns(df, &survey::ALL)?;

    let years = df.column(survey::YEAR)?.cast(&DataType::Int64)?;
    let years = years.i64()?;
    let percentages = df.column(survey::PERCENTAGE)?.cast(&DataType::Float64)?;
    let percentages = percentages.f64()?;
    let companions = df.column(survey::COMPANION)?.str()?;
    let countries = df.column(survey::COUNTRY)?.str()?;
    let continents = df.column(survey::CONTINENT)?.str()?;

    let rows = (0..df.height())
        .map(|i| RawRecord {
            year: years.get(i),
            companion: companions.get(i).map(str::to_string),
            country: countries.get(i).map(str::to_string),
            continent: continents.get(i).map(str::to_string),
            percentage: percentages.get(i),
        })
        .collect();
    Ok(rows)
}
