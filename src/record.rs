use serde::Serialize;

use crate::error::DashError;
use crate::schema::{companion, survey};

/// One survey row as it comes out of the CSV reader, keyed by trimmed header.
///
/// Every field is optional: empty cells and cells that failed numeric
/// casting arrive as `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub year: Option<i64>,
    pub companion: Option<String>,
    pub country: Option<String>,
    pub continent: Option<String>,
    pub percentage: Option<f64>,
}

impl RawRecord {
    /// True for rows with no populated field at all (blank CSV lines).
    pub fn is_blank(&self) -> bool {
        self.year.is_none()
            && self.percentage.is_none()
            && [&self.companion, &self.country, &self.continent]
                .iter()
                .all(|s| s.as_deref().map_or(true, |v| v.trim().is_empty()))
    }
}

/// Canonical, typed survey response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurveyRecord {
    pub year: i32,
    pub companion: String,
    pub country: String,
    pub continent: String,
    pub value: Option<f64>,
}

impl SurveyRecord {
    /// Contribution of this record to a sum: absent values count as zero.
    #[inline]
    pub fn contribution(&self) -> f64 {
        self.value.unwrap_or(0.0)
    }
}

/// Rewrite known misspellings of companion labels.
pub fn correct_companion(label: &str) -> &str {
    if label == companion::MISSPELLED_BUSINESS {
        companion::BUSINESS
    } else {
        label
    }
}

/// Map a raw row into a canonical record.
///
/// Fails for a populated row without a usable year, or with a text field
/// absent altogether (a short CSV row). Empty text is fine.
pub fn normalize(raw: &RawRecord) -> Result<SurveyRecord, DashError> {
    let year = raw
        .year
        .ok_or_else(|| DashError::InvalidData(format!("Row without a year: {raw:?}")))?;
    let year = i32::try_from(year)
        .map_err(|_| DashError::InvalidData(format!("Year out of range: {year}")))?;

    let field = |value: &Option<String>, name: &str| {
        value
            .clone()
            .ok_or_else(|| DashError::InvalidData(format!("Row without {name}: {raw:?}")))
    };
    let companion = field(&raw.companion, survey::COMPANION)?;

    Ok(SurveyRecord {
        year,
        companion: correct_companion(&companion).to_string(),
        country: field(&raw.country, survey::COUNTRY)?,
        continent: field(&raw.continent, survey::CONTINENT)?,
        value: raw.percentage.filter(|v| !v.is_nan()),
    })
}
