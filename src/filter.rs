use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::DashError;
use crate::record::SurveyRecord;
use crate::schema::selector;

/// Year selector: one survey year or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum YearFilter {
    Year(i32),
    #[default]
    Both,
}

/// Companion selector: one label or all.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub enum CompanionFilter {
    Label(String),
    #[default]
    All,
}

/// Country selector: one country or no constraint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub enum CountryFilter {
    Label(String),
    #[default]
    All,
}

impl YearFilter {
    pub fn matches(&self, year: i32) -> bool {
        match self {
            Self::Year(y) => *y == year,
            Self::Both => true,
        }
    }
}

impl CompanionFilter {
    pub fn matches(&self, companion: &str) -> bool {
        match self {
            Self::Label(c) => c == companion,
            Self::All => true,
        }
    }
}

impl CountryFilter {
    pub fn matches(&self, country: &str) -> bool {
        match self {
            Self::Label(c) => c == country,
            Self::All => true,
        }
    }

    pub fn selected(&self) -> Option<&str> {
        match self {
            Self::Label(c) => Some(c),
            Self::All => None,
        }
    }
}

impl FromStr for YearFilter {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == selector::BOTH_YEARS {
            return Ok(Self::Both);
        }
        s.parse::<i32>()
            .map(Self::Year)
            .map_err(|_| DashError::InvalidFilter(format!("year '{s}'")))
    }
}

impl From<&str> for CompanionFilter {
    fn from(s: &str) -> Self {
        if s == selector::ALL_COMPANIONS {
            Self::All
        } else {
            Self::Label(s.to_string())
        }
    }
}

impl From<&str> for CountryFilter {
    fn from(s: &str) -> Self {
        if s == selector::ALL_COUNTRIES {
            Self::All
        } else {
            Self::Label(s.to_string())
        }
    }
}

impl fmt::Display for YearFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Year(y) => write!(f, "{y}"),
            Self::Both => f.write_str(selector::BOTH_YEARS),
        }
    }
}

impl fmt::Display for CompanionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Label(c) => f.write_str(c),
            Self::All => f.write_str(selector::ALL_COMPANIONS),
        }
    }
}

/// The three-part constraint derived from current selector state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FilterSpec {
    pub year: YearFilter,
    pub companion: CompanionFilter,
    pub country: CountryFilter,
}

impl FilterSpec {
    /// Build a filter from raw selector values (`"both"`, `"All"`, `""` mean no constraint).
    pub fn from_selectors(year: &str, companion: &str, country: &str) -> Result<Self, DashError> {
        Ok(Self {
            year: year.parse()?,
            companion: companion.into(),
            country: country.into(),
        })
    }

    pub fn matches(&self, record: &SurveyRecord) -> bool {
        self.year.matches(record.year)
            && self.companion.matches(&record.companion)
            && self.country.matches(&record.country)
    }

    /// Stable filter: the matching records, in input order.
    pub fn apply<'a>(&self, records: &'a [SurveyRecord]) -> Vec<&'a SurveyRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }

    // ── Per-chart projections ───────────────────────────────────────────────

    /// Map, radar and continent bars: year and companion, country ignored.
    pub fn without_country(&self) -> Self {
        Self {
            year: self.year,
            companion: self.companion.clone(),
            country: CountryFilter::All,
        }
    }

    /// Companion donut: year only.
    pub fn year_only(&self) -> Self {
        Self {
            year: self.year,
            ..Self::default()
        }
    }

    /// Trend chart: companion only. The country selector picks the trend mode.
    pub fn companion_only(&self) -> Self {
        Self {
            companion: self.companion.clone(),
            ..Self::default()
        }
    }
}
