/// Column-name constants and fixed labels for the travel survey dashboard.
/// Single source of truth - exported to Python via PyO3.

// ── Survey CSV columns ──────────────────────────────────────────────────────
pub mod survey {
    pub const YEAR: &str = "Year";
    pub const COMPANION: &str = "Travelling Companion";
    pub const COUNTRY: &str = "Country";
    pub const CONTINENT: &str = "Continent";
    pub const PERCENTAGE: &str = "Percentage";

    pub const ALL: [&str; 5] = [YEAR, COMPANION, COUNTRY, CONTINENT, PERCENTAGE];
}

// ── Normalized record columns (records_df) ──────────────────────────────────
pub mod record {
    pub const YEAR: &str = "year";
    pub const COMPANION: &str = "companion";
    pub const COUNTRY: &str = "country";
    pub const CONTINENT: &str = "continent";
    pub const VALUE: &str = "value";
}

// ── Companion labels ────────────────────────────────────────────────────────
pub mod companion {
    pub const MISSPELLED_BUSINESS: &str = "WITH BUSINESS ACCOCIATE";
    pub const BUSINESS: &str = "WITH BUSINESS ASSOCIATE";
}

// ── Selector sentinels ──────────────────────────────────────────────────────
pub mod selector {
    pub const BOTH_YEARS: &str = "both";
    pub const BOTH_YEARS_LABEL: &str = "Both Years";
    pub const ALL_COMPANIONS: &str = "All";
    pub const ALL_COUNTRIES: &str = "";
    pub const ALL_COUNTRIES_LABEL: &str = "All Countries";
    pub const ALL_YEARS_LABEL: &str = "All Years";
}

// ── Trend chart axis ────────────────────────────────────────────────────────
pub mod trend {
    pub const YEARS: [i32; 2] = [2016, 2017];
}

// ── Continent bar panels ────────────────────────────────────────────────────
pub mod continents {
    pub const ASIA: &str = "Asia";
    pub const EUROPE: &str = "Europe";
    pub const OCEANIA: &str = "Oceania";
    pub const NORTH_AMERICA: &str = "North America";

    pub const PANELS: [&str; 4] = [ASIA, EUROPE, OCEANIA, NORTH_AMERICA];
}

// ── Prediction feed keys ────────────────────────────────────────────────────
pub mod prediction {
    pub const COMPANION: &str = "Companion";
    pub const YEAR: &str = "Year";
    pub const CONTINENT: &str = "Continent";
    pub const ACTUAL: &str = "Actual";
    pub const PREDICTED: &str = "Predicted";

    pub const ACTUAL_LABEL: &str = "Actual Destination";
    pub const PREDICTED_LABEL: &str = "Predicted Destination";
}

// ── Page regions ────────────────────────────────────────────────────────────
pub mod region {
    pub const MAP: &str = "popular-destinations-chart";
    pub const COMPANION_DONUT: &str = "companion-donut-chart";
    pub const COMPANION_LEGEND: &str = "companion-legend";
    pub const TREND: &str = "destination-trends-chart";
    pub const RADAR: &str = "radar-chart";
    pub const PRIMARY_PREDICTIONS: &str = "predictions-table-container";
    pub const HISTORICAL_PREDICTIONS: &str = "historical-predictions-table-container";
    pub const FUTURE_PREDICTIONS: &str = "future-predictions-table-container";

    pub const YEAR_SELECT: &str = "year-select";
    pub const COMPANION_SELECT: &str = "companion-select";
    pub const COUNTRY_SELECT: &str = "destination-country-select";

    /// Bar panel id for a continent, e.g. `North America` -> `bar-chart-north-america`.
    pub fn continent_bar(continent: &str) -> String {
        let slug = continent
            .trim()
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-");
        format!("bar-chart-{slug}")
    }
}
