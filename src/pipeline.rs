use serde::Serialize;
use tracing::debug;

use crate::aggregation::{
    companion_shares, continent_extremes, continent_radar, destination_trend, map_totals,
    CompanionSlice, ContinentBars, MapSeries, RadarChart, TrendChart,
};
use crate::config::ChartSettings;
use crate::dataset::Dataset;
use crate::filter::{CompanionFilter, CountryFilter, FilterSpec, YearFilter};
use crate::schema::selector;

/// Which selector changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Year,
    Companion,
    Country,
}

/// The selector change that turns `previous` into `next`, if any. Year and
/// companion changes dominate a simultaneous country change.
pub fn trigger_between(previous: &FilterSpec, next: &FilterSpec) -> Option<Trigger> {
    if previous.year != next.year {
        Some(Trigger::Year)
    } else if previous.companion != next.companion {
        Some(Trigger::Companion)
    } else if previous.country != next.country {
        Some(Trigger::Country)
    } else {
        None
    }
}

/// Every chart's data for one filter spec.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardFrame {
    pub filter: FilterSpec,
    pub map: MapSeries,
    pub companions: Vec<CompanionSlice>,
    pub trend: TrendChart,
    pub radar: RadarChart,
    pub continents: Vec<ContinentBars>,
}

/// Run all five aggregators against the dataset.
pub fn render(dataset: &Dataset, spec: &FilterSpec, settings: &ChartSettings) -> DashboardFrame {
    let records = dataset.records();
    let by_year_companion = spec.without_country().apply(records);

    let map = map_totals(&by_year_companion, settings);
    let companions = companion_shares(&spec.year_only().apply(records), settings);
    let trend = render_trend(dataset, spec, settings);
    let radar = continent_radar(&by_year_companion, settings.radar_headroom, &radar_label(spec));
    let continents = settings
        .continents
        .iter()
        .map(|c| continent_extremes(&by_year_companion, c))
        .collect();

    debug!(
        "Rendered frame for {:?}: {} map regions, {} companions, {} trend series",
        spec,
        map.points.len(),
        companions.len(),
        trend.series.len()
    );

    DashboardFrame {
        filter: spec.clone(),
        map,
        companions,
        trend,
        radar,
        continents,
    }
}

fn render_trend(dataset: &Dataset, spec: &FilterSpec, settings: &ChartSettings) -> TrendChart {
    let by_companion = spec.companion_only().apply(dataset.records());
    destination_trend(&by_companion, spec.country.selected(), settings.trend_top_n)
}

/// Radar series name, e.g. `2016 / ALONE` or `All Years / All`.
pub fn radar_label(spec: &FilterSpec) -> String {
    let year = match spec.year {
        YearFilter::Year(y) => y.to_string(),
        YearFilter::Both => selector::ALL_YEARS_LABEL.to_string(),
    };
    format!("{} / {}", year, spec.companion)
}

/// Trend for one companion selection with a country picked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryTrend {
    pub companion: CompanionFilter,
    pub country: String,
    pub trend: TrendChart,
}

/// Every view the selectors can reach, precomputed so the page can switch
/// without a round trip. `frames` hold one frame per year and companion option
/// with no country picked; `country_trends` replace the trend once one is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewCatalog {
    pub frames: Vec<DashboardFrame>,
    pub country_trends: Vec<CountryTrend>,
}

pub fn catalog(dataset: &Dataset, settings: &ChartSettings) -> ViewCatalog {
    let years: Vec<YearFilter> = dataset
        .year_options()
        .iter()
        .filter_map(|o| o.value.parse().ok())
        .collect();
    let companions: Vec<CompanionFilter> = dataset
        .companion_options()
        .iter()
        .map(|o| CompanionFilter::from(o.value.as_str()))
        .collect();
    let countries: Vec<String> = dataset
        .country_options()
        .into_iter()
        .map(|o| o.value)
        .filter(|c| !c.is_empty())
        .collect();

    let mut frames = Vec::with_capacity(years.len() * companions.len());
    for year in &years {
        for companion in &companions {
            let spec = FilterSpec {
                year: *year,
                companion: companion.clone(),
                country: CountryFilter::All,
            };
            frames.push(render(dataset, &spec, settings));
        }
    }

    let mut country_trends = Vec::with_capacity(companions.len() * countries.len());
    for companion in &companions {
        let spec = FilterSpec {
            companion: companion.clone(),
            ..FilterSpec::default()
        };
        let by_companion = spec.apply(dataset.records());
        for country in &countries {
            country_trends.push(CountryTrend {
                companion: companion.clone(),
                country: country.clone(),
                trend: destination_trend(&by_companion, Some(country), settings.trend_top_n),
            });
        }
    }

    debug!(
        "Built view catalog: {} frames, {} country trends",
        frames.len(),
        country_trends.len()
    );
    ViewCatalog {
        frames,
        country_trends,
    }
}

impl DashboardFrame {
    /// Re-run the charts a selector change affects. Year and companion
    /// changes rebuild the whole frame; a country change only the trend.
    pub fn refresh(
        &mut self,
        trigger: Trigger,
        dataset: &Dataset,
        spec: &FilterSpec,
        settings: &ChartSettings,
    ) {
        match trigger {
            Trigger::Year | Trigger::Companion => *self = render(dataset, spec, settings),
            Trigger::Country => {
                self.trend = render_trend(dataset, spec, settings);
                self.filter.country = spec.country.clone();
            }
        }
    }
}
