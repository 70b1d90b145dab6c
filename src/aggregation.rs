use indexmap::IndexMap;
use serde::Serialize;

use crate::config::ChartSettings;
use crate::record::SurveyRecord;
use crate::schema::trend;

/// One labelled number: a map region, a bar, a pie slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelValue {
    pub label: String,
    pub value: f64,
}

impl LabelValue {
    fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Choropleth data plus the color-scale domain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapSeries {
    pub points: Vec<LabelValue>,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanionSlice {
    pub label: String,
    pub value: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    pub name: String,
    /// One total per entry of `TrendChart::categories`.
    pub data: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendChart {
    pub categories: Vec<String>,
    pub series: Vec<TrendSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarIndicator {
    pub name: String,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarChart {
    pub series_name: String,
    pub indicators: Vec<RadarIndicator>,
    /// Totals in indicator order.
    pub values: Vec<f64>,
}

/// Most and least preferred destination within one continent.
///
/// `bars` is either empty (nothing to show) or exactly two entries, most
/// preferred first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContinentBars {
    pub continent: String,
    pub bars: Vec<LabelValue>,
}

impl ContinentBars {
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

// ── Helpers ─────────────────────────────────────────────────────────────────

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Sum record contributions per key, keeping first-occurrence order.
fn group_sum<'a, I, K>(records: I, key: K) -> IndexMap<&'a str, f64>
where
    I: IntoIterator<Item = &'a SurveyRecord>,
    K: Fn(&'a SurveyRecord) -> &'a str,
{
    let mut totals: IndexMap<&'a str, f64> = IndexMap::new();
    for r in records {
        *totals.entry(key(r)).or_insert(0.0) += r.contribution();
    }
    totals
}

/// Stable descending sort by total.
fn sorted_desc<'a>(totals: IndexMap<&'a str, f64>) -> Vec<(&'a str, f64)> {
    let mut entries: Vec<(&str, f64)> = totals.into_iter().collect();
    entries.sort_by(|a, b| b.1.total_cmp(&a.1));
    entries
}

// ── Aggregators ─────────────────────────────────────────────────────────────

/// Per-country totals for the world map, rounded to two decimals.
///
/// Records without a value or country contribute nothing and do not create a
/// region. Labels go through the map's name table.
pub fn map_totals(records: &[&SurveyRecord], settings: &ChartSettings) -> MapSeries {
    let totals = group_sum(
        records
            .iter()
            .copied()
            .filter(|r| r.value.is_some() && !r.country.is_empty()),
        |r| r.country.trim(),
    );

    let points: Vec<LabelValue> = totals
        .into_iter()
        .map(|(country, total)| LabelValue::new(settings.map_name(country), round2(total)))
        .collect();

    let (min, max) = if points.is_empty() {
        (0.0, 100.0)
    } else {
        points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.value), hi.max(p.value))
        })
    };

    MapSeries { points, min, max }
}

/// Companion shares, largest first, colored by rank.
pub fn companion_shares(records: &[&SurveyRecord], settings: &ChartSettings) -> Vec<CompanionSlice> {
    let totals = group_sum(records.iter().copied(), |r| r.companion.as_str());
    let rounded: IndexMap<&str, f64> = totals.into_iter().map(|(k, v)| (k, round2(v))).collect();

    sorted_desc(rounded)
        .into_iter()
        .enumerate()
        .map(|(rank, (label, value))| CompanionSlice {
            label: label.to_string(),
            value,
            color: settings.color_for_rank(rank).to_string(),
        })
        .collect()
}

/// Year-over-year destination trend.
///
/// With a country selected, one series for that country (zeros when it has no
/// records). Otherwise the `top_n` countries by combined total over the trend
/// years, largest first; ties keep first-occurrence order.
pub fn destination_trend(
    records: &[&SurveyRecord],
    country: Option<&str>,
    top_n: usize,
) -> TrendChart {
    let categories = trend::YEARS.iter().map(|y| y.to_string()).collect();
    let year_slot = |year: i32| trend::YEARS.iter().position(|y| *y == year);

    let series = match country {
        Some(selected) => {
            let mut data = vec![0.0; trend::YEARS.len()];
            for r in records.iter().filter(|r| r.country == selected) {
                if let Some(slot) = year_slot(r.year) {
                    data[slot] += r.contribution();
                }
            }
            vec![TrendSeries {
                name: selected.to_string(),
                data,
            }]
        }
        None => {
            let mut per_country: IndexMap<&str, Vec<f64>> = IndexMap::new();
            for r in records {
                let data = per_country
                    .entry(r.country.as_str())
                    .or_insert_with(|| vec![0.0; trend::YEARS.len()]);
                if let Some(slot) = year_slot(r.year) {
                    data[slot] += r.contribution();
                }
            }

            let mut ranked: Vec<(&str, Vec<f64>)> = per_country.into_iter().collect();
            ranked.sort_by(|a, b| {
                let ta: f64 = a.1.iter().sum();
                let tb: f64 = b.1.iter().sum();
                tb.total_cmp(&ta)
            });

            ranked
                .into_iter()
                .take(top_n)
                .map(|(name, data)| TrendSeries {
                    name: name.to_string(),
                    data,
                })
                .collect()
        }
    };

    TrendChart { categories, series }
}

/// Continent totals on a shared radar scale.
pub fn continent_radar(records: &[&SurveyRecord], headroom: f64, series_name: &str) -> RadarChart {
    let ranked = sorted_desc(group_sum(records.iter().copied(), |r| r.continent.as_str()));

    let scale = ranked
        .iter()
        .map(|(_, v)| *v)
        .fold(f64::NEG_INFINITY, f64::max)
        * headroom;

    RadarChart {
        series_name: series_name.to_string(),
        indicators: ranked
            .iter()
            .map(|(name, _)| RadarIndicator {
                name: name.to_string(),
                max: scale,
            })
            .collect(),
        values: ranked.iter().map(|(_, v)| *v).collect(),
    }
}

/// Most and least preferred countries inside one continent.
///
/// Continent names compare case-insensitively after trimming. Countries whose
/// total is not positive are dropped. A single remaining country fills both
/// bars.
pub fn continent_extremes(records: &[&SurveyRecord], continent: &str) -> ContinentBars {
    let wanted = continent.trim().to_lowercase();
    let totals = group_sum(
        records.iter().copied().filter(|r| {
            !r.country.is_empty() && r.continent.trim().to_lowercase() == wanted
        }),
        |r| r.country.as_str(),
    );

    let mut most: Option<(&str, f64)> = None;
    let mut least: Option<(&str, f64)> = None;
    for (country, total) in totals.into_iter().filter(|(_, t)| *t > 0.0) {
        if most.map_or(true, |(_, m)| total > m) {
            most = Some((country, total));
        }
        if least.map_or(true, |(_, l)| total < l) {
            least = Some((country, total));
        }
    }

    let bars = match (most, least) {
        (Some(m), Some(l)) => vec![LabelValue::new(m.0, m.1), LabelValue::new(l.0, l.1)],
        _ => Vec::new(),
    };

    ContinentBars {
        continent: continent.to_string(),
        bars,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rec(year: i32, companion: &str, country: &str, continent: &str, value: Option<f64>) -> SurveyRecord {
        SurveyRecord {
            year,
            companion: companion.into(),
            country: country.into(),
            continent: continent.into(),
            value,
        }
    }

    fn refs(records: &[SurveyRecord]) -> Vec<&SurveyRecord> {
        records.iter().collect()
    }

    #[test]
    fn map_rounds_and_renames() {
        let records = vec![
            rec(2016, "ALONE", "USA", "North America", Some(1.111)),
            rec(2017, "ALONE", "USA", "North America", Some(2.222)),
            rec(2016, "ALONE", "Japan ", "Asia", Some(4.0)),
            rec(2016, "ALONE", "Korea", "Asia", None),
        ];
        let map = map_totals(&refs(&records), &ChartSettings::default());
        assert_eq!(
            map.points,
            vec![
                LabelValue::new("United States of America", 3.33),
                LabelValue::new("Japan", 4.0),
            ]
        );
        assert_eq!((map.min, map.max), (3.33, 4.0));
    }

    #[test]
    fn map_empty_domain_defaults() {
        let map = map_totals(&[], &ChartSettings::default());
        assert!(map.points.is_empty());
        assert_eq!((map.min, map.max), (0.0, 100.0));
    }

    #[test]
    fn companions_sorted_with_cycled_palette() {
        let settings = ChartSettings {
            palette: vec!["#a".into(), "#b".into()],
            ..ChartSettings::default()
        };
        let records = vec![
            rec(2016, "ALONE", "Japan", "Asia", Some(1.0)),
            rec(2016, "WITH SPOUSE", "Japan", "Asia", Some(5.0)),
            rec(2016, "WITH FAMILY", "Japan", "Asia", Some(3.006)),
            rec(2016, "ALONE", "Japan", "Asia", None),
        ];
        let slices = companion_shares(&refs(&records), &settings);
        let got: Vec<(&str, f64, &str)> = slices
            .iter()
            .map(|s| (s.label.as_str(), s.value, s.color.as_str()))
            .collect();
        assert_eq!(
            got,
            vec![
                ("WITH SPOUSE", 5.0, "#a"),
                ("WITH FAMILY", 3.01, "#b"),
                ("ALONE", 1.0, "#a"),
            ]
        );
    }

    #[test]
    fn companion_ties_keep_first_occurrence() {
        let records = vec![
            rec(2016, "B", "Japan", "Asia", Some(2.0)),
            rec(2016, "A", "Japan", "Asia", Some(2.0)),
        ];
        let slices = companion_shares(&refs(&records), &ChartSettings::default());
        assert_eq!(slices[0].label, "B");
        assert_eq!(slices[1].label, "A");
    }

    #[test]
    fn trend_single_country() {
        let records = vec![
            rec(2016, "ALONE", "Japan", "Asia", Some(10.0)),
            rec(2016, "WITH SPOUSE", "Japan", "Asia", Some(2.5)),
            rec(2017, "ALONE", "Japan", "Asia", Some(7.25)),
            rec(2017, "ALONE", "Thailand", "Asia", Some(99.0)),
        ];
        let chart = destination_trend(&refs(&records), Some("Japan"), 5);
        assert_eq!(chart.categories, vec!["2016", "2017"]);
        assert_eq!(
            chart.series,
            vec![TrendSeries {
                name: "Japan".into(),
                data: vec![12.5, 7.25],
            }]
        );
    }

    #[test]
    fn trend_unknown_country_is_zero_series() {
        let chart = destination_trend(&[], Some("Atlantis"), 5);
        assert_eq!(chart.series.len(), 1);
        assert_eq!(chart.series[0].data, vec![0.0, 0.0]);
    }

    #[test]
    fn trend_top_five_of_eight() {
        let totals = [3.0, 8.0, 1.0, 7.0, 5.0, 2.0, 6.0, 4.0];
        let records: Vec<SurveyRecord> = totals
            .iter()
            .enumerate()
            .flat_map(|(i, t)| {
                let name = format!("C{i}");
                vec![
                    rec(2016, "ALONE", &name, "Asia", Some(t / 2.0)),
                    rec(2017, "ALONE", &name, "Asia", Some(t / 2.0)),
                ]
            })
            .collect();
        let chart = destination_trend(&refs(&records), None, 5);
        let names: Vec<&str> = chart.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["C1", "C3", "C6", "C4", "C7"]);
    }

    #[test]
    fn trend_ties_at_cutoff_keep_first_seen() {
        // D, B and E tie at 4; only two slots remain after A and C
        let records = vec![
            rec(2016, "ALONE", "D", "Asia", Some(4.0)),
            rec(2016, "ALONE", "A", "Asia", Some(9.0)),
            rec(2017, "ALONE", "B", "Asia", Some(4.0)),
            rec(2016, "ALONE", "C", "Asia", Some(6.0)),
            rec(2016, "ALONE", "E", "Asia", Some(1.5)),
            rec(2017, "ALONE", "E", "Asia", Some(2.5)),
        ];
        let chart = destination_trend(&refs(&records), None, 4);
        let names: Vec<&str> = chart.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C", "D", "B"]);
    }

    #[test]
    fn trend_empty_has_no_series() {
        let chart = destination_trend(&[], None, 5);
        assert!(chart.series.is_empty());
        assert_eq!(chart.categories.len(), 2);
    }

    #[test]
    fn radar_shared_scale() {
        let records = vec![
            rec(2016, "ALONE", "Japan", "Asia", Some(10.0)),
            rec(2016, "ALONE", "France", "Europe", Some(20.0)),
            rec(2016, "ALONE", "Korea", "Asia", Some(5.0)),
            rec(2016, "ALONE", "Fiji", "Oceania", None),
        ];
        let radar = continent_radar(&refs(&records), 1.1, "2016 / ALONE");
        let names: Vec<&str> = radar.indicators.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Europe", "Asia", "Oceania"]);
        assert_eq!(radar.values, vec![20.0, 15.0, 0.0]);
        for indicator in &radar.indicators {
            assert!((indicator.max - 22.0).abs() < 1e-9);
        }
        assert_eq!(radar.series_name, "2016 / ALONE");
    }

    #[test]
    fn radar_empty() {
        let radar = continent_radar(&[], 1.1, "All Years / All");
        assert!(radar.indicators.is_empty());
        assert!(radar.values.is_empty());
    }

    #[test]
    fn continent_extremes_tie_and_zero() {
        let records = vec![
            rec(2016, "ALONE", "A", "Asia", Some(5.0)),
            rec(2016, "ALONE", "B", "Asia", Some(5.0)),
            rec(2016, "ALONE", "C", "Asia", Some(0.0)),
        ];
        let bars = continent_extremes(&refs(&records), "Asia");
        assert_eq!(
            bars.bars,
            vec![LabelValue::new("A", 5.0), LabelValue::new("A", 5.0)]
        );
    }

    #[test]
    fn continent_extremes_least_tie_keeps_first_seen() {
        let records = vec![
            rec(2016, "ALONE", "A", "Europe", Some(5.0)),
            rec(2016, "ALONE", "B", "Europe", Some(3.0)),
            rec(2016, "ALONE", "C", "Europe", Some(3.0)),
        ];
        let bars = continent_extremes(&refs(&records), "Europe");
        assert_eq!(
            bars.bars,
            vec![LabelValue::new("A", 5.0), LabelValue::new("B", 3.0)]
        );
    }

    #[test]
    fn continent_extremes_most_then_least() {
        let records = vec![
            rec(2016, "ALONE", "Japan", " asia ", Some(4.0)),
            rec(2016, "ALONE", "Korea", "ASIA", Some(9.0)),
            rec(2016, "ALONE", "Laos", "Asia", Some(1.0)),
            rec(2016, "ALONE", "France", "Europe", Some(50.0)),
            rec(2016, "ALONE", "", "Asia", Some(80.0)),
        ];
        let bars = continent_extremes(&refs(&records), "Asia");
        assert_eq!(
            bars.bars,
            vec![LabelValue::new("Korea", 9.0), LabelValue::new("Laos", 1.0)]
        );
    }

    #[test]
    fn continent_extremes_single_country_twice() {
        let records = vec![rec(2016, "ALONE", "Fiji", "Oceania", Some(2.5))];
        let bars = continent_extremes(&refs(&records), "Oceania");
        assert_eq!(
            bars.bars,
            vec![LabelValue::new("Fiji", 2.5), LabelValue::new("Fiji", 2.5)]
        );
    }

    #[test]
    fn continent_extremes_empty_state() {
        let records = vec![rec(2016, "ALONE", "Canada", "North America", None)];
        let bars = continent_extremes(&refs(&records), "North America");
        assert!(bars.is_empty());
        assert_eq!(bars.continent, "North America");
        assert!(continent_extremes(&[], "Europe").is_empty());
    }
}
