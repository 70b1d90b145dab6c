/// Visualization module: ECharts option documents and the dashboard page.
///
/// Chart rendering happens client-side in ECharts. This module turns a
/// `DashboardFrame` into one option object per chart region, builds the
/// companion legend markup, and emits a self-contained HTML shell. The shell
/// embeds the whole `ViewCatalog`, so the selectors switch views in the
/// browser: year and companion changes redraw every chart, a country change
/// only the trend.
use std::fmt::Write as FmtWrite;

use serde_json::{json, Map, Value};

use crate::aggregation::{CompanionSlice, ContinentBars, MapSeries, RadarChart, TrendChart};
use crate::dataset::SelectOption;
use crate::pipeline::{DashboardFrame, ViewCatalog};
use crate::predictions::{escape_html, FeedKind};
use crate::schema::region;

const ECHARTS_CDN: &str = "https://cdn.jsdelivr.net/npm/echarts@5/dist/echarts.min.js";
/// Registers the `world` map used by the choropleth.
const WORLD_MAP_CDN: &str = "https://cdn.jsdelivr.net/npm/echarts@4.9.0/map/js/world.js";
const MOST_PREFERRED_COLOR: &str = "#00c6ff";
const LEAST_PREFERRED_COLOR: &str = "#ee6666";

// ── Chart options ───────────────────────────────────────────────────────────

pub fn map_option(map: &MapSeries) -> Value {
    let data: Vec<Value> = map
        .points
        .iter()
        .map(|p| json!({ "name": p.label, "value": p.value }))
        .collect();
    json!({
        "tooltip": { "trigger": "item", "formatter": "{b}: {c}%" },
        "visualMap": {
            "type": "continuous",
            "min": map.min,
            "max": map.max,
            "calculable": true,
            "inRange": { "color": ["#e0f3f8", "#74a9cf", "#0570b0", "#023858", "#002f4b"] }
        },
        "series": [{
            "name": "Malaysian Travellers",
            "type": "map",
            "map": "world",
            "roam": true,
            "data": data
        }]
    })
}

pub fn companion_option(slices: &[CompanionSlice]) -> Value {
    let data: Vec<Value> = slices
        .iter()
        .map(|s| json!({ "name": s.label, "value": s.value, "itemStyle": { "color": s.color } }))
        .collect();
    json!({
        "tooltip": { "trigger": "item", "formatter": "{b}: {c}% ({d}%)" },
        "series": [{
            "name": "Companion Type",
            "type": "pie",
            "radius": ["50%", "75%"],
            "label": { "show": false },
            "labelLine": { "show": false },
            "data": data
        }]
    })
}

/// Legend list in slice order, one swatch per companion.
pub fn companion_legend_html(slices: &[CompanionSlice]) -> String {
    let mut html = String::from(r#"<ul class="custom-legend">"#);
    for s in slices {
        write!(
            html,
            r#"<li><span class="legend-color-swatch" style="background-color:{}"></span><span class="legend-label-text">{}</span></li>"#,
            escape_html(&s.color),
            escape_html(&s.label)
        )
        .ok();
    }
    html.push_str("</ul>");
    html
}

pub fn trend_option(trend: &TrendChart) -> Value {
    let legend: Vec<&str> = trend.series.iter().map(|s| s.name.as_str()).collect();
    let series: Vec<Value> = trend
        .series
        .iter()
        .map(|s| json!({ "name": s.name, "type": "line", "data": s.data }))
        .collect();
    json!({
        "tooltip": { "trigger": "axis" },
        "legend": { "data": legend },
        "xAxis": { "type": "category", "boundaryGap": false, "data": trend.categories },
        "yAxis": { "type": "value", "axisLabel": { "formatter": "{value}%" } },
        "series": series
    })
}

pub fn radar_option(radar: &RadarChart) -> Value {
    let indicator: Vec<Value> = radar
        .indicators
        .iter()
        .map(|i| json!({ "name": i.name, "max": i.max }))
        .collect();
    json!({
        "tooltip": { "trigger": "item" },
        "radar": { "indicator": indicator },
        "series": [{
            "name": "Preferred Continents",
            "type": "radar",
            "data": [{ "value": radar.values, "name": radar.series_name }],
            "areaStyle": { "opacity": 0.4 }
        }]
    })
}

/// Two bars (most then least preferred) or a title-only empty state.
pub fn continent_bar_option(panel: &ContinentBars) -> Value {
    let title = json!({ "text": panel.continent, "left": "center" });
    if panel.is_empty() {
        return json!({
            "title": title,
            "xAxis": { "show": false },
            "yAxis": { "show": false },
            "series": []
        });
    }

    let labels: Vec<&str> = panel.bars.iter().map(|b| b.label.as_str()).collect();
    let data: Vec<Value> = panel
        .bars
        .iter()
        .enumerate()
        .map(|(i, b)| {
            let color = if i == 0 {
                MOST_PREFERRED_COLOR
            } else {
                LEAST_PREFERRED_COLOR
            };
            json!({ "value": b.value, "itemStyle": { "color": color } })
        })
        .collect();
    json!({
        "title": title,
        "tooltip": { "trigger": "axis", "axisPointer": { "type": "shadow" } },
        "xAxis": { "type": "category", "data": labels, "axisTick": { "show": false } },
        "yAxis": { "type": "value", "min": 0, "max": "dataMax", "axisLabel": { "formatter": "{value}%" } },
        "series": [{
            "type": "bar",
            "data": data,
            "barWidth": 40,
            "label": { "show": true, "position": "top", "formatter": "{c}%" }
        }]
    })
}

/// Every chart option keyed by its region id, in page order.
pub fn chart_options(frame: &DashboardFrame) -> Vec<(String, Value)> {
    let mut options = vec![
        (region::MAP.to_string(), map_option(&frame.map)),
        (
            region::COMPANION_DONUT.to_string(),
            companion_option(&frame.companions),
        ),
        (region::TREND.to_string(), trend_option(&frame.trend)),
        (region::RADAR.to_string(), radar_option(&frame.radar)),
    ];
    for panel in &frame.continents {
        options.push((
            region::continent_bar(&panel.continent),
            continent_bar_option(panel),
        ));
    }
    options
}

/// Catalog as page data: `views[year][companion]` carries every chart option
/// plus the legend markup, `trends[companion][country]` the trend option.
pub fn catalog_json(catalog: &ViewCatalog) -> Value {
    let mut views = Map::new();
    for frame in &catalog.frames {
        let options: Map<String, Value> = chart_options(frame).into_iter().collect();
        insert_nested(
            &mut views,
            frame.filter.year.to_string(),
            frame.filter.companion.to_string(),
            json!({ "options": options, "legend": companion_legend_html(&frame.companions) }),
        );
    }

    let mut trends = Map::new();
    for entry in &catalog.country_trends {
        insert_nested(
            &mut trends,
            entry.companion.to_string(),
            entry.country.clone(),
            trend_option(&entry.trend),
        );
    }

    json!({ "views": views, "trends": trends })
}

/// `map[outer][inner] = value`, creating the inner object on first use.
fn insert_nested(map: &mut Map<String, Value>, outer: String, inner: String, value: Value) {
    if let Some(by_inner) = map.entry(outer).or_insert_with(|| json!({})).as_object_mut() {
        by_inner.insert(inner, value);
    }
}

/// Selector wiring. Expects `dashboard` (from `catalog_json`) and the region
/// constants to be declared before it.
const SELECTOR_SCRIPT: &str = r#"const charts = {};
const chart = (id) => {
  if (!charts[id]) charts[id] = echarts.init(document.getElementById(id));
  return charts[id];
};
const selected = (id) => document.getElementById(id).value;
const currentView = () =>
  (dashboard.views[selected(YEAR_SELECT)] || {})[selected(COMPANION_SELECT)];
function renderTrend() {
  const view = currentView();
  if (!view) return;
  const country = selected(COUNTRY_SELECT);
  const option = country === ""
    ? view.options[TREND_REGION]
    : (dashboard.trends[selected(COMPANION_SELECT)] || {})[country];
  if (option) chart(TREND_REGION).setOption(option, true);
}
function renderAll() {
  const view = currentView();
  if (!view) return;
  for (const [id, option] of Object.entries(view.options)) {
    if (id !== TREND_REGION) chart(id).setOption(option, true);
  }
  document.getElementById(LEGEND_REGION).innerHTML = view.legend;
  renderTrend();
}
document.getElementById(YEAR_SELECT).addEventListener("change", renderAll);
document.getElementById(COMPANION_SELECT).addEventListener("change", renderAll);
document.getElementById(COUNTRY_SELECT).addEventListener("change", renderTrend);
renderAll();
"#;

fn page_script(catalog: &ViewCatalog) -> String {
    let mut script = String::new();
    for (name, value) in [
        ("YEAR_SELECT", region::YEAR_SELECT),
        ("COMPANION_SELECT", region::COMPANION_SELECT),
        ("COUNTRY_SELECT", region::COUNTRY_SELECT),
        ("TREND_REGION", region::TREND),
        ("LEGEND_REGION", region::COMPANION_LEGEND),
    ] {
        writeln!(script, "const {} = {};", name, script_json(&Value::from(value))).ok();
    }
    writeln!(
        script,
        "const dashboard = {};",
        script_json(&catalog_json(catalog))
    )
    .ok();
    script.push_str(SELECTOR_SCRIPT);
    script
}

// ── Page ────────────────────────────────────────────────────────────────────

/// Everything the page shell needs. `frame` (the selection to open on) and
/// `catalog` are `None` when the survey dataset failed to load; prediction
/// tables render regardless.
pub struct DashboardPage<'a> {
    pub frame: Option<&'a DashboardFrame>,
    pub catalog: Option<ViewCatalog>,
    pub year_options: Vec<SelectOption>,
    pub companion_options: Vec<SelectOption>,
    pub country_options: Vec<SelectOption>,
    pub continent_panels: Vec<String>,
    pub tables: Vec<(FeedKind, String)>,
}

/// Main entry point: a self-contained HTML document.
pub fn generate_dashboard_html(page: &DashboardPage) -> String {
    let (year, companion, country) = match page.frame {
        Some(f) => (
            f.filter.year.to_string(),
            f.filter.companion.to_string(),
            f.filter.country.selected().unwrap_or("").to_string(),
        ),
        None => Default::default(),
    };

    let mut selectors = String::new();
    selectors.push_str(&select_html(region::YEAR_SELECT, &page.year_options, &year));
    selectors.push_str(&select_html(
        region::COMPANION_SELECT,
        &page.companion_options,
        &companion,
    ));
    selectors.push_str(&select_html(
        region::COUNTRY_SELECT,
        &page.country_options,
        &country,
    ));

    let mut regions = String::new();
    for id in [region::MAP, region::COMPANION_DONUT] {
        writeln!(regions, r#"<div id="{id}" class="chart"></div>"#).ok();
    }
    let legend = page
        .frame
        .map(|f| companion_legend_html(&f.companions))
        .unwrap_or_default();
    writeln!(
        regions,
        r#"<div id="{}">{}</div>"#,
        region::COMPANION_LEGEND,
        legend
    )
    .ok();
    for id in [region::TREND, region::RADAR] {
        writeln!(regions, r#"<div id="{id}" class="chart"></div>"#).ok();
    }
    for continent in &page.continent_panels {
        writeln!(
            regions,
            r#"<div id="{}" class="chart bar"></div>"#,
            region::continent_bar(continent)
        )
        .ok();
    }
    for (kind, html) in &page.tables {
        writeln!(regions, r#"<div id="{}">{}</div>"#, kind.region(), html).ok();
    }

    let script = page.catalog.as_ref().map(page_script).unwrap_or_default();

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>Travelling Companion Dashboard</title>
<script src="{cdn}"></script>
<script src="{world}"></script>
<style>.chart {{ width: 100%; height: 400px; }} .chart.bar {{ height: 300px; }}</style>
</head>
<body>
<div class="filters">
{selectors}</div>
{regions}<script>
{script}</script>
</body>
</html>
"##,
        cdn = ECHARTS_CDN,
        world = WORLD_MAP_CDN,
        selectors = selectors,
        regions = regions,
        script = script,
    )
}

fn select_html(id: &str, options: &[SelectOption], selected: &str) -> String {
    let mut html = format!(r#"<select id="{id}">"#);
    for o in options {
        write!(
            html,
            r#"<option value="{}"{}>{}</option>"#,
            escape_html(&o.value),
            if o.value == selected { " selected" } else { "" },
            escape_html(&o.label)
        )
        .ok();
    }
    html.push_str("</select>\n");
    html
}

/// JSON safe to inline inside a `<script>` element.
fn script_json(v: &Value) -> String {
    v.to_string().replace("</", "<\\/")
}
