//! Chart derivation: turns the dataset plus the page's filter values into figures.
//!
//! Both functions are pure. [`derive_bar_chart`] runs on every control change;
//! [`map_figure`] runs once per dataset.

use crate::figure::{
    Annotation, Axis, Bar, Base, Color, ColorBar, Figure, Font, Geo, HoverLabel, Layout, Legend, Line,
    Margin, Marker, Scatter, ScatterGeo, Title, Trace,
};
use crate::models::{CountryRecord, Dataset, Region};
use crate::viz::util::office_hex;
use ahash::AHashSet;

pub const PAGE_TITLE: &str = "Population Birth Rate, Death Rate, and Net Growth - 2017";
pub const BAR_TITLE: &str =
    "Net Population Growth per 1,000 Inhabitants - 2017 (CIA World Factbook)";
pub const MAP_TITLE: &str = "Net Population Growth Rates per Country - 2017 (CIA World Factbook)";

pub const BIRTHS_NAME: &str = "Births per 1,000";
pub const DEATHS_NAME: &str = "Deaths per 1,000";
pub const GROWTH_NAME: &str = "Net Population Growth";

const NEUTRAL: &str = "#bbbbbb";
const HIGHLIGHT: &str = "#1f77b4";
const HOVER_BG: &str = "#444444";
const BACKGROUND: &str = "#eeeeee";
const BORDER: &str = "#cccccc";
const FONT_FAMILY: &str = "Palatino";
const HIGHLIGHT_WIDTH: f64 = 0.8;

/// Red (shrinking) through white (near zero) to dark green (fast growth).
pub const GROWTH_COLORSCALE: [(f64, &str); 3] = [
    (0.0, "rgba(214, 39, 40, 0.85)"),
    (0.142, "rgba(255, 255, 255, 0.85)"),
    (1.0, "rgba(6,54,21, 0.85)"),
];

/// Build the birth/death bar chart for the current filter values.
///
/// Trace order is fixed:
/// 1. all births (neutral), 2. births of `region`, 3. all deaths (neutral),
/// 4. deaths of `region`, 5. raw `pop_growth` markers, 6+. one span bar per selected
///    country, from `-death_rate` up to `birth_rate`.
///
/// Countries are drawn in the dataset's growth order no matter what is selected, and
/// `layout.xaxis.categoryarray` pins that order for the renderer. A region with no rows,
/// or country names not in the dataset, just yield empty highlights.
pub fn derive_bar_chart<S: AsRef<str>>(
    dataset: &Dataset,
    region: Option<Region>,
    countries: &[S],
) -> Figure {
    log::info!(
        "deriving bar chart: region={:?} countries={:?}",
        region.map(Region::label).unwrap_or(""),
        countries.iter().map(AsRef::as_ref).collect::<Vec<_>>()
    );

    let categories: Vec<String> = dataset.sorted().map(|r| r.country.clone()).collect();
    let in_region: Vec<&CountryRecord> = match region {
        Some(r) => dataset.in_region(r).collect(),
        None => Vec::new(),
    };
    let region_name = region.map(Region::label).unwrap_or("");
    let region_x: Vec<String> = in_region.iter().map(|r| r.country.clone()).collect();

    let mut data = vec![
        Trace::Bar(Bar {
            x: categories.clone(),
            y: dataset.sorted().map(|r| r.birth_rate).collect(),
            name: BIRTHS_NAME.into(),
            orientation: Some("v".into()),
            marker: Some(Marker::solid(NEUTRAL)),
            showlegend: Some(false),
            hoverlabel: Some(full_name_hover(Some(HOVER_BG))),
            ..Default::default()
        }),
        Trace::Bar(Bar {
            x: region_x.clone(),
            y: in_region.iter().map(|r| r.birth_rate).collect(),
            base: Some(Base::Scalar(0.0)),
            name: region_name.into(),
            marker: Some(Marker::solid(HIGHLIGHT)),
            width: Some(HIGHLIGHT_WIDTH),
            ..Default::default()
        }),
        Trace::Bar(Bar {
            x: categories.clone(),
            y: dataset.sorted().map(|r| -r.death_rate).collect(),
            name: DEATHS_NAME.into(),
            orientation: Some("v".into()),
            marker: Some(Marker::solid(NEUTRAL)),
            showlegend: Some(false),
            hoverlabel: Some(full_name_hover(Some(HOVER_BG))),
            ..Default::default()
        }),
        Trace::Bar(Bar {
            x: region_x,
            y: in_region.iter().map(|r| -r.death_rate).collect(),
            base: Some(Base::Scalar(0.0)),
            name: String::new(),
            marker: Some(Marker::solid(HIGHLIGHT)),
            showlegend: Some(false),
            width: Some(HIGHLIGHT_WIDTH),
            ..Default::default()
        }),
        // Raw pop_growth on purpose; only the map divides by 10.
        Trace::Scatter(Scatter {
            x: categories.clone(),
            y: dataset.sorted().map(|r| r.pop_growth).collect(),
            mode: "markers".into(),
            name: GROWTH_NAME.into(),
            marker: Some(Marker {
                size: Some(5.0),
                ..Marker::solid("red")
            }),
            showlegend: Some(false),
            hoverlabel: Some(full_name_hover(None)),
        }),
    ];

    let mut seen = AHashSet::new();
    let selected = countries
        .iter()
        .filter_map(|c| dataset.get(c.as_ref()))
        .filter(|r| seen.insert(r.country.as_str()));
    for (i, r) in selected.enumerate() {
        data.push(Trace::Bar(Bar {
            x: vec![r.country.clone()],
            y: vec![r.birth_rate + r.death_rate],
            base: Some(Base::PerBar(vec![-r.death_rate])),
            name: r.country.clone(),
            marker: Some(Marker::solid(&office_hex(i))),
            width: Some(HIGHLIGHT_WIDTH),
            ..Default::default()
        }));
    }

    Figure {
        data,
        layout: bar_layout(categories),
    }
}

fn full_name_hover(bgcolor: Option<&str>) -> HoverLabel {
    HoverLabel {
        namelength: -1,
        bgcolor: bgcolor.map(str::to_string),
    }
}

fn bar_layout(categories: Vec<String>) -> Layout {
    let label_font = || Font {
        family: None,
        size: Some(17.0),
    };
    Layout {
        title: Some(Title {
            text: BAR_TITLE.into(),
            font: Some(Font {
                family: None,
                size: Some(22.0),
            }),
        }),
        font: Some(Font {
            family: Some(FONT_FAMILY.into()),
            size: None,
        }),
        barmode: Some("relative".into()),
        paper_bgcolor: Some(BACKGROUND.into()),
        plot_bgcolor: Some(BACKGROUND.into()),
        height: Some(600),
        margin: Some(Margin {
            r: 0,
            l: 20,
            b: 50,
            t: 50,
        }),
        xaxis: Some(Axis {
            showticklabels: Some(false),
            showgrid: Some(true),
            nticks: Some((categories.len() as f64 * 0.1) as usize),
            categoryorder: Some("array".into()),
            categoryarray: Some(categories),
        }),
        legend: Some(Legend {
            orientation: "h".into(),
            x: 0.2,
        }),
        annotations: vec![
            Annotation {
                x: -8.0,
                y: 5.0,
                text: "Births".into(),
                showarrow: false,
                font: Some(label_font()),
            },
            Annotation {
                x: -8.0,
                y: -5.0,
                text: "Deaths".into(),
                showarrow: false,
                font: Some(label_font()),
            },
        ],
        ..Default::default()
    }
}

/// Build the world map: one marker per country, colored by growth percent.
pub fn map_figure(dataset: &Dataset) -> Figure {
    let records = dataset.records();
    let text = records
        .iter()
        .map(|r| {
            format!(
                "{}<br>Net Population Growth: {}%",
                r.country,
                decimal_literal(r.growth_percent())
            )
        })
        .collect();

    let trace = ScatterGeo {
        lon: records.iter().map(|r| r.lon).collect(),
        lat: records.iter().map(|r| r.lat).collect(),
        text,
        mode: "markers".into(),
        hoverinfo: "text".into(),
        name: String::new(),
        marker: Marker {
            color: Some(Color::Values(
                records.iter().map(CountryRecord::growth_percent).collect(),
            )),
            size: Some(22.0),
            line: Some(Line {
                color: "#000000".into(),
                width: 0.1,
            }),
            colorscale: Some(
                GROWTH_COLORSCALE
                    .iter()
                    .map(|(p, c)| (*p, c.to_string()))
                    .collect(),
            ),
            colorbar: Some(ColorBar {
                outlinewidth: 0.0,
                ticksuffix: "%".into(),
                tickformat: ".1f".into(),
            }),
            showscale: Some(true),
        },
    };

    Figure {
        data: vec![Trace::Scattergeo(trace)],
        layout: Layout {
            title: Some(Title {
                text: MAP_TITLE.into(),
                font: Some(Font {
                    family: None,
                    size: Some(22.0),
                }),
            }),
            font: Some(Font {
                family: Some(FONT_FAMILY.into()),
                size: None,
            }),
            paper_bgcolor: Some(BACKGROUND.into()),
            width: Some(1420),
            height: Some(750),
            geo: Some(Geo {
                showland: true,
                landcolor: BACKGROUND.into(),
                countrycolor: BORDER.into(),
                showcountries: true,
                oceancolor: BACKGROUND.into(),
                showocean: true,
                showcoastlines: true,
                showframe: false,
                coastlinecolor: BORDER.into(),
            }),
            ..Default::default()
        },
    }
}

/// Round to two decimals, ties to even, and print with a fractional part (`1.0`, `-0.25`).
pub fn decimal_literal(v: f64) -> String {
    let r = (v * 100.0).round_ties_even() / 100.0;
    let s = format!("{r}");
    if s.contains('.') || s.contains("inf") || s.contains("NaN") {
        s
    } else {
        format!("{s}.0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_literal_always_has_fraction() {
        assert_eq!(decimal_literal(1.0), "1.0");
        assert_eq!(decimal_literal(2.449), "2.45");
        assert_eq!(decimal_literal(-0.25), "-0.25");
        assert_eq!(decimal_literal(0.1234), "0.12");
        assert_eq!(decimal_literal(-16.0 / 10.0), "-1.6");
    }

    #[test]
    fn decimal_literal_rounds_half_to_even() {
        assert_eq!(decimal_literal(-0.05 / 10.0), "-0.0");
        assert_eq!(decimal_literal(0.125), "0.12");
        assert_eq!(decimal_literal(0.375), "0.38");
    }

    #[test]
    fn nticks_is_a_tenth_of_the_categories() {
        let cats: Vec<String> = (0..25).map(|i| format!("C{i}")).collect();
        let layout = bar_layout(cats);
        assert_eq!(layout.xaxis.unwrap().nticks, Some(2));
    }
}
