mod common;

use common::{SORTED, fixture};
use popgrowth::Region;
use popgrowth::charts::{self, BIRTHS_NAME, DEATHS_NAME, GROWTH_NAME, derive_bar_chart};
use popgrowth::figure::{Base, Color, Figure, Trace};

const NONE: [&str; 0] = [];

fn bar(fig: &Figure, idx: usize) -> &popgrowth::figure::Bar {
    match &fig.data[idx] {
        Trace::Bar(b) => b,
        other => panic!("trace {idx} is not a bar: {other:?}"),
    }
}

#[test]
fn category_order_ignores_filters() {
    let ds = fixture();
    let selections: [(Option<Region>, Vec<&str>); 4] = [
        (None, vec![]),
        (Some(Region::Europe), vec![]),
        (None, vec!["Egypt", "Japan"]),
        (Some(Region::Asia), vec!["Nowhere", "Brazil"]),
    ];
    for (region, countries) in selections {
        let fig = derive_bar_chart(&ds, region, &countries);
        let pinned = fig.layout.xaxis.as_ref().unwrap().categoryarray.clone().unwrap();
        assert_eq!(pinned, SORTED);
        assert_eq!(bar(&fig, 0).x, SORTED);
        assert_eq!(bar(&fig, 2).x, SORTED);
        match &fig.data[4] {
            Trace::Scatter(s) => assert_eq!(s.x, SORTED),
            other => panic!("expected growth markers, got {other:?}"),
        }
    }
}

#[test]
fn no_filters_means_empty_highlights() {
    let ds = fixture();
    let fig = derive_bar_chart(&ds, None, &NONE);
    assert_eq!(fig.data.len(), 5, "no country highlight traces");

    let births = bar(&fig, 0);
    assert_eq!(births.name, BIRTHS_NAME);
    assert_eq!(births.y.len(), ds.len());
    assert_eq!(births.showlegend, Some(false));
    assert!(births.base.is_none(), "base bars stack from zero");

    let deaths = bar(&fig, 2);
    assert_eq!(deaths.name, DEATHS_NAME);
    assert_eq!(deaths.y.len(), ds.len());
    assert!(deaths.y.iter().all(|v| *v < 0.0), "deaths point down");

    for idx in [1, 3] {
        assert!(bar(&fig, idx).x.is_empty());
        assert!(bar(&fig, idx).y.is_empty());
    }
    assert_eq!(bar(&fig, 1).name, "");
}

#[test]
fn region_highlight_is_exactly_the_region() {
    let ds = fixture();
    let fig = derive_bar_chart(&ds, Some(Region::Europe), &NONE);

    let births = bar(&fig, 1);
    assert_eq!(births.name, "Europe");
    assert_eq!(births.x, ["Germany", "Italy"]);
    assert_eq!(births.y, [8.6, 8.6]);
    assert_eq!(births.base, Some(Base::Scalar(0.0)));
    assert_eq!(births.width, Some(0.8));

    let deaths = bar(&fig, 3);
    assert_eq!(deaths.x, ["Germany", "Italy"]);
    assert_eq!(deaths.y, [-11.8, -10.4]);
    assert_eq!(deaths.showlegend, Some(false));

    let expected: Vec<&str> = ds
        .sorted()
        .filter(|r| r.region == Region::Europe)
        .map(|r| r.country.as_str())
        .collect();
    assert_eq!(births.x, expected);
}

#[test]
fn region_without_rows_is_empty_not_error() {
    let csv = "country,lon,lat,birth_rate,death_rate,pop_growth,map_ref\nEgypt,30,27,28.1,6.5,24.5,Africa\n";
    let ds = popgrowth::storage::read_csv(csv.as_bytes()).unwrap();
    let fig = derive_bar_chart(&ds, Some(Region::Europe), &NONE);
    assert!(bar(&fig, 1).x.is_empty());
    assert!(bar(&fig, 3).x.is_empty());
    assert_eq!(bar(&fig, 1).name, "Europe");
}

#[test]
fn country_bar_spans_deaths_to_births() {
    let ds = fixture();
    let fig = derive_bar_chart(&ds, None, &["Egypt"]);
    assert_eq!(fig.data.len(), 6);

    let egypt = bar(&fig, 5);
    assert_eq!(egypt.name, "Egypt");
    assert_eq!(egypt.x, ["Egypt"]);
    match &egypt.base {
        Some(Base::PerBar(b)) => assert_eq!(b, &[-6.5]),
        other => panic!("unexpected base {other:?}"),
    }
    assert!((egypt.y[0] - 34.6).abs() < 1e-9);
}

#[test]
fn selected_countries_get_distinct_colors_and_unknowns_are_skipped() {
    let ds = fixture();
    let fig = derive_bar_chart(
        &ds,
        Some(Region::Asia),
        &["Japan", "Atlantis", "Korea, South", "Japan", "Niger"],
    );
    let names: Vec<&str> = fig.data[5..].iter().map(|t| t.name()).collect();
    assert_eq!(names, ["Japan", "Korea, South", "Niger"]);

    let colors: Vec<String> = fig.data[5..]
        .iter()
        .map(|t| match t {
            Trace::Bar(b) => match b.marker.as_ref().and_then(|m| m.color.clone()) {
                Some(Color::Solid(c)) => c,
                other => panic!("unexpected color {other:?}"),
            },
            other => panic!("unexpected trace {other:?}"),
        })
        .collect();
    assert_eq!(colors.len(), 3);
    assert_ne!(colors[0], colors[1]);
    assert_ne!(colors[1], colors[2]);
    assert_ne!(colors[0], colors[2]);
}

#[test]
fn growth_markers_use_raw_values() {
    let ds = fixture();
    let fig = derive_bar_chart(&ds, None, &NONE);
    let Some(Trace::Scatter(growth)) = fig.trace_named(GROWTH_NAME) else {
        panic!("growth trace missing");
    };
    assert_eq!(growth.mode, "markers");
    assert_eq!(growth.y.first(), Some(&-2.1));
    assert_eq!(growth.y.last(), Some(&31.9));
}

#[test]
fn derivation_is_idempotent() {
    let ds = fixture();
    let a = derive_bar_chart(&ds, Some(Region::Africa), &["Egypt", "Germany"]);
    let b = derive_bar_chart(&ds, Some(Region::Africa), &["Egypt", "Germany"]);
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn layout_matches_dashboard() {
    let ds = fixture();
    let fig = derive_bar_chart(&ds, None, &NONE);
    let v = serde_json::to_value(&fig).unwrap();
    assert_eq!(v["layout"]["barmode"], "relative");
    assert_eq!(v["layout"]["title"]["text"], charts::BAR_TITLE);
    assert_eq!(v["layout"]["height"], 600);
    assert_eq!(v["layout"]["xaxis"]["showticklabels"], false);
    assert_eq!(v["layout"]["xaxis"]["nticks"], 1);
    assert_eq!(v["layout"]["annotations"][0]["text"], "Births");
    assert_eq!(v["layout"]["annotations"][1]["y"], -5.0);
    assert_eq!(v["data"][0]["type"], "bar");
    assert_eq!(v["data"][4]["type"], "scatter");
}
