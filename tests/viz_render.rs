mod common;

use common::fixture;
use popgrowth::charts::{derive_bar_chart, map_figure};
use popgrowth::viz::{self, categories, layout_bars, legend_items};
use popgrowth::Region;
use std::fs;

#[test]
fn bar_chart_renders_svg() {
    let ds = fixture();
    let fig = derive_bar_chart(&ds, Some(Region::Europe), &["Egypt"]);
    let svg = viz::render_bar_svg(&fig, 1000, 500).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("Births"));
    assert!(svg.contains("Deaths"));
    assert!(svg.contains("Net Population Growth per 1,000"));
    // legend shows the region and the selected country only
    assert!(svg.contains("Europe"));
    assert!(svg.contains("Egypt"));
    assert!(!svg.contains("Births per 1,000"));
}

#[test]
fn country_bar_resolves_to_its_span() {
    let ds = fixture();
    let fig = derive_bar_chart(&ds, None, &["Egypt"]);
    let cats = categories(&fig);
    let rects = layout_bars(&fig, &cats);
    let egypt_idx = cats.iter().position(|c| c == "Egypt").unwrap() as f64;
    let last = rects.last().unwrap();
    assert!((last.y0 + 6.5).abs() < 1e-9);
    assert!((last.y1 - 28.1).abs() < 1e-9);
    assert!((last.x0 - (egypt_idx - 0.4)).abs() < 1e-9);
    // births + deaths for every record, plus the highlight
    assert_eq!(rects.len(), 2 * ds.len() + 1);
}

#[test]
fn legend_hides_base_layers() {
    let ds = fixture();
    let fig = derive_bar_chart(&ds, Some(Region::Asia), &["Brazil", "Japan"]);
    let names: Vec<String> = legend_items(&fig).into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, ["Asia", "Brazil", "Japan"]);

    let fig = derive_bar_chart(&ds, None, &[] as &[&str]);
    assert!(legend_items(&fig).is_empty());
}

#[test]
fn map_renders_svg_to_file() {
    let ds = fixture();
    let svg = viz::render_map_svg(&map_figure(&ds), 1000, 520).unwrap();
    assert!(svg.contains("<circle"));
    assert!(svg.contains('%'), "colorbar ticks carry the suffix");

    let path = std::env::temp_dir().join("popgrowth_viz_map.svg");
    fs::write(&path, &svg).unwrap();
    let meta = fs::metadata(&path).expect("file created");
    assert!(meta.len() > 0, "svg has content");
    fs::remove_file(&path).ok();
}
