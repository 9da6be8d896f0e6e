//! The dashboard's single HTML page.
//!
//! The page embeds both figures as JSON and lets Plotly.js draw them. Changing either
//! control POSTs the selection to `/api/bar-chart` and redraws the bar chart with the
//! response. Without JavaScript the controls submit as a plain GET form and the charts
//! fall back to the server-rendered SVGs.

use crate::charts::PAGE_TITLE;
use crate::figure::Figure;
use crate::models::{Dataset, FilterSelection, Region};
use anyhow::Result;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;
use std::fmt::Write;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";
const SOURCE_URL: &str =
    "https://www.cia.gov/library/publications/the-world-factbook/fields/2002.html";
const DESCRIPTION: &str = "The average annual percent change in the population, resulting \
from a surplus (or deficit) of births over deaths and the balance of migrants entering and \
leaving a country. The rate may be positive or negative. The growth rate is a factor in \
determining how great a burden would be imposed on a country by the changing needs of its \
people for infrastructure (e.g., schools, hospitals, housing, roads), resources (e.g., food, \
water, electricity), and jobs. Rapid population growth can be seen as threatening by \
neighboring countries.";

// Allow -, _, . unescaped in query values
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// Query string that reproduces `selection` (`region=..&country=..`), without the `?`.
pub fn selection_query(selection: &FilterSelection) -> String {
    let mut parts = Vec::new();
    if let Some(r) = selection.region {
        parts.push(format!("region={}", utf8_percent_encode(r.label(), SAFE)));
    }
    for c in &selection.countries {
        parts.push(format!("country={}", utf8_percent_encode(c, SAFE)));
    }
    parts.join("&")
}

/// Render the full page for the given selection.
pub fn render_page(
    dataset: &Dataset,
    selection: &FilterSelection,
    bar: &Figure,
    map: &Figure,
) -> Result<String> {
    let bar_json = script_json(bar)?;
    let map_json = script_json(map)?;
    let picked_json = script_json(&selection.countries)?;
    let query = selection_query(selection);

    let mut country_options = String::new();
    for name in dataset.country_names() {
        let selected = if selection.countries.iter().any(|c| c == name) {
            " selected"
        } else {
            ""
        };
        let name = escape_html(name);
        writeln!(
            country_options,
            r#"        <option value="{name}"{selected}>{name}</option>"#
        )?;
    }

    let mut region_options = String::from("        <option value=\"\">Regions</option>\n");
    for region in Region::ALL {
        let selected = if selection.region == Some(region) {
            " selected"
        } else {
            ""
        };
        writeln!(
            region_options,
            r#"        <option value="{label}"{selected}>{label}</option>"#,
            label = escape_html(region.label())
        )?;
    }

    let mut html = String::with_capacity(bar_json.len() + map_json.len() + 8 * 1024);
    write!(
        html,
        r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{title}</title>
  <script src="{plotly}"></script>
  <style>
    body {{ background-color: #eeeeee; font-family: Palatino, serif; margin: 0 1em; }}
    .controls {{ margin-left: 25%; background-color: #eeeeee; }}
    .controls select {{ width: 35%; display: inline-block; vertical-align: top; }}
  </style>
</head>
<body>
  <div id="pop_barchart"><noscript><img alt="bar chart" src="/chart/bar.svg?{query}"></noscript></div>
  <form class="controls" method="get" action="/">
    <select id="countries" name="country" multiple size="6">
{country_options}    </select>
    <select id="regions" name="region">
{region_options}    </select>
    <noscript><button type="submit">Update</button></noscript>
  </form>
  <div id="pop_growth_map"><noscript><img alt="world map" src="/chart/map.svg"></noscript></div>
  <p>
    Data: CIA World Factbook <a href="{source}">Population Growth Rate</a><br><br>
    {description}
  </p>
  <script>
    const config = {{ displayModeBar: false }};
    const barFigure = {bar_json};
    const mapFigure = {map_json};
    Plotly.newPlot("pop_barchart", barFigure.data, barFigure.layout, config);
    Plotly.newPlot("pop_growth_map", mapFigure.data, mapFigure.layout, config);

    // The select reports options in list order; keep the order they were picked in.
    const countriesEl = document.getElementById("countries");
    let picked = {picked_json};
    function syncPicked() {{
      const now = new Set(Array.from(countriesEl.selectedOptions, o => o.value));
      picked = picked.filter(c => now.has(c));
      for (const c of now) if (!picked.includes(c)) picked.push(c);
    }}

    async function refresh() {{
      const countries = picked;
      const region = document.getElementById("regions").value;
      const resp = await fetch("/api/bar-chart", {{
        method: "POST",
        headers: {{ "Content-Type": "application/json" }},
        body: JSON.stringify({{ region, countries }}),
      }});
      if (!resp.ok) return;
      const fig = await resp.json();
      Plotly.react("pop_barchart", fig.data, fig.layout, config);
    }}
    countriesEl.addEventListener("change", () => {{ syncPicked(); refresh(); }});
    document.getElementById("regions").addEventListener("change", refresh);
  </script>
</body>
</html>
"##,
        title = escape_html(PAGE_TITLE),
        plotly = PLOTLY_CDN,
        query = escape_html(&query),
        source = SOURCE_URL,
        description = escape_html(DESCRIPTION),
    )?;
    Ok(html)
}

/// Serialize for embedding inside a `<script>` element.
fn script_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
