//! Renderer-neutral chart specification.
//!
//! A [`Figure`] is an ordered list of traces plus layout metadata. It serializes to the
//! JSON shape Plotly.js expects (`{"data": [...], "layout": {...}}`), so the browser can
//! draw it as-is; [`crate::viz`] draws the same value server-side as SVG.
//!
//! Every container is a `Vec` and every struct has a fixed field order, so serializing
//! the same figure twice yields identical bytes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl Figure {
    /// Bar traces, in drawing order.
    pub fn bars(&self) -> impl Iterator<Item = &Bar> + '_ {
        self.data.iter().filter_map(|t| match t {
            Trace::Bar(b) => Some(b),
            _ => None,
        })
    }

    pub fn trace_named(&self, name: &str) -> Option<&Trace> {
        self.data.iter().find(|t| t.name() == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Bar(Bar),
    Scatter(Scatter),
    Scattergeo(ScatterGeo),
}

impl Trace {
    pub fn name(&self) -> &str {
        match self {
            Trace::Bar(b) => &b.name,
            Trace::Scatter(s) => &s.name,
            Trace::Scattergeo(g) => &g.name,
        }
    }
}

/// Where a bar starts. Unset means "stack on the previous bars" in relative mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Base {
    Scalar(f64),
    PerBar(Vec<f64>),
}

impl Base {
    pub fn at(&self, i: usize) -> f64 {
        match self {
            Base::Scalar(v) => *v,
            Base::PerBar(v) => v.get(i).copied().unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    Solid(String),
    /// Numeric values mapped through the marker's colorscale.
    Values(Vec<f64>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub x: Vec<String>,
    pub y: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<Base>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hoverlabel: Option<HoverLabel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scatter {
    pub x: Vec<String>,
    pub y: Vec<f64>,
    pub mode: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hoverlabel: Option<HoverLabel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScatterGeo {
    pub lon: Vec<f64>,
    pub lat: Vec<f64>,
    pub text: Vec<String>,
    pub mode: String,
    pub hoverinfo: String,
    #[serde(default)]
    pub name: String,
    pub marker: Marker,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<Line>,
    /// `(position in 0..=1, css color)` stops.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colorscale: Option<Vec<(f64, String)>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colorbar: Option<ColorBar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub showscale: Option<bool>,
}

impl Marker {
    pub fn solid(color: &str) -> Self {
        Self {
            color: Some(Color::Solid(color.to_string())),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub color: String,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorBar {
    pub outlinewidth: f64,
    pub ticksuffix: String,
    pub tickformat: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoverLabel {
    /// `-1` shows the full trace name.
    pub namelength: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bgcolor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barmode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paper_bgcolor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot_bgcolor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<Margin>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legend: Option<Legend>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<Geo>,
}

impl Layout {
    pub fn title_text(&self) -> &str {
        self.title.as_ref().map(|t| t.text.as_str()).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Title {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Font {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub r: u32,
    pub l: u32,
    pub b: u32,
    pub t: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub showticklabels: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub showgrid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nticks: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categoryorder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categoryarray: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Legend {
    pub orientation: String,
    pub x: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub showarrow: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geo {
    pub showland: bool,
    pub landcolor: String,
    pub countrycolor: String,
    pub showcountries: bool,
    pub oceancolor: String,
    pub showocean: bool,
    pub showcoastlines: bool,
    pub showframe: bool,
    pub coastlinecolor: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traces_are_tagged_with_plotly_type() {
        let t = Trace::Bar(Bar {
            x: vec!["A".into()],
            y: vec![1.0],
            base: Some(Base::Scalar(0.0)),
            name: "n".into(),
            ..Default::default()
        });
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(v["type"], "bar");
        assert_eq!(v["base"], 0.0);
        assert!(v.get("marker").is_none(), "unset options are omitted");

        let g = Trace::Scattergeo(ScatterGeo::default());
        assert_eq!(serde_json::to_value(&g).unwrap()["type"], "scattergeo");
    }

    #[test]
    fn color_and_base_are_untagged() {
        let m = Marker {
            color: Some(Color::Values(vec![0.5, -1.0])),
            colorscale: Some(vec![(0.0, "red".into()), (1.0, "blue".into())]),
            ..Default::default()
        };
        let v = serde_json::to_value(&m).unwrap();
        assert_eq!(v["color"], serde_json::json!([0.5, -1.0]));
        assert_eq!(v["colorscale"][1], serde_json::json!([1.0, "blue"]));

        let b: Base = serde_json::from_str("[-6.5]").unwrap();
        assert_eq!(b.at(0), -6.5);
        assert_eq!(b.at(3), 0.0);
    }
}
