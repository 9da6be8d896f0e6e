//! HTTP surface of the dashboard.
//!
//! All handlers share one read-only [`AppState`]. The map figure is derived once when
//! the state is built; the bar chart is derived per request from the filter values.

use crate::charts::{derive_bar_chart, map_figure};
use crate::figure::Figure;
use crate::models::{Dataset, FilterSelection, Region};
use crate::{page, viz};
use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

const DEFAULT_BAR_SIZE: (u32, u32) = (1200, 600);
const DEFAULT_MAP_SIZE: (u32, u32) = (1420, 750);
const MAX_SVG_SIDE: u32 = 4000;

pub struct AppState {
    pub dataset: Arc<Dataset>,
    /// Built once; the map never depends on the filters.
    pub map: Figure,
}

impl AppState {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        let map = map_figure(&dataset);
        Self { dataset, map }
    }

    fn bar_chart(&self, selection: &FilterSelection) -> Figure {
        derive_bar_chart(&self.dataset, selection.region, &selection.countries)
    }
}

/// Decoded `key=value` pairs of a query string, repeats kept in order.
type QueryPairs = Query<Vec<(String, String)>>;

/// Values accepted in GET query strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    pub selection: FilterSelection,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl QueryParams {
    /// Fold `region=..&country=..&country=..&width=..&height=..` pairs.
    ///
    /// Unknown keys and unparseable sizes are ignored; an empty or unknown region means
    /// no region.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut out = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "region" => out.selection.region = Region::from_label(&value),
                "country" | "countries" if !value.is_empty() => {
                    out.selection.countries.push(value)
                }
                "width" => out.width = value.parse().ok(),
                "height" => out.height = value.parse().ok(),
                _ => {}
            }
        }
        out
    }

    /// Requested canvas size, or `default`, capped at [`MAX_SVG_SIDE`]. `None` when a
    /// side is below `min`.
    fn size(&self, default: (u32, u32), min: (u32, u32)) -> Option<(u32, u32)> {
        let w = self.width.unwrap_or(default.0).min(MAX_SVG_SIDE);
        let h = self.height.unwrap_or(default.1).min(MAX_SVG_SIDE);
        (w >= min.0 && h >= min.1).then_some((w, h))
    }
}

#[derive(Debug, Serialize)]
pub struct OptionsResponse<'a> {
    pub countries: Vec<&'a str>,
    pub regions: Vec<&'static str>,
}

/// Build the router. Split out from [`start_server`] so tests can drive it directly.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/bar-chart", get(bar_chart_get).post(bar_chart_post))
        .route("/api/map", get(map_handler))
        .route("/api/options", get(options_handler))
        .route("/chart/bar.svg", get(bar_svg_handler))
        .route("/chart/map.svg", get(map_svg_handler))
        .route("/healthz", get(|| async { "ok" }))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(dataset: Arc<Dataset>, addr: SocketAddr) -> Result<()> {
    let state = Arc::new(AppState::new(dataset));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    log::info!("serving dashboard on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn index_handler(State(state): State<Arc<AppState>>, Query(pairs): QueryPairs) -> Response {
    let selection = QueryParams::from_pairs(pairs).selection;
    let bar = state.bar_chart(&selection);
    match page::render_page(&state.dataset, &selection, &bar, &state.map) {
        Ok(html) => Html(html).into_response(),
        Err(e) => internal_error("page", e),
    }
}

async fn bar_chart_get(
    State(state): State<Arc<AppState>>,
    Query(pairs): QueryPairs,
) -> Json<Figure> {
    Json(state.bar_chart(&QueryParams::from_pairs(pairs).selection))
}

async fn bar_chart_post(
    State(state): State<Arc<AppState>>,
    Json(selection): Json<FilterSelection>,
) -> Json<Figure> {
    Json(state.bar_chart(&selection))
}

async fn map_handler(State(state): State<Arc<AppState>>) -> Json<Figure> {
    Json(state.map.clone())
}

async fn options_handler(State(state): State<Arc<AppState>>) -> Response {
    let body = OptionsResponse {
        countries: state.dataset.country_names().collect(),
        regions: Region::ALL.iter().map(|r| r.label()).collect(),
    };
    Json(body).into_response()
}

async fn bar_svg_handler(State(state): State<Arc<AppState>>, Query(pairs): QueryPairs) -> Response {
    let params = QueryParams::from_pairs(pairs);
    let Some((w, h)) = params.size(DEFAULT_BAR_SIZE, viz::MIN_BAR_SIZE) else {
        return too_small(viz::MIN_BAR_SIZE);
    };
    let figure = state.bar_chart(&params.selection);
    svg_response("bar chart", viz::render_bar_svg(&figure, w, h))
}

async fn map_svg_handler(State(state): State<Arc<AppState>>, Query(pairs): QueryPairs) -> Response {
    let Some((w, h)) = QueryParams::from_pairs(pairs).size(DEFAULT_MAP_SIZE, viz::MIN_MAP_SIZE)
    else {
        return too_small(viz::MIN_MAP_SIZE);
    };
    svg_response("map", viz::render_map_svg(&state.map, w, h))
}

fn too_small(min: (u32, u32)) -> Response {
    (
        StatusCode::BAD_REQUEST,
        format!("width and height must be at least {}x{}", min.0, min.1),
    )
        .into_response()
}

fn svg_response(what: &str, rendered: Result<String>) -> Response {
    match rendered {
        Ok(svg) => ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response(),
        Err(e) => internal_error(what, e),
    }
}

fn internal_error(what: &str, e: anyhow::Error) -> Response {
    log::error!("failed to render {what}: {e:#}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("failed to render {what}: {e}"),
    )
        .into_response()
}
