//! popgrowth
//!
//! A lightweight Rust library and web dashboard for per-country birth rate, death rate,
//! and net population growth (2017, CIA World Factbook). Pairs with the `popgrowth` CLI.
//!
//! ### Features
//! - Load the country table from CSV once, into an immutable [`Dataset`]
//! - Derive the birth/death bar chart for any region/country selection (pure, deterministic)
//! - Derive the world map of growth rates
//! - Serve both on one page, or render them to SVG / Plotly JSON from the CLI
//! - Per-region summary statistics
//!
//! ### Example
//! ```no_run
//! use popgrowth::{Region, charts, storage, viz};
//!
//! let data = storage::load_csv("data/country_data_master.csv")?;
//! let bar = charts::derive_bar_chart(&data, Some(Region::Europe), &["Egypt"]);
//! std::fs::write("bar.svg", viz::render_bar_svg(&bar, 1200, 600)?)?;
//! storage::save_json(&charts::map_figure(&data), "map.json")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod charts;
pub mod error;
pub mod figure;
pub mod models;
pub mod page;
pub mod server;
pub mod stats;
pub mod storage;
pub mod viz;

pub use error::DatasetError;
pub use figure::Figure;
pub use models::{CountryRecord, Dataset, FilterSelection, Region};
