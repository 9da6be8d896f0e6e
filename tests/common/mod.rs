#![allow(dead_code)]

use popgrowth::{Dataset, storage};
use std::path::PathBuf;

pub fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/countries.csv")
}

pub fn fixture() -> Dataset {
    storage::load_csv(fixture_path()).expect("fixture loads")
}

/// Growth order of the fixture, ascending.
pub const SORTED: [&str; 15] = [
    "Japan",
    "Germany",
    "Greenland",
    "Italy",
    "Korea, South",
    "Brazil",
    "Canada",
    "United States",
    "Indonesia",
    "Mexico",
    "India",
    "Saudi Arabia",
    "Nigeria",
    "Egypt",
    "Niger",
];
