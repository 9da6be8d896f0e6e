use crate::error::DatasetError;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Geographic grouping of a country (the `map_ref` column).
///
/// The set is closed: a dataset row naming any other region fails to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "Africa")]
    Africa,
    #[serde(rename = "Arctic Region")]
    ArcticRegion,
    #[serde(rename = "Asia")]
    Asia,
    #[serde(rename = "Central America and the Caribbean")]
    CentralAmericaAndCaribbean,
    #[serde(rename = "Europe")]
    Europe,
    #[serde(rename = "Middle East")]
    MiddleEast,
    #[serde(rename = "North America")]
    NorthAmerica,
    #[serde(rename = "South America")]
    SouthAmerica,
    #[serde(rename = "Southeast Asia")]
    SoutheastAsia,
}

impl Region {
    /// All regions, in the order the region control lists them.
    pub const ALL: [Region; 9] = [
        Region::Africa,
        Region::ArcticRegion,
        Region::Asia,
        Region::CentralAmericaAndCaribbean,
        Region::Europe,
        Region::MiddleEast,
        Region::NorthAmerica,
        Region::SouthAmerica,
        Region::SoutheastAsia,
    ];

    /// Display label, identical to the value found in the `map_ref` column.
    pub fn label(self) -> &'static str {
        match self {
            Region::Africa => "Africa",
            Region::ArcticRegion => "Arctic Region",
            Region::Asia => "Asia",
            Region::CentralAmericaAndCaribbean => "Central America and the Caribbean",
            Region::Europe => "Europe",
            Region::MiddleEast => "Middle East",
            Region::NorthAmerica => "North America",
            Region::SouthAmerica => "South America",
            Region::SoutheastAsia => "Southeast Asia",
        }
    }

    /// Lenient lookup used for UI input: empty or unknown labels mean "no region".
    pub fn from_label(label: &str) -> Option<Region> {
        label.parse().ok()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error for labels outside [`Region::ALL`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRegion(pub String);

impl fmt::Display for UnknownRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown region {:?}", self.0)
    }
}

impl std::error::Error for UnknownRegion {}

impl FromStr for Region {
    type Err = UnknownRegion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Region::ALL
            .into_iter()
            .find(|r| r.label() == s)
            .ok_or_else(|| UnknownRegion(s.to_string()))
    }
}

/// One row of the dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryRecord {
    pub country: String,
    pub lon: f64,
    pub lat: f64,
    /// Births per 1,000 population.
    pub birth_rate: f64,
    /// Deaths per 1,000 population.
    pub death_rate: f64,
    /// Net growth, stored as ten times the displayed percentage.
    pub pop_growth: f64,
    pub region: Region,
}

impl CountryRecord {
    /// Net growth as the displayed annual percentage.
    pub fn growth_percent(&self) -> f64 {
        self.pop_growth / 10.0
    }
}

/// Immutable handle over the loaded table.
///
/// Built once at startup and shared (`Arc<Dataset>`) by everything that derives charts.
/// The ascending `pop_growth` order is computed here, once, with a stable sort so ties
/// keep source order.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<CountryRecord>,
    by_growth: Vec<usize>,
    index: AHashMap<String, usize>,
}

impl Dataset {
    /// Build the handle, rejecting duplicate country names.
    pub fn new(records: Vec<CountryRecord>) -> Result<Self, DatasetError> {
        let mut index = AHashMap::with_capacity(records.len());
        for (i, r) in records.iter().enumerate() {
            if index.insert(r.country.clone(), i).is_some() {
                return Err(DatasetError::DuplicateCountry {
                    country: r.country.clone(),
                });
            }
        }

        let mut by_growth: Vec<usize> = (0..records.len()).collect();
        by_growth.sort_by(|&a, &b| records[a].pop_growth.total_cmp(&records[b].pop_growth));

        Ok(Self {
            records,
            by_growth,
            index,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in source order.
    pub fn records(&self) -> &[CountryRecord] {
        &self.records
    }

    /// Records in ascending `pop_growth` order (the chart category order).
    pub fn sorted(&self) -> impl Iterator<Item = &CountryRecord> + '_ {
        self.by_growth.iter().map(move |&i| &self.records[i])
    }

    /// Records of one region, in ascending `pop_growth` order.
    pub fn in_region(&self, region: Region) -> impl Iterator<Item = &CountryRecord> + '_ {
        self.sorted().filter(move |r| r.region == region)
    }

    pub fn get(&self, country: &str) -> Option<&CountryRecord> {
        self.index.get(country).map(|&i| &self.records[i])
    }

    /// Distinct country names in source order (the country control's options).
    pub fn country_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.records.iter().map(|r| r.country.as_str())
    }
}

/// The two control values of the page. Decoded fresh from every request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    /// Empty string, `null` and unknown labels all decode to `None`.
    #[serde(default, deserialize_with = "de_region_lenient")]
    pub region: Option<Region>,
    /// Selection order is kept; it decides the highlight colors.
    #[serde(default)]
    pub countries: Vec<String>,
}

/// Serde helper: accept a region label, an empty string or `null`.
fn de_region_lenient<'de, D>(deserializer: D) -> Result<Option<Region>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Region::from_label))
}
