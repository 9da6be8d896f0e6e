use crate::models::{CountryRecord, Dataset, Region};
use serde::{Deserialize, Serialize};

/// Summary statistics for one region.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegionSummary {
    pub region: Region,
    pub count: usize,
    pub mean_birth_rate: f64,
    pub mean_death_rate: f64,
    /// Mean net growth as a percentage (`pop_growth / 10`).
    pub mean_growth_percent: f64,
    pub slowest: String,
    pub fastest: String,
}

/// Compute per-region statistics, in [`Region::ALL`] order. Regions without rows are skipped.
pub fn region_summary(dataset: &Dataset) -> Vec<RegionSummary> {
    let mut out = Vec::new();
    for region in Region::ALL {
        // growth order, so the ends are the slowest and fastest growers
        let rows: Vec<_> = dataset.in_region(region).collect();
        let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
            continue;
        };
        let n = rows.len() as f64;
        let mean = |f: fn(&CountryRecord) -> f64| {
            rows.iter().map(|r| f(r)).sum::<f64>() / n
        };
        out.push(RegionSummary {
            region,
            count: rows.len(),
            mean_birth_rate: mean(|r| r.birth_rate),
            mean_death_rate: mean(|r| r.death_rate),
            mean_growth_percent: mean(|r| r.growth_percent()),
            slowest: first.country.clone(),
            fastest: last.country.clone(),
        });
    }
    out
}
