mod common;

use common::fixture;
use popgrowth::Region;
use popgrowth::stats::region_summary;

#[test]
fn summaries_follow_region_order_and_skip_empty() {
    let ds = fixture();
    let s = region_summary(&ds);
    let regions: Vec<Region> = s.iter().map(|x| x.region).collect();
    // every region has at least one fixture row
    assert_eq!(regions, Region::ALL);

    let africa = &s[0];
    assert_eq!(africa.count, 3);
    assert_eq!(africa.slowest, "Nigeria");
    assert_eq!(africa.fastest, "Niger");
    assert!((africa.mean_birth_rate - (28.1 + 44.8 + 36.9) / 3.0).abs() < 1e-9);
    assert!((africa.mean_growth_percent - (2.45 + 3.19 + 2.43) / 3.0).abs() < 1e-9);
}

#[test]
fn single_country_region() {
    let csv = "country,lon,lat,birth_rate,death_rate,pop_growth,map_ref\nGermany,9,51,8.6,11.8,-1.6,Europe\n";
    let ds = popgrowth::storage::read_csv(csv.as_bytes()).unwrap();
    let s = region_summary(&ds);
    assert_eq!(s.len(), 1);
    assert_eq!(s[0].region, Region::Europe);
    assert_eq!(s[0].slowest, s[0].fastest);
    assert_eq!(s[0].mean_death_rate, 11.8);
}
