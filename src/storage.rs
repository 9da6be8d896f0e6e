use crate::error::DatasetError;
use crate::figure::Figure;
use crate::models::{CountryRecord, Dataset, Region};
use anyhow::Result;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Columns the dataset must provide. Anything else in the file is ignored.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "country",
    "lon",
    "lat",
    "birth_rate",
    "death_rate",
    "pop_growth",
    "map_ref",
];

/// Load the dataset from a CSV file with a header row.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Dataset, DatasetError> {
    let file = File::open(path.as_ref())?;
    let ds = read_csv(file)?;
    log::info!(
        "loaded {} countries from {}",
        ds.len(),
        path.as_ref().display()
    );
    Ok(ds)
}

/// Parse the dataset from any CSV reader.
pub fn read_csv<R: Read>(reader: R) -> Result<Dataset, DatasetError> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let mut idx = [0usize; REQUIRED_COLUMNS.len()];
    for (slot, column) in idx.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == column)
            .ok_or(DatasetError::MissingColumn { column })?;
    }
    let [country, lon, lat, birth, death, growth, map_ref] = idx;

    let mut records = Vec::new();
    for (i, row) in rdr.records().enumerate() {
        let row = row?;
        let n = i + 1;
        let name = cell(&row, country);
        if name.is_empty() {
            return Err(DatasetError::EmptyCountry { row: n });
        }
        let region_raw = cell(&row, map_ref);
        let region: Region = region_raw
            .parse()
            .map_err(|_| DatasetError::UnknownRegion {
                row: n,
                value: region_raw.to_string(),
            })?;
        records.push(CountryRecord {
            country: name.to_string(),
            lon: number(&row, lon, n, "lon")?,
            lat: number(&row, lat, n, "lat")?,
            birth_rate: number(&row, birth, n, "birth_rate")?,
            death_rate: number(&row, death, n, "death_rate")?,
            pop_growth: number(&row, growth, n, "pop_growth")?,
            region,
        });
    }

    if records.is_empty() {
        return Err(DatasetError::Empty);
    }
    Dataset::new(records)
}

fn cell(row: &StringRecord, idx: usize) -> &str {
    row.get(idx).unwrap_or("")
}

fn number(
    row: &StringRecord,
    idx: usize,
    n: usize,
    column: &'static str,
) -> Result<f64, DatasetError> {
    let raw = cell(row, idx);
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(DatasetError::InvalidNumber {
            row: n,
            column,
            value: raw.to_string(),
        }),
    }
}

/// Save a figure as pretty Plotly-compatible JSON.
pub fn save_json<P: AsRef<Path>>(figure: &Figure, path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(figure)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "country,lon,lat,birth_rate,death_rate,pop_growth,map_ref\n";

    #[test]
    fn reads_rows_in_any_column_order() {
        let csv = "map_ref,country,extra,pop_growth,death_rate,birth_rate,lat,lon\n\
                   Europe,Germany,x,-1.6,11.7,8.6,51,9\n\
                   Africa,Egypt,y,24.5,6.5,28.1,27,30\n";
        let ds = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(ds.len(), 2);
        let egypt = ds.get("Egypt").unwrap();
        assert_eq!(egypt.birth_rate, 28.1);
        assert_eq!(egypt.region, Region::Africa);
        assert_eq!(egypt.lon, 30.0);
    }

    #[test]
    fn missing_column_is_named() {
        let csv = "country,lon,lat,birth_rate,pop_growth,map_ref\nX,1,2,3,4,Asia\n";
        let err = read_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DatasetError::MissingColumn { column: "death_rate" }));
        assert!(err.to_string().contains("death_rate"));
    }

    #[test]
    fn invalid_number_reports_row_and_column() {
        let csv = format!("{HEADER}A,1,2,3,4,5,Asia\nB,1,2,abc,4,5,Asia\n");
        let err = read_csv(csv.as_bytes()).unwrap_err();
        match err {
            DatasetError::InvalidNumber { row, column, value } => {
                assert_eq!(row, 2);
                assert_eq!(column, "birth_rate");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_and_non_finite_numbers_are_rejected() {
        let csv = format!("{HEADER}A,1,2,,4,5,Asia\n");
        assert!(matches!(
            read_csv(csv.as_bytes()),
            Err(DatasetError::InvalidNumber { .. })
        ));
        let csv = format!("{HEADER}A,1,2,NaN,4,5,Asia\n");
        assert!(matches!(
            read_csv(csv.as_bytes()),
            Err(DatasetError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn unknown_region_and_empty_table() {
        let csv = format!("{HEADER}A,1,2,3,4,5,Atlantis\n");
        assert!(matches!(
            read_csv(csv.as_bytes()),
            Err(DatasetError::UnknownRegion { row: 1, .. })
        ));
        assert!(matches!(read_csv(HEADER.as_bytes()), Err(DatasetError::Empty)));
    }
}
