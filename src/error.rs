use thiserror::Error;

/// Reasons the dataset can fail to load. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column `{column}`")]
    MissingColumn { column: &'static str },

    /// `row` is 1-based and counts data rows only (the header is not row 1).
    #[error("row {row}: column `{column}` has invalid number {value:?}")]
    InvalidNumber {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("row {row}: unknown region {value:?} in column `map_ref`")]
    UnknownRegion { row: usize, value: String },

    #[error("row {row}: empty country name")]
    EmptyCountry { row: usize },

    #[error("duplicate country {country:?}")]
    DuplicateCountry { country: String },

    #[error("dataset has no rows")]
    Empty,
}
