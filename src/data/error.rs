use thiserror::Error;

use crate::config::ConfigError;

/// Everything that can go wrong between a URL / file and a loaded table.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("fetching workbook")]
    Fetch(#[from] reqwest::Error),

    #[error("reading workbook")]
    Workbook(#[from] calamine::Error),

    #[error("sheet '{sheet}' not found (available: {})", available.join(", "))]
    MissingSheet {
        sheet: String,
        available: Vec<String>,
    },

    #[error("missing required columns: {}", missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    #[error("no instrument rows found")]
    NoRows,

    #[error("reading CSV")]
    Csv(#[from] csv::Error),

    #[error("reading JSON")]
    Json(#[from] serde_json::Error),

    #[error("reading Parquet")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("decoding Arrow batch")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("unsupported file extension: .{0}")]
    UnsupportedFile(String),

    #[error("sheet layout")]
    Layout(#[from] ConfigError),

    #[error("I/O")]
    Io(#[from] std::io::Error),
}
