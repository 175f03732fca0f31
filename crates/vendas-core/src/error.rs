// crates/vendas-core/src/error.rs

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum JobError {
    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("input file {path} could not be opened: {source}")]
    InputMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("input file {path} could not be read: {source}")]
    InputRead {
        path: PathBuf,
        #[source]
        source: polars::error::PolarsError,
    },

    #[error("input is missing required columns: {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    #[error("column '{column}' has {count} value(s) that are not dates in format '{format}'")]
    InvalidDate {
        column: String,
        format: String,
        count: usize,
    },

    #[error("column '{column}' has type {dtype}, expected a date, datetime or string")]
    UnsupportedDateType { column: String, dtype: String },

    #[error("cannot derive a calendar range: column '{column}' has no dates")]
    EmptyRange { column: String },

    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write output file {path}: {source}")]
    OutputFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode CSV for {path}: {source}")]
    OutputCsv {
        path: PathBuf,
        #[source]
        source: polars::error::PolarsError,
    },

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

pub type Result<T> = std::result::Result<T, JobError>;
