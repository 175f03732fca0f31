use std::fs::File;
use std::path::Path;

use polars::prelude::*;
use tracing::{debug, info};

use crate::config::{JobConfig, SourceColumns};
use crate::error::{JobError, Result};

/// Loads the transaction file named by `config` and normalises its date column.
pub fn read_transactions(config: &JobConfig) -> Result<DataFrame> {
    let path = config.input_path();
    let df = read_csv(&path, config.delimiter_byte())?;
    info!(path = %path.display(), rows = df.height(), "loaded transaction file");

    require_columns(&df, &config.columns)?;
    normalize_dates(df, &config.columns.date, &config.date_format)
}

fn read_csv(path: &Path, delimiter: u8) -> Result<DataFrame> {
    // A missing file is InputMissing, never a parse error.
    File::open(path).map_err(|source| JobError::InputMissing {
        path: path.to_path_buf(),
        source,
    })?;

    // No date inference: the date column is always parsed with the configured format.
    let parse_options = CsvParseOptions::default().with_separator(delimiter);

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(10_000))
        .with_parse_options(parse_options)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|source| JobError::InputRead {
            path: path.to_path_buf(),
            source,
        })
}

/// Fails with every configured column that the frame lacks.
pub fn require_columns(df: &DataFrame, columns: &SourceColumns) -> Result<()> {
    let present = df.get_column_names();
    let missing: Vec<String> = columns
        .all()
        .iter()
        .filter(|name| !present.iter().any(|candidate| candidate.as_str() == **name))
        .map(|name| name.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(JobError::MissingColumns { columns: missing })
    }
}

/// Casts `column` to a polars `Date`.
///
/// Datetimes are truncated to their date. Strings, and integers such as
/// `20240105`, are parsed with `format`; any non-null value that fails to parse
/// is an error.
pub fn normalize_dates(df: DataFrame, column: &str, format: &str) -> Result<DataFrame> {
    let dtype = df.column(column)?.dtype().clone();
    debug!(column, %dtype, "normalising transaction dates");

    match dtype {
        DataType::Date => Ok(df),
        DataType::Datetime(_, _) | DataType::Null => Ok(df
            .lazy()
            .with_column(col(column).cast(DataType::Date))
            .collect()?),
        DataType::String => parse_dates(df, column, format),
        other if other.is_integer() => {
            let text = df
                .lazy()
                .with_column(col(column).cast(DataType::String))
                .collect()?;
            parse_dates(text, column, format)
        }
        other => Err(JobError::UnsupportedDateType {
            column: column.to_string(),
            dtype: other.to_string(),
        }),
    }
}

fn parse_dates(df: DataFrame, column: &str, format: &str) -> Result<DataFrame> {
    let nulls_before = df.column(column)?.null_count();
    let options = StrptimeOptions {
        format: Some(format.into()),
        strict: false,
        ..Default::default()
    };
    let parsed = df
        .lazy()
        .with_column(col(column).str().to_date(options))
        .collect()?;

    let nulls_after = parsed.column(column)?.null_count();
    if nulls_after > nulls_before {
        return Err(JobError::InvalidDate {
            column: column.to_string(),
            format: format.to_string(),
            count: nulls_after - nulls_before,
        });
    }
    Ok(parsed)
}
