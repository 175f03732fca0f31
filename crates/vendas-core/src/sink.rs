use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use polars::prelude::*;
use tracing::info;

use crate::error::{JobError, Result};

/// Files written for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenTable {
    pub snapshot: PathBuf,
    pub latest: PathBuf,
    pub rows: usize,
}

pub fn snapshot_file_name(entity: &str, run_date: NaiveDate) -> String {
    format!("{entity}_{}.csv", run_date.format("%Y%m%d"))
}

pub fn latest_file_name(entity: &str) -> String {
    format!("{entity}.csv")
}

/// Writes `df` to `<dir>/<entity>_<YYYYMMDD>.csv` and `<dir>/<entity>.csv`.
///
/// `dir` is created if absent. The latest copy goes through a temporary file
/// and a rename, so an existing `<entity>.csv` is only replaced once the new
/// one is complete.
pub fn write_table(
    dir: &Path,
    entity: &str,
    run_date: NaiveDate,
    df: &mut DataFrame,
) -> Result<WrittenTable> {
    fs::create_dir_all(dir).map_err(|source| JobError::OutputDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let snapshot = dir.join(snapshot_file_name(entity, run_date));
    write_csv(&snapshot, df)?;

    let latest = dir.join(latest_file_name(entity));
    let staging = dir.join(format!(".{entity}.csv.tmp"));
    write_csv(&staging, df)?;
    fs::rename(&staging, &latest).map_err(|source| JobError::OutputFile {
        path: latest.clone(),
        source,
    })?;

    info!(
        entity,
        rows = df.height(),
        snapshot = %snapshot.display(),
        latest = %latest.display(),
        "wrote table"
    );

    Ok(WrittenTable {
        snapshot,
        latest,
        rows: df.height(),
    })
}

fn write_csv(path: &Path, df: &mut DataFrame) -> Result<()> {
    let mut file = File::create(path).map_err(|source| JobError::OutputFile {
        path: path.to_path_buf(),
        source,
    })?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .map_err(|source| JobError::OutputCsv {
            path: path.to_path_buf(),
            source,
        })
}
