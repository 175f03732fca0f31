use chrono::NaiveDate;
use polars::prelude::*;
use tracing::info;

use crate::config::JobConfig;
use crate::dimensions::calendar;
use crate::error::{JobError, Result};
use crate::source;

/// Everything a run shares: the configuration, the run date used to name
/// snapshots, and the transaction frame loaded once at startup.
///
/// Builders borrow the context; dropping it releases the source frame.
#[derive(Debug)]
pub struct JobContext {
    pub config: JobConfig,
    pub run_date: NaiveDate,
    source: DataFrame,
}

/// What `check` reports about a loaded source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSummary {
    pub rows: usize,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

impl JobContext {
    /// Reads the configured input file. Input errors are fatal for the whole run.
    pub fn open(config: JobConfig, run_date: NaiveDate) -> Result<Self> {
        let source = source::read_transactions(&config)?;
        Ok(Self::new(config, run_date, source))
    }

    /// Wraps an already-loaded frame, normalising its date column the same way `open` does.
    pub fn from_frame(config: JobConfig, run_date: NaiveDate, frame: DataFrame) -> Result<Self> {
        source::require_columns(&frame, &config.columns)?;
        let source = source::normalize_dates(frame, &config.columns.date, &config.date_format)?;
        Ok(Self::new(config, run_date, source))
    }

    fn new(config: JobConfig, run_date: NaiveDate, source: DataFrame) -> Self {
        info!(rows = source.height(), %run_date, "job context opened");
        Self {
            config,
            run_date,
            source,
        }
    }

    pub fn source(&self) -> &DataFrame {
        &self.source
    }

    pub fn summary(&self) -> Result<SourceSummary> {
        let date_range =
            match calendar::date_range(&self.source, &self.config.columns.date) {
                Ok(range) => Some(range),
                Err(JobError::EmptyRange { .. }) => None,
                Err(err) => return Err(err),
            };
        Ok(SourceSummary {
            rows: self.source.height(),
            date_range,
        })
    }
}

impl Drop for JobContext {
    fn drop(&mut self) {
        info!(rows = self.source.height(), "job context released");
    }
}
