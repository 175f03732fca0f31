//! Calendar dimension: one row per day between the first and last transaction.
//!
//! `dia_da_semana` numbers days from Sunday: 1 = Sunday, 2 = Monday, ..., 7 = Saturday.

use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use tracing::info;

use crate::context::JobContext;
use crate::error::{JobError, Result};

pub const DATE: &str = "data";
pub const DAY: &str = "dia";
pub const MONTH: &str = "mes";
pub const YEAR: &str = "ano";
pub const WEEKDAY: &str = "dia_da_semana";

/// Days from 0001-01-01 (CE) to 1970-01-01; polars stores dates as days since the Unix epoch.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

pub fn build_calendar(ctx: &JobContext) -> Result<DataFrame> {
    let (start, end) = date_range(ctx.source(), &ctx.config.columns.date)?;
    let df = calendar_dimension(start, end)?;
    info!(%start, %end, rows = df.height(), "built calendar dimension");
    Ok(df)
}

/// Minimum and maximum of `column` over the whole frame, ignoring nulls.
pub fn date_range(source: &DataFrame, column: &str) -> Result<(NaiveDate, NaiveDate)> {
    let bounds = source
        .clone()
        .lazy()
        .select([
            col(column).min().alias("min_date"),
            col(column).max().alias("max_date"),
        ])
        .collect()?;

    let min = first_date(&bounds, "min_date")?;
    let max = first_date(&bounds, "max_date")?;

    match (min, max) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(JobError::EmptyRange {
            column: column.to_string(),
        }),
    }
}

fn first_date(bounds: &DataFrame, name: &str) -> Result<Option<NaiveDate>> {
    let days = bounds.column(name)?.cast(&DataType::Int32)?;
    Ok(days
        .i32()?
        .get(0)
        .and_then(|value| NaiveDate::from_num_days_from_ce_opt(value + UNIX_EPOCH_DAYS_FROM_CE)))
}

/// Builds the contiguous, inclusive daily sequence from `start` to `end`.
///
/// An inverted range yields an empty frame with the calendar schema.
pub fn calendar_dimension(start: NaiveDate, end: NaiveDate) -> Result<DataFrame> {
    let capacity = usize::try_from((end - start).num_days() + 1).unwrap_or(0);

    let mut epoch_days = Vec::with_capacity(capacity);
    let mut days = Vec::with_capacity(capacity);
    let mut months = Vec::with_capacity(capacity);
    let mut years = Vec::with_capacity(capacity);
    let mut weekdays = Vec::with_capacity(capacity);

    for date in start.iter_days().take_while(|date| *date <= end) {
        epoch_days.push(date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE);
        days.push(date.day() as i32);
        months.push(date.month() as i32);
        years.push(date.year());
        weekdays.push(date.weekday().number_from_sunday() as i32);
    }

    let dates = Series::new(DATE.into(), epoch_days).cast(&DataType::Date)?;

    let df = DataFrame::new(vec![
        dates.into(),
        Series::new(DAY.into(), days).into(),
        Series::new(MONTH.into(), months).into(),
        Series::new(YEAR.into(), years).into(),
        Series::new(WEEKDAY.into(), weekdays).into(),
    ])?;

    Ok(df)
}
