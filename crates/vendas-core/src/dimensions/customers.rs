use polars::prelude::DataFrame;
use tracing::info;

use super::{build_dimension, DimensionSpec, CUSTOMER_COLUMNS, CUSTOMER_KEY};
use crate::context::JobContext;
use crate::error::Result;

/// One row per distinct customer under the configured dedup columns.
pub fn build_customers(ctx: &JobContext) -> Result<DataFrame> {
    let columns = &ctx.config.columns;
    let attributes = columns.customer_attributes();
    let key_columns = columns.customer_key_columns();
    let dedup_columns = ctx.config.customer_dedup_columns();

    let df = build_dimension(
        ctx.source(),
        &DimensionSpec {
            key_column: CUSTOMER_KEY,
            attributes: &attributes,
            output_names: &CUSTOMER_COLUMNS,
            key_columns: &key_columns,
            dedup_columns: &dedup_columns,
        },
    )?;

    info!(rows = df.height(), dedup = ?dedup_columns, "built customer dimension");
    Ok(df)
}
