use polars::prelude::DataFrame;
use tracing::info;

use super::{build_dimension, DimensionSpec, PRODUCT_COLUMNS, PRODUCT_KEY};
use crate::context::JobContext;
use crate::error::Result;

/// One row per distinct product under the configured dedup columns.
///
/// `id_produto` hashes name and manufacturer only, so two surviving rows that
/// differ just by category share a key.
pub fn build_products(ctx: &JobContext) -> Result<DataFrame> {
    let columns = &ctx.config.columns;
    let attributes = columns.product_attributes();
    let key_columns = columns.product_key_columns();
    let dedup_columns = ctx.config.product_dedup_columns();

    let df = build_dimension(
        ctx.source(),
        &DimensionSpec {
            key_column: PRODUCT_KEY,
            attributes: &attributes,
            output_names: &PRODUCT_COLUMNS,
            key_columns: &key_columns,
            dedup_columns: &dedup_columns,
        },
    )?;

    info!(rows = df.height(), dedup = ?dedup_columns, "built product dimension");
    Ok(df)
}
