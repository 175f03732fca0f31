use polars::prelude::*;
use tracing::info;

use crate::config::SourceColumns;
use crate::context::JobContext;
use crate::dimensions::calendar::DATE;
use crate::dimensions::{CUSTOMER_KEY, PRODUCT_KEY};
use crate::error::Result;
use crate::keys::surrogate_keys;

pub const QUANTITY: &str = "qtd_vendida";
pub const TOTAL_VALUE: &str = "valor_total";

pub fn build_sales(ctx: &JobContext) -> Result<DataFrame> {
    let df = sales_fact(ctx.source(), &ctx.config.columns)?;
    info!(rows = df.height(), "built sales fact table");
    Ok(df)
}

/// One fact row per transaction, in source order.
///
/// Keys are recomputed from the natural-key columns with the same derivation the
/// dimensions use; the dimension tables are never consulted. Headers are the
/// fixed fact names regardless of the source header names.
pub fn sales_fact(source: &DataFrame, columns: &SourceColumns) -> Result<DataFrame> {
    let customer_keys = surrogate_keys(source, &columns.customer_key_columns(), CUSTOMER_KEY)?;
    let product_keys = surrogate_keys(source, &columns.product_key_columns(), PRODUCT_KEY)?;

    let mut fact = source.select([
        columns.date.as_str(),
        columns.quantity.as_str(),
        columns.total_value.as_str(),
    ])?;
    fact.with_column(customer_keys)?;
    fact.with_column(product_keys)?;

    Ok(fact
        .lazy()
        .select([
            col(columns.date.as_str()).alias(DATE),
            col(CUSTOMER_KEY),
            col(PRODUCT_KEY),
            col(columns.quantity.as_str()).alias(QUANTITY),
            col(columns.total_value.as_str()).alias(TOTAL_VALUE),
        ])
        .collect()?)
}
