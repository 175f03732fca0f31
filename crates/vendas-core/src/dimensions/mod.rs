pub mod calendar;
pub mod customers;
pub mod products;

use polars::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::keys::surrogate_keys;

pub const CUSTOMER_KEY: &str = "id_cliente";
pub const PRODUCT_KEY: &str = "id_produto";

/// Output headers of the customer attributes, whatever the source calls them.
pub const CUSTOMER_COLUMNS: [&str; 3] = ["nome_cliente", "cidade", "estado"];
pub const PRODUCT_COLUMNS: [&str; 3] = ["nome_produto", "categoria", "fabricante"];

/// Shape shared by the customer and product dimensions.
#[derive(Debug, Clone)]
pub struct DimensionSpec<'a> {
    pub key_column: &'a str,
    /// Projected attributes, in output order.
    pub attributes: &'a [String],
    /// Header written for each attribute, parallel to `attributes`.
    pub output_names: &'a [&'a str],
    /// Natural key hashed into `key_column`.
    pub key_columns: &'a [String],
    /// Columns that define a duplicate row.
    pub dedup_columns: &'a [String],
}

/// Projects `attributes`, keeps the first row of each `dedup_columns` group,
/// then attaches the surrogate key.
///
/// The key depends only on `key_columns`, never on the dedup subset. Output is
/// `key_column` followed by the attributes under their `output_names`, sorted
/// by the key columns and then the remaining attributes with nulls last.
pub fn build_dimension(source: &DataFrame, spec: &DimensionSpec<'_>) -> Result<DataFrame> {
    let projected = source.select(spec.attributes.iter().cloned())?;
    let deduped = projected.unique_stable(Some(spec.dedup_columns), UniqueKeepStrategy::First, None)?;
    debug!(
        key = spec.key_column,
        projected = projected.height(),
        kept = deduped.height(),
        "deduplicated dimension rows"
    );

    let keys = surrogate_keys(&deduped, spec.key_columns, spec.key_column)?;
    let mut keyed = deduped;
    keyed.with_column(keys)?;

    let mut output = vec![col(spec.key_column)];
    output.extend(
        spec.attributes
            .iter()
            .zip(spec.output_names)
            .map(|(name, header)| col(name.as_str()).alias(*header)),
    );

    let output_name = |attribute: &String| {
        spec.attributes
            .iter()
            .position(|name| name == attribute)
            .map(|idx| spec.output_names[idx])
    };
    let sort_order: Vec<Expr> = spec
        .key_columns
        .iter()
        .chain(
            spec.attributes
                .iter()
                .filter(|name| !spec.key_columns.contains(name)),
        )
        .filter_map(output_name)
        .map(col)
        .collect();

    let sorted = keyed
        .lazy()
        .select(output)
        .sort_by_exprs(
            sort_order,
            SortMultipleOptions::default()
                .with_nulls_last(true)
                .with_maintain_order(true),
        )
        .collect()?;

    Ok(sorted)
}
