//! Deterministic surrogate keys.
//!
//! A key is the first eight bytes (little-endian `i64`) of a BLAKE3 digest over
//! [`KEY_ALGORITHM`] followed by each field in order. A missing field is written
//! as `0x00`; a present field as `0x01`, its byte length as a little-endian
//! `u64`, then its UTF-8 bytes. Changing any part of this encoding changes every
//! key, so dimension and fact outputs must then be regenerated together.

use blake3::Hasher;
use polars::prelude::*;

use crate::error::Result;

pub const KEY_ALGORITHM: &str = "vendas-surrogate-key/v1";

const NULL_TAG: u8 = 0x00;
const VALUE_TAG: u8 = 0x01;

pub fn derive_key<'a, I>(fields: I) -> i64
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut hasher = Hasher::new();
    hasher.update(KEY_ALGORITHM.as_bytes());

    for field in fields {
        match field {
            None => {
                hasher.update(&[NULL_TAG]);
            }
            Some(value) => {
                hasher.update(&[VALUE_TAG]);
                hasher.update(&(value.len() as u64).to_le_bytes());
                hasher.update(value.as_bytes());
            }
        }
    }

    let digest = hasher.finalize();
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest.as_bytes()[..8]);
    i64::from_le_bytes(prefix)
}

/// Computes one key per row of `df` over `columns`, in order.
///
/// Columns are cast to their text form first, so `1` stored as an integer and
/// `"1"` stored as text produce the same key.
pub fn surrogate_keys(df: &DataFrame, columns: &[String], name: &str) -> Result<Series> {
    let text_columns = columns
        .iter()
        .map(|column| df.column(column)?.cast(&DataType::String))
        .collect::<PolarsResult<Vec<Column>>>()?;
    let values = text_columns
        .iter()
        .map(|column| column.str())
        .collect::<PolarsResult<Vec<&StringChunked>>>()?;

    let keys: Vec<i64> = (0..df.height())
        .map(|idx| derive_key(values.iter().map(|ca| ca.get(idx))))
        .collect();

    Ok(Series::new(name.into(), keys))
}
