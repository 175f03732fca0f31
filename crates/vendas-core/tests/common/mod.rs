#![allow(dead_code)]

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use polars::prelude::*;
use vendas_core::{JobConfig, JobContext};

pub const CONFIG: &str = r#"
input_dir = "input"
input_file = "vendas.csv"
output_dir = "output"

[clientes]
consolidate = true
output_filepath = "clientes"
unique_identifiers_cols = ["nome_cliente", "cidade", "estado"]

[produtos]
consolidate = true
output_filepath = "produtos"
unique_identifiers_cols = ["nome_produto", "fabricante"]

[datas]
consolidate = true
output_filepath = "datas"

[vendas_fato]
consolidate = true
output_filepath = "vendas_fato"
"#;

pub const SCENARIO_CSV: &str = "\
nome_cliente,cidade,estado,nome_produto,categoria,fabricante,data,qtd_vendida,valor_total
Ana,SP,SP,Caneta,Papelaria,Bic,2024-01-01,2,5.0
Ana,SP,SP,Caderno,Papelaria,Tilibra,2024-01-03,1,20.0
Bruno,RJ,RJ,Caneta,Papelaria,Bic,2024-01-03,3,7.5
";

pub fn run_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 6).expect("valid run date")
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn config(base: &Path) -> JobConfig {
    JobConfig::from_toml_str(CONFIG, base).expect("fixture config parses")
}

pub fn write_input(base: &Path, csv: &str) {
    let input_dir = base.join("input");
    fs::create_dir_all(&input_dir).expect("create input dir");
    fs::write(input_dir.join("vendas.csv"), csv).expect("write input file");
}

/// Builds a transaction frame from
/// `(customer, city, state, product, category, manufacturer, date)` rows.
/// Quantities count up from 1 and totals are ten times the quantity.
pub fn transactions(rows: &[(&str, &str, &str, &str, &str, &str, &str)]) -> DataFrame {
    let quantities: Vec<i64> = (1..=rows.len() as i64).collect();
    let totals: Vec<f64> = quantities.iter().map(|qty| *qty as f64 * 10.0).collect();

    df!(
        "nome_cliente" => rows.iter().map(|row| row.0).collect::<Vec<_>>(),
        "cidade" => rows.iter().map(|row| row.1).collect::<Vec<_>>(),
        "estado" => rows.iter().map(|row| row.2).collect::<Vec<_>>(),
        "nome_produto" => rows.iter().map(|row| row.3).collect::<Vec<_>>(),
        "categoria" => rows.iter().map(|row| row.4).collect::<Vec<_>>(),
        "fabricante" => rows.iter().map(|row| row.5).collect::<Vec<_>>(),
        "data" => rows.iter().map(|row| row.6).collect::<Vec<_>>(),
        "qtd_vendida" => quantities,
        "valor_total" => totals,
    )
    .expect("fixture frame builds")
}

pub fn scenario_frame() -> DataFrame {
    transactions(&[
        ("Ana", "SP", "SP", "Caneta", "Papelaria", "Bic", "2024-01-01"),
        ("Ana", "SP", "SP", "Caderno", "Papelaria", "Tilibra", "2024-01-03"),
        ("Bruno", "RJ", "RJ", "Caneta", "Papelaria", "Bic", "2024-01-03"),
    ])
}

pub fn context(config: JobConfig, frame: DataFrame) -> JobContext {
    JobContext::from_frame(config, run_date(), frame).expect("context from frame")
}

pub fn string_values(df: &DataFrame, column: &str) -> Vec<Option<String>> {
    df.column(column)
        .expect("column exists")
        .str()
        .expect("string column")
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect()
}

pub fn i64_values(df: &DataFrame, column: &str) -> Vec<Option<i64>> {
    df.column(column)
        .expect("column exists")
        .i64()
        .expect("i64 column")
        .into_iter()
        .collect()
}

pub fn i32_values(df: &DataFrame, column: &str) -> Vec<Option<i32>> {
    df.column(column)
        .expect("column exists")
        .i32()
        .expect("i32 column")
        .into_iter()
        .collect()
}
