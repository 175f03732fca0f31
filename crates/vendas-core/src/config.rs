use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{JobError, Result};
use crate::Entity;

/// Static job configuration, loaded from a TOML file.
///
/// Relative `input_dir` and `output_dir` values resolve against the directory
/// that holds the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    pub input_dir: PathBuf,
    pub input_file: String,
    pub output_dir: PathBuf,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default = "default_date_format")]
    pub date_format: String,
    #[serde(default)]
    pub columns: SourceColumns,
    pub clientes: DimensionConfig,
    pub produtos: DimensionConfig,
    pub datas: OutputConfig,
    pub vendas_fato: OutputConfig,
    #[serde(skip)]
    base_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub consolidate: bool,
    pub output_filepath: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DimensionConfig {
    #[serde(flatten)]
    pub output: OutputConfig,
    /// Columns that define a duplicate. `None` means every projected column.
    #[serde(default)]
    pub unique_identifiers_cols: Option<Vec<String>>,
}

/// Header names of the transaction file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SourceColumns {
    pub customer_name: String,
    pub city: String,
    pub state: String,
    pub product_name: String,
    pub category: String,
    pub manufacturer: String,
    pub date: String,
    pub quantity: String,
    pub total_value: String,
}

impl Default for SourceColumns {
    fn default() -> Self {
        Self {
            customer_name: "nome_cliente".to_string(),
            city: "cidade".to_string(),
            state: "estado".to_string(),
            product_name: "nome_produto".to_string(),
            category: "categoria".to_string(),
            manufacturer: "fabricante".to_string(),
            date: "data".to_string(),
            quantity: "qtd_vendida".to_string(),
            total_value: "valor_total".to_string(),
        }
    }
}

impl SourceColumns {
    pub fn all(&self) -> [&str; 9] {
        [
            self.customer_name.as_str(),
            self.city.as_str(),
            self.state.as_str(),
            self.product_name.as_str(),
            self.category.as_str(),
            self.manufacturer.as_str(),
            self.date.as_str(),
            self.quantity.as_str(),
            self.total_value.as_str(),
        ]
    }

    pub fn customer_attributes(&self) -> Vec<String> {
        vec![
            self.customer_name.clone(),
            self.city.clone(),
            self.state.clone(),
        ]
    }

    /// Natural key hashed into `id_cliente`. Shared by the customer dimension and the fact table.
    pub fn customer_key_columns(&self) -> Vec<String> {
        self.customer_attributes()
    }

    pub fn product_attributes(&self) -> Vec<String> {
        vec![
            self.product_name.clone(),
            self.category.clone(),
            self.manufacturer.clone(),
        ]
    }

    /// Natural key hashed into `id_produto`. Category is not part of it.
    pub fn product_key_columns(&self) -> Vec<String> {
        vec![self.product_name.clone(), self.manufacturer.clone()]
    }
}

fn default_delimiter() -> char {
    ','
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

impl JobConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| JobError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::from_toml_str(&text, base_dir)
    }

    pub fn from_toml_str(text: &str, base_dir: impl Into<PathBuf>) -> Result<Self> {
        let mut config: JobConfig = toml::from_str(text)?;
        config.base_dir = base_dir.into();
        config.validate()?;
        Ok(config)
    }

    pub fn input_path(&self) -> PathBuf {
        self.base_dir.join(&self.input_dir).join(&self.input_file)
    }

    pub fn output_root(&self) -> PathBuf {
        self.base_dir.join(&self.output_dir)
    }

    pub fn output(&self, entity: Entity) -> &OutputConfig {
        match entity {
            Entity::Customers => &self.clientes.output,
            Entity::Products => &self.produtos.output,
            Entity::Calendar => &self.datas,
            Entity::Sales => &self.vendas_fato,
        }
    }

    pub fn output_dir_for(&self, entity: Entity) -> PathBuf {
        self.output_root().join(&self.output(entity).output_filepath)
    }

    pub fn delimiter_byte(&self) -> u8 {
        // validate() guarantees an ASCII delimiter
        self.delimiter as u8
    }

    /// Dedup columns for the customer dimension, defaulting to the whole projection.
    pub fn customer_dedup_columns(&self) -> Vec<String> {
        self.clientes
            .unique_identifiers_cols
            .clone()
            .unwrap_or_else(|| self.columns.customer_attributes())
    }

    pub fn product_dedup_columns(&self) -> Vec<String> {
        self.produtos
            .unique_identifiers_cols
            .clone()
            .unwrap_or_else(|| self.columns.product_attributes())
    }

    fn validate(&self) -> Result<()> {
        if self.input_file.trim().is_empty() {
            return Err(JobError::Config("input_file must not be empty".to_string()));
        }
        if !self.delimiter.is_ascii() {
            return Err(JobError::Config(format!(
                "delimiter must be a single ASCII character, got '{}'",
                self.delimiter
            )));
        }

        for entity in Entity::ALL {
            if self.output(entity).output_filepath.trim().is_empty() {
                return Err(JobError::Config(format!(
                    "{}.output_filepath must not be empty",
                    entity.as_str()
                )));
            }
        }

        let headers = self.columns.all();
        let mut duplicates: Vec<&str> = headers
            .iter()
            .enumerate()
            .filter(|(idx, name)| headers[..*idx].contains(*name))
            .map(|(_, name)| *name)
            .collect();
        duplicates.sort_unstable();
        duplicates.dedup();
        if !duplicates.is_empty() {
            return Err(JobError::Config(format!(
                "[columns] maps more than one field to: {}",
                duplicates.join(", ")
            )));
        }

        check_dedup_columns(
            Entity::Customers,
            self.clientes.unique_identifiers_cols.as_deref(),
            &self.columns.customer_attributes(),
        )?;
        check_dedup_columns(
            Entity::Products,
            self.produtos.unique_identifiers_cols.as_deref(),
            &self.columns.product_attributes(),
        )?;

        Ok(())
    }
}

fn check_dedup_columns(
    entity: Entity,
    configured: Option<&[String]>,
    projection: &[String],
) -> Result<()> {
    let Some(configured) = configured else {
        return Ok(());
    };

    if configured.is_empty() {
        return Err(JobError::Config(format!(
            "{}.unique_identifiers_cols must list at least one column",
            entity.as_str()
        )));
    }

    let unknown: Vec<&str> = configured
        .iter()
        .filter(|name| !projection.contains(name))
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        return Err(JobError::Config(format!(
            "{}.unique_identifiers_cols has columns outside [{}]: {}",
            entity.as_str(),
            projection.join(", "),
            unknown.join(", ")
        )));
    }

    Ok(())
}
