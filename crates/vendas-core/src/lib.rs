pub mod config;
pub mod context;
pub mod dimensions;
pub mod error;
pub mod facts;
pub mod job;
pub mod keys;
pub mod sink;
pub mod source;

use std::fmt;

pub use config::{JobConfig, SourceColumns};
pub use context::JobContext;
pub use error::{JobError, Result};
pub use job::{all_builders, run_job, RunReport, StageOutcome, StageReport, TableBuilder};

/// The four tables produced by a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Customers,
    Products,
    Calendar,
    Sales,
}

impl Entity {
    pub const ALL: [Entity; 4] = [
        Entity::Customers,
        Entity::Products,
        Entity::Calendar,
        Entity::Sales,
    ];

    /// Config table name and output file stem.
    pub fn as_str(&self) -> &'static str {
        match self {
            Entity::Customers => "clientes",
            Entity::Products => "produtos",
            Entity::Calendar => "datas",
            Entity::Sales => "vendas_fato",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
