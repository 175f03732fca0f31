use once_cell::sync::Lazy;
use polars::prelude::DataFrame;
use tracing::{error, info, info_span};

use crate::context::JobContext;
use crate::dimensions::{calendar, customers, products};
use crate::error::Result;
use crate::facts;
use crate::sink::{self, WrittenTable};
use crate::Entity;

/// One output table of the star schema.
pub trait TableBuilder: Send + Sync {
    fn entity(&self) -> Entity;
    fn build(&self, ctx: &JobContext) -> Result<DataFrame>;
}

struct CustomerDimension;
struct ProductDimension;
struct CalendarDimension;
struct SalesFact;

impl TableBuilder for CustomerDimension {
    fn entity(&self) -> Entity {
        Entity::Customers
    }

    fn build(&self, ctx: &JobContext) -> Result<DataFrame> {
        customers::build_customers(ctx)
    }
}

impl TableBuilder for ProductDimension {
    fn entity(&self) -> Entity {
        Entity::Products
    }

    fn build(&self, ctx: &JobContext) -> Result<DataFrame> {
        products::build_products(ctx)
    }
}

impl TableBuilder for CalendarDimension {
    fn entity(&self) -> Entity {
        Entity::Calendar
    }

    fn build(&self, ctx: &JobContext) -> Result<DataFrame> {
        calendar::build_calendar(ctx)
    }
}

impl TableBuilder for SalesFact {
    fn entity(&self) -> Entity {
        Entity::Sales
    }

    fn build(&self, ctx: &JobContext) -> Result<DataFrame> {
        facts::build_sales(ctx)
    }
}

static BUILDERS: Lazy<Vec<&'static dyn TableBuilder>> = Lazy::new(|| {
    vec![
        &CustomerDimension as &dyn TableBuilder,
        &ProductDimension,
        &CalendarDimension,
        &SalesFact,
    ]
});

pub fn all_builders() -> &'static [&'static dyn TableBuilder] {
    BUILDERS.as_slice()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Written(WrittenTable),
    /// `consolidate = false` for this table.
    Skipped,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub entity: Entity,
    pub outcome: StageOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub stages: Vec<StageReport>,
}

impl RunReport {
    pub fn failures(&self) -> impl Iterator<Item = (Entity, &str)> + '_ {
        self.stages.iter().filter_map(|stage| match &stage.outcome {
            StageOutcome::Failed(message) => Some((stage.entity, message.as_str())),
            _ => None,
        })
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn outcome(&self, entity: Entity) -> Option<&StageOutcome> {
        self.stages
            .iter()
            .find(|stage| stage.entity == entity)
            .map(|stage| &stage.outcome)
    }
}

/// Runs every enabled builder and writes its table.
///
/// A failing stage is recorded in the report and does not stop the others;
/// tables already written by earlier stages are left in place.
pub fn run_job(ctx: &JobContext) -> RunReport {
    run_builders(ctx, all_builders())
}

pub fn run_builders(ctx: &JobContext, builders: &[&dyn TableBuilder]) -> RunReport {
    let mut report = RunReport::default();

    for builder in builders {
        let entity = builder.entity();
        let span = info_span!("stage", entity = entity.as_str());
        let _guard = span.enter();

        let outcome = if !ctx.config.output(entity).consolidate {
            info!("stage disabled, skipping");
            StageOutcome::Skipped
        } else {
            match run_stage(ctx, *builder) {
                Ok(written) => StageOutcome::Written(written),
                Err(err) => {
                    error!(error = %err, "stage failed");
                    StageOutcome::Failed(err.to_string())
                }
            }
        };

        report.stages.push(StageReport { entity, outcome });
    }

    report
}

fn run_stage(ctx: &JobContext, builder: &dyn TableBuilder) -> Result<WrittenTable> {
    let entity = builder.entity();
    let mut df = builder.build(ctx)?;
    sink::write_table(
        &ctx.config.output_dir_for(entity),
        entity.as_str(),
        ctx.run_date,
        &mut df,
    )
}
