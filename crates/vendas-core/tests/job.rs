mod common;

use std::fs;
use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;
use vendas_core::{
    all_builders, run_job, Entity, JobConfig, JobContext, StageOutcome, TableBuilder as _,
};

fn open(config: JobConfig, run_date: NaiveDate) -> Result<JobContext> {
    Ok(JobContext::open(config, run_date)?)
}

fn line_count(path: &Path) -> usize {
    fs::read_to_string(path).expect("read output").lines().count()
}

#[test]
fn builders_cover_every_entity_once() {
    let entities: Vec<Entity> = all_builders().iter().map(|builder| builder.entity()).collect();
    assert_eq!(entities, Entity::ALL.to_vec());
}

#[test]
fn scenario_writes_snapshot_and_latest_tables() -> Result<()> {
    let dir = tempfile::tempdir()?;
    common::write_input(dir.path(), common::SCENARIO_CSV);
    let ctx = open(common::config(dir.path()), common::run_date())?;

    let report = run_job(&ctx);

    assert!(report.is_success(), "report: {report:?}");
    let output = dir.path().join("output");
    for (entity, rows) in [
        (Entity::Customers, 2),
        (Entity::Products, 2),
        (Entity::Calendar, 3),
        (Entity::Sales, 3),
    ] {
        let name = entity.as_str();
        let snapshot = output.join(name).join(format!("{name}_20240506.csv"));
        let latest = output.join(name).join(format!("{name}.csv"));

        match report.outcome(entity) {
            Some(StageOutcome::Written(written)) => {
                assert_eq!(written.rows, rows, "{name}");
                assert_eq!(written.snapshot, snapshot);
                assert_eq!(written.latest, latest);
            }
            other => panic!("{name}: unexpected outcome {other:?}"),
        }
        assert_eq!(line_count(&snapshot), rows + 1, "{name} snapshot");
        assert_eq!(fs::read(&snapshot)?, fs::read(&latest)?, "{name} copies differ");
    }

    let calendar = fs::read_to_string(output.join("datas").join("datas.csv"))?;
    assert_eq!(
        calendar,
        "data,dia,mes,ano,dia_da_semana\n\
         2024-01-01,1,1,2024,2\n\
         2024-01-02,2,1,2024,3\n\
         2024-01-03,3,1,2024,4\n"
    );

    let leftovers: Vec<_> = fs::read_dir(output.join("clientes"))?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "staging files left behind");
    Ok(())
}

#[test]
fn rerun_reproduces_latest_files() -> Result<()> {
    let dir = tempfile::tempdir()?;
    common::write_input(dir.path(), common::SCENARIO_CSV);
    let output = dir.path().join("output");

    let first = open(common::config(dir.path()), common::run_date())?;
    assert!(run_job(&first).is_success());
    let before: Vec<Vec<u8>> = Entity::ALL
        .iter()
        .map(|entity| fs::read(output.join(entity.as_str()).join(format!("{entity}.csv"))))
        .collect::<std::io::Result<_>>()?;
    drop(first);

    let next_day = common::date(2024, 5, 7);
    let second = open(common::config(dir.path()), next_day)?;
    assert!(run_job(&second).is_success());
    let after: Vec<Vec<u8>> = Entity::ALL
        .iter()
        .map(|entity| fs::read(output.join(entity.as_str()).join(format!("{entity}.csv"))))
        .collect::<std::io::Result<_>>()?;

    assert_eq!(before, after);
    assert!(output.join("clientes").join("clientes_20240506.csv").exists());
    assert!(output.join("clientes").join("clientes_20240507.csv").exists());
    Ok(())
}

#[test]
fn disabled_stage_is_skipped() -> Result<()> {
    let dir = tempfile::tempdir()?;
    common::write_input(dir.path(), common::SCENARIO_CSV);
    let text = common::CONFIG.replace(
        "[produtos]\nconsolidate = true",
        "[produtos]\nconsolidate = false",
    );
    let config = JobConfig::from_toml_str(&text, dir.path())?;
    let ctx = open(config, common::run_date())?;

    let report = run_job(&ctx);

    assert!(report.is_success());
    assert_eq!(report.outcome(Entity::Products), Some(&StageOutcome::Skipped));
    assert!(!dir.path().join("output").join("produtos").exists());
    assert!(matches!(
        report.outcome(Entity::Sales),
        Some(StageOutcome::Written(_))
    ));
    Ok(())
}

#[test]
fn output_failure_does_not_block_other_stages() -> Result<()> {
    let dir = tempfile::tempdir()?;
    common::write_input(dir.path(), common::SCENARIO_CSV);
    let output = dir.path().join("output");
    fs::create_dir_all(&output)?;
    // A plain file where the calendar directory should go.
    fs::write(output.join("datas"), "not a directory")?;
    let ctx = open(common::config(dir.path()), common::run_date())?;

    let report = run_job(&ctx);

    assert!(!report.is_success());
    let failures: Vec<Entity> = report.failures().map(|(entity, _)| entity).collect();
    assert_eq!(failures, vec![Entity::Calendar]);
    for entity in [Entity::Customers, Entity::Products, Entity::Sales] {
        assert!(
            matches!(report.outcome(entity), Some(StageOutcome::Written(_))),
            "{entity} should still be written"
        );
    }
    Ok(())
}

#[test]
fn empty_input_fails_only_the_calendar() -> Result<()> {
    let dir = tempfile::tempdir()?;
    common::write_input(
        dir.path(),
        "nome_cliente,cidade,estado,nome_produto,categoria,fabricante,data,qtd_vendida,valor_total\n",
    );
    let ctx = open(common::config(dir.path()), common::run_date())?;

    let report = run_job(&ctx);

    let failures: Vec<(Entity, String)> = report
        .failures()
        .map(|(entity, message)| (entity, message.to_string()))
        .collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, Entity::Calendar);
    assert!(failures[0].1.contains("no dates"), "message: {}", failures[0].1);

    match report.outcome(Entity::Sales) {
        Some(StageOutcome::Written(written)) => assert_eq!(written.rows, 0),
        other => panic!("unexpected outcome {other:?}"),
    }
    Ok(())
}
