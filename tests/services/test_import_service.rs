use std::sync::Arc;

use anyhow::Result;
use modelsync::{
    errors::SyncError,
    services::{BackupPolicy, ImportOptions, ImportService, Question, ScriptedConfirmer},
    types::{ColumnDescriptor, SqlType, SyncPhase, TableDescriptor, VerificationMismatch},
    utils::ProgressReporter,
};
use sea_orm::{DatabaseBackend, DbErr, MockDatabase};
use tempfile::tempdir;

use crate::common::{
    Row, column_row, constraint_row, exec_ok, index_row, indexed_orders_table, literals_row,
    orders_table, primary_key_row, serial_id, serial_id_row, single_id_table, table_row,
    test_settings, user_info_table, write_models,
};

fn options(models_path: std::path::PathBuf, backup: BackupPolicy) -> ImportOptions {
    ImportOptions {
        models_path,
        prefix: "t_".into(),
        backup,
        dry_run: false,
    }
}

#[tokio::test]
async fn test_import_creates_new_tables_and_verifies() -> Result<()> {
    let tmp = tempdir()?;
    let models = tmp.path().join("models.rs");
    write_models(&models, &[orders_table(), user_info_table()]);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<Row>::new()])
        .append_exec_results([exec_ok(), exec_ok(), exec_ok()])
        // verify t_orders
        .append_query_results([vec![
            serial_id_row("t_orders"),
            column_row("user_id", "int4", None, false, None),
        ]])
        .append_query_results([vec![
            primary_key_row("t_orders"),
            constraint_row("fk_t_orders_user_id", "f", "user_id", Some(("t_user_info", "id"))),
        ]])
        .append_query_results([Vec::<Row>::new()])
        // verify t_user_info
        .append_query_results([vec![
            serial_id_row("t_user_info"),
            column_row("email", "varchar", Some(100), false, None),
        ]])
        .append_query_results([vec![primary_key_row("t_user_info")]])
        .append_query_results([Vec::<Row>::new()])
        .into_connection();

    let confirmer = Arc::new(ScriptedConfirmer::new([true]));
    let service = ImportService::new(test_settings(tmp.path()), confirmer.clone());
    let report = service
        .import_with(&db, &options(models, BackupPolicy::Ask), &ProgressReporter::silent())
        .await?;

    assert_eq!(report.phase, SyncPhase::Verified);
    assert_eq!(report.diff.new.len(), 2);
    assert_eq!(report.plan.len(), 3);
    assert_eq!(report.plan.statements[0].table, "t_user_info");
    assert!(report.backup.is_none());
    assert_eq!(report.verification.len(), 2);
    assert!(report.verification.iter().all(|v| v.is_clean()));
    assert_eq!(confirmer.asked().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_failed_statement_rolls_back_and_names_table() -> Result<()> {
    let tmp = tempdir()?;
    let models = tmp.path().join("models.rs");
    write_models(
        &models,
        &[single_id_table("t_a"), single_id_table("t_b"), single_id_table("t_c")],
    );

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![table_row("t_unrelated")]])
        .append_exec_results([exec_ok(), exec_ok()])
        .append_exec_errors([DbErr::Custom("relation already exists".into())])
        .into_connection();

    let service = ImportService::new(
        test_settings(tmp.path()),
        Arc::new(ScriptedConfirmer::new([true])),
    );
    let err = service
        .import_with(&db, &options(models, BackupPolicy::Never), &ProgressReporter::silent())
        .await
        .unwrap_err();

    match err.downcast_ref::<SyncError>() {
        Some(SyncError::Ddl { table, statement, .. }) => {
            assert_eq!(table, "t_c");
            assert!(statement.contains(r#""t_c""#));
        }
        other => panic!("expected a DDL error, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_declined_confirmation_cancels() -> Result<()> {
    let tmp = tempdir()?;
    let models = tmp.path().join("models.rs");
    write_models(&models, &[user_info_table()]);

    // No exec results: executing anything would fail the test.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<Row>::new()])
        .into_connection();

    let confirmer = Arc::new(ScriptedConfirmer::new([false]));
    let service = ImportService::new(test_settings(tmp.path()), confirmer.clone());
    let report = service
        .import_with(&db, &options(models, BackupPolicy::Ask), &ProgressReporter::silent())
        .await?;

    assert_eq!(report.phase, SyncPhase::Cancelled);
    assert_eq!(report.plan.len(), 1);
    assert!(matches!(confirmer.asked()[0], Question::ApplyChanges { new: 1, existing: 0 }));
    Ok(())
}

#[tokio::test]
async fn test_existing_table_is_backed_up_then_extended() -> Result<()> {
    let tmp = tempdir()?;
    let models = tmp.path().join("models.rs");
    let mut orders = TableDescriptor::new("t_orders");
    orders.columns = vec![
        serial_id(),
        ColumnDescriptor::new("code", SqlType::new("varchar").with_length(20), false),
        ColumnDescriptor::new("note", SqlType::new("text"), true),
    ];
    orders.primary_key = vec!["id".into()];
    write_models(&models, &[orders]);

    let live_columns = || {
        vec![
            serial_id_row("t_orders"),
            column_row("code", "varchar", Some(20), false, None),
        ]
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![table_row("t_old_data"), table_row("t_orders")]])
        // reflect for planning
        .append_query_results([live_columns()])
        .append_query_results([vec![primary_key_row("t_orders")]])
        .append_query_results([Vec::<Row>::new()])
        // reflect and dump for backup
        .append_query_results([live_columns()])
        .append_query_results([vec![primary_key_row("t_orders")]])
        .append_query_results([Vec::<Row>::new()])
        .append_query_results([vec![
            literals_row("'1'::integer, 'A-1'::character varying"),
            literals_row("'2'::integer, 'O''Brien'::character varying"),
        ]])
        .append_exec_results([exec_ok()])
        // verify
        .append_query_results([{
            let mut columns = live_columns();
            columns.push(column_row("note", "text", None, true, None));
            columns
        }])
        .append_query_results([vec![primary_key_row("t_orders")]])
        .append_query_results([Vec::<Row>::new()])
        .into_connection();

    let service = ImportService::new(
        test_settings(tmp.path()),
        Arc::new(ScriptedConfirmer::new([true])),
    );
    let report = service
        .import_with(&db, &options(models, BackupPolicy::Always), &ProgressReporter::silent())
        .await?;

    assert_eq!(report.phase, SyncPhase::Verified);
    assert_eq!(report.diff.orphaned.iter().collect::<Vec<_>>(), vec!["t_old_data"]);
    assert_eq!(report.plan.len(), 1);
    assert!(report.plan.statements[0].sql.contains(r#"ADD COLUMN "note""#));

    let backup = report.backup.expect("backup taken");
    assert_eq!(backup.tables(), vec!["t_orders"]);
    assert_eq!(backup.total_rows(), 2);
    let dump = std::fs::read_to_string(&backup.files[0].path)?;
    assert!(dump.contains(
        r#"INSERT INTO "t_orders" ("id", "code") VALUES ('1'::integer, 'A-1'::character varying);"#
    ));
    assert!(dump.contains("'O''Brien'::character varying"));

    assert!(report.verification[0].is_clean());
    Ok(())
}

#[tokio::test]
async fn test_dry_run_only_plans() -> Result<()> {
    let tmp = tempdir()?;
    let models = tmp.path().join("models.rs");
    write_models(&models, &[user_info_table()]);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<Row>::new()])
        .into_connection();

    let confirmer = Arc::new(ScriptedConfirmer::new([]));
    let service = ImportService::new(test_settings(tmp.path()), confirmer.clone());
    let mut opts = options(models, BackupPolicy::Ask);
    opts.dry_run = true;
    let report = service
        .import_with(&db, &opts, &ProgressReporter::silent())
        .await?;

    assert_eq!(report.phase, SyncPhase::Idle);
    assert_eq!(report.plan.len(), 1);
    assert!(confirmer.asked().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_composite_indexes_are_recreated_and_verified() -> Result<()> {
    let tmp = tempdir()?;
    let models = tmp.path().join("models.rs");
    write_models(&models, &[indexed_orders_table()]);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<Row>::new()])
        .append_exec_results([exec_ok(), exec_ok(), exec_ok()])
        // verify: the unique index did not make it
        .append_query_results([vec![
            serial_id_row("t_orders"),
            column_row("user_id", "int4", None, false, None),
            column_row("status", "varchar", Some(10), false, None),
            column_row("amount", "int4", None, true, None),
        ]])
        .append_query_results([vec![primary_key_row("t_orders")]])
        .append_query_results([vec![
            index_row("idx_orders_user_amount", false, "user_id"),
            index_row("idx_orders_user_amount", false, "amount"),
        ]])
        .into_connection();

    let service = ImportService::new(
        test_settings(tmp.path()),
        Arc::new(ScriptedConfirmer::new([true])),
    );
    let report = service
        .import_with(&db, &options(models, BackupPolicy::Never), &ProgressReporter::silent())
        .await?;

    let statements: Vec<&str> = report.plan.statements.iter().map(|s| s.sql.as_str()).collect();
    assert_eq!(statements.len(), 3);
    assert_eq!(
        statements[1],
        r#"CREATE UNIQUE INDEX "uq_orders_user_status" ON "public"."t_orders" ("user_id", "status")"#
    );
    assert_eq!(
        statements[2],
        r#"CREATE INDEX "idx_orders_user_amount" ON "public"."t_orders" ("user_id", "amount")"#
    );

    assert!(!report.verification[0].is_clean());
    assert_eq!(
        report.verification[0].mismatches,
        vec![VerificationMismatch::MissingIndex {
            name: "uq_orders_user_status".into(),
            columns: vec!["user_id".into(), "status".into()],
            unique: true,
        }]
    );
    Ok(())
}

#[tokio::test]
async fn test_foreign_key_to_missing_table_is_skipped() -> Result<()> {
    let tmp = tempdir()?;
    let models = tmp.path().join("models.rs");
    std::fs::write(
        &models,
        r#"
        pub mod audit {
            use sea_orm::entity::prelude::*;

            #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
            #[sea_orm(table_name = "t_audit")]
            pub struct Model {
                #[sea_orm(primary_key)]
                pub id: i32,
                pub actor_id: i32,
            }

            #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
            pub enum Relation {
                /// References table `users`.
                #[sea_orm(belongs_to = "super::users::Entity", from = "Column::ActorId", to = "super::users::Column::Id")]
                Users,
            }
        }
        "#,
    )?;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![table_row("t_other")]])
        .into_connection();

    let service = ImportService::new(test_settings(tmp.path()), Arc::new(ScriptedConfirmer::new([])));
    let mut opts = options(models, BackupPolicy::Never);
    opts.dry_run = true;
    let report = service
        .import_with(&db, &opts, &ProgressReporter::silent())
        .await?;

    assert_eq!(report.plan.len(), 1);
    assert!(report.plan.statements.iter().all(|s| !s.sql.contains("REFERENCES")));
    assert_eq!(report.plan.warnings.len(), 1);
    assert!(report.plan.warnings[0].contains("users"));
    Ok(())
}
