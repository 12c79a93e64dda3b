use anyhow::Result;
use modelsync::{
    config::Settings,
    loader::ModelLoader,
    services::{ExportOptions, ExportService},
    utils::ProgressReporter,
};
use sea_orm::{DatabaseBackend, MockDatabase};
use tempfile::tempdir;

use crate::common::{Row, column_row, constraint_row, primary_key_row, serial_id_row, table_row};

fn orders_and_users() -> MockDatabase {
    MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![
            table_row("audit"),
            table_row("t_orders"),
            table_row("t_user_info"),
        ]])
        // t_orders
        .append_query_results([vec![
            serial_id_row("t_orders"),
            column_row("user_id", "int4", None, false, None),
            column_row("note", "text", None, true, None),
        ]])
        .append_query_results([vec![
            primary_key_row("t_orders"),
            constraint_row("fk_orders_user", "f", "user_id", Some(("t_user_info", "id"))),
        ]])
        .append_query_results([Vec::<Row>::new()])
        // t_user_info
        .append_query_results([vec![
            serial_id_row("t_user_info"),
            column_row("email", "varchar", Some(100), false, None),
        ]])
        .append_query_results([vec![primary_key_row("t_user_info")]])
        .append_query_results([Vec::<Row>::new()])
}

#[tokio::test]
async fn test_export_writes_loadable_file() -> Result<()> {
    let tmp = tempdir()?;
    let output = tmp.path().join("out/models.rs");
    let db = orders_and_users().into_connection();

    let service = ExportService::new(Settings::default());
    let options = ExportOptions {
        prefix: "t_".into(),
        output: output.clone(),
        stdout: false,
    };
    let report = service
        .export_with(&db, "localhost:5432/sourcedb", &options, &ProgressReporter::silent())
        .await?;

    assert_eq!(report.tables, vec!["t_orders", "t_user_info"]);
    assert_eq!(report.output.as_deref(), Some(output.as_path()));

    let content = std::fs::read_to_string(&output)?;
    assert!(content.contains("pub mod orders"));
    assert!(content.contains("pub use user_info::Entity as UserInfo;"));
    assert!(content.contains("String(StringLen::N(100))"));
    assert!(!content.contains("audit"));

    let registry = ModelLoader::new("t_").load(&output)?;
    assert_eq!(registry.len(), 2);
    let orders = registry.get("Orders").expect("Orders loaded");
    assert_eq!(orders.primary_key(), vec!["id"]);
    assert_eq!(orders.relations[0].referenced_table, "t_user_info");
    assert!(orders.field("note").is_some_and(|f| f.nullable));
    Ok(())
}

#[tokio::test]
async fn test_export_to_stdout_writes_nothing() -> Result<()> {
    let tmp = tempdir()?;
    let output = tmp.path().join("models.rs");
    let db = orders_and_users().into_connection();

    let service = ExportService::new(Settings::default());
    let options = ExportOptions {
        prefix: "t_".into(),
        output: output.clone(),
        stdout: true,
    };
    let report = service
        .export_with(&db, "test", &options, &ProgressReporter::silent())
        .await?;

    assert!(report.output.is_none());
    assert!(report.content.contains("pub use orders::Entity as Orders;"));
    assert!(!output.exists());
    Ok(())
}

#[tokio::test]
async fn test_excluded_tables_are_skipped() -> Result<()> {
    let tmp = tempdir()?;
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![table_row("t_orders"), table_row("t_user_info")]])
        .append_query_results([vec![
            serial_id_row("t_user_info"),
            column_row("email", "varchar", Some(100), false, None),
        ]])
        .append_query_results([vec![primary_key_row("t_user_info")]])
        .append_query_results([Vec::<Row>::new()])
        .into_connection();

    let mut settings = Settings::default();
    settings.models.exclude_tables = Some(vec!["t_orders".into()]);
    let options = ExportOptions {
        prefix: "t_".into(),
        output: tmp.path().join("models.rs"),
        stdout: true,
    };
    let report = ExportService::new(settings)
        .export_with(&db, "test", &options, &ProgressReporter::silent())
        .await?;

    assert_eq!(report.tables, vec!["t_user_info"]);
    Ok(())
}
