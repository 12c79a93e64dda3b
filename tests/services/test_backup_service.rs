use anyhow::Result;
use modelsync::{services::backup_tables, utils::ProgressReporter};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, MockDatabase,
    Statement,
};
use tempfile::tempdir;

use crate::common::{Row, column_row, literals_row, primary_key_row, serial_id_row};

#[tokio::test]
async fn test_only_requested_existing_tables_are_written() -> Result<()> {
    let tmp = tempdir()?;
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        // t_orders
        .append_query_results([vec![
            serial_id_row("t_orders"),
            column_row("flag", "bool", None, true, None),
        ]])
        .append_query_results([vec![primary_key_row("t_orders")]])
        .append_query_results([Vec::<Row>::new()])
        .append_query_results([vec![
            literals_row("'1'::integer, 'true'::boolean"),
            literals_row("'2'::integer, NULL"),
        ]])
        // t_missing
        .append_query_results([Vec::<Row>::new()])
        .into_connection();

    let tables = vec!["t_orders".to_string(), "t_missing".to_string()];
    let manifest = backup_tables(&db, "public", tmp.path(), &tables, &ProgressReporter::silent()).await?;

    assert_eq!(manifest.tables(), vec!["t_orders"]);
    assert!(manifest.dir.starts_with(tmp.path()));
    assert!(
        manifest
            .dir
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("backup_"))
    );

    let dump = std::fs::read_to_string(manifest.dir.join("t_orders.sql"))?;
    assert!(dump.starts_with("-- Backup of table t_orders"));
    assert!(dump.contains(r#"("id", "flag") VALUES ('1'::integer, 'true'::boolean);"#));
    assert!(dump.contains(r#"("id", "flag") VALUES ('2'::integer, NULL);"#));
    assert!(!manifest.dir.join("t_missing.sql").exists());

    let log = db.into_transaction_log();
    let dump_query = &log[3].statements()[0].sql;
    assert!(dump_query.starts_with("SELECT CASE WHEN \"id\" IS NULL THEN 'NULL'"));
    assert!(dump_query.contains("pg_typeof(\"flag\")::text"));
    assert!(dump_query.ends_with("FROM \"public\".\"t_orders\" ORDER BY \"id\""));
    Ok(())
}

async fn row_texts(db: &DatabaseConnection) -> Result<Vec<String>> {
    let rows = db
        .query_all(Statement::from_string(
            DatabaseBackend::Postgres,
            "SELECT t::text AS row_text FROM t_user_info t ORDER BY id",
        ))
        .await?;
    Ok(rows
        .iter()
        .map(|r| r.try_get::<String>("", "row_text"))
        .collect::<Result<_, _>>()?)
}

/// Needs a scratch PostgreSQL in `TEST_POSTGRES_URL`; returns early without one.
#[tokio::test]
async fn test_backup_restores_every_column_type() -> Result<()> {
    let Ok(url) = std::env::var("TEST_POSTGRES_URL") else {
        eprintln!("TEST_POSTGRES_URL is not set, skipping");
        return Ok(());
    };
    let schema = format!("modelsync_backup_{}", std::process::id());

    let admin = Database::connect(&url).await?;
    admin
        .execute_unprepared(&format!(
            "DROP SCHEMA IF EXISTS {schema} CASCADE; CREATE SCHEMA {schema}"
        ))
        .await?;

    let mut options = ConnectOptions::new(url.clone());
    options
        .max_connections(1)
        .sqlx_logging(false)
        .set_schema_search_path(schema.clone());
    let db = Database::connect(options).await?;

    db.execute_unprepared(
        "CREATE TABLE t_user_info (
            id serial PRIMARY KEY,
            score numeric,
            token uuid,
            avatar bytea,
            tags text[],
            ttl interval,
            ip inet,
            price money,
            at_time timetz,
            note text
        )",
    )
    .await?;
    db.execute_unprepared(
        r"INSERT INTO t_user_info (score, token, avatar, tags, ttl, ip, price, at_time, note) VALUES
            (12.50, 'a0eebc99-9c0b-4ef8-bb6d-6bb9bd380a11', '\x0102ff', '{a,b}', '1 day',
             '10.0.0.1', 3.50, '10:00:00+02', E'it''s a \\ test'),
            (NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL)",
    )
    .await?;
    let before = row_texts(&db).await?;

    let tmp = tempdir()?;
    let manifest = backup_tables(
        &db,
        &schema,
        tmp.path(),
        &["t_user_info".to_string()],
        &ProgressReporter::silent(),
    )
    .await?;
    assert_eq!(manifest.total_rows(), 2);

    db.execute_unprepared("TRUNCATE t_user_info").await?;
    let dump = std::fs::read_to_string(manifest.dir.join("t_user_info.sql"))?;
    db.execute_unprepared(&dump).await?;
    let after = row_texts(&db).await?;

    db.close().await?;
    admin
        .execute_unprepared(&format!("DROP SCHEMA {schema} CASCADE"))
        .await?;

    assert_eq!(after, before);
    assert!(before[0].contains(r"\\x0102ff"));
    Ok(())
}
