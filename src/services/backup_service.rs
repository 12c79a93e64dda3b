use std::path::Path;

use chrono::Local;
use sea_orm::{ConnectionTrait, FromQueryResult, Statement};
use tracing::{debug, info};

use crate::{
    catalog::SchemaReader,
    errors::SyncError,
    types::{BackupManifest, TableDescriptor},
    utils::{
        BackupWriter, BackupWriterOptions, ProgressReporter, qualified_name, quote_ident,
        value_literal_expr,
    },
};

/// Dumps every row of the requested tables into `<root>/backup_<timestamp>/`.
///
/// Tables missing from the schema are skipped. Files already written are kept
/// when a later table fails.
pub async fn backup_tables<C: ConnectionTrait>(
    db: &C,
    schema: &str,
    root: &Path,
    tables: &[String],
    progress: &ProgressReporter,
) -> Result<BackupManifest, SyncError> {
    let mut writer = BackupWriter::new(BackupWriterOptions {
        root: root.to_path_buf(),
        started_at: Local::now(),
    })
    .map_err(|e| SyncError::Backup {
        table: tables.join(", "),
        source: Box::new(e),
    })?;

    let reader = SchemaReader::new(db, schema);
    for table in tables {
        let Some(descriptor) = reader.reflect_table(table).await? else {
            debug!(table = %table, "Not in the database, nothing to back up");
            continue;
        };

        progress.report(format!("Backing up {}...", table));
        let rows = fetch_rows(db, schema, &descriptor)
            .await
            .map_err(|e| SyncError::Backup {
                table: table.clone(),
                source: Box::new(e),
            })?;

        let file = writer
            .write_table(table, &descriptor.column_names(), &rows)
            .map_err(|e| SyncError::Backup {
                table: table.clone(),
                source: Box::new(e),
            })?;
        info!("💾 Backed up {} row(s) of {} to {}", file.rows, table, file.path.display());
    }

    let manifest = writer.finish();
    info!(
        "💾 Backup of {} table(s), {} row(s) in {}",
        manifest.files.len(),
        manifest.total_rows(),
        manifest.dir.display()
    );
    Ok(manifest)
}

#[derive(Debug, FromQueryResult)]
struct RowLiterals {
    row_values: String,
}

/// One `SELECT` returning, per row, the `VALUES` list PostgreSQL itself
/// rendered. Nothing is decoded client-side, so every type survives.
fn row_literals_sql(schema: &str, table: &TableDescriptor) -> String {
    let values = table
        .columns
        .iter()
        .map(|c| value_literal_expr(&c.name))
        .collect::<Vec<_>>()
        .join(" || ', ' || ");

    let mut sql = format!(
        "SELECT {} AS row_values FROM {}",
        values,
        qualified_name(schema, &table.name)
    );
    if !table.primary_key.is_empty() {
        let keys: Vec<String> = table.primary_key.iter().map(|k| quote_ident(k)).collect();
        sql.push_str(&format!(" ORDER BY {}", keys.join(", ")));
    }
    sql
}

async fn fetch_rows<C: ConnectionTrait>(
    db: &C,
    schema: &str,
    table: &TableDescriptor,
) -> Result<Vec<String>, sea_orm::DbErr> {
    let sql = row_literals_sql(schema, table);
    debug!(table = %table.name, "Fetching rows as literals");

    let rows = RowLiterals::find_by_statement(Statement::from_string(db.get_database_backend(), sql))
        .all(db)
        .await?;
    Ok(rows.into_iter().map(|r| r.row_values).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ColumnDescriptor, SqlType};

    #[test]
    fn test_row_literals_sql() {
        let mut table = TableDescriptor::new("t_user_info");
        table.columns = vec![
            ColumnDescriptor::new("id", SqlType::new("int4"), false),
            ColumnDescriptor::new("ttl", SqlType::new("interval"), true),
        ];
        table.primary_key = vec!["id".into()];

        let sql = row_literals_sql("public", &table);

        assert_eq!(
            sql,
            format!(
                "SELECT {} || ', ' || {} AS row_values FROM \"public\".\"t_user_info\" ORDER BY \"id\"",
                value_literal_expr("id"),
                value_literal_expr("ttl")
            )
        );
    }
}
