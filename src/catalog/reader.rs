use itertools::Itertools;
use sea_orm::{ConnectionTrait, DbErr, FromQueryResult, Statement, Value};
use tracing::{debug, info};

use crate::{
    errors::SyncError,
    types::{ColumnDescriptor, ForeignKeyRef, IndexDescriptor, SqlType, TableDescriptor},
    utils::get_query,
};

#[derive(Debug, FromQueryResult)]
struct TableRow {
    table_name: String,
}

#[derive(Debug, FromQueryResult)]
struct ColumnRow {
    column_name: String,
    data_type: String,
    udt_name: String,
    character_maximum_length: Option<i32>,
    numeric_precision: Option<i32>,
    numeric_scale: Option<i32>,
    is_nullable: String,
    column_default: Option<String>,
}

#[derive(Debug, FromQueryResult)]
struct ConstraintRow {
    constraint_name: String,
    constraint_type: String,
    column_name: String,
    referenced_table: Option<String>,
    referenced_column: Option<String>,
}

#[derive(Debug, FromQueryResult)]
struct IndexRow {
    index_name: String,
    is_unique: bool,
    column_name: String,
}

impl From<ColumnRow> for ColumnDescriptor {
    fn from(row: ColumnRow) -> Self {
        let to_u32 = |v: Option<i32>| v.and_then(|v| u32::try_from(v).ok());
        ColumnDescriptor {
            name: row.column_name,
            sql_type: SqlType {
                udt_name: row.udt_name,
                data_type: row.data_type,
                max_length: to_u32(row.character_maximum_length),
                precision: to_u32(row.numeric_precision),
                scale: to_u32(row.numeric_scale),
            },
            nullable: row.is_nullable.eq_ignore_ascii_case("YES"),
            default: row.column_default,
        }
    }
}

/// Reads table structure from the PostgreSQL catalog of one schema.
pub struct SchemaReader<'a, C> {
    db: &'a C,
    schema: String,
}

impl<'a, C: ConnectionTrait> SchemaReader<'a, C> {
    pub fn new(db: &'a C, schema: impl Into<String>) -> Self {
        Self {
            db,
            schema: schema.into(),
        }
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// All base tables of the schema, in name order.
    pub async fn list_tables(&self) -> Result<Vec<String>, SyncError> {
        let stmt = self.statement("tables.sql", vec![self.schema.clone().into()], "*")?;
        let rows = TableRow::find_by_statement(stmt)
            .all(self.db)
            .await
            .map_err(|e| self.catalog_error("*", e))?;

        let tables: Vec<String> = rows.into_iter().map(|r| r.table_name).collect();
        debug!(schema = %self.schema, count = tables.len(), "Listed tables");
        Ok(tables)
    }

    /// Tables whose name starts with `prefix`. `_` is matched literally.
    pub async fn list_tables_with_prefix(&self, prefix: &str) -> Result<Vec<String>, SyncError> {
        Ok(self
            .list_tables()
            .await?
            .into_iter()
            .filter(|t| t.starts_with(prefix))
            .collect())
    }

    /// Structure of `table`, or `None` when the schema has no such table.
    pub async fn reflect_table(&self, table: &str) -> Result<Option<TableDescriptor>, SyncError> {
        let params = || vec![Value::from(self.schema.clone()), Value::from(table.to_string())];

        let columns = ColumnRow::find_by_statement(self.statement("columns.sql", params(), table)?)
            .all(self.db)
            .await
            .map_err(|e| self.catalog_error(table, e))?;
        if columns.is_empty() {
            debug!(table, "Table not found in catalog");
            return Ok(None);
        }

        let constraints =
            ConstraintRow::find_by_statement(self.statement("constraints.sql", params(), table)?)
                .all(self.db)
                .await
                .map_err(|e| self.catalog_error(table, e))?;

        let indexes = IndexRow::find_by_statement(self.statement("indexes.sql", params(), table)?)
            .all(self.db)
            .await
            .map_err(|e| self.catalog_error(table, e))?;

        let mut descriptor = TableDescriptor::new(table);
        descriptor.columns = columns.into_iter().map(ColumnDescriptor::from).collect();
        apply_constraints(&mut descriptor, constraints);
        descriptor.indexes.extend(group_indexes(indexes));

        debug!(
            table,
            columns = descriptor.columns.len(),
            primary_key = ?descriptor.primary_key,
            foreign_keys = descriptor.foreign_keys.len(),
            indexes = descriptor.indexes.len(),
            "Reflected table"
        );
        Ok(Some(descriptor))
    }

    /// Reflects every prefixed table not listed in `exclude`, in name order.
    pub async fn read_tables(
        &self,
        prefix: &str,
        exclude: &[String],
    ) -> Result<Vec<TableDescriptor>, SyncError> {
        let names = self.list_tables_with_prefix(prefix).await?;
        info!(
            "🔎 Found {} table(s) with prefix '{}' in schema '{}'",
            names.len(),
            prefix,
            self.schema
        );

        let mut tables = Vec::with_capacity(names.len());
        for name in names {
            if exclude.contains(&name) {
                info!("Skipping excluded table {}", name);
                continue;
            }
            // Listed a moment ago; a concurrent drop surfaces here.
            let table = self
                .reflect_table(&name)
                .await?
                .ok_or_else(|| SyncError::Reflection {
                    table: name.clone(),
                    source: DbErr::RecordNotFound(format!("table {} disappeared", name)),
                })?;
            tables.push(table);
        }
        Ok(tables)
    }

    fn statement(&self, query: &str, values: Vec<Value>, table: &str) -> Result<Statement, SyncError> {
        let sql = get_query(query).map_err(|e| SyncError::Reflection {
            table: table.to_string(),
            source: DbErr::Custom(format!("{:#}", e)),
        })?;
        Ok(Statement::from_sql_and_values(
            self.db.get_database_backend(),
            sql,
            values,
        ))
    }

    fn catalog_error(&self, table: &str, err: DbErr) -> SyncError {
        SyncError::from_catalog(table, &format!("schema '{}'", self.schema), err)
    }
}

fn apply_constraints(descriptor: &mut TableDescriptor, rows: Vec<ConstraintRow>) {
    for (name, group) in &rows.into_iter().chunk_by(|r| r.constraint_name.clone()) {
        let group: Vec<ConstraintRow> = group.collect();
        let columns: Vec<String> = group.iter().map(|r| r.column_name.clone()).collect();

        match group[0].constraint_type.as_str() {
            "p" => descriptor.primary_key = columns,
            "u" => descriptor.indexes.push(IndexDescriptor {
                name,
                columns,
                unique: true,
            }),
            "f" => descriptor.foreign_keys.push(ForeignKeyRef {
                name,
                columns,
                referenced_table: group[0].referenced_table.clone().unwrap_or_default(),
                referenced_columns: group
                    .iter()
                    .filter_map(|r| r.referenced_column.clone())
                    .collect(),
            }),
            other => debug!(constraint = %name, kind = other, "Ignoring constraint"),
        }
    }
}

fn group_indexes(rows: Vec<IndexRow>) -> Vec<IndexDescriptor> {
    rows.into_iter()
        .chunk_by(|r| (r.index_name.clone(), r.is_unique))
        .into_iter()
        .map(|((name, unique), group)| IndexDescriptor {
            name,
            unique,
            columns: group.map(|r| r.column_name).collect(),
        })
        .collect()
}
