#![allow(dead_code)]

use std::{collections::BTreeMap, path::Path};

use modelsync::{
    codegen::{ClassRenderer, FileEmitter},
    config::Settings,
    types::{ColumnDescriptor, ForeignKeyRef, IndexDescriptor, SqlType, TableDescriptor},
};
use sea_orm::{MockExecResult, Value};

pub type Row = BTreeMap<&'static str, Value>;

pub fn table_row(name: &str) -> Row {
    BTreeMap::from([("table_name", Value::from(name))])
}

pub fn column_row(name: &str, udt: &str, length: Option<i32>, nullable: bool, default: Option<&str>) -> Row {
    BTreeMap::from([
        ("column_name", Value::from(name)),
        ("data_type", Value::from(udt)),
        ("udt_name", Value::from(udt)),
        ("character_maximum_length", Value::Int(length)),
        ("numeric_precision", Value::Int(None)),
        ("numeric_scale", Value::Int(None)),
        ("is_nullable", Value::from(if nullable { "YES" } else { "NO" })),
        ("column_default", Value::String(default.map(|d| Box::new(d.to_string())))),
    ])
}

pub fn serial_id_row(table: &str) -> Row {
    let default = format!("nextval('{}_id_seq'::regclass)", table);
    column_row("id", "int4", None, false, Some(&default))
}

pub fn constraint_row(name: &str, kind: &str, column: &str, reference: Option<(&str, &str)>) -> Row {
    BTreeMap::from([
        ("constraint_name", Value::from(name)),
        ("constraint_type", Value::from(kind)),
        ("column_name", Value::from(column)),
        (
            "referenced_table",
            Value::String(reference.map(|(t, _)| Box::new(t.to_string()))),
        ),
        (
            "referenced_column",
            Value::String(reference.map(|(_, c)| Box::new(c.to_string()))),
        ),
    ])
}

pub fn index_row(name: &str, unique: bool, column: &str) -> Row {
    BTreeMap::from([
        ("index_name", Value::from(name)),
        ("is_unique", Value::from(unique)),
        ("column_name", Value::from(column)),
    ])
}

pub fn primary_key_row(table: &str) -> Row {
    constraint_row(&format!("{}_pkey", table), "p", "id", None)
}

/// A backup row as PostgreSQL renders it: the literal list of one `INSERT`.
pub fn literals_row(values: &str) -> Row {
    BTreeMap::from([("row_values", Value::from(values))])
}

pub fn exec_ok() -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected: 0,
    }
}

pub fn serial_id() -> ColumnDescriptor {
    ColumnDescriptor::new("id", SqlType::new("int4"), false).with_default("nextval('seq'::regclass)")
}

pub fn user_info_table() -> TableDescriptor {
    let mut table = TableDescriptor::new("t_user_info");
    table.columns = vec![
        serial_id(),
        ColumnDescriptor::new("email", SqlType::new("varchar").with_length(100), false),
    ];
    table.primary_key = vec!["id".into()];
    table
}

pub fn orders_table() -> TableDescriptor {
    let mut table = TableDescriptor::new("t_orders");
    table.columns = vec![
        serial_id(),
        ColumnDescriptor::new("user_id", SqlType::new("int4"), false),
    ];
    table.primary_key = vec!["id".into()];
    table.foreign_keys = vec![ForeignKeyRef {
        name: "fk_orders_user".into(),
        columns: vec!["user_id".into()],
        referenced_table: "t_user_info".into(),
        referenced_columns: vec!["id".into()],
    }];
    table
}

/// Orders with a composite unique constraint and a composite index.
pub fn indexed_orders_table() -> TableDescriptor {
    let mut table = TableDescriptor::new("t_orders");
    table.columns = vec![
        serial_id(),
        ColumnDescriptor::new("user_id", SqlType::new("int4"), false),
        ColumnDescriptor::new("status", SqlType::new("varchar").with_length(10), false),
        ColumnDescriptor::new("amount", SqlType::new("int4"), true),
    ];
    table.primary_key = vec!["id".into()];
    table.indexes = vec![
        IndexDescriptor {
            name: "uq_orders_user_status".into(),
            columns: vec!["user_id".into(), "status".into()],
            unique: true,
        },
        IndexDescriptor {
            name: "idx_orders_user_amount".into(),
            columns: vec!["user_id".into(), "amount".into()],
            unique: false,
        },
    ];
    table
}

pub fn single_id_table(name: &str) -> TableDescriptor {
    let mut table = TableDescriptor::new(name);
    table.columns = vec![serial_id()];
    table.primary_key = vec!["id".into()];
    table
}

/// Writes an entity file for `tables` the way `export` would.
pub fn write_models(path: &Path, tables: &[TableDescriptor]) {
    let rendered = ClassRenderer::new("t_", false).render_all(tables).unwrap();
    let emitter = FileEmitter::new("public", "test", "t_");
    let file = emitter.compose(&rendered).unwrap();
    emitter.write(path, &file).unwrap();
}

pub fn test_settings(backup_dir: &Path) -> Settings {
    let mut settings = Settings::default();
    settings.backup.dir = backup_dir.display().to_string();
    settings
}
