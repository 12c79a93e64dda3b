use std::collections::{BTreeMap, BTreeSet};

use sea_orm::sea_query::{
    Alias, ColumnDef, Expr, ForeignKey, Index, PostgresQueryBuilder, SchemaStatementBuilder, Table,
};
use serde::Serialize;
use strum_macros::Display;
use tracing::warn;

use crate::types::{
    DiffResult, EntityField, EntityModel, FieldType, IndexDescriptor, ModelRegistry,
    TableDescriptor,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Display)]
pub enum StatementKind {
    #[strum(to_string = "CREATE TABLE")]
    CreateTable,
    #[strum(to_string = "ADD COLUMN")]
    AddColumn,
    #[strum(to_string = "ADD FOREIGN KEY")]
    AddForeignKey,
    #[strum(to_string = "CREATE INDEX")]
    CreateIndex,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlannedStatement {
    pub table: String,
    pub kind: StatementKind,
    pub sql: String,
}

/// Ordered DDL for one import run, plus the compromises made building it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DdlPlan {
    pub statements: Vec<PlannedStatement>,
    pub warnings: Vec<String>,
}

impl DdlPlan {
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn count(&self, kind: StatementKind) -> usize {
        self.statements.iter().filter(|s| s.kind == kind).count()
    }

    fn push(&mut self, table: &str, kind: StatementKind, sql: String) {
        self.statements.push(PlannedStatement {
            table: table.to_string(),
            kind,
            sql,
        });
    }

    fn warn(&mut self, message: String) {
        warn!("⚠️ {}", message);
        self.warnings.push(message);
    }
}

/// What the schema holds before the import.
#[derive(Clone, Debug, Default)]
pub struct LiveSchema {
    /// Every table of the schema, prefixed or not.
    pub tables: BTreeSet<String>,
    /// Structure of the modelled tables that already exist.
    pub reflected: BTreeMap<String, TableDescriptor>,
}

impl LiveSchema {
    pub fn has_table(&self, table: &str) -> bool {
        self.tables.contains(table) || self.reflected.contains_key(table)
    }
}

/// Builds the statements that bring the live schema up to the model.
///
/// New tables are created in dependency order. Existing tables only gain the
/// columns and indexes they lack; nothing is altered or dropped. Foreign keys
/// and indexes come last so every referenced table exists by then. Foreign
/// keys to tables that are neither modelled nor live are skipped with a
/// warning. `live.reflected` must hold every table in `diff.existing`.
pub fn build_plan(
    registry: &ModelRegistry,
    diff: &DiffResult,
    live: &LiveSchema,
    schema: &str,
) -> DdlPlan {
    let mut plan = DdlPlan::default();
    let mut foreign_keys: Vec<PlannedStatement> = Vec::new();
    let mut indexes: Vec<PlannedStatement> = Vec::new();
    let modelled = registry.table_names();
    let known = |table: &str| modelled.contains(table) || live.has_table(table);

    let new_entities: Vec<&EntityModel> = diff
        .new
        .iter()
        .filter_map(|t| registry.by_table(t))
        .collect();

    for entity in creation_order(&new_entities, &mut plan) {
        plan.push(
            &entity.table_name,
            StatementKind::CreateTable,
            create_table_sql(entity, schema),
        );
        foreign_keys.extend(foreign_key_statements(
            entity,
            &entity_columns(entity),
            &known,
            schema,
            &mut plan,
        ));
        indexes.extend(index_statements(entity, &entity.index_definitions(), schema));
    }

    for table in &diff.existing {
        let (Some(entity), Some(live_table)) = (registry.by_table(table), live.reflected.get(table))
        else {
            continue;
        };

        let missing: Vec<&EntityField> = entity
            .fields
            .iter()
            .filter(|f| live_table.column(&f.name).is_none())
            .collect();

        for field in &missing {
            let force_nullable = !field.nullable && field.default.is_none() && !field.auto_increment;
            if force_nullable {
                plan.warn(format!(
                    "{}.{} is NOT NULL without a default; adding it as nullable",
                    table, field.name
                ));
            }
            if field.primary_key {
                plan.warn(format!(
                    "{}.{} is part of the model's primary key but is added as a plain column",
                    table, field.name
                ));
            }

            let mut def = column_def(field, force_nullable);
            let sql = Table::alter()
                .table((Alias::new(schema), Alias::new(table)))
                .add_column(&mut def)
                .to_string(PostgresQueryBuilder);
            plan.push(table, StatementKind::AddColumn, sql);
        }

        let added: BTreeSet<&str> = missing.iter().map(|f| f.name.as_str()).collect();
        foreign_keys.extend(foreign_key_statements(entity, &added, &known, schema, &mut plan));

        let lacking: Vec<IndexDescriptor> = entity
            .index_definitions()
            .into_iter()
            .filter(|index| {
                let columns_exist = index
                    .columns
                    .iter()
                    .all(|c| added.contains(c.as_str()) || live_table.column(c).is_some());
                columns_exist && !has_matching_index(live_table, index)
            })
            .collect();
        indexes.extend(index_statements(entity, &lacking, schema));
    }

    plan.statements.extend(foreign_keys);
    plan.statements.extend(indexes);
    plan
}

/// Kahn's algorithm over relations between new tables, ties broken by name.
/// Tables caught in a cycle are appended in name order; their foreign keys
/// are separate statements anyway.
fn creation_order<'a>(entities: &[&'a EntityModel], plan: &mut DdlPlan) -> Vec<&'a EntityModel> {
    let by_table: BTreeMap<&str, &'a EntityModel> =
        entities.iter().map(|e| (e.table_name.as_str(), *e)).collect();

    let mut pending: BTreeMap<&str, BTreeSet<&str>> = by_table
        .iter()
        .map(|(table, entity)| {
            let deps = entity
                .dependencies()
                .into_iter()
                .filter(|d| by_table.contains_key(d))
                .collect();
            (*table, deps)
        })
        .collect();

    let mut ordered = Vec::with_capacity(entities.len());
    loop {
        let ready: Vec<&str> = pending
            .iter()
            .filter(|(_, deps)| deps.is_empty())
            .map(|(table, _)| *table)
            .collect();
        let Some(next) = ready.first().copied() else {
            break;
        };
        pending.remove(next);
        for deps in pending.values_mut() {
            deps.remove(next);
        }
        ordered.push(by_table[next]);
    }

    if !pending.is_empty() {
        let cyclic: Vec<&str> = pending.keys().copied().collect();
        plan.warn(format!(
            "Circular references between {}; creating them in name order",
            cyclic.join(", ")
        ));
        ordered.extend(cyclic.into_iter().map(|t| by_table[t]));
    }

    ordered
}

fn entity_columns(entity: &EntityModel) -> BTreeSet<&str> {
    entity.fields.iter().map(|f| f.name.as_str()).collect()
}

fn create_table_sql(entity: &EntityModel, schema: &str) -> String {
    let mut create = Table::create();
    create.table((Alias::new(schema), Alias::new(&entity.table_name)));

    let keys = entity.primary_key();
    for field in &entity.fields {
        let mut def = column_def(field, false);
        if keys.len() == 1 && field.primary_key {
            def.primary_key();
        }
        create.col(&mut def);
    }

    if keys.len() > 1 {
        let mut pk = Index::create();
        for key in &keys {
            pk.col(Alias::new(*key));
        }
        create.primary_key(&mut pk);
    }

    create.to_string(PostgresQueryBuilder)
}

fn column_def(field: &EntityField, force_nullable: bool) -> ColumnDef {
    let mut def = ColumnDef::new(Alias::new(&field.name));
    match field.field_type {
        FieldType::SmallInteger => def.small_integer(),
        FieldType::Integer => def.integer(),
        FieldType::BigInteger => def.big_integer(),
        FieldType::Float => def.float(),
        FieldType::Double => def.double(),
        FieldType::Decimal(Some((precision, scale))) => def.decimal_len(precision, scale),
        FieldType::Decimal(None) => def.decimal(),
        FieldType::String(Some(len)) => def.string_len(len),
        FieldType::String(None) => def.string(),
        FieldType::Char(Some(len)) => def.char_len(len),
        FieldType::Char(None) => def.char(),
        FieldType::Text => def.text(),
        FieldType::Boolean => def.boolean(),
        FieldType::Date => def.date(),
        FieldType::Time => def.time(),
        FieldType::DateTime => def.date_time(),
        FieldType::TimestampWithTimeZone => def.timestamp_with_time_zone(),
        FieldType::Json => def.json(),
        FieldType::JsonBinary => def.json_binary(),
        FieldType::Uuid => def.uuid(),
        FieldType::Binary => def.binary(),
    };

    if field.auto_increment && field.field_type.is_integer() {
        def.auto_increment();
    }
    if field.nullable || force_nullable {
        def.null();
    } else {
        def.not_null();
    }
    if let Some(default) = &field.default {
        def.default(Expr::cust(default.clone()));
    }
    def
}

/// `ADD CONSTRAINT ... FOREIGN KEY` for relations whose local columns are all in `columns`.
fn foreign_key_statements(
    entity: &EntityModel,
    columns: &BTreeSet<&str>,
    known: &impl Fn(&str) -> bool,
    schema: &str,
    plan: &mut DdlPlan,
) -> Vec<PlannedStatement> {
    entity
        .relations
        .iter()
        .filter(|r| !r.columns.is_empty() && r.columns.iter().all(|c| columns.contains(c.as_str())))
        .filter(|r| {
            if known(&r.referenced_table) {
                return true;
            }
            plan.warn(format!(
                "{}.{} references {}, which is neither modelled nor in the database; foreign key skipped",
                entity.table_name,
                r.columns.join(", "),
                r.referenced_table
            ));
            false
        })
        .map(|relation| {
            let mut fk = ForeignKey::create();
            fk.name(format!("fk_{}_{}", entity.table_name, relation.columns.join("_")))
                .from_tbl((Alias::new(schema), Alias::new(&entity.table_name)))
                .to_tbl((Alias::new(schema), Alias::new(&relation.referenced_table)));
            for column in &relation.columns {
                fk.from_col(Alias::new(column));
            }
            for column in &relation.referenced_columns {
                fk.to_col(Alias::new(column));
            }
            PlannedStatement {
                table: entity.table_name.clone(),
                kind: StatementKind::AddForeignKey,
                sql: fk.to_string(PostgresQueryBuilder),
            }
        })
        .collect()
}

/// A live index with the same name, or over the same columns with at least
/// the same uniqueness.
fn has_matching_index(live: &TableDescriptor, index: &IndexDescriptor) -> bool {
    live.indexes.iter().any(|l| {
        l.name == index.name || (l.columns == index.columns && (l.unique || !index.unique))
    })
}

/// `CREATE [UNIQUE] INDEX` under each definition's own name.
fn index_statements(
    entity: &EntityModel,
    definitions: &[IndexDescriptor],
    schema: &str,
) -> Vec<PlannedStatement> {
    definitions
        .iter()
        .map(|definition| {
            let mut index = Index::create();
            index
                .name(&definition.name)
                .table((Alias::new(schema), Alias::new(&entity.table_name)));
            for column in &definition.columns {
                index.col(Alias::new(column));
            }
            if definition.unique {
                index.unique();
            }
            PlannedStatement {
                table: entity.table_name.clone(),
                kind: StatementKind::CreateIndex,
                sql: index.to_string(PostgresQueryBuilder),
            }
        })
        .collect()
}
