use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;
use tera::Context;
use tracing::warn;

use crate::{
    codegen::naming::{field_ident, module_name, to_class_name, to_pascal_case},
    errors::SyncError,
    types::{
        ColumnDescriptor, EntityField, EntityModel, EntityRelation, FieldType, IndexDescriptor,
        TableDescriptor,
    },
    utils::render_template,
};

const ENTITY_TEMPLATE: &str = "templates/entity.rs.jinja";

/// Entity source for one table, with the model it was rendered from.
#[derive(Debug, Clone)]
pub struct RenderedEntity {
    pub entity: EntityModel,
    pub source: String,
}

#[derive(Serialize)]
struct FieldView {
    docs: Vec<String>,
    attrs: String,
    ident: String,
    rust_type: String,
}

#[derive(Serialize)]
struct RelationView {
    table: String,
    module: String,
    from: String,
    to: String,
    variant: String,
}

/// Turns reflected tables into SeaORM entity modules.
pub struct ClassRenderer {
    prefix: String,
    strict_types: bool,
}

impl ClassRenderer {
    pub fn new(prefix: impl Into<String>, strict_types: bool) -> Self {
        Self {
            prefix: prefix.into(),
            strict_types,
        }
    }

    /// Field type for a column. Unmapped types become `Text` unless strict.
    pub fn map_type(&self, table: &str, column: &ColumnDescriptor) -> Result<FieldType, SyncError> {
        if let Some(field_type) = FieldType::from_sql(&column.sql_type) {
            return Ok(field_type);
        }
        if self.strict_types {
            return Err(SyncError::UnsupportedType {
                table: table.to_string(),
                column: column.name.clone(),
                sql_type: column.sql_type.to_string(),
            });
        }
        warn!(
            "⚠️ {}.{}: no mapping for type '{}', declaring it as Text",
            table, column.name, column.sql_type
        );
        Ok(FieldType::Text)
    }

    pub fn to_entity(&self, table: &TableDescriptor) -> Result<EntityModel, SyncError> {
        let mut fields = Vec::with_capacity(table.columns.len());
        for column in &table.columns {
            let field_type = self.map_type(&table.name, column)?;
            let primary_key = table.is_primary_key(&column.name);
            let auto_increment = column.is_auto_increment();
            let index = table
                .single_column_index(&column.name)
                .filter(|_| !primary_key);

            fields.push(EntityField {
                name: column.name.clone(),
                field_type,
                nullable: column.nullable && !primary_key,
                primary_key,
                auto_increment,
                unique: index.is_some_and(|i| i.unique),
                indexed: index.is_some_and(|i| !i.unique),
                default: if auto_increment {
                    None
                } else {
                    column.default.clone()
                },
            });
        }

        if !fields.iter().any(|f| f.primary_key) {
            let chosen = choose_primary_key(&fields).ok_or_else(|| SyncError::NoPrimaryKey {
                table: table.name.clone(),
            })?;
            let field = &mut fields[chosen];
            warn!(
                "⚠️ Table {} has no primary key, using column '{}'",
                table.name, field.name
            );
            field.primary_key = true;
            field.nullable = false;
            field.unique = false;
            field.indexed = false;
        }

        Ok(EntityModel {
            class_name: to_class_name(&table.name, &self.prefix),
            module_name: module_name(&table.name, &self.prefix),
            table_name: table.name.clone(),
            fields,
            relations: self.relations(table),
            indexes: table.indexes.clone(),
        })
    }

    fn relations(&self, table: &TableDescriptor) -> Vec<EntityRelation> {
        let mut per_target: HashMap<String, usize> = HashMap::new();
        for fk in &table.foreign_keys {
            *per_target
                .entry(to_class_name(&fk.referenced_table, &self.prefix))
                .or_default() += 1;
        }

        table
            .foreign_keys
            .iter()
            .map(|fk| {
                let class = to_class_name(&fk.referenced_table, &self.prefix);
                let name = match fk.columns.first() {
                    Some(first) if per_target[&class] > 1 => {
                        format!("{}{}", class, to_pascal_case(&field_ident(first).0))
                    }
                    _ => class,
                };
                EntityRelation {
                    name,
                    columns: fk.columns.clone(),
                    referenced_table: fk.referenced_table.clone(),
                    referenced_columns: fk.referenced_columns.clone(),
                }
            })
            .collect()
    }

    /// Renders one entity module.
    pub fn render(&self, entity: &EntityModel) -> Result<String, SyncError> {
        self.render_with_notes(entity, &[])
    }

    /// Renders one entity module with extra doc lines on `Model`.
    fn render_with_notes(&self, entity: &EntityModel, notes: &[String]) -> Result<String, SyncError> {
        let fields: Vec<FieldView> = entity.fields.iter().map(field_view).collect();
        let relations: Vec<RelationView> = entity
            .relations
            .iter()
            .map(|r| self.relation_view(r))
            .collect();

        let key_fields: Vec<&EntityField> = entity.fields.iter().filter(|f| f.primary_key).collect();
        let display_format = key_fields
            .iter()
            .map(|f| if f.field_type == FieldType::Binary { "{:?}" } else { "{}" })
            .collect::<Vec<_>>()
            .join(", ");
        let display_args = key_fields
            .iter()
            .map(|f| format!("self.{}", field_ident(&f.name).0))
            .collect::<Vec<_>>()
            .join(", ");

        let model_docs: Vec<String> = entity
            .indexes
            .iter()
            .map(index_doc)
            .chain(notes.iter().cloned())
            .collect();

        let mut context = Context::new();
        context.insert("module_name", &entity.module_name);
        context.insert("model_docs", &model_docs);
        context.insert("table_name", &format!("{:?}", entity.table_name));
        context.insert("class_name", &entity.class_name);
        context.insert("fields", &fields);
        context.insert("relations", &relations);
        context.insert("display_format", &display_format);
        context.insert("display_args", &display_args);

        render_template(ENTITY_TEMPLATE, &context).map_err(|e| SyncError::Render {
            table: entity.table_name.clone(),
            reason: format!("{:#}", e),
        })
    }

    pub fn render_table(&self, table: &TableDescriptor) -> Result<RenderedEntity, SyncError> {
        let entity = self.to_entity(table)?;
        let source = self.render(&entity)?;
        Ok(RenderedEntity { entity, source })
    }

    /// Renders every table, keeping input order. Two tables that would share
    /// a module or class name are rejected. Relations to tables outside
    /// `tables` have no module to point at; they are left out of `Relation`
    /// and noted on `Model` instead.
    pub fn render_all(&self, tables: &[TableDescriptor]) -> Result<Vec<RenderedEntity>, SyncError> {
        let mut modules: BTreeMap<String, &str> = BTreeMap::new();
        let mut classes: BTreeMap<String, &str> = BTreeMap::new();

        for table in tables {
            let module = module_name(&table.name, &self.prefix);
            let class = to_class_name(&table.name, &self.prefix);
            for (taken, name, kind) in [(&mut modules, module, "module"), (&mut classes, class, "class")] {
                if let Some(other) = taken.insert(name.clone(), table.name.as_str()) {
                    return Err(SyncError::Render {
                        table: table.name.clone(),
                        reason: format!("{} name '{}' is already used by table '{}'", kind, name, other),
                    });
                }
            }
        }

        let exported: BTreeSet<&str> = tables.iter().map(|t| t.name.as_str()).collect();
        tables
            .iter()
            .map(|table| {
                let mut entity = self.to_entity(table)?;
                let (kept, outside): (Vec<EntityRelation>, Vec<EntityRelation>) = entity
                    .relations
                    .into_iter()
                    .partition(|r| exported.contains(r.referenced_table.as_str()));
                entity.relations = kept;

                let notes: Vec<String> = outside
                    .iter()
                    .map(|r| {
                        warn!(
                            "⚠️ {}.{} references {}, which is not exported; relation left out",
                            table.name,
                            r.columns.join(", "),
                            r.referenced_table
                        );
                        unexported_doc(r)
                    })
                    .collect();

                let source = self.render_with_notes(&entity, &notes)?;
                Ok(RenderedEntity { entity, source })
            })
            .collect()
    }

    fn relation_view(&self, relation: &EntityRelation) -> RelationView {
        let module = module_name(&relation.referenced_table, &self.prefix);
        let from = column_path("Column", &relation.columns);
        let to = column_path(&format!("super::{}::Column", module), &relation.referenced_columns);

        RelationView {
            table: relation.referenced_table.clone(),
            module,
            from,
            to,
            variant: relation.name.clone(),
        }
    }
}

fn field_view(field: &EntityField) -> FieldView {
    let (ident, renamed) = field_ident(&field.name);

    let mut attrs = Vec::new();
    if field.primary_key {
        attrs.push("primary_key".to_string());
        if !field.auto_increment {
            attrs.push("auto_increment = false".to_string());
        }
    } else if field.auto_increment {
        attrs.push("auto_increment = true".to_string());
    }
    if renamed {
        attrs.push(format!("column_name = {:?}", field.name));
    }
    attrs.push(format!("column_type = {:?}", field.field_type.column_type()));
    if field.unique {
        attrs.push("unique".to_string());
    }
    if field.indexed {
        attrs.push("indexed".to_string());
    }

    let rust_type = if field.nullable {
        format!("Option<{}>", field.field_type.rust_type())
    } else {
        field.field_type.rust_type().to_string()
    };

    FieldView {
        docs: field
            .default
            .iter()
            .map(|d| format!("SQL default: {}", d.replace('\n', " ")))
            .collect(),
        attrs: attrs.join(", "),
        ident,
        rust_type,
    }
}

/// ``Unique index `uq_orders_code` on (`code`).``
fn index_doc(index: &IndexDescriptor) -> String {
    let kind = if index.unique { "Unique index" } else { "Index" };
    format!("{} `{}` on ({}).", kind, index.name, backticked(&index.columns))
}

fn unexported_doc(relation: &EntityRelation) -> String {
    format!(
        "Not exported: ({}) references table `{}` ({}).",
        backticked(&relation.columns),
        relation.referenced_table,
        backticked(&relation.referenced_columns)
    )
}

fn backticked(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("`{}`", n))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `Column::A` or `(Column::A, Column::B)`.
fn column_path(base: &str, columns: &[String]) -> String {
    let parts: Vec<String> = columns
        .iter()
        .map(|c| format!("{}::{}", base, to_pascal_case(&field_ident(c).0)))
        .collect();
    match parts.as_slice() {
        [single] => single.clone(),
        _ => format!("({})", parts.join(", ")),
    }
}

/// Index of the column to promote to primary key on a keyless table.
fn choose_primary_key(fields: &[EntityField]) -> Option<usize> {
    let id_like = |name: &str| {
        let name = name.to_lowercase();
        ["id", "uuid", "guid", "key"].iter().any(|k| name.contains(k))
    };

    fields
        .iter()
        .position(|f| id_like(&f.name) && !f.field_type.is_large())
        .or_else(|| fields.iter().position(|f| !f.field_type.is_large()))
}
