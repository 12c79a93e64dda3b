use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::{field_type::FieldType, table::IndexDescriptor};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EntityField {
    /// Database column name.
    pub name: String,
    pub field_type: FieldType,
    pub nullable: bool,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub unique: bool,
    pub indexed: bool,
    pub default: Option<String>,
}

impl EntityField {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            nullable: false,
            primary_key: false,
            auto_increment: false,
            unique: false,
            indexed: false,
            default: None,
        }
    }
}

/// A `belongs_to` relation, expressed in table and column names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EntityRelation {
    /// Variant name in the generated `Relation` enum.
    pub name: String,
    pub columns: Vec<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
}

/// One loaded (or about to be rendered) entity class.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EntityModel {
    pub class_name: String,
    pub module_name: String,
    pub table_name: String,
    pub fields: Vec<EntityField>,
    pub relations: Vec<EntityRelation>,
    /// Named indexes and unique constraints, multi-column ones included.
    pub indexes: Vec<IndexDescriptor>,
}

impl EntityModel {
    pub fn field(&self, name: &str) -> Option<&EntityField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn primary_key(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.primary_key)
            .map(|f| f.name.as_str())
            .collect()
    }

    /// Every index the table should have: the named ones, then one per
    /// `unique`/`indexed` field that no named single-column index covers.
    /// Fields of the primary key get none.
    pub fn index_definitions(&self) -> Vec<IndexDescriptor> {
        let mut definitions = self.indexes.clone();
        for field in self.fields.iter().filter(|f| !f.primary_key && (f.unique || f.indexed)) {
            let covered = self.indexes.iter().any(|i| {
                i.columns.len() == 1 && i.columns[0] == field.name && (i.unique || !field.unique)
            });
            if covered {
                continue;
            }
            let prefix = if field.unique { "uq" } else { "idx" };
            definitions.push(IndexDescriptor {
                name: format!("{}_{}_{}", prefix, self.table_name, field.name),
                columns: vec![field.name.clone()],
                unique: field.unique,
            });
        }
        definitions
    }

    /// Tables this entity points at through its relations, excluding itself.
    pub fn dependencies(&self) -> BTreeSet<&str> {
        self.relations
            .iter()
            .map(|r| r.referenced_table.as_str())
            .filter(|t| *t != self.table_name)
            .collect()
    }
}

/// Loaded entities keyed by class name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModelRegistry {
    entities: BTreeMap<String, EntityModel>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entity, returning the one previously registered under the same class name.
    pub fn insert(&mut self, entity: EntityModel) -> Option<EntityModel> {
        self.entities.insert(entity.class_name.clone(), entity)
    }

    pub fn get(&self, class_name: &str) -> Option<&EntityModel> {
        self.entities.get(class_name)
    }

    pub fn by_table(&self, table_name: &str) -> Option<&EntityModel> {
        self.entities.values().find(|e| e.table_name == table_name)
    }

    pub fn table_names(&self) -> BTreeSet<String> {
        self.entities.values().map(|e| e.table_name.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityModel> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl FromIterator<EntityModel> for ModelRegistry {
    fn from_iter<T: IntoIterator<Item = EntityModel>>(iter: T) -> Self {
        let mut registry = Self::new();
        for entity in iter {
            registry.insert(entity);
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(class_name: &str, table_name: &str) -> EntityModel {
        EntityModel {
            class_name: class_name.into(),
            module_name: class_name.to_lowercase(),
            table_name: table_name.into(),
            fields: vec![EntityField {
                primary_key: true,
                auto_increment: true,
                ..EntityField::new("id", FieldType::Integer)
            }],
            relations: vec![],
            indexes: vec![],
        }
    }

    #[test]
    fn registry_looks_up_by_class_and_table() {
        let registry: ModelRegistry =
            [entity("Orders", "t_orders"), entity("Customer", "t_customer")].into_iter().collect();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("Orders").map(|e| e.table_name.as_str()), Some("t_orders"));
        assert_eq!(registry.by_table("t_customer").map(|e| e.class_name.as_str()), Some("Customer"));
        assert!(registry.by_table("t_missing").is_none());
        assert_eq!(
            registry.table_names().into_iter().collect::<Vec<_>>(),
            vec!["t_customer".to_string(), "t_orders".to_string()]
        );
    }

    #[test]
    fn dependencies_skip_self_references() {
        let mut orders = entity("Orders", "t_orders");
        orders.relations = vec![
            EntityRelation {
                name: "Customer".into(),
                columns: vec!["customer_id".into()],
                referenced_table: "t_customer".into(),
                referenced_columns: vec!["id".into()],
            },
            EntityRelation {
                name: "Orders".into(),
                columns: vec!["parent_id".into()],
                referenced_table: "t_orders".into(),
                referenced_columns: vec!["id".into()],
            },
        ];

        assert_eq!(orders.dependencies().into_iter().collect::<Vec<_>>(), vec!["t_customer"]);
        assert_eq!(orders.primary_key(), vec!["id"]);
    }

    #[test]
    fn index_definitions_keep_names_and_fill_gaps() {
        let mut orders = entity("Orders", "t_orders");
        orders.fields.extend([
            EntityField {
                indexed: true,
                ..EntityField::new("status", FieldType::String(Some(10)))
            },
            EntityField {
                unique: true,
                ..EntityField::new("code", FieldType::String(Some(20)))
            },
            EntityField::new("user_id", FieldType::Integer),
        ]);
        orders.indexes = vec![
            IndexDescriptor {
                name: "idx_orders_status".into(),
                columns: vec!["status".into()],
                unique: false,
            },
            IndexDescriptor {
                name: "uq_orders_user_status".into(),
                columns: vec!["user_id".into(), "status".into()],
                unique: true,
            },
        ];

        let names: Vec<String> = orders.index_definitions().into_iter().map(|i| i.name).collect();

        assert_eq!(names, vec!["idx_orders_status", "uq_orders_user_status", "uq_t_orders_code"]);
    }
}
