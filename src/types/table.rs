use std::fmt;

use serde::Serialize;

/// Column type as reported by `information_schema.columns`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SqlType {
    /// Underlying type name (`int4`, `varchar`, `timestamptz`, ...).
    pub udt_name: String,
    /// Standard SQL name (`integer`, `character varying`, `USER-DEFINED`, ...).
    pub data_type: String,
    pub max_length: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
}

impl SqlType {
    pub fn new(udt_name: impl Into<String>) -> Self {
        let udt_name = udt_name.into();
        Self {
            data_type: udt_name.clone(),
            udt_name,
            ..Default::default()
        }
    }

    pub fn with_length(mut self, length: u32) -> Self {
        self.max_length = Some(length);
        self
    }

    pub fn with_precision(mut self, precision: u32, scale: u32) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.udt_name.as_str(), self.max_length, self.precision) {
            ("varchar" | "bpchar", Some(len), _) => write!(f, "{}({})", self.udt_name, len),
            ("numeric", _, Some(p)) => write!(f, "numeric({},{})", p, self.scale.unwrap_or(0)),
            _ => f.write_str(&self.udt_name),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub sql_type: SqlType,
    pub nullable: bool,
    pub default: Option<String>,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, sql_type: SqlType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            sql_type,
            nullable,
            default: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Sequence-backed columns (`serial`, `bigserial`, `nextval(...)` defaults).
    pub fn is_auto_increment(&self) -> bool {
        self.default
            .as_deref()
            .is_some_and(|d| d.trim_start().starts_with("nextval("))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ForeignKeyRef {
    pub name: String,
    pub columns: Vec<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
}

/// Unique constraints and plain indexes. Primary-key indexes are not listed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IndexDescriptor {
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

/// Structure of one live table, read from the catalog.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TableDescriptor {
    pub name: String,
    pub columns: Vec<ColumnDescriptor>,
    pub primary_key: Vec<String>,
    pub foreign_keys: Vec<ForeignKeyRef>,
    pub indexes: Vec<IndexDescriptor>,
}

impl TableDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn is_primary_key(&self, column: &str) -> bool {
        self.primary_key.iter().any(|c| c == column)
    }

    /// Single-column index covering `column`, if any. Unique wins over plain.
    pub fn single_column_index(&self, column: &str) -> Option<&IndexDescriptor> {
        let mut matching = self
            .indexes
            .iter()
            .filter(|i| i.columns.len() == 1 && i.columns[0] == column);
        let first = matching.next()?;
        if first.unique {
            return Some(first);
        }
        Some(matching.find(|i| i.unique).unwrap_or(first))
    }
}
