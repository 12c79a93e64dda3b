use std::fmt;

use serde::Serialize;

use super::{
    field_type::FieldType,
    table::{ColumnDescriptor, ForeignKeyRef, IndexDescriptor},
};

/// A difference between a model and the live table. Reported, never corrected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum VerificationMismatch {
    MissingTable,
    MissingColumn {
        column: String,
    },
    TypeMismatch {
        column: String,
        expected: FieldType,
        actual: String,
    },
    NullabilityMismatch {
        column: String,
        expected_nullable: bool,
    },
    PrimaryKeyMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },
    /// No live index covers these columns with the required uniqueness.
    MissingIndex {
        name: String,
        columns: Vec<String>,
        unique: bool,
    },
}

impl fmt::Display for VerificationMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTable => write!(f, "table does not exist"),
            Self::MissingColumn { column } => write!(f, "column '{column}' is missing"),
            Self::TypeMismatch {
                column,
                expected,
                actual,
            } => write!(f, "column '{column}' is {actual}, model declares {expected}"),
            Self::NullabilityMismatch {
                column,
                expected_nullable,
            } => {
                let expected = if *expected_nullable { "NULL" } else { "NOT NULL" };
                write!(f, "column '{column}' should be {expected}")
            }
            Self::PrimaryKeyMismatch { expected, actual } => write!(
                f,
                "primary key is ({}), model declares ({})",
                actual.join(", "),
                expected.join(", ")
            ),
            Self::MissingIndex {
                name,
                columns,
                unique,
            } => {
                let kind = if *unique { "unique index" } else { "index" };
                write!(f, "{kind} '{name}' on ({}) is missing", columns.join(", "))
            }
        }
    }
}

/// Post-DDL state of one table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TableVerification {
    pub table: String,
    pub exists: bool,
    pub columns: Vec<ColumnDescriptor>,
    pub primary_key: Vec<String>,
    pub foreign_keys: Vec<ForeignKeyRef>,
    pub indexes: Vec<IndexDescriptor>,
    pub mismatches: Vec<VerificationMismatch>,
}

impl TableVerification {
    pub fn is_clean(&self) -> bool {
        self.exists && self.mismatches.is_empty()
    }
}
