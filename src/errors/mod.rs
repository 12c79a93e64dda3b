use std::path::PathBuf;

use sea_orm::DbErr;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Failed to connect to {target}")]
    Connection {
        target: String,
        #[source]
        source: DbErr,
    },

    #[error("Failed to reflect table '{table}'")]
    Reflection {
        table: String,
        #[source]
        source: DbErr,
    },

    #[error("Table '{table}' has no column usable as a primary key")]
    NoPrimaryKey { table: String },

    #[error("Unsupported column type '{sql_type}' for {table}.{column}")]
    UnsupportedType {
        table: String,
        column: String,
        sql_type: String,
    },

    #[error("Failed to render entity for table '{table}': {reason}")]
    Render { table: String, reason: String },

    #[error("Failed to write '{}'", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load models from '{}': {reason}", .path.display())]
    Load { path: PathBuf, reason: String },

    #[error("Failed to back up table '{table}'")]
    Backup {
        table: String,
        #[source]
        source: BoxError,
    },

    #[error("DDL failed on table '{table}': {statement}")]
    Ddl {
        table: String,
        statement: String,
        #[source]
        source: DbErr,
    },

    #[error("Invalid configuration: {0}")]
    Config(#[from] config::ConfigError),
}

impl SyncError {
    /// Catalog failures caused by a dead connection surface as `Connection`.
    pub fn from_catalog(table: impl Into<String>, target: &str, source: DbErr) -> Self {
        match source {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => Self::Connection {
                target: target.to_string(),
                source,
            },
            source => Self::Reflection {
                table: table.into(),
                source,
            },
        }
    }

    pub fn load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Load {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Table the error is attached to, when there is one.
    pub fn table(&self) -> Option<&str> {
        match self {
            Self::Reflection { table, .. }
            | Self::NoPrimaryKey { table }
            | Self::UnsupportedType { table, .. }
            | Self::Render { table, .. }
            | Self::Backup { table, .. }
            | Self::Ddl { table, .. } => Some(table),
            _ => None,
        }
    }
}
