use std::collections::BTreeSet;

use sea_orm::ConnectionTrait;
use tracing::{info, warn};

use crate::{
    catalog::SchemaReader,
    errors::SyncError,
    types::{
        EntityModel, FieldType, ModelRegistry, TableDescriptor, TableVerification,
        VerificationMismatch,
    },
};

/// Checks a live table against its model. Pure; reports, never corrects.
pub fn compare(entity: &EntityModel, live: Option<&TableDescriptor>) -> TableVerification {
    let Some(live) = live else {
        return TableVerification {
            table: entity.table_name.clone(),
            exists: false,
            mismatches: vec![VerificationMismatch::MissingTable],
            ..Default::default()
        };
    };

    let mut mismatches = Vec::new();
    for field in &entity.fields {
        let Some(column) = live.column(&field.name) else {
            mismatches.push(VerificationMismatch::MissingColumn {
                column: field.name.clone(),
            });
            continue;
        };

        let type_matches = match FieldType::from_sql(&column.sql_type) {
            Some(actual) => actual == field.field_type,
            // Unmapped types were exported as text.
            None => field.field_type == FieldType::Text,
        };
        if !type_matches {
            mismatches.push(VerificationMismatch::TypeMismatch {
                column: field.name.clone(),
                expected: field.field_type.clone(),
                actual: column.sql_type.to_string(),
            });
        }

        if column.nullable != field.nullable {
            mismatches.push(VerificationMismatch::NullabilityMismatch {
                column: field.name.clone(),
                expected_nullable: field.nullable,
            });
        }
    }

    let expected: BTreeSet<&str> = entity.primary_key().into_iter().collect();
    let actual: BTreeSet<&str> = live.primary_key.iter().map(String::as_str).collect();
    if expected != actual {
        mismatches.push(VerificationMismatch::PrimaryKeyMismatch {
            expected: entity.primary_key().into_iter().map(String::from).collect(),
            actual: live.primary_key.clone(),
        });
    }

    for index in entity.index_definitions() {
        let covered = live
            .indexes
            .iter()
            .any(|l| l.columns == index.columns && (l.unique || !index.unique));
        if !covered {
            mismatches.push(VerificationMismatch::MissingIndex {
                name: index.name,
                columns: index.columns,
                unique: index.unique,
            });
        }
    }

    TableVerification {
        table: live.name.clone(),
        exists: true,
        columns: live.columns.clone(),
        primary_key: live.primary_key.clone(),
        foreign_keys: live.foreign_keys.clone(),
        indexes: live.indexes.clone(),
        mismatches,
    }
}

/// Re-reads `tables` and compares each with its model. Tables without a model
/// in the registry are skipped.
pub async fn verify_tables<C: ConnectionTrait>(
    db: &C,
    schema: &str,
    registry: &ModelRegistry,
    tables: &[String],
) -> Result<Vec<TableVerification>, SyncError> {
    let reader = SchemaReader::new(db, schema);
    let mut results = Vec::with_capacity(tables.len());

    for table in tables {
        let Some(entity) = registry.by_table(table) else {
            continue;
        };
        let live = reader.reflect_table(table).await?;
        let verification = compare(entity, live.as_ref());

        if verification.is_clean() {
            info!("✅ {} matches its model", table);
        } else {
            for mismatch in &verification.mismatches {
                warn!("⚠️ {}: {}", table, mismatch);
            }
        }
        results.push(verification);
    }
    Ok(results)
}
