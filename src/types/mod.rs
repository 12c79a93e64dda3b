mod backup;
mod diff;
mod entity;
mod field_type;
mod sync_phase;
mod table;
mod verification;

pub use backup::{BackupFile, BackupManifest};
pub use diff::DiffResult;
pub use entity::{EntityField, EntityModel, EntityRelation, ModelRegistry};
pub use field_type::FieldType;
pub use sync_phase::SyncPhase;
pub use table::{ColumnDescriptor, ForeignKeyRef, IndexDescriptor, SqlType, TableDescriptor};
pub use verification::{TableVerification, VerificationMismatch};
