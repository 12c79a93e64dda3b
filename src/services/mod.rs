pub mod backup_service;
pub mod confirm;
pub mod ddl_executor;
pub mod export_service;
pub mod import_service;
pub mod verifier;

pub use backup_service::backup_tables;
pub use confirm::{AssumeYes, Confirmer, Question, ScriptedConfirmer};
pub use ddl_executor::execute_plan;
pub use export_service::{ExportOptions, ExportReport, ExportService};
pub use import_service::{BackupPolicy, ImportOptions, ImportReport, ImportService};
pub use verifier::{compare, verify_tables};
