#[path = "../common/mod.rs"]
mod common;

mod test_backup_service;
mod test_export_service;
mod test_import_service;
