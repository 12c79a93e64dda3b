pub mod backup;
pub mod database;
pub mod log;
pub mod models;
pub mod settings;

pub use backup::BackupConfig;
pub use database::DatabaseConfig;
pub use log::LogConfig;
pub use models::ModelsConfig;
pub use settings::Settings;
