use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

use crate::config::{BackupConfig, DatabaseConfig, LogConfig, ModelsConfig};

/// Plain `DB_*` variables understood for compatibility with older setups.
/// They only provide defaults; `MODELSYNC__DATABASE__*` wins when both are set.
const LEGACY_DATABASE_VARS: [(&str, &str); 5] = [
    ("DB_HOST", "database.host"),
    ("DB_PORT", "database.port"),
    ("DB_NAME", "database.database"),
    ("DB_USER", "database.username"),
    ("DB_PASSWORD", "database.password"),
];

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub models: ModelsConfig,

    #[serde(default)]
    pub backup: BackupConfig,

    #[serde(default)]
    pub logs: LogConfig,
}

fn get_env_file_name() -> String {
    if let Ok(env_file) = std::env::var("MODELSYNC_ENV_FILE") {
        return env_file;
    }
    if let Ok(env) = std::env::var("MODELSYNC_ENV") {
        return match env.to_lowercase().as_str() {
            "dev" => ".env.dev".to_string(),
            "test" => ".env.test".to_string(),
            _ => ".env".to_string(),
        };
    }
    ".env".to_string()
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        dotenvy::from_filename(get_env_file_name()).ok();

        let mut builder = Config::builder();
        for (var, key) in LEGACY_DATABASE_VARS {
            if let Ok(value) = std::env::var(var) {
                builder = builder.set_default(key, value)?;
            }
        }

        let settings = builder
            .add_source(
                Environment::with_prefix("MODELSYNC")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Settings with secrets blanked, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.database.password.is_empty() {
            copy.database.password = "********".to_string();
        }
        copy
    }

    pub fn print_config(&self) {
        match serde_json::to_string_pretty(&self.redacted()) {
            Ok(json) => println!("{}", json),
            Err(err) => eprintln!("Failed to serialize settings: {}", err),
        }
    }
}
