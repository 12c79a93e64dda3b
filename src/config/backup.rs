use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct BackupConfig {
    /// Parent of the `backup_<timestamp>` directories.
    #[serde(default = "default_dir")]
    pub dir: String,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self { dir: default_dir() }
    }
}

fn default_dir() -> String {
    "./backups".to_string()
}
