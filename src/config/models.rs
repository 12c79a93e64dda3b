use serde::{Deserialize, Serialize};

use crate::utils::serde::deserialize_opt_vec_from_string;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ModelsConfig {
    /// Only tables whose name starts with this prefix are exported, and
    /// only those count as orphaned on import.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Generated entity file, written by export and read by import.
    #[serde(default = "default_path")]
    pub path: String,

    /// Fail on column types without a mapping instead of falling back to text.
    #[serde(default)]
    pub strict_types: bool,

    #[serde(default, deserialize_with = "deserialize_opt_vec_from_string")]
    pub exclude_tables: Option<Vec<String>>,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            path: default_path(),
            strict_types: false,
            exclude_tables: None,
        }
    }
}

fn default_prefix() -> String {
    "t_".to_string()
}

fn default_path() -> String {
    "models.rs".to_string()
}
