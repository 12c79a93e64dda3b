use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Targets that are too chatty at `info` for a CLI run.
const DEFAULT_EXT_LEVELS: [(&str, &str); 2] = [("sqlx", "error"), ("sea_orm", "warn")];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleFormat {
    Pretty,
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_dir")]
    pub dir: Option<String>,

    #[serde(default = "default_file_name")]
    pub file_name: String,

    #[serde(default)]
    pub console_format: ConsoleFormat,

    /// Daily-rolling JSON log file next to the console output.
    #[serde(default)]
    pub file_enabled: bool,

    #[serde(
        default = "default_ext_level",
        deserialize_with = "deserialize_ext_level"
    )]
    pub ext_level: BTreeMap<String, String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: default_dir(),
            file_name: default_file_name(),
            console_format: ConsoleFormat::default(),
            file_enabled: false,
            ext_level: default_ext_level(),
        }
    }
}

impl LogConfig {
    /// `EnvFilter` directives: the base level followed by per-target overrides.
    pub fn filter_directives(&self) -> String {
        std::iter::once(self.level.clone())
            .chain(
                self.ext_level
                    .iter()
                    .map(|(target, level)| format!("{target}={level}")),
            )
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_dir() -> Option<String> {
    Some("./logs".to_string())
}

fn default_file_name() -> String {
    "modelsync.log".to_string()
}

fn default_ext_level() -> BTreeMap<String, String> {
    DEFAULT_EXT_LEVELS
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Parses `target:level` pairs separated by commas, on top of the defaults.
fn deserialize_ext_level<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    let mut map = default_ext_level();

    for pair in s.iter().flat_map(|s| s.split(',')) {
        if let Some((key, value)) = pair.trim().split_once(':') {
            map.insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    Ok(map)
}
