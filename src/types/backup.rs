use std::path::PathBuf;

use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BackupFile {
    pub table: String,
    pub path: PathBuf,
    pub rows: usize,
}

/// Result of one backup run: the timestamped directory and what went into it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BackupManifest {
    pub dir: PathBuf,
    pub files: Vec<BackupFile>,
}

impl BackupManifest {
    pub fn tables(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.table.as_str()).collect()
    }

    pub fn total_rows(&self) -> usize {
        self.files.iter().map(|f| f.rows).sum()
    }
}
