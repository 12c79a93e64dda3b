use chrono::{DateTime, Local};
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Result, Write};
use std::path::{Path, PathBuf};

use crate::types::{BackupFile, BackupManifest};
use crate::utils::{
    time::{backup_dir_name, header_timestamp},
    utils::quote_ident,
};

/// Configuration options for the BackupWriter.
#[derive(Debug, Clone)]
pub struct BackupWriterOptions {
    /// Parent directory; the run directory is created inside it.
    pub root: PathBuf,
    /// Names the run directory and goes into file headers.
    pub started_at: DateTime<Local>,
}

/// Writes one `<table>.sql` insert script per table into a fresh
/// `backup_<timestamp>` directory. Files already written stay on disk even if
/// a later table fails.
#[derive(Debug)]
pub struct BackupWriter {
    dir: PathBuf,
    started_at: DateTime<Local>,
    files: Vec<BackupFile>,
}

impl BackupWriter {
    /// Creates the run directory. A second run within the same second gets a
    /// numeric suffix instead of mixing files with the first.
    pub fn new(options: BackupWriterOptions) -> Result<Self> {
        fs::create_dir_all(&options.root)?;

        let base = backup_dir_name(options.started_at);
        let mut dir = options.root.join(&base);
        let mut attempt = 1;
        loop {
            match fs::create_dir(&dir) {
                Ok(()) => break,
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                    dir = options.root.join(format!("{}_{}", base, attempt));
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }

        Ok(Self {
            dir,
            started_at: options.started_at,
            files: Vec::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes all rows of `table` as `INSERT` statements. Each row is the
    /// comma-separated literal list for `columns`, written verbatim.
    pub fn write_table(
        &mut self,
        table: &str,
        columns: &[String],
        rows: &[String],
    ) -> Result<&BackupFile> {
        let path = self.dir.join(format!("{}.sql", table));
        let mut out = BufWriter::new(File::create(&path)?);

        writeln!(out, "-- Backup of table {}", table)?;
        writeln!(out, "-- Taken at {}", header_timestamp(self.started_at))?;
        writeln!(out, "-- Rows: {}", rows.len())?;
        writeln!(out)?;

        let column_list = columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");

        for values in rows {
            writeln!(
                out,
                "INSERT INTO {} ({}) VALUES ({});",
                quote_ident(table),
                column_list,
                values
            )?;
        }
        out.flush()?;

        self.files.push(BackupFile {
            table: table.to_string(),
            path,
            rows: rows.len(),
        });
        Ok(&self.files[self.files.len() - 1])
    }

    pub fn finish(self) -> BackupManifest {
        BackupManifest {
            dir: self.dir,
            files: self.files,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn options(root: &Path) -> BackupWriterOptions {
        BackupWriterOptions {
            root: root.to_path_buf(),
            started_at: Local.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_writes_insert_statements() -> Result<()> {
        let tmp = tempdir()?;
        let mut writer = BackupWriter::new(options(tmp.path()))?;
        let columns = vec!["id".to_string(), "email".to_string(), "active".to_string()];
        let rows = vec![
            "'1'::integer, 'o''neil@example.com'::character varying, 'true'::boolean".to_string(),
            "'2'::integer, NULL, NULL".to_string(),
        ];

        let file = writer.write_table("t_user_info", &columns, &rows)?.clone();
        let content = fs::read_to_string(&file.path)?;

        assert_eq!(file.rows, 2);
        assert!(content.starts_with("-- Backup of table t_user_info\n-- Taken at 2024-05-01 12:30:00\n"));
        assert!(content.contains(
            "INSERT INTO \"t_user_info\" (\"id\", \"email\", \"active\") VALUES ('1'::integer, 'o''neil@example.com'::character varying, 'true'::boolean);"
        ));
        assert!(content.contains("VALUES ('2'::integer, NULL, NULL);"));
        Ok(())
    }

    #[test]
    fn test_directory_named_by_timestamp() -> Result<()> {
        let tmp = tempdir()?;
        let first = BackupWriter::new(options(tmp.path()))?;
        let second = BackupWriter::new(options(tmp.path()))?;

        assert_eq!(first.dir(), tmp.path().join("backup_20240501_123000"));
        assert_eq!(second.dir(), tmp.path().join("backup_20240501_123000_1"));
        Ok(())
    }

    #[test]
    fn test_manifest_lists_written_tables() -> Result<()> {
        let tmp = tempdir()?;
        let mut writer = BackupWriter::new(options(tmp.path()))?;
        writer.write_table("t_a", &["id".to_string()], &["'1'::integer".to_string()])?;
        writer.write_table("t_b", &["id".to_string()], &[])?;

        let manifest = writer.finish();

        assert_eq!(manifest.tables(), vec!["t_a", "t_b"]);
        assert_eq!(manifest.total_rows(), 1);
        assert!(manifest.dir.join("t_b.sql").exists());
        Ok(())
    }
}
