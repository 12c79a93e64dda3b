use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use sea_orm::ConnectionTrait;
use tracing::{info, warn};

use crate::{
    catalog::SchemaReader,
    codegen::{ClassRenderer, FileEmitter},
    config::Settings,
    db::Session,
    utils::{ProgressReporter, time::elapsed_since},
};

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub prefix: String,
    pub output: PathBuf,
    /// Return the file instead of writing it.
    pub stdout: bool,
}

impl ExportOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            prefix: settings.models.prefix.clone(),
            output: PathBuf::from(&settings.models.path),
            stdout: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportReport {
    pub tables: Vec<String>,
    /// Where the file went, `None` for `--stdout`.
    pub output: Option<PathBuf>,
    pub content: String,
    pub duration: String,
}

/// Schema Reader → Class Renderer → File Emitter.
pub struct ExportService {
    settings: Settings,
}

impl ExportService {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub async fn run(&self, options: &ExportOptions, progress: &ProgressReporter) -> Result<ExportReport> {
        progress.report(format!("Connecting to {}...", self.settings.database.target()));
        let session = Session::open(&self.settings.database).await?;

        let result = self
            .export_with(session.conn(), session.target(), options, progress)
            .await;
        session.close().await;
        result
    }

    /// Runs the export over an already open connection.
    pub async fn export_with<C: ConnectionTrait>(
        &self,
        db: &C,
        target: &str,
        options: &ExportOptions,
        progress: &ProgressReporter,
    ) -> Result<ExportReport> {
        let started_at = Utc::now();
        let schema = &self.settings.database.schema;
        let exclude = self.settings.models.exclude_tables.clone().unwrap_or_default();

        progress.report(format!("Reading tables with prefix '{}'...", options.prefix));
        let reader = SchemaReader::new(db, schema.clone());
        let tables = reader.read_tables(&options.prefix, &exclude).await?;
        if tables.is_empty() {
            warn!(
                "⚠️ No tables with prefix '{}' in schema '{}'; the file will hold no entities",
                options.prefix, schema
            );
        }

        progress.report(format!("Rendering {} entities...", tables.len()));
        let renderer = ClassRenderer::new(&options.prefix, self.settings.models.strict_types);
        let rendered = renderer.render_all(&tables)?;

        let emitter = FileEmitter::new(schema.clone(), target, &options.prefix);
        let file = emitter.compose(&rendered)?;

        let output = if options.stdout {
            None
        } else {
            progress.report(format!("Writing {}...", options.output.display()));
            emitter.write(&options.output, &file)?;
            Some(options.output.clone())
        };

        let duration = elapsed_since(started_at);
        info!("✅ Exported {} table(s) in {}", file.tables.len(), duration);

        Ok(ExportReport {
            tables: file.tables,
            output,
            content: file.content,
            duration,
        })
    }
}
