use std::{fs, path::Path};

use chrono::Local;
use tera::Context;
use tracing::info;

use crate::{
    codegen::RenderedEntity, errors::SyncError, utils::render_template,
    utils::time::header_timestamp,
};

const PREAMBLE_TEMPLATE: &str = "templates/preamble.rs.jinja";

/// A complete generated entity file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub content: String,
    pub tables: Vec<String>,
}

/// Assembles rendered entities into one file: preamble, entity modules in
/// the given order, then `pub use <module>::Entity as <Class>;` re-exports.
pub struct FileEmitter {
    schema: String,
    target: String,
    prefix: String,
}

impl FileEmitter {
    pub fn new(schema: impl Into<String>, target: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            target: target.into(),
            prefix: prefix.into(),
        }
    }

    pub fn compose(&self, entities: &[RenderedEntity]) -> Result<GeneratedFile, SyncError> {
        let mut context = Context::new();
        context.insert("schema", &self.schema);
        context.insert("target", &self.target);
        context.insert("prefix", &self.prefix);
        context.insert("version", env!("CARGO_PKG_VERSION"));
        context.insert("generated_at", &header_timestamp(Local::now()));

        let preamble =
            render_template(PREAMBLE_TEMPLATE, &context).map_err(|e| SyncError::Render {
                table: "*".to_string(),
                reason: format!("{:#}", e),
            })?;

        let mut content = preamble.trim_end().to_string();
        content.push_str("\n\n");
        for rendered in entities {
            content.push_str(rendered.source.trim_end());
            content.push_str("\n\n");
        }
        for rendered in entities {
            content.push_str(&format!(
                "pub use {}::Entity as {};\n",
                rendered.entity.module_name, rendered.entity.class_name
            ));
        }

        Ok(GeneratedFile {
            content,
            tables: entities.iter().map(|e| e.entity.table_name.clone()).collect(),
        })
    }

    /// Writes the file, creating parent directories and replacing any previous file.
    pub fn write(&self, path: &Path, file: &GeneratedFile) -> Result<(), SyncError> {
        let write_err = |source| SyncError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(path, &file.content).map_err(write_err)?;

        info!(
            "📝 Wrote {} entities to {}",
            file.tables.len(),
            path.display()
        );
        Ok(())
    }
}
