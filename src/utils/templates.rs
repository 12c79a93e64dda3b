use anyhow::{Context as _, Result};
use rust_embed::RustEmbed;
use tera::{Context, Tera};

#[derive(RustEmbed)]
#[folder = "src/assets/"]
struct Assets;

/// Renders an embedded asset (path relative to `src/assets/`) with tera.
pub fn render_template(path: &str, context: &Context) -> Result<String> {
    let file = Assets::get(path).ok_or_else(|| anyhow::anyhow!("Unknown asset: {}", path))?;
    let source = std::str::from_utf8(file.data.as_ref())
        .with_context(|| format!("Asset {} is not valid UTF-8", path))?;

    Tera::default()
        .render_str(source, context)
        .with_context(|| format!("Failed to render {}", path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_embedded_assets() {
        let mut context = Context::new();
        context.insert("schema", "public");
        context.insert("target", "localhost:5432/sourcedb");
        context.insert("version", "0.1.0");
        context.insert("generated_at", "2026-01-01 00:00:00");
        context.insert("prefix", "t_");

        let rendered = render_template("templates/preamble.rs.jinja", &context).unwrap();

        assert!(rendered.contains("schema `public` on `localhost:5432/sourcedb`"));
        assert!(rendered.contains("use sea_orm::entity::prelude::*;"));
    }

    #[test]
    fn missing_asset_is_an_error() {
        assert!(render_template("templates/nope.jinja", &Context::new()).is_err());
    }
}
