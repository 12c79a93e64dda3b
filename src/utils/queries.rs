use anyhow::Result;
use tera::Context;

use super::templates::render_template;

/// Catalog query by file name under `src/assets/sql/`.
pub fn get_query(name: &str) -> Result<String> {
    render_template(&format!("sql/{}", name), &Context::new())
}
