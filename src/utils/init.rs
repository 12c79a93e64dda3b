use anyhow::Result;
use tera::Context;

use super::templates::render_template;

/// Contents of a starter `.env` file.
pub fn get_env_file_with_defaults(template_name: &str) -> Result<String> {
    render_template(&format!("env/{}", template_name), &Context::new())
}
