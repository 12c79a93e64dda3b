pub mod backup_writer;
pub mod init;
pub mod logger;
pub mod progress;
pub mod queries;
pub mod serde;
pub mod templates;
pub mod time;
pub mod utils;

pub use backup_writer::{BackupWriter, BackupWriterOptions};
pub use progress::ProgressReporter;
pub use queries::get_query;
pub use templates::render_template;
pub use time::format_duration;
pub use utils::{qualified_name, quote_ident, value_literal_expr};
