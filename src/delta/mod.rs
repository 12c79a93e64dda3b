pub mod ddl;
pub mod diff;

pub use ddl::{DdlPlan, LiveSchema, PlannedStatement, StatementKind, build_plan};
pub use diff::diff_tables;
