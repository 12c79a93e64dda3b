pub mod cmd_config;
pub mod cmd_diff;
pub mod cmd_export;
pub mod cmd_import;
pub mod cmd_init;
pub mod cmd_verify;
pub mod cmd_version;
pub mod shared;

use clap::Subcommand;

pub use shared::new_spinner;

use crate::cli::commands::{
    cmd_diff::DiffArgs, cmd_export::ExportArgs, cmd_import::ImportArgs, cmd_init::InitArgs,
    cmd_verify::VerifyArgs, cmd_version::VersionCommand,
};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate entity definitions from the database tables
    Export(ExportArgs),

    /// Create or update database tables from an entity file
    Import(ImportArgs),

    /// Compare an entity file with the database tables
    Diff(DiffArgs),

    /// Check the database tables against an entity file
    Verify(VerifyArgs),

    /// Print the effective configuration
    Config,

    /// Write a default .env file
    Init(InitArgs),

    /// Print version
    Version(VersionCommand),
}

pub trait ExitOnErr<T> {
    fn exit_on_err(self, msg: &str) -> T;
}

impl<T, E: std::fmt::Display> ExitOnErr<T> for Result<T, E> {
    fn exit_on_err(self, msg: &str) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                eprintln!("❌ {}: {:#}", msg, e);
                std::process::exit(1);
            }
        }
    }
}
