mod commands;

use clap::Parser;
use colored::Colorize;

use crate::cli::commands::{
    Commands, cmd_config, cmd_diff, cmd_export, cmd_import, cmd_init, cmd_verify, cmd_version,
};
use crate::config::Settings;

pub use commands::ExitOnErr;

pub struct Context<'a> {
    pub settings: &'a Settings,
}

#[derive(Parser, Debug)]
#[command(
    name = "modelsync",
    version,
    about = "Export PostgreSQL tables as SeaORM entities and import them back",
    long_about = format!(
r#"{} - {}"#,
"MODELSYNC".green().bold(),
"Round-trip PostgreSQL tables through SeaORM entity files."
))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub async fn execute(&self, ctx: &Context<'_>) {
        match &self.command {
            Commands::Export(args) => cmd_export::execute(args, ctx).await,
            Commands::Import(args) => cmd_import::execute(args, ctx).await,
            Commands::Diff(args) => cmd_diff::execute(args, ctx).await,
            Commands::Verify(args) => cmd_verify::execute(args, ctx).await,
            Commands::Config => cmd_config::execute(ctx.settings),
            Commands::Init(args) => cmd_init::execute(args),
            Commands::Version(action) => cmd_version::execute(action),
        }
    }
}
