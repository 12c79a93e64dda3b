use std::path::PathBuf;

use clap::Args;
use inquire::Confirm;

use crate::{cli::commands::ExitOnErr, utils::init::get_env_file_with_defaults};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing file without asking
    #[arg(short, long, default_value_t = false)]
    overwrite: bool,

    /// Where to write the settings file
    #[arg(long, default_value = ".env", value_name = "FILE")]
    path: PathBuf,
}

pub fn execute(args: &InitArgs) {
    let env_file =
        get_env_file_with_defaults("env.default.jinja").exit_on_err("Failed to get env file");

    if args.path.exists() && !args.overwrite {
        let should_overwrite = Confirm::new(&format!(
            "{} already exists. Do you want to overwrite it?",
            args.path.display()
        ))
        .with_default(false)
        .prompt()
        .unwrap_or(false);

        if !should_overwrite {
            println!("Exiting...");
            return;
        }
    }

    std::fs::write(&args.path, env_file)
        .exit_on_err(&format!("Failed to create {}", args.path.display()));
    println!("✅ Created {}.", args.path.display());
    println!("   Fill in MODELSYNC__DATABASE__* and run `modelsync export`.");
}
