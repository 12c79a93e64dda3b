use clap::{Args, crate_name, crate_version};
use colored::Colorize;

#[derive(Args, Debug)]
pub struct VersionCommand {
    /// Print only the version number
    #[arg(long, short)]
    short: bool,
}

pub fn execute(action: &VersionCommand) {
    if action.short {
        println!("{}", crate_version!());
        return;
    }
    println!(
        "{} {} (entities for sea-orm 1.x, PostgreSQL)",
        crate_name!().green().bold(),
        crate_version!()
    );
}
