use std::path::PathBuf;

use clap::Args;
use colored::Colorize;

use crate::{
    cli::{
        Context,
        commands::{ExitOnErr, new_spinner},
    },
    services::{ExportOptions, ExportService},
};

#[derive(Args, Debug)]
#[clap(after_help = r#"
EXAMPLES:
    # modelsync export --prefix t_ --output src/models.rs
    This will read every table starting with `t_` and write one SeaORM entity per table to `src/models.rs`.

    # modelsync export --stdout > models.rs
    This will print the generated file instead of writing it.
    "#)]
pub struct ExportArgs {
    /// Table name prefix, matched literally (defaults to MODELSYNC__MODELS__PREFIX)
    #[arg(long)]
    prefix: Option<String>,

    /// Output file (defaults to MODELSYNC__MODELS__PATH)
    #[arg(long, short, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print the generated file instead of writing it
    #[arg(long, conflicts_with = "output")]
    stdout: bool,
}

pub async fn execute(args: &ExportArgs, ctx: &Context<'_>) {
    let mut options = ExportOptions::from_settings(ctx.settings);
    if let Some(prefix) = &args.prefix {
        options.prefix = prefix.clone();
    }
    if let Some(output) = &args.output {
        options.output = output.clone();
    }
    options.stdout = args.stdout;

    let (spinner, progress) = new_spinner();
    let service = ExportService::new(ctx.settings.clone());
    let result = service.run(&options, &progress).await;
    spinner.finish_and_clear();

    let report = result.exit_on_err("Export failed");
    match &report.output {
        None => print!("{}", report.content),
        Some(path) => println!(
            "✅ Exported {} table(s) to {} in {}",
            report.tables.len().to_string().cyan(),
            path.display().to_string().green(),
            report.duration
        ),
    }
}
