use std::{path::PathBuf, sync::Arc};

use clap::Args;

use crate::{
    cli::{
        Context,
        commands::{ExitOnErr, shared::print_diff},
    },
    services::{AssumeYes, ImportOptions, ImportService},
};

#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Entity file to compare (defaults to MODELSYNC__MODELS__PATH)
    #[arg(long, short, value_name = "FILE")]
    models: Option<PathBuf>,

    /// Table name prefix (defaults to MODELSYNC__MODELS__PREFIX)
    #[arg(long)]
    prefix: Option<String>,
}

pub async fn execute(args: &DiffArgs, ctx: &Context<'_>) {
    let mut options = ImportOptions::from_settings(ctx.settings);
    if let Some(models) = &args.models {
        options.models_path = models.clone();
    }
    if let Some(prefix) = &args.prefix {
        options.prefix = prefix.clone();
    }

    // Read-only; nothing is ever asked.
    let service = ImportService::new(ctx.settings.clone(), Arc::new(AssumeYes));
    let (registry, diff) = service.diff(&options).await.exit_on_err("Diff failed");

    println!("📦 {} entities in {}", registry.len(), options.models_path.display());
    print_diff(&diff);
    if !diff.has_changes() {
        println!("✅ Nothing to import");
    }
}
