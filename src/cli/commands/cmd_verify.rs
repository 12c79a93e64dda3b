use std::{path::PathBuf, sync::Arc};

use clap::Args;

use crate::{
    cli::{
        Context,
        commands::{ExitOnErr, shared::print_verification},
    },
    services::{AssumeYes, ImportOptions, ImportService},
};

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Entity file to verify against (defaults to MODELSYNC__MODELS__PATH)
    #[arg(long, short, value_name = "FILE")]
    models: Option<PathBuf>,

    /// Table name prefix (defaults to MODELSYNC__MODELS__PREFIX)
    #[arg(long)]
    prefix: Option<String>,
}

pub async fn execute(args: &VerifyArgs, ctx: &Context<'_>) {
    let mut options = ImportOptions::from_settings(ctx.settings);
    if let Some(models) = &args.models {
        options.models_path = models.clone();
    }
    if let Some(prefix) = &args.prefix {
        options.prefix = prefix.clone();
    }

    let service = ImportService::new(ctx.settings.clone(), Arc::new(AssumeYes));
    let results = service.verify(&options).await.exit_on_err("Verification failed");

    print_verification(&results);

    let dirty = results.iter().filter(|r| !r.is_clean()).count();
    if dirty > 0 {
        eprintln!("❌ {} of {} table(s) differ from their models", dirty, results.len());
        std::process::exit(1);
    }
    println!("✅ All {} table(s) match their models", results.len());
}
