use std::{path::PathBuf, sync::Arc};

use clap::Args;
use colored::Colorize;

use crate::{
    cli::{
        Context,
        commands::{
            ExitOnErr, new_spinner,
            shared::{InquireConfirmer, print_diff, print_plan, print_verification},
        },
    },
    services::{AssumeYes, BackupPolicy, Confirmer, ImportOptions, ImportService},
    types::SyncPhase,
};

#[derive(Args, Debug)]
#[clap(after_help = r#"
EXAMPLES:
    # modelsync import --models src/models.rs --dry-run
    This will load the entities, compare them with the database and print the DDL that would run.

    # modelsync import --yes --backup
    This will back up the existing tables, then create and update tables without asking.
    "#)]
pub struct ImportArgs {
    /// Entity file to import (defaults to MODELSYNC__MODELS__PATH)
    #[arg(long, short, value_name = "FILE")]
    models: Option<PathBuf>,

    /// Table name prefix (defaults to MODELSYNC__MODELS__PREFIX)
    #[arg(long)]
    prefix: Option<String>,

    /// Answer yes to every confirmation
    #[arg(long, short)]
    yes: bool,

    /// Back up existing tables without asking
    #[arg(long, conflicts_with = "no_backup")]
    backup: bool,

    /// Never back up existing tables
    #[arg(long)]
    no_backup: bool,

    /// Print the plan without touching the database
    #[arg(long)]
    dry_run: bool,
}

impl ImportArgs {
    fn backup_policy(&self) -> BackupPolicy {
        match (self.backup, self.no_backup, self.yes) {
            (true, _, _) => BackupPolicy::Always,
            (_, true, _) => BackupPolicy::Never,
            // `--yes` alone still keeps a backup.
            (_, _, true) => BackupPolicy::Always,
            _ => BackupPolicy::Ask,
        }
    }
}

pub async fn execute(args: &ImportArgs, ctx: &Context<'_>) {
    let mut options = ImportOptions::from_settings(ctx.settings);
    if let Some(models) = &args.models {
        options.models_path = models.clone();
    }
    if let Some(prefix) = &args.prefix {
        options.prefix = prefix.clone();
    }
    options.backup = args.backup_policy();
    options.dry_run = args.dry_run;

    let (spinner, progress) = new_spinner();
    let confirmer: Arc<dyn Confirmer> = if args.yes {
        Arc::new(AssumeYes)
    } else {
        Arc::new(InquireConfirmer::new(spinner.clone()))
    };

    let service = ImportService::new(ctx.settings.clone(), confirmer);
    let result = service.run(&options, &progress).await;
    spinner.finish_and_clear();

    let report = result.exit_on_err("Import failed");

    print_diff(&report.diff);
    print_plan(&report.plan);
    if let Some(backup) = &report.backup {
        println!(
            "💾 Backed up {} table(s), {} row(s) to {}",
            backup.files.len(),
            backup.total_rows(),
            backup.dir.display().to_string().green()
        );
    }
    if !report.verification.is_empty() {
        print_verification(&report.verification);
    }

    match report.phase {
        SyncPhase::Cancelled => println!("✅ Aborted, no changes made"),
        SyncPhase::Verified => println!(
            "✅ Import completed in {} ({} statement(s))",
            report.duration,
            report.plan.len()
        ),
        _ if options.dry_run && !report.plan.is_empty() => {
            println!("✅ Dry run completed, nothing applied")
        }
        _ => println!("✅ Database already matches the models"),
    }
}
