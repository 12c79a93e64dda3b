use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Result;
use chrono::Utc;
use sea_orm::{ConnectionTrait, TransactionTrait};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::{
    catalog::SchemaReader,
    config::Settings,
    db::Session,
    delta::{DdlPlan, LiveSchema, build_plan, diff_tables},
    loader::ModelLoader,
    services::{
        backup_service::backup_tables,
        confirm::{Confirmer, Question},
        ddl_executor::execute_plan,
        verifier::verify_tables,
    },
    types::{BackupManifest, DiffResult, ModelRegistry, SyncPhase, TableVerification},
    utils::{ProgressReporter, time::elapsed_since},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize)]
pub enum BackupPolicy {
    /// Ask through the confirmer.
    #[default]
    Ask,
    Always,
    Never,
}

#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub models_path: PathBuf,
    pub prefix: String,
    pub backup: BackupPolicy,
    /// Stop after planning.
    pub dry_run: bool,
}

impl ImportOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            models_path: PathBuf::from(&settings.models.path),
            prefix: settings.models.prefix.clone(),
            backup: BackupPolicy::Ask,
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    /// Where the run stopped: `Verified`, `Cancelled`, or `Idle` when there
    /// was nothing to do or the run was dry.
    pub phase: SyncPhase,
    pub diff: DiffResult,
    pub plan: DdlPlan,
    pub backup: Option<BackupManifest>,
    pub verification: Vec<TableVerification>,
    pub duration: String,
}

/// Logs every phase change of one import run.
struct PhaseTracker {
    phase: SyncPhase,
}

impl PhaseTracker {
    fn new() -> Self {
        Self {
            phase: SyncPhase::Idle,
        }
    }

    fn advance(&mut self, next: SyncPhase) {
        if !self.phase.can_advance_to(next) {
            warn!("Unexpected phase change {} → {}", self.phase, next);
        }
        info!("{} → {}", self.phase.to_colored_string(), next.to_colored_string());
        self.phase = next;
    }

    fn fail(&mut self, err: &anyhow::Error) {
        error!("❌ Import failed during {}: {:#}", self.phase, err);
        self.advance(SyncPhase::Failed);
    }
}

/// Model Loader → Diff Reporter → confirmation → Backup Writer → DDL Executor → Verifier.
pub struct ImportService {
    settings: Settings,
    confirmer: Arc<dyn Confirmer>,
}

impl ImportService {
    pub fn new(settings: Settings, confirmer: Arc<dyn Confirmer>) -> Self {
        Self {
            settings,
            confirmer,
        }
    }

    pub async fn run(&self, options: &ImportOptions, progress: &ProgressReporter) -> Result<ImportReport> {
        progress.report(format!("Connecting to {}...", self.settings.database.target()));
        let session = Session::open(&self.settings.database).await?;

        let result = self.import_with(session.conn(), options, progress).await;
        session.close().await;
        result
    }

    /// Runs the import over an already open connection.
    pub async fn import_with<C>(
        &self,
        db: &C,
        options: &ImportOptions,
        progress: &ProgressReporter,
    ) -> Result<ImportReport>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let started_at = Utc::now();
        let mut tracker = PhaseTracker::new();
        tracker.advance(SyncPhase::Connected);

        match self.import_phases(db, options, progress, &mut tracker).await {
            Ok(mut report) => {
                report.duration = elapsed_since(started_at);
                info!("Import finished as {} in {}", report.phase, report.duration);
                if report.phase != SyncPhase::Idle {
                    tracker.advance(SyncPhase::Idle);
                }
                Ok(report)
            }
            Err(err) => {
                tracker.fail(&err);
                Err(err)
            }
        }
    }

    async fn import_phases<C>(
        &self,
        db: &C,
        options: &ImportOptions,
        progress: &ProgressReporter,
        tracker: &mut PhaseTracker,
    ) -> Result<ImportReport>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let schema = &self.settings.database.schema;
        let mut report = ImportReport::default();

        progress.report(format!("Loading models from {}...", options.models_path.display()));
        let registry = ModelLoader::new(&options.prefix).load(&options.models_path)?;
        info!("📦 Loaded {} entities", registry.len());
        tracker.advance(SyncPhase::ModelsLoaded);

        progress.report("Comparing with the database...");
        let (diff, live_tables) = self.diff_registry(db, &registry, &options.prefix).await?;
        report.diff = diff;
        tracker.advance(SyncPhase::Diffed);

        let reader = SchemaReader::new(db, schema.clone());
        let mut live = LiveSchema {
            tables: live_tables,
            ..Default::default()
        };
        for table in &report.diff.existing {
            if let Some(descriptor) = reader.reflect_table(table).await? {
                live.reflected.insert(table.clone(), descriptor);
            }
        }

        report.plan = build_plan(&registry, &report.diff, &live, schema);
        if report.plan.is_empty() {
            info!("✅ Database already matches the models, nothing to do");
            tracker.advance(SyncPhase::Idle);
            report.phase = SyncPhase::Idle;
            return Ok(report);
        }
        if options.dry_run {
            info!("Dry run: {} statement(s) planned, nothing applied", report.plan.len());
            tracker.advance(SyncPhase::Idle);
            report.phase = SyncPhase::Idle;
            return Ok(report);
        }

        if !self.confirmer.confirm(&Question::apply_changes(&report.diff))? {
            info!("Import cancelled, no changes made");
            tracker.advance(SyncPhase::Cancelled);
            report.phase = SyncPhase::Cancelled;
            return Ok(report);
        }

        let altered: Vec<String> = report
            .diff
            .existing
            .iter()
            .filter(|t| report.plan.statements.iter().any(|s| &s.table == *t))
            .cloned()
            .collect();
        if !altered.is_empty() && self.should_back_up(options.backup, &altered)? {
            let manifest = backup_tables(
                db,
                schema,
                Path::new(&self.settings.backup.dir),
                &altered,
                progress,
            )
            .await?;
            report.backup = Some(manifest);
            tracker.advance(SyncPhase::BackedUp);
        }

        execute_plan(db, &report.plan, progress).await?;
        tracker.advance(SyncPhase::TablesCreated);

        progress.report("Verifying...");
        report.verification =
            verify_tables(db, schema, &registry, &report.diff.affected()).await?;
        tracker.advance(SyncPhase::Verified);
        report.phase = SyncPhase::Verified;

        Ok(report)
    }

    fn should_back_up(&self, policy: BackupPolicy, tables: &[String]) -> Result<bool> {
        match policy {
            BackupPolicy::Always => Ok(true),
            BackupPolicy::Never => {
                warn!("⚠️ Skipping backup of {} existing table(s)", tables.len());
                Ok(false)
            }
            BackupPolicy::Ask => self.confirmer.confirm(&Question::BackupExisting {
                tables: tables.to_vec(),
            }),
        }
    }

    async fn diff_registry<C: ConnectionTrait>(
        &self,
        db: &C,
        registry: &ModelRegistry,
        prefix: &str,
    ) -> Result<(DiffResult, BTreeSet<String>)> {
        let reader = SchemaReader::new(db, self.settings.database.schema.clone());
        let live: BTreeSet<String> = reader.list_tables().await?.into_iter().collect();
        let model = registry.table_names();

        let diff = diff_tables(
            model.iter().map(String::as_str),
            live.iter().map(String::as_str),
            prefix,
        );
        info!(
            "🔍 {} new, {} existing, {} orphaned table(s)",
            diff.new.len(),
            diff.existing.len(),
            diff.orphaned.len()
        );
        for table in &diff.orphaned {
            warn!("⚠️ {} is not in the models; it is left untouched", table);
        }
        Ok((diff, live))
    }

    /// Loads the models and reports how they line up with the database.
    pub async fn diff(&self, options: &ImportOptions) -> Result<(ModelRegistry, DiffResult)> {
        let session = Session::open(&self.settings.database).await?;
        let result = self.diff_with(session.conn(), options).await;
        session.close().await;
        result
    }

    pub async fn diff_with<C: ConnectionTrait>(
        &self,
        db: &C,
        options: &ImportOptions,
    ) -> Result<(ModelRegistry, DiffResult)> {
        let registry = ModelLoader::new(&options.prefix).load(&options.models_path)?;
        let (diff, _) = self.diff_registry(db, &registry, &options.prefix).await?;
        Ok((registry, diff))
    }

    /// Compares every modelled table with the database without changing anything.
    pub async fn verify(&self, options: &ImportOptions) -> Result<Vec<TableVerification>> {
        let session = Session::open(&self.settings.database).await?;
        let result = self.verify_with(session.conn(), options).await;
        session.close().await;
        result
    }

    pub async fn verify_with<C: ConnectionTrait>(
        &self,
        db: &C,
        options: &ImportOptions,
    ) -> Result<Vec<TableVerification>> {
        let registry = ModelLoader::new(&options.prefix).load(&options.models_path)?;
        let tables: Vec<String> = registry.table_names().into_iter().collect();
        Ok(verify_tables(db, &self.settings.database.schema, &registry, &tables).await?)
    }
}
