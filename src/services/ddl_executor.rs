use sea_orm::{ConnectionTrait, DbErr, Statement, TransactionTrait};
use tracing::{debug, error, info};

use crate::{delta::DdlPlan, errors::SyncError, utils::ProgressReporter};

/// Runs the whole plan in one transaction. The first failing statement rolls
/// everything back and comes back as `SyncError::Ddl`.
pub async fn execute_plan<C: TransactionTrait>(
    db: &C,
    plan: &DdlPlan,
    progress: &ProgressReporter,
) -> Result<usize, SyncError> {
    let txn = db.begin().await.map_err(|source| SyncError::Ddl {
        table: "*".to_string(),
        statement: "BEGIN".to_string(),
        source,
    })?;

    for (i, statement) in plan.statements.iter().enumerate() {
        progress.report(format!(
            "[{}/{}] {} {}",
            i + 1,
            plan.len(),
            statement.kind,
            statement.table
        ));
        debug!(sql = %statement.sql, "Executing");

        let backend = txn.get_database_backend();
        if let Err(source) = txn
            .execute(Statement::from_string(backend, statement.sql.clone()))
            .await
        {
            error!(
                "❌ Statement {} of {} failed on {}: {}",
                i + 1,
                plan.len(),
                statement.table,
                source
            );
            rollback(txn).await;
            return Err(SyncError::Ddl {
                table: statement.table.clone(),
                statement: statement.sql.clone(),
                source,
            });
        }
    }

    txn.commit().await.map_err(|source| SyncError::Ddl {
        table: "*".to_string(),
        statement: "COMMIT".to_string(),
        source,
    })?;

    info!("🏗️ Applied {} DDL statement(s)", plan.len());
    Ok(plan.len())
}

async fn rollback(txn: sea_orm::DatabaseTransaction) {
    match txn.rollback().await {
        Ok(()) => info!("↩️ Transaction rolled back"),
        Err(DbErr::Conn(err)) => error!("Rollback failed, connection lost: {}", err),
        Err(err) => error!("Rollback failed: {}", err),
    }
}
