use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::{info, warn};

use crate::{config::DatabaseConfig, errors::SyncError};

/// The single connection of a run. Open it first, hand `conn()` to the
/// services, and `close()` it on every exit path.
pub struct Session {
    conn: DatabaseConnection,
    target: String,
}

impl Session {
    pub async fn open(config: &DatabaseConfig) -> Result<Self, SyncError> {
        let target = config.target();

        let mut options = ConnectOptions::new(config.url());
        options
            .max_connections(1)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .sqlx_logging(false);

        let conn = Database::connect(options)
            .await
            .map_err(|source| SyncError::Connection {
                target: target.clone(),
                source,
            })?;

        conn.ping().await.map_err(|source| SyncError::Connection {
            target: target.clone(),
            source,
        })?;

        info!("🔌 Connected to {} as {}", target, config.username);
        Ok(Self { conn, target })
    }

    pub fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub async fn close(self) {
        match self.conn.close().await {
            Ok(()) => info!("Connection to {} closed", self.target),
            Err(err) => warn!("Failed to close connection to {}: {}", self.target, err),
        }
    }
}
