use crate::adapters::database::credentials;
use crate::adapters::database::sql::Statement;
use crate::config::DatabaseConfig;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Connection, PgConnection};
use std::fmt;
use std::sync::Arc;

/// Runs one statement and returns its rows.
///
/// This is the seam between the repositories and connection management; a pooled
/// implementation can replace [`DirectExecutor`] without touching callers.
#[async_trait]
pub trait StatementExecutor: Send + Sync + fmt::Debug {
    async fn execute(&self, statement: &Statement) -> Result<Vec<PgRow>>;
}

/// Opens a dedicated connection for every statement and closes it afterwards.
#[derive(Clone, Debug)]
pub struct DirectExecutor {
    config: Arc<DatabaseConfig>,
}

impl DirectExecutor {
    #[must_use]
    pub const fn new(config: Arc<DatabaseConfig>) -> Self {
        Self { config }
    }

    async fn connect(&self) -> Result<PgConnection> {
        let descriptor = credentials::resolve(&self.config)?;
        tracing::debug!(
            db.host = %descriptor.host,
            db.port = descriptor.port,
            db.user = %descriptor.username,
            signed = descriptor.is_signed(),
            "Opening database connection"
        );

        let options = descriptor.connect_options().await?;
        PgConnection::connect_with(&options).await.map_err(AppError::Connection)
    }
}

#[async_trait]
impl StatementExecutor for DirectExecutor {
    #[tracing::instrument(level = "debug", skip_all, err)]
    async fn execute(&self, statement: &Statement) -> Result<Vec<PgRow>> {
        let mut conn = self.connect().await?;

        let result = statement.fetch_all(&mut conn).await;

        if let Err(e) = conn.close().await {
            tracing::warn!(error = %e, "Failed to close database connection");
        }

        result.map_err(AppError::Query)
    }
}
