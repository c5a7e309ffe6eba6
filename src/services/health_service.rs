use crate::adapters::database::{Statement, StatementExecutor};
use crate::config::HealthConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

#[derive(Clone, Debug)]
pub struct HealthService {
    executor: Arc<dyn StatementExecutor>,
    config: HealthConfig,
}

impl HealthService {
    #[must_use]
    pub fn new(executor: Arc<dyn StatementExecutor>, config: HealthConfig) -> Self {
        Self { executor, config }
    }

    /// Checks database connectivity with a full connect/query/close cycle.
    ///
    /// # Errors
    /// Returns a string describing the failure if the database is unreachable.
    pub async fn check_db(&self) -> Result<(), String> {
        let db_timeout = Duration::from_millis(self.config.db_timeout_ms);

        match timeout(db_timeout, self.executor.execute(&Statement::new("SELECT 1"))).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(format!("Database check failed: {e}")),
            Err(_) => Err("Database connection timed out".to_string()),
        }
    }
}
