#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

pub mod adapters;
pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod telemetry;

use crate::adapters::database::{DirectExecutor, StatementExecutor, UserRepository};
use crate::api::AppState;
use crate::config::Config;
use crate::services::account_service::AccountService;
use crate::services::health_service::HealthService;
use std::sync::Arc;

/// Wires repositories and services from the parsed configuration.
///
/// No connection is opened here; every repository call connects on demand.
#[derive(Clone, Debug)]
pub struct App {
    pub user_repo: UserRepository,
    pub state: AppState,
}

impl App {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let executor: Arc<dyn StatementExecutor> = Arc::new(DirectExecutor::new(Arc::new(config.database.clone())));
        Self::with_executor(executor, config)
    }

    /// Like [`App::new`], with a caller-supplied executor (e.g. a pooled one).
    #[must_use]
    pub fn with_executor(executor: Arc<dyn StatementExecutor>, config: &Config) -> Self {
        let user_repo = UserRepository::new(Arc::clone(&executor), config.database.schema.clone());
        let state = AppState {
            account_service: AccountService::new(user_repo.clone()),
            health_service: HealthService::new(executor, config.health.clone()),
        };
        Self { user_repo, state }
    }
}
