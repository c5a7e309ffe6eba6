#![allow(clippy::unwrap_used, clippy::panic, missing_debug_implementations, unreachable_pub, dead_code)]
use sqlx::Row;
use std::sync::{Arc, Once};
use std::time::{Duration, Instant};
use uuid::Uuid;
use vtb_auth::adapters::database::{DirectExecutor, SqlParam, Statement, StatementExecutor, UserRepository, escape_identifier};
use vtb_auth::config::{
    AwsDbConfig, Config, DatabaseConfig, HealthConfig, LocalDbConfig, LogFormat, ServerConfig, TelemetryConfig,
};
use vtb_auth::App;

static INIT: Once = Once::new();

pub fn setup_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into())
            .add_directive("vtb_auth=debug".parse().unwrap())
            .add_directive("sqlx=warn".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap());

        tracing_subscriber::fmt().with_env_filter(filter).init();
    });
}

/// Local-mode settings taken from the usual `PG*` variables, each test in its own schema.
pub fn get_test_config() -> Config {
    Config {
        command: None,
        database: DatabaseConfig {
            mode: Some("local".to_string()),
            schema: format!("test_{}", Uuid::new_v4().simple()),
            application_name: "vtb-auth-test".to_string(),
            local: LocalDbConfig {
                pg_user: std::env::var("PGUSER").ok(),
                pg_host: std::env::var("PGHOST").ok(),
                pg_database: std::env::var("PGDATABASE").ok(),
                pg_password: std::env::var("PGPASSWORD").ok(),
                pg_port: std::env::var("PGPORT").ok(),
            },
            aws: AwsDbConfig::default(),
        },
        server: ServerConfig { host: "127.0.0.1".to_string(), port: 0 },
        health: HealthConfig { db_timeout_ms: 2000 },
        telemetry: TelemetryConfig { log_format: LogFormat::Text },
    }
}

pub fn executor_for(config: &DatabaseConfig) -> Arc<dyn StatementExecutor> {
    Arc::new(DirectExecutor::new(Arc::new(config.clone())))
}

/// A repository over a freshly initialized schema.
pub async fn init_repo(config: &Config) -> UserRepository {
    setup_tracing();
    let repo = App::new(config).user_repo;
    repo.init().await.expect("Failed to initialize schema. Is Postgres running?");
    repo
}

pub async fn drop_schema(config: &DatabaseConfig) {
    let sql = format!("DROP SCHEMA IF EXISTS {} CASCADE", escape_identifier(&config.schema));
    executor_for(config).execute(&Statement::new(sql)).await.unwrap();
}

/// Counts server backends reporting `application_name`, waiting briefly for
/// terminated sessions to leave `pg_stat_activity`.
pub async fn open_backends(observer: &Arc<dyn StatementExecutor>, application_name: &str) -> i64 {
    let statement = Statement::new("SELECT count(*) AS n FROM pg_stat_activity WHERE application_name = $1")
        .bind(SqlParam::Text(application_name.to_string()));
    let deadline = Instant::now() + Duration::from_secs(2);

    loop {
        let rows = observer.execute(&statement).await.unwrap();
        let n: i64 = rows[0].get("n");
        if n == 0 || Instant::now() >= deadline {
            return n;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

pub struct TestApp {
    pub server_url: String,
    pub client: reqwest::Client,
    pub config: Config,
    pub user_repo: UserRepository,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let config = get_test_config();
        let user_repo = init_repo(&config).await;
        Self::spawn_with_config(config, user_repo).await
    }

    pub async fn spawn_with_config(config: Config, user_repo: UserRepository) -> Self {
        setup_tracing();
        let app = App::new(&config);
        let router = vtb_auth::api::app_router(app.state);

        let listener = tokio::net::TcpListener::bind(format!("{}:{}", config.server.host, config.server.port))
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self { server_url: format!("http://{addr}"), client: reqwest::Client::new(), config, user_repo }
    }

    pub async fn post_form(&self, path: &str, username: &str, password: &str) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.server_url, path))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(format!("username={username}&password={password}"))
            .send()
            .await
            .unwrap()
    }
}
