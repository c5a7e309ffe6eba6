use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub database: DatabaseConfig,

    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub health: HealthConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Drop and recreate the user schema. Destroys all stored users.
    Init,
    /// Print every stored user as a JSON line
    Show,
}

/// Database settings. Nothing here is validated at parse time: the credential
/// resolver decides which fields are required for the selected mode.
#[derive(Clone, Debug, Args)]
pub struct DatabaseConfig {
    /// Connection mode: `local` (static credentials) or `aws` (RDS IAM auth tokens)
    #[arg(long = "db-mode", env = "DBMODE")]
    pub mode: Option<String>,

    /// Schema that holds the users table
    #[arg(long = "db-schema", env = "VTB_DB_SCHEMA", default_value = "vtb")]
    pub schema: String,

    /// `application_name` reported by every connection
    #[arg(long = "db-application-name", env = "VTB_DB_APPLICATION_NAME", default_value = "vtb-auth")]
    pub application_name: String,

    #[command(flatten)]
    pub local: LocalDbConfig,

    #[command(flatten)]
    pub aws: AwsDbConfig,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            mode: None,
            schema: "vtb".to_string(),
            application_name: "vtb-auth".to_string(),
            local: LocalDbConfig::default(),
            aws: AwsDbConfig::default(),
        }
    }
}

#[derive(Clone, Debug, Default, Args)]
pub struct LocalDbConfig {
    /// Database user (Default: postgres)
    #[arg(long, env = "PGUSER")]
    pub pg_user: Option<String>,

    /// Database host (Default: localhost)
    #[arg(long, env = "PGHOST")]
    pub pg_host: Option<String>,

    /// Database name (Default: postgres)
    #[arg(long, env = "PGDATABASE")]
    pub pg_database: Option<String>,

    /// Database password (Default: 12345)
    #[arg(long, env = "PGPASSWORD", hide_env_values = true)]
    pub pg_password: Option<String>,

    /// Database port (Default: 5432)
    #[arg(long, env = "PGPORT")]
    pub pg_port: Option<String>,
}

#[derive(Clone, Debug, Default, Args)]
pub struct AwsDbConfig {
    /// AWS access key id used to sign RDS auth tokens
    #[arg(long, env = "VTB_AWS_ACCESS_KEY_ID")]
    pub aws_access_key_id: Option<String>,

    /// AWS secret access key used to sign RDS auth tokens
    #[arg(long, env = "VTB_AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub aws_secret_access_key: Option<String>,

    /// Region of the RDS instance
    #[arg(long, env = "VTB_AWS_POSTGRES_REGION")]
    pub aws_region: Option<String>,

    /// Hostname of the RDS instance
    #[arg(long, env = "VTB_AWS_POSTGRES_HOSTNAME")]
    pub aws_hostname: Option<String>,

    /// Port of the RDS instance
    #[arg(long, env = "VTB_AWS_POSTGRES_PORT")]
    pub aws_port: Option<String>,

    /// Database user with the rds_iam role
    #[arg(long, env = "VTB_AWS_POSTGRES_USERNAME")]
    pub aws_username: Option<String>,

    /// Database name
    #[arg(long, env = "VTB_AWS_POSTGRES_DATABASE")]
    pub aws_database: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct ServerConfig {
    /// Host to listen on
    #[arg(long, env = "VTB_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "VTB_PORT", default_value_t = 3000)]
    pub port: u16,
}

#[derive(Clone, Debug, Args)]
pub struct HealthConfig {
    /// Time allowed for the readiness probe's database round trip
    #[arg(long, env = "VTB_HEALTH_DB_TIMEOUT_MS", default_value_t = 2000)]
    pub db_timeout_ms: u64,
}

#[derive(Clone, Debug, Args)]
pub struct TelemetryConfig {
    /// Log output format
    #[arg(long, env = "VTB_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

impl Config {
    #[must_use]
    pub fn load() -> Self {
        Self::parse()
    }

    #[must_use]
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Serve)
    }
}
