use crate::adapters::database::signer::{AuthTokenSigner, RdsIamSigner};
use crate::config::{AwsDbConfig, DatabaseConfig, LocalDbConfig};
use crate::error::{ConfigError, Result};
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

const DEFAULT_USER: &str = "postgres";
const DEFAULT_HOST: &str = "localhost";
const DEFAULT_DATABASE: &str = "postgres";
const DEFAULT_PASSWORD: &str = "12345";
const DEFAULT_PORT: u16 = 5432;

pub const ENV_AWS_ACCESS_KEY_ID: &str = "VTB_AWS_ACCESS_KEY_ID";
pub const ENV_AWS_SECRET_ACCESS_KEY: &str = "VTB_AWS_SECRET_ACCESS_KEY";
pub const ENV_AWS_REGION: &str = "VTB_AWS_POSTGRES_REGION";
pub const ENV_AWS_HOSTNAME: &str = "VTB_AWS_POSTGRES_HOSTNAME";
pub const ENV_AWS_PORT: &str = "VTB_AWS_POSTGRES_PORT";
pub const ENV_AWS_USERNAME: &str = "VTB_AWS_POSTGRES_USERNAME";
pub const ENV_AWS_DATABASE: &str = "VTB_AWS_POSTGRES_DATABASE";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DbMode {
    Local,
    Aws,
}

impl FromStr for DbMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "local" => Ok(Self::Local),
            "aws" => Ok(Self::Aws),
            other => Err(ConfigError::InvalidMode(other.to_string())),
        }
    }
}

/// Where the password for a connection comes from.
#[derive(Clone)]
pub enum PasswordSource {
    Static(String),
    /// Invoked once per connection attempt; the token is never stored.
    Signed(Arc<dyn AuthTokenSigner>),
}

impl fmt::Debug for PasswordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(_) => f.write_str("Static(<redacted>)"),
            Self::Signed(signer) => f.debug_tuple("Signed").field(signer).finish(),
        }
    }
}

/// Everything needed to open one connection.
#[derive(Clone, Debug)]
pub struct ConnectionDescriptor {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub database: String,
    pub application_name: String,
    pub password: PasswordSource,
}

impl ConnectionDescriptor {
    #[must_use]
    pub const fn is_signed(&self) -> bool {
        matches!(self.password, PasswordSource::Signed(_))
    }

    /// Builds connect options for a single attempt. Signed descriptors mint a new
    /// token here, and require TLS since RDS rejects IAM auth over plaintext.
    ///
    /// # Errors
    /// Returns `AppError::TokenSigning` if the signer fails.
    pub async fn connect_options(&self) -> Result<PgConnectOptions> {
        let (password, ssl_mode) = match &self.password {
            PasswordSource::Static(password) => (password.clone(), PgSslMode::Prefer),
            PasswordSource::Signed(signer) => (signer.auth_token().await?, PgSslMode::Require),
        };

        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&password)
            .database(&self.database)
            .application_name(&self.application_name)
            .ssl_mode(ssl_mode))
    }
}

/// Resolves the connection descriptor for the configured mode.
///
/// Only reads `config`; for `aws` mode the signer is constructed but not invoked.
///
/// # Errors
/// Returns a `ConfigError` if the mode is unset or unknown, or if `aws` mode is
/// missing a required value.
pub fn resolve(config: &DatabaseConfig) -> std::result::Result<ConnectionDescriptor, ConfigError> {
    let mode: DbMode = non_empty(config.mode.as_ref()).ok_or(ConfigError::MissingMode)?.parse()?;

    let mut descriptor = match mode {
        DbMode::Local => resolve_local(&config.local),
        DbMode::Aws => resolve_aws(&config.aws)?,
    };
    descriptor.application_name = config.application_name.clone();
    Ok(descriptor)
}

fn resolve_local(config: &LocalDbConfig) -> ConnectionDescriptor {
    // Port 0 is treated as unset, like an unparsable value.
    let port = non_empty(config.pg_port.as_ref())
        .and_then(|p| p.parse::<u16>().ok())
        .filter(|p| *p != 0)
        .unwrap_or(DEFAULT_PORT);

    ConnectionDescriptor {
        host: non_empty(config.pg_host.as_ref()).unwrap_or(DEFAULT_HOST).to_string(),
        port,
        username: non_empty(config.pg_user.as_ref()).unwrap_or(DEFAULT_USER).to_string(),
        database: non_empty(config.pg_database.as_ref()).unwrap_or(DEFAULT_DATABASE).to_string(),
        password: PasswordSource::Static(
            non_empty(config.pg_password.as_ref()).unwrap_or(DEFAULT_PASSWORD).to_string(),
        ),
        application_name: String::new(),
    }
}

fn resolve_aws(config: &AwsDbConfig) -> std::result::Result<ConnectionDescriptor, ConfigError> {
    let access_key_id = required(config.aws_access_key_id.as_ref(), ENV_AWS_ACCESS_KEY_ID)?;
    let secret_access_key = required(config.aws_secret_access_key.as_ref(), ENV_AWS_SECRET_ACCESS_KEY)?;
    let region = required(config.aws_region.as_ref(), ENV_AWS_REGION)?;
    let hostname = required(config.aws_hostname.as_ref(), ENV_AWS_HOSTNAME)?;
    let raw_port = required(config.aws_port.as_ref(), ENV_AWS_PORT)?;
    let username = required(config.aws_username.as_ref(), ENV_AWS_USERNAME)?;
    let database = required(config.aws_database.as_ref(), ENV_AWS_DATABASE)?;

    let port: u16 = raw_port
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key: ENV_AWS_PORT, value: raw_port.to_string() })?;

    let signer = RdsIamSigner::new(access_key_id, secret_access_key, region, hostname, port, username);

    Ok(ConnectionDescriptor {
        host: hostname.to_string(),
        port,
        username: username.to_string(),
        database: database.to_string(),
        application_name: String::new(),
        password: PasswordSource::Signed(Arc::new(signer)),
    })
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.is_empty())
}

fn required<'a>(value: Option<&'a String>, key: &'static str) -> std::result::Result<&'a str, ConfigError> {
    non_empty(value).ok_or(ConfigError::MissingKey(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn aws_config() -> DatabaseConfig {
        DatabaseConfig {
            mode: Some("aws".into()),
            aws: AwsDbConfig {
                aws_access_key_id: Some("AKIDEXAMPLE".into()),
                aws_secret_access_key: Some("secret".into()),
                aws_region: Some("eu-central-1".into()),
                aws_hostname: Some("db.example.com".into()),
                aws_port: Some("5433".into()),
                aws_username: Some("vtb_app".into()),
                aws_database: Some("vtb".into()),
            },
            ..DatabaseConfig::default()
        }
    }

    #[test]
    fn test_local_defaults() {
        let config = DatabaseConfig { mode: Some("local".into()), ..DatabaseConfig::default() };
        let descriptor = resolve(&config).unwrap();

        assert_eq!(descriptor.host, "localhost");
        assert_eq!(descriptor.port, 5432);
        assert_eq!(descriptor.username, "postgres");
        assert_eq!(descriptor.database, "postgres");
        assert!(matches!(descriptor.password, PasswordSource::Static(ref p) if p == "12345"));
        assert!(!descriptor.is_signed());
    }

    #[test]
    fn test_local_overrides_take_precedence() {
        let config = DatabaseConfig {
            mode: Some("local".into()),
            local: LocalDbConfig {
                pg_user: Some("app".into()),
                pg_host: Some("db.internal".into()),
                pg_database: None,
                pg_password: Some(String::new()),
                pg_port: Some("6543".into()),
            },
            ..DatabaseConfig::default()
        };
        let descriptor = resolve(&config).unwrap();

        assert_eq!(descriptor.host, "db.internal");
        assert_eq!(descriptor.port, 6543);
        assert_eq!(descriptor.username, "app");
        assert_eq!(descriptor.database, "postgres");
        // Empty values count as unset.
        assert!(matches!(descriptor.password, PasswordSource::Static(ref p) if p == "12345"));
    }

    #[test]
    fn test_local_unparsable_port_falls_back() {
        let mut config = DatabaseConfig { mode: Some("local".into()), ..DatabaseConfig::default() };
        config.local.pg_port = Some("not-a-port".into());

        assert_eq!(resolve(&config).unwrap().port, 5432);
    }

    #[test]
    fn test_local_zero_port_falls_back() {
        let mut config = DatabaseConfig { mode: Some("local".into()), ..DatabaseConfig::default() };
        config.local.pg_port = Some("0".into());

        assert_eq!(resolve(&config).unwrap().port, 5432);
    }

    #[test]
    fn test_application_name_comes_from_config() {
        let mut config = DatabaseConfig { mode: Some("local".into()), ..DatabaseConfig::default() };
        assert_eq!(resolve(&config).unwrap().application_name, "vtb-auth");

        config.application_name = "vtb-auth-worker".into();
        assert_eq!(resolve(&config).unwrap().application_name, "vtb-auth-worker");
        assert_eq!(resolve(&aws_config()).unwrap().application_name, "vtb-auth");
    }

    #[test]
    fn test_missing_mode() {
        let config = DatabaseConfig::default();
        assert_eq!(resolve(&config).unwrap_err(), ConfigError::MissingMode);

        let config = DatabaseConfig { mode: Some(String::new()), ..DatabaseConfig::default() };
        assert_eq!(resolve(&config).unwrap_err(), ConfigError::MissingMode);
    }

    #[test]
    fn test_unknown_mode() {
        let config = DatabaseConfig { mode: Some("gcp".into()), ..DatabaseConfig::default() };
        assert_eq!(resolve(&config).unwrap_err(), ConfigError::InvalidMode("gcp".into()));
    }

    #[test]
    fn test_aws_resolves_signed_descriptor() {
        let descriptor = resolve(&aws_config()).unwrap();

        assert!(descriptor.is_signed());
        assert_eq!(descriptor.host, "db.example.com");
        assert_eq!(descriptor.port, 5433);
        assert_eq!(descriptor.username, "vtb_app");
        assert_eq!(descriptor.database, "vtb");
    }

    #[test]
    fn test_aws_missing_each_key() {
        type Clear = fn(&mut AwsDbConfig);
        let cases: [(Clear, &str); 7] = [
            (|c| c.aws_access_key_id = None, ENV_AWS_ACCESS_KEY_ID),
            (|c| c.aws_secret_access_key = None, ENV_AWS_SECRET_ACCESS_KEY),
            (|c| c.aws_region = None, ENV_AWS_REGION),
            (|c| c.aws_hostname = None, ENV_AWS_HOSTNAME),
            (|c| c.aws_port = None, ENV_AWS_PORT),
            (|c| c.aws_username = None, ENV_AWS_USERNAME),
            (|c| c.aws_database = Some(String::new()), ENV_AWS_DATABASE),
        ];

        for (clear, key) in cases {
            let mut config = aws_config();
            clear(&mut config.aws);
            assert_eq!(resolve(&config).unwrap_err(), ConfigError::MissingKey(key));
        }
    }

    #[test]
    fn test_aws_invalid_port() {
        let mut config = aws_config();
        config.aws.aws_port = Some("70000".into());

        assert_eq!(
            resolve(&config).unwrap_err(),
            ConfigError::InvalidValue { key: ENV_AWS_PORT, value: "70000".into() }
        );
    }

    #[derive(Debug, Default)]
    struct CountingSigner {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AuthTokenSigner for CountingSigner {
        async fn auth_token(&self) -> Result<String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("token-{n}"))
        }
    }

    #[derive(Debug)]
    struct FailingSigner;

    #[async_trait]
    impl AuthTokenSigner for FailingSigner {
        async fn auth_token(&self) -> Result<String> {
            Err(AppError::TokenSigning("no credentials".into()))
        }
    }

    fn signed_descriptor(signer: Arc<dyn AuthTokenSigner>) -> ConnectionDescriptor {
        ConnectionDescriptor {
            host: "db.example.com".into(),
            port: 5432,
            username: "vtb_app".into(),
            database: "vtb".into(),
            application_name: "vtb-auth".into(),
            password: PasswordSource::Signed(signer),
        }
    }

    #[tokio::test]
    async fn test_signer_invoked_per_connection_attempt() {
        let signer = Arc::new(CountingSigner::default());
        let descriptor = signed_descriptor(signer.clone());

        assert_eq!(signer.calls.load(Ordering::SeqCst), 0);

        let options = descriptor.connect_options().await.unwrap();
        assert_eq!(options.get_host(), "db.example.com");
        assert_eq!(options.get_username(), "vtb_app");
        assert_eq!(options.get_database(), Some("vtb"));
        assert!(matches!(options.get_ssl_mode(), PgSslMode::Require));
        assert_eq!(options.get_application_name(), Some("vtb-auth"));

        descriptor.connect_options().await.unwrap();
        descriptor.connect_options().await.unwrap();
        assert_eq!(signer.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_signer_failure_propagates() {
        let descriptor = signed_descriptor(Arc::new(FailingSigner));
        let err = descriptor.connect_options().await.unwrap_err();
        assert!(matches!(err, AppError::TokenSigning(_)));
    }

    #[test]
    fn test_debug_redacts_static_password() {
        let config = DatabaseConfig { mode: Some("local".into()), ..DatabaseConfig::default() };
        let rendered = format!("{:?}", resolve(&config).unwrap());
        assert!(!rendered.contains("12345"));
    }
}
