use crate::error::{AppError, Result};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, defaults};
use aws_credential_types::Credentials;
use aws_sdk_rds::auth_token::{AuthTokenGenerator, Config as AuthTokenConfig};
use std::fmt;

/// Produces the password for a connection attempt.
///
/// Implementations must return a fresh token on every call. Tokens are short-lived
/// and are never cached by callers.
#[async_trait]
pub trait AuthTokenSigner: Send + Sync + fmt::Debug {
    async fn auth_token(&self) -> Result<String>;
}

/// Signs RDS IAM authentication tokens with static AWS credentials.
///
/// Signing is a local SigV4 computation; no request is sent to AWS.
#[derive(Clone)]
pub struct RdsIamSigner {
    credentials: Credentials,
    region: String,
    hostname: String,
    port: u16,
    username: String,
}

impl RdsIamSigner {
    #[must_use]
    pub fn new(
        access_key_id: &str,
        secret_access_key: &str,
        region: &str,
        hostname: &str,
        port: u16,
        username: &str,
    ) -> Self {
        Self {
            credentials: Credentials::new(access_key_id, secret_access_key, None, None, "vtb-auth"),
            region: region.to_string(),
            hostname: hostname.to_string(),
            port,
            username: username.to_string(),
        }
    }
}

impl fmt::Debug for RdsIamSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RdsIamSigner")
            .field("region", &self.region)
            .field("hostname", &self.hostname)
            .field("port", &self.port)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AuthTokenSigner for RdsIamSigner {
    #[tracing::instrument(level = "debug", skip(self), fields(db.host = %self.hostname, db.user = %self.username), err)]
    async fn auth_token(&self) -> Result<String> {
        let shared = defaults(BehaviorVersion::latest())
            .region(Region::new(self.region.clone()))
            .credentials_provider(self.credentials.clone())
            .load()
            .await;

        let config = AuthTokenConfig::builder()
            .hostname(self.hostname.clone())
            .port(u64::from(self.port))
            .username(self.username.clone())
            .build()
            .map_err(|e| AppError::TokenSigning(e.to_string()))?;

        let token = AuthTokenGenerator::new(config)
            .auth_token(&shared)
            .await
            .map_err(|e| AppError::TokenSigning(e.to_string()))?;

        Ok(token.as_str().to_string())
    }
}
