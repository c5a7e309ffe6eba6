use crate::adapters::database::executor::StatementExecutor;
use crate::adapters::database::records::UserRecord;
use crate::adapters::database::sql::{SqlParam, Statement, escape_identifier};
use crate::domain::user::User;
use crate::error::{AppError, Result};
use sqlx::FromRow;
use sqlx::postgres::PgRow;
use std::sync::Arc;

pub const USERS_TABLE: &str = "users";

/// Persistence for [`User`] records. Every method is a single autonomous
/// statement on its own connection; nothing is retried.
#[derive(Clone, Debug)]
pub struct UserRepository {
    executor: Arc<dyn StatementExecutor>,
    schema: String,
}

impl UserRepository {
    #[must_use]
    pub fn new(executor: Arc<dyn StatementExecutor>, schema: impl Into<String>) -> Self {
        Self { executor, schema: schema.into() }
    }

    #[must_use]
    pub fn schema(&self) -> &str {
        &self.schema
    }

    fn table(&self) -> String {
        format!("{}.{}", escape_identifier(&self.schema), escape_identifier(USERS_TABLE))
    }

    fn columns() -> String {
        ["id", "createdAt", "username", "hash", "salt"].map(escape_identifier).join(", ")
    }

    /// Drops the schema with everything in it and recreates the empty users table.
    ///
    /// # Errors
    /// Returns the first executor error; later statements are not attempted.
    #[tracing::instrument(level = "debug", skip(self), fields(schema = %self.schema), err)]
    pub async fn init(&self) -> Result<()> {
        let schema = escape_identifier(&self.schema);

        self.executor.execute(&Statement::new(format!("DROP SCHEMA IF EXISTS {schema} CASCADE"))).await?;
        self.executor.execute(&Statement::new(format!("CREATE SCHEMA {schema}"))).await?;
        self.executor
            .execute(&Statement::new(format!(
                "CREATE TABLE {table} ({id} UUID PRIMARY KEY, {created_at} BIGINT NOT NULL, \
                 {username} TEXT NOT NULL, {hash} TEXT NOT NULL, {salt} TEXT NOT NULL)",
                table = self.table(),
                id = escape_identifier("id"),
                created_at = escape_identifier("createdAt"),
                username = escape_identifier("username"),
                hash = escape_identifier("hash"),
                salt = escape_identifier("salt"),
            )))
            .await?;

        tracing::info!("User schema initialized");
        Ok(())
    }

    /// Inserts one user. Usernames are not checked for uniqueness here.
    ///
    /// # Errors
    /// Returns `AppError::Query` on constraint violations such as a duplicate id.
    #[tracing::instrument(level = "debug", skip(self, user), fields(user.id = %user.id), err)]
    pub async fn create_user(&self, user: &User) -> Result<()> {
        let statement = Statement::new(format!(
            "INSERT INTO {} ({}) VALUES ($1, $2, $3, $4, $5)",
            self.table(),
            Self::columns()
        ))
        .bind(SqlParam::Uuid(user.id))
        .bind(SqlParam::BigInt(user.created_at))
        .bind(SqlParam::Text(user.username.clone()))
        .bind(SqlParam::Text(user.hash.clone()))
        .bind(SqlParam::Text(user.salt.clone()));

        self.executor.execute(&statement).await?;
        Ok(())
    }

    /// Looks a user up by exact username. A missing user is `Ok(None)`.
    ///
    /// # Errors
    /// Returns the executor error, or `AppError::Query` if the row cannot be decoded.
    #[tracing::instrument(level = "debug", skip(self, username), err)]
    pub async fn find_user(&self, username: &str) -> Result<Option<User>> {
        let statement = Statement::new(format!(
            "SELECT {} FROM {} WHERE {} = $1 LIMIT 1",
            Self::columns(),
            self.table(),
            escape_identifier("username")
        ))
        .bind(SqlParam::Text(username.to_string()));

        let rows = self.executor.execute(&statement).await?;
        rows.first().map(map_row).transpose()
    }

    /// Fetches every stored user, oldest first, and logs each one.
    ///
    /// Diagnostic only; not used by the authentication flow.
    ///
    /// # Errors
    /// Returns the executor error, or `AppError::Query` if a row cannot be decoded.
    #[tracing::instrument(level = "debug", skip(self), err)]
    pub async fn show(&self) -> Result<Vec<User>> {
        let statement = Statement::new(format!(
            "SELECT {} FROM {} ORDER BY {}",
            Self::columns(),
            self.table(),
            escape_identifier("createdAt")
        ));

        let users = self.executor.execute(&statement).await?.iter().map(map_row).collect::<Result<Vec<_>>>()?;

        tracing::info!(count = users.len(), "Users:");
        for user in &users {
            tracing::info!(user.id = %user.id, username = %user.username, created_at = user.created_at, "user");
        }

        Ok(users)
    }
}

fn map_row(row: &PgRow) -> Result<User> {
    UserRecord::from_row(row).map(User::from).map_err(AppError::Query)
}
