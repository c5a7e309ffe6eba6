use crate::adapters::database::UserRepository;
use crate::domain::auth::PasswordDigest;
use crate::domain::user::User;
use crate::error::{AppError, Result};

/// Registration and login on top of [`UserRepository`].
#[derive(Clone, Debug)]
pub struct AccountService {
    user_repo: UserRepository,
}

impl AccountService {
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }

    /// Creates a new account.
    ///
    /// The username check is best effort: the schema does not enforce uniqueness,
    /// so two concurrent registrations for the same name can both succeed.
    ///
    /// # Errors
    /// `BadRequest` for blank fields, `Conflict` if the username is taken, or any
    /// repository error.
    #[tracing::instrument(
        skip(self, username, password),
        fields(user_id = tracing::field::Empty),
        err(level = "warn")
    )]
    pub async fn register(&self, username: String, password: String) -> Result<User> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(AppError::BadRequest("Username and password are required".into()));
        }

        if self.user_repo.find_user(&username).await?.is_some() {
            return Err(AppError::Conflict("Username already exists".into()));
        }

        let digest = derive_digest(password).await?;
        let user = User::new(username, digest.hash, digest.salt)?;

        self.user_repo.create_user(&user).await?;

        tracing::Span::current().record("user_id", tracing::field::display(user.id));
        tracing::info!("User registered successfully");

        Ok(user)
    }

    /// Verifies credentials and returns the matching user.
    ///
    /// # Errors
    /// `AuthError` if the user is unknown or the password does not match.
    #[tracing::instrument(
        skip(self, username, password),
        fields(user_id = tracing::field::Empty),
        err(level = "warn")
    )]
    pub async fn login(&self, username: String, password: String) -> Result<User> {
        let Some(user) = self.user_repo.find_user(&username).await? else {
            tracing::warn!("Login failed: user not found");
            return Err(AppError::AuthError);
        };

        tracing::Span::current().record("user_id", tracing::field::display(user.id));

        if !verify_digest(password, user.hash.clone(), user.salt.clone()).await? {
            tracing::warn!("Login failed: invalid password");
            return Err(AppError::AuthError);
        }

        Ok(user)
    }
}

async fn derive_digest(password: String) -> Result<PasswordDigest> {
    tokio::task::spawn_blocking(move || PasswordDigest::derive(&password)).await.map_err(|_| AppError::Internal)?
}

async fn verify_digest(password: String, hash: String, salt: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || PasswordDigest::verify(&password, &hash, &salt))
        .await
        .map_err(|_| AppError::Internal)?
}
