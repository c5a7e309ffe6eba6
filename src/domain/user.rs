use crate::error::{AppError, Result};
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

/// One authentication principal. All fields are fixed once the user is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
    pub username: String,
    pub hash: String,
    pub salt: String,
}

impl User {
    /// Creates a user with a fresh random id, stamped with the current time.
    ///
    /// # Errors
    /// Returns `AppError::Internal` if the clock is outside the representable range.
    pub fn new(username: String, hash: String, salt: String) -> Result<Self> {
        Ok(Self { id: Uuid::new_v4(), created_at: now_millis()?, username, hash, salt })
    }
}

fn now_millis() -> Result<i64> {
    i64::try_from(OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000).map_err(|_| AppError::Internal)
}
