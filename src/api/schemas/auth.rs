use crate::domain::user::User;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Form body shared by the login and registration pages.
///
/// Missing fields deserialize as empty so the handlers can answer with 400 instead
/// of the extractor's 422.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub created_at: i64,
}

impl From<User> for Account {
    fn from(user: User) -> Self {
        Self { id: user.id, username: user.username, created_at: user.created_at }
    }
}
