use crate::domain::user::User;
use uuid::Uuid;

#[derive(sqlx::FromRow)]
pub(crate) struct UserRecord {
    pub(crate) id: Uuid,
    #[sqlx(rename = "createdAt")]
    pub(crate) created_at: i64,
    pub(crate) username: String,
    pub(crate) hash: String,
    pub(crate) salt: String,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            created_at: record.created_at,
            username: record.username,
            hash: record.hash,
            salt: record.salt,
        }
    }
}
