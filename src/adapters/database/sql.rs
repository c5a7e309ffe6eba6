use sqlx::PgConnection;
use sqlx::postgres::PgRow;
use uuid::Uuid;

/// Quotes an identifier (schema, table or column name) for interpolation into SQL text.
///
/// The name is wrapped in double quotes and every embedded double quote is doubled,
/// so the server resolves the result to exactly `name`.
#[must_use]
pub fn escape_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quotes a value as a standard-conforming string literal.
///
/// Every embedded single quote is doubled. Backslashes are left alone, which is
/// correct while `standard_conforming_strings` is on (the default since PostgreSQL 9.1).
#[must_use]
pub fn escape_string_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// A value bound to a `$n` placeholder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SqlParam {
    Text(String),
    BigInt(i64),
    Uuid(Uuid),
}

/// A single SQL statement plus the values bound to its placeholders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Statement {
    sql: String,
    params: Vec<SqlParam>,
}

impl Statement {
    #[must_use]
    pub fn new(sql: impl Into<String>) -> Self {
        Self { sql: sql.into(), params: Vec::new() }
    }

    #[must_use]
    pub fn bind(mut self, param: SqlParam) -> Self {
        self.params.push(param);
        self
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    #[must_use]
    pub fn params(&self) -> &[SqlParam] {
        &self.params
    }

    /// Runs the statement on `conn` and collects every returned row.
    pub(crate) async fn fetch_all(&self, conn: &mut PgConnection) -> Result<Vec<PgRow>, sqlx::Error> {
        let mut query = sqlx::query(&self.sql);
        for param in &self.params {
            query = match param {
                SqlParam::Text(value) => query.bind(value.as_str()),
                SqlParam::BigInt(value) => query.bind(*value),
                SqlParam::Uuid(value) => query.bind(*value),
            };
        }
        query.fetch_all(conn).await
    }
}
