pub mod credentials;
pub mod executor;
pub(crate) mod records;
pub mod signer;
pub mod sql;
pub mod user_repo;

pub use executor::{DirectExecutor, StatementExecutor};
pub use sql::{SqlParam, Statement, escape_identifier, escape_string_literal};
pub use user_repo::UserRepository;
