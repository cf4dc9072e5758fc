//! Store layer
//!
//! All lookups are trait-based to enable testing and mocking; the `Pg*`
//! implementations own the sqlx queries. Absence is modeled as
//! `Ok(None)` rather than an error so services decide what missing data
//! means.

pub mod permission;
pub mod pipeline;
pub mod registry;
pub mod run;
pub mod tool;
pub mod tool_group;

use thiserror::Error;

/// Errors surfaced by the store layer
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write
    #[error("conflicting write: {0}")]
    Conflict(String),

    /// Any other database failure
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return StoreError::Conflict(db_err.to_string());
            }
        }
        StoreError::Database(err)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
