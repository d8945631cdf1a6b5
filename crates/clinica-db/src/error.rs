//! Database-specific error types and conversions.

use clinica_core::error::ClinicaError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    /// A UNIQUE index or record id collided.
    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    /// A transaction was rolled back by a state guard or by a concurrent
    /// writer touching the same rows.
    #[error("Transaction aborted: {0}")]
    Aborted(String),

    #[error("Invalid row: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

/// Prefix of every `THROW` raised by a transaction guard.
pub(crate) const GUARD_PREFIX: &str = "guard:";

impl DbError {
    /// Classify a failed statement from its message. SurrealDB reports
    /// constraint and transaction failures as text only.
    pub(crate) fn from_statement(err: surrealdb::Error) -> Self {
        let msg = err.to_string();
        if msg.contains("already exists") || msg.contains("already contains") {
            DbError::Conflict(msg)
        } else if msg.contains(GUARD_PREFIX)
            || msg.contains("failed transaction")
            || msg.contains("conflict")
        {
            DbError::Aborted(msg)
        } else {
            DbError::Query(msg)
        }
    }
}

impl From<DbError> for ClinicaError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ClinicaError::NotFound { entity, id },
            DbError::Conflict(msg) => ClinicaError::Conflict {
                entity: "registro".into(),
                reason: msg,
            },
            other => ClinicaError::Database(other.to_string()),
        }
    }
}
