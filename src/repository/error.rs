// ==========================================
// Fieldwork costing - repository error type
// ==========================================
// Persistence failures of the element-costs store and config_kv.
// Callers log these; the in-memory project is never mutated on error.
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== Database =====
    #[error("record not found: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("database connection failed: {0}")]
    DatabaseConnectionError(String),

    #[error("database lock poisoned: {0}")]
    LockError(String),

    #[error("database transaction failed: {0}")]
    DatabaseTransactionError(String),

    #[error("database query failed: {0}")]
    DatabaseQueryError(String),

    #[error("unique constraint violated: {0}")]
    UniqueConstraintViolation(String),

    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    // ===== Stored data =====
    #[error("invalid value (field={field}): {message}")]
    FieldValueError { field: String, message: String },

    #[error("stored JSON is malformed (key={key}): {message}")]
    MalformedJson { key: String, message: String },

    // ===== General =====
    #[error("internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("UNIQUE") {
                    RepositoryError::UniqueConstraintViolation(msg)
                } else if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "Unknown".to_string(),
                id: "Unknown".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_rows_maps_to_not_found() {
        let err: RepositoryError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }
}
