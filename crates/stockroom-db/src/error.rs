//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ├── catalog calls: returned as-is                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (stockroom-core) ← What the SaleCoordinator sees           │
//! │       Conflict / Unavailable / Failed                                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use stockroom_core::{CoreError, StoreError, ValidationError};
use thiserror::Error;

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - A bill of materials references an article that does not exist
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// CHECK constraint violation (negative stock, zero amount_required).
    #[error("Constraint violation: {message}")]
    CheckViolation { message: String },

    /// The row changed underneath the caller, or SQLite refused the write
    /// because another writer got there first.
    ///
    /// ## When This Occurs
    /// - Compare-and-set stock update matched zero rows
    /// - `SQLITE_BUSY` / `SQLITE_LOCKED` while upgrading to a write
    #[error("Write conflict: {0}")]
    Conflict(String),

    /// Input rejected by domain rules before any SQL ran.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Returns true if retrying the whole operation could succeed.
    pub fn is_conflict(&self) -> bool {
        matches!(self, DbError::Conflict(_))
    }
}

impl From<ValidationError> for DbError {
    fn from(err: ValidationError) -> Self {
        DbError::Core(CoreError::Validation(err))
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze code/message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();
                let code = db_err.code().unwrap_or_default();

                // SQLite messages:
                // UNIQUE constraint: "UNIQUE constraint failed: <table>.<column>"
                // FK constraint: "FOREIGN KEY constraint failed"
                // CHECK constraint: "CHECK constraint failed: <expr>"
                // Busy/locked: "database is locked", "database table is locked"
                if is_busy_code(&code) || msg.contains("database is locked") {
                    DbError::Conflict(msg.to_string())
                } else if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else if msg.contains("CHECK constraint failed") {
                    DbError::CheckViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

/// SQLITE_BUSY (5), SQLITE_LOCKED (6) and their extended codes.
fn is_busy_code(code: &str) -> bool {
    matches!(code, "5" | "6" | "261" | "262" | "517" | "773")
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// The core only distinguishes "try again", "store is down" and "broken".
impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Conflict(msg) => StoreError::Conflict(msg),
            DbError::ConnectionFailed(_) | DbError::PoolExhausted => {
                StoreError::Unavailable(err.to_string())
            }
            other => StoreError::Failed(other.to_string()),
        }
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_mapping() {
        let err: StoreError = DbError::Conflict("article 1".to_string()).into();
        assert!(err.is_conflict());

        let err: StoreError = DbError::PoolExhausted.into();
        assert!(matches!(err, StoreError::Unavailable(_)));

        let err: StoreError = DbError::not_found("Article", 7).into();
        assert!(matches!(err, StoreError::Failed(ref msg) if msg.contains("Article not found: 7")));
    }

    #[test]
    fn test_busy_codes() {
        assert!(is_busy_code("5"));
        assert!(is_busy_code("517"));
        assert!(!is_busy_code("19"));
        assert!(!is_busy_code(""));
    }
}
