//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  CoreError (planner, validation) ──► DbError::Domain                   │
//! │       raised before any write: store untouched                         │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       ├── ConnectionFailed / PoolExhausted / Busy (store unavailable)│
//! │       ├── UniqueViolation / ForeignKeyViolation (constraint)           │
//! │       └── PartialWrite (failed after the quantity write)               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CLI (anyhow) ← prints message, suggests `inventory reconcile`         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use stockroom_core::{CoreError, ValidationError};
use thiserror::Error;

/// Database operation errors.
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
    /// - Deleting a category that still has products
    /// - Deleting a product that has recorded transactions
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be opened or created
    /// - Pool was closed
    /// - A transaction couldn't be started
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A stock mutation failed after its quantity write was issued.
    ///
    /// The SQLite transaction is rolled back when this is returned for the
    /// `append_transaction` stage. A failed `commit` leaves the outcome to
    /// the store, so callers should run a reconciliation read before
    /// assuming either state.
    #[error("Partial write for product {product_id} at {stage}: {message}")]
    PartialWrite {
        product_id: i64,
        stage: &'static str,
        message: String,
    },

    /// The inventory row changed between read and compare-and-swap update.
    #[error("Inventory for product {product_id} was modified concurrently")]
    ConcurrentModification { product_id: i64 },

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Another connection held the lock past the busy timeout
    /// (`SQLITE_BUSY` / `SQLITE_LOCKED`). Nothing was written; retrying
    /// later is safe.
    #[error("Database is busy: {0}")]
    Busy(String),

    /// A business rule rejected the request before anything was written.
    #[error(transparent)]
    Domain(#[from] CoreError),

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

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    pub(crate) fn partial_write(product_id: i64, stage: &'static str, err: impl ToString) -> Self {
        DbError::PartialWrite {
            product_id,
            stage,
            message: err.to_string(),
        }
    }

    /// The store could not be reached at all.
    pub fn is_store_unavailable(&self) -> bool {
        matches!(
            self,
            DbError::ConnectionFailed(_) | DbError::PoolExhausted | DbError::Busy(_)
        )
    }

    /// The caller should reconcile before trusting the stored quantity.
    pub fn is_partial_write(&self) -> bool {
        matches!(self, DbError::PartialWrite { .. })
    }

    /// Referential or uniqueness constraint rejected the write.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            DbError::ForeignKeyViolation { .. } | DbError::UniqueViolation { .. }
        )
    }

    /// Rejected by validation or a business rule; nothing was written.
    pub fn is_validation(&self) -> bool {
        matches!(self, DbError::Domain(_))
    }

    /// The underlying business error, if any.
    pub fn as_core(&self) -> Option<&CoreError> {
        match self {
            DbError::Domain(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for DbError {
    fn from(err: ValidationError) -> Self {
        DbError::Domain(CoreError::Validation(err))
    }
}

/// SQLite primary result codes for a lock held by someone else.
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// True when a SQLite result code (primary or extended, e.g. `517`
/// for `SQLITE_BUSY_SNAPSHOT`) reports a lock conflict.
fn is_lock_conflict(code: Option<&str>) -> bool {
    code.and_then(|c| c.parse::<i32>().ok())
        .map(|c| matches!(c & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
        .unwrap_or(false)
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → BUSY/LOCKED code → DbError::Busy,
///                               otherwise analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// sqlx::Error::Io / PoolClosed → DbError::ConnectionFailed
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

                if is_lock_conflict(db_err.code().as_deref()) {
                    return DbError::Busy(msg.to_string());
                }

                // UNIQUE constraint: "UNIQUE constraint failed: <table>.<column>"
                // FK constraint: "FOREIGN KEY constraint failed"
                if let Some(field) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::UniqueViolation {
                        field: field.to_string(),
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            sqlx::Error::Io(io) => DbError::ConnectionFailed(io.to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(DbError::PoolExhausted.is_store_unavailable());
        assert!(DbError::ConnectionFailed("gone".into()).is_store_unavailable());
        assert!(!DbError::PoolExhausted.is_partial_write());

        let partial = DbError::partial_write(3, "commit", "disk I/O error");
        assert!(partial.is_partial_write());
        assert_eq!(
            partial.to_string(),
            "Partial write for product 3 at commit: disk I/O error"
        );

        let domain: DbError = CoreError::ProductNotFound(7).into();
        assert!(domain.is_validation());
        assert_eq!(domain.as_core(), Some(&CoreError::ProductNotFound(7)));
        assert_eq!(domain.to_string(), "Product not found: 7");
    }

    #[test]
    fn test_validation_error_becomes_domain() {
        let err: DbError = ValidationError::Required {
            field: "product name".to_string(),
        }
        .into();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
    }

    #[test]
    fn test_lock_conflict_codes() {
        assert!(is_lock_conflict(Some("5")));
        assert!(is_lock_conflict(Some("6")));
        // SQLITE_BUSY_SNAPSHOT, SQLITE_LOCKED_SHAREDCACHE
        assert!(is_lock_conflict(Some("517")));
        assert!(is_lock_conflict(Some("262")));

        assert!(!is_lock_conflict(Some("19"))); // constraint
        assert!(!is_lock_conflict(Some("2067"))); // unique constraint
        assert!(!is_lock_conflict(Some("not a code")));
        assert!(!is_lock_conflict(None));

        assert!(DbError::Busy("database is locked".into()).is_store_unavailable());
    }

    #[test]
    fn test_pool_closed_is_unavailable() {
        let err: DbError = sqlx::Error::PoolClosed.into();
        assert!(err.is_store_unavailable());
    }
}
