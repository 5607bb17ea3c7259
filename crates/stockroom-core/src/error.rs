//! # Error Types
//!
//! Domain-specific error types for stockroom-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockroom-core errors (this file)                                     │
//! │  ├── CoreError        - Catalog rule violations                        │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  ├── SaleError        - Outcome of a rejected or aborted sale          │
//! │  └── StoreError       - Core-side view of a storage failure            │
//! │                                                                         │
//! │  stockroom-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: DbError → StoreError → SaleError → caller                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, article id, amounts)
//! 3. Errors are enum variants, never String
//! 4. A sale is binary: there is no partial-success variant

use thiserror::Error;

use crate::types::{ArticleId, ProductId};

// =============================================================================
// Core Error
// =============================================================================

/// Catalog-level business rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// Article cannot be found.
    #[error("Article not found: {0}")]
    ArticleNotFound(ArticleId),

    /// A stock adjustment would take an article below zero.
    #[error("Stock for article {article_id} cannot go below zero: current {current}, delta {delta}")]
    NegativeStock {
        article_id: ArticleId,
        current: i64,
        delta: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when input doesn't meet requirements.
/// Used for early validation at catalog-write time and at the import boundary.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., a string-encoded number that doesn't parse).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., the same article twice in one bill of materials).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Sale Error
// =============================================================================

/// Why a sale did not commit.
///
/// ## Sale State Machine
/// ```text
/// Requested ──► Validated ──► AvailabilityChecked ──► Committed
///     │                               │
///     ▼                               ▼
/// Rejected(EmptyRequest |        Aborted(Persistence |
///          InvalidAmount |               Inconsistent)
///          InsufficientStock)
/// ```
///
/// Every variant guarantees that no article stock changed and no ledger
/// record was appended.
#[derive(Debug, Error)]
pub enum SaleError {
    /// The request names no products at all.
    #[error("Sale request contains no products")]
    EmptyRequest,

    /// A requested quantity is zero or negative. Raised before any I/O.
    #[error("Invalid amount {requested} requested for product {product_id}")]
    InvalidAmount { product_id: ProductId, requested: i64 },

    /// The current article stock cannot cover the requested quantity.
    ///
    /// Unknown product ids land here with `available: 0`.
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: ProductId,
        available: i64,
        requested: i64,
    },

    /// The load or the atomic commit failed at the storage boundary.
    #[error("Persistence failure: {0}")]
    Persistence(#[from] StoreError),

    /// Computed stock went negative after availability passed.
    ///
    /// Means the snapshot and the plan disagree; the sale is aborted and
    /// the stock is never clamped.
    #[error("Stock for article {article_id} would become {new_stock} (current {current}, consumed {consumed})")]
    Inconsistent {
        article_id: ArticleId,
        current: i64,
        consumed: i64,
        new_stock: i64,
    },
}

impl SaleError {
    /// Whether the caller can fix the request and resubmit.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            SaleError::EmptyRequest
                | SaleError::InvalidAmount { .. }
                | SaleError::InsufficientStock { .. }
        )
    }
}

// =============================================================================
// Store Error
// =============================================================================

/// Storage failures as seen by the core.
///
/// Persistence crates convert their own error types into this one so the
/// coordinator never depends on a database driver.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A concurrent writer changed stock this unit of work had read.
    /// Retrying the whole sale from scratch is safe.
    #[error("Concurrent update conflict: {0}")]
    Conflict(String),

    /// The store could not be reached (closed pool, exhausted connections).
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Any other failure to read or write.
    #[error("Store operation failed: {0}")]
    Failed(String),
}

impl StoreError {
    /// Whether this failure came from a lost compare-and-set race.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict(_))
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Convenience type alias for sale outcomes.
pub type SaleResult<T> = Result<T, SaleError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SaleError::InsufficientStock {
            product_id: 7,
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for product 7: available 3, requested 5"
        );

        let err = SaleError::InvalidAmount {
            product_id: 2,
            requested: -1,
        };
        assert_eq!(err.to_string(), "Invalid amount -1 requested for product 2");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::MustBePositive {
            field: "amount_required".to_string(),
        };
        assert_eq!(err.to_string(), "amount_required must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }

    #[test]
    fn test_store_error_converts_to_sale_error() {
        let sale_err: SaleError = StoreError::Conflict("article 1".to_string()).into();
        assert!(matches!(sale_err, SaleError::Persistence(ref e) if e.is_conflict()));
        assert!(!sale_err.is_rejection());
    }

    #[test]
    fn test_rejections() {
        assert!(SaleError::EmptyRequest.is_rejection());
        assert!(SaleError::InsufficientStock {
            product_id: 1,
            available: 0,
            requested: 1
        }
        .is_rejection());
        assert!(!SaleError::Inconsistent {
            article_id: 1,
            current: 1,
            consumed: 2,
            new_stock: -1
        }
        .is_rejection());
    }
}
