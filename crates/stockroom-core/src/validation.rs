//! # Validation Module
//!
//! Catalog-write validation for Stockroom.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Import boundary (import.rs)                                  │
//! │  └── String-encoded numbers parsed into typed values                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Names, prices, stock levels                                       │
//! │  └── Bill of materials (amount_required > 0, no duplicates)            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (stock >= 0), CHECK (amount_required > 0)                   │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sale quantities are not validated here; the sale path has its own
//! [`SaleError::InvalidAmount`](crate::SaleError::InvalidAmount).

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::types::{BomEntry, NewArticle, NewProduct};
use crate::MAX_NAME_LENGTH;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name for an article or product.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - Must be at most `MAX_NAME_LENGTH` characters
///
/// ## Example
/// ```rust
/// use stockroom_core::validation::validate_name;
///
/// assert!(validate_name("name", "Dining Chair").is_ok());
/// assert!(validate_name("name", "   ").is_err());
/// ```
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an article stock level. Zero is allowed.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a price in cents. Zero is allowed (free items).
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates an article or product id supplied from outside.
pub fn validate_id(field: &str, id: i64) -> ValidationResult<()> {
    if id <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Catalog Validators
// =============================================================================

/// Validates a bill of materials.
///
/// ## Rules
/// - Every `amount_required` is positive
/// - No article appears twice
/// - An empty bill is allowed (unconstrained product)
pub fn validate_bill_of_materials(entries: &[BomEntry]) -> ValidationResult<()> {
    let mut seen = HashSet::with_capacity(entries.len());

    for entry in entries {
        validate_id("article_id", entry.article_id)?;

        if entry.amount_required <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "amount_required".to_string(),
            });
        }

        if !seen.insert(entry.article_id) {
            return Err(ValidationError::Duplicate {
                field: "article_id".to_string(),
                value: entry.article_id.to_string(),
            });
        }
    }

    Ok(())
}

/// Validates an article before it is written.
pub fn validate_new_article(article: &NewArticle) -> ValidationResult<()> {
    validate_id("article_id", article.id)?;
    validate_name("name", &article.name)?;
    validate_stock(article.stock)
}

/// Validates a product before it is written.
pub fn validate_new_product(product: &NewProduct) -> ValidationResult<()> {
    validate_name("name", &product.name)?;
    validate_price_cents(product.price_cents)?;
    validate_bill_of_materials(&product.bill_of_materials)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "leg").is_ok());
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", "   ").is_err());
        assert!(validate_name("name", &"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_stock() {
        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(12).is_ok());
        assert!(validate_stock(-1).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(1099).is_ok());
        assert!(validate_price_cents(-100).is_err());
    }

    #[test]
    fn test_validate_bill_of_materials() {
        assert!(validate_bill_of_materials(&[]).is_ok());
        assert!(validate_bill_of_materials(&[BomEntry::new(1, 4), BomEntry::new(2, 1)]).is_ok());

        let err = validate_bill_of_materials(&[BomEntry::new(1, 0)]).unwrap_err();
        assert!(matches!(err, ValidationError::MustBePositive { .. }));

        let err =
            validate_bill_of_materials(&[BomEntry::new(1, 1), BomEntry::new(1, 2)]).unwrap_err();
        assert!(matches!(err, ValidationError::Duplicate { .. }));

        assert!(validate_bill_of_materials(&[BomEntry::new(0, 1)]).is_err());
    }

    #[test]
    fn test_validate_new_product() {
        let product = NewProduct {
            name: "Dining Chair".to_string(),
            price_cents: 4999,
            bill_of_materials: vec![BomEntry::new(1, 4)],
        };
        assert!(validate_new_product(&product).is_ok());

        let product = NewProduct {
            price_cents: -1,
            ..product
        };
        assert!(validate_new_product(&product).is_err());
    }

    #[test]
    fn test_validate_new_article() {
        let article = NewArticle {
            id: 1,
            name: "leg".to_string(),
            stock: 12,
        };
        assert!(validate_new_article(&article).is_ok());

        assert!(validate_new_article(&NewArticle { stock: -3, ..article.clone() }).is_err());
        assert!(validate_new_article(&NewArticle { id: 0, ..article }).is_err());
    }
}
