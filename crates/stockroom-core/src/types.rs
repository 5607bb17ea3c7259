//! # Domain Types
//!
//! Core domain types used throughout Stockroom.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Article      │   │    Product      │   │ TransactionRecord│      │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (i64)       │◄──│  bill_of_       │   │  id (i64)       │       │
//! │  │  name           │   │  materials      │   │  created_at     │       │
//! │  │  stock (>= 0)   │   │  price_cents    │   │  lines[]        │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │    BomEntry     │   │   SaleRequest   │                             │
//! │  │  article_id     │   │  product → qty  │                             │
//! │  │  amount_required│   │  (BTreeMap)     │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Identities are integers assigned by the store. Availability is never a
//! field on [`Product`]; see [`crate::stock`].

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SaleError;
use crate::stock::Availability;

/// Article identifier.
pub type ArticleId = i64;

/// Product identifier.
pub type ProductId = i64;

/// Ledger record identifier.
pub type TransactionId = i64;

// =============================================================================
// Article
// =============================================================================

/// A stocked part with its own quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    pub name: String,
    /// Current stock. Never negative.
    pub stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An article as it arrives from an inventory file, before it is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArticle {
    pub id: ArticleId,
    pub name: String,
    pub stock: i64,
}

// =============================================================================
// Bill of Materials
// =============================================================================

/// How many units of one article a single unit of a product consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BomEntry {
    pub article_id: ArticleId,
    /// Always positive; enforced when the product is written.
    pub amount_required: i64,
}

impl BomEntry {
    pub fn new(article_id: ArticleId, amount_required: i64) -> Self {
        BomEntry {
            article_id,
            amount_required,
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A sellable product and its bill of materials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Price in cents. Stored only; no pricing logic runs on it.
    pub price_cents: i64,
    /// Empty means the product is unconstrained.
    pub bill_of_materials: Vec<BomEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Products without articles are always sellable.
    #[inline]
    pub fn is_unconstrained(&self) -> bool {
        self.bill_of_materials.is_empty()
    }
}

/// A product as it arrives from a product file, before it is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub price_cents: i64,
    pub bill_of_materials: Vec<BomEntry>,
}

/// A product together with its freshly computed availability.
///
/// This is the shape handed to display layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub availability: Availability,
}

// =============================================================================
// Sale Request
// =============================================================================

/// Quantities requested per product for a single sale.
///
/// Ordered by product id so ledger lines come out in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SaleRequest {
    quantities: BTreeMap<ProductId, i64>,
}

impl SaleRequest {
    /// Creates an empty request.
    pub fn new() -> Self {
        SaleRequest::default()
    }

    /// Builds a request from `(product_id, quantity)` lines.
    ///
    /// Every line must be positive. Repeated product ids are summed.
    pub fn from_lines<I>(lines: I) -> Result<Self, SaleError>
    where
        I: IntoIterator<Item = (ProductId, i64)>,
    {
        let mut request = SaleRequest::new();
        for (product_id, quantity) in lines {
            if quantity <= 0 {
                return Err(SaleError::InvalidAmount {
                    product_id,
                    requested: quantity,
                });
            }
            let total = request.quantities.entry(product_id).or_insert(0);
            *total = total.checked_add(quantity).ok_or(SaleError::InvalidAmount {
                product_id,
                requested: quantity,
            })?;
        }
        Ok(request)
    }

    /// Sets the quantity for one product, replacing any previous value.
    ///
    /// No validation happens here; the coordinator rejects non-positive
    /// quantities before touching storage.
    pub fn with(mut self, product_id: ProductId, quantity: i64) -> Self {
        self.quantities.insert(product_id, quantity);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }

    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    pub fn quantity(&self, product_id: ProductId) -> Option<i64> {
        self.quantities.get(&product_id).copied()
    }

    /// `(product_id, quantity)` pairs in ascending product id order.
    pub fn iter(&self) -> impl Iterator<Item = (ProductId, i64)> + '_ {
        self.quantities.iter().map(|(id, qty)| (*id, *qty))
    }

    /// Exactly the product ids present in the request.
    pub fn product_ids(&self) -> BTreeSet<ProductId> {
        self.quantities.keys().copied().collect()
    }
}

impl FromIterator<(ProductId, i64)> for SaleRequest {
    fn from_iter<T: IntoIterator<Item = (ProductId, i64)>>(iter: T) -> Self {
        SaleRequest {
            quantities: iter.into_iter().collect(),
        }
    }
}

// =============================================================================
// Ledger
// =============================================================================

/// One product line of a completed sale.
/// Uses snapshot pattern to freeze the product name at time of sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerLine {
    pub product_id: ProductId,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    pub quantity: i64,
}

/// An immutable, completed sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: TransactionId,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<LedgerLine>,
}

impl TransactionRecord {
    /// Total units sold across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|line| line.quantity).sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sale_request_sums_duplicate_lines() {
        let request = SaleRequest::from_lines([(1, 2), (2, 1), (1, 3)]).unwrap();
        assert_eq!(request.quantity(1), Some(5));
        assert_eq!(request.quantity(2), Some(1));
        assert_eq!(request.len(), 2);
    }

    #[test]
    fn test_sale_request_rejects_non_positive_lines() {
        let err = SaleRequest::from_lines([(1, 2), (3, 0)]).unwrap_err();
        assert!(matches!(
            err,
            SaleError::InvalidAmount {
                product_id: 3,
                requested: 0
            }
        ));
    }

    #[test]
    fn test_sale_request_orders_by_product_id() {
        let request = SaleRequest::new().with(9, 1).with(3, 4).with(5, 2);
        let ids: Vec<ProductId> = request.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![3, 5, 9]);
        assert_eq!(request.product_ids().len(), 3);
    }

    #[test]
    fn test_product_unconstrained() {
        let now = Utc::now();
        let mut product = Product {
            id: 1,
            name: "Gift card".to_string(),
            price_cents: 2500,
            bill_of_materials: vec![],
            created_at: now,
            updated_at: now,
        };
        assert!(product.is_unconstrained());

        product.bill_of_materials.push(BomEntry::new(4, 1));
        assert!(!product.is_unconstrained());
    }

    #[test]
    fn test_transaction_total_quantity() {
        let record = TransactionRecord {
            id: 1,
            created_at: Utc::now(),
            lines: vec![
                LedgerLine {
                    product_id: 1,
                    product_name: "Chair".to_string(),
                    quantity: 2,
                },
                LedgerLine {
                    product_id: 2,
                    product_name: "Table".to_string(),
                    quantity: 1,
                },
            ],
        };
        assert_eq!(record.total_quantity(), 3);
    }
}
