//! # Collaborator Contracts
//!
//! The traits a persistence crate implements so the [`SaleCoordinator`]
//! can run a sale without knowing about SQL.
//!
//! ## Unit of Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    One Sale = One Unit of Work                          │
//! │                                                                         │
//! │  store.begin()                                                         │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  unit.load_snapshot(product_ids)   ◄── read inside the unit            │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  (availability check + plan, pure)                                     │
//! │     │                                                                   │
//! │     ├── rejected → unit dropped → rollback, nothing visible            │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  unit.commit_sale(updates, lines)  ◄── compare-and-set writes +        │
//! │                                        ledger append, then COMMIT      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Dropping a unit without calling [`SaleUnit::commit_sale`] must discard
//! everything it did. Each [`StockUpdate`] carries the stock value the unit
//! read, and the store must refuse the write (with
//! [`StoreError::Conflict`]) if the stored value no longer matches.
//!
//! [`SaleCoordinator`]: crate::coordinator::SaleCoordinator

use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;

use crate::error::StoreError;
use crate::stock::{available_quantity, ArticleStocks, Availability};
use crate::types::{ArticleId, BomEntry, LedgerLine, ProductId, TransactionRecord};

/// What a sale needs to know about one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDefinition {
    pub id: ProductId,
    pub name: String,
    pub bill_of_materials: Vec<BomEntry>,
}

/// Products and article stocks read together inside one unit of work.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaleSnapshot {
    /// Only the requested products that exist.
    pub products: BTreeMap<ProductId, ProductDefinition>,
    /// Stock of every article referenced by those products.
    pub stocks: ArticleStocks,
}

impl SaleSnapshot {
    pub fn product(&self, id: ProductId) -> Option<&ProductDefinition> {
        self.products.get(&id)
    }

    /// Availability of a product in this snapshot.
    ///
    /// Unknown products have zero availability.
    pub fn availability(&self, id: ProductId) -> Availability {
        match self.products.get(&id) {
            Some(product) => available_quantity(&product.bill_of_materials, &self.stocks),
            None => Availability::Limited(0),
        }
    }

    pub fn stock(&self, article_id: ArticleId) -> i64 {
        self.stocks.get(&article_id).copied().unwrap_or(0)
    }
}

/// A guarded stock write: set `new_stock` only if the stock is still `previous`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockUpdate {
    pub article_id: ArticleId,
    pub previous: i64,
    pub new_stock: i64,
}

impl StockUpdate {
    /// Units taken from the article by this update.
    #[inline]
    pub fn consumed(&self) -> i64 {
        self.previous - self.new_stock
    }
}

/// Opens units of work. Implemented by the persistence layer.
pub trait SaleStore {
    type Unit: SaleUnit;

    /// Starts a new unit of work.
    fn begin(&self) -> impl Future<Output = Result<Self::Unit, StoreError>> + Send;
}

/// A single open transaction against the store.
pub trait SaleUnit: Send {
    /// Reads definitions and stocks for exactly `product_ids`.
    ///
    /// Ids with no stored product are simply absent from the result.
    fn load_snapshot(
        &mut self,
        product_ids: &BTreeSet<ProductId>,
    ) -> impl Future<Output = Result<SaleSnapshot, StoreError>> + Send;

    /// Applies the guarded stock writes, appends one ledger record with
    /// `lines`, and commits. Either all of it becomes visible or none of it.
    fn commit_sale(
        self,
        updates: Vec<StockUpdate>,
        lines: Vec<LedgerLine>,
    ) -> impl Future<Output = Result<TransactionRecord, StoreError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> SaleSnapshot {
        SaleSnapshot {
            products: BTreeMap::from([(
                1,
                ProductDefinition {
                    id: 1,
                    name: "Chair".to_string(),
                    bill_of_materials: vec![BomEntry::new(10, 2)],
                },
            )]),
            stocks: ArticleStocks::from([(10, 8)]),
        }
    }

    #[test]
    fn test_snapshot_availability() {
        let snapshot = snapshot();
        assert_eq!(snapshot.availability(1), Availability::Limited(4));
        assert_eq!(snapshot.availability(2), Availability::Limited(0));
        assert_eq!(snapshot.stock(10), 8);
        assert_eq!(snapshot.stock(11), 0);
    }

    #[test]
    fn test_stock_update_consumed() {
        let update = StockUpdate {
            article_id: 10,
            previous: 8,
            new_stock: 3,
        };
        assert_eq!(update.consumed(), 5);
    }
}
