//! # Sale Repository
//!
//! The SQLite side of a sale: one database transaction per sale, opened by
//! [`SaleStore::begin`] and driven by the `SaleCoordinator`.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. BEGIN                                                              │
//! │     └── SaleRepository::begin() → SqliteSaleUnit { tx }                │
//! │                                                                         │
//! │  2. SNAPSHOT (same tx)                                                 │
//! │     └── products + product_articles + articles.stock                   │
//! │                                                                         │
//! │  3a. REJECT                                                            │
//! │     └── unit dropped → ROLLBACK, nothing written                       │
//! │                                                                         │
//! │  3b. COMMIT                                                            │
//! │     └── UPDATE articles SET stock = new                                │
//! │             WHERE id = ? AND stock = <value read in step 2>            │
//! │     └── zero rows? → Conflict, ROLLBACK                                │
//! │     └── INSERT transactions + transaction_lines                        │
//! │     └── COMMIT                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeSet;

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use stockroom_core::{
    LedgerLine, ProductId, SaleSnapshot, SaleStore, SaleUnit, StockUpdate, StoreError,
    TransactionRecord,
};

use super::article::fetch_stocks;
use super::product::fetch_definitions;
use super::transaction;
use crate::error::{DbError, DbResult};

/// Opens sale units of work on the pool.
///
/// ## Usage
/// ```rust,ignore
/// let coordinator = SaleCoordinator::new(db.sales());
/// let record = coordinator.execute_sale(&request).await?;
/// ```
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }
}

impl SaleStore for SaleRepository {
    type Unit = SqliteSaleUnit;

    async fn begin(&self) -> Result<SqliteSaleUnit, StoreError> {
        let tx = self.pool.begin().await.map_err(DbError::from)?;
        Ok(SqliteSaleUnit { tx })
    }
}

/// One open sale transaction. Dropping it rolls back.
pub struct SqliteSaleUnit {
    tx: Transaction<'static, Sqlite>,
}

impl SqliteSaleUnit {
    async fn snapshot(&mut self, product_ids: &BTreeSet<ProductId>) -> DbResult<SaleSnapshot> {
        let products = fetch_definitions(&mut self.tx, product_ids).await?;

        let article_ids: BTreeSet<i64> = products
            .values()
            .flat_map(|product| product.bill_of_materials.iter())
            .map(|entry| entry.article_id)
            .collect();
        let stocks = fetch_stocks(&mut self.tx, &article_ids).await?;

        debug!(
            requested = product_ids.len(),
            found = products.len(),
            articles = stocks.len(),
            "Sale snapshot loaded"
        );

        Ok(SaleSnapshot { products, stocks })
    }

    async fn commit(
        mut self,
        updates: Vec<StockUpdate>,
        lines: Vec<LedgerLine>,
    ) -> DbResult<TransactionRecord> {
        let now = Utc::now();

        for update in &updates {
            let result = sqlx::query(
                r#"
                UPDATE articles
                SET stock = ?3, updated_at = ?4
                WHERE id = ?1 AND stock = ?2
                "#,
            )
            .bind(update.article_id)
            .bind(update.previous)
            .bind(update.new_stock)
            .bind(now)
            .execute(&mut *self.tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(DbError::Conflict(format!(
                    "article {} no longer has stock {}",
                    update.article_id, update.previous
                )));
            }

            debug!(
                article_id = update.article_id,
                consumed = update.consumed(),
                new_stock = update.new_stock,
                "Stock decremented"
            );
        }

        let record = transaction::append(&mut self.tx, lines).await?;

        self.tx.commit().await?;

        Ok(record)
    }
}

impl SaleUnit for SqliteSaleUnit {
    async fn load_snapshot(
        &mut self,
        product_ids: &BTreeSet<ProductId>,
    ) -> Result<SaleSnapshot, StoreError> {
        Ok(self.snapshot(product_ids).await?)
    }

    async fn commit_sale(
        self,
        updates: Vec<StockUpdate>,
        lines: Vec<LedgerLine>,
    ) -> Result<TransactionRecord, StoreError> {
        Ok(self.commit(updates, lines).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
