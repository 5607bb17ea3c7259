//! # Repository Module
//!
//! Database repository implementations for Stockroom.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repositories and Their Tables                        │
//! │                                                                         │
//! │  db.articles()      ──► articles                                       │
//! │  db.products()      ──► products + product_articles                    │
//! │  db.sales()         ──► SaleStore: one BEGIN..COMMIT per sale          │
//! │                         articles (CAS) + transactions + lines          │
//! │  db.transactions()  ──► transactions + transaction_lines (read only)   │
//! │                                                                         │
//! │  Every repository holds a pool clone; multi-statement writes open      │
//! │  their own transaction.                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`article::ArticleRepository`] - Article upsert, restock, listing
//! - [`product::ProductRepository`] - Products with bills of materials
//! - [`sale::SaleRepository`] - The [`SaleStore`](stockroom_core::SaleStore) implementation
//! - [`transaction::TransactionRepository`] - Ledger reads

use sqlx::{QueryBuilder, Sqlite};

pub mod article;
pub mod product;
pub mod sale;
pub mod transaction;

/// Appends ` IN (?, ?, ...)` with one bind per id.
///
/// Callers skip the query entirely for an empty id list.
pub(crate) fn push_id_list<I>(builder: &mut QueryBuilder<'_, Sqlite>, ids: I)
where
    I: IntoIterator<Item = i64>,
{
    builder.push(" IN (");
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(id);
    }
    separated.push_unseparated(")");
}
