//! # Transaction Ledger Repository
//!
//! Append-only record of completed sales.
//!
//! ## Ledger Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  transactions (header)          transaction_lines                       │
//! │  ┌────┬─────────────────────┐   ┌────────┬─────────┬────────────┬─────┐ │
//! │  │ id │ created_at          │   │ tx_id  │ line_no │ product    │ qty │ │
//! │  ├────┼─────────────────────┤   ├────────┼─────────┼────────────┼─────┤ │
//! │  │ 1  │ 2024-05-01T10:00:00Z│◄──│ 1      │ 0       │ 1 "Chair"  │ 2   │ │
//! │  │    │                     │◄──│ 1      │ 1       │ 2 "Table"  │ 1   │ │
//! │  └────┴─────────────────────┘   └────────┴─────────┴────────────┴─────┘ │
//! │                                                                         │
//! │  Appends happen only inside a sale's unit of work (see sale.rs).       │
//! │  Pagination counts headers, not lines.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, SqliteConnection, SqlitePool};
use tracing::debug;

use stockroom_core::{LedgerLine, Page, TransactionId, TransactionRecord, ValidationError};

use super::push_id_list;
use crate::error::DbResult;

#[derive(Debug, sqlx::FromRow)]
struct HeaderRow {
    id: i64,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct LineRow {
    transaction_id: i64,
    product_id: i64,
    product_name: String,
    quantity: i64,
}

/// Read access to the transaction ledger.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Lists completed sales by ascending id.
    pub async fn list(&self, page: Page) -> DbResult<Vec<TransactionRecord>> {
        let mut conn = self.pool.acquire().await?;

        let headers: Vec<HeaderRow> = sqlx::query_as(
            r#"
            SELECT id, created_at
            FROM transactions
            ORDER BY id
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&mut *conn)
        .await?;

        attach_lines(&mut conn, headers).await
    }

    /// Gets one completed sale.
    pub async fn get(&self, id: TransactionId) -> DbResult<Option<TransactionRecord>> {
        let mut conn = self.pool.acquire().await?;

        let header: Option<HeaderRow> =
            sqlx::query_as("SELECT id, created_at FROM transactions WHERE id = ?1")
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?;

        let Some(header) = header else {
            return Ok(None);
        };

        Ok(attach_lines(&mut conn, vec![header]).await?.pop())
    }

    /// Counts completed sales.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Appends one record with `lines` on the caller's transaction.
///
/// Assigns the id and the wall-clock timestamp. Nothing is visible until the
/// caller commits.
pub(crate) async fn append(
    conn: &mut SqliteConnection,
    lines: Vec<LedgerLine>,
) -> DbResult<TransactionRecord> {
    if lines.is_empty() {
        return Err(ValidationError::Required {
            field: "lines".to_string(),
        }
        .into());
    }

    let header: HeaderRow = sqlx::query_as(
        r#"
        INSERT INTO transactions (created_at)
        VALUES (?1)
        RETURNING id, created_at
        "#,
    )
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await?;

    for (line_no, line) in lines.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO transaction_lines (
                transaction_id, line_no, product_id, product_name, quantity
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(header.id)
        .bind(line_no as i64)
        .bind(line.product_id)
        .bind(line.product_name.as_str())
        .bind(line.quantity)
        .execute(&mut *conn)
        .await?;
    }

    debug!(transaction_id = header.id, lines = lines.len(), "Ledger record appended");

    Ok(TransactionRecord {
        id: header.id,
        created_at: header.created_at,
        lines,
    })
}

async fn attach_lines(
    conn: &mut SqliteConnection,
    headers: Vec<HeaderRow>,
) -> DbResult<Vec<TransactionRecord>> {
    if headers.is_empty() {
        return Ok(Vec::new());
    }

    let ids: BTreeSet<i64> = headers.iter().map(|h| h.id).collect();

    let mut builder = QueryBuilder::new(
        "SELECT transaction_id, product_id, product_name, quantity \
         FROM transaction_lines WHERE transaction_id",
    );
    push_id_list(&mut builder, ids);
    builder.push(" ORDER BY transaction_id, line_no");

    let rows: Vec<LineRow> = builder.build_query_as().fetch_all(&mut *conn).await?;

    let mut lines: BTreeMap<i64, Vec<LedgerLine>> = BTreeMap::new();
    for row in rows {
        lines.entry(row.transaction_id).or_default().push(LedgerLine {
            product_id: row.product_id,
            product_name: row.product_name,
            quantity: row.quantity,
        });
    }

    Ok(headers
        .into_iter()
        .map(|header| TransactionRecord {
            id: header.id,
            created_at: header.created_at,
            lines: lines.remove(&header.id).unwrap_or_default(),
        })
        .collect())
}

// =============================================================================
// Unit Tests
// =============================================================================
