//! # Article Repository
//!
//! Database operations for articles (stocked parts).
//!
//! ## Stock Writers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Who changes articles.stock                                             │
//! │                                                                         │
//! │  upsert / upsert_many   SET stock = <value from inventory file>        │
//! │  restock(id, delta)     SET stock = current + delta   (CAS on current) │
//! │  SaleUnit::commit_sale  SET stock = current - used    (CAS on current) │
//! │                                                                         │
//! │  The CHECK (stock >= 0) constraint backs up every path.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, SqliteConnection, SqlitePool};
use tracing::{debug, info};

use stockroom_core::validation::{validate_id, validate_new_article};
use stockroom_core::{Article, ArticleId, ArticleStocks, CoreError, NewArticle, Page, ValidationError};

use super::push_id_list;
use crate::error::{DbError, DbResult};

#[derive(Debug, sqlx::FromRow)]
struct ArticleRow {
    id: i64,
    name: String,
    stock: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ArticleRow> for Article {
    fn from(row: ArticleRow) -> Self {
        Article {
            id: row.id,
            name: row.name,
            stock: row.stock,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for article database operations.
#[derive(Debug, Clone)]
pub struct ArticleRepository {
    pool: SqlitePool,
}

impl ArticleRepository {
    /// Creates a new ArticleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ArticleRepository { pool }
    }

    /// Inserts an article, or renames it and sets its stock if the id exists.
    pub async fn upsert(&self, article: &NewArticle) -> DbResult<Article> {
        validate_new_article(article)?;

        let mut conn = self.pool.acquire().await?;
        upsert_in(&mut conn, article, Utc::now()).await
    }

    /// Upserts a whole inventory file in one transaction.
    ///
    /// Either every article is written or none is.
    pub async fn upsert_many(&self, articles: &[NewArticle]) -> DbResult<Vec<Article>> {
        for article in articles {
            validate_new_article(article)?;
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let mut stored = Vec::with_capacity(articles.len());
        for article in articles {
            stored.push(upsert_in(&mut tx, article, now).await?);
        }

        tx.commit().await?;

        info!(count = stored.len(), "Articles imported");
        Ok(stored)
    }

    /// Gets an article by id.
    pub async fn get(&self, id: ArticleId) -> DbResult<Option<Article>> {
        let row: Option<ArticleRow> = sqlx::query_as(
            r#"
            SELECT id, name, stock, created_at, updated_at
            FROM articles
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Article::from))
    }

    /// Lists articles by ascending id.
    pub async fn list(&self, page: Page) -> DbResult<Vec<Article>> {
        let rows: Vec<ArticleRow> = sqlx::query_as(
            r#"
            SELECT id, name, stock, created_at, updated_at
            FROM articles
            ORDER BY id
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Article::from).collect())
    }

    /// Adjusts stock by a signed delta.
    ///
    /// ## Errors
    /// - `NotFound` if the article doesn't exist
    /// - `Core(NegativeStock)` if the result would be below zero
    /// - `Conflict` if a sale changed the stock between read and write
    pub async fn restock(&self, id: ArticleId, delta: i64) -> DbResult<Article> {
        debug!(id = id, delta = delta, "Restocking article");

        let mut tx = self.pool.begin().await?;

        let current: Option<i64> = sqlx::query_scalar("SELECT stock FROM articles WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let current = current.ok_or_else(|| DbError::not_found("Article", id))?;

        let new_stock = match current.checked_add(delta) {
            Some(stock) if stock >= 0 => stock,
            Some(_) => {
                return Err(CoreError::NegativeStock {
                    article_id: id,
                    current,
                    delta,
                }
                .into())
            }
            None => {
                return Err(ValidationError::OutOfRange {
                    field: "delta".to_string(),
                    min: -current,
                    max: i64::MAX - current,
                }
                .into())
            }
        };

        let row: Option<ArticleRow> = sqlx::query_as(
            r#"
            UPDATE articles
            SET stock = ?3, updated_at = ?4
            WHERE id = ?1 AND stock = ?2
            RETURNING id, name, stock, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(current)
        .bind(new_stock)
        .bind(Utc::now())
        .fetch_optional(&mut *tx)
        .await?;

        let row = row.ok_or_else(|| DbError::Conflict(format!("article {} stock changed", id)))?;

        tx.commit().await?;

        Ok(row.into())
    }

    /// Deletes an article. Bill-of-materials rows referencing it go too.
    pub async fn delete(&self, id: ArticleId) -> DbResult<()> {
        validate_id("article_id", id)?;
        debug!(id = id, "Deleting article");

        let result = sqlx::query("DELETE FROM articles WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Article", id));
        }

        Ok(())
    }

    /// Current stock for the given articles. Unknown ids are left out.
    pub async fn stocks(&self, ids: &BTreeSet<ArticleId>) -> DbResult<ArticleStocks> {
        let mut conn = self.pool.acquire().await?;
        fetch_stocks(&mut conn, ids).await
    }

    /// Counts articles (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

async fn upsert_in(
    conn: &mut SqliteConnection,
    article: &NewArticle,
    now: DateTime<Utc>,
) -> DbResult<Article> {
    debug!(id = article.id, stock = article.stock, "Upserting article");

    let row: ArticleRow = sqlx::query_as(
        r#"
        INSERT INTO articles (id, name, stock, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?4)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            stock = excluded.stock,
            updated_at = excluded.updated_at
        RETURNING id, name, stock, created_at, updated_at
        "#,
    )
    .bind(article.id)
    .bind(article.name.trim())
    .bind(article.stock)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;

    Ok(row.into())
}

/// Reads stock for `ids` on an existing connection or transaction.
pub(crate) async fn fetch_stocks(
    conn: &mut SqliteConnection,
    ids: &BTreeSet<ArticleId>,
) -> DbResult<ArticleStocks> {
    if ids.is_empty() {
        return Ok(ArticleStocks::new());
    }

    let mut builder = QueryBuilder::new("SELECT id, stock FROM articles WHERE id");
    push_id_list(&mut builder, ids.iter().copied());

    let rows: Vec<(i64, i64)> = builder.build_query_as().fetch_all(&mut *conn).await?;

    Ok(rows.into_iter().collect())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig, DbError};
    use stockroom_core::{CoreError, NewArticle, Page};
    use std::collections::BTreeSet;

    fn leg(stock: i64) -> NewArticle {
        NewArticle {
            id: 1,
            name: "leg".to_string(),
            stock,
        }
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_overwrites() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let articles = db.articles();

        let created = articles.upsert(&leg(12)).await.unwrap();
        assert_eq!(created.stock, 12);

        let updated = articles
            .upsert(&NewArticle {
                name: "table leg".to_string(),
                ..leg(3)
            })
            .await
            .unwrap();
        assert_eq!(updated.stock, 3);
        assert_eq!(updated.name, "table leg");
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(articles.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_upsert_many_is_all_or_nothing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let batch = vec![
            leg(12),
            NewArticle {
                id: 2,
                name: String::new(),
                stock: 5,
            },
        ];
        assert!(db.articles().upsert_many(&batch).await.is_err());
        assert_eq!(db.articles().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_is_paginated_by_id() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let batch: Vec<NewArticle> = (1..=5)
            .rev()
            .map(|id| NewArticle {
                id,
                name: format!("article {}", id),
                stock: id * 10,
            })
            .collect();
        db.articles().upsert_many(&batch).await.unwrap();

        let first = db.articles().list(Page::new(2, 0)).await.unwrap();
        let ids: Vec<i64> = first.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2]);

        let third = db.articles().list(Page::new(2, 4)).await.unwrap();
        assert_eq!(third.len(), 1);
        assert_eq!(third[0].id, 5);
    }

    #[tokio::test]
    async fn test_restock() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.articles().upsert(&leg(4)).await.unwrap();

        let article = db.articles().restock(1, 6).await.unwrap();
        assert_eq!(article.stock, 10);

        let article = db.articles().restock(1, -10).await.unwrap();
        assert_eq!(article.stock, 0);

        let err = db.articles().restock(1, -1).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::NegativeStock { current: 0, delta: -1, .. })
        ));

        let err = db.articles().restock(99, 1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_and_stocks() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.articles()
            .upsert_many(&[
                leg(12),
                NewArticle {
                    id: 2,
                    name: "screw".to_string(),
                    stock: 17,
                },
            ])
            .await
            .unwrap();

        db.articles().delete(1).await.unwrap();
        assert!(db.articles().get(1).await.unwrap().is_none());
        assert!(matches!(
            db.articles().delete(1).await.unwrap_err(),
            DbError::NotFound { .. }
        ));

        let stocks = db.articles().stocks(&BTreeSet::from([1, 2])).await.unwrap();
        assert_eq!(stocks.len(), 1);
        assert_eq!(stocks[&2], 17);
    }
}
